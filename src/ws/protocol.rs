//! WebSocket protocol message definitions
//! These are the JSON wire types exchanged between clients and the relay

use serde::{de::DeserializeOwned, Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use uuid::Uuid;

use crate::game::{PlacedWall, Projectile, Side};

/// Connection identity, assigned by the relay at socket accept
pub type PlayerId = Uuid;

/// Opaque room code. Generated by the relay, typed in by the joining player.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomId(String);

impl RoomId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for RoomId {
    fn from(value: &str) -> Self {
        Self(value.trim().to_string())
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Messages sent from client to server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMsg {
    /// Open a new room and take the left side
    CreateRoom,

    /// Take the right side of an existing room
    #[serde(rename_all = "camelCase")]
    JoinRoom { room_id: RoomId },

    /// Periodic position of the sender's player
    #[serde(rename_all = "camelCase")]
    GameUpdate {
        room_id: RoomId,
        game_state: Payload<GameState>,
    },

    #[serde(rename_all = "camelCase")]
    ProjectileCreated {
        room_id: RoomId,
        projectile: Payload<ProjectileData>,
    },

    /// Sender's own health after taking damage
    #[serde(rename_all = "camelCase")]
    HealthUpdate {
        room_id: RoomId,
        health: Payload<i32>,
    },

    #[serde(rename_all = "camelCase")]
    PlayerDeath { room_id: RoomId },

    /// Wall placed by the host's timer
    #[serde(rename_all = "camelCase")]
    WallPlaced {
        room_id: RoomId,
        wall: Payload<PlacedWall>,
    },

    /// Full status of the sender, republished periodically
    #[serde(rename_all = "camelCase")]
    StateSync {
        room_id: RoomId,
        state: Payload<SyncState>,
    },
}

impl ClientMsg {
    /// Room a relayable message is addressed to
    pub fn room_id(&self) -> Option<&RoomId> {
        match self {
            ClientMsg::CreateRoom | ClientMsg::JoinRoom { .. } => None,
            ClientMsg::GameUpdate { room_id, .. }
            | ClientMsg::ProjectileCreated { room_id, .. }
            | ClientMsg::HealthUpdate { room_id, .. }
            | ClientMsg::PlayerDeath { room_id }
            | ClientMsg::WallPlaced { room_id, .. }
            | ClientMsg::StateSync { room_id, .. } => Some(room_id),
        }
    }

    /// Stamp a relayable message with its sender. Room management
    /// messages are not relayed and yield `None`.
    pub fn into_relayed(self, player_id: PlayerId, position: Side) -> Option<ServerMsg> {
        let msg = match self {
            ClientMsg::CreateRoom | ClientMsg::JoinRoom { .. } => return None,
            ClientMsg::GameUpdate { game_state, .. } => ServerMsg::GameUpdate {
                player_id,
                position,
                game_state,
            },
            ClientMsg::ProjectileCreated { projectile, .. } => ServerMsg::ProjectileCreated {
                player_id,
                position,
                projectile,
            },
            ClientMsg::HealthUpdate { health, .. } => ServerMsg::HealthUpdate {
                player_id,
                position,
                health,
            },
            ClientMsg::PlayerDeath { .. } => ServerMsg::PlayerDeath {
                player_id,
                position,
            },
            ClientMsg::WallPlaced { wall, .. } => ServerMsg::WallPlaced {
                player_id,
                position,
                wall,
            },
            ClientMsg::StateSync { state, .. } => ServerMsg::StateSync {
                player_id,
                position,
                state,
            },
        };
        Some(msg)
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ClientMsg::CreateRoom => "create_room",
            ClientMsg::JoinRoom { .. } => "join_room",
            ClientMsg::GameUpdate { .. } => "game_update",
            ClientMsg::ProjectileCreated { .. } => "projectile_created",
            ClientMsg::HealthUpdate { .. } => "health_update",
            ClientMsg::PlayerDeath { .. } => "player_death",
            ClientMsg::WallPlaced { .. } => "wall_placed",
            ClientMsg::StateSync { .. } => "state_sync",
        }
    }
}

/// Messages sent from server to client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMsg {
    #[serde(rename_all = "camelCase")]
    RoomCreated {
        room_id: RoomId,
        player_id: PlayerId,
        position: Side,
        is_host: bool,
    },

    #[serde(rename_all = "camelCase")]
    RoomJoined {
        room_id: RoomId,
        player_id: PlayerId,
        position: Side,
        is_host: bool,
    },

    /// Both seats are filled
    GameStart {
        positions: HashMap<PlayerId, Side>,
        #[serde(default)]
        message: String,
    },

    #[serde(rename_all = "camelCase")]
    GameUpdate {
        player_id: PlayerId,
        position: Side,
        game_state: Payload<GameState>,
    },

    #[serde(rename_all = "camelCase")]
    ProjectileCreated {
        player_id: PlayerId,
        position: Side,
        projectile: Payload<ProjectileData>,
    },

    #[serde(rename_all = "camelCase")]
    HealthUpdate {
        player_id: PlayerId,
        position: Side,
        health: Payload<i32>,
    },

    #[serde(rename_all = "camelCase")]
    PlayerDeath {
        player_id: PlayerId,
        position: Side,
    },

    #[serde(rename_all = "camelCase")]
    WallPlaced {
        player_id: PlayerId,
        position: Side,
        wall: Payload<PlacedWall>,
    },

    #[serde(rename_all = "camelCase")]
    StateSync {
        player_id: PlayerId,
        position: Side,
        state: Payload<SyncState>,
    },

    #[serde(rename_all = "camelCase")]
    PlayerDisconnected { player_id: PlayerId, message: String },

    Error { message: String },
}

impl ServerMsg {
    /// Sender of a relayed message
    pub fn sender(&self) -> Option<PlayerId> {
        match self {
            ServerMsg::GameUpdate { player_id, .. }
            | ServerMsg::ProjectileCreated { player_id, .. }
            | ServerMsg::HealthUpdate { player_id, .. }
            | ServerMsg::PlayerDeath { player_id, .. }
            | ServerMsg::WallPlaced { player_id, .. }
            | ServerMsg::StateSync { player_id, .. }
            | ServerMsg::PlayerDisconnected { player_id, .. } => Some(*player_id),
            _ => None,
        }
    }
}

/// Game payload of a relayed message. Anything parsed off the wire stays
/// raw JSON, so the relay forwards exactly what the sender wrote; the
/// receiving client types it with `decode`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Payload<T> {
    Typed(T),
    Raw(Value),
}

impl<T: DeserializeOwned> Payload<T> {
    pub fn decode(self) -> Result<T, serde_json::Error> {
        match self {
            Payload::Typed(value) => Ok(value),
            Payload::Raw(raw) => serde_json::from_value(raw),
        }
    }
}

impl<T> From<T> for Payload<T> {
    fn from(value: T) -> Self {
        Payload::Typed(value)
    }
}

impl<'de, T> Deserialize<'de> for Payload<T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Value::deserialize(deserializer).map(Payload::Raw)
    }
}

/// Position and facing of a player
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    pub x: f32,
    pub y: f32,
    pub direction: f32,
}

/// A projectile as announced by its owner
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectileData {
    pub x: f32,
    pub y: f32,
    pub direction: f32,
    pub color: String,
}

impl From<&Projectile> for ProjectileData {
    fn from(projectile: &Projectile) -> Self {
        Self {
            x: projectile.x,
            y: projectile.y,
            direction: projectile.direction,
            color: projectile.color.clone(),
        }
    }
}

impl From<ProjectileData> for Projectile {
    fn from(data: ProjectileData) -> Self {
        Projectile::new(data.x, data.y, data.direction, data.color)
    }
}

/// Sender's full status for periodic resync
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncState {
    pub x: f32,
    pub y: f32,
    pub health: i32,
    pub dead: bool,
    /// Host's wall layout across both grids; empty from the guest
    #[serde(default)]
    pub walls: Vec<PlacedWall>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn client_messages_use_wire_names() {
        let msg: ClientMsg = serde_json::from_value(json!({
            "type": "join_room",
            "roomId": "abc"
        }))
        .unwrap();
        assert_eq!(msg, ClientMsg::JoinRoom { room_id: "abc".into() });

        let msg: ClientMsg = serde_json::from_value(json!({
            "type": "game_update",
            "roomId": "abc",
            "gameState": { "x": 10.0, "y": 20.0, "direction": 0.0 }
        }))
        .unwrap();
        assert_eq!(msg.kind(), "game_update");
        assert_eq!(msg.room_id(), Some(&RoomId::from("abc")));

        let msg: ClientMsg = serde_json::from_str(r#"{"type":"create_room"}"#).unwrap();
        assert_eq!(msg, ClientMsg::CreateRoom);
    }

    #[test]
    fn unknown_or_incomplete_messages_fail_to_parse() {
        assert!(serde_json::from_str::<ClientMsg>(r#"{"type":"teleport"}"#).is_err());
        assert!(serde_json::from_str::<ClientMsg>(r#"{"type":"join_room"}"#).is_err());
        assert!(serde_json::from_str::<ClientMsg>("not json").is_err());
    }

    #[test]
    fn room_created_serializes_camel_case() {
        let player_id = Uuid::new_v4();
        let msg = ServerMsg::RoomCreated {
            room_id: "r1".into(),
            player_id,
            position: Side::Left,
            is_host: true,
        };
        assert_eq!(
            serde_json::to_value(&msg).unwrap(),
            json!({
                "type": "room_created",
                "roomId": "r1",
                "playerId": player_id.to_string(),
                "position": "left",
                "isHost": true
            })
        );
    }

    #[test]
    fn relayed_messages_carry_sender() {
        let player_id = Uuid::new_v4();
        let msg = ClientMsg::HealthUpdate {
            room_id: "r1".into(),
            health: 60.into(),
        };
        let relayed = msg.into_relayed(player_id, Side::Right).unwrap();
        assert_eq!(relayed.sender(), Some(player_id));
        assert_eq!(
            serde_json::to_value(&relayed).unwrap(),
            json!({
                "type": "health_update",
                "playerId": player_id.to_string(),
                "position": "right",
                "health": 60
            })
        );

        assert!(ClientMsg::CreateRoom.into_relayed(player_id, Side::Left).is_none());
    }

    #[test]
    fn state_sync_walls_default_empty() {
        let state: SyncState =
            serde_json::from_str(r#"{"x":1.0,"y":2.0,"health":40,"dead":false}"#).unwrap();
        assert!(state.walls.is_empty());
    }

    #[test]
    fn relayed_payloads_pass_through_untouched() {
        let msg: ClientMsg = serde_json::from_value(json!({
            "type": "game_update",
            "roomId": "r1",
            "gameState": { "x": 1, "y": 2, "direction": 0, "vx": 7 }
        }))
        .unwrap();
        let player_id = Uuid::new_v4();
        let relayed = msg.into_relayed(player_id, Side::Left).unwrap();

        assert_eq!(
            serde_json::to_value(&relayed).unwrap()["gameState"],
            json!({ "x": 1, "y": 2, "direction": 0, "vx": 7 })
        );

        // Content is only checked where it is consumed
        let msg: ClientMsg = serde_json::from_value(json!({
            "type": "game_update",
            "roomId": "r1",
            "gameState": { "x": 1, "y": 2 }
        }))
        .unwrap();
        let Some(ServerMsg::GameUpdate { game_state, .. }) =
            msg.into_relayed(player_id, Side::Left)
        else {
            panic!("expected game_update");
        };
        assert!(game_state.decode().is_err());
    }

    #[test]
    fn received_payloads_decode_to_typed_values() {
        let msg: ServerMsg = serde_json::from_value(json!({
            "type": "projectile_created",
            "playerId": Uuid::new_v4().to_string(),
            "position": "right",
            "projectile": { "x": 1085.0, "y": 400.0, "direction": 3.0, "color": "blue", "spin": 1 }
        }))
        .unwrap();
        let ServerMsg::ProjectileCreated { projectile, .. } = msg else {
            panic!("expected projectile_created");
        };
        let data = projectile.decode().unwrap();
        assert_eq!(data.color, "blue");
        assert_eq!(data.x, 1085.0);
    }
}
