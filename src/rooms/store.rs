//! Process-wide room registry

use dashmap::DashMap;
use tracing::{debug, info, warn};

use crate::game::Side;
use crate::ws::protocol::{ClientMsg, PlayerId, RoomId, ServerMsg};

use super::room::{ConnectionHandle, Room};
use super::RoomError;

const GAME_START_MESSAGE: &str = "Both players connected";
const PEER_DISCONNECTED_MESSAGE: &str = "Other player disconnected";

/// Owns every room and the connection→room index. Each mutation runs under
/// the room's map entry lock, so the two-seat limit holds under concurrent
/// joins.
pub struct RoomStore {
    rooms: DashMap<RoomId, Room>,
    /// Room each connection currently sits in
    memberships: DashMap<PlayerId, RoomId>,
    /// Every open connection, seated or not
    connections: DashMap<PlayerId, ConnectionHandle>,
}

impl RoomStore {
    pub fn new() -> Self {
        Self {
            rooms: DashMap::new(),
            memberships: DashMap::new(),
            connections: DashMap::new(),
        }
    }

    /// Track a freshly accepted connection
    pub fn register(&self, connection: ConnectionHandle) {
        self.connections.insert(connection.id(), connection);
    }

    /// Open a room with the connection on the left and confirm it.
    /// A connection already seated elsewhere leaves that room first.
    pub fn create_room(&self, connection: &ConnectionHandle) -> RoomId {
        let player_id = connection.id();
        self.leave_room(player_id);

        let room_id = RoomId::generate();
        self.rooms
            .insert(room_id.clone(), Room::new(room_id.clone(), connection.clone()));
        self.memberships.insert(player_id, room_id.clone());

        connection.send(ServerMsg::RoomCreated {
            room_id: room_id.clone(),
            player_id,
            position: Side::Left,
            is_host: true,
        });

        info!(room_id = %room_id, player_id = %player_id, "Room created");
        room_id
    }

    /// Seat the connection on the right, confirm the join to it, then tell
    /// both members the game can start.
    pub fn join_room(
        &self,
        room_id: &RoomId,
        connection: &ConnectionHandle,
    ) -> Result<Side, RoomError> {
        let player_id = connection.id();

        let side = {
            let mut room = self.rooms.get_mut(room_id).ok_or(RoomError::RoomNotFound)?;
            let side = room.add(connection.clone())?;

            connection.send(ServerMsg::RoomJoined {
                room_id: room_id.clone(),
                player_id,
                position: side,
                is_host: false,
            });
            room.broadcast(&ServerMsg::GameStart {
                positions: room.positions(),
                message: GAME_START_MESSAGE.to_string(),
            });
            side
        };

        if let Some(previous) = self.memberships.insert(player_id, room_id.clone()) {
            if &previous != room_id {
                self.vacate(&previous, player_id);
            }
        }

        info!(room_id = %room_id, player_id = %player_id, side = %side, "Player joined room");
        Ok(side)
    }

    /// Forward a game message to the sender's room peers, stamped with the
    /// sender's id and side. Returns how many peers it reached.
    pub fn relay(&self, sender: PlayerId, msg: ClientMsg) -> usize {
        let Some(room_id) = msg.room_id().cloned() else {
            return 0;
        };
        let Some(room) = self.rooms.get(&room_id) else {
            warn!(room_id = %room_id, player_id = %sender, kind = msg.kind(), "Relay to unknown room");
            return 0;
        };
        let Some(side) = room.side_of(sender) else {
            warn!(room_id = %room_id, player_id = %sender, kind = msg.kind(), "Relay from non-member");
            return 0;
        };

        let kind = msg.kind();
        let Some(relayed) = msg.into_relayed(sender, side) else {
            return 0;
        };
        let delivered = room.send_to_others(sender, &relayed);
        debug!(room_id = %room_id, player_id = %sender, kind, delivered, "Relayed");
        delivered
    }

    /// Drop a closed connection and leave its room
    pub fn disconnect(&self, player_id: PlayerId) {
        self.connections.remove(&player_id);
        self.leave_room(player_id);
    }

    pub fn get(&self, room_id: &RoomId) -> Option<dashmap::mapref::one::Ref<'_, RoomId, Room>> {
        self.rooms.get(room_id)
    }

    pub fn remove(&self, room_id: &RoomId) -> Option<Room> {
        let (_, room) = self.rooms.remove(room_id)?;
        self.memberships.retain(|_, seated_in| *seated_in != *room_id);
        Some(room)
    }

    /// Room the connection is seated in
    pub fn room_of(&self, player_id: PlayerId) -> Option<RoomId> {
        self.memberships.get(&player_id).map(|r| r.value().clone())
    }

    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }

    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    fn leave_room(&self, player_id: PlayerId) {
        if let Some((_, room_id)) = self.memberships.remove(&player_id) {
            self.vacate(&room_id, player_id);
        }
    }

    /// Unseat a player. An emptied room is deleted; otherwise the remaining
    /// member is told its opponent left.
    fn vacate(&self, room_id: &RoomId, player_id: PlayerId) {
        {
            let Some(mut room) = self.rooms.get_mut(room_id) else {
                return;
            };
            if room.remove(player_id).is_none() {
                return;
            }
            if !room.is_empty() {
                room.broadcast(&ServerMsg::PlayerDisconnected {
                    player_id,
                    message: PEER_DISCONNECTED_MESSAGE.to_string(),
                });
                info!(room_id = %room_id, player_id = %player_id, "Player left room");
                return;
            }
        }

        if self
            .rooms
            .remove_if(room_id, |_, room| room.is_empty())
            .is_some()
        {
            info!(room_id = %room_id, "Room closed");
        }
    }
}

impl Default for RoomStore {
    fn default() -> Self {
        Self::new()
    }
}
