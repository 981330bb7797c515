//! Inbound relay messages → local state, local events → outbound messages
//!
//! The handler is the only writer of the opponent's mirror. Messages are
//! applied as soon as they arrive; the simulation reads the result on its
//! next tick.

use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

use crate::game::{GridLayout, InputSnapshot, RemoteEntityMirror, SimEvent, Side, Simulation};
use crate::rooms::RoomError;
use crate::ws::protocol::{
    ClientMsg, GameState, Payload, PlayerId, ProjectileData, RoomId, ServerMsg, SyncState,
};

use super::SyncNotice;

/// Seat assignment received from the relay
#[derive(Debug, Clone, PartialEq)]
struct Seat {
    room_id: RoomId,
    player_id: PlayerId,
    side: Side,
    is_host: bool,
}

pub struct SyncHandler {
    seat: Option<Seat>,
    simulation: Option<Simulation>,
    /// Seed for the host's wall placement
    seed: u64,
}

impl SyncHandler {
    pub fn new(seed: u64) -> Self {
        Self {
            seat: None,
            simulation: None,
            seed,
        }
    }

    pub fn simulation(&self) -> Option<&Simulation> {
        self.simulation.as_ref()
    }

    pub fn room_id(&self) -> Option<&RoomId> {
        self.seat.as_ref().map(|s| &s.room_id)
    }

    pub fn player_id(&self) -> Option<PlayerId> {
        self.seat.as_ref().map(|s| s.player_id)
    }

    pub fn side(&self) -> Option<Side> {
        self.seat.as_ref().map(|s| s.side)
    }

    pub fn is_host(&self) -> bool {
        self.seat.as_ref().is_some_and(|s| s.is_host)
    }

    /// Apply one message from the relay
    pub fn handle_server_msg(&mut self, msg: ServerMsg) -> Option<SyncNotice> {
        if let (Some(sender), Some(own)) = (msg.sender(), self.player_id()) {
            if sender == own {
                debug!(player_id = %own, "Ignoring echo of own message");
                return None;
            }
        }

        match msg {
            ServerMsg::RoomCreated {
                room_id,
                player_id,
                position,
                is_host,
            } => {
                self.take_seat(room_id.clone(), player_id, position, is_host);
                Some(SyncNotice::RoomCreated {
                    room_id,
                    side: position,
                })
            }
            ServerMsg::RoomJoined {
                room_id,
                player_id,
                position,
                is_host,
            } => {
                self.take_seat(room_id.clone(), player_id, position, is_host);
                // The host is already seated
                if let Some(sim) = self.simulation.as_mut() {
                    sim.ensure_remote();
                }
                Some(SyncNotice::RoomJoined {
                    room_id,
                    side: position,
                })
            }
            ServerMsg::GameStart { positions, .. } => {
                debug!(players = positions.len(), "Game start");
                if let Some(sim) = self.simulation.as_mut() {
                    sim.ensure_remote();
                }
                Some(SyncNotice::GameStarted)
            }
            ServerMsg::GameUpdate { game_state, .. } => {
                let state = decode("game_update", game_state)?;
                match self.mirror() {
                    Some(remote) => {
                        if !remote.apply_position(state.x, state.y) {
                            warn!(x = state.x, y = state.y, "Rejected out-of-arena position");
                        }
                    }
                    None => debug!("Position update without opponent"),
                }
                None
            }
            ServerMsg::ProjectileCreated { projectile, .. } => {
                let data = decode("projectile_created", projectile)?;
                if let Some(sim) = self.simulation.as_mut() {
                    if !sim.spawn_remote_projectile(data.into()) {
                        warn!("Rejected out-of-arena projectile");
                    }
                }
                None
            }
            ServerMsg::HealthUpdate { health, .. } => {
                let health = decode("health_update", health)?;
                if let Some(remote) = self.mirror() {
                    remote.apply_health(health);
                }
                None
            }
            ServerMsg::PlayerDeath { .. } => {
                if let Some(remote) = self.mirror() {
                    remote.apply_death();
                }
                None
            }
            ServerMsg::WallPlaced { wall, .. } => {
                let wall = decode("wall_placed", wall)?;
                if let Some(sim) = self.simulation.as_mut() {
                    if !sim.place_wall(&wall) {
                        debug!(side = %wall.side, row = wall.row, col = wall.col, "Wall cell already taken");
                    }
                }
                None
            }
            ServerMsg::StateSync { state, .. } => {
                let state = decode("state_sync", state)?;
                if let Some(sim) = self.simulation.as_mut() {
                    if let Some(remote) = sim.remote_mut() {
                        remote.apply_status(state.x, state.y, state.health, state.dead);
                    }
                    let placed = sim.apply_wall_layout(&GridLayout { walls: state.walls });
                    if placed > 0 {
                        info!(placed, "Recovered walls from resync");
                    }
                }
                None
            }
            ServerMsg::PlayerDisconnected { player_id, message } => {
                warn!(player_id = %player_id, "Opponent disconnected");
                if let Some(sim) = self.simulation.as_mut() {
                    sim.remove_remote();
                }
                Some(SyncNotice::PeerDisconnected { message })
            }
            ServerMsg::Error { message } => {
                warn!(message = %message, "Relay error");
                Some(notice_for_error(message))
            }
        }
    }

    /// Advance the local simulation and return what must be published
    pub fn tick(&mut self, input: &InputSnapshot, dt: f32) -> Vec<ClientMsg> {
        let Some(sim) = self.simulation.as_mut() else {
            return Vec::new();
        };
        let events = sim.tick(input, dt);
        self.outbound(events)
    }

    /// Translate simulation events into relay messages
    pub fn outbound(&self, events: Vec<SimEvent>) -> Vec<ClientMsg> {
        let Some(room_id) = self.room_id() else {
            return Vec::new();
        };

        events
            .into_iter()
            .map(|event| match event {
                SimEvent::ProjectileFired(projectile) => ClientMsg::ProjectileCreated {
                    room_id: room_id.clone(),
                    projectile: ProjectileData::from(&projectile).into(),
                },
                SimEvent::HealthChanged { health } => ClientMsg::HealthUpdate {
                    room_id: room_id.clone(),
                    health: health.into(),
                },
                SimEvent::Died => ClientMsg::PlayerDeath {
                    room_id: room_id.clone(),
                },
                SimEvent::WallPlaced(wall) => ClientMsg::WallPlaced {
                    room_id: room_id.clone(),
                    wall: wall.into(),
                },
            })
            .collect()
    }

    /// Current position of the local player
    pub fn position_update(&self) -> Option<ClientMsg> {
        let room_id = self.room_id()?.clone();
        let player = self.simulation.as_ref()?.local().player();
        Some(ClientMsg::GameUpdate {
            room_id,
            game_state: GameState {
                x: player.x,
                y: player.y,
                direction: player.direction(),
            }
            .into(),
        })
    }

    /// Full local status. The host also republishes the wall layout.
    pub fn state_sync(&self) -> Option<ClientMsg> {
        let room_id = self.room_id()?.clone();
        let sim = self.simulation.as_ref()?;
        let player = sim.local().player();
        let walls = if self.is_host() {
            sim.wall_layout().walls
        } else {
            Vec::new()
        };

        Some(ClientMsg::StateSync {
            room_id,
            state: SyncState {
                x: player.x,
                y: player.y,
                health: player.health(),
                dead: player.is_dead(),
                walls,
            }
            .into(),
        })
    }

    fn take_seat(&mut self, room_id: RoomId, player_id: PlayerId, side: Side, is_host: bool) {
        info!(room_id = %room_id, player_id = %player_id, side = %side, is_host, "Seated");
        self.seat = Some(Seat {
            room_id,
            player_id,
            side,
            is_host,
        });
        self.simulation = Some(Simulation::new(side, is_host, self.seed));
    }

    fn mirror(&mut self) -> Option<&mut RemoteEntityMirror> {
        self.simulation.as_mut().and_then(Simulation::remote_mut)
    }
}

/// Type a relayed payload; one that does not fit is dropped with a warning
fn decode<T: DeserializeOwned>(kind: &'static str, payload: Payload<T>) -> Option<T> {
    payload
        .decode()
        .map_err(|e| warn!(kind, error = %e, "Dropping malformed payload"))
        .ok()
}

fn notice_for_error(message: String) -> SyncNotice {
    if message == RoomError::RoomNotFound.to_string() {
        SyncNotice::RoomNotFound
    } else if message == RoomError::RoomFull.to_string() {
        SyncNotice::RoomFull
    } else {
        SyncNotice::Other { message }
    }
}
