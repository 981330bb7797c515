//! A single two-seat room

use std::collections::HashMap;
use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::warn;

use crate::game::Side;
use crate::util::time::unix_millis;
use crate::ws::protocol::{PlayerId, RoomId, ServerMsg};

use super::RoomError;

/// Seats per room
pub const MAX_MEMBERS: usize = 2;

/// Room lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoomPhase {
    /// Creator seated, waiting for an opponent
    WaitingForSecondPlayer,
    /// Both seats filled
    Active,
    /// A member left; the room is deleted once the last one goes
    Closing,
}

/// Outbound side of one relay connection
#[derive(Debug, Clone)]
pub struct ConnectionHandle {
    id: PlayerId,
    tx: mpsc::Sender<ServerMsg>,
}

impl ConnectionHandle {
    pub fn new(id: PlayerId, tx: mpsc::Sender<ServerMsg>) -> Self {
        Self { id, tx }
    }

    pub fn id(&self) -> PlayerId {
        self.id
    }

    pub fn is_open(&self) -> bool {
        !self.tx.is_closed()
    }

    /// Queue a message without waiting. Returns false if it was dropped.
    pub fn send(&self, msg: ServerMsg) -> bool {
        match self.tx.try_send(msg) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                warn!(player_id = %self.id, "Outbound queue full, dropping message");
                false
            }
            Err(TrySendError::Closed(_)) => false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Member {
    pub connection: ConnectionHandle,
    pub side: Side,
}

#[derive(Debug)]
pub struct Room {
    id: RoomId,
    /// Join order; never more than `MAX_MEMBERS`
    members: Vec<Member>,
    phase: RoomPhase,
    created_at: u64,
}

impl Room {
    /// Open a room with the creator seated on the left
    pub fn new(id: RoomId, creator: ConnectionHandle) -> Self {
        Self {
            id,
            members: vec![Member {
                connection: creator,
                side: Side::Left,
            }],
            phase: RoomPhase::WaitingForSecondPlayer,
            created_at: unix_millis(),
        }
    }

    pub fn id(&self) -> &RoomId {
        &self.id
    }

    pub fn phase(&self) -> RoomPhase {
        self.phase
    }

    pub fn created_at(&self) -> u64 {
        self.created_at
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.members.len() >= MAX_MEMBERS
    }

    pub fn contains(&self, player_id: PlayerId) -> bool {
        self.members.iter().any(|m| m.connection.id() == player_id)
    }

    pub fn side_of(&self, player_id: PlayerId) -> Option<Side> {
        self.members
            .iter()
            .find(|m| m.connection.id() == player_id)
            .map(|m| m.side)
    }

    /// Seat a second player on the right. Rooms that already lost a member
    /// are treated as gone.
    pub fn add(&mut self, connection: ConnectionHandle) -> Result<Side, RoomError> {
        if self.phase == RoomPhase::Closing {
            return Err(RoomError::RoomNotFound);
        }
        if self.is_full() || self.contains(connection.id()) {
            return Err(RoomError::RoomFull);
        }

        let side = Side::Right;
        self.members.push(Member { connection, side });
        self.phase = RoomPhase::Active;
        Ok(side)
    }

    /// Unseat a member. Any departure moves the room to `Closing`.
    pub fn remove(&mut self, player_id: PlayerId) -> Option<Member> {
        let idx = self
            .members
            .iter()
            .position(|m| m.connection.id() == player_id)?;
        let member = self.members.remove(idx);
        self.phase = RoomPhase::Closing;
        Some(member)
    }

    /// Side assignment of every member
    pub fn positions(&self) -> HashMap<PlayerId, Side> {
        self.members
            .iter()
            .map(|m| (m.connection.id(), m.side))
            .collect()
    }

    /// Send to every open member
    pub fn broadcast(&self, msg: &ServerMsg) -> usize {
        self.members
            .iter()
            .filter(|m| m.connection.is_open())
            .filter(|m| m.connection.send(msg.clone()))
            .count()
    }

    /// Send to every open member except the sender
    pub fn send_to_others(&self, sender: PlayerId, msg: &ServerMsg) -> usize {
        self.members
            .iter()
            .filter(|m| m.connection.id() != sender && m.connection.is_open())
            .filter(|m| m.connection.send(msg.clone()))
            .count()
    }
}
