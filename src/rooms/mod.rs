//! Room pairing and message fan-out on the relay

pub mod room;
pub mod store;

pub use room::{ConnectionHandle, Room, RoomPhase, MAX_MEMBERS};
pub use store::RoomStore;

use thiserror::Error;

/// Rejections surfaced to a joining client. The Display text is what the
/// relay sends in its `error` message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RoomError {
    #[error("Room not found")]
    RoomNotFound,

    #[error("Room is full")]
    RoomFull,
}
