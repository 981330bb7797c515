//! Client-side reconciliation between the local simulation and the relay

pub mod handler;

pub use handler::SyncHandler;

use crate::game::Side;
use crate::ws::protocol::RoomId;

/// Room and peer events the presentation layer should surface
#[derive(Debug, Clone, PartialEq)]
pub enum SyncNotice {
    RoomCreated { room_id: RoomId, side: Side },
    RoomJoined { room_id: RoomId, side: Side },
    GameStarted,
    /// Join rejected: no such room
    RoomNotFound,
    /// Join rejected: both seats taken
    RoomFull,
    /// The opponent left; the match cannot resume
    PeerDisconnected { message: String },
    /// Any other relay error
    Other { message: String },
}
