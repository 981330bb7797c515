//! Headless game client: relay transport and the cooperative tick loop

pub mod connection;
pub mod session;

pub use connection::{connect, RelayReceiver, RelaySender};
pub use session::{ClientSession, SessionHandle};

use thiserror::Error;
use tokio_tungstenite::tungstenite;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Failed to connect to {0}: {1}")]
    Connect(String, #[source] tungstenite::Error),

    #[error("WebSocket transport error: {0}")]
    Transport(#[from] tungstenite::Error),

    #[error("Failed to encode message: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("Connection closed")]
    Closed,
}
