//! WebSocket transport to the relay

use futures::{
    stream::{SplitSink, SplitStream},
    SinkExt, StreamExt,
};
use tokio::net::TcpStream;
use tokio_tungstenite::{connect_async, tungstenite::Message, MaybeTlsStream, WebSocketStream};
use tracing::{debug, info, warn};

use crate::ws::protocol::{ClientMsg, ServerMsg};

use super::ClientError;

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Write half of a relay connection
pub struct RelaySender {
    sink: SplitSink<Socket, Message>,
}

impl RelaySender {
    pub async fn send(&mut self, msg: &ClientMsg) -> Result<(), ClientError> {
        let json = serde_json::to_string(msg)?;
        self.sink.send(Message::Text(json)).await?;
        Ok(())
    }

    pub async fn close(&mut self) -> Result<(), ClientError> {
        self.sink.close().await?;
        Ok(())
    }
}

/// Read half of a relay connection
pub struct RelayReceiver {
    stream: SplitStream<Socket>,
}

impl RelayReceiver {
    /// Next well-formed message. `Ok(None)` once the relay closes the socket.
    /// Malformed payloads are logged and skipped.
    pub async fn recv(&mut self) -> Result<Option<ServerMsg>, ClientError> {
        while let Some(frame) = self.stream.next().await {
            match frame? {
                Message::Text(text) => match serde_json::from_str::<ServerMsg>(&text) {
                    Ok(msg) => return Ok(Some(msg)),
                    Err(e) => warn!(error = %e, "Failed to parse relay message"),
                },
                Message::Close(_) => {
                    debug!("Relay closed the connection");
                    return Ok(None);
                }
                Message::Binary(_) => warn!("Received binary message, ignoring"),
                _ => {}
            }
        }
        Ok(None)
    }
}

/// Open a connection and split it into its halves
pub async fn connect(url: &str) -> Result<(RelaySender, RelayReceiver), ClientError> {
    let (socket, _) = connect_async(url)
        .await
        .map_err(|e| ClientError::Connect(url.to_string(), e))?;
    info!(url = %url, "Connected to relay");

    let (sink, stream) = socket.split();
    Ok((RelaySender { sink }, RelayReceiver { stream }))
}
