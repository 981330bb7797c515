//! WebSocket upgrade handler and relay session

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use futures::{stream::SplitSink, SinkExt, StreamExt};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::app::AppState;
use crate::rooms::ConnectionHandle;
use crate::util::rate_limit::ConnectionRateLimiter;
use crate::ws::protocol::{ClientMsg, PlayerId, ServerMsg};

/// Outbound queue depth per connection
const OUTBOUND_BUFFER: usize = 64;

/// WebSocket upgrade handler
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Handle the upgraded WebSocket connection
async fn handle_socket(socket: WebSocket, state: AppState) {
    let player_id: PlayerId = Uuid::new_v4();
    info!(player_id = %player_id, "New WebSocket connection");

    let (ws_sink, ws_stream) = socket.split();
    let (tx, rx) = mpsc::channel::<ServerMsg>(OUTBOUND_BUFFER);
    let connection = ConnectionHandle::new(player_id, tx);
    state.rooms.register(connection.clone());

    run_session(&state, connection, ws_sink, ws_stream, rx).await;

    // Cleanup on disconnect
    state.rooms.disconnect(player_id);
    info!(player_id = %player_id, "WebSocket connection closed");
}

/// Run the WebSocket session with read/write split
async fn run_session(
    state: &AppState,
    connection: ConnectionHandle,
    mut ws_sink: SplitSink<WebSocket, Message>,
    mut ws_stream: futures::stream::SplitStream<WebSocket>,
    mut outbound_rx: mpsc::Receiver<ServerMsg>,
) {
    let player_id = connection.id();
    let rate_limiter = ConnectionRateLimiter::new(state.config.relay_rate_limit);

    // Spawn writer task: outbound queue -> WebSocket
    let writer_handle = tokio::spawn(async move {
        while let Some(msg) = outbound_rx.recv().await {
            if let Err(e) = send_msg(&mut ws_sink, &msg).await {
                debug!(player_id = %player_id, error = %e, "WebSocket send failed");
                break;
            }
        }
        let _ = ws_sink.close().await;
    });

    // Reader loop: WebSocket -> room store
    while let Some(result) = ws_stream.next().await {
        match result {
            Ok(Message::Text(text)) => {
                if !rate_limiter.check_message() {
                    warn!(player_id = %player_id, "Rate limited message");
                    continue;
                }

                match serde_json::from_str::<ClientMsg>(&text) {
                    Ok(client_msg) => dispatch(state, &connection, client_msg),
                    Err(e) => {
                        warn!(player_id = %player_id, error = %e, "Failed to parse client message");
                    }
                }
            }
            Ok(Message::Binary(_)) => {
                warn!(player_id = %player_id, "Received binary message, ignoring");
            }
            Ok(Message::Ping(_)) => {
                debug!(player_id = %player_id, "Received ping");
            }
            Ok(Message::Pong(_)) => {
                debug!(player_id = %player_id, "Received pong");
            }
            Ok(Message::Close(_)) => {
                info!(player_id = %player_id, "Client initiated close");
                break;
            }
            Err(e) => {
                error!(player_id = %player_id, error = %e, "WebSocket error");
                break;
            }
        }
    }

    // Abort writer task
    writer_handle.abort();
}

/// Route one parsed message
fn dispatch(state: &AppState, connection: &ConnectionHandle, msg: ClientMsg) {
    match msg {
        ClientMsg::CreateRoom => {
            state.rooms.create_room(connection);
        }
        ClientMsg::JoinRoom { room_id } => {
            if let Err(e) = state.rooms.join_room(&room_id, connection) {
                info!(player_id = %connection.id(), room_id = %room_id, error = %e, "Join rejected");
                connection.send(ServerMsg::Error {
                    message: e.to_string(),
                });
            }
        }
        relayable => {
            state.rooms.relay(connection.id(), relayable);
        }
    }
}

/// Send a message over WebSocket
async fn send_msg(sink: &mut SplitSink<WebSocket, Message>, msg: &ServerMsg) -> Result<(), String> {
    let json = serde_json::to_string(msg).map_err(|e| e.to_string())?;
    sink.send(Message::Text(json))
        .await
        .map_err(|e| e.to_string())
}
