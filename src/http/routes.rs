//! HTTP route definitions

use axum::{
    extract::{Path, State},
    http::{header, Method, StatusCode},
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use serde::Serialize;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::app::AppState;
use crate::game::Side;
use crate::rooms::RoomPhase;
use crate::util::time::uptime_secs;
use crate::ws::handler::ws_handler;
use crate::ws::protocol::{PlayerId, RoomId};

/// Build the application router
pub fn build_router(state: AppState) -> Router {
    let cors = cors_layer(state.config.client_origin.as_deref());

    Router::new()
        .route("/health", get(health_handler))
        .route("/ws", get(ws_handler))
        .route("/rooms/:room_id", get(room_handler))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// CORS for the configured origins (comma-separated), or any origin
fn cors_layer(client_origin: Option<&str>) -> CorsLayer {
    let base = CorsLayer::new()
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    match client_origin {
        Some(origins) => {
            let allowed_origins: Vec<header::HeaderValue> = origins
                .split(',')
                .filter_map(|s| s.trim().parse::<header::HeaderValue>().ok())
                .collect();
            base.allow_origin(allowed_origins)
        }
        None => base.allow_origin(Any),
    }
}

// ============================================================================
// Health endpoint
// ============================================================================

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    uptime_secs: u64,
    active_rooms: usize,
    connections: usize,
}

async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        uptime_secs: uptime_secs(),
        active_rooms: state.rooms.len(),
        connections: state.rooms.connection_count(),
    })
}

// ============================================================================
// Room status
// ============================================================================

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RoomResponse {
    room_id: RoomId,
    phase: &'static str,
    created_at: u64,
    members: Vec<RoomMember>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RoomMember {
    player_id: PlayerId,
    position: Side,
}

async fn room_handler(
    State(state): State<AppState>,
    Path(room_id): Path<String>,
) -> Result<Json<RoomResponse>, AppError> {
    let room_id = RoomId::from(room_id.as_str());
    let room = state
        .rooms
        .get(&room_id)
        .ok_or_else(|| AppError::NotFound(format!("Room {}", room_id)))?;

    let mut members: Vec<RoomMember> = room
        .positions()
        .into_iter()
        .map(|(player_id, position)| RoomMember {
            player_id,
            position,
        })
        .collect();
    members.sort_by_key(|m| m.position == Side::Right);

    Ok(Json(RoomResponse {
        room_id: room.id().clone(),
        phase: match room.phase() {
            RoomPhase::WaitingForSecondPlayer => "waiting_for_second_player",
            RoomPhase::Active => "active",
            RoomPhase::Closing => "closing",
        },
        created_at: room.created_at(),
        members,
    }))
}

// ============================================================================
// Error handling
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match &self {
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, self.to_string()),
        };

        let body = serde_json::json!({
            "error": message
        });

        (status, Json(body)).into_response()
    }
}
