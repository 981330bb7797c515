//! Headless client that patrols its half and fires on a timer
//!
//! Usage: `duel_arena_bot [ROOM_ID]`. Without a room id it creates a room
//! and logs the id to share; with one it joins that room.

use std::time::Duration;

use tokio::time::interval;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use duel_arena::client::ClientSession;
use duel_arena::game::HeldKeys;
use duel_arena::sync::SyncNotice;
use duel_arena::ws::protocol::RoomId;
use duel_arena::ClientConfig;

const PATROL_INTERVAL: Duration = Duration::from_millis(800);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = ClientConfig::from_env()?;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .init();

    let room = std::env::args().nth(1).map(|id| RoomId::from(id.as_str()));

    let (session, mut handle) = ClientSession::connect(config).await?;
    let session_task = tokio::spawn(session.run());

    match room {
        Some(room_id) => handle.join_room(room_id).await?,
        None => handle.create_room().await?,
    }

    let mut patrol = interval(PATROL_INTERVAL);
    let mut heading_down = false;

    loop {
        tokio::select! {
            notice = handle.next_notice() => match notice {
                Some(SyncNotice::RoomCreated { room_id, side }) => {
                    info!(room_id = %room_id, side = %side, "Room created, waiting for opponent");
                }
                Some(SyncNotice::RoomNotFound) => {
                    warn!("Room not found");
                    break;
                }
                Some(SyncNotice::RoomFull) => {
                    warn!("Room is full");
                    break;
                }
                Some(SyncNotice::PeerDisconnected { message }) => {
                    info!(message = %message, "Match over");
                    break;
                }
                Some(other) => info!(notice = ?other, "Session notice"),
                None => break,
            },

            _ = patrol.tick() => {
                heading_down = !heading_down;
                handle.set_keys(HeldKeys {
                    up: !heading_down,
                    down: heading_down,
                    ..HeldKeys::default()
                });
                handle.fire();
            }

            _ = tokio::signal::ctrl_c() => {
                info!("Received Ctrl+C, leaving");
                break;
            }
        }
    }

    drop(handle);
    match session_task.await? {
        Ok(()) => info!("Session closed"),
        Err(e) => warn!(error = %e, "Session ended with error"),
    }
    Ok(())
}
