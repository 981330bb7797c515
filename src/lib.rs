//! Duel Arena - relay server and peer-synchronized client simulation
//!
//! Two players share an arena split down the middle. There is no server
//! authority: each client simulates the match and owns its own player, and
//! the relay only pairs connections into rooms and forwards their messages.
//!
//! - `game`: per-client simulation (grid, walls, players, projectiles, tick)
//! - `sync`: applies relay messages to the simulation and publishes its events
//! - `rooms`, `ws`, `http`: the relay
//! - `client`: headless client transport and tick loop

pub mod app;
pub mod client;
pub mod config;
pub mod game;
pub mod http;
pub mod rooms;
pub mod sync;
pub mod util;
pub mod ws;

pub use app::AppState;
pub use config::{ClientConfig, Config};
pub use http::build_router;
