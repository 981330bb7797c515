//! WebSocket protocol and relay session

pub mod handler;
pub mod protocol;
