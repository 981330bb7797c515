//! Configuration module - environment variable parsing

use std::env;
use std::net::SocketAddr;
use std::str::FromStr;

use crate::util::rate_limit::DEFAULT_RELAY_RATE_LIMIT;

/// Relay server configuration loaded from environment variables
#[derive(Clone, Debug)]
pub struct Config {
    /// Server binding address
    pub server_addr: SocketAddr,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Allowed client origins for CORS, comma-separated. Any origin when unset.
    pub client_origin: Option<String>,
    /// Messages per second accepted from one connection
    pub relay_rate_limit: u32,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        // Hosting platforms provide PORT, fall back to SERVER_ADDR or default
        let server_addr = match lookup("PORT") {
            Some(port) => format!("0.0.0.0:{}", port),
            None => lookup("SERVER_ADDR").unwrap_or_else(|| "0.0.0.0:8080".to_string()),
        };

        Ok(Self {
            server_addr: server_addr
                .parse()
                .map_err(|_| ConfigError::InvalidAddress(server_addr.clone()))?,
            log_level: lookup("LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
            client_origin: lookup("CLIENT_ORIGIN").filter(|origin| !origin.trim().is_empty()),
            relay_rate_limit: parse_or(&lookup, "RELAY_RATE_LIMIT", DEFAULT_RELAY_RATE_LIMIT)?,
        })
    }
}

/// Headless client configuration
#[derive(Clone, Debug)]
pub struct ClientConfig {
    /// Relay WebSocket endpoint
    pub server_url: String,
    pub log_level: String,
    /// Simulation ticks per second
    pub tick_rate: u32,
    /// Position updates sent per second
    pub position_rate: u32,
    /// Seconds between full state resyncs
    pub resync_secs: u64,
}

impl ClientConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let server_url =
            lookup("ARENA_SERVER_URL").unwrap_or_else(|| "ws://127.0.0.1:8080/ws".to_string());
        if !(server_url.starts_with("ws://") || server_url.starts_with("wss://")) {
            return Err(ConfigError::InvalidUrl(server_url));
        }

        Ok(Self {
            server_url,
            log_level: lookup("LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
            tick_rate: parse_or(&lookup, "ARENA_TICK_RATE", 60u32)?.max(1),
            position_rate: parse_or(&lookup, "ARENA_POSITION_RATE", 30u32)?.max(1),
            resync_secs: parse_or(&lookup, "ARENA_RESYNC_SECS", 2u64)?.max(1),
        })
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_url: "ws://127.0.0.1:8080/ws".to_string(),
            log_level: "info".to_string(),
            tick_rate: 60,
            position_rate: 30,
            resync_secs: 2,
        }
    }
}

fn parse_or<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidNumber(key)),
        None => Ok(default),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid server address format: {0}")]
    InvalidAddress(String),

    #[error("Environment variable {0} must be a non-negative integer")]
    InvalidNumber(&'static str),

    #[error("Server URL must use ws:// or wss://: {0}")]
    InvalidUrl(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn relay_defaults() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.server_addr.to_string(), "0.0.0.0:8080");
        assert_eq!(config.log_level, "info");
        assert!(config.client_origin.is_none());
        assert_eq!(config.relay_rate_limit, DEFAULT_RELAY_RATE_LIMIT);
    }

    #[test]
    fn port_overrides_server_addr() {
        let config =
            Config::from_lookup(lookup(&[("PORT", "9000"), ("SERVER_ADDR", "127.0.0.1:1")]))
                .unwrap();
        assert_eq!(config.server_addr.port(), 9000);
    }

    #[test]
    fn invalid_values_are_rejected() {
        assert!(matches!(
            Config::from_lookup(lookup(&[("SERVER_ADDR", "nowhere")])),
            Err(ConfigError::InvalidAddress(_))
        ));
        assert!(matches!(
            Config::from_lookup(lookup(&[("RELAY_RATE_LIMIT", "lots")])),
            Err(ConfigError::InvalidNumber("RELAY_RATE_LIMIT"))
        ));
        assert!(matches!(
            ClientConfig::from_lookup(lookup(&[("ARENA_SERVER_URL", "http://x")])),
            Err(ConfigError::InvalidUrl(_))
        ));
    }

    #[test]
    fn client_reads_rates() {
        let config = ClientConfig::from_lookup(lookup(&[
            ("ARENA_TICK_RATE", "120"),
            ("ARENA_RESYNC_SECS", "5"),
        ]))
        .unwrap();
        assert_eq!(config.tick_rate, 120);
        assert_eq!(config.position_rate, 30);
        assert_eq!(config.resync_secs, 5);
        assert_eq!(config.server_url, "ws://127.0.0.1:8080/ws");
    }
}
