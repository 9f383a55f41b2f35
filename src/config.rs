use log::warn;
use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Server settings, read once at startup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub bind_addr: String,
    pub static_dir: String,
    /// How often the server pings each websocket client
    pub heartbeat_interval: Duration,
    /// Silence after which a websocket client is dropped
    pub client_timeout: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:8080".to_string(),
            static_dir: "./static".to_string(),
            heartbeat_interval: Duration::from_secs(5),
            client_timeout: Duration::from_secs(10),
        }
    }
}

impl ServerConfig {
    /// Load from `CHESS_*` environment variables, keeping defaults for
    /// anything unset or unparsable
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            bind_addr: lookup("CHESS_BIND_ADDR").unwrap_or(defaults.bind_addr),
            static_dir: lookup("CHESS_STATIC_DIR").unwrap_or(defaults.static_dir),
            heartbeat_interval: Duration::from_secs(parse_or(
                &lookup,
                "CHESS_HEARTBEAT_SECS",
                defaults.heartbeat_interval.as_secs(),
            )),
            client_timeout: Duration::from_secs(parse_or(
                &lookup,
                "CHESS_CLIENT_TIMEOUT_SECS",
                defaults.client_timeout.as_secs(),
            )),
        }
    }
}

fn parse_or<T: FromStr + Copy + std::fmt::Display>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> T {
    match lookup(key) {
        None => default,
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!("Ignoring {}={:?}, using {}", key, raw, default);
            default
        }),
    }
}
