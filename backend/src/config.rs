//! Server configuration from the environment

use std::net::SocketAddr;
use thiserror::Error;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
pub const DEFAULT_DATABASE_URL: &str = "sqlite:chess.db";
pub const DEFAULT_OUTBOUND_BUFFER: usize = 64;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid BIND_ADDR {value:?}: {source}")]
    InvalidBindAddr {
        value: String,
        source: std::net::AddrParseError,
    },

    #[error("invalid OUTBOUND_BUFFER {value:?}: expected a positive integer")]
    InvalidOutboundBuffer { value: String },
}

/// Where game records live
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreBackend {
    Memory,
    Sqlite(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    pub store: StoreBackend,
    /// Capacity of each connection's outbound queue
    pub outbound_buffer: usize,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let bind_addr = lookup("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = bind_addr
            .parse::<SocketAddr>()
            .map_err(|source| ConfigError::InvalidBindAddr {
                value: bind_addr.clone(),
                source,
            })?;

        let store = match lookup("DATABASE_URL") {
            Some(url) if url == "memory" => StoreBackend::Memory,
            Some(url) => StoreBackend::Sqlite(url),
            None => StoreBackend::Sqlite(DEFAULT_DATABASE_URL.to_string()),
        };

        let outbound_buffer = match lookup("OUTBOUND_BUFFER") {
            Some(value) => match value.parse::<usize>() {
                Ok(n) if n > 0 => n,
                _ => return Err(ConfigError::InvalidOutboundBuffer { value }),
            },
            None => DEFAULT_OUTBOUND_BUFFER,
        };

        Ok(Self {
            bind_addr,
            store,
            outbound_buffer,
        })
    }
}
