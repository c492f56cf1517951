//! Server configuration, read from the environment once at startup.

use std::net::SocketAddr;

use thiserror::Error;

use onboarding_infra::config::{ConfigError, StoreConfig};

pub const BIND_ADDR: &str = "BIND_ADDR";
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ServerConfigError {
    #[error("BIND_ADDR must be a socket address, got `{0}`")]
    InvalidBindAddr(String),

    #[error(transparent)]
    Store(#[from] ConfigError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    pub store: StoreConfig,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ServerConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ServerConfigError> {
        let raw = lookup(BIND_ADDR).unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = raw
            .trim()
            .parse::<SocketAddr>()
            .map_err(|_| ServerConfigError::InvalidBindAddr(raw.clone()))?;

        let store = StoreConfig::from_lookup(&lookup)?;

        Ok(Self { bind_addr, store })
    }
}
