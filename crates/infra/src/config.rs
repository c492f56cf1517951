//! Store configuration, read from the environment once at startup.

use thiserror::Error;

pub const USE_PERSISTENT_STORES: &str = "USE_PERSISTENT_STORES";
pub const DATABASE_URL: &str = "DATABASE_URL";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{name} must be `true` or `false`, got `{value}`")]
    InvalidFlag { name: &'static str, value: String },

    #[error("{0} must be set when persistent stores are enabled")]
    Missing(&'static str),
}

/// Which record store backs the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreConfig {
    InMemory,
    Postgres { database_url: String },
}

impl StoreConfig {
    /// Read `USE_PERSISTENT_STORES` and `DATABASE_URL` from the process
    /// environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as [`StoreConfig::from_env`] with an injectable variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let persistent = match lookup(USE_PERSISTENT_STORES) {
            None => false,
            Some(value) => value.trim().parse::<bool>().map_err(|_| ConfigError::InvalidFlag {
                name: USE_PERSISTENT_STORES,
                value,
            })?,
        };

        if !persistent {
            return Ok(StoreConfig::InMemory);
        }

        let database_url = lookup(DATABASE_URL)
            .filter(|url| !url.trim().is_empty())
            .ok_or(ConfigError::Missing(DATABASE_URL))?;

        Ok(StoreConfig::Postgres { database_url })
    }
}
