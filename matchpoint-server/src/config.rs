use std::env;

use thiserror::Error;

/// The default port the server will listen on.
pub const DEFAULT_PORT: u16 = 9070;

const DEFAULT_SENTINEL: &str = "Synthetic Test User";

/// Runtime configuration, read from the environment at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub store_url: String,
    pub identity_url: String,
    pub push_url: String,
    pub push_key: String,
    /// Display name marking synthetic test accounts for cleanup
    pub sentinel: String,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{0} must be a number")]
    NotANumber(&'static str),
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let port = match env::var("MATCHPOINT_SERVER_PORT") {
            Ok(raw) => raw
                .parse()
                .map_err(|_| ConfigError::NotANumber("MATCHPOINT_SERVER_PORT"))?,
            Err(_) => DEFAULT_PORT,
        };

        Ok(Self {
            port,
            store_url: required("MATCHPOINT_STORE_URL")?,
            identity_url: required("MATCHPOINT_IDENTITY_URL")?,
            push_url: required("MATCHPOINT_PUSH_URL")?,
            push_key: required("MATCHPOINT_PUSH_KEY")?,
            sentinel: env::var("MATCHPOINT_CLEANUP_SENTINEL")
                .unwrap_or_else(|_| DEFAULT_SENTINEL.to_string()),
        })
    }
}

fn required(name: &'static str) -> Result<String, ConfigError> {
    env::var(name).map_err(|_| ConfigError::Missing(name))
}
