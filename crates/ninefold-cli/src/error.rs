//! Error handling for the ninefold CLI

use thiserror::Error;

/// CLI-specific error types
#[derive(Error, Debug)]
pub enum CliError {
    #[error("engine error: {0}")]
    Core(#[from] ninefold_core::NinefoldError),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("invalid room code: {0}")]
    RoomCode(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlParsing(#[from] toml::de::Error),

    #[error("invalid address: {0}")]
    Address(#[from] std::net::AddrParseError),
}

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;

impl From<anyhow::Error> for CliError {
    fn from(err: anyhow::Error) -> Self {
        CliError::Config(err.to_string())
    }
}
