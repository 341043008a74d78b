//! Error types for ninefold
//!
//! Illegal moves are deliberately *not* errors: the rule engine rejects them
//! as a silent no-op (`None`), mirroring how the protocol treats unvalidated
//! peer traffic. The error types here cover everything else: malformed wire
//! data, connection failures and bad configuration.

use thiserror::Error;

// ----------------------------------------------------------------------------
// Specific Error Types
// ----------------------------------------------------------------------------

/// Wire-format and frame-validation errors.
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("shuffle mapping is not a permutation of 0-8")]
    InvalidMapping,
    #[error("board or cell index out of range: {index}")]
    IndexOutOfRange { index: usize },
}

/// Relay-connection errors.
#[derive(Debug, Error)]
pub enum ConnectionError {
    #[error("connect timed out after {duration_ms}ms")]
    ConnectTimeout { duration_ms: u64 },
    #[error("connection closed: {reason}")]
    Closed { reason: String },
}

// ----------------------------------------------------------------------------
// Top-level Error
// ----------------------------------------------------------------------------

/// Unified error type for the ninefold crates.
#[derive(Debug, Error)]
pub enum NinefoldError {
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    #[error("connection error: {0}")]
    Connection(#[from] ConnectionError),

    #[error("configuration error: {reason}")]
    Configuration { reason: String },
}

impl NinefoldError {
    /// Create a configuration error with a reason.
    pub fn config_error<T: Into<String>>(reason: T) -> Self {
        NinefoldError::Configuration {
            reason: reason.into(),
        }
    }

    /// Create a connection-closed error.
    pub fn connection_closed<T: Into<String>>(reason: T) -> Self {
        NinefoldError::Connection(ConnectionError::Closed {
            reason: reason.into(),
        })
    }
}

// ----------------------------------------------------------------------------
// Type Aliases
// ----------------------------------------------------------------------------

pub type Result<T> = core::result::Result<T, NinefoldError>;
pub type NinefoldResult<T> = Result<T>;
