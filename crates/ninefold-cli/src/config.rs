//! Ninefold CLI configuration management
//!
//! Layered configuration loading with figment, in priority order:
//! CLI args > environment variables (NINEFOLD_*) > ninefold.toml > defaults.

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use ninefold_runtime::{AiConfig, ConnectionConfig};

use crate::error::{CliError, Result};

// ----------------------------------------------------------------------------
// CLI Application Configuration
// ----------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Relay launcher settings
    pub relay: RelaySection,

    /// Online client settings
    pub client: ClientSection,

    /// AI thinking delay settings
    pub ai: AiSection,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelaySection {
    /// Address the relay binds to
    pub bind: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientSection {
    /// WebSocket URL of the relay
    pub relay_url: String,

    /// Handshake timeout in milliseconds
    pub connect_timeout_ms: u64,

    /// Reconnection attempts before giving up
    pub reconnect_attempts: u32,

    /// Initial reconnection delay in milliseconds (doubles per attempt)
    pub reconnect_delay_ms: u64,

    /// Reconnection delay ceiling in milliseconds
    pub reconnect_max_delay_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiSection {
    pub min_delay_ms: u64,
    pub max_delay_ms: u64,
}

// ----------------------------------------------------------------------------
// Default Implementations
// ----------------------------------------------------------------------------

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            relay: RelaySection {
                bind: "127.0.0.1:8081".to_string(),
            },
            client: ClientSection::default(),
            ai: AiSection::default(),
        }
    }
}

impl Default for ClientSection {
    fn default() -> Self {
        let connection = ConnectionConfig::default();
        Self {
            relay_url: "ws://127.0.0.1:8081".to_string(),
            connect_timeout_ms: connection.connect_timeout_ms,
            reconnect_attempts: connection.reconnect_attempts,
            reconnect_delay_ms: connection.reconnect_delay_ms,
            reconnect_max_delay_ms: connection.reconnect_max_delay_ms,
        }
    }
}

impl Default for AiSection {
    fn default() -> Self {
        let ai = AiConfig::default();
        Self {
            min_delay_ms: ai.min_delay_ms,
            max_delay_ms: ai.max_delay_ms,
        }
    }
}

// ----------------------------------------------------------------------------
// Loading
// ----------------------------------------------------------------------------

impl AppConfig {
    pub fn load() -> Result<Self> {
        let figment = Figment::new()
            .merge(Serialized::defaults(Self::default()))
            .merge(Toml::file("ninefold.toml"))
            .merge(Env::prefixed("NINEFOLD_").split("_"));
        figment
            .extract()
            .map_err(|err| CliError::Config(err.to_string()))
    }

    pub fn load_from_file<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let figment = Figment::new()
            .merge(Serialized::defaults(Self::default()))
            .merge(Toml::file(path.as_ref()));
        figment
            .extract()
            .map_err(|err| CliError::Config(err.to_string()))
    }

    pub fn connection_config(&self) -> ConnectionConfig {
        ConnectionConfig {
            connect_timeout_ms: self.client.connect_timeout_ms,
            reconnect_attempts: self.client.reconnect_attempts,
            reconnect_delay_ms: self.client.reconnect_delay_ms,
            reconnect_max_delay_ms: self.client.reconnect_max_delay_ms,
        }
    }

    pub fn ai_config(&self) -> AiConfig {
        AiConfig {
            min_delay_ms: self.ai.min_delay_ms,
            max_delay_ms: self.ai.max_delay_ms,
        }
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
