//! Runtime configuration
//!
//! Defaults match the original client's behavior: a 5 second connect window,
//! five reconnect attempts with 1s..5s backoff, and an 800-1200ms AI
//! "thinking" delay.

use std::time::Duration;

use serde::{Deserialize, Serialize};

// ----------------------------------------------------------------------------
// Channel Buffers
// ----------------------------------------------------------------------------

/// Buffer sizes for the bounded session channels.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelConfig {
    pub command_buffer_size: usize,
    pub app_event_buffer_size: usize,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            command_buffer_size: 32,
            app_event_buffer_size: 64,
        }
    }
}

// ----------------------------------------------------------------------------
// Relay Connection
// ----------------------------------------------------------------------------

/// Connect and reconnect policy for the relay connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionConfig {
    /// Bound on a single connect attempt.
    pub connect_timeout_ms: u64,
    /// Reconnect attempts before the peer counts as permanently gone.
    pub reconnect_attempts: u32,
    /// Backoff start.
    pub reconnect_delay_ms: u64,
    /// Backoff cap.
    pub reconnect_max_delay_ms: u64,
}

impl ConnectionConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    /// Backoff for attempt `n` (0-based): doubling from the start value,
    /// capped.
    pub fn backoff(&self, attempt: u32) -> Duration {
        let delay = self
            .reconnect_delay_ms
            .saturating_mul(1u64 << attempt.min(16))
            .min(self.reconnect_max_delay_ms);
        Duration::from_millis(delay)
    }
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            connect_timeout_ms: 5_000,
            reconnect_attempts: 5,
            reconnect_delay_ms: 1_000,
            reconnect_max_delay_ms: 5_000,
        }
    }
}

// ----------------------------------------------------------------------------
// AI Timing
// ----------------------------------------------------------------------------

/// Delay band for the automated opponent's non-blocking "thinking" timer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiConfig {
    pub min_delay_ms: u64,
    pub max_delay_ms: u64,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            min_delay_ms: 800,
            max_delay_ms: 1_200,
        }
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backoff_doubles_and_caps() {
        let config = ConnectionConfig::default();
        assert_eq!(config.backoff(0), Duration::from_millis(1_000));
        assert_eq!(config.backoff(1), Duration::from_millis(2_000));
        assert_eq!(config.backoff(2), Duration::from_millis(4_000));
        assert_eq!(config.backoff(3), Duration::from_millis(5_000));
        assert_eq!(config.backoff(30), Duration::from_millis(5_000));
    }
}
