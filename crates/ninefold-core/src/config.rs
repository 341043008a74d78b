//! Engine configuration
//!
//! The role-swap gate is the one knob that differs between deployments: the
//! single-process engine waits for five post-shuffle moves while the relay
//! mirror fires after two. Both values ship as named constructors so neither
//! path hard-codes the other's threshold.

use serde::{Deserialize, Serialize};

// ----------------------------------------------------------------------------
// Role Swap Configuration
// ----------------------------------------------------------------------------

/// Gate for the one-shot role swap.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RoleSwapConfig {
    /// Exact `post_shuffle_moves` count at which the gate opens.
    pub threshold: u32,
    /// Probability that the swap fires once the gate is open.
    pub probability: f64,
}

impl RoleSwapConfig {
    /// Gate used by the local and AI game loop (5 moves after the shuffle).
    pub fn local() -> Self {
        Self {
            threshold: 5,
            probability: 0.5,
        }
    }

    /// Gate mirrored on the relay (2 moves after the shuffle).
    ///
    /// The local/relay threshold mismatch is inherited behavior, kept as-is
    /// pending a product decision on which count is intended.
    pub fn relay() -> Self {
        Self {
            threshold: 2,
            probability: 0.5,
        }
    }

    /// A gate that always fires at the threshold. Testing only.
    pub fn certain(threshold: u32) -> Self {
        Self {
            threshold,
            probability: 1.0,
        }
    }
}

impl Default for RoleSwapConfig {
    fn default() -> Self {
        Self::local()
    }
}
