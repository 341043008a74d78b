//! Wire protocol between peers and the relay
//!
//! Room-scoped JSON frames over a WebSocket. The protocol is not
//! authoritative: moves are relayed raw and unvalidated, and full snapshots
//! flow to the relay purely so it can evaluate the chaos triggers. The relay
//! is the single source of truth for *when* a shuffle or role swap happens
//! and *what* permutation is used; peers therefore apply incoming moves with
//! the cascade suppressed and never roll network-visible randomness locally.

use serde::{Deserialize, Serialize};

use crate::errors::Result;
use crate::state::GameState;
use crate::types::{RoomId, ShuffleMapping};

// ----------------------------------------------------------------------------
// Peer -> Relay
// ----------------------------------------------------------------------------

/// Frames a peer sends to the relay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ClientFrame {
    /// Enter a room; the relay answers with a `room-status` broadcast.
    #[serde(rename_all = "camelCase")]
    Join { room_id: RoomId },
    /// Leave the current room.
    Leave,
    /// A raw move, forwarded verbatim to the other peers in the room.
    #[serde(rename_all = "camelCase")]
    Move {
        board_index: usize,
        cell_index: usize,
    },
    /// Full snapshot for server-side trigger detection only.
    #[serde(rename_all = "camelCase")]
    GameState { game_state: GameState },
    /// Restart the game for the whole room.
    Reset,
}

// ----------------------------------------------------------------------------
// Relay -> Peer
// ----------------------------------------------------------------------------

/// Frames the relay sends to peers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ServerFrame {
    /// Current roster of the room; `game_started` once two peers are present.
    #[serde(rename_all = "camelCase")]
    RoomStatus { players: usize, game_started: bool },
    /// A move made by another peer.
    #[serde(rename_all = "camelCase")]
    Move {
        board_index: usize,
        cell_index: usize,
    },
    /// The authoritative shuffle permutation; every peer applies it as-is.
    #[serde(rename_all = "camelCase")]
    ChaosSwap { shuffle_mapping: ShuffleMapping },
    /// Each peer flips its local symbol-to-controller assignment.
    RoleSwap,
    /// Reinitialize the game.
    Reset,
}

// ----------------------------------------------------------------------------
// Encoding
// ----------------------------------------------------------------------------

impl ClientFrame {
    pub fn encode(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn decode(raw: &str) -> Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }
}

impl ServerFrame {
    pub fn encode(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn decode(raw: &str) -> Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
