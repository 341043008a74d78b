//! Core rules and wire protocol for ninefold
//!
//! Ninefold is Ultimate Tic-Tac-Toe with two chaos mechanics layered on top:
//! a one-shot random relocation of the nine small boards ("instability") and
//! a probabilistic reassignment of which player controls X vs O ("role swap").
//!
//! This crate is the pure half of the system. It contains:
//! - [`state::GameState`] and the move-application rules ([`engine`])
//! - the chaos trigger predicates and mutations ([`instability`], [`roleswap`])
//! - the greedy AI move provider ([`ai`])
//! - the JSON frame types exchanged with the relay ([`protocol`])
//!
//! Nothing here performs I/O. All randomness is injected, so both the relay
//! and the tests can control exactly when and what is rolled.

pub mod ai;
pub mod board;
pub mod config;
pub mod engine;
pub mod errors;
pub mod instability;
pub mod protocol;
pub mod roleswap;
pub mod state;
pub mod types;

pub use config::RoleSwapConfig;
pub use engine::{CascadePolicy, RuleEngine};
pub use errors::{NinefoldError, NinefoldResult};
pub use protocol::{ClientFrame, ServerFrame};
pub use state::GameState;
pub use types::{BoardStatus, Move, Player, RoomId, ShuffleMapping};
