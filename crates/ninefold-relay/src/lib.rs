//! The ninefold relay
//!
//! A deliberately thin server: it groups WebSocket connections into rooms,
//! fans frames out, and is the single party allowed to roll network-visible
//! randomness. It does not validate moves - peers are trusted to emit legal
//! ones, a stated limitation of the protocol - but it alone decides when the
//! chaos shuffle and role swap fire, and with what permutation.

pub mod registry;
pub mod server;

pub use registry::{PeerHandle, PeerId, RoomRegistry};
pub use server::RelayServer;
