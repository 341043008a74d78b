//! Room bookkeeping and chaos-trigger mirroring
//!
//! The registry maps room ids to connected peers plus an optional last-known
//! game snapshot. The snapshot is never authoritative game state; it exists
//! only so the relay can evaluate the trigger predicates and broadcast
//! `chaos-swap` / `role-swap` events exactly once per game.
//!
//! All mutation happens through `&mut self`; the server serializes access
//! behind one async mutex so a connection can never appear in two rooms.

use std::collections::HashMap;

use rand::Rng;
use tokio::sync::mpsc;
use uuid::Uuid;

use ninefold_core::{
    instability, roleswap, GameState, RoleSwapConfig, RoomId, ServerFrame,
};

// ----------------------------------------------------------------------------
// Peers
// ----------------------------------------------------------------------------

/// Identity of one relay connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PeerId(Uuid);

impl PeerId {
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }
}

impl std::fmt::Display for PeerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A connected peer: its identity plus the outbound frame queue owned by its
/// writer task.
#[derive(Debug, Clone)]
pub struct PeerHandle {
    pub id: PeerId,
    pub sender: mpsc::UnboundedSender<ServerFrame>,
}

impl PeerHandle {
    fn send(&self, frame: ServerFrame) {
        // A failed send means the writer task is gone; the read loop will
        // remove the peer shortly, so dropping the frame here is fine.
        if self.sender.send(frame).is_err() {
            tracing::debug!(peer = %self.id, "dropping frame for disconnected peer");
        }
    }
}

// ----------------------------------------------------------------------------
// Rooms
// ----------------------------------------------------------------------------

#[derive(Debug, Default)]
struct Room {
    peers: Vec<PeerHandle>,
    /// Last snapshot observed from any peer; trigger detection only.
    snapshot: Option<GameState>,
}

impl Room {
    fn broadcast(&self, frame: &ServerFrame) {
        for peer in &self.peers {
            peer.send(frame.clone());
        }
    }

    fn broadcast_except(&self, sender: PeerId, frame: &ServerFrame) {
        for peer in self.peers.iter().filter(|p| p.id != sender) {
            peer.send(frame.clone());
        }
    }

    fn status_frame(&self, game_started: bool) -> ServerFrame {
        ServerFrame::RoomStatus {
            players: self.peers.len(),
            game_started,
        }
    }
}

// ----------------------------------------------------------------------------
// Registry
// ----------------------------------------------------------------------------

/// Server-side map of rooms and their peers.
#[derive(Debug)]
pub struct RoomRegistry {
    rooms: HashMap<RoomId, Room>,
    membership: HashMap<PeerId, RoomId>,
    role_swap: RoleSwapConfig,
}

impl RoomRegistry {
    pub fn new() -> Self {
        Self::with_role_swap(RoleSwapConfig::relay())
    }

    pub fn with_role_swap(role_swap: RoleSwapConfig) -> Self {
        Self {
            rooms: HashMap::new(),
            membership: HashMap::new(),
            role_swap,
        }
    }

    /// Number of live rooms.
    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    /// Add `peer` to `room_id`, leaving any previous room first, then
    /// broadcast the updated roster. The game counts as started once two
    /// peers are present.
    pub fn join(&mut self, room_id: RoomId, peer: PeerHandle) {
        self.leave_silently(peer.id);

        let room = self.rooms.entry(room_id.clone()).or_default();
        room.peers.push(peer.clone());
        self.membership.insert(peer.id, room_id.clone());

        let players = room.peers.len();
        tracing::info!(peer = %peer.id, room = %room_id, players, "peer joined");
        room.broadcast(&room.status_frame(players >= 2));
    }

    /// Remove `peer_id` from its room (leave or disconnect). The emptied
    /// room is deleted; otherwise the remaining peers get a roster update
    /// with the game flagged as not started.
    pub fn leave(&mut self, peer_id: PeerId) {
        let Some(room_id) = self.membership.remove(&peer_id) else {
            return;
        };
        let Some(room) = self.rooms.get_mut(&room_id) else {
            return;
        };
        room.peers.retain(|p| p.id != peer_id);
        tracing::info!(peer = %peer_id, room = %room_id, "peer left");

        if room.peers.is_empty() {
            self.rooms.remove(&room_id);
        } else {
            let frame = room.status_frame(false);
            room.broadcast(&frame);
        }
    }

    /// Forward a raw move to every *other* peer in the sender's room.
    /// The relay never validates moves; each receiving peer's engine does.
    pub fn relay_move(&mut self, peer_id: PeerId, board_index: usize, cell_index: usize) {
        let Some(room) = self.room_of(peer_id) else {
            return;
        };
        tracing::debug!(peer = %peer_id, board_index, cell_index, "relaying move");
        room.broadcast_except(
            peer_id,
            &ServerFrame::Move {
                board_index,
                cell_index,
            },
        );
    }

    /// Store a peer's snapshot and evaluate the chaos triggers on it.
    ///
    /// When the instability predicate holds, the relay generates the one
    /// authoritative permutation and broadcasts it to the whole room; when
    /// the role-swap gate opens, it flips the one authoritative coin.
    pub fn observe_state<R: Rng + ?Sized>(
        &mut self,
        peer_id: PeerId,
        snapshot: GameState,
        rng: &mut R,
    ) {
        let role_swap = self.role_swap;
        let Some(room_id) = self.membership.get(&peer_id).cloned() else {
            return;
        };
        let Some(room) = self.rooms.get_mut(&room_id) else {
            return;
        };

        if instability::should_trigger(&snapshot) {
            let mapping = instability::generate_mapping(rng);
            tracing::info!(room = %room_id, ?mapping, "broadcasting chaos swap");
            room.broadcast(&ServerFrame::ChaosSwap {
                shuffle_mapping: mapping,
            });
        }

        if roleswap::should_trigger(&snapshot, &role_swap, rng) {
            tracing::info!(room = %room_id, "broadcasting role swap");
            room.broadcast(&ServerFrame::RoleSwap);
        }

        room.snapshot = Some(snapshot);
    }

    /// Clear the stored snapshot and forward a reset to the other peers.
    pub fn relay_reset(&mut self, peer_id: PeerId) {
        let Some(room_id) = self.membership.get(&peer_id).cloned() else {
            return;
        };
        let Some(room) = self.rooms.get_mut(&room_id) else {
            return;
        };
        tracing::info!(room = %room_id, "relaying reset");
        room.snapshot = None;
        room.broadcast_except(peer_id, &ServerFrame::Reset);
    }

    /// Remove a peer without notifying its old room; used when rejoining so
    /// the join broadcast is the only roster update peers see.
    fn leave_silently(&mut self, peer_id: PeerId) {
        let Some(room_id) = self.membership.remove(&peer_id) else {
            return;
        };
        if let Some(room) = self.rooms.get_mut(&room_id) {
            room.peers.retain(|p| p.id != peer_id);
            if room.peers.is_empty() {
                self.rooms.remove(&room_id);
            }
        }
    }

    fn room_of(&mut self, peer_id: PeerId) -> Option<&mut Room> {
        let room_id = self.membership.get(&peer_id)?;
        self.rooms.get_mut(room_id)
    }
}

impl Default for RoomRegistry {
    fn default() -> Self {
        Self::new()
    }
}
