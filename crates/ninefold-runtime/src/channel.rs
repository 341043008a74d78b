//! Typed channel protocol between the UI, the session and the connection
//!
//! All inter-task communication flows through these message types. The UI
//! never touches `GameState` directly; it sends [`Command`]s and renders the
//! [`AppEvent`] stream.

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use ninefold_core::{ClientFrame, GameState, Move, Player, RoomId, ServerFrame, ShuffleMapping};

use crate::config::ChannelConfig;

// ----------------------------------------------------------------------------
// Command: UI -> Session
// ----------------------------------------------------------------------------

/// Player intents from the UI.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Place a mark.
    PlayCell(Move),
    /// Restart the game (relayed to the room in online mode).
    Reset,
    /// The presentation layer consumed the one-shot animation signals.
    ClearAnimationFlags,
    /// Leave the room / return to the menu; tears the session down.
    Shutdown,
}

// ----------------------------------------------------------------------------
// SessionEvent: Connection -> Session
// ----------------------------------------------------------------------------

/// Events surfaced by the relay connection.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// A decoded frame from the relay.
    Frame(ServerFrame),
    /// The socket is up (initial connect or successful reconnect).
    Connected,
    /// The socket dropped; a bounded reconnect is in flight.
    Disconnected { reason: String },
    /// Reconnection gave up; the peer must re-join explicitly.
    ReconnectExhausted { attempts: u32 },
}

// ----------------------------------------------------------------------------
// Effect: Session -> Connection
// ----------------------------------------------------------------------------

/// Outbound side effects. With no live connection these become logged no-ops.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    SendFrame(ClientFrame),
}

// ----------------------------------------------------------------------------
// AppEvent: Session -> UI
// ----------------------------------------------------------------------------

/// Connection state as shown to the player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConnectionStatus {
    /// Online and an opponent is present.
    Connected,
    /// Online, waiting for an opponent (or for the socket).
    Waiting,
    Disconnected,
}

/// Everything the presentation layer needs to render.
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    /// The authoritative state changed; always carries the full new value.
    StateChanged(GameState),
    /// One-shot: boards were just relocated through this permutation.
    ShuffleHappened(ShuffleMapping),
    /// One-shot: the controller mapping flipped; this peer now plays as
    /// `local_symbol`.
    RoleSwapped { local_symbol: Player },
    /// Roster update for the current room.
    RoomStatus { players: usize, game_started: bool },
    /// This peer's symbol assignment (first joiner plays X).
    SymbolAssigned(Player),
    ConnectionChanged(ConnectionStatus),
    /// The room was joined and traffic may flow.
    JoinedRoom(RoomId),
}

// ----------------------------------------------------------------------------
// Channel Constructors
// ----------------------------------------------------------------------------

pub type CommandSender = mpsc::Sender<Command>;
pub type CommandReceiver = mpsc::Receiver<Command>;
pub type SessionEventSender = mpsc::UnboundedSender<SessionEvent>;
pub type SessionEventReceiver = mpsc::UnboundedReceiver<SessionEvent>;
pub type AppEventSender = mpsc::Sender<AppEvent>;
pub type AppEventReceiver = mpsc::Receiver<AppEvent>;

pub fn create_command_channel(config: &ChannelConfig) -> (CommandSender, CommandReceiver) {
    mpsc::channel(config.command_buffer_size)
}

/// Connection events are unbounded: the read loop must never block on a slow
/// session, and frame volume is tiny (one per move).
pub fn create_session_event_channel() -> (SessionEventSender, SessionEventReceiver) {
    mpsc::unbounded_channel()
}

pub fn create_app_event_channel(config: &ChannelConfig) -> (AppEventSender, AppEventReceiver) {
    mpsc::channel(config.app_event_buffer_size)
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
