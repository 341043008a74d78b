//! Peer session engine for ninefold
//!
//! One peer runs exactly one [`session::GameSession`] at a time, driven by a
//! [`task::SessionTask`] event loop. All inter-task communication flows
//! through the typed channels in [`channel`]: `Command` (UI to session),
//! `SessionEvent` (relay connection to session), `Effect` (session to relay
//! connection) and `AppEvent` (session to UI).
//!
//! The session is single-threaded and atomic per move; the only concurrency
//! is across peers, mediated by the relay.

pub mod channel;
pub mod config;
pub mod connection;
pub mod session;
pub mod task;

pub use channel::{
    create_app_event_channel, create_command_channel, create_session_event_channel, AppEvent,
    AppEventReceiver, AppEventSender, Command, CommandReceiver, CommandSender, ConnectionStatus,
    Effect, SessionEvent, SessionEventReceiver, SessionEventSender,
};
pub use config::{AiConfig, ChannelConfig, ConnectionConfig};
pub use connection::RelayConnection;
pub use session::{GameMode, GameSession};
pub use task::SessionTask;
