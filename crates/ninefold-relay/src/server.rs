//! WebSocket front end for the room registry
//!
//! One accept loop, one task per connection, one writer task per peer. The
//! read side decodes client frames and dispatches them into the registry
//! under a single mutex; the write side drains the peer's outbound queue.
//! Any socket error or close tears the connection down as a `leave`.

use std::net::SocketAddr;
use std::sync::Arc;

use futures::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{mpsc, Mutex};
use tokio_tungstenite::tungstenite::Message;

use ninefold_core::{ClientFrame, NinefoldError, NinefoldResult, RoleSwapConfig};

use crate::registry::{PeerHandle, PeerId, RoomRegistry};

// ----------------------------------------------------------------------------
// Relay Server
// ----------------------------------------------------------------------------

/// The relay process: a TCP accept loop feeding per-connection tasks.
pub struct RelayServer {
    registry: Arc<Mutex<RoomRegistry>>,
}

impl RelayServer {
    pub fn new() -> Self {
        Self::with_role_swap(RoleSwapConfig::relay())
    }

    pub fn with_role_swap(role_swap: RoleSwapConfig) -> Self {
        Self {
            registry: Arc::new(Mutex::new(RoomRegistry::with_role_swap(role_swap))),
        }
    }

    /// Bind and serve until the process is stopped.
    pub async fn run(&self, addr: SocketAddr) -> NinefoldResult<()> {
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            NinefoldError::config_error(format!("failed to bind {addr}: {e}"))
        })?;
        tracing::info!(%addr, "relay listening");

        loop {
            let (stream, remote) = match listener.accept().await {
                Ok(accepted) => accepted,
                Err(e) => {
                    tracing::warn!(error = %e, "accept failed");
                    continue;
                }
            };
            let registry = Arc::clone(&self.registry);
            tokio::spawn(async move {
                if let Err(e) = handle_connection(registry, stream, remote).await {
                    tracing::debug!(%remote, error = %e, "connection ended with error");
                }
            });
        }
    }

    /// Shared registry handle, exposed for tests.
    pub fn registry(&self) -> Arc<Mutex<RoomRegistry>> {
        Arc::clone(&self.registry)
    }
}

impl Default for RelayServer {
    fn default() -> Self {
        Self::new()
    }
}

// ----------------------------------------------------------------------------
// Per-connection Handling
// ----------------------------------------------------------------------------

async fn handle_connection(
    registry: Arc<Mutex<RoomRegistry>>,
    stream: TcpStream,
    remote: SocketAddr,
) -> NinefoldResult<()> {
    let ws = tokio_tungstenite::accept_async(stream)
        .await
        .map_err(|e| NinefoldError::connection_closed(e.to_string()))?;
    let (mut write, mut read) = ws.split();

    let peer_id = PeerId::random();
    tracing::info!(peer = %peer_id, %remote, "peer connected");

    // Writer task: drain the outbound queue into the socket.
    let (tx, mut rx) = mpsc::unbounded_channel();
    let writer = tokio::spawn(async move {
        while let Some(frame) = rx.recv().await {
            let text = match ninefold_core::ServerFrame::encode(&frame) {
                Ok(text) => text,
                Err(e) => {
                    tracing::warn!(error = %e, "failed to encode outbound frame");
                    continue;
                }
            };
            if write.send(Message::Text(text)).await.is_err() {
                break;
            }
        }
        let _ = write.close().await;
    });

    let handle = PeerHandle {
        id: peer_id,
        sender: tx,
    };

    // Read loop: decode and dispatch until the socket closes.
    while let Some(message) = read.next().await {
        let message = match message {
            Ok(m) => m,
            Err(e) => {
                tracing::debug!(peer = %peer_id, error = %e, "read error");
                break;
            }
        };
        let text = match message {
            Message::Text(text) => text,
            Message::Close(_) => break,
            // Pings are answered by tungstenite; everything else is ignored.
            _ => continue,
        };

        let frame = match ClientFrame::decode(&text) {
            Ok(frame) => frame,
            Err(e) => {
                tracing::warn!(peer = %peer_id, error = %e, "ignoring malformed frame");
                continue;
            }
        };

        let mut registry = registry.lock().await;
        match frame {
            ClientFrame::Join { room_id } => registry.join(room_id, handle.clone()),
            ClientFrame::Leave => registry.leave(peer_id),
            ClientFrame::Move {
                board_index,
                cell_index,
            } => registry.relay_move(peer_id, board_index, cell_index),
            ClientFrame::GameState { game_state } => {
                registry.observe_state(peer_id, game_state, &mut rand::thread_rng())
            }
            ClientFrame::Reset => registry.relay_reset(peer_id),
        }
    }

    registry.lock().await.leave(peer_id);
    writer.abort();
    tracing::info!(peer = %peer_id, "peer disconnected");
    Ok(())
}
