//! WebSocket client connection to the relay
//!
//! [`RelayConnection::open`] performs a bounded connect-and-await: it either
//! returns an established socket within the configured timeout or fails with
//! an error, never leaving the caller polling a half-open handle. After the
//! first successful connect, a background driver owns the socket, pumps
//! decoded [`ServerFrame`]s into the session event channel, and transparently
//! reconnects with capped exponential backoff when the link drops.

use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

use ninefold_core::errors::ConnectionError;
use ninefold_core::{ClientFrame, NinefoldError, NinefoldResult, ServerFrame};

use crate::channel::{SessionEvent, SessionEventSender};
use crate::config::ConnectionConfig;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Why a socket run ended.
enum SocketEnd {
    /// The link failed or the relay closed it; the driver should reconnect.
    Remote(String),
    /// The session dropped its side; the driver should exit.
    Local,
}

// ----------------------------------------------------------------------------
// RelayConnection
// ----------------------------------------------------------------------------

/// Handle to a live relay link. Dropping it does not close the socket;
/// call [`RelayConnection::shutdown`] or drop the outgoing sender.
pub struct RelayConnection {
    outgoing: mpsc::UnboundedSender<ClientFrame>,
    driver: JoinHandle<()>,
}

impl RelayConnection {
    /// Connect to the relay at `url`, failing if the handshake does not
    /// complete within the configured timeout.
    pub async fn open(
        url: String,
        config: ConnectionConfig,
        events: SessionEventSender,
    ) -> NinefoldResult<Self> {
        let socket = connect(&url, &config).await?;
        tracing::info!(%url, "connected to relay");
        let (outgoing, outgoing_rx) = mpsc::unbounded_channel();
        let driver = tokio::spawn(drive(url, config, socket, outgoing_rx, events));
        Ok(Self { outgoing, driver })
    }

    /// Queue a frame for the relay. Frames sent during a reconnect window
    /// stay queued and flush once the link is back.
    pub fn send(&self, frame: ClientFrame) -> NinefoldResult<()> {
        self.outgoing
            .send(frame)
            .map_err(|_| NinefoldError::connection_closed("connection driver stopped"))
    }

    pub fn shutdown(&self) {
        self.driver.abort();
    }
}

// ----------------------------------------------------------------------------
// Driver
// ----------------------------------------------------------------------------

async fn connect(url: &str, config: &ConnectionConfig) -> NinefoldResult<WsStream> {
    let handshake = tokio::time::timeout(config.connect_timeout(), connect_async(url))
        .await
        .map_err(|_| ConnectionError::ConnectTimeout {
            duration_ms: config.connect_timeout_ms,
        })?;
    let (socket, _) = handshake.map_err(|err| NinefoldError::connection_closed(err.to_string()))?;
    Ok(socket)
}

async fn drive(
    url: String,
    config: ConnectionConfig,
    mut socket: WsStream,
    mut outgoing: mpsc::UnboundedReceiver<ClientFrame>,
    events: SessionEventSender,
) {
    if events.send(SessionEvent::Connected).is_err() {
        return;
    }
    loop {
        match run_socket(&mut socket, &mut outgoing, &events).await {
            SocketEnd::Local => return,
            SocketEnd::Remote(reason) => {
                if events.send(SessionEvent::Disconnected { reason }).is_err() {
                    return;
                }
            }
        }
        match reconnect(&url, &config).await {
            Some(next) => {
                socket = next;
                if events.send(SessionEvent::Connected).is_err() {
                    return;
                }
            }
            None => {
                let _ = events.send(SessionEvent::ReconnectExhausted {
                    attempts: config.reconnect_attempts,
                });
                return;
            }
        }
    }
}

/// Pump one socket until it ends, interleaving outgoing frames with
/// incoming messages.
async fn run_socket(
    socket: &mut WsStream,
    outgoing: &mut mpsc::UnboundedReceiver<ClientFrame>,
    events: &SessionEventSender,
) -> SocketEnd {
    loop {
        tokio::select! {
            frame = outgoing.recv() => {
                let Some(frame) = frame else {
                    let _ = socket.close(None).await;
                    return SocketEnd::Local;
                };
                let text = match frame.encode() {
                    Ok(text) => text,
                    Err(err) => {
                        tracing::error!(error = %err, "dropping unencodable frame");
                        continue;
                    }
                };
                if let Err(err) = socket.send(Message::Text(text)).await {
                    return SocketEnd::Remote(err.to_string());
                }
            }
            message = socket.next() => match message {
                Some(Ok(Message::Text(text))) => match ServerFrame::decode(&text) {
                    Ok(frame) => {
                        if events.send(SessionEvent::Frame(frame)).is_err() {
                            return SocketEnd::Local;
                        }
                    }
                    Err(err) => {
                        tracing::warn!(error = %err, raw = %text, "ignoring undecodable frame");
                    }
                },
                Some(Ok(Message::Close(_))) => {
                    return SocketEnd::Remote("closed by relay".to_string());
                }
                Some(Ok(_)) => {}
                Some(Err(err)) => return SocketEnd::Remote(err.to_string()),
                None => return SocketEnd::Remote("stream ended".to_string()),
            }
        }
    }
}

/// Bounded reconnect loop: sleep, dial, repeat, up to the configured
/// attempt count.
async fn reconnect(url: &str, config: &ConnectionConfig) -> Option<WsStream> {
    for attempt in 0..config.reconnect_attempts {
        tokio::time::sleep(config.backoff(attempt)).await;
        match connect(url, config).await {
            Ok(socket) => {
                tracing::info!(%url, attempt, "reconnected to relay");
                return Some(socket);
            }
            Err(err) => {
                tracing::warn!(error = %err, attempt, "reconnect attempt failed");
            }
        }
    }
    None
}
