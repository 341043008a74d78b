//! Session event loop
//!
//! [`SessionTask`] drives a [`GameSession`] with a single `tokio::select!`
//! loop over three sources: UI commands, relay session events, and the AI
//! thinking timer. Effects go out to the relay connection, app events go
//! out to the UI channel.
//!
//! The AI timer is armed lazily after every state transition and carries the
//! generation it was armed with; `GameSession::handle_ai_timer` discards a
//! fire whose generation no longer matches, so resets, shuffles and role
//! swaps cancel in-flight thinking without any shared flags.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio::time::{sleep_until, Instant};

use crate::channel::{
    AppEvent, AppEventSender, Command, CommandReceiver, Effect, SessionEventReceiver,
};
use crate::config::AiConfig;
use crate::connection::RelayConnection;
use crate::session::GameSession;

pub struct SessionTask {
    session: GameSession,
    command_rx: CommandReceiver,
    session_event_rx: SessionEventReceiver,
    app_event_tx: AppEventSender,
    connection: Option<RelayConnection>,
    ai_config: AiConfig,
    /// Pending AI fire: deadline plus the generation it was armed with.
    ai_deadline: Option<(Instant, u64)>,
    /// Whether the session event channel still has a live sender.
    session_events_open: bool,
    rng: StdRng,
}

impl SessionTask {
    pub fn new(
        session: GameSession,
        command_rx: CommandReceiver,
        session_event_rx: SessionEventReceiver,
        app_event_tx: AppEventSender,
        connection: Option<RelayConnection>,
        ai_config: AiConfig,
    ) -> Self {
        Self {
            session,
            command_rx,
            session_event_rx,
            app_event_tx,
            connection,
            ai_config,
            ai_deadline: None,
            session_events_open: true,
            rng: StdRng::from_entropy(),
        }
    }

    /// Run until the UI sends `Command::Shutdown` or drops its command
    /// sender.
    pub async fn run(mut self) {
        tracing::debug!("session task started");
        loop {
            self.arm_ai_timer();
            let deadline = self.ai_deadline.map(|(at, _)| at);

            tokio::select! {
                command = self.command_rx.recv() => {
                    let Some(command) = command else {
                        tracing::debug!("command channel closed");
                        break;
                    };
                    let shutdown = matches!(command, Command::Shutdown);
                    let output = self.session.handle_command(command);
                    self.dispatch(output).await;
                    if shutdown {
                        break;
                    }
                }
                event = self.session_event_rx.recv(), if self.session_events_open => {
                    match event {
                        Some(event) => {
                            let output = self.session.handle_event(event);
                            self.dispatch(output).await;
                        }
                        None => {
                            tracing::debug!("session event channel closed");
                            self.session_events_open = false;
                        }
                    }
                }
                _ = sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                    let (_, generation) = self.ai_deadline.take().unwrap_or((Instant::now(), 0));
                    let output = self.session.handle_ai_timer(generation);
                    self.dispatch(output).await;
                }
            }
        }
        if let Some(connection) = &self.connection {
            connection.shutdown();
        }
        tracing::debug!("session task stopped");
    }

    async fn dispatch(&mut self, (effects, events): (Vec<Effect>, Vec<AppEvent>)) {
        for effect in effects {
            match effect {
                Effect::SendFrame(frame) => match &self.connection {
                    Some(connection) => {
                        if let Err(err) = connection.send(frame) {
                            tracing::warn!(error = %err, "failed to queue outgoing frame");
                        }
                    }
                    None => tracing::warn!("dropping outgoing frame, no relay connection"),
                },
            }
        }
        for event in events {
            if self.app_event_tx.send(event).await.is_err() {
                tracing::debug!("app event receiver dropped");
                return;
            }
        }
    }

    /// Arm, re-arm, or clear the AI timer to match the session's current
    /// wishes.
    fn arm_ai_timer(&mut self) {
        if !self.session.wants_ai_move() {
            self.ai_deadline = None;
            return;
        }
        let generation = self.session.ai_generation();
        if self.ai_deadline.map(|(_, g)| g) == Some(generation) {
            return;
        }
        let delay = self
            .rng
            .gen_range(self.ai_config.min_delay_ms..=self.ai_config.max_delay_ms);
        self.ai_deadline = Some((
            Instant::now() + std::time::Duration::from_millis(delay),
            generation,
        ));
    }
}
