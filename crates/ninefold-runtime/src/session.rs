//! Per-peer game session
//!
//! A [`GameSession`] owns this peer's one authoritative [`GameState`] copy,
//! the symbol-to-controller assignment the role swap flips, and the AI timer
//! generation counter. Handlers are synchronous and return the effects and
//! app events they produce; the surrounding [`crate::task::SessionTask`]
//! does the channel plumbing.
//!
//! Mode differences, all per the replicated-consistency model:
//! - `Local` and `Ai` cascade chaos triggers inside the engine.
//! - `Online` applies every move with the cascade suppressed and waits for
//!   the relay's `chaos-swap` / `role-swap` frames, so both peers always
//!   apply the same permutation and the same coin flip.

use rand::rngs::StdRng;
use rand::SeedableRng;

use ninefold_core::{
    ai, instability, roleswap, CascadePolicy, ClientFrame, GameState, Move, Player, RoleSwapConfig,
    RoomId, RuleEngine, ServerFrame,
};

use crate::channel::{AppEvent, Command, ConnectionStatus, Effect, SessionEvent};

// ----------------------------------------------------------------------------
// Game Mode
// ----------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameMode {
    /// Two players at one terminal.
    Local,
    /// Human vs the built-in AI.
    Ai,
    /// Two peers through the relay.
    Online { room_id: RoomId },
}

// ----------------------------------------------------------------------------
// Session
// ----------------------------------------------------------------------------

/// Outcome bundle of one handler call.
type Output = (Vec<Effect>, Vec<AppEvent>);

#[derive(Debug)]
pub struct GameSession {
    mode: GameMode,
    engine: RuleEngine,
    state: GameState,
    /// Symbol this peer currently controls. Role swaps flip it.
    local_symbol: Player,
    /// Symbol the AI currently controls (AI mode only).
    ai_symbol: Player,
    /// Whether we were alone in the room when we joined (first joiner is X).
    first_in_room: bool,
    remote_connected: bool,
    /// Invalidation counter for the AI thinking timer: a fire whose
    /// generation does not match is stale and must be discarded.
    ai_generation: u64,
    rng: StdRng,
}

impl GameSession {
    pub fn new(mode: GameMode) -> Self {
        Self::with_rng(mode, StdRng::from_entropy())
    }

    /// Deterministic constructor for tests.
    pub fn with_rng(mode: GameMode, rng: StdRng) -> Self {
        Self {
            mode,
            engine: RuleEngine::new(RoleSwapConfig::local()),
            state: GameState::new(),
            local_symbol: Player::X,
            ai_symbol: Player::O,
            first_in_room: false,
            remote_connected: false,
            ai_generation: 0,
            rng,
        }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn mode(&self) -> &GameMode {
        &self.mode
    }

    pub fn local_symbol(&self) -> Player {
        self.local_symbol
    }

    pub fn ai_generation(&self) -> u64 {
        self.ai_generation
    }

    fn online(&self) -> bool {
        matches!(self.mode, GameMode::Online { .. })
    }

    /// Whether the AI should be thinking right now. The task schedules a
    /// timer when this flips true; animations and game over keep it false.
    pub fn wants_ai_move(&self) -> bool {
        self.mode == GameMode::Ai
            && !self.state.game_over
            && self.state.current_player == self.ai_symbol
            && !self.state.shuffle_just_happened
            && !self.state.role_swap_just_happened
    }

    // ------------------------------------------------------------------------
    // Commands (UI -> session)
    // ------------------------------------------------------------------------

    pub fn handle_command(&mut self, command: Command) -> Output {
        match command {
            Command::PlayCell(mv) => self.handle_play(mv),
            Command::Reset => self.handle_reset(),
            Command::ClearAnimationFlags => {
                self.state = self.state.clear_animation_flags();
                (Vec::new(), vec![AppEvent::StateChanged(self.state.clone())])
            }
            Command::Shutdown => {
                self.ai_generation += 1;
                let effects = if self.online() {
                    vec![Effect::SendFrame(ClientFrame::Leave)]
                } else {
                    Vec::new()
                };
                (effects, Vec::new())
            }
        }
    }

    fn handle_play(&mut self, mv: Move) -> Output {
        // Turn gating: online peers only move their own symbol, and the
        // human never moves for the AI.
        if self.online() && self.state.current_player != self.local_symbol {
            return (Vec::new(), Vec::new());
        }
        if self.mode == GameMode::Ai && self.state.current_player == self.ai_symbol {
            return (Vec::new(), Vec::new());
        }

        let cascade = if self.online() {
            CascadePolicy::Suppress
        } else {
            CascadePolicy::Cascade
        };
        let Some(next) = self.engine.apply_move(&self.state, mv, cascade, &mut self.rng) else {
            tracing::debug!(%mv, "illegal move ignored");
            return (Vec::new(), Vec::new());
        };
        self.state = next;

        let mut effects = Vec::new();
        if self.online() {
            effects.push(Effect::SendFrame(ClientFrame::Move {
                board_index: mv.board_index,
                cell_index: mv.cell_index,
            }));
            // Snapshot for the relay's trigger detection.
            effects.push(Effect::SendFrame(ClientFrame::GameState {
                game_state: self.state.clone(),
            }));
        }
        (effects, self.transition_events())
    }

    fn handle_reset(&mut self) -> Output {
        self.ai_generation += 1;
        self.state = GameState::new();
        if self.mode == GameMode::Ai {
            // Restore the default assignment so a pre-reset role swap cannot
            // leave the AI controlling the human's symbol.
            self.local_symbol = Player::X;
            self.ai_symbol = Player::O;
        }
        let effects = if self.online() {
            vec![Effect::SendFrame(ClientFrame::Reset)]
        } else {
            Vec::new()
        };
        (effects, vec![AppEvent::StateChanged(self.state.clone())])
    }

    // ------------------------------------------------------------------------
    // AI timer
    // ------------------------------------------------------------------------

    /// Apply the AI's move if the timer that fired is still current.
    pub fn handle_ai_timer(&mut self, generation: u64) -> Output {
        if generation != self.ai_generation {
            tracing::debug!(generation, current = self.ai_generation, "stale AI timer");
            return (Vec::new(), Vec::new());
        }
        if !self.wants_ai_move() {
            return (Vec::new(), Vec::new());
        }

        let Some(mv) = ai::best_move(&self.engine, &self.state, &mut self.rng) else {
            return (Vec::new(), Vec::new());
        };
        let Some(next) =
            self.engine
                .apply_move(&self.state, mv, CascadePolicy::Cascade, &mut self.rng)
        else {
            return (Vec::new(), Vec::new());
        };
        self.state = next;
        (Vec::new(), self.transition_events())
    }

    // ------------------------------------------------------------------------
    // Connection events
    // ------------------------------------------------------------------------

    pub fn handle_event(&mut self, event: SessionEvent) -> Output {
        match event {
            SessionEvent::Frame(frame) => self.handle_frame(frame),
            SessionEvent::Connected => {
                let GameMode::Online { room_id } = &self.mode else {
                    return (Vec::new(), Vec::new());
                };
                let room_id = room_id.clone();
                (
                    vec![Effect::SendFrame(ClientFrame::Join {
                        room_id: room_id.clone(),
                    })],
                    vec![
                        AppEvent::JoinedRoom(room_id),
                        AppEvent::ConnectionChanged(ConnectionStatus::Waiting),
                    ],
                )
            }
            SessionEvent::Disconnected { reason } => {
                tracing::warn!(%reason, "relay connection lost");
                self.remote_connected = false;
                (
                    Vec::new(),
                    vec![AppEvent::ConnectionChanged(ConnectionStatus::Disconnected)],
                )
            }
            SessionEvent::ReconnectExhausted { attempts } => {
                tracing::warn!(attempts, "reconnection exhausted, treating peer as gone");
                self.remote_connected = false;
                (
                    Vec::new(),
                    vec![AppEvent::ConnectionChanged(ConnectionStatus::Disconnected)],
                )
            }
        }
    }

    fn handle_frame(&mut self, frame: ServerFrame) -> Output {
        match frame {
            ServerFrame::Move {
                board_index,
                cell_index,
            } => {
                let mv = Move {
                    board_index,
                    cell_index,
                };
                // Remote moves are unvalidated on the wire; the local engine
                // is the only legality check. A racing move simply fails it.
                let Some(next) =
                    self.engine
                        .apply_move(&self.state, mv, CascadePolicy::Suppress, &mut self.rng)
                else {
                    tracing::debug!(%mv, "remote move rejected by local engine");
                    return (Vec::new(), Vec::new());
                };
                self.state = next;
                (
                    vec![Effect::SendFrame(ClientFrame::GameState {
                        game_state: self.state.clone(),
                    })],
                    self.transition_events(),
                )
            }
            ServerFrame::ChaosSwap { shuffle_mapping } => {
                self.ai_generation += 1;
                self.state = instability::apply_mapping(&self.state, &shuffle_mapping);
                (Vec::new(), self.transition_events())
            }
            ServerFrame::RoleSwap => {
                self.ai_generation += 1;
                self.state = roleswap::latch(&self.state);
                self.local_symbol = self.local_symbol.opponent();
                (
                    Vec::new(),
                    vec![
                        AppEvent::StateChanged(self.state.clone()),
                        AppEvent::RoleSwapped {
                            local_symbol: self.local_symbol,
                        },
                    ],
                )
            }
            ServerFrame::Reset => {
                self.ai_generation += 1;
                self.state = GameState::new();
                (Vec::new(), vec![AppEvent::StateChanged(self.state.clone())])
            }
            ServerFrame::RoomStatus {
                players,
                game_started,
            } => self.handle_room_status(players, game_started),
        }
    }

    fn handle_room_status(&mut self, players: usize, game_started: bool) -> Output {
        let mut events = vec![AppEvent::RoomStatus {
            players,
            game_started,
        }];
        if players == 1 {
            // Alone in the room: we are (or become) the first player, X.
            self.first_in_room = true;
            self.local_symbol = Player::X;
            self.remote_connected = false;
            events.push(AppEvent::SymbolAssigned(Player::X));
            events.push(AppEvent::ConnectionChanged(ConnectionStatus::Waiting));
        } else if players >= 2 {
            if !self.first_in_room {
                // We joined an occupied room, so we are the second player.
                self.local_symbol = Player::O;
            }
            self.remote_connected = true;
            events.push(AppEvent::SymbolAssigned(self.local_symbol));
            events.push(AppEvent::ConnectionChanged(ConnectionStatus::Connected));
        }
        (Vec::new(), events)
    }

    // ------------------------------------------------------------------------
    // Shared post-transition handling
    // ------------------------------------------------------------------------

    /// App events for a freshly accepted transition, consuming the one-shot
    /// chaos signals. Any chaos event invalidates a pending AI timer.
    fn transition_events(&mut self) -> Vec<AppEvent> {
        let mut events = vec![AppEvent::StateChanged(self.state.clone())];
        if self.state.shuffle_just_happened {
            self.ai_generation += 1;
            if let Some(mapping) = &self.state.shuffle_mapping {
                events.push(AppEvent::ShuffleHappened(mapping.clone()));
            }
        }
        if self.state.role_swap_just_happened && !self.online() {
            self.ai_generation += 1;
            if self.mode == GameMode::Ai {
                self.local_symbol = self.local_symbol.opponent();
                self.ai_symbol = self.ai_symbol.opponent();
            }
            events.push(AppEvent::RoleSwapped {
                local_symbol: self.local_symbol,
            });
        }
        events
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use ninefold_core::{BoardStatus, ShuffleMapping};

    fn session(mode: GameMode) -> GameSession {
        GameSession::with_rng(mode, StdRng::seed_from_u64(77))
    }

    fn play(session: &mut GameSession, board: usize, cell: usize) -> Output {
        session.handle_command(Command::PlayCell(Move {
            board_index: board,
            cell_index: cell,
        }))
    }

    #[test]
    fn test_local_move_produces_no_effects() {
        let mut s = session(GameMode::Local);
        let (effects, events) = play(&mut s, 4, 4);
        assert!(effects.is_empty());
        assert!(matches!(events[0], AppEvent::StateChanged(_)));
        assert_eq!(s.state().forced_board, Some(4));
    }

    #[test]
    fn test_online_move_emits_move_and_snapshot_frames() {
        let mut s = session(GameMode::Online {
            room_id: RoomId::new("AAA-111"),
        });
        let (effects, _) = play(&mut s, 4, 4);
        assert_eq!(effects.len(), 2);
        assert!(matches!(
            effects[0],
            Effect::SendFrame(ClientFrame::Move {
                board_index: 4,
                cell_index: 4
            })
        ));
        assert!(matches!(
            effects[1],
            Effect::SendFrame(ClientFrame::GameState { .. })
        ));
    }

    #[test]
    fn test_online_move_out_of_turn_is_ignored() {
        let mut s = session(GameMode::Online {
            room_id: RoomId::new("AAA-111"),
        });
        // Second joiner plays O; X is to move.
        s.handle_event(SessionEvent::Frame(ServerFrame::RoomStatus {
            players: 2,
            game_started: true,
        }));
        assert_eq!(s.local_symbol(), Player::O);
        let (effects, events) = play(&mut s, 4, 4);
        assert!(effects.is_empty());
        assert!(events.is_empty());
    }

    #[test]
    fn test_first_joiner_is_x_and_stays_x() {
        let mut s = session(GameMode::Online {
            room_id: RoomId::new("AAA-111"),
        });
        s.handle_event(SessionEvent::Frame(ServerFrame::RoomStatus {
            players: 1,
            game_started: false,
        }));
        assert_eq!(s.local_symbol(), Player::X);
        s.handle_event(SessionEvent::Frame(ServerFrame::RoomStatus {
            players: 2,
            game_started: true,
        }));
        assert_eq!(s.local_symbol(), Player::X);
    }

    #[test]
    fn test_remote_move_applies_suppressed_and_reports_snapshot() {
        let mut s = session(GameMode::Online {
            room_id: RoomId::new("AAA-111"),
        });
        let (effects, events) = s.handle_event(SessionEvent::Frame(ServerFrame::Move {
            board_index: 4,
            cell_index: 4,
        }));
        assert_eq!(s.state().boards[4][4], Some(Player::X));
        assert!(matches!(
            effects.as_slice(),
            [Effect::SendFrame(ClientFrame::GameState { .. })]
        ));
        assert!(matches!(events[0], AppEvent::StateChanged(_)));
    }

    #[test]
    fn test_chaos_swap_frame_applies_relay_mapping() {
        let mut s = session(GameMode::Online {
            room_id: RoomId::new("AAA-111"),
        });
        play(&mut s, 0, 4);
        let generation_before = s.ai_generation();
        let mapping = ShuffleMapping::new([1, 0, 2, 3, 4, 5, 6, 7, 8]).unwrap();
        let (_, events) = s.handle_event(SessionEvent::Frame(ServerFrame::ChaosSwap {
            shuffle_mapping: mapping.clone(),
        }));
        assert_eq!(s.state().boards[1][4], Some(Player::X));
        assert!(s.state().instability_triggered);
        assert!(s.ai_generation() > generation_before);
        assert!(events.contains(&AppEvent::ShuffleHappened(mapping)));
    }

    #[test]
    fn test_role_swap_frame_flips_controller_mapping() {
        let mut s = session(GameMode::Online {
            room_id: RoomId::new("AAA-111"),
        });
        assert_eq!(s.local_symbol(), Player::X);
        let (_, events) = s.handle_event(SessionEvent::Frame(ServerFrame::RoleSwap));
        assert_eq!(s.local_symbol(), Player::O);
        assert!(s.state().role_swap_triggered);
        assert!(events.contains(&AppEvent::RoleSwapped {
            local_symbol: Player::O
        }));
    }

    #[test]
    fn test_reset_restores_default_ai_assignment() {
        let mut s = session(GameMode::Ai);
        // Simulate an earlier swap.
        s.local_symbol = Player::O;
        s.ai_symbol = Player::X;
        let (_, events) = s.handle_command(Command::Reset);
        assert_eq!(s.local_symbol(), Player::X);
        assert_eq!(s.ai_symbol, Player::O);
        assert!(matches!(events[0], AppEvent::StateChanged(_)));
    }

    #[test]
    fn test_stale_ai_timer_is_discarded() {
        let mut s = session(GameMode::Ai);
        play(&mut s, 4, 4); // X moved; AI (O) to move.
        assert!(s.wants_ai_move());
        let stale = s.ai_generation();
        s.handle_command(Command::Reset); // bumps the generation
        let (effects, events) = s.handle_ai_timer(stale);
        assert!(effects.is_empty());
        assert!(events.is_empty());
        assert_eq!(s.state(), &GameState::new());
    }

    #[test]
    fn test_current_ai_timer_plays_a_move() {
        let mut s = session(GameMode::Ai);
        play(&mut s, 4, 4);
        let (_, events) = s.handle_ai_timer(s.ai_generation());
        assert!(matches!(events[0], AppEvent::StateChanged(_)));
        assert_eq!(s.state().current_player, Player::X);
        assert!(!s.wants_ai_move());
    }

    #[test]
    fn test_ai_does_not_think_during_animation() {
        let mut s = session(GameMode::Ai);
        play(&mut s, 4, 4);
        let mut state = s.state().clone();
        state.shuffle_just_happened = true;
        s.state = state;
        assert!(!s.wants_ai_move());
    }

    #[test]
    fn test_local_cascade_triggers_shuffle_without_relay() {
        let mut s = session(GameMode::Local);
        // Hand-build a state one move away from the third conquest.
        let mut state = GameState::new();
        state.board_status[0] = Some(BoardStatus::X);
        state.board_status[1] = Some(BoardStatus::O);
        state.boards[3][0] = Some(Player::X);
        state.boards[3][1] = Some(Player::X);
        s.state = state;
        let (_, events) = play(&mut s, 3, 2);
        assert!(s.state().instability_triggered);
        assert!(events
            .iter()
            .any(|e| matches!(e, AppEvent::ShuffleHappened(_))));
    }

    #[test]
    fn test_replicated_peers_converge() {
        // Two online sessions fed the same inputs end structurally equal.
        let mut a = session(GameMode::Online {
            room_id: RoomId::new("AAA-111"),
        });
        let mut b = session(GameMode::Online {
            room_id: RoomId::new("AAA-111"),
        });
        // a is first joiner (X), b second (O).
        a.handle_event(SessionEvent::Frame(ServerFrame::RoomStatus {
            players: 1,
            game_started: false,
        }));
        for s in [&mut a, &mut b] {
            s.handle_event(SessionEvent::Frame(ServerFrame::RoomStatus {
                players: 2,
                game_started: true,
            }));
        }

        // X moves locally on a, arrives as a frame on b.
        play(&mut a, 4, 4);
        b.handle_event(SessionEvent::Frame(ServerFrame::Move {
            board_index: 4,
            cell_index: 4,
        }));
        // O moves locally on b, arrives as a frame on a.
        play(&mut b, 4, 0);
        a.handle_event(SessionEvent::Frame(ServerFrame::Move {
            board_index: 4,
            cell_index: 0,
        }));

        // Relay-issued permutation lands on both.
        let mapping = ShuffleMapping::new([8, 7, 6, 5, 4, 3, 2, 1, 0]).unwrap();
        for s in [&mut a, &mut b] {
            s.handle_event(SessionEvent::Frame(ServerFrame::ChaosSwap {
                shuffle_mapping: mapping.clone(),
            }));
        }
        assert_eq!(a.state(), b.state());
    }
}
