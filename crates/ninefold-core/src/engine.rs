//! The rule engine
//!
//! [`RuleEngine::apply_move`] is the single state-transition function: it
//! takes a state and a move and either returns the successor state or `None`
//! when the move is illegal. It never mutates its input.
//!
//! Cascading (shuffle + role swap) is policy-controlled. Online peers apply
//! remote and local moves with [`CascadePolicy::Suppress`] and wait for the
//! relay's `chaos-swap` / `role-swap` frames instead of rolling their own
//! randomness; the AI's lookahead uses the same policy so a hypothetical move
//! has no side effects.

use rand::Rng;

use crate::config::RoleSwapConfig;
use crate::instability;
use crate::roleswap;
use crate::state::GameState;
use crate::types::Move;

// ----------------------------------------------------------------------------
// Cascade Policy
// ----------------------------------------------------------------------------

/// Whether `apply_move` may fire chaos events itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CascadePolicy {
    /// Evaluate the chaos triggers locally (local and AI games).
    Cascade,
    /// Finalize the move only; triggers arrive from the relay (online mode)
    /// or are irrelevant (AI lookahead).
    Suppress,
}

// ----------------------------------------------------------------------------
// Rule Engine
// ----------------------------------------------------------------------------

/// Pure move-application engine for one game.
#[derive(Debug, Clone)]
pub struct RuleEngine {
    role_swap: RoleSwapConfig,
}

impl RuleEngine {
    pub fn new(role_swap: RoleSwapConfig) -> Self {
        Self { role_swap }
    }

    /// Apply one move.
    ///
    /// Returns `None` (state unchanged, no error surfaced) when the game is
    /// over, the target cell is occupied, the target board is decided, the
    /// indices are out of range, or an active forced board is ignored.
    pub fn apply_move<R: Rng + ?Sized>(
        &self,
        state: &GameState,
        mv: Move,
        cascade: CascadePolicy,
        rng: &mut R,
    ) -> Option<GameState> {
        if state.game_over || !mv.in_range() {
            return None;
        }
        if state.boards[mv.board_index][mv.cell_index].is_some() {
            return None;
        }
        if !state.board_open(mv.board_index) {
            return None;
        }
        // A forced board only binds while it is still open.
        if let Some(forced) = state.forced_board {
            if state.board_open(forced) && mv.board_index != forced {
                return None;
            }
        }

        let mover = state.current_player;
        let mut next = state.clear_animation_flags();
        next.boards[mv.board_index][mv.cell_index] = Some(mover);

        if let Some(status) = next.evaluate_board(mv.board_index) {
            next.board_status[mv.board_index] = Some(status);
        }

        // A move that decides the meta-board wins outright; the draw check is
        // only reachable when no winner exists.
        if let Some(winner) = crate::board::evaluate_meta_board(&next.board_status) {
            next.game_over = true;
            next.winner = Some(winner);
            return Some(next);
        }
        if next.board_status.iter().all(|s| s.is_some()) {
            next.game_over = true;
            next.is_draw = true;
            return Some(next);
        }

        // Forced-board carry-over: the played cell names the next board,
        // unless that board is already decided.
        next.forced_board = if next.board_open(mv.cell_index) {
            Some(mv.cell_index)
        } else {
            None
        };

        next.current_player = mover.opponent();

        if next.instability_triggered {
            next.post_shuffle_moves += 1;
        }

        if cascade == CascadePolicy::Cascade {
            if instability::should_trigger(&next) {
                next = instability::perform_shuffle(&next, rng);
                tracing::debug!(mapping = ?next.shuffle_mapping, "instability shuffle fired");
            }
            if roleswap::should_trigger(&next, &self.role_swap, rng) {
                next = roleswap::latch(&next);
                tracing::debug!("role swap fired");
            }
        }

        Some(next)
    }

    /// The active role-swap thresholds.
    pub fn role_swap_config(&self) -> &RoleSwapConfig {
        &self.role_swap
    }
}

impl Default for RuleEngine {
    fn default() -> Self {
        Self::new(RoleSwapConfig::local())
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{BoardStatus, Player};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(7)
    }

    fn mv(board: usize, cell: usize) -> Move {
        Move {
            board_index: board,
            cell_index: cell,
        }
    }

    fn apply(engine: &RuleEngine, state: &GameState, m: Move) -> Option<GameState> {
        engine.apply_move(state, m, CascadePolicy::Suppress, &mut rng())
    }

    #[test]
    fn test_first_move_forces_matching_board() {
        // X plays board 4 cell 4; the next forced board is 4 and it is O's
        // turn.
        let engine = RuleEngine::default();
        let state = GameState::new();
        let next = apply(&engine, &state, mv(4, 4)).unwrap();

        assert_eq!(next.boards[4][4], Some(Player::X));
        assert_eq!(next.forced_board, Some(4));
        assert_eq!(next.current_player, Player::O);
        assert!(!next.game_over);
    }

    #[test]
    fn test_rejects_occupied_cell() {
        let engine = RuleEngine::default();
        let state = GameState::new();
        let next = apply(&engine, &state, mv(0, 0)).unwrap();
        assert!(apply(&engine, &next, mv(0, 0)).is_none());
    }

    #[test]
    fn test_rejects_out_of_range_indices() {
        let engine = RuleEngine::default();
        let state = GameState::new();
        assert!(apply(&engine, &state, mv(9, 0)).is_none());
        assert!(apply(&engine, &state, mv(0, 12)).is_none());
    }

    #[test]
    fn test_rejects_wrong_board_under_forced_constraint() {
        let engine = RuleEngine::default();
        let state = apply(&engine, &GameState::new(), mv(4, 2)).unwrap();
        assert_eq!(state.forced_board, Some(2));
        assert!(apply(&engine, &state, mv(5, 0)).is_none());
        assert!(apply(&engine, &state, mv(2, 0)).is_some());
    }

    #[test]
    fn test_rejects_after_game_over() {
        let engine = RuleEngine::default();
        let mut state = GameState::new();
        state.game_over = true;
        state.winner = Some(Player::X);
        assert!(apply(&engine, &state, mv(0, 0)).is_none());
    }

    #[test]
    fn test_board_win_records_status_without_ending_game() {
        // Legal turn sequence where X completes the 0-1-2 row of board 0.
        // X's moves in board 0 force O into boards 0/1/2, and O's replies in
        // those boards force X right back into board 0.
        let engine = RuleEngine::default();
        let mut state = GameState::new();
        for m in [
            mv(4, 0), // X opens, forcing board 0
            mv(0, 1), // O, forcing board 1
            mv(1, 0), // X, forcing board 0
            mv(0, 2), // O, forcing board 2
            mv(2, 0), // X, forcing board 0
            mv(0, 4), // O takes the center of board 0, forcing board 4
            mv(4, 1), // X, forcing board 1
            mv(1, 4), // O, forcing board 4
            mv(4, 2), // X, forcing board 2
        ] {
            state = apply(&engine, &state, m).expect("setup move rejected");
        }
        // Board 4 now holds X at 0,1,2.
        assert_eq!(state.board_status[4], Some(BoardStatus::X));
        assert!(!state.game_over);
        // The winning mark was cell 2, so O is forced to board 2.
        assert_eq!(state.forced_board, Some(2));
        assert_eq!(state.current_player, Player::O);
    }

    #[test]
    fn test_meta_win_ends_game_immediately() {
        let engine = RuleEngine::default();
        let mut state = GameState::new();
        state.board_status[0] = Some(BoardStatus::X);
        state.board_status[1] = Some(BoardStatus::X);
        // Board 2 one mark away from an X win.
        state.boards[2][0] = Some(Player::X);
        state.boards[2][1] = Some(Player::X);
        let after = apply(&engine, &state, mv(2, 2)).unwrap();
        assert!(after.game_over);
        assert_eq!(after.winner, Some(Player::X));
        assert!(!after.is_draw);
        // Engine returns immediately: no forced board is computed and the
        // player to move is unchanged.
        assert_eq!(after.current_player, Player::X);
    }

    #[test]
    fn test_simultaneous_board_and_meta_win_prefers_winner() {
        let engine = RuleEngine::default();
        let mut state = GameState::new();
        state.board_status[3] = Some(BoardStatus::X);
        state.board_status[5] = Some(BoardStatus::X);
        state.boards[4][3] = Some(Player::X);
        state.boards[4][5] = Some(Player::X);
        // One mark decides board 4 and the meta row 3-4-5 at once.
        let after = apply(&engine, &state, mv(4, 4)).unwrap();
        assert_eq!(after.winner, Some(Player::X));
        assert!(!after.is_draw);
    }

    #[test]
    fn test_full_meta_board_without_winner_is_draw() {
        let engine = RuleEngine::default();
        let mut state = GameState::new();
        // Eight boards decided with no uniform triple, draws breaking lines.
        let status = [
            BoardStatus::X,
            BoardStatus::O,
            BoardStatus::X,
            BoardStatus::O,
            BoardStatus::Draw,
            BoardStatus::X,
            BoardStatus::O,
            BoardStatus::X,
            BoardStatus::O,
        ];
        for (i, s) in status.into_iter().enumerate() {
            if i != 4 {
                state.board_status[i] = Some(s);
            }
        }
        // Board 4 full except cell 8, arranged so the final mark draws it.
        state.boards[4] = [
            Some(Player::X),
            Some(Player::O),
            Some(Player::X),
            Some(Player::X),
            Some(Player::O),
            Some(Player::O),
            Some(Player::O),
            Some(Player::X),
            None,
        ];
        let after = apply(&engine, &state, mv(4, 8)).unwrap();
        assert!(after.game_over);
        assert!(after.is_draw);
        assert_eq!(after.winner, None);
    }

    #[test]
    fn test_move_clears_stale_animation_flags() {
        let engine = RuleEngine::default();
        let mut state = GameState::new();
        state.shuffle_just_happened = true;
        state.shuffle_mapping = Some(crate::types::ShuffleMapping::identity());
        state.role_swap_just_happened = true;
        let after = apply(&engine, &state, mv(0, 0)).unwrap();
        assert!(!after.shuffle_just_happened);
        assert!(after.shuffle_mapping.is_none());
        assert!(!after.role_swap_just_happened);
    }

    #[test]
    fn test_post_shuffle_counter_advances_only_after_latch() {
        let engine = RuleEngine::default();
        let state = GameState::new();
        let after = apply(&engine, &state, mv(0, 0)).unwrap();
        assert_eq!(after.post_shuffle_moves, 0);

        let mut shuffled = after;
        shuffled.instability_triggered = true;
        let after = apply(&engine, &shuffled, mv(0, 1)).unwrap();
        assert_eq!(after.post_shuffle_moves, 1);
        let after = apply(&engine, &after, mv(1, 0)).unwrap();
        assert_eq!(after.post_shuffle_moves, 2);
    }

    #[test]
    fn test_forced_board_redirects_to_open_board_only() {
        let engine = RuleEngine::default();
        let mut state = GameState::new();
        state.board_status[7] = Some(BoardStatus::Draw);
        let after = apply(&engine, &state, mv(0, 7)).unwrap();
        // Cell 7 names a decided board, so the constraint lifts.
        assert_eq!(after.forced_board, None);
    }
}
