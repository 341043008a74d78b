//! Greedy AI move provider
//!
//! A deliberately simple opponent: win a board if possible, block the
//! opponent's board win otherwise, else pick by positional scoring with a
//! little jitter. Lookahead goes through the rule engine with the cascade
//! suppressed, so hypothetical moves never fire chaos events.
//!
//! The provider returns `None` only when there is no legal move; any scoring
//! fault degrades to a uniformly random legal move instead of an error.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::board::{self, LINES};
use crate::engine::{CascadePolicy, RuleEngine};
use crate::state::GameState;
use crate::types::{Move, Player};

/// Board indices in descending strategic value: center, then corners.
const STRATEGIC_BOARDS: [usize; 5] = [4, 0, 2, 6, 8];
/// Cell indices in descending strategic value: center, corners, edges.
const STRATEGIC_CELLS: [usize; 9] = [4, 0, 2, 6, 8, 1, 3, 5, 7];

/// Pick a move for the current player, or `None` if the game affords none.
///
/// Must not be called mid-animation; the session layer guards that.
pub fn best_move<R: Rng + ?Sized>(
    engine: &RuleEngine,
    state: &GameState,
    rng: &mut R,
) -> Option<Move> {
    let moves = state.legal_moves();
    if moves.is_empty() {
        return None;
    }

    let player = state.current_player;
    let opponent = player.opponent();

    // Priority 1: take any board we can decide in our favor. The lookahead
    // also catches outright meta wins, since a won board is a prerequisite.
    for &mv in &moves {
        if let Some(next) = engine.apply_move(state, mv, CascadePolicy::Suppress, rng) {
            if next.board_status[mv.board_index] == Some(player.into()) {
                return Some(mv);
            }
        }
    }

    // Priority 2: block a board the opponent could win on their next turn.
    for &mv in &moves {
        let mut cells = state.boards[mv.board_index];
        cells[mv.cell_index] = Some(opponent);
        if board::evaluate_small_board(&cells) == Some(opponent.into()) {
            return Some(mv);
        }
    }

    // Priority 3: positional scoring.
    let mut best: Option<(Move, f64)> = None;
    for &mv in &moves {
        let score = score_move(state, mv, player, rng);
        match best {
            Some((_, best_score)) if score <= best_score => {}
            _ => best = Some((mv, score)),
        }
    }

    match best {
        Some((mv, _)) => Some(mv),
        // Unreachable with a non-empty move list, but degrade gracefully.
        None => moves.choose(rng).copied(),
    }
}

fn score_move<R: Rng + ?Sized>(state: &GameState, mv: Move, player: Player, rng: &mut R) -> f64 {
    let opponent = player.opponent();
    let mut score = 0.0;

    if let Some(rank) = STRATEGIC_BOARDS.iter().position(|&b| b == mv.board_index) {
        score += ((5 - rank) * 2) as f64;
    }
    if let Some(rank) = STRATEGIC_CELLS.iter().position(|&c| c == mv.cell_index) {
        score += (9 - rank) as f64;
    }

    // Reward setting up a two-in-a-row in the played board.
    let mut cells = state.boards[mv.board_index];
    cells[mv.cell_index] = Some(player);
    for [a, b, c] in LINES {
        let line = [cells[a], cells[b], cells[c]];
        let ours = line.iter().filter(|&&x| x == Some(player)).count();
        let empty = line.iter().filter(|&&x| x.is_none()).count();
        if ours == 2 && empty == 1 {
            score += 15.0;
        }
    }

    // Penalize handing the opponent a board they can win, or a free choice.
    let next_board = mv.cell_index;
    if state.board_open(next_board) {
        let target = &state.boards[next_board];
        for [a, b, c] in LINES {
            let line = [target[a], target[b], target[c]];
            let theirs = line.iter().filter(|&&x| x == Some(opponent)).count();
            let empty = line.iter().filter(|&&x| x.is_none()).count();
            if theirs == 2 && empty == 1 {
                score -= 20.0;
            }
        }
    } else {
        score -= 5.0;
    }

    // Jitter keeps repeated games from playing out identically.
    score + rng.gen::<f64>() * 3.0
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::BoardStatus;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(99)
    }

    #[test]
    fn test_takes_winning_board() {
        let engine = RuleEngine::default();
        let mut state = GameState::new();
        state.boards[3][0] = Some(Player::X);
        state.boards[3][1] = Some(Player::X);
        state.forced_board = Some(3);

        let mv = best_move(&engine, &state, &mut rng()).unwrap();
        assert_eq!(mv, Move { board_index: 3, cell_index: 2 });
    }

    #[test]
    fn test_blocks_opponent_board_win() {
        let engine = RuleEngine::default();
        let mut state = GameState::new();
        state.boards[5][3] = Some(Player::O);
        state.boards[5][4] = Some(Player::O);
        state.forced_board = Some(5);

        let mv = best_move(&engine, &state, &mut rng()).unwrap();
        assert_eq!(mv, Move { board_index: 5, cell_index: 5 });
    }

    #[test]
    fn test_no_moves_when_game_over() {
        let engine = RuleEngine::default();
        let mut state = GameState::new();
        state.game_over = true;
        assert!(best_move(&engine, &state, &mut rng()).is_none());
    }

    #[test]
    fn test_returns_legal_move_from_open_position() {
        let engine = RuleEngine::default();
        let state = GameState::new();
        let mv = best_move(&engine, &state, &mut rng()).unwrap();
        assert!(state.legal_moves().contains(&mv));
    }

    #[test]
    fn test_lookahead_has_no_side_effects() {
        let engine = RuleEngine::default();
        // Two boards conquered; the AI's winning move would make it three
        // and trigger the shuffle in a cascading engine. The lookahead must
        // not do that to the input state.
        let mut state = GameState::new();
        state.board_status[0] = Some(BoardStatus::X);
        state.board_status[1] = Some(BoardStatus::O);
        state.boards[3][0] = Some(Player::X);
        state.boards[3][1] = Some(Player::X);
        state.forced_board = Some(3);

        let before = state.clone();
        let _ = best_move(&engine, &state, &mut rng());
        assert_eq!(state, before);
    }
}
