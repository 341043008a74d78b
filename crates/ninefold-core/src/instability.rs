//! The instability shuffle
//!
//! Once per game, when exactly three boards have been conquered and those
//! three do not already line up for one player, the nine boards are randomly
//! relocated. The mapping is generated exactly once by whichever party is
//! authoritative for the game - the local engine in single-process play, the
//! relay in online play - and then applied identically everywhere.

use rand::Rng;

use crate::board;
use crate::state::GameState;
use crate::types::ShuffleMapping;

// ----------------------------------------------------------------------------
// Trigger Predicate
// ----------------------------------------------------------------------------

/// Whether the shuffle fires on this state.
///
/// All of: never fired before, game still running, exactly 3 boards
/// conquered (draws do not count), the conquered boards do not form a
/// one-player winning triple, and nobody already meta-wins.
pub fn should_trigger(state: &GameState) -> bool {
    if state.instability_triggered || state.game_over {
        return false;
    }
    if state.conquered_count() != 3 {
        return false;
    }
    if board::conquered_boards_form_line(&state.board_status) {
        return false;
    }
    board::evaluate_meta_board(&state.board_status).is_none()
}

// ----------------------------------------------------------------------------
// Mapping Generation and Application
// ----------------------------------------------------------------------------

/// Uniformly random permutation of the nine positions (Fisher-Yates).
pub fn generate_mapping<R: Rng + ?Sized>(rng: &mut R) -> ShuffleMapping {
    let mut mapping = [0, 1, 2, 3, 4, 5, 6, 7, 8];
    for i in (1..mapping.len()).rev() {
        let j = rng.gen_range(0..=i);
        mapping.swap(i, j);
    }
    ShuffleMapping(mapping)
}

/// Relocate the boards through `mapping` and latch the trigger.
///
/// Cell contents and decided statuses travel together; the forced board, if
/// any, is remapped through the same permutation. The post-shuffle move
/// counter restarts at zero.
pub fn apply_mapping(state: &GameState, mapping: &ShuffleMapping) -> GameState {
    let mut next = state.clone();

    let mut boards = [[None; 9]; 9];
    let mut board_status = [None; 9];
    for old_index in 0..9 {
        let new_index = mapping.target(old_index);
        boards[new_index] = state.boards[old_index];
        board_status[new_index] = state.board_status[old_index];
    }
    next.boards = boards;
    next.board_status = board_status;

    if let Some(forced) = state.forced_board {
        next.forced_board = Some(mapping.target(forced));
    }

    next.instability_triggered = true;
    next.shuffle_just_happened = true;
    next.shuffle_mapping = Some(mapping.clone());
    next.post_shuffle_moves = 0;

    next
}

/// Generate a mapping and apply it. Single-process games only; online peers
/// must wait for the relay's mapping instead.
pub fn perform_shuffle<R: Rng + ?Sized>(state: &GameState, rng: &mut R) -> GameState {
    let mapping = generate_mapping(rng);
    apply_mapping(state, &mapping)
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
