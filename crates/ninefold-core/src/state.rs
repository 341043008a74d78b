//! Replicated game state
//!
//! [`GameState`] is a single value replaced wholesale on every accepted
//! transition; nothing in this crate mutates a live state in place. Each peer
//! owns exactly one copy, and in online mode the copies stay consistent by
//! both sides replaying the same moves and relay-issued chaos events.
//!
//! The serde shape is camelCase so a full snapshot matches the `game-state`
//! payload the relay stores for trigger detection.

use serde::{Deserialize, Serialize};

use crate::board;
use crate::types::{BoardStatus, Move, Player, ShuffleMapping};

// ----------------------------------------------------------------------------
// Game State
// ----------------------------------------------------------------------------

/// Full state of one chaos Ultimate Tic-Tac-Toe game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameState {
    /// Nine small boards of nine cells each.
    pub boards: [[Option<Player>; 9]; 9],
    /// Outcome of each small board; `None` while still open.
    pub board_status: [Option<BoardStatus>; 9],
    pub current_player: Player,
    /// When set and that board is still open, the next move must land in it.
    pub forced_board: Option<usize>,
    pub game_over: bool,
    pub winner: Option<Player>,
    pub is_draw: bool,
    /// One-shot latch: once the shuffle fires it can never fire again.
    pub instability_triggered: bool,
    /// Transient UI signal; cleared on the next transition.
    pub shuffle_just_happened: bool,
    pub shuffle_mapping: Option<ShuffleMapping>,
    /// Moves accepted strictly after the shuffle. 0 (and meaningless) before.
    pub post_shuffle_moves: u32,
    pub role_swap_triggered: bool,
    pub role_swap_just_happened: bool,
}

impl GameState {
    /// A fresh game. Reset is this same constructor, so resetting twice is
    /// indistinguishable from resetting once.
    pub fn new() -> Self {
        Self {
            boards: [[None; 9]; 9],
            board_status: [None; 9],
            current_player: Player::X,
            forced_board: None,
            game_over: false,
            winner: None,
            is_draw: false,
            instability_triggered: false,
            shuffle_just_happened: false,
            shuffle_mapping: None,
            post_shuffle_moves: 0,
            role_swap_triggered: false,
            role_swap_just_happened: false,
        }
    }

    /// Drop the one-shot animation signals once the presentation layer has
    /// consumed them. Latches are untouched.
    pub fn clear_animation_flags(&self) -> Self {
        Self {
            shuffle_just_happened: false,
            shuffle_mapping: None,
            role_swap_just_happened: false,
            ..self.clone()
        }
    }

    /// Whether `board_index` is still open for play.
    pub fn board_open(&self, board_index: usize) -> bool {
        self.board_status[board_index].is_none()
    }

    /// Number of boards conquered by a player (draws excluded).
    pub fn conquered_count(&self) -> usize {
        self.board_status
            .iter()
            .filter(|s| s.is_some_and(|s| s.is_conquered()))
            .count()
    }

    /// All moves the current player may legally make.
    pub fn legal_moves(&self) -> Vec<Move> {
        let mut moves = Vec::new();
        if self.game_over {
            return moves;
        }

        let forced = self.forced_board.filter(|&b| self.board_open(b));
        let candidate_boards: Vec<usize> = match forced {
            Some(b) => vec![b],
            None => (0..9).filter(|&b| self.board_open(b)).collect(),
        };

        for board_index in candidate_boards {
            for cell_index in 0..9 {
                if self.boards[board_index][cell_index].is_none() {
                    moves.push(Move {
                        board_index,
                        cell_index,
                    });
                }
            }
        }
        moves
    }

    /// Re-derive one small board's status from its cells.
    pub(crate) fn evaluate_board(&self, board_index: usize) -> Option<BoardStatus> {
        board::evaluate_small_board(&self.boards[board_index])
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::new()
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
