//! Shared 3x3 geometry
//!
//! One line table serves both levels of the game: the eight winning triples
//! of a small board are exactly the eight winning triples of the meta-board.

use crate::types::{BoardStatus, Player};

/// The 8 winning triples of a 3x3 grid: 3 rows, 3 columns, 2 diagonals.
pub const LINES: [[usize; 3]; 8] = [
    [0, 1, 2],
    [3, 4, 5],
    [6, 7, 8],
    [0, 3, 6],
    [1, 4, 7],
    [2, 5, 8],
    [0, 4, 8],
    [2, 4, 6],
];

/// Evaluate one small board.
///
/// Returns the winner if any triple is uniformly one player's marks, `Draw`
/// if all nine cells are occupied without a winner, `None` while still open.
pub fn evaluate_small_board(cells: &[Option<Player>; 9]) -> Option<BoardStatus> {
    for [a, b, c] in LINES {
        if let Some(player) = cells[a] {
            if cells[b] == Some(player) && cells[c] == Some(player) {
                return Some(player.into());
            }
        }
    }

    if cells.iter().all(|cell| cell.is_some()) {
        return Some(BoardStatus::Draw);
    }

    None
}

/// Evaluate the meta-board over the nine small-board statuses.
///
/// A player wins only with three *conquered* boards on one triple; `Draw`
/// statuses never count toward a meta win.
pub fn evaluate_meta_board(status: &[Option<BoardStatus>; 9]) -> Option<Player> {
    for [a, b, c] in LINES {
        for player in [Player::X, Player::O] {
            let owned = Some(BoardStatus::from(player));
            if status[a] == owned && status[b] == owned && status[c] == owned {
                return Some(player);
            }
        }
    }
    None
}

/// Whether some winning triple is fully conquered by a single player.
///
/// Used by the instability gate: a triple like this already signals a
/// meta-near-win, so the shuffle must not disturb it.
pub fn conquered_boards_form_line(status: &[Option<BoardStatus>; 9]) -> bool {
    for [a, b, c] in LINES {
        let all_conquered = [a, b, c]
            .into_iter()
            .all(|i| status[i].is_some_and(|s| s.is_conquered()));
        if all_conquered && status[a] == status[b] && status[b] == status[c] {
            return true;
        }
    }
    false
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn empty() -> [Option<Player>; 9] {
        [None; 9]
    }

    #[test]
    fn test_small_board_row_win() {
        let mut cells = empty();
        cells[0] = Some(Player::X);
        cells[1] = Some(Player::X);
        cells[2] = Some(Player::X);
        assert_eq!(evaluate_small_board(&cells), Some(BoardStatus::X));
    }

    #[test]
    fn test_small_board_diagonal_win() {
        let mut cells = empty();
        for i in [2, 4, 6] {
            cells[i] = Some(Player::O);
        }
        assert_eq!(evaluate_small_board(&cells), Some(BoardStatus::O));
    }

    #[test]
    fn test_small_board_draw() {
        // X O X / X O O / O X X - full, no triple
        let cells = [
            Some(Player::X),
            Some(Player::O),
            Some(Player::X),
            Some(Player::X),
            Some(Player::O),
            Some(Player::O),
            Some(Player::O),
            Some(Player::X),
            Some(Player::X),
        ];
        assert_eq!(evaluate_small_board(&cells), Some(BoardStatus::Draw));
    }

    #[test]
    fn test_small_board_open() {
        let mut cells = empty();
        cells[4] = Some(Player::X);
        assert_eq!(evaluate_small_board(&cells), None);
    }

    #[test]
    fn test_meta_board_ignores_draws() {
        let mut status: [Option<BoardStatus>; 9] = [None; 9];
        status[0] = Some(BoardStatus::X);
        status[1] = Some(BoardStatus::Draw);
        status[2] = Some(BoardStatus::X);
        assert_eq!(evaluate_meta_board(&status), None);

        status[1] = Some(BoardStatus::X);
        assert_eq!(evaluate_meta_board(&status), Some(Player::X));
    }

    #[test]
    fn test_conquered_line_detection() {
        let mut status: [Option<BoardStatus>; 9] = [None; 9];
        status[0] = Some(BoardStatus::X);
        status[4] = Some(BoardStatus::X);
        status[8] = Some(BoardStatus::O);
        // Mixed owners on the diagonal: conquered but not one player's line.
        assert!(!conquered_boards_form_line(&status));

        status[8] = Some(BoardStatus::X);
        assert!(conquered_boards_form_line(&status));
    }

    #[test]
    fn test_draw_breaks_conquered_line() {
        let mut status: [Option<BoardStatus>; 9] = [None; 9];
        status[0] = Some(BoardStatus::O);
        status[1] = Some(BoardStatus::Draw);
        status[2] = Some(BoardStatus::O);
        assert!(!conquered_boards_form_line(&status));
    }
}
