//! Plain-text board rendering for the terminal

use ninefold_core::{BoardStatus, GameState, Player};

fn cell_char(cell: Option<Player>) -> char {
    match cell {
        Some(Player::X) => 'X',
        Some(Player::O) => 'O',
        None => '.',
    }
}

fn status_char(status: Option<BoardStatus>) -> char {
    match status {
        Some(BoardStatus::X) => 'X',
        Some(BoardStatus::O) => 'O',
        Some(BoardStatus::Draw) => '=',
        None => '.',
    }
}

/// The 9x9 grid, three boards per band.
pub fn render_grid(state: &GameState) -> String {
    let mut out = String::new();
    for band in 0..3 {
        if band > 0 {
            out.push_str("------+-------+------\n");
        }
        for row in 0..3 {
            for board_col in 0..3 {
                let board = band * 3 + board_col;
                if board_col > 0 {
                    out.push_str(" | ");
                }
                for col in 0..3 {
                    if col > 0 {
                        out.push(' ');
                    }
                    out.push(cell_char(state.boards[board][row * 3 + col]));
                }
            }
            out.push('\n');
        }
    }
    out
}

/// One line summarizing who owns each board, in board order 0-8.
pub fn render_conquests(state: &GameState) -> String {
    let owners: String = state
        .board_status
        .iter()
        .map(|s| status_char(*s))
        .collect();
    format!("boards 0-8: [{owners}]")
}

/// Turn or outcome line.
pub fn render_status(state: &GameState) -> String {
    if state.game_over {
        return match state.winner {
            Some(winner) => format!("game over: {winner} wins"),
            None => "game over: draw".to_string(),
        };
    }
    let mut line = format!("{} to move", state.current_player);
    match state.forced_board {
        Some(board) => line.push_str(&format!(", forced to board {board}")),
        None => line.push_str(", any open board"),
    }
    if state.instability_triggered {
        line.push_str(" | instability has struck");
    }
    line
}

pub fn render(state: &GameState) -> String {
    format!(
        "{}\n{}\n{}",
        render_grid(state),
        render_conquests(state),
        render_status(state)
    )
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
