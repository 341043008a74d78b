//! Interactive terminal game loop
//!
//! Spawns a [`SessionTask`] and bridges it to stdin/stdout: lines typed by
//! the player become commands, app events become reprints of the board.
//! Online mode opens the relay connection before the loop starts, so a
//! relay that cannot be reached fails fast instead of leaving a dead prompt.

use std::time::Duration;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::time::timeout;

use ninefold_core::{GameState, Move};
use ninefold_runtime::{
    create_app_event_channel, create_command_channel, create_session_event_channel, AppEvent,
    ChannelConfig, Command, ConnectionStatus, GameMode, GameSession, RelayConnection, SessionTask,
};

use crate::cli::ModeArg;
use crate::config::AppConfig;
use crate::error::Result;
use crate::{render, room};

enum Input {
    Move(Move),
    Reset,
    Help,
    Quit,
}

fn parse_input(line: &str) -> Option<Input> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    match tokens.as_slice() {
        ["q"] | ["quit"] | ["exit"] => Some(Input::Quit),
        ["r"] | ["reset"] => Some(Input::Reset),
        ["h"] | ["help"] | ["?"] => Some(Input::Help),
        [board, cell] => {
            let board = board.parse().ok()?;
            let cell = cell.parse().ok()?;
            Move::new(board, cell).ok().map(Input::Move)
        }
        _ => None,
    }
}

fn print_help() {
    println!("commands:");
    println!("  <board> <cell>   play a mark (both 0-8, left-to-right, top-to-bottom)");
    println!("  r                start a new game");
    println!("  q                quit");
}

fn print_event(event: AppEvent) {
    match event {
        AppEvent::StateChanged(state) => println!("\n{}", render::render(&state)),
        AppEvent::ShuffleHappened(mapping) => {
            let moved: Vec<String> = (0..9)
                .filter(|&old| mapping.target(old) != old)
                .map(|old| format!("{old}->{}", mapping.target(old)))
                .collect();
            println!("** instability! boards shuffled: {} **", moved.join(", "));
        }
        AppEvent::RoleSwapped { local_symbol } => {
            println!("** role swap! you now play {local_symbol} **");
        }
        AppEvent::SymbolAssigned(symbol) => println!("you play {symbol}"),
        AppEvent::RoomStatus { players, .. } => println!("room has {players} player(s)"),
        AppEvent::JoinedRoom(room_id) => println!("joined room {room_id}"),
        AppEvent::ConnectionChanged(status) => match status {
            ConnectionStatus::Connected => println!("opponent connected"),
            ConnectionStatus::Waiting => println!("waiting for an opponent..."),
            ConnectionStatus::Disconnected => println!("connection lost"),
        },
    }
}

pub async fn run(
    mode: ModeArg,
    room: Option<String>,
    relay_url: Option<String>,
    config: AppConfig,
) -> Result<()> {
    let channels = ChannelConfig::default();
    let (command_tx, command_rx) = create_command_channel(&channels);
    let (session_tx, session_rx) = create_session_event_channel();
    let (app_tx, mut app_rx) = create_app_event_channel(&channels);

    let (game_mode, connection) = match mode {
        ModeArg::Local => (GameMode::Local, None),
        ModeArg::Ai => (GameMode::Ai, None),
        ModeArg::Online => {
            let room_id = match room {
                Some(code) => room::parse_room_code(&code)?,
                None => {
                    let code = room::generate_room_code(&mut rand::thread_rng());
                    println!("room code: {code} (share it with your opponent)");
                    code
                }
            };
            let url = relay_url.unwrap_or_else(|| config.client.relay_url.clone());
            let connection =
                RelayConnection::open(url, config.connection_config(), session_tx.clone()).await?;
            (GameMode::Online { room_id }, Some(connection))
        }
    };

    let task = SessionTask::new(
        GameSession::new(game_mode),
        command_rx,
        session_rx,
        app_tx,
        connection,
        config.ai_config(),
    );
    let task_handle = tokio::spawn(task.run());

    println!("{}", render::render(&GameState::new()));
    print_help();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    let _ = command_tx.send(Command::Shutdown).await;
                    break;
                };
                if line.trim().is_empty() {
                    continue;
                }
                match parse_input(&line) {
                    Some(Input::Quit) => {
                        let _ = command_tx.send(Command::Shutdown).await;
                        break;
                    }
                    Some(Input::Reset) => {
                        let _ = command_tx.send(Command::Reset).await;
                    }
                    Some(Input::Move(mv)) => {
                        let _ = command_tx.send(Command::PlayCell(mv)).await;
                    }
                    Some(Input::Help) => print_help(),
                    None => println!("unrecognized input, try 'h' for help"),
                }
            }
            event = app_rx.recv() => {
                let Some(event) = event else { break };
                // The terminal has no animations, so the one-shot chaos
                // flags can be acknowledged as soon as they are printed.
                let acknowledge = matches!(
                    event,
                    AppEvent::ShuffleHappened(_) | AppEvent::RoleSwapped { .. }
                );
                print_event(event);
                if acknowledge {
                    let _ = command_tx.send(Command::ClearAnimationFlags).await;
                }
            }
        }
    }

    let _ = timeout(Duration::from_secs(1), task_handle).await;
    Ok(())
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_moves_and_commands() {
        assert!(matches!(
            parse_input("4 7"),
            Some(Input::Move(Move {
                board_index: 4,
                cell_index: 7
            }))
        ));
        assert!(matches!(parse_input("  q  "), Some(Input::Quit)));
        assert!(matches!(parse_input("reset"), Some(Input::Reset)));
        assert!(parse_input("9 0").is_none()); // out of range
        assert!(parse_input("four seven").is_none());
        assert!(parse_input("1 2 3").is_none());
    }
}
