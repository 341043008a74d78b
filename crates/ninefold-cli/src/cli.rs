//! Command-line interface definitions and parsing

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Configuration file path
    #[arg(short, long)]
    pub config: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the WebSocket relay
    Relay {
        /// Address to bind, e.g. 127.0.0.1:8081
        #[arg(short, long)]
        bind: Option<String>,
    },
    /// Play a game in the terminal
    Play {
        /// Game mode
        #[arg(short, long, value_enum, default_value_t = ModeArg::Local)]
        mode: ModeArg,

        /// Room code to join (online mode); a fresh one is generated if omitted
        #[arg(short, long)]
        room: Option<String>,

        /// Relay WebSocket URL (online mode)
        #[arg(long)]
        relay_url: Option<String>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ModeArg {
    /// Two players at one terminal
    Local,
    /// Human vs the built-in AI
    Ai,
    /// Two peers through the relay
    Online,
}
