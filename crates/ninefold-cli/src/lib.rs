//! Terminal front end for ninefold: game client and relay launcher.

pub mod app;
pub mod cli;
pub mod config;
pub mod error;
pub mod render;
pub mod room;
