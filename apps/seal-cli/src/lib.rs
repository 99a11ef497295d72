//! Seal CLI
//!
//! Thin front end over `seal-render` and `stamp-core`: argument parsing,
//! JSON request files and output formatting live here, everything else in
//! the library crates.

pub mod cli;
pub mod commands;
pub mod request;

use cli::{Cli, Command};
use stamp_core::EngineConfig;

/// Load configuration and run one command, returning its stdout text
pub fn run(cli: &Cli) -> anyhow::Result<String> {
    let config = match &cli.config {
        Some(path) => EngineConfig::from_file(path)?,
        None => EngineConfig::default(),
    };

    match &cli.command {
        Command::Seal(args) => commands::seal(&config, args),
        Command::Signature(args) => commands::signature(&config, args),
        Command::Fonts => commands::fonts(&config),
        Command::Stamp(args) => commands::stamp(&config, args),
        Command::Perforate(args) => commands::perforate(&config, args),
        Command::Preview(args) => commands::preview(&config, args),
        Command::Locate(args) => commands::locate(args),
    }
}
