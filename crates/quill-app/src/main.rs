//! quill demo console.
//!
//! Runs an interactive console in the current terminal. The first argument
//! may name a command definition file (TOML, or JSON by extension); the
//! embedded `commands.toml` is used otherwise. `QUILL_CONFIG` may point at a
//! TOML file with console settings. Type `help` for commands, `exit` or
//! Ctrl+C to leave.

mod commands;
mod input;

use std::io::{self, IsTerminal};
use std::path::Path;

use anyhow::{Context, Result};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};

use input::CrosstermKeys;
use quill_terminal::{AnsiSink, Console};
use quill_types::config::{CommandFile, ConsoleConfig};

/// Definitions used when no file is given.
pub(crate) const COMMANDS: &str = include_str!("../commands.toml");

fn load_config() -> Result<ConsoleConfig> {
    match std::env::var("QUILL_CONFIG") {
        Ok(path) => {
            let source = std::fs::read_to_string(&path)
                .with_context(|| format!("read console config {path}"))?;
            let config = ConsoleConfig::from_toml_str(&source)
                .with_context(|| format!("parse console config {path}"))?;
            log::info!("Loaded console config from {path}");
            Ok(config)
        },
        Err(_) => Ok(ConsoleConfig {
            banner: "quill demo console. Type 'help' for commands, 'exit' to quit.".to_string(),
            exit_message: "Goodbye.".to_string(),
            color: true,
            ..ConsoleConfig::default()
        }),
    }
}

fn load_commands() -> Result<CommandFile> {
    match std::env::args().nth(1) {
        Some(path) => {
            let file = CommandFile::load(Path::new(&path))
                .with_context(|| format!("load command definitions {path}"))?;
            log::info!("Loaded {} commands from {path}", file.len());
            Ok(file)
        },
        None => CommandFile::from_toml_str(COMMANDS).context("parse embedded commands"),
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if !io::stdin().is_terminal() || !io::stdout().is_terminal() {
        anyhow::bail!("quill-app requires an interactive terminal (TTY)");
    }

    let config = load_config()?;
    let definitions = load_commands()?;
    let actions = commands::actions(&config);
    let mut console = commands::register_parsers(Console::builder().config(config), &definitions)?
        .build(&definitions, actions)
        .context("build console")?;

    enable_raw_mode().context("enable raw mode")?;
    let mut out = AnsiSink::raw(io::stdout());
    let res = console.run(&mut CrosstermKeys, &mut out);
    disable_raw_mode().ok();

    res.context("console loop")
}
