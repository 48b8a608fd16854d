//! The console loop.
//!
//! A [`Console`] is assembled once by [`ConsoleBuilder::build`] from a
//! command definition file, the per-command argument parsers and the action
//! table. After that the tree and bindings are read-only; only the history
//! changes while the loop runs.

use indexmap::IndexMap;
use log::{debug, info};
use quill_types::backend::{KeySource, OutputSink};
use quill_types::config::{CommandDef, CommandFile, ConsoleConfig};
use quill_types::error::{ConsoleError, Result};

use crate::dispatch::{ActionTable, Dispatcher};
use crate::editor::{LineEditor, ReadOutcome};
use crate::history::HistoryStore;
use crate::parser::ArgumentParser;
use crate::sink::{RED, RESET};
use crate::tokenize::tokenize;
use crate::tree::CommandTree;

/// Where the console is in its prompt/read/dispatch cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleState {
    /// Built, loop not started.
    Idle,
    /// Prompt printed, waiting for the first key.
    Prompting,
    /// At least one key of the current line consumed.
    Reading,
    /// Running a command.
    Dispatching,
    /// Loop finished.
    Exiting,
}

/// Collects configuration and parsers before the console is built.
#[derive(Debug, Default)]
pub struct ConsoleBuilder {
    config: ConsoleConfig,
    parsers: IndexMap<String, ArgumentParser>,
}

impl ConsoleBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn config(mut self, config: ConsoleConfig) -> Self {
        self.config = config;
        self
    }

    /// Attach an argument parser to the command with the parser's name.
    ///
    /// Commands without one accept no arguments.
    pub fn parser(mut self, parser: ArgumentParser) -> Self {
        self.parsers.insert(parser.name().to_string(), parser);
        self
    }

    /// Resolve every definition against `actions` and build the console.
    pub fn build(mut self, definitions: &CommandFile, actions: ActionTable) -> Result<Console> {
        definitions.validate()?;
        if self.config.max_line_len == 0 {
            return Err(ConsoleError::Config("max_line_len must be at least 1".to_string()));
        }

        for (name, def) in &definitions.commands {
            check_actions(name, def, &actions)?;
        }

        let mut dispatcher = Dispatcher::new(actions).with_color(self.config.color);
        for (name, def) in &definitions.commands {
            let parser = self
                .parsers
                .shift_remove(name)
                .unwrap_or_else(|| ArgumentParser::new(name.as_str()));
            dispatcher.bind(name, parser, &def.action)?;
        }
        if let Some(orphan) = self.parsers.keys().next() {
            return Err(ConsoleError::Config(format!(
                "argument parser '{orphan}' has no command definition"
            )));
        }

        let tree = CommandTree::from_definitions(definitions);
        info!(
            "Console ready: {} commands, {} tree nodes",
            dispatcher.len(),
            tree.len()
        );

        let editor =
            LineEditor::new(self.config.prompt.clone()).with_max_len(self.config.max_line_len);
        Ok(Console {
            history: HistoryStore::with_limit(self.config.max_history),
            config: self.config,
            editor,
            tree,
            dispatcher,
            state: ConsoleState::Idle,
        })
    }
}

/// Subcommand actions are not dispatched but must still name real actions.
fn check_actions(path: &str, def: &CommandDef, actions: &ActionTable) -> Result<()> {
    if !actions.contains(&def.action) {
        return Err(ConsoleError::UnresolvedAction {
            command: path.to_string(),
            action: def.action.clone(),
        });
    }
    for (name, sub) in &def.subcommands {
        check_actions(&format!("{path} {name}"), sub, actions)?;
    }
    Ok(())
}

/// An interactive command console.
#[derive(Debug)]
pub struct Console {
    config: ConsoleConfig,
    editor: LineEditor,
    history: HistoryStore,
    tree: CommandTree,
    dispatcher: Dispatcher,
    state: ConsoleState,
}

impl Console {
    pub fn builder() -> ConsoleBuilder {
        ConsoleBuilder::new()
    }

    pub fn state(&self) -> ConsoleState {
        self.state
    }

    pub fn history(&self) -> &HistoryStore {
        &self.history
    }

    pub fn tree(&self) -> &CommandTree {
        &self.tree
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    pub fn config(&self) -> &ConsoleConfig {
        &self.config
    }

    /// Run until an exit keyword or the cancel key.
    ///
    /// Per-line errors are printed and the loop continues. I/O errors from
    /// the key source or the sink end the loop and are returned.
    pub fn run(&mut self, keys: &mut dyn KeySource, out: &mut dyn OutputSink) -> Result<()> {
        info!("Console started");
        if !self.config.banner.is_empty() {
            out.write_line(&self.config.banner)?;
        }

        loop {
            match self.read(keys, out)? {
                ReadOutcome::Cancelled => {
                    out.write_str("^C")?;
                    out.newline()?;
                    break;
                },
                ReadOutcome::Line(line) => {
                    if !self.process_line(&line, out)? {
                        break;
                    }
                },
            }
        }

        self.state = ConsoleState::Exiting;
        if !self.config.exit_message.is_empty() {
            out.write_line(&self.config.exit_message)?;
        }
        out.flush()?;
        info!("Console stopped");
        Ok(())
    }

    fn read(&mut self, keys: &mut dyn KeySource, out: &mut dyn OutputSink) -> Result<ReadOutcome> {
        self.state = ConsoleState::Prompting;
        let state = &mut self.state;
        self.editor
            .read_line(keys, out, &self.history, &self.tree, |_| {
                *state = ConsoleState::Reading;
            })
    }

    /// Handle one committed line as the loop would.
    ///
    /// Returns `false` when the line asks the console to exit. Recoverable
    /// errors are reported to `out` as `[Error] <message>`.
    pub fn process_line(&mut self, line: &str, out: &mut dyn OutputSink) -> Result<bool> {
        let line = line.trim();
        if line.is_empty() {
            self.state = ConsoleState::Prompting;
            return Ok(true);
        }
        self.history.push(line);

        let tokens = match tokenize(line) {
            Ok(tokens) => tokens,
            Err(e) => {
                self.report(&e, out)?;
                self.state = ConsoleState::Prompting;
                return Ok(true);
            },
        };

        if tokens
            .first()
            .is_some_and(|first| self.config.is_exit_keyword(first))
        {
            debug!("Exit keyword '{}'", tokens[0]);
            self.state = ConsoleState::Exiting;
            return Ok(false);
        }

        self.state = ConsoleState::Dispatching;
        let result = self.dispatcher.dispatch(&tokens, out, &self.history);
        self.state = ConsoleState::Prompting;
        match result {
            Ok(()) => Ok(true),
            Err(e) if e.is_recoverable() => {
                self.report(&e, out)?;
                Ok(true)
            },
            Err(e) => Err(e),
        }
    }

    fn report(&self, error: &ConsoleError, out: &mut dyn OutputSink) -> Result<()> {
        if self.config.color {
            out.write_line(&format!("{RED}[Error]{RESET} {error}"))
        } else {
            out.write_line(&format!("[Error] {error}"))
        }
    }
}
