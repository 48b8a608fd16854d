//! Interactive command console.
//!
//! The console reads key events from a [`KeySource`], edits a line with
//! history recall and tab completion against a [`CommandTree`], then
//! tokenizes the committed line and dispatches it to an action through the
//! command's [`ArgumentParser`]. Output goes to an injected [`OutputSink`],
//! so the same loop drives a real terminal or an in-memory one.
//!
//! [`KeySource`]: quill_types::backend::KeySource
//! [`OutputSink`]: quill_types::backend::OutputSink

pub mod buffer;
pub mod completion;
mod console;
pub mod dispatch;
pub mod editor;
pub mod history;
pub mod parser;
pub mod sink;
pub mod tokenize;
pub mod tree;

/// Prefix completion over the command tree.
pub use completion::{CompletionResult, complete, lcp};
/// The console loop and its builder.
pub use console::{Console, ConsoleBuilder, ConsoleState};
/// Named actions and command dispatch.
pub use dispatch::{Action, ActionTable, Dispatcher};
/// Single-line editor.
pub use editor::{LineEditor, ReadOutcome};
/// Bounded command history.
pub use history::HistoryStore;
/// Per-command argument parsing.
pub use parser::{ArgumentParser, Namespace, Value, ValueType};
/// Terminal sinks and scripted input.
pub use sink::{AnsiSink, MemoryTerminal, ScriptedKeys};
/// Command name tree.
pub use tree::CommandTree;
