//! Action table, command bindings and dispatch.
//!
//! Actions are resolved by name once, when a binding is made; the binding
//! keeps the action itself. Dispatch is an
//! exact lookup of the first token followed by an argument parse and the
//! action call. Anything that goes wrong on the way is returned as a
//! recoverable [`ConsoleError`]; panics inside actions included.

use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};
use std::rc::Rc;

use indexmap::IndexMap;
use log::{debug, warn};
use quill_types::backend::OutputSink;
use quill_types::error::{ConsoleError, Result};

use crate::history::HistoryStore;
use crate::parser::{ArgumentParser, Namespace};
use crate::sink::{BOLD, RESET};

/// A callable bound to one or more commands.
pub trait Action {
    /// Run with the parsed arguments, writing any output to `out`.
    fn invoke(&self, args: &Namespace, out: &mut dyn OutputSink) -> anyhow::Result<()>;
}

impl<F> Action for F
where
    F: Fn(&Namespace, &mut dyn OutputSink) -> anyhow::Result<()>,
{
    fn invoke(&self, args: &Namespace, out: &mut dyn OutputSink) -> anyhow::Result<()> {
        self(args, out)
    }
}

/// Named actions supplied by the embedding application.
#[derive(Default)]
pub struct ActionTable {
    actions: HashMap<String, Rc<dyn Action>>,
}

impl ActionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an action. Replaces any existing action with the same name.
    pub fn register(&mut self, name: &str, action: impl Action + 'static) {
        self.actions.insert(name.to_string(), Rc::new(action));
    }

    /// Builder form of [`register`](Self::register).
    pub fn with(mut self, name: &str, action: impl Action + 'static) -> Self {
        self.register(name, action);
        self
    }

    fn resolve(&self, name: &str) -> Option<Rc<dyn Action>> {
        self.actions.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.actions.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

impl std::fmt::Debug for ActionTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<&str> = self.actions.keys().map(String::as_str).collect();
        names.sort_unstable();
        f.debug_struct("ActionTable").field("actions", &names).finish()
    }
}

/// A command name tied to its parser and its resolved action.
#[derive(Clone)]
pub struct Binding {
    pub command: String,
    pub parser: ArgumentParser,
    /// Name the action was registered under.
    pub action_name: String,
    action: Rc<dyn Action>,
}

impl std::fmt::Debug for Binding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Binding")
            .field("command", &self.command)
            .field("parser", &self.parser)
            .field("action", &self.action_name)
            .finish()
    }
}

/// Routes token lists to bound actions.
#[derive(Debug, Default)]
pub struct Dispatcher {
    bindings: IndexMap<String, Binding>,
    actions: ActionTable,
    color: bool,
}

impl Dispatcher {
    pub fn new(actions: ActionTable) -> Self {
        Self {
            bindings: IndexMap::new(),
            actions,
            color: false,
        }
    }

    /// Bold headings in builtin and `--help` output.
    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    /// Bind `command` to the action registered as `action`.
    ///
    /// Fails when the command is already bound or the action is unknown.
    pub fn bind(&mut self, command: &str, parser: ArgumentParser, action: &str) -> Result<()> {
        if self.bindings.contains_key(command) {
            return Err(ConsoleError::DuplicateCommand(command.to_string()));
        }
        let Some(resolved) = self.actions.resolve(action) else {
            return Err(ConsoleError::UnresolvedAction {
                command: command.to_string(),
                action: action.to_string(),
            });
        };
        self.bindings.insert(
            command.to_string(),
            Binding {
                command: command.to_string(),
                parser,
                action_name: action.to_string(),
                action: resolved,
            },
        );
        Ok(())
    }

    /// Bound command names in binding order.
    pub fn commands(&self) -> impl Iterator<Item = &str> {
        self.bindings.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Dispatch a tokenized line. An empty token list does nothing.
    ///
    /// Bound commands take precedence over the `help` and `history`
    /// builtins.
    pub fn dispatch(
        &self,
        tokens: &[String],
        out: &mut dyn OutputSink,
        history: &HistoryStore,
    ) -> Result<()> {
        let Some((name, rest)) = tokens.split_first() else {
            return Ok(());
        };

        let Some(binding) = self.bindings.get(name) else {
            return match name.as_str() {
                "help" => self.builtin_help(rest, out),
                "history" => builtin_history(history, out),
                _ => Err(ConsoleError::DispatchNotFound(name.clone())),
            };
        };

        if rest.len() == 1
            && rest[0] == "--help"
            && !binding.parser.optionals().iter().any(|a| a.name == "help")
        {
            return binding.parser.write_help(out, self.color);
        }

        let args = binding.parser.parse(rest)?;
        debug!(
            "dispatching '{}' to action '{}'",
            binding.command, binding.action_name
        );
        let action = &binding.action;
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| action.invoke(&args, out)));
        match outcome {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => {
                warn!("command '{}' failed: {e:#}", binding.command);
                Err(ConsoleError::ActionFailed {
                    command: binding.command.clone(),
                    message: format!("{e:#}"),
                })
            },
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                warn!("command '{}' panicked: {message}", binding.command);
                Err(ConsoleError::ActionFailed {
                    command: binding.command.clone(),
                    message: format!("panicked: {message}"),
                })
            },
        }
    }

    fn builtin_help(&self, args: &[String], out: &mut dyn OutputSink) -> Result<()> {
        if let Some(name) = args.first() {
            return match self.bindings.get(name) {
                Some(binding) => binding.parser.write_help(out, self.color),
                None => Err(ConsoleError::DispatchNotFound(name.clone())),
            };
        }

        if self.color {
            out.write_line(&format!("{BOLD}Commands:{RESET}"))?;
        } else {
            out.write_line("Commands:")?;
        }
        let width = self.bindings.keys().map(|k| k.chars().count()).max().unwrap_or(0);
        for binding in self.bindings.values() {
            let summary = match binding.parser.description() {
                "" => binding.parser.usage(),
                desc => desc.to_string(),
            };
            out.write_line(&format!("  {:width$}  {summary}", binding.command))?;
        }
        out.write_line("")?;
        out.write_line("Type 'help <command>' for details.")
    }
}

fn builtin_history(history: &HistoryStore, out: &mut dyn OutputSink) -> Result<()> {
    for (i, line) in history.entries().enumerate() {
        out.write_line(&format!("{:>4}  {line}", i + 1))?;
    }
    Ok(())
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::ValueType;
    use crate::sink::MemoryTerminal;
    use quill_types::error::ParseErrorKind;

    fn toks(line: &str) -> Vec<String> {
        line.split_whitespace().map(str::to_string).collect()
    }

    fn greet_parser() -> ArgumentParser {
        let mut p = ArgumentParser::new("greet").with_description("Say hello");
        p.add_positional("name", ValueType::Str, "who to greet").unwrap();
        p
    }

    fn dispatcher() -> Dispatcher {
        let actions = ActionTable::new()
            .with("greet", |args: &Namespace, out: &mut dyn OutputSink| -> anyhow::Result<()> {
                out.write_line(&format!("Hello, {}!", args.get_str("name").unwrap_or("?")))?;
                Ok(())
            })
            .with("fail", |_: &Namespace, _: &mut dyn OutputSink| -> anyhow::Result<()> {
                anyhow::bail!("disk on fire")
            })
            .with("boom", |_: &Namespace, _: &mut dyn OutputSink| -> anyhow::Result<()> {
                panic!("kaboom")
            });
        let mut d = Dispatcher::new(actions);
        d.bind("greet", greet_parser(), "greet").unwrap();
        d.bind("fail", ArgumentParser::new("fail"), "fail").unwrap();
        d.bind("boom", ArgumentParser::new("boom"), "boom").unwrap();
        d
    }

    #[test]
    fn dispatch_invokes_action() {
        let d = dispatcher();
        let mut term = MemoryTerminal::new();
        d.dispatch(&toks("greet Ada"), &mut term, &HistoryStore::new())
            .unwrap();
        assert_eq!(term.lines(), &["Hello, Ada!".to_string()]);
    }

    #[test]
    fn empty_tokens_do_nothing() {
        let d = dispatcher();
        let mut term = MemoryTerminal::new();
        d.dispatch(&[], &mut term, &HistoryStore::new()).unwrap();
        assert_eq!(term.transcript(), "");
    }

    #[test]
    fn unknown_command() {
        let d = dispatcher();
        let mut term = MemoryTerminal::new();
        let err = d
            .dispatch(&toks("frobnicate"), &mut term, &HistoryStore::new())
            .unwrap_err();
        assert!(matches!(err, ConsoleError::DispatchNotFound(ref n) if n == "frobnicate"));
        assert_eq!(err.to_string(), "unrecognized command: 'frobnicate'");
    }

    #[test]
    fn lookup_is_exact() {
        let d = dispatcher();
        let mut term = MemoryTerminal::new();
        let err = d
            .dispatch(&toks("gr Ada"), &mut term, &HistoryStore::new())
            .unwrap_err();
        assert!(matches!(err, ConsoleError::DispatchNotFound(_)));
    }

    #[test]
    fn parse_error_carries_usage() {
        let d = dispatcher();
        let mut term = MemoryTerminal::new();
        let err = d
            .dispatch(&toks("greet"), &mut term, &HistoryStore::new())
            .unwrap_err();
        match err {
            ConsoleError::Parse(e) => {
                assert_eq!(e.kind, ParseErrorKind::MissingPositional("name".into()));
                assert_eq!(e.usage, "greet name");
            },
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn action_error_becomes_action_failed() {
        let d = dispatcher();
        let mut term = MemoryTerminal::new();
        let err = d
            .dispatch(&toks("fail"), &mut term, &HistoryStore::new())
            .unwrap_err();
        assert!(err.is_recoverable());
        assert!(err.to_string().contains("disk on fire"));
    }

    #[test]
    fn action_panic_is_caught() {
        let d = dispatcher();
        let mut term = MemoryTerminal::new();
        let err = d
            .dispatch(&toks("boom"), &mut term, &HistoryStore::new())
            .unwrap_err();
        match err {
            ConsoleError::ActionFailed { command, message } => {
                assert_eq!(command, "boom");
                assert!(message.contains("kaboom"));
            },
            other => panic!("expected action failure, got {other:?}"),
        }
    }

    #[test]
    fn bind_rejects_unknown_action_and_duplicates() {
        let mut d = dispatcher();
        let err = d
            .bind("wave", ArgumentParser::new("wave"), "wave")
            .unwrap_err();
        assert!(matches!(err, ConsoleError::UnresolvedAction { .. }));
        let err = d.bind("greet", greet_parser(), "greet").unwrap_err();
        assert!(matches!(err, ConsoleError::DuplicateCommand(_)));
    }

    #[test]
    fn binding_holds_resolved_action() {
        let mut table = ActionTable::new();
        table.register(
            "count",
            |_: &Namespace, out: &mut dyn OutputSink| -> anyhow::Result<()> {
                out.write_line("first")?;
                Ok(())
            },
        );
        let mut d = Dispatcher::new(table);
        d.bind("count", ArgumentParser::new("count"), "count").unwrap();
        d.bind("tally", ArgumentParser::new("tally"), "count").unwrap();
        let mut term = MemoryTerminal::new();
        d.dispatch(&toks("count"), &mut term, &HistoryStore::new())
            .unwrap();
        d.dispatch(&toks("tally"), &mut term, &HistoryStore::new())
            .unwrap();
        assert_eq!(term.lines(), &["first".to_string(), "first".to_string()]);
        assert!(format!("{d:?}").contains("action: \"count\""));
    }

    #[test]
    fn colored_help_bolds_headings() {
        let d = dispatcher().with_color(true);
        let mut term = MemoryTerminal::new();
        d.dispatch(&toks("help"), &mut term, &HistoryStore::new())
            .unwrap();
        assert_eq!(term.lines()[0], format!("{BOLD}Commands:{RESET}"));
        d.dispatch(&toks("greet --help"), &mut term, &HistoryStore::new())
            .unwrap();
        assert!(term.transcript().contains(&format!("{BOLD}Usage:{RESET} greet name")));

        let mut plain = MemoryTerminal::new();
        dispatcher()
            .dispatch(&toks("help greet"), &mut plain, &HistoryStore::new())
            .unwrap();
        assert!(!plain.transcript().contains('\x1b'));
    }

    #[test]
    fn commands_in_binding_order() {
        let d = dispatcher();
        assert_eq!(d.commands().collect::<Vec<_>>(), ["greet", "fail", "boom"]);
        assert_eq!(d.len(), 3);
    }

    #[test]
    fn help_lists_commands() {
        let d = dispatcher();
        let mut term = MemoryTerminal::new();
        d.dispatch(&toks("help"), &mut term, &HistoryStore::new())
            .unwrap();
        let text = term.transcript();
        assert!(text.contains("greet  Say hello"));
        assert!(text.contains("fail"));
    }

    #[test]
    fn help_for_one_command() {
        let d = dispatcher();
        let mut term = MemoryTerminal::new();
        d.dispatch(&toks("help greet"), &mut term, &HistoryStore::new())
            .unwrap();
        assert!(term.transcript().contains("Usage: greet name"));

        let err = d
            .dispatch(&toks("help nope"), &mut term, &HistoryStore::new())
            .unwrap_err();
        assert!(matches!(err, ConsoleError::DispatchNotFound(_)));
    }

    #[test]
    fn dash_dash_help_prints_parser_help() {
        let d = dispatcher();
        let mut term = MemoryTerminal::new();
        d.dispatch(&toks("greet --help"), &mut term, &HistoryStore::new())
            .unwrap();
        assert!(term.transcript().contains("who to greet"));
    }

    #[test]
    fn bound_command_shadows_builtin() {
        let actions = ActionTable::new().with(
            "mine",
            |_: &Namespace, out: &mut dyn OutputSink| -> anyhow::Result<()> {
                out.write_line("custom help")?;
                Ok(())
            },
        );
        let mut d = Dispatcher::new(actions);
        d.bind("help", ArgumentParser::new("help"), "mine").unwrap();
        let mut term = MemoryTerminal::new();
        d.dispatch(&toks("help"), &mut term, &HistoryStore::new())
            .unwrap();
        assert_eq!(term.transcript(), "custom help\n");
    }

    #[test]
    fn history_builtin_lists_newest_first() {
        let d = dispatcher();
        let mut history = HistoryStore::new();
        history.push("greet Ada");
        history.push("help");
        let mut term = MemoryTerminal::new();
        d.dispatch(&toks("history"), &mut term, &history).unwrap();
        assert_eq!(
            term.lines(),
            &["   1  help".to_string(), "   2  greet Ada".to_string()]
        );
    }
}
