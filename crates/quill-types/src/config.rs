//! Console configuration and command-definition documents.
//!
//! Both are plain serde types. `ConsoleConfig` has a default for every field
//! so a partial TOML file only overrides what it names. `CommandFile`
//! describes the command hierarchy and the action each entry is bound to.

use std::path::Path;

use indexmap::IndexMap;
use serde::Deserialize;

use crate::error::{ConsoleError, Result};

/// Maximum number of history entries kept by default.
pub const MAX_HIST_LEN: usize = 20;

/// Maximum length of the edit buffer, in characters.
pub const MAX_CMD_LEN: usize = 1024;

/// Default prompt string.
pub const DEFAULT_PROMPT: &str = "> ";

/// Operational parameters for a console session.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ConsoleConfig {
    /// Printed before the first prompt (skipped when empty).
    pub banner: String,
    /// Printed at the start of every line.
    pub prompt: String,
    /// Printed when the loop exits (skipped when empty).
    pub exit_message: String,
    /// First tokens that end the loop, compared case-insensitively.
    pub exit_keywords: Vec<String>,
    pub max_history: usize,
    pub max_line_len: usize,
    /// Emit ANSI colour: a red `[Error]` tag and bold help headings.
    pub color: bool,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            banner: String::new(),
            prompt: DEFAULT_PROMPT.to_string(),
            exit_message: String::new(),
            exit_keywords: vec!["exit".into(), "quit".into(), "q".into()],
            max_history: MAX_HIST_LEN,
            max_line_len: MAX_CMD_LEN,
            color: false,
        }
    }
}

impl ConsoleConfig {
    /// Parse a TOML document. Missing keys keep their defaults.
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let config: Self = toml::from_str(source)?;
        if config.max_line_len == 0 {
            return Err(ConsoleError::Config(
                "max_line_len must be greater than zero".to_string(),
            ));
        }
        Ok(config)
    }

    /// Whether `token` is one of the exit keywords.
    pub fn is_exit_keyword(&self, token: &str) -> bool {
        self.exit_keywords
            .iter()
            .any(|k| k.eq_ignore_ascii_case(token))
    }
}

/// One entry of the command hierarchy.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CommandDef {
    /// Name of the registered action invoked for this command.
    pub action: String,
    /// Nested commands, in declaration order.
    #[serde(default)]
    pub subcommands: IndexMap<String, CommandDef>,
}

impl CommandDef {
    pub fn new(action: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            subcommands: IndexMap::new(),
        }
    }

    /// Add a nested command, returning `self` for chaining.
    pub fn with_subcommand(mut self, name: impl Into<String>, def: CommandDef) -> Self {
        self.subcommands.insert(name.into(), def);
        self
    }
}

/// A command-definition document: `[commands.<name>]` tables.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CommandFile {
    pub commands: IndexMap<String, CommandDef>,
}

impl CommandFile {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a top-level command, returning `self` for chaining.
    pub fn with_command(mut self, name: impl Into<String>, def: CommandDef) -> Self {
        self.commands.insert(name.into(), def);
        self
    }

    pub fn from_toml_str(source: &str) -> Result<Self> {
        let file: Self = toml::from_str(source)?;
        file.validate()?;
        Ok(file)
    }

    pub fn from_json_str(source: &str) -> Result<Self> {
        let file: Self = serde_json::from_str(source)?;
        file.validate()?;
        Ok(file)
    }

    /// Load a definition file, choosing the format by extension
    /// (`.json` is JSON, anything else is TOML).
    pub fn load(path: &Path) -> Result<Self> {
        let source = std::fs::read_to_string(path)?;
        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        log::debug!("Loading command definitions from {}", path.display());
        if is_json {
            Self::from_json_str(&source)
        } else {
            Self::from_toml_str(&source)
        }
    }

    /// Check structural rules serde cannot express.
    pub fn validate(&self) -> Result<()> {
        if self.commands.is_empty() {
            return Err(ConsoleError::Config(
                "command file does not define any commands".to_string(),
            ));
        }
        validate_level(&self.commands, "")
    }

    /// Total number of entries, nested ones included.
    pub fn len(&self) -> usize {
        fn count(level: &IndexMap<String, CommandDef>) -> usize {
            level.values().map(|d| 1 + count(&d.subcommands)).sum()
        }
        count(&self.commands)
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

fn validate_level(level: &IndexMap<String, CommandDef>, parent: &str) -> Result<()> {
    for (name, def) in level {
        let path = if parent.is_empty() {
            name.clone()
        } else {
            format!("{parent} {name}")
        };
        if name.is_empty() || name.chars().any(char::is_whitespace) {
            return Err(ConsoleError::Config(format!(
                "invalid command name '{path}': names must be non-empty and contain no whitespace"
            )));
        }
        if def.action.trim().is_empty() {
            return Err(ConsoleError::Config(format!(
                "command '{path}' does not contain an 'action' parameter"
            )));
        }
        validate_level(&def.subcommands, &path)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
[commands.help]
action = "show_help"

[commands.hello]
action = "say_hello"

[commands.config]
action = "config_root"

[commands.config.subcommands.show]
action = "config_show"

[commands.config.subcommands.set]
action = "config_set"
"#;

    #[test]
    fn console_config_defaults() {
        let c = ConsoleConfig::default();
        assert_eq!(c.prompt, "> ");
        assert_eq!(c.max_history, 20);
        assert_eq!(c.max_line_len, 1024);
        assert!(c.banner.is_empty());
        assert!(!c.color);
        assert!(c.is_exit_keyword("EXIT"));
        assert!(c.is_exit_keyword("Quit"));
        assert!(c.is_exit_keyword("q"));
        assert!(!c.is_exit_keyword("quiet"));
    }

    #[test]
    fn console_config_partial_toml() {
        let c = ConsoleConfig::from_toml_str("prompt = \"quill> \"\nmax_history = 5\n").unwrap();
        assert_eq!(c.prompt, "quill> ");
        assert_eq!(c.max_history, 5);
        assert_eq!(c.max_line_len, MAX_CMD_LEN);
        assert!(ConsoleConfig::from_toml_str("color = true").unwrap().color);
    }

    #[test]
    fn console_config_rejects_zero_line_len() {
        let err = ConsoleConfig::from_toml_str("max_line_len = 0").unwrap_err();
        assert!(matches!(err, ConsoleError::Config(_)));
    }

    #[test]
    fn command_file_preserves_order() {
        let file = CommandFile::from_toml_str(SAMPLE).unwrap();
        let names: Vec<&str> = file.commands.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["help", "hello", "config"]);
        let subs: Vec<&str> = file.commands["config"]
            .subcommands
            .keys()
            .map(String::as_str)
            .collect();
        assert_eq!(subs, vec!["show", "set"]);
        assert_eq!(file.len(), 5);
    }

    #[test]
    fn command_file_from_json() {
        let json = r#"{"commands": {"greet": {"action": "greet"},
                       "net": {"action": "net", "subcommands": {"up": {"action": "net_up"}}}}}"#;
        let file = CommandFile::from_json_str(json).unwrap();
        assert_eq!(file.commands["greet"].action, "greet");
        assert_eq!(file.commands["net"].subcommands["up"].action, "net_up");
    }

    #[test]
    fn command_file_missing_commands_section() {
        let err = CommandFile::from_toml_str("title = \"nothing\"").unwrap_err();
        assert!(matches!(err, ConsoleError::TomlParse(_)));
    }

    #[test]
    fn command_file_missing_action() {
        let err = CommandFile::from_toml_str("[commands.greet]\nhelp = \"x\"\n").unwrap_err();
        assert!(matches!(err, ConsoleError::TomlParse(_)));
    }

    #[test]
    fn command_file_empty_action() {
        let err = CommandFile::from_toml_str("[commands.greet]\naction = \"  \"\n").unwrap_err();
        match err {
            ConsoleError::Config(msg) => assert!(msg.contains("greet")),
            other => panic!("expected config error, got {other:?}"),
        }
    }

    #[test]
    fn command_file_nested_bad_name() {
        let file = CommandFile::new().with_command(
            "net",
            CommandDef::new("net").with_subcommand("bad name", CommandDef::new("x")),
        );
        let err = file.validate().unwrap_err();
        match err {
            ConsoleError::Config(msg) => assert!(msg.contains("net bad name")),
            other => panic!("expected config error, got {other:?}"),
        }
    }

    #[test]
    fn command_file_empty_is_rejected() {
        assert!(CommandFile::new().validate().is_err());
        assert!(CommandFile::new().is_empty());
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let err = CommandFile::load(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(matches!(err, ConsoleError::Io(_)));
    }

    #[test]
    fn load_by_extension() {
        let dir = std::env::temp_dir();
        let json_path = dir.join(format!("quill-defs-{}.json", std::process::id()));
        std::fs::write(&json_path, r#"{"commands": {"a": {"action": "a"}}}"#).unwrap();
        let file = CommandFile::load(&json_path).unwrap();
        assert_eq!(file.len(), 1);
        std::fs::remove_file(&json_path).unwrap();

        let toml_path = dir.join(format!("quill-defs-{}.toml", std::process::id()));
        std::fs::write(&toml_path, SAMPLE).unwrap();
        let file = CommandFile::load(&toml_path).unwrap();
        assert_eq!(file.len(), 5);
        std::fs::remove_file(&toml_path).unwrap();
    }

    mod prop {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn exit_keywords_ignore_ascii_case(word in "[a-zA-Z]{1,8}", upper in any::<bool>()) {
                let config = ConsoleConfig {
                    exit_keywords: vec![word.to_ascii_lowercase()],
                    ..ConsoleConfig::default()
                };
                let typed = if upper { word.to_ascii_uppercase() } else { word.clone() };
                prop_assert!(config.is_exit_keyword(&typed));
            }

            #[test]
            fn toml_scalars_override_defaults(
                prompt in "[a-z>$ ]{0,10}",
                max_history in 1usize..500,
                max_line_len in 1usize..5000,
            ) {
                let source = format!(
                    "prompt = \"{prompt}\"\nmax_history = {max_history}\nmax_line_len = {max_line_len}\n"
                );
                let c = ConsoleConfig::from_toml_str(&source).unwrap();
                prop_assert_eq!(c.prompt, prompt);
                prop_assert_eq!(c.max_history, max_history);
                prop_assert_eq!(c.max_line_len, max_line_len);
                prop_assert_eq!(c.exit_keywords, ConsoleConfig::default().exit_keywords);
            }

            #[test]
            fn json_definitions_keep_declaration_order(
                names in proptest::collection::vec("[a-z]{1,6}", 1..8),
            ) {
                let mut unique: Vec<String> = Vec::new();
                for n in names {
                    if !unique.contains(&n) {
                        unique.push(n);
                    }
                }
                let entries: Vec<String> = unique
                    .iter()
                    .map(|n| format!("\"{n}\": {{\"action\": \"{n}\"}}"))
                    .collect();
                let source = format!("{{\"commands\": {{{}}}}}", entries.join(", "));
                let file = CommandFile::from_json_str(&source).unwrap();
                let loaded: Vec<&String> = file.commands.keys().collect();
                prop_assert_eq!(loaded, unique.iter().collect::<Vec<_>>());
            }
        }
    }
}
