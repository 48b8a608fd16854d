//! Error types for quill.

use std::fmt;
use std::io;

/// Errors produced by the quill console.
///
/// Setup errors (`Config`, `DuplicateArgument`, `DuplicateCommand`,
/// `UnresolvedAction`, `TomlParse`, `Json`) surface from console
/// construction. Per-line errors are reported at the dispatch boundary and
/// never end the loop.
#[derive(Debug, thiserror::Error)]
pub enum ConsoleError {
    #[error("config error: {0}")]
    Config(String),

    #[error("argument '{name}' already exists in command '{command}'")]
    DuplicateArgument { name: String, command: String },

    #[error("command '{0}' is registered more than once")]
    DuplicateCommand(String),

    #[error("in command '{command}': action '{action}' is not a registered console action")]
    UnresolvedAction { command: String, action: String },

    #[error("{0}")]
    Parse(#[from] ParseError),

    #[error("unrecognized command: '{0}'")]
    DispatchNotFound(String),

    #[error("command '{command}' failed: {message}")]
    ActionFailed { command: String, message: String },

    #[error("could not split line: {0}")]
    Tokenize(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ConsoleError {
    /// Whether the console loop keeps running after this error.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::Parse(_) | Self::DispatchNotFound(_) | Self::ActionFailed { .. } | Self::Tokenize(_)
        )
    }
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, ConsoleError>;

/// What went wrong while parsing a command's arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// Fewer tokens than declared positionals.
    MissingPositional(String),
    /// A token that fills no positional slot and names no optional or flag.
    UnrecognizedToken(String),
    /// An optional given as the last token, with nothing to consume.
    MissingValue(String),
    /// A value that does not convert to the declared type.
    InvalidValue {
        argument: String,
        value: String,
        expected: String,
    },
}

impl fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingPositional(name) => write!(f, "missing positional `{name}`"),
            Self::UnrecognizedToken(token) => write!(f, "unrecognized token `{token}`"),
            Self::MissingValue(name) => write!(f, "optional `--{name}` expects a value"),
            Self::InvalidValue {
                argument,
                value,
                expected,
            } => write!(f, "invalid value `{value}` for `{argument}`: expected {expected}"),
        }
    }
}

/// A recoverable argument parse failure, always carrying the usage line of
/// the parser that produced it.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}\nusage: {usage}")]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub usage: String,
}

impl ParseError {
    pub fn new(kind: ParseErrorKind, usage: impl Into<String>) -> Self {
        Self {
            kind,
            usage: usage.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_display() {
        let e = ConsoleError::Config("missing key".into());
        assert_eq!(format!("{e}"), "config error: missing key");
    }

    #[test]
    fn duplicate_argument_display() {
        let e = ConsoleError::DuplicateArgument {
            name: "path".into(),
            command: "ls".into(),
        };
        assert_eq!(
            format!("{e}"),
            "argument 'path' already exists in command 'ls'"
        );
    }

    #[test]
    fn unresolved_action_display() {
        let e = ConsoleError::UnresolvedAction {
            command: "greet".into(),
            action: "say_hi".into(),
        };
        let msg = format!("{e}");
        assert!(msg.contains("greet"));
        assert!(msg.contains("say_hi"));
    }

    #[test]
    fn dispatch_not_found_display() {
        let e = ConsoleError::DispatchNotFound("frob".into());
        assert_eq!(format!("{e}"), "unrecognized command: 'frob'");
    }

    #[test]
    fn parse_error_carries_usage() {
        let e = ParseError::new(ParseErrorKind::MissingPositional("b".into()), "add a b");
        assert_eq!(format!("{e}"), "missing positional `b`\nusage: add a b");
    }

    #[test]
    fn parse_error_converts_into_console_error() {
        let e: ConsoleError =
            ParseError::new(ParseErrorKind::UnrecognizedToken("--x".into()), "cmd").into();
        assert!(matches!(e, ConsoleError::Parse(_)));
        assert!(format!("{e}").starts_with("unrecognized token `--x`"));
    }

    #[test]
    fn invalid_value_display() {
        let kind = ParseErrorKind::InvalidValue {
            argument: "count".into(),
            value: "ten".into(),
            expected: "INT".into(),
        };
        assert_eq!(
            kind.to_string(),
            "invalid value `ten` for `count`: expected INT"
        );
    }

    #[test]
    fn io_error_from_conversion() {
        let io_err = io::Error::new(io::ErrorKind::BrokenPipe, "gone");
        let e: ConsoleError = io_err.into();
        let msg = format!("{e}");
        assert!(msg.contains("I/O error"));
        assert!(msg.contains("gone"));
    }

    #[test]
    fn toml_error_from_conversion() {
        let toml_err = toml::from_str::<toml::Value>("this is [[[not valid toml").unwrap_err();
        let e: ConsoleError = toml_err.into();
        assert!(format!("{e}").contains("TOML parse error"));
    }

    #[test]
    fn json_error_from_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("not json").unwrap_err();
        let e: ConsoleError = json_err.into();
        assert!(format!("{e}").contains("JSON error"));
    }

    #[test]
    fn recoverable_classification() {
        assert!(ConsoleError::DispatchNotFound("x".into()).is_recoverable());
        assert!(ConsoleError::Tokenize("quote".into()).is_recoverable());
        assert!(
            ConsoleError::ActionFailed {
                command: "x".into(),
                message: "boom".into()
            }
            .is_recoverable()
        );
        assert!(!ConsoleError::Config("bad".into()).is_recoverable());
        assert!(!ConsoleError::Io(io::Error::other("x")).is_recoverable());
    }
}
