//! Per-command argument parser.
//!
//! A parser declares positionals (required, in order), optionals
//! (`--name <value>`) and flags (`-name`). Parsing never exits or panics:
//! failures come back as a [`ParseError`] carrying the usage line.

use std::collections::BTreeMap;
use std::fmt;

use quill_types::backend::OutputSink;
use quill_types::error::{ConsoleError, ParseError, ParseErrorKind, Result};

use crate::sink::{BOLD, RESET};

const INDENT: &str = "  ";

/// Primitive type an argument value converts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueType {
    Str,
    Int,
    Float,
    Bool,
}

impl ValueType {
    /// Name shown in usage strings.
    pub fn label(self) -> &'static str {
        match self {
            Self::Str => "STR",
            Self::Int => "INT",
            Self::Float => "FLOAT",
            Self::Bool => "BOOL",
        }
    }

    fn convert(self, raw: &str) -> Option<Value> {
        match self {
            Self::Str => Some(Value::Str(raw.to_string())),
            Self::Int => raw.parse().ok().map(Value::Int),
            Self::Float => raw.parse().ok().map(Value::Float),
            Self::Bool => match raw.to_ascii_lowercase().as_str() {
                "true" | "yes" | "on" | "1" => Some(Value::Bool(true)),
                "false" | "no" | "off" | "0" => Some(Value::Bool(false)),
                _ => None,
            },
        }
    }
}

/// A parsed argument value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Str(s) => write!(f, "{s}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::Bool(b) => write!(f, "{b}"),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Str(s)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Self::Float(x)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

/// Parsed arguments handed to an action.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Namespace {
    values: BTreeMap<String, Value>,
}

impl Namespace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn get_str(&self, name: &str) -> Option<&str> {
        match self.values.get(name) {
            Some(Value::Str(s)) => Some(s),
            _ => None,
        }
    }

    pub fn get_int(&self, name: &str) -> Option<i64> {
        match self.values.get(name) {
            Some(Value::Int(i)) => Some(*i),
            _ => None,
        }
    }

    pub fn get_float(&self, name: &str) -> Option<f64> {
        match self.values.get(name) {
            Some(Value::Float(x)) => Some(*x),
            Some(Value::Int(i)) => Some(*i as f64),
            _ => None,
        }
    }

    /// Boolean value of `name`; `false` when absent.
    pub fn flag(&self, name: &str) -> bool {
        matches!(self.values.get(name), Some(Value::Bool(true)))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterate in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Namespace {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut ns = Self::new();
        for (k, v) in iter {
            ns.insert(k, v);
        }
        ns
    }
}

/// Category of a declared argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgumentKind {
    Positional,
    Optional,
    Flag,
}

/// A declared argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Argument {
    pub kind: ArgumentKind,
    pub name: String,
    pub value_type: ValueType,
    pub help: String,
    /// Namespace key for flags, when it differs from the flag's name.
    pub metaname: Option<String>,
}

impl Argument {
    /// Key the parsed value is stored under.
    pub fn key(&self) -> &str {
        self.metaname.as_deref().unwrap_or(&self.name)
    }

    fn display_name(&self) -> String {
        match self.kind {
            ArgumentKind::Positional => self.name.clone(),
            ArgumentKind::Optional => format!("--{}", self.name),
            ArgumentKind::Flag => format!("-{}", self.name),
        }
    }
}

/// Argument schema for one command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArgumentParser {
    name: String,
    description: String,
    epilog: String,
    positionals: Vec<Argument>,
    optionals: Vec<Argument>,
    flags: Vec<Argument>,
}

impl ArgumentParser {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            epilog: String::new(),
            positionals: Vec::new(),
            optionals: Vec::new(),
            flags: Vec::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_epilog(mut self, epilog: impl Into<String>) -> Self {
        self.epilog = epilog.into();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn positionals(&self) -> &[Argument] {
        &self.positionals
    }

    pub fn optionals(&self) -> &[Argument] {
        &self.optionals
    }

    pub fn flags(&self) -> &[Argument] {
        &self.flags
    }

    fn arguments(&self) -> impl Iterator<Item = &Argument> {
        self.positionals
            .iter()
            .chain(&self.optionals)
            .chain(&self.flags)
    }

    /// Namespace keys are shared by every category, so a positional and a
    /// flag may not both store under `key`.
    fn key_in_use(&self, key: &str) -> bool {
        self.arguments().any(|a| a.key() == key)
    }

    fn duplicate(&self, name: &str) -> ConsoleError {
        ConsoleError::DuplicateArgument {
            name: name.to_string(),
            command: self.name.clone(),
        }
    }

    /// Declare a required positional. Positionals bind in declaration order.
    pub fn add_positional(
        &mut self,
        name: &str,
        value_type: ValueType,
        help: &str,
    ) -> Result<&mut Self> {
        if self.key_in_use(name) {
            return Err(self.duplicate(name));
        }
        self.positionals.push(Argument {
            kind: ArgumentKind::Positional,
            name: name.to_string(),
            value_type,
            help: help.to_string(),
            metaname: None,
        });
        Ok(self)
    }

    /// Declare `--name <value>`.
    pub fn add_optional(
        &mut self,
        name: &str,
        value_type: ValueType,
        help: &str,
    ) -> Result<&mut Self> {
        if self.key_in_use(name) {
            return Err(self.duplicate(name));
        }
        self.optionals.push(Argument {
            kind: ArgumentKind::Optional,
            name: name.to_string(),
            value_type,
            help: help.to_string(),
            metaname: None,
        });
        Ok(self)
    }

    /// Declare `-name`, stored as a bool under `metaname` (or `name`).
    pub fn add_flag(&mut self, name: &str, metaname: Option<&str>, help: &str) -> Result<&mut Self> {
        let key = metaname.unwrap_or(name);
        if self.flags.iter().any(|a| a.name == name) || self.key_in_use(key) {
            return Err(self.duplicate(name));
        }
        self.flags.push(Argument {
            kind: ArgumentKind::Flag,
            name: name.to_string(),
            value_type: ValueType::Bool,
            help: help.to_string(),
            metaname: metaname.map(str::to_string),
        });
        Ok(self)
    }

    fn error(&self, kind: ParseErrorKind) -> ParseError {
        ParseError::new(kind, self.usage())
    }

    fn convert(&self, arg: &Argument, raw: &str) -> std::result::Result<Value, ParseError> {
        arg.value_type.convert(raw).ok_or_else(|| {
            self.error(ParseErrorKind::InvalidValue {
                argument: arg.display_name(),
                value: raw.to_string(),
                expected: arg.value_type.label().to_string(),
            })
        })
    }

    /// Parse `tokens` (the command name already removed).
    pub fn parse<S: AsRef<str>>(&self, tokens: &[S]) -> std::result::Result<Namespace, ParseError> {
        let mut ns = Namespace::new();
        for flag in &self.flags {
            ns.insert(flag.key(), false);
        }

        let mut next_positional = self.positionals.iter();
        let mut iter = tokens.iter().map(AsRef::as_ref);
        while let Some(token) = iter.next() {
            if let Some(name) = token.strip_prefix("--")
                && let Some(opt) = self.optionals.iter().find(|a| a.name == name)
            {
                let raw = iter
                    .next()
                    .ok_or_else(|| self.error(ParseErrorKind::MissingValue(opt.name.clone())))?;
                ns.insert(opt.key(), self.convert(opt, raw)?);
                continue;
            }
            if let Some(name) = token.strip_prefix('-')
                && let Some(flag) = self.flags.iter().find(|a| a.name == name)
            {
                ns.insert(flag.key(), true);
                continue;
            }
            if looks_like_marker(token) {
                return Err(self.error(ParseErrorKind::UnrecognizedToken(token.to_string())));
            }
            match next_positional.next() {
                Some(pos) => ns.insert(pos.key(), self.convert(pos, token)?),
                None => {
                    return Err(self.error(ParseErrorKind::UnrecognizedToken(token.to_string())));
                },
            }
        }

        if let Some(missing) = next_positional.next() {
            return Err(self.error(ParseErrorKind::MissingPositional(missing.name.clone())));
        }
        Ok(ns)
    }

    /// `name pos.. [--opt <TYPE>].. [-flag]..`
    pub fn usage(&self) -> String {
        let mut usage = self.name.clone();
        for p in &self.positionals {
            usage.push(' ');
            usage.push_str(&p.name);
        }
        for o in &self.optionals {
            usage.push_str(&format!(" [--{} <{}>]", o.name, o.value_type.label()));
        }
        for f in &self.flags {
            usage.push_str(&format!(" [-{}]", f.name));
        }
        usage
    }

    /// Full help: description, usage, argument lists, epilog.
    pub fn help_text(&self) -> String {
        self.render_help(false)
    }

    /// [`help_text`](Self::help_text), with section headings in bold when
    /// `color` is set.
    pub fn render_help(&self, color: bool) -> String {
        let heading = |title: &str| {
            if color {
                format!("{BOLD}{title}:{RESET}")
            } else {
                format!("{title}:")
            }
        };
        let mut out = String::new();
        if self.description.is_empty() {
            out.push_str(&format!("{}\n\n", self.name));
        } else {
            out.push_str(&format!("{}: {}\n\n", self.name, self.description));
        }
        out.push_str(&format!("{} {}\n", heading("Usage"), self.usage()));
        for (title, args) in [
            ("Positional arguments", &self.positionals),
            ("Optional arguments", &self.optionals),
            ("Flags", &self.flags),
        ] {
            if args.is_empty() {
                continue;
            }
            out.push_str(&format!("\n{}\n", heading(title)));
            let width = args
                .iter()
                .map(|a| a.display_name().chars().count())
                .max()
                .unwrap_or(0);
            for a in args {
                out.push_str(&format!(
                    "{INDENT}{:width$}  {}\n",
                    a.display_name(),
                    a.help
                ));
            }
        }
        if !self.epilog.is_empty() {
            out.push_str(&format!("\n{}\n", self.epilog));
        }
        out
    }

    /// Write [`help_text`](Self::help_text) to a sink.
    pub fn print_help(&self, out: &mut dyn OutputSink) -> Result<()> {
        self.write_help(out, false)
    }

    pub fn write_help(&self, out: &mut dyn OutputSink, color: bool) -> Result<()> {
        for line in self.render_help(color).lines() {
            out.write_line(line)?;
        }
        Ok(())
    }
}

/// A token that is spelled like an optional or flag rather than a value.
/// Negative numbers are values.
fn looks_like_marker(token: &str) -> bool {
    token.len() > 1 && token.starts_with('-') && token.parse::<f64>().is_err()
}
