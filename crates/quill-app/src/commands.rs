//! Demo actions and their argument parsers.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use quill_terminal::{ActionTable, ArgumentParser, ConsoleBuilder, Namespace, ValueType};
use quill_types::backend::OutputSink;
use quill_types::config::{CommandFile, ConsoleConfig};
use quill_types::error::Result;

/// Register the demo parsers for the commands `definitions` declares.
pub fn register_parsers(
    builder: ConsoleBuilder,
    definitions: &CommandFile,
) -> Result<ConsoleBuilder> {
    let mut greet = ArgumentParser::new("greet").with_description("Say hello to someone");
    greet
        .add_positional("name", ValueType::Str, "who to greet")?
        .add_optional("times", ValueType::Int, "how many greetings")?
        .add_flag("l", Some("loud"), "greet in capitals")?;

    let mut echo = ArgumentParser::new("echo")
        .with_description("Print a piece of text")
        .with_epilog("Quote text containing spaces: echo 'hello there'");
    echo.add_positional("text", ValueType::Str, "text to print")?;

    let mut add = ArgumentParser::new("add").with_description("Add two numbers");
    add.add_positional("a", ValueType::Float, "first operand")?
        .add_positional("b", ValueType::Float, "second operand")?;

    let mut config = ArgumentParser::new("config").with_description("Show or change settings");
    config
        .add_positional("op", ValueType::Str, "show or set")?
        .add_optional("key", ValueType::Str, "setting to change")?
        .add_optional("value", ValueType::Str, "new value")?;

    Ok([greet, echo, add, config]
        .into_iter()
        .filter(|p| definitions.commands.contains_key(p.name()))
        .fold(builder, ConsoleBuilder::parser))
}

/// Build the demo action table. `config` reports the console settings and
/// keeps user settings for the session.
pub fn actions(console: &ConsoleConfig) -> ActionTable {
    let mut settings: BTreeMap<String, String> = BTreeMap::new();
    settings.insert("prompt".to_string(), console.prompt.clone());
    settings.insert("max_history".to_string(), console.max_history.to_string());
    settings.insert("max_line_len".to_string(), console.max_line_len.to_string());
    let settings = Rc::new(RefCell::new(settings));

    ActionTable::new()
        .with("greet", greet)
        .with("echo", echo)
        .with("add", add)
        .with(
            "config",
            move |args: &Namespace, out: &mut dyn OutputSink| -> anyhow::Result<()> {
                config(&settings, args, out)
            },
        )
}

fn greet(args: &Namespace, out: &mut dyn OutputSink) -> anyhow::Result<()> {
    let name = args.get_str("name").unwrap_or_default();
    let times = args.get_int("times").unwrap_or(1);
    if times < 1 {
        anyhow::bail!("--times must be positive, got {times}");
    }
    let line = if args.flag("loud") {
        format!("HELLO, {}!", name.to_uppercase())
    } else {
        format!("Hello, {name}!")
    };
    for _ in 0..times {
        out.write_line(&line)?;
    }
    Ok(())
}

fn echo(args: &Namespace, out: &mut dyn OutputSink) -> anyhow::Result<()> {
    out.write_line(args.get_str("text").unwrap_or_default())?;
    Ok(())
}

fn add(args: &Namespace, out: &mut dyn OutputSink) -> anyhow::Result<()> {
    let a = args.get_float("a").unwrap_or_default();
    let b = args.get_float("b").unwrap_or_default();
    out.write_line(&format!("{}", a + b))?;
    Ok(())
}

fn config(
    settings: &RefCell<BTreeMap<String, String>>,
    args: &Namespace,
    out: &mut dyn OutputSink,
) -> anyhow::Result<()> {
    match args.get_str("op").unwrap_or_default() {
        "show" => {
            for (key, value) in settings.borrow().iter() {
                out.write_line(&format!("{key} = {value}"))?;
            }
        },
        "set" => {
            let (Some(key), Some(value)) = (args.get_str("key"), args.get_str("value")) else {
                anyhow::bail!("config set needs --key and --value");
            };
            settings
                .borrow_mut()
                .insert(key.to_string(), value.to_string());
            out.write_line(&format!("{key} = {value}"))?;
        },
        other => anyhow::bail!("unknown config operation '{other}' (expected show or set)"),
    }
    Ok(())
}
