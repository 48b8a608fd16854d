//! Line editor: turns key events into a committed line.
//!
//! Every key event leaves the terminal showing `prompt + content` with the
//! cursor on the logical column. Edits in the middle of the line reprint the
//! suffix and step back over it; whole-line changes (history recall, tab
//! completion) return to the prompt, erase and reprint.

use quill_types::backend::{KeySource, OutputSink};
use quill_types::config::MAX_CMD_LEN;
use quill_types::error::Result;
use quill_types::input::KeyEvent;

use crate::buffer::LineBuffer;
use crate::completion::{CompletionResult, complete};
use crate::history::{Direction, HistoryNavigator, HistoryStore};
use crate::tokenize::{join, tokenize};
use crate::tree::CommandTree;

/// How an editing session ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadOutcome {
    /// Enter was pressed; the raw, untrimmed line.
    Line(String),
    /// The cancel key was pressed.
    Cancelled,
}

/// Interactive editor for a single line.
#[derive(Debug, Clone)]
pub struct LineEditor {
    prompt: String,
    max_len: usize,
    buffer: LineBuffer,
    nav: HistoryNavigator,
}

impl LineEditor {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            max_len: MAX_CMD_LEN,
            buffer: LineBuffer::new(),
            nav: HistoryNavigator::new(),
        }
    }

    /// Limit the buffer to `max_len` characters. Typing stops at the limit,
    /// recalled history entries are cut to it and completions that would
    /// overrun it are not applied.
    pub fn with_max_len(mut self, max_len: usize) -> Self {
        self.max_len = max_len;
        self
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn buffer(&self) -> &LineBuffer {
        &self.buffer
    }

    /// The part of the prompt on the line the buffer is drawn on.
    fn prompt_tail(&self) -> &str {
        self.prompt.rsplit('\n').next().unwrap_or_default()
    }

    /// Reset to an empty line and print the prompt.
    pub fn start(&mut self, out: &mut dyn OutputSink) -> Result<()> {
        self.buffer.clear();
        self.nav.reset();
        out.write_str(&self.prompt)?;
        out.flush()
    }

    /// Run a whole session: print the prompt, then consume keys until Enter
    /// or Cancel. `on_key` sees each event before it is applied.
    pub fn read_line(
        &mut self,
        keys: &mut dyn KeySource,
        out: &mut dyn OutputSink,
        history: &HistoryStore,
        tree: &CommandTree,
        mut on_key: impl FnMut(KeyEvent),
    ) -> Result<ReadOutcome> {
        self.start(out)?;
        loop {
            let key = keys.read_key()?;
            on_key(key);
            if let Some(outcome) = self.handle_key(key, out, history, tree)? {
                return Ok(outcome);
            }
        }
    }

    /// Apply one key event. Returns the outcome when the session ends.
    pub fn handle_key(
        &mut self,
        key: KeyEvent,
        out: &mut dyn OutputSink,
        history: &HistoryStore,
        tree: &CommandTree,
    ) -> Result<Option<ReadOutcome>> {
        let outcome = match key {
            KeyEvent::Char(c) => {
                self.insert(c, out)?;
                None
            },
            KeyEvent::Backspace => {
                self.backspace(out)?;
                None
            },
            KeyEvent::Left => {
                if self.buffer.move_left() {
                    out.move_left(1)?;
                }
                None
            },
            KeyEvent::Right => {
                if let Some(c) = self.buffer.char_at_cursor() {
                    self.buffer.move_right();
                    out.write_str(c.encode_utf8(&mut [0; 4]))?;
                }
                None
            },
            KeyEvent::Up => {
                self.recall(Direction::Up, out, history)?;
                None
            },
            KeyEvent::Down => {
                self.recall(Direction::Down, out, history)?;
                None
            },
            KeyEvent::Tab => {
                self.complete(out, tree)?;
                None
            },
            KeyEvent::Enter => {
                out.newline()?;
                Some(ReadOutcome::Line(self.buffer.text()))
            },
            KeyEvent::Cancel => Some(ReadOutcome::Cancelled),
            KeyEvent::Unrecognized => None,
        };
        out.flush()?;
        Ok(outcome)
    }

    fn insert(&mut self, c: char, out: &mut dyn OutputSink) -> Result<()> {
        if self.buffer.len() >= self.max_len {
            return Ok(());
        }
        self.buffer.insert(c);
        let suffix = self.buffer.suffix();
        out.write_str(c.encode_utf8(&mut [0; 4]))?;
        self.reprint_suffix(&suffix, out)
    }

    fn backspace(&mut self, out: &mut dyn OutputSink) -> Result<()> {
        if !self.buffer.backspace() {
            return Ok(());
        }
        out.move_left(1)?;
        out.erase_to_end()?;
        let suffix = self.buffer.suffix();
        self.reprint_suffix(&suffix, out)
    }

    /// Print `suffix` and step back to the logical cursor column.
    fn reprint_suffix(&self, suffix: &str, out: &mut dyn OutputSink) -> Result<()> {
        if suffix.is_empty() {
            return Ok(());
        }
        out.write_str(suffix)?;
        out.move_left(suffix.chars().count())
    }

    /// Swap the visible line for `text`, leaving the cursor at the end.
    fn replace_line(&mut self, text: &str, out: &mut dyn OutputSink) -> Result<()> {
        out.move_left(self.buffer.cursor())?;
        out.erase_to_end()?;
        self.buffer.replace(text);
        out.write_str(text)
    }

    fn recall(
        &mut self,
        direction: Direction,
        out: &mut dyn OutputSink,
        history: &HistoryStore,
    ) -> Result<()> {
        let current = self.buffer.text();
        match self.nav.navigate(history, direction, &current) {
            Some(text) => {
                let text: String = text.chars().take(self.max_len).collect();
                self.replace_line(&text, out)
            },
            None => Ok(()),
        }
    }

    fn complete(&mut self, out: &mut dyn OutputSink, tree: &CommandTree) -> Result<()> {
        let text = self.buffer.text();
        let mut tokens = match tokenize(&text) {
            Ok(tokens) => tokens,
            Err(e) => {
                log::debug!("No completion for unbalanced line: {e}");
                return Ok(());
            },
        };
        if self.buffer.ends_with(' ') && self.buffer.at_end() {
            tokens.push(String::new());
        }
        if tokens.is_empty() {
            return Ok(());
        }

        let result = complete(tree, &tokens);
        log::debug!("Completion for {tokens:?}: {result:?}");
        match result {
            CompletionResult::NoMatch => Ok(()),
            CompletionResult::SingleMatch(name) => {
                if let Some(last) = tokens.last_mut() {
                    *last = name;
                }
                let line = format!("{} ", join(&tokens));
                if line.chars().count() > self.max_len {
                    log::debug!("Completion {line:?} exceeds {} chars", self.max_len);
                    return Ok(());
                }
                self.replace_line(&line, out)
            },
            CompletionResult::MultipleMatches {
                names,
                common_prefix,
            } => {
                let line = if common_prefix.is_empty() {
                    text
                } else {
                    if let Some(last) = tokens.last_mut() {
                        *last = common_prefix;
                    }
                    let filled = join(&tokens);
                    if filled.chars().count() > self.max_len { text } else { filled }
                };
                out.newline()?;
                out.write_str(&names.join("  "))?;
                out.newline()?;
                self.buffer.replace(&line);
                out.write_str(self.prompt_tail())?;
                out.write_str(&line)
            },
        }
    }
}
