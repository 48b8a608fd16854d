//! Output sink and key source implementations.
//!
//! [`AnsiSink`] drives a real terminal through any `io::Write`.
//! [`MemoryTerminal`] and [`ScriptedKeys`] are in-memory stand-ins that let
//! the editor and console run without a tty.

use std::collections::VecDeque;
use std::io::Write;

use quill_types::backend::{KeySource, OutputSink};
use quill_types::error::Result;
use quill_types::input::KeyEvent;

/// SGR sequences used when colour output is enabled.
pub const RED: &str = "\x1b[31m";
pub const BOLD: &str = "\x1b[1m";
pub const RESET: &str = "\x1b[0m";

/// Sink emitting ANSI control sequences to a writer.
pub struct AnsiSink<W: Write> {
    writer: W,
    /// Line terminator; raw-mode terminals need `\r\n`.
    newline: &'static str,
}

impl<W: Write> AnsiSink<W> {
    /// Sink for a cooked terminal or a plain stream.
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            newline: "\n",
        }
    }

    /// Sink for a terminal in raw mode, where `\n` does not return the
    /// carriage.
    pub fn raw(writer: W) -> Self {
        Self {
            writer,
            newline: "\r\n",
        }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> OutputSink for AnsiSink<W> {
    fn write_str(&mut self, text: &str) -> Result<()> {
        if self.newline == "\n" || !text.contains('\n') {
            self.writer.write_all(text.as_bytes())?;
        } else {
            self.writer
                .write_all(text.replace('\n', self.newline).as_bytes())?;
        }
        Ok(())
    }

    fn move_left(&mut self, n: usize) -> Result<()> {
        if n > 0 {
            write!(self.writer, "\x1b[{n}D")?;
        }
        Ok(())
    }

    fn erase_to_end(&mut self) -> Result<()> {
        self.writer.write_all(b"\x1b[K")?;
        Ok(())
    }

    fn newline(&mut self) -> Result<()> {
        self.writer.write_all(self.newline.as_bytes())?;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}

/// Single-cursor virtual terminal.
///
/// Finished lines scroll into `lines`; the current line is a character grid
/// that writes overwrite in place, so the visible text and cursor column can
/// be checked after every key.
#[derive(Debug, Default, Clone)]
pub struct MemoryTerminal {
    lines: Vec<String>,
    current: Vec<char>,
    col: usize,
    flushes: usize,
}

impl MemoryTerminal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Text of the line the cursor is on.
    pub fn current_line(&self) -> String {
        self.current.iter().collect()
    }

    /// Cursor column on the current line.
    pub fn cursor_col(&self) -> usize {
        self.col
    }

    /// Lines that have scrolled past.
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Everything written, one line per row, including the current line.
    pub fn transcript(&self) -> String {
        let mut out = self.lines.join("\n");
        if !self.lines.is_empty() {
            out.push('\n');
        }
        out.push_str(&self.current_line());
        out
    }

    pub fn flush_count(&self) -> usize {
        self.flushes
    }

    fn put(&mut self, c: char) {
        match c {
            '\n' => {
                self.lines.push(self.current.drain(..).collect());
                self.col = 0;
            },
            '\r' => self.col = 0,
            c => {
                if self.col < self.current.len() {
                    self.current[self.col] = c;
                } else {
                    // Writes past the end pad with blanks, like a real tty.
                    self.current.resize(self.col, ' ');
                    self.current.push(c);
                }
                self.col += 1;
            },
        }
    }
}

impl OutputSink for MemoryTerminal {
    fn write_str(&mut self, text: &str) -> Result<()> {
        for c in text.chars() {
            self.put(c);
        }
        Ok(())
    }

    fn move_left(&mut self, n: usize) -> Result<()> {
        self.col = self.col.saturating_sub(n);
        Ok(())
    }

    fn erase_to_end(&mut self) -> Result<()> {
        self.current.truncate(self.col);
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.flushes += 1;
        Ok(())
    }
}

/// Key source replaying a fixed sequence, then reporting `Cancel` forever.
#[derive(Debug, Default, Clone)]
pub struct ScriptedKeys {
    keys: VecDeque<KeyEvent>,
}

impl ScriptedKeys {
    pub fn new(keys: impl IntoIterator<Item = KeyEvent>) -> Self {
        Self {
            keys: keys.into_iter().collect(),
        }
    }

    /// Queue a typed line followed by `Enter`.
    pub fn line(mut self, text: &str) -> Self {
        self.keys.extend(quill_types::input::keys_for(text));
        self.keys.push_back(KeyEvent::Enter);
        self
    }

    /// Queue a single key.
    pub fn key(mut self, key: KeyEvent) -> Self {
        self.keys.push_back(key);
        self
    }

    /// Queue the characters of `text` without a terminating `Enter`.
    pub fn text(mut self, text: &str) -> Self {
        self.keys.extend(quill_types::input::keys_for(text));
        self
    }

    pub fn remaining(&self) -> usize {
        self.keys.len()
    }
}

impl KeySource for ScriptedKeys {
    fn read_key(&mut self) -> Result<KeyEvent> {
        Ok(self.keys.pop_front().unwrap_or(KeyEvent::Cancel))
    }
}
