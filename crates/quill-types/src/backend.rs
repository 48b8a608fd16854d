//! Backend trait definitions.
//!
//! The console core performs all I/O through these two traits. It never
//! touches a terminal directly, so the same editor and dispatcher run against
//! a raw-mode tty, a socket, or an in-memory test terminal.

use crate::error::Result;
use crate::input::KeyEvent;

/// Blocking source of logical key events.
pub trait KeySource {
    /// Block until the next key event is available.
    fn read_key(&mut self) -> Result<KeyEvent>;
}

/// Character-stream writer with cursor-relative control.
///
/// Only two control operations are required: moving the cursor left on the
/// current line and erasing from the cursor to the end of the line.
pub trait OutputSink {
    /// Write text at the cursor, advancing it.
    fn write_str(&mut self, text: &str) -> Result<()>;

    /// Move the cursor `n` columns to the left on the current line.
    fn move_left(&mut self, n: usize) -> Result<()>;

    /// Erase everything from the cursor to the end of the current line.
    fn erase_to_end(&mut self) -> Result<()>;

    /// Start a new line.
    fn newline(&mut self) -> Result<()> {
        self.write_str("\n")
    }

    /// Push buffered output to the device.
    fn flush(&mut self) -> Result<()> {
        Ok(())
    }

    /// Write text followed by a newline.
    fn write_line(&mut self, text: &str) -> Result<()> {
        self.write_str(text)?;
        self.newline()
    }
}

impl<T: KeySource + ?Sized> KeySource for Box<T> {
    fn read_key(&mut self) -> Result<KeyEvent> {
        (**self).read_key()
    }
}

impl<T: OutputSink + ?Sized> OutputSink for Box<T> {
    fn write_str(&mut self, text: &str) -> Result<()> {
        (**self).write_str(text)
    }

    fn move_left(&mut self, n: usize) -> Result<()> {
        (**self).move_left(n)
    }

    fn erase_to_end(&mut self) -> Result<()> {
        (**self).erase_to_end()
    }

    fn newline(&mut self) -> Result<()> {
        (**self).newline()
    }

    fn flush(&mut self) -> Result<()> {
        (**self).flush()
    }
}
