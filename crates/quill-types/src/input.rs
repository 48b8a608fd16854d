//! Logical key events.
//!
//! Every key source maps its native input to [`KeyEvent`]. The console core
//! never sees raw terminal bytes.

/// A decoded key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyEvent {
    /// Printable character.
    Char(char),
    /// Return / Enter: commit the line.
    Enter,
    /// Delete the character left of the cursor.
    Backspace,
    /// Request completion.
    Tab,
    /// Older history entry.
    Up,
    /// Newer history entry.
    Down,
    Left,
    Right,
    /// Abort the session (Ctrl+C).
    Cancel,
    /// Anything the source could decode but the console does not handle.
    Unrecognized,
}

impl From<char> for KeyEvent {
    fn from(c: char) -> Self {
        match c {
            '\n' | '\r' => Self::Enter,
            '\t' => Self::Tab,
            c if c.is_control() => Self::Unrecognized,
            c => Self::Char(c),
        }
    }
}

/// Expand a string into one `Char` event per character.
pub fn keys_for(text: &str) -> Vec<KeyEvent> {
    text.chars().map(KeyEvent::from).collect()
}
