//! Edit buffer with a cursor.

/// Characters of the line being edited and the cursor position.
///
/// The cursor is a character index with `0 <= cursor <= len()`; every
/// mutation keeps both fields consistent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineBuffer {
    content: Vec<char>,
    cursor: usize,
}

impl LineBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.content.len()
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn at_end(&self) -> bool {
        self.cursor == self.content.len()
    }

    /// The whole line.
    pub fn text(&self) -> String {
        self.content.iter().collect()
    }

    /// Text from the cursor to the end.
    pub fn suffix(&self) -> String {
        self.content[self.cursor..].iter().collect()
    }

    /// Character under the cursor, if any.
    pub fn char_at_cursor(&self) -> Option<char> {
        self.content.get(self.cursor).copied()
    }

    pub fn ends_with(&self, c: char) -> bool {
        self.content.last() == Some(&c)
    }

    /// Insert at the cursor and advance it.
    pub fn insert(&mut self, c: char) {
        self.content.insert(self.cursor, c);
        self.cursor += 1;
    }

    /// Remove the character left of the cursor. Returns `false` at column 0.
    pub fn backspace(&mut self) -> bool {
        if self.cursor == 0 {
            return false;
        }
        self.cursor -= 1;
        self.content.remove(self.cursor);
        true
    }

    /// Returns `false` at column 0.
    pub fn move_left(&mut self) -> bool {
        if self.cursor == 0 {
            return false;
        }
        self.cursor -= 1;
        true
    }

    /// Returns `false` at the end of the line.
    pub fn move_right(&mut self) -> bool {
        if self.at_end() {
            return false;
        }
        self.cursor += 1;
        true
    }

    /// Replace the content and put the cursor at the end.
    pub fn replace(&mut self, text: &str) {
        self.content = text.chars().collect();
        self.cursor = self.content.len();
    }

    pub fn clear(&mut self) {
        self.content.clear();
        self.cursor = 0;
    }
}
