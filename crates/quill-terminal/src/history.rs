//! Command history: a bounded, most-recent-first list plus a navigator that
//! walks it with the arrow keys.

use std::collections::VecDeque;

use quill_types::config::MAX_HIST_LEN;

/// Bounded record of submitted lines, newest first.
#[derive(Debug, Clone)]
pub struct HistoryStore {
    entries: VecDeque<String>,
    limit: usize,
}

impl HistoryStore {
    /// Create an empty store holding at most [`MAX_HIST_LEN`] entries.
    pub fn new() -> Self {
        Self::with_limit(MAX_HIST_LEN)
    }

    /// Create an empty store holding at most `limit` entries (minimum 1).
    pub fn with_limit(limit: usize) -> Self {
        let limit = limit.max(1);
        Self {
            entries: VecDeque::with_capacity(limit),
            limit,
        }
    }

    /// Push a line to the front.
    ///
    /// A line equal to the current newest entry is not duplicated. The
    /// oldest entry is dropped once the limit is exceeded.
    pub fn push(&mut self, line: &str) {
        if self.entries.front().is_some_and(|front| front == line) {
            return;
        }
        self.entries.push_front(line.to_string());
        if self.entries.len() > self.limit {
            self.entries.pop_back();
        }
    }

    /// Entry at `index`, 0 being the newest.
    pub fn get(&self, index: usize) -> Option<&str> {
        self.entries.get(index).map(String::as_str)
    }

    /// Iterate newest first.
    pub fn entries(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl Default for HistoryStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Direction of a history step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Toward older entries.
    Up,
    /// Toward newer entries, and finally back to the live buffer.
    Down,
}

/// Browsing state for one editing session.
///
/// `index` is `None` while the user is editing the live line. The live line
/// is saved on the first step up and handed back when stepping down past the
/// newest entry.
#[derive(Debug, Clone, Default)]
pub struct HistoryNavigator {
    index: Option<usize>,
    saved: String,
}

impl HistoryNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Position of the shown entry, `None` while editing the live line.
    pub fn index(&self) -> Option<usize> {
        self.index
    }

    /// Take one step and return the text that should replace the line, or
    /// `None` when the step is out of range.
    pub fn navigate(
        &mut self,
        store: &HistoryStore,
        direction: Direction,
        current: &str,
    ) -> Option<String> {
        match direction {
            Direction::Up => {
                let next = self.index.map_or(0, |i| i + 1);
                if next >= store.len() {
                    return None;
                }
                if self.index.is_none() {
                    self.saved = current.to_string();
                }
                self.index = Some(next);
                store.get(next).map(str::to_string)
            },
            Direction::Down => match self.index? {
                0 => {
                    self.index = None;
                    Some(std::mem::take(&mut self.saved))
                },
                i => {
                    self.index = Some(i - 1);
                    store.get(i - 1).map(str::to_string)
                },
            },
        }
    }

    /// Forget browsing state.
    pub fn reset(&mut self) {
        self.index = None;
        self.saved.clear();
    }
}
