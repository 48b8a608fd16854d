//! Crossterm key source.

use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use quill_types::backend::KeySource;
use quill_types::error::Result;
use quill_types::input::KeyEvent;

/// Reads key presses from the terminal. Expects raw mode to be enabled.
pub struct CrosstermKeys;

impl KeySource for CrosstermKeys {
    fn read_key(&mut self) -> Result<KeyEvent> {
        loop {
            // Releases, repeats on some platforms, resizes and mouse events
            // are not editing input.
            if let Event::Key(key) = event::read()?
                && key.kind == KeyEventKind::Press
            {
                return Ok(map_key(key.code, key.modifiers));
            }
        }
    }
}

fn map_key(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
    let ctrl = modifiers.contains(KeyModifiers::CONTROL);
    match code {
        KeyCode::Char('c' | 'd') if ctrl => KeyEvent::Cancel,
        KeyCode::Char(_) if ctrl => KeyEvent::Unrecognized,
        KeyCode::Char(c) => KeyEvent::Char(c),
        KeyCode::Enter => KeyEvent::Enter,
        KeyCode::Backspace => KeyEvent::Backspace,
        KeyCode::Tab => KeyEvent::Tab,
        KeyCode::Up => KeyEvent::Up,
        KeyCode::Down => KeyEvent::Down,
        KeyCode::Left => KeyEvent::Left,
        KeyCode::Right => KeyEvent::Right,
        _ => KeyEvent::Unrecognized,
    }
}
