//! Keyboard modifier state tracking.

use super::events::Key;
use serde::Deserialize;

/// Modifier keys held while a key or pointer event was delivered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Modifiers {
    /// Shift key pressed
    pub shift: bool,
    /// Ctrl (or Cmd) key pressed
    pub ctrl: bool,
    /// Alt key pressed
    pub alt: bool,
}

impl Modifiers {
    /// Creates a new Modifiers instance with all keys released.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shift() -> Self {
        Self {
            shift: true,
            ..Self::default()
        }
    }

    pub fn ctrl() -> Self {
        Self {
            ctrl: true,
            ..Self::default()
        }
    }

    /// Ctrl+Z
    pub fn is_undo(&self, key: Key) -> bool {
        self.ctrl && matches!(key, Key::Char('z') | Key::Char('Z'))
    }

    /// Shift+Enter inserts a line break while typing text.
    pub fn is_newline(&self, key: Key) -> bool {
        self.shift && key == Key::Return
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn undo_requires_ctrl() {
        assert!(Modifiers::ctrl().is_undo(Key::Char('z')));
        assert!(!Modifiers::new().is_undo(Key::Char('z')));
        assert!(!Modifiers::ctrl().is_undo(Key::Char('y')));
    }

    #[test]
    fn newline_requires_shift_enter() {
        assert!(Modifiers::shift().is_newline(Key::Return));
        assert!(!Modifiers::new().is_newline(Key::Return));
    }
}
