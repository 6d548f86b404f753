//! Backend-neutral input event types.

/// Identifier of a pointer (mouse, pen or touch contact).
pub type PointerId = u32;

/// Generic key representation.
///
/// Hosts map their native key codes to these values; anything the overlay
/// does not react to becomes [`Key::Unknown`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    /// Regular character key (a-z, 0-9, symbols)
    Char(char),
    /// Escape key
    Escape,
    /// Return/Enter key
    Return,
    /// Backspace key
    Backspace,
    /// Space bar
    Space,
    /// Unmapped or unrecognized key
    Unknown,
}

impl Key {
    /// Parses a key name as used in replay scripts ("Escape", "Enter", "a", ...).
    pub fn from_name(name: &str) -> Key {
        match name {
            "Escape" | "Esc" => Key::Escape,
            "Return" | "Enter" => Key::Return,
            "Backspace" => Key::Backspace,
            "Space" | " " => Key::Space,
            other => {
                let mut chars = other.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Key::Char(c),
                    _ => Key::Unknown,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_names_parse() {
        assert_eq!(Key::from_name("Enter"), Key::Return);
        assert_eq!(Key::from_name("Esc"), Key::Escape);
        assert_eq!(Key::from_name("z"), Key::Char('z'));
        assert_eq!(Key::from_name("F13"), Key::Unknown);
    }
}
