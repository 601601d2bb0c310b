use std::borrow::Cow;
use std::time::Instant;

/// Transition kind of a raw key event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyEdge {
    Down,
    Up,
}

/// Key identifier as reported by the key source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    /// Key whose name is a single character (letters, digits, most symbols).
    Char(char),
    /// Key with a multi-character name (e.g. "ctrl", "left ctrl", "space", "f1").
    Named(&'static str),
    /// Virtual-key code with no known name.
    Unknown(u16),
}

impl Key {
    pub fn name(&self) -> Cow<'static, str> {
        match self {
            Key::Char(c) => Cow::Owned(c.to_string()),
            Key::Named(n) => Cow::Borrowed(*n),
            Key::Unknown(vk) => Cow::Owned(format!("vk{:02x}", vk)),
        }
    }

    /// True for every spelling of the control key.
    pub fn is_ctrl(&self) -> bool {
        matches!(self, Key::Named("ctrl" | "left ctrl" | "right ctrl"))
    }

    /// Single numeral key, if any.
    pub fn digit(&self) -> Option<char> {
        match self {
            Key::Char(c) if c.is_ascii_digit() => Some(*c),
            _ => None,
        }
    }

    /// Collapses sided modifiers onto their generic name and lowercases letters.
    /// Chords are matched on canonical keys.
    pub fn canonical(self) -> Key {
        match self {
            Key::Named("left ctrl" | "right ctrl") => Key::Named("ctrl"),
            Key::Named("left shift" | "right shift") => Key::Named("shift"),
            Key::Named("left alt" | "right alt") => Key::Named("alt"),
            Key::Char(c) => Key::Char(c.to_ascii_lowercase()),
            other => other,
        }
    }
}

/// A single key transition delivered by the key source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    pub key: Key,
    pub edge: KeyEdge,
    pub t: Instant,
}

impl KeyEvent {
    pub fn down(key: Key, t: Instant) -> Self {
        Self {
            key,
            edge: KeyEdge::Down,
            t,
        }
    }

    pub fn up(key: Key, t: Instant) -> Self {
        Self {
            key,
            edge: KeyEdge::Up,
            t,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_names() {
        assert_eq!(Key::Char('a').name(), "a");
        assert_eq!(Key::Named("left ctrl").name(), "left ctrl");
        assert_eq!(Key::Unknown(0xE8).name(), "vke8");
    }

    #[test]
    fn test_ctrl_spellings() {
        assert!(Key::Named("ctrl").is_ctrl());
        assert!(Key::Named("right ctrl").is_ctrl());
        assert!(!Key::Char('c').is_ctrl());
        assert!(!Key::Named("shift").is_ctrl());
    }

    #[test]
    fn test_canonical_collapses_sides() {
        assert_eq!(Key::Named("left ctrl").canonical(), Key::Named("ctrl"));
        assert_eq!(Key::Char('A').canonical(), Key::Char('a'));
        assert_eq!(Key::Named("f1").canonical(), Key::Named("f1"));
    }

    #[test]
    fn test_digit() {
        assert_eq!(Key::Char('7').digit(), Some('7'));
        assert_eq!(Key::Char('x').digit(), None);
        assert_eq!(Key::Named("f1").digit(), None);
    }
}
