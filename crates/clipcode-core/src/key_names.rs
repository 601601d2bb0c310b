use crate::types::Key;
use std::collections::HashMap;

/// Windows virtual-key codes with a multi-character name.
/// Digits, letters and OEM symbol keys are resolved by `vk_to_key` directly.
pub const VK_NAMES: &[(u16, &str)] = &[
    (0x08, "backspace"),
    (0x09, "tab"),
    (0x0D, "enter"),
    (0x10, "shift"),
    (0x11, "ctrl"),
    (0x12, "alt"),
    (0x13, "pause"),
    (0x14, "caps lock"),
    (0x1B, "esc"),
    (0x20, "space"),
    (0x21, "page up"),
    (0x22, "page down"),
    (0x23, "end"),
    (0x24, "home"),
    (0x25, "left"),
    (0x26, "up"),
    (0x27, "right"),
    (0x28, "down"),
    (0x2C, "print screen"),
    (0x2D, "insert"),
    (0x2E, "delete"),
    (0x5B, "left windows"),
    (0x5C, "right windows"),
    (0x5D, "menu"),
    (0x70, "f1"),
    (0x71, "f2"),
    (0x72, "f3"),
    (0x73, "f4"),
    (0x74, "f5"),
    (0x75, "f6"),
    (0x76, "f7"),
    (0x77, "f8"),
    (0x78, "f9"),
    (0x79, "f10"),
    (0x7A, "f11"),
    (0x7B, "f12"),
    (0x90, "num lock"),
    (0x91, "scroll lock"),
    (0xA0, "left shift"),
    (0xA1, "right shift"),
    (0xA2, "left ctrl"),
    (0xA3, "right ctrl"),
    (0xA4, "left alt"),
    (0xA5, "right alt"),
];

/// OEM keys of the US layout, reported by their unshifted character.
const VK_OEM_CHARS: &[(u16, char)] = &[
    (0xBA, ';'),
    (0xBB, '='),
    (0xBC, ','),
    (0xBD, '-'),
    (0xBE, '.'),
    (0xBF, '/'),
    (0xC0, '`'),
    (0xDB, '['),
    (0xDC, '\\'),
    (0xDD, ']'),
    (0xDE, '\''),
];

lazy_static::lazy_static! {
    static ref NAMED_KEYS: HashMap<&'static str, Key> = VK_NAMES
        .iter()
        .map(|&(_, name)| (name, Key::Named(name)))
        .collect();
}

/// Maps a virtual-key code to a key.
pub fn vk_to_key(vk: u16) -> Key {
    match vk {
        // 0-9 and A-Z share their ASCII codes.
        0x30..=0x39 => Key::Char(vk as u8 as char),
        0x41..=0x5A => Key::Char((vk as u8 as char).to_ascii_lowercase()),
        // Numpad digits.
        0x60..=0x69 => Key::Char((b'0' + (vk - 0x60) as u8) as char),
        _ => {
            if let Some(&(_, c)) = VK_OEM_CHARS.iter().find(|(code, _)| *code == vk) {
                return Key::Char(c);
            }
            match VK_NAMES.iter().find(|(code, _)| *code == vk) {
                Some(&(_, name)) => Key::Named(name),
                None => Key::Unknown(vk),
            }
        }
    }
}

/// Resolves a key name as written in a chord trigger ("ctrl", "c", "f1").
/// Single characters always name a key; longer names must be known.
pub fn key_from_name(name: &str) -> Option<Key> {
    let name = name.trim();
    let mut chars = name.chars();
    match (chars.next(), chars.next()) {
        (None, _) => None,
        (Some(c), None) => Some(Key::Char(c.to_ascii_lowercase())),
        _ => NAMED_KEYS.get(name.to_ascii_lowercase().as_str()).copied(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vk_digits_and_letters() {
        assert_eq!(vk_to_key(0x31), Key::Char('1'));
        assert_eq!(vk_to_key(0x41), Key::Char('a'));
        assert_eq!(vk_to_key(0x5A), Key::Char('z'));
        assert_eq!(vk_to_key(0x63), Key::Char('3'));
    }

    #[test]
    fn test_vk_named_and_unknown() {
        assert_eq!(vk_to_key(0xA2), Key::Named("left ctrl"));
        assert_eq!(vk_to_key(0x70), Key::Named("f1"));
        assert_eq!(vk_to_key(0xBD), Key::Char('-'));
        assert_eq!(vk_to_key(0xE8), Key::Unknown(0xE8));
    }

    #[test]
    fn test_key_from_name() {
        assert_eq!(key_from_name("ctrl"), Some(Key::Named("ctrl")));
        assert_eq!(key_from_name("Left Ctrl"), Some(Key::Named("left ctrl")));
        assert_eq!(key_from_name("A"), Some(Key::Char('a')));
        assert_eq!(key_from_name(" 1 "), Some(Key::Char('1')));
        assert_eq!(key_from_name("12"), None);
        assert_eq!(key_from_name(""), None);
    }
}
