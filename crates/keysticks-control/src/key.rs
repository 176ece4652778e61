use std::fmt;
use std::str::FromStr;

use crate::ParseError;

/// A key that an action can emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Key {
    /// Printable key, stored lowercase.
    Char(char),
    /// Function key `F<n>`.
    Function(u8),
    Control,
    RControl,
    Meta,
    RMeta,
    Shift,
    RShift,
    Alt,
    RAlt,
    Home,
    End,
    PageUp,
    PageDown,
    UpArrow,
    DownArrow,
    LeftArrow,
    RightArrow,
    Insert,
    Delete,
    Backspace,
    Escape,
    Tab,
    Space,
    Return,
    CapsLock,
    PrintScreen,
    Apps,
    VolumeUp,
    VolumeDown,
    VolumeMute,
}

const NAMED: [(Key, &str); 29] = [
    (Key::Control, "ctrl"),
    (Key::RControl, "rctrl"),
    (Key::Meta, "meta"),
    (Key::RMeta, "rmeta"),
    (Key::Shift, "shift"),
    (Key::RShift, "rshift"),
    (Key::Alt, "alt"),
    (Key::RAlt, "ralt"),
    (Key::Home, "home"),
    (Key::End, "end"),
    (Key::PageUp, "page_up"),
    (Key::PageDown, "page_down"),
    (Key::UpArrow, "arrow_up"),
    (Key::DownArrow, "arrow_down"),
    (Key::LeftArrow, "arrow_left"),
    (Key::RightArrow, "arrow_right"),
    (Key::Insert, "insert"),
    (Key::Delete, "delete"),
    (Key::Backspace, "backspace"),
    (Key::Escape, "escape"),
    (Key::Tab, "tab"),
    (Key::Space, "space"),
    (Key::Return, "return"),
    (Key::CapsLock, "caps_lock"),
    (Key::PrintScreen, "print_screen"),
    (Key::Apps, "apps"),
    (Key::VolumeUp, "volume_up"),
    (Key::VolumeDown, "volume_down"),
    (Key::VolumeMute, "volume_mute"),
];

/// Keys of the on-screen keyboard grid, row by row. A key's cell id is
/// its position here plus one.
pub const KEYBOARD: [Key; 86] = [
    Key::Escape,
    Key::Function(1),
    Key::Function(2),
    Key::Function(3),
    Key::Function(4),
    Key::Function(5),
    Key::Function(6),
    Key::Function(7),
    Key::Function(8),
    Key::Function(9),
    Key::Function(10),
    Key::Function(11),
    Key::Function(12),
    Key::Insert,
    Key::PrintScreen,
    Key::Delete,
    Key::Char('`'),
    Key::Char('1'),
    Key::Char('2'),
    Key::Char('3'),
    Key::Char('4'),
    Key::Char('5'),
    Key::Char('6'),
    Key::Char('7'),
    Key::Char('8'),
    Key::Char('9'),
    Key::Char('0'),
    Key::Char('-'),
    Key::Char('='),
    Key::Backspace,
    Key::Home,
    Key::Tab,
    Key::Char('q'),
    Key::Char('w'),
    Key::Char('e'),
    Key::Char('r'),
    Key::Char('t'),
    Key::Char('y'),
    Key::Char('u'),
    Key::Char('i'),
    Key::Char('o'),
    Key::Char('p'),
    Key::Char('['),
    Key::Char(']'),
    Key::Char('#'),
    Key::PageUp,
    Key::CapsLock,
    Key::Char('a'),
    Key::Char('s'),
    Key::Char('d'),
    Key::Char('f'),
    Key::Char('g'),
    Key::Char('h'),
    Key::Char('j'),
    Key::Char('k'),
    Key::Char('l'),
    Key::Char(';'),
    Key::Char('\''),
    Key::Return,
    Key::PageDown,
    Key::Shift,
    Key::Char('\\'),
    Key::Char('z'),
    Key::Char('x'),
    Key::Char('c'),
    Key::Char('v'),
    Key::Char('b'),
    Key::Char('n'),
    Key::Char('m'),
    Key::Char(','),
    Key::Char('.'),
    Key::Char('/'),
    Key::RShift,
    Key::UpArrow,
    Key::End,
    Key::Control,
    Key::Meta,
    Key::Alt,
    Key::Space,
    Key::RAlt,
    Key::RMeta,
    Key::Apps,
    Key::RControl,
    Key::LeftArrow,
    Key::DownArrow,
    Key::RightArrow,
];

impl Key {
    pub fn is_modifier(&self) -> bool {
        matches!(self, Key::Control | Key::Meta | Key::Shift | Key::Alt)
    }

    /// Keys whose emission can destroy text in the focused window.
    pub fn is_erasing(&self) -> bool {
        matches!(self, Key::Delete | Key::Backspace)
    }
}

/// Parse a key name or a single printable character.
///
/// ```
/// use keysticks_control::Key;
/// assert_eq!("a".parse::<Key>(), Ok(Key::Char('a')));
/// assert_eq!("page_up".parse::<Key>(), Ok(Key::PageUp));
/// ```
pub(crate) fn parse_key(input: &str) -> Option<Key> {
    let mut chars = input.chars();
    if let (Some(ch), None) = (chars.next(), chars.next()) {
        if ch.is_ascii_graphic() {
            return Some(Key::Char(ch.to_ascii_lowercase()));
        }
        return None;
    }

    if let Some((key, _)) = NAMED.iter().find(|(_, name)| *name == input) {
        return Some(*key);
    }

    match input {
        // Synonyms
        "cmd" | "command" | "super" | "win" => Some(Key::Meta),
        "rcmd" | "rcommand" | "rsuper" | "rwin" => Some(Key::RMeta),
        "control" => Some(Key::Control),
        "option" => Some(Key::Alt),
        "esc" => Some(Key::Escape),
        "spacebar" => Some(Key::Space),
        "enter" => Some(Key::Return),
        "del" => Some(Key::Delete),
        "ins" => Some(Key::Insert),
        "menu" => Some(Key::Apps),

        // Special characters
        "quote" | "apostrophe" => Some(Key::Char('\'')),
        "semicolon" => Some(Key::Char(';')),
        "backslash" => Some(Key::Char('\\')),
        "grave" | "backtick" => Some(Key::Char('`')),
        "period" | "dot" | "fullstop" => Some(Key::Char('.')),
        "comma" => Some(Key::Char(',')),
        "slash" => Some(Key::Char('/')),
        "minus" => Some(Key::Char('-')),
        "equal" | "equals" => Some(Key::Char('=')),
        "plus" => Some(Key::Char('+')),
        "hash" => Some(Key::Char('#')),
        "left_bracket" => Some(Key::Char('[')),
        "right_bracket" => Some(Key::Char(']')),

        _ => {
            let number = input.strip_prefix('f')?.parse::<u8>().ok()?;
            (1..=24).contains(&number).then_some(Key::Function(number))
        }
    }
}

impl FromStr for Key {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_key(s).ok_or_else(|| ParseError::InvalidKey(s.to_string()))
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Char('+') => f.write_str("plus"),
            Key::Char(ch) => write!(f, "{ch}"),
            Key::Function(number) => write!(f, "f{number}"),
            named => {
                let name = NAMED
                    .iter()
                    .find(|(key, _)| key == named)
                    .map_or("?", |(_, name)| *name);
                f.write_str(name)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_characters_are_lowercased() {
        assert_eq!(parse_key("A"), Some(Key::Char('a')));
        assert_eq!(parse_key("["), Some(Key::Char('[')));
    }

    #[test]
    fn synonyms_resolve_to_the_same_key() {
        assert_eq!(parse_key("cmd"), Some(Key::Meta));
        assert_eq!(parse_key("option"), Some(Key::Alt));
        assert_eq!(parse_key("enter"), parse_key("return"));
        assert_eq!(parse_key("backtick"), Some(Key::Char('`')));
    }

    #[test]
    fn function_keys_are_bounded() {
        assert_eq!(parse_key("f1"), Some(Key::Function(1)));
        assert_eq!(parse_key("f24"), Some(Key::Function(24)));
        assert_eq!(parse_key("f25"), None);
        assert_eq!(parse_key("f0"), None);
    }

    #[test]
    fn unknown_names_fail() {
        assert_eq!(parse_key(""), None);
        assert_eq!(parse_key("foo"), None);
        assert!(matches!("foo".parse::<Key>(), Err(ParseError::InvalidKey(_))));
    }

    #[test]
    fn display_parses_back() {
        for key in KEYBOARD.iter().chain(NAMED.iter().map(|(key, _)| key)) {
            assert_eq!(key.to_string().parse::<Key>(), Ok(*key), "{key:?}");
        }
        assert_eq!(Key::Char('+').to_string(), "plus");
    }

    #[test]
    fn keyboard_keys_are_unique() {
        let mut keys = KEYBOARD.to_vec();
        keys.sort();
        keys.dedup();
        assert_eq!(keys.len(), KEYBOARD.len());
    }
}
