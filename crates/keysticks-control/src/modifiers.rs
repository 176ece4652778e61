use keysticks_bit_derive::Bit;
use keysticks_bit_mask::Bitmask;

use crate::key::Key;

#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy, Bit)]
pub enum Modifier {
    Ctrl,
    Meta,
    Shift,
    Alt,
}

impl Modifier {
    pub const ALL: [Modifier; 4] = [Modifier::Ctrl, Modifier::Meta, Modifier::Shift, Modifier::Alt];

    pub const fn key(self) -> Key {
        match self {
            Modifier::Ctrl => Key::Control,
            Modifier::Meta => Key::Meta,
            Modifier::Shift => Key::Shift,
            Modifier::Alt => Key::Alt,
        }
    }
}

impl TryFrom<Key> for Modifier {
    type Error = Key;

    fn try_from(key: Key) -> Result<Self, Self::Error> {
        match key {
            Key::Control => Ok(Modifier::Ctrl),
            Key::Meta => Ok(Modifier::Meta),
            Key::Shift => Ok(Modifier::Shift),
            Key::Alt => Ok(Modifier::Alt),
            other => Err(other),
        }
    }
}

/// Set of held modifiers.
pub type Modifiers = Bitmask<Modifier>;
