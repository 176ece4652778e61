use std::fmt;

use serde::{
    de::{value::Error as DeError, IntoDeserializer, Visitor},
    Deserialize, Deserializer,
};
use smallvec::SmallVec;

use crate::{
    key::{parse_key, Key},
    Modifier, Modifiers, ParseError,
};

/// Modifiers plus the keys pressed while they are held.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyCombo {
    pub modifiers: Modifiers,
    pub keys: SmallVec<[Key; 4]>,
}

impl KeyCombo {
    pub fn from_key(key: Key) -> Self {
        let mut keys = SmallVec::new();
        keys.push(key);
        Self {
            modifiers: Modifiers::empty(),
            keys,
        }
    }

    pub fn contains_key(&self, key: Key) -> bool {
        self.keys.contains(&key)
    }

    /// Whether pressing this combo may erase text.
    pub fn is_erasing(&self) -> bool {
        self.keys.iter().any(Key::is_erasing)
    }
}

impl<'de> Deserialize<'de> for KeyCombo {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct KeyComboVisitor;

        impl Visitor<'_> for KeyComboVisitor {
            type Value = KeyCombo;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("key combination string")
            }

            fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                let mut modifiers = Modifiers::empty();
                let mut keys: SmallVec<[Key; 4]> = SmallVec::new();
                for combo in v.split('+') {
                    let part = combo.trim();
                    let Some(key) = parse_key(part) else {
                        return Err(E::custom(format!("invalid key: {part}")));
                    };
                    match Modifier::try_from(key) {
                        Ok(modifier) => modifiers.insert(modifier),
                        Err(key) => keys.push(key),
                    }
                }

                Ok(KeyCombo { modifiers, keys })
            }
        }

        deserializer.deserialize_str(KeyComboVisitor)
    }
}

impl std::str::FromStr for KeyCombo {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        KeyCombo::deserialize(s.into_deserializer())
            .map_err(|e: DeError| ParseError::InvalidKey(e.to_string()))
    }
}

impl fmt::Display for KeyCombo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        let parts = self
            .modifiers
            .iter()
            .map(Modifier::key)
            .chain(self.keys.iter().copied());
        for key in parts {
            if !first {
                f.write_str("+")?;
            }
            first = false;
            write!(f, "{key}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(input: &str) -> Result<KeyCombo, ParseError> {
        input.parse()
    }

    #[test]
    fn modifiers_only() {
        let kc = parse("ctrl+alt+shift").unwrap();
        assert!(kc.modifiers.contains(Modifier::Ctrl));
        assert!(kc.modifiers.contains(Modifier::Alt));
        assert!(kc.modifiers.contains(Modifier::Shift));
        assert!(kc.keys.is_empty());
    }

    #[test]
    fn synonyms_become_modifiers() {
        let kc = parse("cmd + option").unwrap();
        assert!(kc.modifiers.contains(Modifier::Meta));
        assert!(kc.modifiers.contains(Modifier::Alt));
    }

    #[test]
    fn keys_follow_modifiers() {
        let kc = parse("ctrl+shift+t").unwrap();
        assert_eq!(kc.keys.as_slice(), &[Key::Char('t')]);
        assert_eq!(kc.to_string(), "ctrl+shift+t");
    }

    #[test]
    fn invalid_key_is_reported() {
        let err = parse("ctrl+foo").unwrap_err();
        assert!(err.to_string().contains("invalid key: foo"));
        assert!(parse("").is_err());
    }

    #[test]
    fn erasing_combos_are_detected() {
        assert!(parse("ctrl+backspace").unwrap().is_erasing());
        assert!(KeyCombo::from_key(Key::Delete).is_erasing());
        assert!(!parse("ctrl+c").unwrap().is_erasing());
        assert!(parse("ctrl+c").unwrap().contains_key(Key::Char('c')));
    }

    #[test]
    fn deserializes_from_yaml_string() {
        let kc: KeyCombo = serde_yaml::from_str("\"meta+space\"").unwrap();
        assert_eq!(kc.keys.as_slice(), &[Key::Space]);
        assert!(kc.modifiers.contains(Modifier::Meta));
    }
}
