use std::fmt;
use std::str::FromStr;

use serde::de::{self, Deserialize, Deserializer, Visitor};

use crate::{DirectionMode, InputControl, ParseError};

/// A control role described independently of directionality, e.g. "the
/// four-way D-pad" or "button 1". Modes use these to name their
/// navigation and selection controls.
///
/// Text form: `<mode> <control>`, e.g. `four_way dpad1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GeneralisedControl {
    pub mode: DirectionMode,
    pub reference: InputControl,
}

impl GeneralisedControl {
    pub const fn new(mode: DirectionMode, reference: InputControl) -> Self {
        Self { mode, reference }
    }

    pub fn to_id(&self) -> u32 {
        use keysticks_bit_mask::Bitable;
        self.reference.to_id() ^ (self.mode.index() << 24)
    }
}

impl fmt::Display for GeneralisedControl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.mode, self.reference)
    }
}

impl FromStr for GeneralisedControl {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split_whitespace();
        let mode = parts.next().ok_or(ParseError::Empty)?.parse()?;
        let reference = parts.next().ok_or(ParseError::Empty)?.parse()?;
        Ok(Self { mode, reference })
    }
}

impl<'de> Deserialize<'de> for GeneralisedControl {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct GeneralisedControlVisitor;

        impl Visitor<'_> for GeneralisedControlVisitor {
            type Value = GeneralisedControl;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("`<direction mode> <control>`")
            }

            fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                v.parse().map_err(E::custom)
            }
        }

        deserializer.deserialize_str(GeneralisedControlVisitor)
    }
}
