use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

use crate::ParseError;

/// Physical shape of a virtual control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum ControlKind {
    Button = 0,
    /// Four face buttons treated as one four-way control.
    ButtonDiamond = 1,
    DPad = 2,
    Stick = 3,
    Trigger = 4,
}

impl ControlKind {
    pub const ALL: [ControlKind; 5] = [
        ControlKind::Button,
        ControlKind::ButtonDiamond,
        ControlKind::DPad,
        ControlKind::Stick,
        ControlKind::Trigger,
    ];

    /// D-pads and sticks report a direction of their own.
    #[inline]
    pub const fn is_directional(self) -> bool {
        matches!(self, ControlKind::DPad | ControlKind::Stick)
    }

    pub const fn name(self) -> &'static str {
        match self {
            ControlKind::Button => "button",
            ControlKind::ButtonDiamond => "diamond",
            ControlKind::DPad => "dpad",
            ControlKind::Stick => "stick",
            ControlKind::Trigger => "trigger",
        }
    }
}

impl fmt::Display for ControlKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ControlKind {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ControlKind::ALL
            .into_iter()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| ParseError::UnknownKind(s.to_string()))
    }
}
