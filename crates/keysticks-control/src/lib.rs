//! Vocabulary of the virtual controller: which controls exist, how they are
//! addressed, which directions and event reasons they produce, and the
//! keyboard keys actions can emit.

mod control;
mod direction;
mod general;
mod key;
mod key_combo;
mod kind;
mod layout;
mod modifiers;
mod reason;

use thiserror::Error;

pub use control::InputControl;
pub use direction::{is_direction_valid, Direction, DirectionMode, DirectionModes, DirectionShape};
pub use general::GeneralisedControl;
pub use key::{Key, KEYBOARD};
pub use key_combo::KeyCombo;
pub use kind::ControlKind;
pub use layout::{ButtonDiamond, ControlLayout};
pub use modifiers::{Modifier, Modifiers};
pub use reason::{ControlSetting, EventReason, ReasonSet};

/// Index of a control among the controls of the same kind, starting at 1.
pub type ControlId = u8;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("empty input")]
    Empty,
    #[error("unknown control kind: {0}")]
    UnknownKind(String),
    #[error("invalid control id: {0}")]
    InvalidId(String),
    #[error("unknown direction: {0}")]
    UnknownDirection(String),
    #[error("unknown control setting: {0}")]
    UnknownSetting(String),
    #[error("unknown direction mode: {0}")]
    UnknownDirectionMode(String),
    #[error("unknown event reason: {0}")]
    UnknownReason(String),
    #[error("invalid key: {0}")]
    InvalidKey(String),
}
