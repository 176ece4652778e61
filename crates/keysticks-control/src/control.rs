use std::fmt;
use std::str::FromStr;

use serde::de::{self, Deserialize, Deserializer, Visitor};

use crate::{ControlId, ControlKind, ControlSetting, Direction, ParseError};

/// Address of a virtual control as seen by the action store: the control
/// itself, the direction it was pushed in (directional controls only) and
/// an optional setting tag.
///
/// Text form: `<kind><id>[.<direction>][@<setting>]`, e.g. `button1`,
/// `stick2.left`, `stick1@direction_mode`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InputControl {
    pub kind: ControlKind,
    pub id: ControlId,
    pub setting: ControlSetting,
    pub direction: Direction,
}

impl InputControl {
    pub const fn new(kind: ControlKind, id: ControlId) -> Self {
        Self {
            kind,
            id,
            setting: ControlSetting::None,
            direction: Direction::None,
        }
    }

    pub const fn button(id: ControlId) -> Self {
        Self::new(ControlKind::Button, id)
    }

    pub const fn trigger(id: ControlId) -> Self {
        Self::new(ControlKind::Trigger, id)
    }

    pub const fn diamond(id: ControlId) -> Self {
        Self::new(ControlKind::ButtonDiamond, id)
    }

    pub const fn stick(id: ControlId, direction: Direction) -> Self {
        Self::new(ControlKind::Stick, id).with_direction(direction)
    }

    pub const fn dpad(id: ControlId, direction: Direction) -> Self {
        Self::new(ControlKind::DPad, id).with_direction(direction)
    }

    #[must_use]
    pub const fn with_direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    #[must_use]
    pub const fn with_setting(mut self, setting: ControlSetting) -> Self {
        self.setting = setting;
        self
    }

    /// The setting address of this control. Settings never carry a direction.
    #[must_use]
    pub const fn setting_control(self, setting: ControlSetting) -> Self {
        self.with_setting(setting).with_direction(Direction::None)
    }

    /// The control without direction or setting.
    #[must_use]
    pub const fn general(self) -> Self {
        Self::new(self.kind, self.id)
    }

    #[inline]
    pub const fn is_setting(&self) -> bool {
        !self.setting.is_none()
    }

    /// Packed numeric id: kind in bits 0-3, id in 4-11, setting in 12-15,
    /// direction from bit 16.
    pub const fn to_id(&self) -> u32 {
        (self.kind as u32)
            | ((self.id as u32) << 4)
            | ((self.setting as u32) << 12)
            | ((self.direction as u32) << 16)
    }

    /// Numeric id of the control alone.
    #[inline]
    pub const fn general_id(&self) -> u32 {
        self.to_id() & 0xFFF
    }
}

impl fmt::Display for InputControl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.kind, self.id)?;
        if !self.direction.is_none() {
            write!(f, ".{}", self.direction)?;
        }
        if self.is_setting() {
            write!(f, "@{}", self.setting.name())?;
        }
        Ok(())
    }
}

impl FromStr for InputControl {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(ParseError::Empty);
        }

        let (rest, setting) = match s.split_once('@') {
            Some((rest, setting)) => (rest, setting.parse::<ControlSetting>()?),
            None => (s, ControlSetting::None),
        };
        let (head, direction) = match rest.split_once('.') {
            Some((head, direction)) => (head, direction.parse::<Direction>()?),
            None => (rest, Direction::None),
        };

        let split = head
            .find(|c: char| c.is_ascii_digit())
            .ok_or_else(|| ParseError::InvalidId(head.to_string()))?;
        let (kind, id) = head.split_at(split);
        let kind = kind.parse::<ControlKind>()?;
        let id = id
            .parse::<ControlId>()
            .ok()
            .filter(|id| *id > 0)
            .ok_or_else(|| ParseError::InvalidId(id.to_string()))?;

        Ok(InputControl {
            kind,
            id,
            setting,
            direction,
        })
    }
}

impl<'de> Deserialize<'de> for InputControl {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct InputControlVisitor;

        impl Visitor<'_> for InputControlVisitor {
            type Value = InputControl;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("control address such as `button1` or `stick1.left`")
            }

            fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                v.parse().map_err(E::custom)
            }
        }

        deserializer.deserialize_str(InputControlVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_control() {
        let control: InputControl = "button3".parse().expect("button parses");
        assert_eq!(control, InputControl::button(3));
    }

    #[test]
    fn parses_direction_and_setting() {
        let control: InputControl = "stick2.up_left".parse().expect("stick parses");
        assert_eq!(control, InputControl::stick(2, Direction::UpLeft));

        let setting: InputControl = "dpad1@direction_mode".parse().expect("setting parses");
        assert_eq!(setting.kind, ControlKind::DPad);
        assert_eq!(setting.setting, ControlSetting::DirectionMode);
        assert!(setting.direction.is_none());
    }

    #[test]
    fn display_matches_parse() {
        for text in ["trigger2", "dpad1.down", "stick1.centre", "stick1@dwell_and_repeat"] {
            let control: InputControl = text.parse().expect("control parses");
            assert_eq!(control.to_string(), text);
        }
    }

    #[test]
    fn rejects_bad_input() {
        assert_eq!("".parse::<InputControl>(), Err(ParseError::Empty));
        assert!(matches!(
            "pedal1".parse::<InputControl>(),
            Err(ParseError::UnknownKind(_))
        ));
        assert!(matches!(
            "button0".parse::<InputControl>(),
            Err(ParseError::InvalidId(_))
        ));
        assert!(matches!(
            "button".parse::<InputControl>(),
            Err(ParseError::InvalidId(_))
        ));
        assert!(matches!(
            "stick1.north".parse::<InputControl>(),
            Err(ParseError::UnknownDirection(_))
        ));
    }

    #[test]
    fn general_id_ignores_direction_and_setting() {
        let left = InputControl::stick(1, Direction::Left);
        let setting = InputControl::stick(1, Direction::None)
            .with_setting(ControlSetting::DirectionMode);
        assert_ne!(left.to_id(), setting.to_id());
        assert_eq!(left.general_id(), setting.general_id());
        assert_ne!(left.general_id(), InputControl::stick(2, Direction::Left).general_id());
    }

    #[test]
    fn setting_control_clears_direction() {
        let control = InputControl::dpad(1, Direction::Up)
            .setting_control(ControlSetting::DirectionMode);
        assert!(control.direction.is_none());
        assert!(control.is_setting());
    }
}
