use std::fmt;
use std::str::FromStr;

use keysticks_bit_derive::Bit;
use keysticks_bit_mask::Bitmask;
use serde::Deserialize;

use crate::ParseError;

/// Why a control raised an event. Action lists are kept sorted in
/// declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Bit, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventReason {
    Directed,
    DirectedLong,
    DirectionRepeated,
    DirectedShort,
    Undirected,
    Moved,
    Pressed,
    PressedLong,
    PressRepeated,
    PressedShort,
    Released,
    Activated,
}

pub type ReasonSet = Bitmask<EventReason>;

impl EventReason {
    pub const ALL: [EventReason; 12] = [
        EventReason::Directed,
        EventReason::DirectedLong,
        EventReason::DirectionRepeated,
        EventReason::DirectedShort,
        EventReason::Undirected,
        EventReason::Moved,
        EventReason::Pressed,
        EventReason::PressedLong,
        EventReason::PressRepeated,
        EventReason::PressedShort,
        EventReason::Released,
        EventReason::Activated,
    ];

    /// Counterpart of a press reason on a directional control and vice versa.
    pub const fn alternative(self) -> Option<EventReason> {
        Some(match self {
            EventReason::Pressed => EventReason::Directed,
            EventReason::PressedLong => EventReason::DirectedLong,
            EventReason::PressedShort => EventReason::DirectedShort,
            EventReason::PressRepeated => EventReason::DirectionRepeated,
            EventReason::Released => EventReason::Undirected,
            EventReason::Directed => EventReason::Pressed,
            EventReason::DirectedLong => EventReason::PressedLong,
            EventReason::DirectedShort => EventReason::PressedShort,
            EventReason::DirectionRepeated => EventReason::PressRepeated,
            EventReason::Undirected => EventReason::Released,
            EventReason::Moved | EventReason::Activated => return None,
        })
    }

    #[inline]
    pub const fn is_repeat(self) -> bool {
        matches!(
            self,
            EventReason::DirectionRepeated | EventReason::PressRepeated
        )
    }

    pub const fn name(self) -> &'static str {
        match self {
            EventReason::Directed => "directed",
            EventReason::DirectedLong => "directed_long",
            EventReason::DirectionRepeated => "direction_repeated",
            EventReason::DirectedShort => "directed_short",
            EventReason::Undirected => "undirected",
            EventReason::Moved => "moved",
            EventReason::Pressed => "pressed",
            EventReason::PressedLong => "pressed_long",
            EventReason::PressRepeated => "press_repeated",
            EventReason::PressedShort => "pressed_short",
            EventReason::Released => "released",
            EventReason::Activated => "activated",
        }
    }
}

impl fmt::Display for EventReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for EventReason {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EventReason::ALL
            .into_iter()
            .find(|reason| reason.name() == s)
            .ok_or_else(|| ParseError::UnknownReason(s.to_string()))
    }
}

/// Marks an input control address as a behavioural setting rather than a
/// source of discrete actions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum ControlSetting {
    #[default]
    None = 0,
    DirectionMode = 1,
    DwellAndRepeat = 2,
}

impl ControlSetting {
    pub const fn name(self) -> &'static str {
        match self {
            ControlSetting::None => "none",
            ControlSetting::DirectionMode => "direction_mode",
            ControlSetting::DwellAndRepeat => "dwell_and_repeat",
        }
    }

    #[inline]
    pub const fn is_none(self) -> bool {
        matches!(self, ControlSetting::None)
    }
}

impl FromStr for ControlSetting {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" => Ok(ControlSetting::None),
            "direction_mode" => Ok(ControlSetting::DirectionMode),
            "dwell_and_repeat" => Ok(ControlSetting::DwellAndRepeat),
            other => Err(ParseError::UnknownSetting(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alternatives_pair_up() {
        for reason in EventReason::ALL {
            if let Some(alt) = reason.alternative() {
                assert_eq!(alt.alternative(), Some(reason));
            }
        }
        assert_eq!(EventReason::Moved.alternative(), None);
        assert_eq!(EventReason::Activated.alternative(), None);
    }

    #[test]
    fn reasons_sort_in_declaration_order() {
        let mut reasons = vec![
            EventReason::Released,
            EventReason::Directed,
            EventReason::Pressed,
        ];
        reasons.sort();
        assert_eq!(
            reasons,
            vec![EventReason::Directed, EventReason::Pressed, EventReason::Released]
        );
    }

    #[test]
    fn reason_set_iterates_in_order() {
        let set = ReasonSet::new(&[EventReason::Activated, EventReason::Moved]);
        assert_eq!(
            set.iter().collect::<Vec<_>>(),
            vec![EventReason::Moved, EventReason::Activated]
        );
    }

    #[test]
    fn reason_names_parse() {
        assert_eq!("press_repeated".parse(), Ok(EventReason::PressRepeated));
        assert!(matches!(
            "tapped".parse::<EventReason>(),
            Err(ParseError::UnknownReason(_))
        ));
    }
}
