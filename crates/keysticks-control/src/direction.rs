use std::fmt;
use std::str::FromStr;

use keysticks_bit_derive::Bit;
use keysticks_bit_mask::Bitmask;
use serde::Deserialize;

use crate::ParseError;

/// Direction sub-state of a control. The discriminants are bit flags:
/// diagonals combine their two cardinal directions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum Direction {
    #[default]
    None = 0,
    Centre = 1,
    Left = 2,
    Right = 4,
    Up = 8,
    Down = 16,
    UpLeft = 8 | 2,
    UpRight = 8 | 4,
    DownLeft = 16 | 2,
    DownRight = 16 | 4,
}

impl Direction {
    /// Cardinal directions in diamond order, followed by centre.
    pub const LRUDC: [Direction; 5] = [
        Direction::Left,
        Direction::Right,
        Direction::Up,
        Direction::Down,
        Direction::Centre,
    ];

    /// The nine positions of a 3x3 grid, row by row.
    pub const SQUARE: [Direction; 9] = [
        Direction::UpLeft,
        Direction::Up,
        Direction::UpRight,
        Direction::Left,
        Direction::Centre,
        Direction::Right,
        Direction::DownLeft,
        Direction::Down,
        Direction::DownRight,
    ];

    const NAMED: [(Direction, &'static str); 10] = [
        (Direction::None, "none"),
        (Direction::Centre, "centre"),
        (Direction::Left, "left"),
        (Direction::Right, "right"),
        (Direction::Up, "up"),
        (Direction::Down, "down"),
        (Direction::UpLeft, "up_left"),
        (Direction::UpRight, "up_right"),
        (Direction::DownLeft, "down_left"),
        (Direction::DownRight, "down_right"),
    ];

    #[inline]
    pub const fn bits(self) -> u8 {
        self as u8
    }

    #[inline]
    pub const fn is_none(self) -> bool {
        matches!(self, Direction::None)
    }

    #[inline]
    pub const fn is_centre(self) -> bool {
        matches!(self, Direction::Centre)
    }

    pub fn name(self) -> &'static str {
        Self::NAMED
            .iter()
            .find(|(direction, _)| *direction == self)
            .map_or("none", |(_, name)| *name)
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Direction {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = match s {
            "center" => "centre",
            other => other,
        };
        Self::NAMED
            .iter()
            .find(|(_, name)| *name == s)
            .map(|(direction, _)| *direction)
            .ok_or_else(|| ParseError::UnknownDirection(s.to_string()))
    }
}

/// How a control interprets its directions in a given situation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Bit, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DirectionMode {
    NonDirectional,
    TwoWay,
    FourWay,
    EightWay,
    AxisStyle,
    Continuous,
}

/// Set of direction modes a control can be put into.
pub type DirectionModes = Bitmask<DirectionMode>;

/// Coarse partition of [`DirectionMode`] used by conversion rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DirectionShape {
    NonDirectional,
    Discrete,
    Continuous,
}

impl DirectionShape {
    #[inline]
    pub const fn is_continuous(self) -> bool {
        matches!(self, DirectionShape::Continuous)
    }

    /// Continuous only pairs with continuous; every other shape pairs
    /// with every other non-continuous shape.
    #[inline]
    pub const fn is_compatible_with(self, other: DirectionShape) -> bool {
        self.is_continuous() == other.is_continuous()
    }
}

impl DirectionMode {
    pub const ALL: [DirectionMode; 6] = [
        DirectionMode::NonDirectional,
        DirectionMode::TwoWay,
        DirectionMode::FourWay,
        DirectionMode::EightWay,
        DirectionMode::AxisStyle,
        DirectionMode::Continuous,
    ];

    pub const fn shape(self) -> DirectionShape {
        match self {
            DirectionMode::NonDirectional => DirectionShape::NonDirectional,
            DirectionMode::Continuous => DirectionShape::Continuous,
            DirectionMode::TwoWay
            | DirectionMode::FourWay
            | DirectionMode::EightWay
            | DirectionMode::AxisStyle => DirectionShape::Discrete,
        }
    }

    #[inline]
    pub const fn is_continuous(self) -> bool {
        matches!(self, DirectionMode::Continuous)
    }

    pub const fn name(self) -> &'static str {
        match self {
            DirectionMode::NonDirectional => "non_directional",
            DirectionMode::TwoWay => "two_way",
            DirectionMode::FourWay => "four_way",
            DirectionMode::EightWay => "eight_way",
            DirectionMode::AxisStyle => "axis_style",
            DirectionMode::Continuous => "continuous",
        }
    }
}

impl fmt::Display for DirectionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DirectionMode {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DirectionMode::ALL
            .into_iter()
            .find(|mode| mode.name() == s)
            .ok_or_else(|| ParseError::UnknownDirectionMode(s.to_string()))
    }
}

/// Whether `direction` is one of the positions a control reports in `mode`.
/// Modes without a restriction (eight-way, non-directional) accept anything.
pub fn is_direction_valid(direction: Direction, mode: DirectionMode) -> bool {
    match mode {
        DirectionMode::FourWay | DirectionMode::AxisStyle => matches!(
            direction,
            Direction::Centre
                | Direction::Left
                | Direction::Right
                | Direction::Up
                | Direction::Down
        ),
        DirectionMode::TwoWay => matches!(direction, Direction::Left | Direction::Right),
        DirectionMode::Continuous => direction == Direction::Centre,
        DirectionMode::NonDirectional | DirectionMode::EightWay => true,
    }
}
