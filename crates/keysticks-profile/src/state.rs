//! Coordinates in the mode / page / cell hierarchy.

use std::fmt;
use std::str::FromStr;

use serde::de::{self, Deserialize, Deserializer, Visitor};
use smallvec::SmallVec;
use thiserror::Error;

/// Value of one axis of a stored situation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum AxisKey {
    /// The unspecialised value: any mode, any page or any cell.
    #[default]
    Default,
    Id(u32),
}

impl AxisKey {
    #[inline]
    pub const fn is_default(self) -> bool {
        matches!(self, AxisKey::Default)
    }

    #[inline]
    pub const fn id(self) -> Option<u32> {
        match self {
            AxisKey::Default => None,
            AxisKey::Id(id) => Some(id),
        }
    }
}

impl From<u32> for AxisKey {
    fn from(id: u32) -> Self {
        AxisKey::Id(id)
    }
}

impl fmt::Display for AxisKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AxisKey::Default => f.write_str("*"),
            AxisKey::Id(id) => write!(f, "{id}"),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StateParseError {
    #[error("expected three comma separated axes, got \"{0}\"")]
    AxisCount(String),
    #[error("invalid axis value \"{0}\"")]
    InvalidAxis(String),
}

impl FromStr for AxisKey {
    type Err = StateParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "*" => Ok(AxisKey::Default),
            other => other
                .parse::<u32>()
                .ok()
                .filter(|id| *id > 0)
                .map(AxisKey::Id)
                .ok_or_else(|| StateParseError::InvalidAxis(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    Mode,
    Page,
    Cell,
}

impl Axis {
    pub const ALL: [Axis; 3] = [Axis::Mode, Axis::Page, Axis::Cell];
}

/// A logical situation. Every axis is either a concrete id or `Default`;
/// "unspecified" only exists in [`RelativeState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct StateVector {
    pub mode: AxisKey,
    pub page: AxisKey,
    pub cell: AxisKey,
}

/// Situations from most to least specific that govern a situation.
pub type GoverningChain = SmallVec<[StateVector; 5]>;

impl StateVector {
    pub const fn new(mode: AxisKey, page: AxisKey, cell: AxisKey) -> Self {
        Self { mode, page, cell }
    }

    /// `(*,*,*)`, the situation that governs every other one.
    pub const fn root() -> Self {
        Self::new(AxisKey::Default, AxisKey::Default, AxisKey::Default)
    }

    /// `(mode,*,*)`
    pub const fn of_mode(mode: u32) -> Self {
        Self::new(AxisKey::Id(mode), AxisKey::Default, AxisKey::Default)
    }

    /// `(mode,page,*)`
    pub const fn of_page(mode: u32, page: u32) -> Self {
        Self::new(AxisKey::Id(mode), AxisKey::Id(page), AxisKey::Default)
    }

    pub const fn get(&self, axis: Axis) -> AxisKey {
        match axis {
            Axis::Mode => self.mode,
            Axis::Page => self.page,
            Axis::Cell => self.cell,
        }
    }

    pub fn set(&mut self, axis: Axis, key: AxisKey) {
        match axis {
            Axis::Mode => self.mode = key,
            Axis::Page => self.page = key,
            Axis::Cell => self.cell = key,
        }
    }

    #[must_use]
    pub fn with(mut self, axis: Axis, key: AxisKey) -> Self {
        self.set(axis, key);
        self
    }

    #[inline]
    pub fn is_same_as(&self, other: &StateVector) -> bool {
        self == other
    }

    /// Whether this situation governs `other`: every axis is `Default` or
    /// equal to the corresponding axis of `other`.
    pub fn contains(&self, other: &StateVector) -> bool {
        Axis::ALL.iter().all(|axis| {
            let key = self.get(*axis);
            key.is_default() || key == other.get(*axis)
        })
    }

    /// Whether no axis is `Default`.
    pub fn is_specific(&self) -> bool {
        !(self.mode.is_default() || self.page.is_default() || self.cell.is_default())
    }

    #[inline]
    pub fn is_root(&self) -> bool {
        *self == Self::root()
    }

    /// Immediate parents. A situation with both page and cell set has two:
    /// the same cell on any page, then any cell of the same page.
    pub fn parent_states(&self) -> SmallVec<[StateVector; 2]> {
        let mut parents = SmallVec::new();
        if !self.cell.is_default() {
            if !self.page.is_default() {
                parents.push(self.with(Axis::Page, AxisKey::Default));
            }
            parents.push(self.with(Axis::Cell, AxisKey::Default));
        } else if !self.page.is_default() {
            parents.push(self.with(Axis::Page, AxisKey::Default));
        } else if !self.mode.is_default() {
            parents.push(self.with(Axis::Mode, AxisKey::Default));
        }
        parents
    }

    /// This situation followed by every situation governing it, most
    /// specific first: `(m,p,c)`, `(m,p,*)`, `(m,*,c)`, `(m,*,*)`, `(*,*,*)`.
    pub fn governing_chain(&self) -> GoverningChain {
        let candidates = [
            *self,
            self.with(Axis::Cell, AxisKey::Default),
            self.with(Axis::Page, AxisKey::Default),
            Self::new(self.mode, AxisKey::Default, AxisKey::Default),
            Self::root(),
        ];

        let mut chain = GoverningChain::new();
        for candidate in candidates {
            if !chain.contains(&candidate) {
                chain.push(candidate);
            }
        }
        chain
    }
}

impl fmt::Display for StateVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{}", self.mode, self.page, self.cell)
    }
}

fn split_axes(s: &str) -> Result<[&str; 3], StateParseError> {
    let mut parts = s.split(',');
    match (parts.next(), parts.next(), parts.next(), parts.next()) {
        (Some(mode), Some(page), Some(cell), None) => Ok([mode.trim(), page.trim(), cell.trim()]),
        _ => Err(StateParseError::AxisCount(s.to_string())),
    }
}

impl FromStr for StateVector {
    type Err = StateParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let [mode, page, cell] = split_axes(s)?;
        Ok(Self::new(mode.parse()?, page.parse()?, cell.parse()?))
    }
}

impl<'de> Deserialize<'de> for StateVector {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct StateVisitor;

        impl Visitor<'_> for StateVisitor {
            type Value = StateVector;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("situation string like \"1,*,*\"")
            }

            fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                v.parse().map_err(E::custom)
            }
        }

        deserializer.deserialize_str(StateVisitor)
    }
}

/// A situation expressed against whatever situation is current. `None`
/// on an axis means "keep the current value".
///
/// Text form uses `-` for a kept axis: `-,2,*` is "page 2 of the current
/// mode, any cell".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct RelativeState {
    pub mode: Option<AxisKey>,
    pub page: Option<AxisKey>,
    pub cell: Option<AxisKey>,
}

impl RelativeState {
    pub const fn new(mode: Option<AxisKey>, page: Option<AxisKey>, cell: Option<AxisKey>) -> Self {
        Self { mode, page, cell }
    }

    /// Keeps every axis.
    pub const fn unchanged() -> Self {
        Self::new(None, None, None)
    }

    pub const fn get(&self, axis: Axis) -> Option<AxisKey> {
        match axis {
            Axis::Mode => self.mode,
            Axis::Page => self.page,
            Axis::Cell => self.cell,
        }
    }

    pub fn set(&mut self, axis: Axis, key: Option<AxisKey>) {
        match axis {
            Axis::Mode => self.mode = key,
            Axis::Page => self.page = key,
            Axis::Cell => self.cell = key,
        }
    }

    /// Whether any axis refers to the current situation.
    pub fn is_relative(&self) -> bool {
        self.mode.is_none() || self.page.is_none() || self.cell.is_none()
    }

    /// Takes each specified axis verbatim and copies the others from
    /// `current`.
    pub fn to_absolute(&self, current: &StateVector) -> StateVector {
        StateVector::new(
            self.mode.unwrap_or(current.mode),
            self.page.unwrap_or(current.page),
            self.cell.unwrap_or(current.cell),
        )
    }
}

impl From<StateVector> for RelativeState {
    fn from(state: StateVector) -> Self {
        Self::new(Some(state.mode), Some(state.page), Some(state.cell))
    }
}

/// Resolves a relative situation against the current one.
#[inline]
pub fn relative_state_to_absolute(relative: &RelativeState, current: &StateVector) -> StateVector {
    relative.to_absolute(current)
}

impl fmt::Display for RelativeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, axis) in Axis::ALL.iter().enumerate() {
            if index > 0 {
                f.write_str(",")?;
            }
            match self.get(*axis) {
                Some(key) => write!(f, "{key}")?,
                None => f.write_str("-")?,
            }
        }
        Ok(())
    }
}

impl FromStr for RelativeState {
    type Err = StateParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut relative = RelativeState::unchanged();
        for (axis, part) in Axis::ALL.iter().zip(split_axes(s)?) {
            let key = match part {
                "-" => None,
                other => Some(other.parse()?),
            };
            relative.set(*axis, key);
        }
        Ok(relative)
    }
}

impl<'de> Deserialize<'de> for RelativeState {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct RelativeVisitor;

        impl Visitor<'_> for RelativeVisitor {
            type Value = RelativeState;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("relative situation string like \"-,2,*\"")
            }

            fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                v.parse().map_err(E::custom)
            }
        }

        deserializer.deserialize_str(RelativeVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(s: &str) -> StateVector {
        s.parse().expect("valid state")
    }

    #[test]
    fn parses_and_prints_default_axes() {
        let s = state("1, *, 7");
        assert_eq!(s.mode, AxisKey::Id(1));
        assert!(s.page.is_default());
        assert_eq!(s.to_string(), "1,*,7");
    }

    #[test]
    fn rejects_malformed_states() {
        assert!(matches!("1,2".parse::<StateVector>(), Err(StateParseError::AxisCount(_))));
        assert!(matches!("1,2,3,4".parse::<StateVector>(), Err(StateParseError::AxisCount(_))));
        assert!(matches!("1,x,*".parse::<StateVector>(), Err(StateParseError::InvalidAxis(_))));
        assert!(matches!("0,*,*".parse::<StateVector>(), Err(StateParseError::InvalidAxis(_))));
        assert!("-,*,*".parse::<StateVector>().is_err());
    }

    #[test]
    fn default_axes_contain_everything_below() {
        assert!(StateVector::root().contains(&state("3,4,5")));
        assert!(state("3,*,*").contains(&state("3,4,5")));
        assert!(state("3,4,*").contains(&state("3,4,5")));
        assert!(!state("3,4,*").contains(&state("3,6,5")));
        assert!(!state("3,4,5").contains(&state("3,4,*")));
        assert!(state("3,4,5").contains(&state("3,4,5")));
    }

    #[test]
    fn parents_of_a_cell_state() {
        let parents = state("1,2,3").parent_states();
        assert_eq!(parents.as_slice(), &[state("1,*,3"), state("1,2,*")]);
        assert_eq!(state("1,*,3").parent_states().as_slice(), &[state("1,*,*")]);
        assert_eq!(state("1,*,*").parent_states().as_slice(), &[StateVector::root()]);
        assert!(StateVector::root().parent_states().is_empty());
    }

    #[test]
    fn governing_chain_runs_most_to_least_specific() {
        let chain = state("1,2,3").governing_chain();
        assert_eq!(
            chain.as_slice(),
            &[
                state("1,2,3"),
                state("1,2,*"),
                state("1,*,3"),
                state("1,*,*"),
                StateVector::root()
            ]
        );
        assert_eq!(
            state("1,2,*").governing_chain().as_slice(),
            &[state("1,2,*"), state("1,*,*"), StateVector::root()]
        );
        assert_eq!(StateVector::root().governing_chain().len(), 1);
    }

    #[test]
    fn every_chain_member_contains_the_situation() {
        for s in ["1,2,3", "1,*,3", "4,5,*", "6,*,*", "*,*,*"] {
            let situation = state(s);
            for governing in situation.governing_chain() {
                assert!(governing.contains(&situation), "{governing} / {situation}");
            }
        }
    }

    #[test]
    fn specific_means_no_default_axis() {
        assert!(state("1,2,3").is_specific());
        assert!(!state("1,2,*").is_specific());
    }

    #[test]
    fn relative_axes_copy_the_current_situation() {
        let relative: RelativeState = "-,2,*".parse().expect("relative");
        let absolute = relative.to_absolute(&state("5,7,9"));
        assert_eq!(absolute, state("5,2,*"));
        assert_eq!(relative.to_string(), "-,2,*");
        assert!(relative.is_relative());
    }

    #[test]
    fn concrete_relative_state_ignores_current() {
        let concrete = RelativeState::from(state("1,*,4"));
        assert!(!concrete.is_relative());
        for current in ["2,3,4", "*,*,*", "9,*,1"] {
            assert_eq!(relative_state_to_absolute(&concrete, &state(current)), state("1,*,4"));
        }
    }

    #[test]
    fn deserializes_from_yaml() {
        let s: StateVector = serde_yaml::from_str("\"2,*,*\"").expect("yaml");
        assert_eq!(s, StateVector::of_mode(2));
        let r: RelativeState = serde_yaml::from_str("\"-,-,104\"").expect("yaml");
        assert_eq!(r.cell, Some(AxisKey::Id(104)));
    }
}
