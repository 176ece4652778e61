//! The tree of situations: modes, their pages and the grid cells of each
//! page, each level starting with its reserved `Default` child.

use keysticks_control::ControlLayout;

use crate::grid::{ControlsDefinition, GridConfig, GridType};
use crate::state::{Axis, AxisKey, RelativeState, StateVector};

/// A node of the situation tree: a mode, a page or a cell.
///
/// Children always start with the reserved `Default` child standing for
/// "any sub-situation of this node". Only mode nodes carry controls and a
/// grid.
#[derive(Debug, Clone, PartialEq)]
pub struct AxisValue {
    pub level: Axis,
    pub id: AxisKey,
    pub name: String,
    pub sub_values: Vec<AxisValue>,
    pub controls: Option<ControlsDefinition>,
    pub grid: Option<GridConfig>,
}

impl AxisValue {
    fn new(level: Axis, id: AxisKey, name: impl Into<String>) -> Self {
        Self {
            level,
            id,
            name: name.into(),
            sub_values: Vec::new(),
            controls: None,
            grid: None,
        }
    }

    pub fn mode(id: AxisKey, name: impl Into<String>) -> Self {
        Self::new(Axis::Mode, id, name)
    }

    pub fn page(id: AxisKey, name: impl Into<String>) -> Self {
        Self::new(Axis::Page, id, name)
    }

    pub fn cell(id: AxisKey, name: impl Into<String>) -> Self {
        Self::new(Axis::Cell, id, name)
    }

    pub fn get(&self, id: AxisKey) -> Option<&AxisValue> {
        self.sub_values.iter().find(|child| child.id == id)
    }

    pub fn get_mut(&mut self, id: AxisKey) -> Option<&mut AxisValue> {
        self.sub_values.iter_mut().find(|child| child.id == id)
    }

    pub fn contains(&self, id: AxisKey) -> bool {
        self.get(id).is_some()
    }

    pub fn grid_type(&self) -> Option<GridType> {
        self.grid.as_ref().map(|grid| grid.grid_type)
    }

    /// Smallest concrete id not used by a child.
    pub fn first_unused_id(&self) -> u32 {
        first_unused_id(&self.sub_values)
    }

    /// First child with a concrete id.
    pub fn first_specific_child(&self) -> Option<&AxisValue> {
        self.sub_values.iter().find(|child| !child.id.is_default())
    }

    /// Inserts `child` after the child with id `after`, or at the end.
    pub(crate) fn insert_after(&mut self, after: AxisKey, child: AxisValue) {
        insert_after(&mut self.sub_values, after, child);
    }
}

fn first_unused_id(values: &[AxisValue]) -> u32 {
    let mut id = 1;
    while values.iter().any(|value| value.id == AxisKey::Id(id)) {
        id += 1;
    }
    id
}

fn insert_after(values: &mut Vec<AxisValue>, after: AxisKey, child: AxisValue) {
    match values.iter().position(|value| value.id == after) {
        Some(index) => values.insert(index + 1, child),
        None => values.push(child),
    }
}

/// The cells a page gets under `grid`: the reserved any-cell node followed
/// by the grid's own cells.
pub(crate) fn grid_cells(grid: Option<&GridConfig>) -> Vec<AxisValue> {
    let Some(grid) = grid else {
        return Vec::new();
    };
    let mut cells = vec![AxisValue::cell(AxisKey::Default, "Any cell")];
    cells.extend(
        grid.grid_type
            .cells(grid.cols)
            .into_iter()
            .map(|(id, name)| AxisValue::cell(AxisKey::Id(id), name)),
    );
    cells
}

/// Modes, pages and cells of a source.
#[derive(Debug, Clone, PartialEq)]
pub struct SituationTree {
    modes: Vec<AxisValue>,
}

impl Default for SituationTree {
    fn default() -> Self {
        Self::new()
    }
}

impl SituationTree {
    /// A tree holding only the reserved "any mode" node.
    pub fn new() -> Self {
        let mut any_mode = AxisValue::mode(AxisKey::Default, "Any mode");
        any_mode
            .sub_values
            .push(AxisValue::page(AxisKey::Default, "Any page"));
        Self {
            modes: vec![any_mode],
        }
    }

    pub fn modes(&self) -> &[AxisValue] {
        &self.modes
    }

    /// Ids of the concrete modes in display order.
    pub fn mode_ids(&self) -> impl Iterator<Item = u32> + '_ {
        self.modes.iter().filter_map(|mode| mode.id.id())
    }

    pub fn mode(&self, id: AxisKey) -> Option<&AxisValue> {
        self.modes.iter().find(|mode| mode.id == id)
    }

    pub fn mode_mut(&mut self, id: AxisKey) -> Option<&mut AxisValue> {
        self.modes.iter_mut().find(|mode| mode.id == id)
    }

    pub fn page(&self, mode: AxisKey, page: AxisKey) -> Option<&AxisValue> {
        self.mode(mode)?.get(page)
    }

    pub fn page_mut(&mut self, mode: AxisKey, page: AxisKey) -> Option<&mut AxisValue> {
        self.mode_mut(mode)?.get_mut(page)
    }

    pub fn grid(&self, mode: AxisKey) -> Option<&GridConfig> {
        self.mode(mode)?.grid.as_ref()
    }

    pub fn controls(&self, mode: AxisKey) -> Option<&ControlsDefinition> {
        self.mode(mode)?.controls.as_ref()
    }

    /// Whether `state` names a node of the tree. The page is only looked up
    /// when the page or cell is concrete, the cell only when it is concrete.
    pub fn has_state(&self, state: &StateVector) -> bool {
        let Some(mode) = self.mode(state.mode) else {
            return false;
        };
        if state.page.is_default() && state.cell.is_default() {
            return true;
        }
        let Some(page) = mode.get(state.page) else {
            return false;
        };
        state.cell.is_default() || page.contains(state.cell)
    }

    /// The first concrete mode, or the root situation if there is none.
    pub fn initial_state(&self) -> StateVector {
        self.mode_ids()
            .next()
            .map_or_else(StateVector::root, StateVector::of_mode)
    }

    pub fn first_unused_mode_id(&self) -> u32 {
        first_unused_id(&self.modes)
    }

    /// Resolves `relative` against `reference` walking down the tree. Axes
    /// below the first one missing from the tree stay `Default`.
    pub fn interpret(&self, relative: &RelativeState, reference: &StateVector) -> StateVector {
        if !relative.is_relative() {
            return relative.to_absolute(reference);
        }

        let mut interpreted = StateVector::root();
        let mut values: &[AxisValue] = &self.modes;
        for axis in Axis::ALL {
            let key = relative.get(axis).unwrap_or(reference.get(axis));
            match values.iter().find(|value| value.id == key) {
                Some(found) => {
                    interpreted.set(axis, key);
                    values = &found.sub_values;
                }
                None => break,
            }
        }
        interpreted
    }

    /// Replaces `Default` axes with a sensible concrete value: the first
    /// concrete mode or page, and for the cell the grid's starting cell.
    /// Axes below a value missing from the tree are reset to `Default`.
    pub fn make_specific(&self, state: &StateVector) -> StateVector {
        if state.is_specific() {
            return *state;
        }

        let mut specific = *state;
        let mut values: &[AxisValue] = &self.modes;
        for (index, axis) in Axis::ALL.into_iter().enumerate() {
            let mut key = specific.get(axis);
            if key.is_default() {
                key = match axis {
                    Axis::Cell => self
                        .mode(specific.mode)
                        .and_then(AxisValue::grid_type)
                        .map_or(AxisKey::Default, |grid| AxisKey::Id(grid.default_cell())),
                    Axis::Mode | Axis::Page => values
                        .iter()
                        .find(|value| !value.id.is_default())
                        .map_or(AxisKey::Default, |value| value.id),
                };
                specific.set(axis, key);
            }

            match values.iter().find(|value| value.id == key) {
                Some(found) => values = &found.sub_values,
                None => {
                    for rest in &Axis::ALL[index..] {
                        specific.set(*rest, AxisKey::Default);
                    }
                    break;
                }
            }
        }
        specific
    }

    /// Removes modes whose navigation or selection control is missing from
    /// `layout`. Returns the ids of the removed modes.
    pub fn validate(&mut self, layout: &ControlLayout) -> Vec<u32> {
        let mut removed = Vec::new();
        self.modes.retain(|mode| {
            let valid = mode.id.is_default()
                || mode
                    .controls
                    .as_ref()
                    .map_or(true, |controls| controls.is_valid_for(layout));
            if !valid {
                removed.extend(mode.id.id());
            }
            valid
        });
        removed
    }

    pub(crate) fn insert_mode_after(&mut self, after: AxisKey, mode: AxisValue) {
        insert_after(&mut self.modes, after, mode);
    }

    pub(crate) fn push_mode(&mut self, mode: AxisValue) {
        self.modes.push(mode);
    }

    pub(crate) fn remove_mode(&mut self, id: AxisKey) -> Option<AxisValue> {
        let index = self.modes.iter().position(|mode| mode.id == id)?;
        Some(self.modes.remove(index))
    }

    /// Removes every concrete mode, keeping the reserved one.
    pub(crate) fn clear_modes(&mut self) -> Vec<u32> {
        let removed = self.mode_ids().collect();
        self.modes.retain(|mode| mode.id.is_default());
        removed
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use keysticks_control::{ControlKind, Direction, DirectionMode, GeneralisedControl, InputControl};

    use super::*;

    fn state(s: &str) -> StateVector {
        s.parse().expect("valid state")
    }

    /// Mode 1 "Game" with pages Default and 2 "Menu"; mode 3 "Typing" with
    /// an action strip of four cells on pages Default and 5.
    pub(crate) fn sample_tree() -> SituationTree {
        let mut tree = SituationTree::new();

        let mut game = AxisValue::mode(AxisKey::Id(1), "Game");
        game.sub_values.push(AxisValue::page(AxisKey::Default, "Any page"));
        game.sub_values.push(AxisValue::page(AxisKey::Id(2), "Menu"));
        tree.insert_mode_after(AxisKey::Default, game);

        let selection = GeneralisedControl::new(DirectionMode::NonDirectional, InputControl::button(1));
        let navigation = GeneralisedControl::new(DirectionMode::TwoWay, InputControl::dpad(1, Direction::None));
        let mut typing = AxisValue::mode(AxisKey::Id(3), "Typing");
        typing.controls = Some(ControlsDefinition::new(navigation, selection));
        typing.grid = Some(GridConfig::create(GridType::ActionStrip, 4, &selection, &ControlLayout::standard()));
        for (id, name) in [(AxisKey::Default, "Any page"), (AxisKey::Id(5), "Numbers")] {
            let mut page = AxisValue::page(id, name);
            page.sub_values.push(AxisValue::cell(AxisKey::Default, "Any cell"));
            for (cell, cell_name) in GridType::ActionStrip.cells(4) {
                page.sub_values.push(AxisValue::cell(AxisKey::Id(cell), cell_name));
            }
            typing.sub_values.push(page);
        }
        tree.insert_mode_after(AxisKey::Id(1), typing);
        tree
    }

    #[test]
    fn new_tree_has_the_root_situation() {
        let tree = SituationTree::new();
        assert!(tree.has_state(&StateVector::root()));
        assert_eq!(tree.initial_state(), StateVector::root());
        assert_eq!(tree.first_unused_mode_id(), 1);
    }

    #[test]
    fn has_state_walks_mode_page_cell() {
        let tree = sample_tree();
        assert!(tree.has_state(&state("1,*,*")));
        assert!(tree.has_state(&state("1,2,*")));
        assert!(!tree.has_state(&state("1,4,*")));
        assert!(!tree.has_state(&state("2,*,*")));
        assert!(tree.has_state(&state("3,5,4")));
        assert!(tree.has_state(&state("3,*,2")));
        assert!(!tree.has_state(&state("3,5,9")));
        assert!(!tree.has_state(&state("1,*,1")));
    }

    #[test]
    fn initial_state_is_first_concrete_mode() {
        assert_eq!(sample_tree().initial_state(), state("1,*,*"));
        assert_eq!(sample_tree().first_unused_mode_id(), 2);
    }

    #[test]
    fn interpret_stops_at_missing_axis() {
        let tree = sample_tree();
        let to_page_4: RelativeState = "-,4,-".parse().expect("relative");
        assert_eq!(tree.interpret(&to_page_4, &state("1,2,*")), state("1,*,*"));
        let to_cell_3: RelativeState = "-,-,3".parse().expect("relative");
        assert_eq!(tree.interpret(&to_cell_3, &state("3,5,1")), state("3,5,3"));
    }

    #[test]
    fn make_specific_picks_first_values_and_grid_cell() {
        let tree = sample_tree();
        assert_eq!(tree.make_specific(&state("3,*,*")), state("3,5,1"));
        assert_eq!(tree.make_specific(&state("1,*,*")), state("1,2,*"));
        assert_eq!(tree.make_specific(&StateVector::root()), state("1,2,*"));
        assert_eq!(tree.make_specific(&state("1,9,*")), state("1,*,*"));
    }

    #[test]
    fn validate_drops_modes_with_unknown_controls() {
        let mut tree = sample_tree();
        let layout = ControlLayout::new()
            .with_controls(ControlKind::Button, 2)
            .with_controls(ControlKind::Trigger, 2);
        assert_eq!(tree.validate(&layout), vec![3]);
        assert!(tree.mode(AxisKey::Id(1)).is_some());
        assert!(tree.validate(&layout).is_empty());
    }

    #[test]
    fn clear_keeps_reserved_mode() {
        let mut tree = sample_tree();
        assert_eq!(tree.clear_modes(), vec![1, 3]);
        assert_eq!(tree.modes().len(), 1);
        assert!(tree.has_state(&StateVector::root()));
    }
}
