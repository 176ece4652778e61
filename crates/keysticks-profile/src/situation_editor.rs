//! Structural edits of the situation tree. Each edit evicts the grid
//! index of the modes it touches and re-validates the actions.

use keysticks_control::GeneralisedControl;

use crate::action::ActionSet;
use crate::error::EditError;
use crate::grid::{ControlsDefinition, GridConfig, GridType};
use crate::source::Source;
use crate::state::{Axis, AxisKey, StateVector};
use crate::tree::{grid_cells, AxisValue};

pub struct SituationEditor<'a> {
    source: &'a mut Source,
}

fn mode_state(mode: AxisKey) -> StateVector {
    StateVector::new(mode, AxisKey::Default, AxisKey::Default)
}

fn page_state(mode: AxisKey, page: AxisKey) -> StateVector {
    StateVector::new(mode, page, AxisKey::Default)
}

impl<'a> SituationEditor<'a> {
    pub(crate) fn new(source: &'a mut Source) -> Self {
        Self { source }
    }

    fn mode_mut(&mut self, mode: AxisKey) -> Result<&mut AxisValue, EditError> {
        self.source
            .tree
            .mode_mut(mode)
            .ok_or(EditError::UnknownSituation(mode_state(mode)))
    }

    fn concrete_mode_mut(&mut self, mode: AxisKey) -> Result<&mut AxisValue, EditError> {
        if mode.is_default() {
            return Err(EditError::ReservedSituation);
        }
        self.mode_mut(mode)
    }

    fn finish(&mut self, modes: &[AxisKey]) {
        for mode in modes {
            self.source.grids.invalidate(*mode);
        }
        self.source.revalidate();
    }

    /// Adds an empty mode after `after` (or at the end) and returns its id.
    pub fn add_mode(&mut self, name: &str, after: AxisKey) -> u32 {
        let id = self.source.tree.first_unused_mode_id();
        let mut mode = AxisValue::mode(AxisKey::Id(id), name);
        mode.sub_values.push(AxisValue::page(AxisKey::Default, "Any page"));
        self.source.tree.insert_mode_after(after, mode);
        self.finish(&[AxisKey::Id(id)]);
        id
    }

    pub fn rename_mode(&mut self, mode: AxisKey, name: &str) -> Result<(), EditError> {
        self.concrete_mode_mut(mode)?.name = name.to_string();
        self.finish(&[mode]);
        Ok(())
    }

    /// Copies a mode with its pages, cells, controls and actions. The copy
    /// is placed after the original; its grid is rebuilt for the copy's
    /// controls. Returns the new mode id.
    pub fn copy_mode(&mut self, from: AxisKey, name: &str) -> Result<u32, EditError> {
        let original = self
            .source
            .tree
            .mode(from)
            .cloned()
            .ok_or(EditError::UnknownSituation(mode_state(from)))?;
        if from.is_default() {
            return Err(EditError::ReservedSituation);
        }

        let id = self.source.tree.first_unused_mode_id();
        let key = AxisKey::Id(id);
        let mut copy = AxisValue::mode(key, name);
        copy.controls = original.controls;
        copy.grid = match (&original.grid, original.controls.and_then(|c| c.selection)) {
            (Some(grid), Some(selection)) => {
                Some(self.create_grid_config(grid.grid_type, grid.cols, &selection))
            }
            (grid, _) => grid.clone(),
        };
        copy.sub_values = original.sub_values;

        let mut staged = self.source.store.clone();
        for set in self.source.store.actions_within_state(&mode_state(from)) {
            let mut set: ActionSet = set.clone();
            set.set_logical_state(set.logical_state().with(Axis::Mode, key));
            staged.add_action_set(set);
        }

        self.source.tree.insert_mode_after(from, copy);
        self.source.store = staged;
        self.finish(&[key]);
        Ok(id)
    }

    pub fn delete_mode(&mut self, mode: AxisKey) -> Result<(), EditError> {
        self.concrete_mode_mut(mode)?;
        self.source.tree.remove_mode(mode);
        self.finish(&[mode]);
        Ok(())
    }

    /// Deletes every concrete mode, keeping the reserved one. Returns the
    /// ids removed.
    pub fn delete_all_modes(&mut self) -> Vec<u32> {
        let removed = self.source.tree.clear_modes();
        self.source.grids.invalidate_all();
        self.source.revalidate();
        removed
    }

    /// Appends a page laid out with the mode's grid and returns its id.
    pub fn add_page_to_mode(&mut self, mode: AxisKey, name: &str) -> Result<u32, EditError> {
        let node = self.mode_mut(mode)?;
        let id = node.first_unused_id();
        let mut page = AxisValue::page(AxisKey::Id(id), name);
        page.sub_values = grid_cells(node.grid.as_ref());
        node.sub_values.push(page);
        self.finish(&[mode]);
        Ok(id)
    }

    /// Gives a mode its reserved any-page node if it lacks one.
    pub fn add_default_page_to_mode(&mut self, mode: AxisKey) -> Result<(), EditError> {
        let node = self.mode_mut(mode)?;
        if !node.contains(AxisKey::Default) {
            let mut page = AxisValue::page(AxisKey::Default, "Any page");
            page.sub_values = grid_cells(node.grid.as_ref());
            node.sub_values.insert(0, page);
        }
        self.finish(&[mode]);
        Ok(())
    }

    pub fn rename_page(&mut self, mode: AxisKey, page: AxisKey, name: &str) -> Result<(), EditError> {
        if page.is_default() {
            return Err(EditError::ReservedSituation);
        }
        self.mode_mut(mode)?
            .get_mut(page)
            .ok_or(EditError::UnknownSituation(page_state(mode, page)))?
            .name = name.to_string();
        self.finish(&[mode]);
        Ok(())
    }

    /// Copies a page with its cells and actions into `to_mode`. The page
    /// keeps its id unless `to_mode` already uses it; the any-page node is
    /// only added where missing. Returns the id of the copy.
    pub fn copy_page(
        &mut self,
        from_mode: AxisKey,
        page: AxisKey,
        to_mode: AxisKey,
    ) -> Result<AxisKey, EditError> {
        let original = self
            .source
            .tree
            .page(from_mode, page)
            .cloned()
            .ok_or(EditError::UnknownSituation(page_state(from_mode, page)))?;
        let target = self.mode_mut(to_mode)?;

        let id = if page.is_default() || !target.contains(page) {
            page
        } else {
            AxisKey::Id(target.first_unused_id())
        };

        if !target.contains(id) {
            let mut copy = original;
            copy.id = id;
            if id.is_default() {
                target.sub_values.insert(0, copy);
            } else {
                target.sub_values.push(copy);
            }
        }

        let mut staged = self.source.store.clone();
        let sets = self
            .source
            .store
            .actions_within_state(&page_state(from_mode, page))
            .into_iter()
            .filter(|set| set.logical_state().page == page);
        for set in sets {
            let mut set = set.clone();
            let state = set.logical_state();
            set.set_logical_state(StateVector::new(to_mode, id, state.cell));
            staged.add_action_set(set);
        }
        self.source.store = staged;
        self.finish(&[to_mode]);
        Ok(id)
    }

    pub fn delete_page(&mut self, mode: AxisKey, page: AxisKey) -> Result<(), EditError> {
        if page.is_default() {
            return Err(EditError::ReservedSituation);
        }
        let node = self.mode_mut(mode)?;
        let index = node
            .sub_values
            .iter()
            .position(|value| value.id == page)
            .ok_or(EditError::UnknownSituation(page_state(mode, page)))?;
        node.sub_values.remove(index);
        self.finish(&[mode]);
        Ok(())
    }

    /// Builds a grid for `selection` with the source's layout. Action
    /// strips without a size get the configured default.
    pub fn create_grid_config(
        &self,
        grid_type: GridType,
        cols: u32,
        selection: &GeneralisedControl,
    ) -> GridConfig {
        let cols = if grid_type == GridType::ActionStrip && cols == 0 {
            self.source.settings.action_strip_default_cells
        } else {
            cols
        };
        GridConfig::create(grid_type, cols, selection, &self.source.layout)
    }

    /// Sets or removes a mode's grid and lays out every page again.
    pub fn set_mode_grid(
        &mut self,
        mode: AxisKey,
        grid: Option<(GridType, u32)>,
    ) -> Result<(), EditError> {
        let node = self.concrete_mode_mut(mode)?;
        let selection = node.controls.and_then(|controls| controls.selection);
        let config = match (grid, selection) {
            (None, _) => None,
            (Some((grid_type, cols)), Some(selection)) => {
                Some(self.create_grid_config(grid_type, cols, &selection))
            }
            (Some(_), None) => {
                return Err(EditError::NoControls(mode.id().unwrap_or_default()));
            }
        };

        let node = self.mode_mut(mode)?;
        node.grid = config;
        for page in &mut node.sub_values {
            page.sub_values = grid_cells(node.grid.as_ref());
        }
        self.finish(&[mode]);
        Ok(())
    }

    /// Sets the navigation and selection controls of a mode. A grid is
    /// rebuilt for the new selection control.
    pub fn set_mode_controls(
        &mut self,
        mode: AxisKey,
        controls: ControlsDefinition,
    ) -> Result<(), EditError> {
        if let Some(missing) = [controls.navigation, controls.selection]
            .into_iter()
            .flatten()
            .find(|general| !self.source.layout.contains(&general.reference))
        {
            return Err(EditError::UnknownControl(missing.reference));
        }

        let grid = self.concrete_mode_mut(mode)?.grid.clone();
        let rebuilt = match (grid, controls.selection) {
            (Some(grid), Some(selection)) => {
                Some(self.create_grid_config(grid.grid_type, grid.cols, &selection))
            }
            (grid, _) => grid,
        };

        let node = self.mode_mut(mode)?;
        node.controls = (!controls.is_empty()).then_some(controls);
        node.grid = rebuilt;
        self.finish(&[mode]);
        Ok(())
    }

    /// Adds the reserved any-cell node and the grid's cells a page lacks.
    pub fn add_cells_to_page(&mut self, mode: AxisKey, page: AxisKey) -> Result<(), EditError> {
        let node = self.mode_mut(mode)?;
        let cells = grid_cells(node.grid.as_ref());
        if cells.is_empty() {
            return Err(EditError::NoGrid(mode.id().unwrap_or_default()));
        }
        let page = node
            .get_mut(page)
            .ok_or(EditError::UnknownSituation(page_state(mode, page)))?;
        for cell in cells {
            if page.contains(cell.id) {
                continue;
            }
            if cell.id.is_default() {
                page.sub_values.insert(0, cell);
            } else {
                page.sub_values.push(cell);
            }
        }
        self.finish(&[mode]);
        Ok(())
    }
}
