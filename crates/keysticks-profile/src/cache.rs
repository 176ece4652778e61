//! Per-mode indexes over the grid bindings, built on first use and evicted
//! by structural edits.

use std::cell::RefCell;
use std::sync::Arc;

use ahash::AHashMap;
use smallvec::SmallVec;

use crate::grid::{GridBinding, GridConfig};
use crate::state::{AxisKey, StateVector};
use crate::tree::SituationTree;

type Positions = SmallVec<[usize; 4]>;

/// Slot and cell lookups over the bindings of one mode's grid.
#[derive(Debug, Clone, Default)]
pub struct BindingIndex {
    bindings: Vec<GridBinding>,
    slot_names: Vec<String>,
    slot_lookup: AHashMap<String, usize>,
    by_slot: Vec<Positions>,
    by_cell: AHashMap<u32, Positions>,
}

impl BindingIndex {
    pub fn build(grid: &GridConfig) -> Self {
        let slot_names = grid.slot_names();
        let slot_lookup: AHashMap<String, usize> = slot_names
            .iter()
            .enumerate()
            .map(|(index, name)| (name.clone(), index))
            .collect();

        let mut index = Self {
            bindings: Vec::with_capacity(grid.bindings.len()),
            by_slot: vec![Positions::new(); slot_names.len()],
            by_cell: AHashMap::new(),
            slot_names,
            slot_lookup,
        };

        for binding in &grid.bindings {
            let Some(&slot) = index.slot_lookup.get(&binding.slot) else {
                log::warn!("skipping grid binding for unknown slot {}", binding.slot);
                continue;
            };
            let position = index.bindings.len();
            index.by_slot[slot].push(position);
            if let Some(AxisKey::Id(cell)) = binding.state.cell {
                index.by_cell.entry(cell).or_default().push(position);
            }
            index.bindings.push(binding.clone());
        }
        index
    }

    /// Bindings of slot `slot` in declaration order. Empty when the slot
    /// is out of range.
    pub fn bindings_for_slot(&self, slot: usize) -> Vec<&GridBinding> {
        self.by_slot
            .get(slot)
            .map(|positions| positions.iter().map(|p| &self.bindings[*p]).collect())
            .unwrap_or_default()
    }

    /// The first declared binding of a slot.
    pub fn first_binding_for_slot(&self, slot: usize) -> Option<&GridBinding> {
        self.by_slot
            .get(slot)?
            .first()
            .map(|position| &self.bindings[*position])
    }

    pub fn bindings_for_cell(&self, cell: u32) -> Vec<&GridBinding> {
        self.by_cell
            .get(&cell)
            .map(|positions| positions.iter().map(|p| &self.bindings[*p]).collect())
            .unwrap_or_default()
    }

    pub fn slot_index(&self, name: &str) -> Option<usize> {
        self.slot_lookup.get(name).copied()
    }

    pub fn slot_name(&self, slot: usize) -> Option<&str> {
        self.slot_names.get(slot).map(String::as_str)
    }

    pub fn slot_count(&self) -> usize {
        self.slot_names.len()
    }

    /// Every indexed binding in declaration order.
    pub fn bindings(&self) -> &[GridBinding] {
        &self.bindings
    }

    /// The absolute situation a slot stands for while `current` is active.
    pub fn situation_for_slot(&self, slot: usize, current: &StateVector) -> Option<StateVector> {
        self.first_binding_for_slot(slot)
            .map(|binding| binding.state.to_absolute(current))
    }
}

/// Lazily built [`BindingIndex`] per mode id. An entry is either absent or
/// built from the grid as it was at build time; edits evict, never patch.
#[derive(Debug, Default)]
pub struct GridBindingCache {
    entries: RefCell<AHashMap<AxisKey, Arc<BindingIndex>>>,
}

impl Clone for GridBindingCache {
    fn clone(&self) -> Self {
        Self {
            entries: RefCell::new(self.entries.borrow().clone()),
        }
    }
}

impl GridBindingCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index of `mode`'s grid, building it if needed. `None` when the mode
    /// does not exist or has no grid.
    pub fn get(&self, tree: &SituationTree, mode: AxisKey) -> Option<Arc<BindingIndex>> {
        if let Some(index) = self.entries.borrow().get(&mode) {
            return Some(Arc::clone(index));
        }

        let grid = tree.grid(mode)?;
        let index = Arc::new(BindingIndex::build(grid));
        log::debug!(
            "built grid index for mode {mode}: {} bindings over {} slots",
            index.bindings().len(),
            index.slot_count()
        );
        self.entries.borrow_mut().insert(mode, Arc::clone(&index));
        Some(index)
    }

    pub fn is_built(&self, mode: AxisKey) -> bool {
        self.entries.borrow().contains_key(&mode)
    }

    pub fn invalidate(&self, mode: AxisKey) {
        if self.entries.borrow_mut().remove(&mode).is_some() {
            log::debug!("evicted grid index for mode {mode}");
        }
    }

    pub fn invalidate_all(&self) {
        self.entries.borrow_mut().clear();
    }
}

#[cfg(test)]
mod tests {
    use keysticks_control::{ControlLayout, Direction, DirectionMode, GeneralisedControl, InputControl};

    use super::*;
    use crate::grid::GridType;
    use crate::state::RelativeState;
    use crate::tree::tests::sample_tree;

    fn typing() -> AxisKey {
        AxisKey::Id(3)
    }

    #[test]
    fn index_is_built_on_first_query_and_reused() {
        let tree = sample_tree();
        let cache = GridBindingCache::new();
        assert!(!cache.is_built(typing()));

        let first = cache.get(&tree, typing()).expect("grid");
        assert!(cache.is_built(typing()));
        let second = cache.get(&tree, typing()).expect("grid");
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first.slot_count(), 4);
        assert_eq!(first.slot_index("A2"), Some(2));
    }

    #[test]
    fn modes_without_grid_have_no_index() {
        let tree = sample_tree();
        let cache = GridBindingCache::new();
        assert!(cache.get(&tree, AxisKey::Id(1)).is_none());
        assert!(cache.get(&tree, AxisKey::Id(9)).is_none());
        assert!(!cache.is_built(AxisKey::Id(1)));
    }

    #[test]
    fn invalidation_reflects_the_new_grid() {
        let mut tree = sample_tree();
        let cache = GridBindingCache::new();
        assert_eq!(cache.get(&tree, typing()).expect("grid").slot_count(), 4);

        let selection = GeneralisedControl::new(DirectionMode::NonDirectional, InputControl::button(1));
        let mode = tree.mode_mut(typing()).expect("mode");
        mode.grid = Some(GridConfig::create(GridType::ActionStrip, 6, &selection, &ControlLayout::standard()));
        cache.invalidate(typing());
        assert!(!cache.is_built(typing()));

        let rebuilt = cache.get(&tree, typing()).expect("grid");
        assert_eq!(rebuilt.slot_count(), 6);
        assert_eq!(rebuilt.bindings_for_cell(6).len(), 1);
    }

    #[test]
    fn slot_lookups_are_bounds_checked() {
        let tree = sample_tree();
        let index = GridBindingCache::new().get(&tree, typing()).expect("grid");
        assert_eq!(index.bindings_for_slot(0).len(), 1);
        assert!(index.bindings_for_slot(40).is_empty());
        assert!(index.first_binding_for_slot(40).is_none());
        assert_eq!(index.slot_name(3), Some("A3"));
    }

    #[test]
    fn square_grid_slots_and_cells() {
        let navigation = GeneralisedControl::new(DirectionMode::FourWay, InputControl::dpad(1, Direction::None));
        let grid = GridConfig::create(GridType::Square8x4, 0, &navigation, &ControlLayout::standard());
        let index = BindingIndex::build(&grid);

        assert_eq!(index.slot_count(), 81);
        assert_eq!(index.bindings().len(), 45);
        assert_eq!(index.bindings_for_cell(100).len(), 5);
        let slot = index.slot_index("A0001").expect("slot");
        let first = index.first_binding_for_slot(slot).expect("binding");
        assert_eq!(first.control, InputControl::dpad(1, Direction::Up));
    }

    #[test]
    fn first_binding_wins_for_shared_slots() {
        let selection = GeneralisedControl::new(DirectionMode::NonDirectional, InputControl::button(1));
        let mut grid = GridConfig::create(GridType::ActionStrip, 2, &selection, &ControlLayout::standard());
        grid.bindings.push(GridBinding {
            slot: "A0".into(),
            state: RelativeState::new(None, None, Some(AxisKey::Id(2))),
            control: InputControl::button(2),
        });
        grid.bindings.push(GridBinding {
            slot: "Z9".into(),
            state: RelativeState::unchanged(),
            control: InputControl::button(3),
        });

        let index = BindingIndex::build(&grid);
        assert_eq!(index.bindings().len(), 3);
        assert_eq!(index.bindings_for_slot(0).len(), 2);
        let first = index.first_binding_for_slot(0).expect("binding");
        assert_eq!(first.control, InputControl::button(1));

        let current: StateVector = "3,5,4".parse().expect("state");
        assert_eq!(
            index.situation_for_slot(0, &current),
            Some("3,5,1".parse().expect("state"))
        );
    }
}
