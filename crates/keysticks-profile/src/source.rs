//! The source aggregate and the lock handle shared between threads.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use keysticks_control::{ControlKind, ControlLayout, DirectionMode, GeneralisedControl, InputControl};

use crate::action::ActionSet;
use crate::cache::{BindingIndex, GridBindingCache};
use crate::direction::DirectionalityResolver;
use crate::editor::ActionEditor;
use crate::error::EditError;
use crate::settings::EngineSettings;
use crate::situation_editor::SituationEditor;
use crate::state::{relative_state_to_absolute, AxisKey, RelativeState, StateVector};
use crate::store::{ActionMappingTable, ActionStore, ValidationReport};
use crate::tree::SituationTree;

/// What [`Source::validate`] removed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceReport {
    /// Modes dropped because their controls are missing from the layout.
    pub removed_modes: Vec<u32>,
    pub actions: ValidationReport,
}

impl SourceReport {
    pub fn is_clean(&self) -> bool {
        self.removed_modes.is_empty() && self.actions.is_clean()
    }
}

/// A control layout with its situation tree and the actions bound in it.
///
/// Queries borrow the source; edits go through [`Source::action_editor`]
/// and [`Source::situation_editor`], which keep the grid cache and the
/// action store consistent with the tree.
#[derive(Debug, Clone)]
pub struct Source {
    name: String,
    pub(crate) layout: ControlLayout,
    pub(crate) tree: SituationTree,
    pub(crate) store: ActionStore,
    pub(crate) grids: GridBindingCache,
    pub(crate) settings: EngineSettings,
    modified: bool,
}

impl Source {
    pub fn new(layout: ControlLayout, settings: EngineSettings) -> Self {
        Self::with_tree(layout, SituationTree::new(), settings)
    }

    pub fn with_tree(layout: ControlLayout, tree: SituationTree, settings: EngineSettings) -> Self {
        Self {
            name: String::new(),
            layout,
            tree,
            store: ActionStore::new(),
            grids: GridBindingCache::new(),
            settings,
            modified: false,
        }
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn layout(&self) -> &ControlLayout {
        &self.layout
    }

    pub fn tree(&self) -> &SituationTree {
        &self.tree
    }

    pub fn store(&self) -> &ActionStore {
        &self.store
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    pub fn grid_cache(&self) -> &GridBindingCache {
        &self.grids
    }

    /// Whether anything changed since the source was loaded or last
    /// marked saved.
    pub fn is_modified(&self) -> bool {
        self.modified
    }

    pub fn mark_saved(&mut self) {
        self.modified = false;
    }

    pub fn resolver(&self) -> DirectionalityResolver<'_> {
        DirectionalityResolver::new(&self.layout, &self.tree, &self.store, &self.settings)
    }

    pub fn action_editor(&mut self) -> ActionEditor<'_> {
        ActionEditor::new(self)
    }

    pub fn situation_editor(&mut self) -> SituationEditor<'_> {
        SituationEditor::new(self)
    }

    pub fn get_actions_for_input_control(
        &self,
        situation: &StateVector,
        control: &InputControl,
        include_inherited: bool,
    ) -> Option<&ActionSet> {
        self.store
            .get_actions_for_input_control(situation, control, include_inherited)
    }

    pub fn get_actions_for_state(
        &self,
        situation: &StateVector,
        include_inherited: bool,
    ) -> Arc<ActionMappingTable> {
        self.store.get_actions_for_state(situation, include_inherited)
    }

    pub fn get_active_direction_mode(
        &self,
        situation: &StateVector,
        control: &InputControl,
    ) -> DirectionMode {
        self.resolver().active_direction_mode(situation, control)
    }

    pub fn relative_state_to_absolute(
        &self,
        relative: &RelativeState,
        current: &StateVector,
    ) -> StateVector {
        relative_state_to_absolute(relative, current)
    }

    pub fn get_grid_bindings(&self, mode: AxisKey) -> Option<Arc<BindingIndex>> {
        self.grids.get(&self.tree, mode)
    }

    /// The set a control event at `situation` runs. Like the inherited
    /// lookup, except that a stick does not use a set inherited from a
    /// situation where it is continuous when it is not continuous here, or
    /// the other way round.
    pub fn effective_actions(
        &self,
        situation: &StateVector,
        control: &InputControl,
    ) -> Option<&ActionSet> {
        let set = self.store.get_actions_for_input_control(situation, control, true)?;
        if control.kind == ControlKind::Stick && set.logical_state() != situation {
            let resolver = self.resolver();
            let here = resolver.active_direction_mode(situation, control);
            let there = resolver.active_direction_mode(set.logical_state(), control);
            if here.is_continuous() != there.is_continuous() {
                return None;
            }
        }
        Some(set)
    }

    /// Stores `set` in place of any set with the same situation and
    /// control. The situation must exist.
    pub fn add_action_set(&mut self, set: ActionSet) -> Result<Option<ActionSet>, EditError> {
        if !self.tree.has_state(set.logical_state()) {
            return Err(EditError::UnknownSituation(*set.logical_state()));
        }
        self.modified = true;
        Ok(self.store.add_action_set(set))
    }

    pub fn remove_action_set(
        &mut self,
        situation: &StateVector,
        control: &InputControl,
    ) -> Option<ActionSet> {
        let removed = self.store.remove_action_set(situation, control);
        self.modified |= removed.is_some();
        removed
    }

    pub fn can_convert_action_set(
        &self,
        set: &ActionSet,
        from: &GeneralisedControl,
        to_situation: &StateVector,
        to: &GeneralisedControl,
    ) -> bool {
        self.resolver()
            .can_convert_action_set(set, from, to_situation, to)
    }

    pub fn convert_action_set(
        &self,
        set: &mut ActionSet,
        from: &GeneralisedControl,
        to_situation: &StateVector,
        to: &GeneralisedControl,
    ) -> Result<(), EditError> {
        self.resolver()
            .convert_action_set(set, from, to_situation, to)
    }

    /// Drops modes whose controls left the layout, then actions that no
    /// longer fit the tree or layout.
    pub fn validate(&mut self) -> SourceReport {
        let removed_modes = self.tree.validate(&self.layout);
        for mode in &removed_modes {
            self.grids.invalidate(AxisKey::Id(*mode));
        }
        let actions = self.store.validate(&self.layout, &self.tree, &self.settings);
        let report = SourceReport {
            removed_modes,
            actions,
        };
        self.modified |= !report.is_clean();
        report
    }

    pub fn validate_security(&mut self) -> ValidationReport {
        let report = self
            .store
            .validate_security(self.settings.max_action_list_length);
        self.modified |= !report.is_clean();
        report
    }

    pub(crate) fn revalidate(&mut self) {
        self.store.validate(&self.layout, &self.tree, &self.settings);
        self.modified = true;
    }

    pub(crate) fn commit(&mut self, store: ActionStore) {
        self.store = store;
        self.revalidate();
    }
}

/// A [`Source`] behind one exclusive lock.
///
/// Queries and single edits take the lock for their duration. Bulk edits go
/// through [`SharedSource::batch`], which works on a copy and swaps it in
/// only when the whole batch succeeds, so readers never see a partial
/// import.
#[derive(Debug, Clone)]
pub struct SharedSource {
    inner: Arc<Mutex<Source>>,
}

impl SharedSource {
    pub fn new(source: Source) -> Self {
        Self {
            inner: Arc::new(Mutex::new(source)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Source> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn read<R>(&self, f: impl FnOnce(&Source) -> R) -> R {
        f(&self.lock())
    }

    /// Edits the source in place. Use [`SharedSource::batch`] when the
    /// edit must not be observed half-applied.
    pub fn write<R>(&self, f: impl FnOnce(&mut Source) -> R) -> R {
        f(&mut self.lock())
    }

    /// Runs `f` on a copy of the source and commits the copy if `f`
    /// returns `Ok`. On `Err` the shared source is unchanged.
    pub fn batch<T, E>(&self, f: impl FnOnce(&mut Source) -> Result<T, E>) -> Result<T, E> {
        let mut guard = self.lock();
        let mut staged = guard.clone();
        let value = f(&mut staged)?;
        *guard = staged;
        Ok(value)
    }

    /// Replaces the whole source, e.g. after the profile was reloaded.
    pub fn replace(&self, source: Source) -> Source {
        std::mem::replace(&mut *self.lock(), source)
    }

    pub fn snapshot(&self) -> Source {
        self.lock().clone()
    }
}
