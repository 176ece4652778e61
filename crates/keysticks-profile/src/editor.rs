//! Action-level edits: adding, replacing and removing single actions, and
//! copying, importing or swapping whole sets between controls and
//! situations.

use keysticks_control::{EventReason, GeneralisedControl, InputControl};

use crate::action::{Action, ActionSet, ActionType};
use crate::direction::DirectionalityResolver;
use crate::error::EditError;
use crate::source::Source;
use crate::state::{Axis, AxisKey, StateVector};
use crate::store::ActionStore;

/// Edits the actions of a [`Source`]. Every operation checks everything it
/// needs before writing, so an `Err` leaves the source untouched.
pub struct ActionEditor<'a> {
    source: &'a mut Source,
}

impl<'a> ActionEditor<'a> {
    pub(crate) fn new(source: &'a mut Source) -> Self {
        Self { source }
    }

    fn resolver<'s>(&'s self, store: &'s ActionStore) -> DirectionalityResolver<'s> {
        DirectionalityResolver::new(
            &self.source.layout,
            &self.source.tree,
            store,
            &self.source.settings,
        )
    }

    fn check_binding(
        &self,
        situation: &StateVector,
        control: &InputControl,
        reason: EventReason,
        action_type: ActionType,
    ) -> Result<(), EditError> {
        if !self.source.tree.has_state(situation) {
            return Err(EditError::UnknownSituation(*situation));
        }
        if !self.source.layout.contains(control) {
            return Err(EditError::UnknownControl(*control));
        }
        if !self.source.layout.is_reason_supported(control, reason) {
            return Err(EditError::UnsupportedReason {
                control: *control,
                reason,
            });
        }
        if !self
            .resolver(&self.source.store)
            .is_action_type_valid(situation, control, reason, action_type)
        {
            return Err(EditError::InvalidActionType {
                action_type,
                control: *control,
                reason,
            });
        }
        Ok(())
    }

    /// Limits on what one event may do, checked against the set as it
    /// would be after the edit. `replacing` names the index of the action
    /// in `reason`'s list that `action` takes the place of.
    fn check_limits(
        &self,
        set: Option<&ActionSet>,
        reason: EventReason,
        replacing: Option<usize>,
        action: &Action,
    ) -> Result<(), EditError> {
        let max = self.source.settings.max_action_list_length;
        let list: Vec<&Action> = set
            .and_then(|set| set.actions(reason))
            .map(|list| {
                list.iter()
                    .enumerate()
                    .filter(|(index, _)| Some(*index) != replacing)
                    .map(|(_, action)| action)
                    .collect()
            })
            .unwrap_or_default();

        if list.len() >= max {
            return Err(EditError::ActionListFull(max));
        }
        if reason.is_repeat()
            && !list.is_empty()
            && (action.action_type().changes_situation()
                || list.iter().any(|a| a.action_type().changes_situation()))
        {
            return Err(EditError::ChangeSituationWithRepeat);
        }

        let others = set
            .into_iter()
            .flat_map(|set| set.lists())
            .filter(|other| other.reason != reason)
            .flat_map(|other| other.iter());
        let mut erases = false;
        let mut other_keys = false;
        for candidate in list.into_iter().chain(others).chain(std::iter::once(action)) {
            match candidate.key_combo() {
                Some(combo) if combo.is_erasing() => erases = true,
                Some(_) => other_keys = true,
                None if candidate.action_type() == ActionType::StartProgram => other_keys = true,
                None => {}
            }
        }
        if erases && other_keys {
            return Err(EditError::EraseCombination);
        }
        Ok(())
    }

    pub fn can_add_action(
        &self,
        situation: &StateVector,
        control: &InputControl,
        reason: EventReason,
        action: &Action,
    ) -> Result<(), EditError> {
        self.check_binding(situation, control, reason, action.action_type())?;
        self.check_limits(
            self.source.store.get(situation, control),
            reason,
            None,
            action,
        )
    }

    /// Appends `action` to the list of `reason`, creating the set stored
    /// exactly at `situation` if needed.
    pub fn add_action(
        &mut self,
        situation: &StateVector,
        control: &InputControl,
        reason: EventReason,
        action: Action,
    ) -> Result<(), EditError> {
        self.can_add_action(situation, control, reason, &action)?;
        let mut set = self
            .source
            .store
            .get(situation, control)
            .cloned()
            .unwrap_or_else(|| ActionSet::new(*situation, *control));
        set.push(reason, action);
        self.source.store.add_action_set(set);
        self.source.revalidate();
        Ok(())
    }

    pub fn can_replace_action(
        &self,
        situation: &StateVector,
        control: &InputControl,
        reason: EventReason,
        index: usize,
        action: &Action,
    ) -> Result<(), EditError> {
        let set = self.source.store.get(situation, control);
        let exists = set
            .and_then(|set| set.actions(reason))
            .is_some_and(|list| index < list.len());
        if !exists {
            return Err(EditError::InvalidActionIndex(index));
        }
        self.check_binding(situation, control, reason, action.action_type())?;
        self.check_limits(set, reason, Some(index), action)
    }

    /// Replaces the action at `index`, returning the old one.
    pub fn replace_action(
        &mut self,
        situation: &StateVector,
        control: &InputControl,
        reason: EventReason,
        index: usize,
        action: Action,
    ) -> Result<Action, EditError> {
        self.can_replace_action(situation, control, reason, index, &action)?;
        let replaced = self
            .source
            .store
            .get_mut(situation, control)
            .and_then(|set| set.actions_mut(reason))
            .map(|list| std::mem::replace(&mut list.actions[index], action))
            .ok_or(EditError::InvalidActionIndex(index))?;
        self.source.revalidate();
        Ok(replaced)
    }

    /// Removes the action at `index`. Lists and sets left empty go with it.
    pub fn delete_action(
        &mut self,
        situation: &StateVector,
        control: &InputControl,
        reason: EventReason,
        index: usize,
    ) -> Result<Action, EditError> {
        let store = &mut self.source.store;
        let exists = store
            .get(situation, control)
            .and_then(|set| set.actions(reason))
            .is_some_and(|list| index < list.len());
        if !exists {
            return Err(EditError::InvalidActionIndex(index));
        }

        let mut set = store
            .remove_action_set(situation, control)
            .ok_or(EditError::InvalidActionIndex(index))?;
        let removed = set
            .actions_mut(reason)
            .map(|list| list.actions.remove(index))
            .ok_or(EditError::InvalidActionIndex(index))?;
        set.prune();
        if !set.is_empty() {
            store.add_action_set(set);
        }
        self.source.revalidate();
        Ok(removed)
    }

    /// Copies every set governed by `from_situation` of this source to
    /// `to_situation`. Returns the number of sets written.
    pub fn copy_actions(
        &mut self,
        from_situation: &StateVector,
        to_situation: &StateVector,
    ) -> Result<usize, EditError> {
        let sets: Vec<ActionSet> = self
            .source
            .store
            .actions_within_state(from_situation)
            .into_iter()
            .cloned()
            .collect();
        self.copy_sets(sets, to_situation)
    }

    /// Like [`copy_actions`](Self::copy_actions) with the sets taken from
    /// another source.
    pub fn copy_actions_from(
        &mut self,
        from: &Source,
        from_situation: &StateVector,
        to_situation: &StateVector,
    ) -> Result<usize, EditError> {
        let sets: Vec<ActionSet> = from
            .store
            .actions_within_state(from_situation)
            .into_iter()
            .cloned()
            .collect();
        self.copy_sets(sets, to_situation)
    }

    /// Copies the sets stored at the root situation of `from`, without
    /// anything they would inherit, to the root of this source.
    pub fn copy_root_actions(&mut self, from: &Source) -> Result<usize, EditError> {
        let root = StateVector::root();
        let table = from.store.get_actions_for_state(&root, false);
        let sets: Vec<ActionSet> = table.iter().map(|(_, set)| set.clone()).collect();
        self.copy_sets(sets, &root)
    }

    fn copy_sets(&mut self, sets: Vec<ActionSet>, to_situation: &StateVector) -> Result<usize, EditError> {
        if !self.source.tree.has_state(to_situation) {
            return Err(EditError::UnknownSituation(*to_situation));
        }

        let mut staged = self.source.store.clone();
        let mut copied = 0;
        for mut set in sets {
            let target = target_situation(to_situation, set.logical_state());
            if !self.source.tree.has_state(&target) {
                continue;
            }
            set.set_logical_state(target);
            staged.add_action_set(set);
            copied += 1;
        }
        self.source.commit(staged);
        Ok(copied)
    }

    /// Moves one set onto the address of `to` matching its position in
    /// `from`, storing it at `to_situation` in place of any set there.
    pub fn import_action_set(
        &mut self,
        set: &ActionSet,
        from: &GeneralisedControl,
        to_situation: &StateVector,
        to: &GeneralisedControl,
    ) -> Result<(), EditError> {
        if !self.source.tree.has_state(to_situation) {
            return Err(EditError::UnknownSituation(*to_situation));
        }
        let mut converted = set.clone();
        self.resolver(&self.source.store)
            .convert_action_set(&mut converted, from, to_situation, to)?;
        converted.set_logical_state(*to_situation);
        self.source.store.add_action_set(converted);
        self.source.revalidate();
        Ok(())
    }

    /// Imports the grid actions of `from_situation` in `from` into
    /// `to_situation`, moving each set from the source mode's selection
    /// or navigation control onto the destination mode's. Sets of other
    /// controls are left behind. Returns the number of sets imported.
    pub fn import_actions(
        &mut self,
        from: &Source,
        from_situation: &StateVector,
        to_situation: &StateVector,
    ) -> Result<usize, EditError> {
        if !self.source.tree.has_state(to_situation) {
            return Err(EditError::UnknownSituation(*to_situation));
        }
        let mode_id = |state: &StateVector| state.mode.id().unwrap_or_default();
        let from_controls = from
            .tree
            .controls(from_situation.mode)
            .copied()
            .ok_or(EditError::NoControls(mode_id(from_situation)))?;
        let to_controls = self
            .source
            .tree
            .controls(to_situation.mode)
            .copied()
            .ok_or(EditError::NoControls(mode_id(to_situation)))?;
        let pairs: Vec<(GeneralisedControl, GeneralisedControl)> = [
            (from_controls.selection, to_controls.selection),
            (from_controls.navigation, to_controls.navigation),
        ]
        .into_iter()
        .filter_map(|(from, to)| from.zip(to))
        .collect();

        let mut staged = self.source.store.clone();
        let mut imported = 0;
        for set in from.store.actions_within_state(from_situation) {
            let target = target_situation(to_situation, set.logical_state());
            if !self.source.tree.has_state(&target) {
                continue;
            }
            let resolver = self.resolver(&self.source.store);
            let converted = pairs.iter().find_map(|(from_general, to_general)| {
                let mut converted = set.clone();
                resolver
                    .convert_action_set(&mut converted, from_general, &target, to_general)
                    .ok()
                    .map(|()| converted)
            });
            if let Some(mut converted) = converted {
                converted.set_logical_state(target);
                staged.add_action_set(converted);
                imported += 1;
            }
        }
        self.source.commit(staged);
        Ok(imported)
    }

    /// Exchanges the sets stored at `situation` for the addresses of
    /// `first` with those of `second`. Either every set converts and the
    /// swap happens, or nothing changes.
    pub fn swap_action_sets(
        &mut self,
        situation: &StateVector,
        first: &GeneralisedControl,
        second: &GeneralisedControl,
    ) -> Result<(), EditError> {
        if !self.source.tree.has_state(situation) {
            return Err(EditError::UnknownSituation(*situation));
        }

        let layout = &self.source.layout;
        let table = self.source.store.get_actions_for_state(situation, false);
        let resolver = self.resolver(&self.source.store);
        let mut moved = Vec::new();
        let mut converted = Vec::new();
        for (control, set) in table.iter() {
            let (from, to) = if layout.is_general_type_of(control, first) {
                (first, second)
            } else if layout.is_general_type_of(control, second) {
                (second, first)
            } else {
                continue;
            };
            let mut set = set.clone();
            resolver.convert_action_set(&mut set, from, situation, to)?;
            moved.push(*control);
            converted.push(set);
        }

        let mut staged = self.source.store.clone();
        for control in &moved {
            staged.remove_action_set(situation, control);
        }
        for set in converted {
            staged.add_action_set(set);
        }
        self.source.commit(staged);
        Ok(())
    }
}

/// Where a set stored at `stored` lands when copied to `to`: axes of `to`
/// left at `Default` take the stored page and cell.
fn target_situation(to: &StateVector, stored: &StateVector) -> StateVector {
    let mut target = *to;
    for axis in [Axis::Page, Axis::Cell] {
        if target.get(axis) == AxisKey::Default {
            target.set(axis, stored.get(axis));
        }
    }
    target
}
