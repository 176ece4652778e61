//! Action sets keyed by the situation and control they were authored for,
//! with most-specific-wins lookup through the governing chain.

use std::cell::RefCell;
use std::sync::Arc;

use ahash::AHashMap;
use keysticks_control::{is_direction_valid, ControlLayout, InputControl};

use crate::action::{Action, ActionSet, ActionType};
use crate::direction::DirectionalityResolver;
use crate::settings::EngineSettings;
use crate::state::{AxisKey, StateVector};
use crate::tree::SituationTree;

/// The action sets that apply in one situation, one per control.
#[derive(Debug, Clone, Default)]
pub struct ActionMappingTable {
    situation: StateVector,
    sets: AHashMap<InputControl, Arc<ActionSet>>,
}

impl ActionMappingTable {
    #[inline]
    pub fn situation(&self) -> &StateVector {
        &self.situation
    }

    pub fn get(&self, control: &InputControl) -> Option<&ActionSet> {
        self.sets.get(control).map(AsRef::as_ref)
    }

    pub fn len(&self) -> usize {
        self.sets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&InputControl, &ActionSet)> {
        self.sets.iter().map(|(control, set)| (control, set.as_ref()))
    }
}

/// What a validation pass changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    /// Sets removed entirely, by situation and control.
    pub removed: Vec<(StateVector, InputControl)>,
    /// Sets that were kept but lost lists or actions.
    pub changed: usize,
}

impl ValidationReport {
    pub fn is_clean(&self) -> bool {
        self.removed.is_empty() && self.changed == 0
    }

    fn merge(&mut self, other: ValidationReport) {
        self.removed.extend(other.removed);
        self.changed += other.changed;
    }
}

enum Fix {
    Remove,
    Replace(ActionSet),
}

#[derive(Debug, Clone, Default)]
pub struct ActionStore {
    sets: AHashMap<StateVector, AHashMap<InputControl, Arc<ActionSet>>>,
    tables: RefCell<AHashMap<(StateVector, bool), Arc<ActionMappingTable>>>,
}

impl ActionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.sets.values().map(|by_control| by_control.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.sets.values().all(|by_control| by_control.is_empty())
    }

    /// Every set, in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = &ActionSet> {
        self.sets
            .values()
            .flat_map(|by_control| by_control.values().map(AsRef::as_ref))
    }

    /// Every set ordered by situation then control.
    pub fn sorted(&self) -> Vec<&ActionSet> {
        let mut sets: Vec<&ActionSet> = self.iter().collect();
        sets.sort_by_key(|set| (*set.logical_state(), *set.control()));
        sets
    }

    /// The set stored exactly at `(situation, control)`.
    pub fn get(&self, situation: &StateVector, control: &InputControl) -> Option<&ActionSet> {
        self.sets
            .get(situation)?
            .get(control)
            .map(AsRef::as_ref)
    }

    pub(crate) fn get_mut(
        &mut self,
        situation: &StateVector,
        control: &InputControl,
    ) -> Option<&mut ActionSet> {
        self.tables.get_mut().clear();
        self.sets
            .get_mut(situation)?
            .get_mut(control)
            .map(Arc::make_mut)
    }

    /// The set that applies to `control` in `situation`. Without
    /// inheritance only an exact match counts; with it the first hit along
    /// the governing chain wins.
    pub fn get_actions_for_input_control(
        &self,
        situation: &StateVector,
        control: &InputControl,
        include_inherited: bool,
    ) -> Option<&ActionSet> {
        if !include_inherited {
            return self.get(situation, control);
        }
        situation
            .governing_chain()
            .iter()
            .find_map(|state| self.get(state, control))
    }

    /// Every set that applies in `situation`, one per control. Tables are
    /// cached until the next change to the store.
    pub fn get_actions_for_state(
        &self,
        situation: &StateVector,
        include_inherited: bool,
    ) -> Arc<ActionMappingTable> {
        let key = (*situation, include_inherited);
        if let Some(table) = self.tables.borrow().get(&key) {
            return Arc::clone(table);
        }

        let mut table = ActionMappingTable {
            situation: *situation,
            sets: AHashMap::new(),
        };
        let chain = situation.governing_chain();
        let states = if include_inherited { &chain[..] } else { &chain[..1] };
        for state in states {
            let Some(by_control) = self.sets.get(state) else {
                continue;
            };
            for (control, set) in by_control {
                table
                    .sets
                    .entry(*control)
                    .or_insert_with(|| Arc::clone(set));
            }
        }

        let table = Arc::new(table);
        self.tables.borrow_mut().insert(key, Arc::clone(&table));
        table
    }

    /// Stores `set`, replacing and returning any set with the same key.
    pub fn add_action_set(&mut self, set: ActionSet) -> Option<ActionSet> {
        self.tables.get_mut().clear();
        self.sets
            .entry(*set.logical_state())
            .or_default()
            .insert(*set.control(), Arc::new(set))
            .map(Arc::unwrap_or_clone)
    }

    pub fn remove_action_set(
        &mut self,
        situation: &StateVector,
        control: &InputControl,
    ) -> Option<ActionSet> {
        self.tables.get_mut().clear();
        let by_control = self.sets.get_mut(situation)?;
        let removed = by_control.remove(control);
        if by_control.is_empty() {
            self.sets.remove(situation);
        }
        removed.map(Arc::unwrap_or_clone)
    }

    pub fn clear(&mut self) {
        self.tables.get_mut().clear();
        self.sets.clear();
    }

    /// Sets stored at situations governed by `state`.
    pub fn actions_within_state(&self, state: &StateVector) -> Vec<&ActionSet> {
        self.sorted()
            .into_iter()
            .filter(|set| state.contains(set.logical_state()))
            .collect()
    }

    pub fn actions_of_type(&self, action_type: ActionType) -> Vec<&Action> {
        self.sorted()
            .into_iter()
            .flat_map(ActionSet::all_actions)
            .filter(|action| action.action_type() == action_type)
            .collect()
    }

    pub fn has_actions_of_type(&self, action_type: ActionType) -> bool {
        self.iter().any(|set| set.has_actions_of_type(action_type))
    }

    pub fn has_word_prediction_in_mode(&self, mode: u32) -> bool {
        self.iter().any(|set| {
            set.logical_state().mode == AxisKey::Id(mode)
                && set.has_actions_of_type(ActionType::WordPrediction)
        })
    }

    /// Removes sets that no longer make sense and trims the rest:
    ///
    /// * sets whose control is missing from `layout` or whose situation is
    ///   missing from `tree`,
    /// * sets whose direction is not valid for the control's active
    ///   direction mode,
    /// * lists for reasons the control does not raise,
    /// * change-situation actions whose target does not exist,
    /// * sets left empty.
    ///
    /// Direction modes are themselves actions, so the pass repeats until
    /// nothing changes; running it again is a no-op.
    pub fn validate(
        &mut self,
        layout: &ControlLayout,
        tree: &SituationTree,
        settings: &EngineSettings,
    ) -> ValidationReport {
        let mut report = ValidationReport::default();
        loop {
            let fixes: Vec<(StateVector, InputControl, Fix)> = {
                let resolver = DirectionalityResolver::new(layout, tree, self, settings);
                self.sorted()
                    .into_iter()
                    .filter_map(|set| {
                        validate_set(set, layout, tree, &resolver)
                            .map(|fix| (*set.logical_state(), *set.control(), fix))
                    })
                    .collect()
            };
            if fixes.is_empty() {
                break;
            }
            report.merge(self.apply(fixes));
        }

        for (state, control) in &report.removed {
            log::debug!("removed invalid actions for {control} at {state}");
        }
        report
    }

    /// Enforces the limits on what a single event may do:
    ///
    /// * lists are cut to `max_list_length` actions,
    /// * a repeating event that changes situation may do nothing else,
    /// * delete or backspace may not be combined with other keys or with
    ///   starting a program; such sets are emptied.
    pub fn validate_security(&mut self, max_list_length: usize) -> ValidationReport {
        let fixes: Vec<(StateVector, InputControl, Fix)> = self
            .sorted()
            .into_iter()
            .filter_map(|set| {
                secure_set(set, max_list_length)
                    .map(|fix| (*set.logical_state(), *set.control(), fix))
            })
            .collect();
        self.apply(fixes)
    }

    fn apply(&mut self, fixes: Vec<(StateVector, InputControl, Fix)>) -> ValidationReport {
        let mut report = ValidationReport::default();
        for (state, control, fix) in fixes {
            match fix {
                Fix::Remove => {
                    self.remove_action_set(&state, &control);
                    report.removed.push((state, control));
                }
                Fix::Replace(set) => {
                    self.add_action_set(set);
                    report.changed += 1;
                }
            }
        }
        report
    }
}

fn validate_set(
    set: &ActionSet,
    layout: &ControlLayout,
    tree: &SituationTree,
    resolver: &DirectionalityResolver<'_>,
) -> Option<Fix> {
    let control = set.control();
    let state = set.logical_state();
    if !layout.contains(control) || !tree.has_state(state) {
        return Some(Fix::Remove);
    }

    let mut fixed = set.clone();
    if !control.is_setting() {
        let mode = resolver.active_direction_mode(state, control);
        if !is_direction_valid(control.direction, mode) {
            return Some(Fix::Remove);
        }
        for reason in set.reasons() {
            if !layout.is_reason_supported(control, reason) {
                fixed.remove_actions(reason);
            }
        }
    }

    for list in fixed.lists().to_vec() {
        let kept: Vec<Action> = list
            .actions
            .iter()
            .filter(|action| match action {
                Action::ChangeSituation { situation, .. } => {
                    tree.has_state(&tree.interpret(situation, state))
                }
                _ => true,
            })
            .cloned()
            .collect();
        if kept.len() != list.len() {
            if let Some(target) = fixed.actions_mut(list.reason) {
                target.actions = kept;
            }
        }
    }
    fixed.prune();

    if fixed.is_empty() {
        Some(Fix::Remove)
    } else if fixed != *set {
        Some(Fix::Replace(fixed))
    } else {
        None
    }
}

fn secure_set(set: &ActionSet, max_list_length: usize) -> Option<Fix> {
    let mut fixed = set.clone();
    let mut erases = false;
    let mut other = false;

    for list in set.lists() {
        let only_situation_changes = list.reason.is_repeat() && list.changes_situation();
        let mut kept = Vec::with_capacity(list.len());
        for action in list.iter() {
            if kept.len() >= max_list_length
                || (only_situation_changes && !action.action_type().changes_situation())
            {
                continue;
            }
            if let Some(combo) = action.key_combo() {
                if combo.is_erasing() {
                    erases = true;
                } else {
                    other = true;
                }
            } else if action.action_type() == ActionType::StartProgram {
                other = true;
            }
            kept.push(action.clone());
        }
        if let Some(target) = fixed.actions_mut(list.reason) {
            target.actions = kept;
        }
    }

    if erases && other {
        return Some(Fix::Remove);
    }
    fixed.prune();
    if fixed.is_empty() {
        Some(Fix::Remove)
    } else if fixed != *set {
        Some(Fix::Replace(fixed))
    } else {
        None
    }
}
