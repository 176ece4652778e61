//! Actions and the lists and sets they are bound in.

use std::fmt;

use keysticks_control::{Direction, DirectionMode, EventReason, InputControl, KeyCombo, ReasonSet};
use serde::Deserialize;
use smallvec::SmallVec;

use crate::state::{RelativeState, StateVector};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionType {
    TypeKey,
    PressDownKey,
    ReleaseKey,
    ToggleKey,
    TypeText,
    ClickMouseButton,
    DoubleClickMouseButton,
    PressDownMouseButton,
    ReleaseMouseButton,
    ToggleMouseButton,
    MouseWheelUp,
    MouseWheelDown,
    MoveThePointer,
    ControlThePointer,
    ChangeSituation,
    NavigateCells,
    WordPrediction,
    LoadProfile,
    StartProgram,
    ActivateWindow,
    MaximiseWindow,
    MinimiseWindow,
    ToggleControlsWindow,
    SetDirectionMode,
    SetDwellAndAutorepeat,
    Wait,
    DoNothing,
}

impl ActionType {
    pub const fn name(self) -> &'static str {
        match self {
            ActionType::TypeKey => "type_key",
            ActionType::PressDownKey => "press_down_key",
            ActionType::ReleaseKey => "release_key",
            ActionType::ToggleKey => "toggle_key",
            ActionType::TypeText => "type_text",
            ActionType::ClickMouseButton => "click_mouse_button",
            ActionType::DoubleClickMouseButton => "double_click_mouse_button",
            ActionType::PressDownMouseButton => "press_down_mouse_button",
            ActionType::ReleaseMouseButton => "release_mouse_button",
            ActionType::ToggleMouseButton => "toggle_mouse_button",
            ActionType::MouseWheelUp => "mouse_wheel_up",
            ActionType::MouseWheelDown => "mouse_wheel_down",
            ActionType::MoveThePointer => "move_the_pointer",
            ActionType::ControlThePointer => "control_the_pointer",
            ActionType::ChangeSituation => "change_situation",
            ActionType::NavigateCells => "navigate_cells",
            ActionType::WordPrediction => "word_prediction",
            ActionType::LoadProfile => "load_profile",
            ActionType::StartProgram => "start_program",
            ActionType::ActivateWindow => "activate_window",
            ActionType::MaximiseWindow => "maximise_window",
            ActionType::MinimiseWindow => "minimise_window",
            ActionType::ToggleControlsWindow => "toggle_controls_window",
            ActionType::SetDirectionMode => "set_direction_mode",
            ActionType::SetDwellAndAutorepeat => "set_dwell_and_autorepeat",
            ActionType::Wait => "wait",
            ActionType::DoNothing => "do_nothing",
        }
    }

    /// Actions that move to another situation.
    pub const fn changes_situation(self) -> bool {
        matches!(self, ActionType::ChangeSituation | ActionType::NavigateCells)
    }
}

impl fmt::Display for ActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MouseButton {
    Left,
    Middle,
    Right,
    X1,
    X2,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PredictionEvent {
    NextSuggestion,
    PreviousSuggestion,
    InsertSuggestion,
    CancelSuggestions,
    Enable,
    Disable,
}

/// Something a control event makes the source do.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Action {
    TypeKey { key: KeyCombo },
    PressDownKey { key: KeyCombo },
    ReleaseKey { key: KeyCombo },
    ToggleKey { key: KeyCombo },
    TypeText { text: String },
    ClickMouseButton { button: MouseButton },
    DoubleClickMouseButton { button: MouseButton },
    PressDownMouseButton { button: MouseButton },
    ReleaseMouseButton { button: MouseButton },
    ToggleMouseButton { button: MouseButton },
    MouseWheelUp,
    MouseWheelDown,
    MoveThePointer {
        x: i32,
        y: i32,
        #[serde(default)]
        absolute: bool,
    },
    ControlThePointer,
    ChangeSituation {
        situation: RelativeState,
        #[serde(default)]
        name: String,
    },
    NavigateCells { direction: Direction },
    WordPrediction { event: PredictionEvent },
    LoadProfile { path: String },
    StartProgram {
        program: String,
        #[serde(default)]
        args: String,
    },
    ActivateWindow { title: String },
    MaximiseWindow,
    MinimiseWindow,
    ToggleControlsWindow,
    SetDirectionMode { mode: DirectionMode },
    SetDwellAndAutorepeat { dwell_ms: u32, repeat_ms: u32 },
    Wait { ms: u32 },
    DoNothing,
}

impl Action {
    pub fn action_type(&self) -> ActionType {
        match self {
            Action::TypeKey { .. } => ActionType::TypeKey,
            Action::PressDownKey { .. } => ActionType::PressDownKey,
            Action::ReleaseKey { .. } => ActionType::ReleaseKey,
            Action::ToggleKey { .. } => ActionType::ToggleKey,
            Action::TypeText { .. } => ActionType::TypeText,
            Action::ClickMouseButton { .. } => ActionType::ClickMouseButton,
            Action::DoubleClickMouseButton { .. } => ActionType::DoubleClickMouseButton,
            Action::PressDownMouseButton { .. } => ActionType::PressDownMouseButton,
            Action::ReleaseMouseButton { .. } => ActionType::ReleaseMouseButton,
            Action::ToggleMouseButton { .. } => ActionType::ToggleMouseButton,
            Action::MouseWheelUp => ActionType::MouseWheelUp,
            Action::MouseWheelDown => ActionType::MouseWheelDown,
            Action::MoveThePointer { .. } => ActionType::MoveThePointer,
            Action::ControlThePointer => ActionType::ControlThePointer,
            Action::ChangeSituation { .. } => ActionType::ChangeSituation,
            Action::NavigateCells { .. } => ActionType::NavigateCells,
            Action::WordPrediction { .. } => ActionType::WordPrediction,
            Action::LoadProfile { .. } => ActionType::LoadProfile,
            Action::StartProgram { .. } => ActionType::StartProgram,
            Action::ActivateWindow { .. } => ActionType::ActivateWindow,
            Action::MaximiseWindow => ActionType::MaximiseWindow,
            Action::MinimiseWindow => ActionType::MinimiseWindow,
            Action::ToggleControlsWindow => ActionType::ToggleControlsWindow,
            Action::SetDirectionMode { .. } => ActionType::SetDirectionMode,
            Action::SetDwellAndAutorepeat { .. } => ActionType::SetDwellAndAutorepeat,
            Action::Wait { .. } => ActionType::Wait,
            Action::DoNothing => ActionType::DoNothing,
        }
    }

    /// Keys emitted by key actions.
    pub fn key_combo(&self) -> Option<&KeyCombo> {
        match self {
            Action::TypeKey { key }
            | Action::PressDownKey { key }
            | Action::ReleaseKey { key }
            | Action::ToggleKey { key } => Some(key),
            _ => None,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = self.action_type().name();
        match self {
            Action::TypeKey { key }
            | Action::PressDownKey { key }
            | Action::ReleaseKey { key }
            | Action::ToggleKey { key } => write!(f, "{name} {key}"),
            Action::TypeText { text } => write!(f, "{name} {text:?}"),
            Action::ClickMouseButton { button }
            | Action::DoubleClickMouseButton { button }
            | Action::PressDownMouseButton { button }
            | Action::ReleaseMouseButton { button }
            | Action::ToggleMouseButton { button } => write!(f, "{name} {button:?}"),
            Action::MoveThePointer { x, y, absolute } => {
                let to = if *absolute { "to" } else { "by" };
                write!(f, "{name} {to} {x},{y}")
            }
            Action::ChangeSituation { situation, name: label } if !label.is_empty() => {
                write!(f, "{name} {situation} ({label})")
            }
            Action::ChangeSituation { situation, .. } => write!(f, "{name} {situation}"),
            Action::NavigateCells { direction } => write!(f, "{name} {direction}"),
            Action::WordPrediction { event } => write!(f, "{name} {event:?}"),
            Action::LoadProfile { path } => write!(f, "{name} {path}"),
            Action::StartProgram { program, args } if args.is_empty() => write!(f, "{name} {program}"),
            Action::StartProgram { program, args } => write!(f, "{name} {program} {args}"),
            Action::ActivateWindow { title } => write!(f, "{name} {title:?}"),
            Action::SetDirectionMode { mode } => write!(f, "{name} {mode}"),
            Action::SetDwellAndAutorepeat { dwell_ms, repeat_ms } => {
                write!(f, "{name} {dwell_ms}ms/{repeat_ms}ms")
            }
            Action::Wait { ms } => write!(f, "{name} {ms}ms"),
            Action::MouseWheelUp
            | Action::MouseWheelDown
            | Action::ControlThePointer
            | Action::MaximiseWindow
            | Action::MinimiseWindow
            | Action::ToggleControlsWindow
            | Action::DoNothing => f.write_str(name),
        }
    }
}

/// Actions triggered by one event reason, in execution order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionList {
    pub reason: EventReason,
    pub actions: Vec<Action>,
}

impl ActionList {
    pub fn new(reason: EventReason) -> Self {
        Self {
            reason,
            actions: Vec::new(),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Action> {
        self.actions.iter()
    }

    pub fn has_actions_of_type(&self, action_type: ActionType) -> bool {
        self.actions.iter().any(|a| a.action_type() == action_type)
    }

    /// Whether the list navigates to another situation.
    pub fn changes_situation(&self) -> bool {
        self.actions.iter().any(|a| a.action_type().changes_situation())
    }
}

impl fmt::Display for ActionList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:", self.reason)?;
        for (index, action) in self.actions.iter().enumerate() {
            let sep = if index == 0 { " " } else { ", " };
            write!(f, "{sep}{action}")?;
        }
        Ok(())
    }
}

/// The actions bound to one control in one situation, one list per reason.
///
/// A set is identified by the situation it is stored at (its logical
/// state) and its control; the store holds at most one set per pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionSet {
    logical_state: StateVector,
    control: InputControl,
    lists: SmallVec<[ActionList; 2]>,
}

impl ActionSet {
    pub fn new(logical_state: StateVector, control: InputControl) -> Self {
        Self {
            logical_state,
            control,
            lists: SmallVec::new(),
        }
    }

    #[inline]
    pub fn logical_state(&self) -> &StateVector {
        &self.logical_state
    }

    #[inline]
    pub fn control(&self) -> &InputControl {
        &self.control
    }

    pub(crate) fn set_logical_state(&mut self, state: StateVector) {
        self.logical_state = state;
    }

    pub(crate) fn set_control(&mut self, control: InputControl) {
        self.control = control;
    }

    /// Lists ordered by reason.
    pub fn lists(&self) -> &[ActionList] {
        &self.lists
    }

    pub fn reasons(&self) -> ReasonSet {
        self.lists.iter().map(|list| list.reason).collect()
    }

    pub fn actions(&self, reason: EventReason) -> Option<&ActionList> {
        self.lists.iter().find(|list| list.reason == reason)
    }

    pub fn actions_mut(&mut self, reason: EventReason) -> Option<&mut ActionList> {
        self.lists.iter_mut().find(|list| list.reason == reason)
    }

    /// Replaces the list for `list.reason`.
    pub fn set_actions(&mut self, list: ActionList) {
        self.remove_actions(list.reason);
        let index = self
            .lists
            .iter()
            .position(|existing| existing.reason > list.reason)
            .unwrap_or(self.lists.len());
        self.lists.insert(index, list);
    }

    pub fn remove_actions(&mut self, reason: EventReason) -> Option<ActionList> {
        let index = self.lists.iter().position(|list| list.reason == reason)?;
        Some(self.lists.remove(index))
    }

    /// Appends an action to the list of `reason`, creating it if needed.
    pub fn push(&mut self, reason: EventReason, action: Action) {
        match self.actions_mut(reason) {
            Some(list) => list.actions.push(action),
            None => {
                let mut list = ActionList::new(reason);
                list.actions.push(action);
                self.set_actions(list);
            }
        }
    }

    /// Drops empty lists.
    pub(crate) fn prune(&mut self) {
        self.lists.retain(|list| !list.is_empty());
    }

    /// Whether the set holds no action at all.
    pub fn is_empty(&self) -> bool {
        self.lists.iter().all(ActionList::is_empty)
    }

    pub fn all_actions(&self) -> impl Iterator<Item = &Action> {
        self.lists.iter().flat_map(|list| list.actions.iter())
    }

    pub fn has_actions_of_type(&self, action_type: ActionType) -> bool {
        self.lists.iter().any(|list| list.has_actions_of_type(action_type))
    }

    /// Swaps every reason for its alternative (pressed for directed and so
    /// on). Reasons without an alternative are kept.
    pub(crate) fn swap_reasons(&mut self) {
        let lists = std::mem::take(&mut self.lists);
        for mut list in lists {
            if let Some(alternative) = list.reason.alternative() {
                list.reason = alternative;
            }
            self.set_actions(list);
        }
    }
}
