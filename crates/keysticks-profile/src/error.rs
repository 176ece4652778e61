use keysticks_control::{EventReason, InputControl};
use thiserror::Error;

use crate::action::ActionType;
use crate::state::StateVector;

/// Why an editor operation was refused. The source is left unchanged
/// whenever one of these is returned.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EditError {
    #[error("actions for {control} cannot be converted to {target}")]
    IncompatibleConversion {
        control: InputControl,
        target: InputControl,
    },
    #[error("situation {0} does not exist")]
    UnknownSituation(StateVector),
    #[error("control {0} does not exist")]
    UnknownControl(InputControl),
    #[error("{control} does not raise {reason}")]
    UnsupportedReason {
        control: InputControl,
        reason: EventReason,
    },
    #[error("{action_type} is not allowed for {control} on {reason}")]
    InvalidActionType {
        action_type: ActionType,
        control: InputControl,
        reason: EventReason,
    },
    #[error("no more than {0} actions are allowed per event")]
    ActionListFull(usize),
    #[error("repeating events may only change situation on their own")]
    ChangeSituationWithRepeat,
    #[error("delete and backspace cannot be combined with other keys or programs")]
    EraseCombination,
    #[error("no action at index {0}")]
    InvalidActionIndex(usize),
    #[error("the reserved default situation cannot be changed")]
    ReservedSituation,
    #[error("mode {0} has no grid")]
    NoGrid(u32),
    #[error("mode {0} has no navigation or selection control")]
    NoControls(u32),
}
