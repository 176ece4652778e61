//! Situation-scoped action resolution.
//!
//! A [`Source`] holds a control layout, a tree of situations (mode, page
//! and grid cell) and the action sets bound to controls in those
//! situations. Lookups walk from the most specific situation towards the
//! root so that broader situations act as defaults for narrower ones.

mod action;
mod cache;
mod direction;
mod editor;
mod error;
mod grid;
mod parse;
mod settings;
mod situation_editor;
mod source;
mod state;
mod store;
mod tree;
pub mod v1;
mod watcher;

use thiserror::Error;

pub use action::{Action, ActionList, ActionSet, ActionType, MouseButton, PredictionEvent};
pub use cache::{BindingIndex, GridBindingCache};
pub use direction::DirectionalityResolver;
pub use editor::ActionEditor;
pub use error::EditError;
pub use grid::{keyboard_cell_id, ControlsDefinition, GridBinding, GridConfig, GridType};
pub use parse::{load_profile, parse_profile};
pub use settings::EngineSettings;
pub use situation_editor::SituationEditor;
pub use source::{SharedSource, Source, SourceReport};
pub use state::{
    relative_state_to_absolute, Axis, AxisKey, GoverningChain, RelativeState, StateParseError,
    StateVector,
};
pub use store::{ActionMappingTable, ActionStore, ValidationReport};
pub use tree::{AxisValue, SituationTree};
pub use watcher::{ProfileEvent, ProfileEventReceiver, ProfileWatcher, WatcherError};

#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("yaml deserialize error: {0}")]
    YamlDeserializeError(#[from] serde_yaml::Error),
    #[error("unsupported version: {0}")]
    UnsupportedVersion(u8),
    #[error("v1 profile error: {0}")]
    V1ProfileError(#[from] v1::Error),
    #[error("path error: {0}")]
    PathError(#[from] std::io::Error),
}
