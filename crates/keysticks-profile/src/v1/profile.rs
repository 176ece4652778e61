use ahash::AHashMap;
use keysticks_control::{EventReason, GeneralisedControl, InputControl};
use serde::Deserialize;

use crate::action::Action;
use crate::grid::GridType;
use crate::settings::EngineSettings;
use crate::state::StateVector;

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProfileV1 {
    pub version: u8,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub settings: EngineSettings,
    #[serde(default)]
    pub(crate) controls: ProfileV1Controls,
    #[serde(default)]
    pub(crate) modes: Vec<ProfileV1Mode>,
    #[serde(default)]
    pub(crate) actions: Vec<ProfileV1ActionSet>,
}

/// Either a preset name (`standard`) or an explicit layout.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub(crate) enum ProfileV1Controls {
    Preset(String),
    Layout(ProfileV1Layout),
}

impl Default for ProfileV1Controls {
    fn default() -> Self {
        ProfileV1Controls::Preset("standard".to_string())
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub(crate) struct ProfileV1Layout {
    #[serde(default)]
    pub buttons: u8,
    #[serde(default)]
    pub sticks: u8,
    #[serde(default)]
    pub pressable_sticks: Vec<u8>,
    #[serde(default)]
    pub dpads: u8,
    #[serde(default)]
    pub triggers: u8,
    /// Buttons for left, right, up and down.
    #[serde(default)]
    pub diamond: Option<[u8; 4]>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct ProfileV1Mode {
    pub id: u32,
    pub name: String,
    #[serde(default)]
    pub controls: Option<ProfileV1ModeControls>,
    #[serde(default)]
    pub grid: Option<ProfileV1Grid>,
    #[serde(default)]
    pub pages: Vec<ProfileV1Page>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct ProfileV1ModeControls {
    #[serde(default)]
    pub navigation: Option<GeneralisedControl>,
    #[serde(default)]
    pub selection: Option<GeneralisedControl>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct ProfileV1Grid {
    #[serde(rename = "type")]
    pub grid_type: GridType,
    #[serde(default)]
    pub cols: u32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct ProfileV1Page {
    pub id: u32,
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct ProfileV1ActionSet {
    pub situation: StateVector,
    pub control: InputControl,
    #[serde(default)]
    pub on: AHashMap<EventReason, Vec<Action>>,
}
