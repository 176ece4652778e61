use keysticks_control::DirectionMode;
use serde::Deserialize;

/// Engine-wide settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct EngineSettings {
    /// Most actions one event of a control may trigger.
    pub max_action_list_length: usize,
    /// Mode of sticks and D-pads without a direction mode action.
    pub default_direction_mode: DirectionMode,
    /// Cells of an action strip created without an explicit size.
    pub action_strip_default_cells: u32,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            max_action_list_length: 3,
            default_direction_mode: DirectionMode::EightWay,
            action_strip_default_cells: 10,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_take_defaults() {
        let settings: EngineSettings = serde_yaml::from_str("max_action_list_length: 5").expect("yaml");
        assert_eq!(settings.max_action_list_length, 5);
        assert_eq!(settings.default_direction_mode, DirectionMode::EightWay);
        assert_eq!(settings.action_strip_default_cells, 10);
    }

    #[test]
    fn unknown_fields_are_rejected() {
        assert!(serde_yaml::from_str::<EngineSettings>("max_actions: 5").is_err());
    }
}
