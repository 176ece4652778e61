use ahash::AHashSet;
use keysticks_control::{ButtonDiamond, ControlKind, ControlLayout};

use crate::action::ActionSet;
use crate::grid::{ControlsDefinition, GridConfig, GridType};
use crate::settings::EngineSettings;
use crate::source::Source;
use crate::state::AxisKey;
use crate::tree::{grid_cells, AxisValue, SituationTree};

use super::profile::{ProfileV1, ProfileV1Controls, ProfileV1Layout, ProfileV1Mode};
use super::Error;

impl ProfileV1 {
    /// Builds the source described by the profile. Actions are stored as
    /// written; run [`Source::validate`] to drop the ones that do not fit.
    pub fn to_source(&self) -> Result<Source, Error> {
        let layout = parse_layout(&self.controls)?;

        let mut tree = SituationTree::new();
        let mut mode_ids = AHashSet::new();
        for raw in &self.modes {
            if raw.id == 0 {
                return Err(Error::InvalidId(format!("mode {}", raw.name)));
            }
            if !mode_ids.insert(raw.id) {
                return Err(Error::DuplicateId(format!("mode {}", raw.id)));
            }
            tree.push_mode(parse_mode(raw, &layout, &self.settings)?);
        }

        let mut source = Source::with_tree(layout, tree, self.settings);
        if let Some(name) = &self.name {
            source = source.with_name(name.as_str());
        }

        for raw in &self.actions {
            let mut set = ActionSet::new(raw.situation, raw.control);
            for (reason, actions) in &raw.on {
                for action in actions {
                    set.push(*reason, action.clone());
                }
            }
            if source.add_action_set(set)?.is_some() {
                return Err(Error::DuplicateActions(format!(
                    "{} at {}",
                    raw.control, raw.situation
                )));
            }
        }

        source.mark_saved();
        Ok(source)
    }
}

fn parse_layout(raw: &ProfileV1Controls) -> Result<ControlLayout, Error> {
    match raw {
        ProfileV1Controls::Preset(name) => match name.as_str() {
            "standard" => Ok(ControlLayout::standard()),
            "none" => Ok(ControlLayout::new()),
            other => Err(Error::UnknownPreset(other.to_string())),
        },
        ProfileV1Controls::Layout(layout) => build_layout(layout),
    }
}

fn build_layout(raw: &ProfileV1Layout) -> Result<ControlLayout, Error> {
    let mut layout = ControlLayout::new()
        .with_controls(ControlKind::Button, raw.buttons)
        .with_controls(ControlKind::DPad, raw.dpads)
        .with_controls(ControlKind::Stick, raw.sticks)
        .with_controls(ControlKind::Trigger, raw.triggers);

    for stick in &raw.pressable_sticks {
        if *stick == 0 || *stick > raw.sticks {
            return Err(Error::InvalidId(format!("pressable stick {stick}")));
        }
        layout = layout.with_pressable_stick(*stick);
    }

    if let Some(lrud) = raw.diamond {
        if lrud.iter().any(|button| *button == 0 || *button > raw.buttons) {
            return Err(Error::InvalidControls("the button diamond".to_string()));
        }
        layout = layout.with_diamond(ButtonDiamond { id: 1, lrud });
    }
    Ok(layout)
}

fn parse_mode(
    raw: &ProfileV1Mode,
    layout: &ControlLayout,
    settings: &EngineSettings,
) -> Result<AxisValue, Error> {
    let mut mode = AxisValue::mode(AxisKey::Id(raw.id), raw.name.as_str());

    let controls = raw.controls.as_ref().map(|controls| ControlsDefinition {
        navigation: controls.navigation,
        selection: controls.selection,
    });
    if let Some(controls) = &controls {
        if !controls.is_valid_for(layout) {
            return Err(Error::InvalidControls(format!("mode {}", raw.id)));
        }
    }
    mode.controls = controls.filter(|controls| !controls.is_empty());

    if let Some(grid) = &raw.grid {
        let selection = mode
            .controls
            .and_then(|controls| controls.selection)
            .ok_or_else(|| Error::InvalidControls(format!("grid of mode {}", raw.id)))?;
        let cols = if grid.grid_type == GridType::ActionStrip && grid.cols == 0 {
            settings.action_strip_default_cells
        } else {
            grid.cols
        };
        mode.grid = Some(GridConfig::create(grid.grid_type, cols, &selection, layout));
    }

    let mut any_page = AxisValue::page(AxisKey::Default, "Any page");
    any_page.sub_values = grid_cells(mode.grid.as_ref());
    mode.sub_values.push(any_page);

    let mut page_ids = AHashSet::new();
    for page in &raw.pages {
        if page.id == 0 {
            return Err(Error::InvalidId(format!("page {} of mode {}", page.name, raw.id)));
        }
        if !page_ids.insert(page.id) {
            return Err(Error::DuplicateId(format!("page {} of mode {}", page.id, raw.id)));
        }
        let mut node = AxisValue::page(AxisKey::Id(page.id), page.name.as_str());
        node.sub_values = grid_cells(mode.grid.as_ref());
        mode.sub_values.push(node);
    }
    Ok(mode)
}

#[cfg(test)]
mod tests {
    use keysticks_control::{EventReason, InputControl};

    use super::*;
    use crate::state::StateVector;

    fn parse(yaml: &str) -> Result<Source, Error> {
        let profile: ProfileV1 = serde_yaml::from_str(yaml).expect("yaml");
        profile.to_source()
    }

    fn state(s: &str) -> StateVector {
        s.parse().expect("valid state")
    }

    #[test]
    fn builds_tree_and_actions() {
        let source = parse(
            r#"
version: 1
name: Sample
modes:
  - id: 1
    name: Game
    pages:
      - { id: 2, name: Menu }
  - id: 3
    name: Typing
    controls: { navigation: "two_way dpad1", selection: "non_directional button1" }
    grid: { type: action_strip, cols: 4 }
actions:
  - situation: "1,*,*"
    control: button1
    on:
      pressed: [ { action: type_key, key: "ctrl+c" } ]
      released: [ { action: do_nothing } ]
"#,
        )
        .expect("source");

        assert_eq!(source.name(), "Sample");
        assert!(!source.is_modified());
        assert!(source.tree().has_state(&state("1,2,*")));
        assert!(source.tree().has_state(&state("3,*,4")));
        let set = source
            .store()
            .get(&state("1,*,*"), &InputControl::button(1))
            .expect("set");
        assert_eq!(set.lists().len(), 2);
        assert_eq!(set.lists()[0].reason, EventReason::Pressed);
    }

    #[test]
    fn action_strip_without_size_uses_the_default() {
        let source = parse(
            r#"
version: 1
settings: { action_strip_default_cells: 6 }
modes:
  - id: 1
    name: Strip
    controls: { selection: "non_directional button2" }
    grid: { type: action_strip }
"#,
        )
        .expect("source");
        assert_eq!(
            source.get_grid_bindings(AxisKey::Id(1)).expect("grid").slot_count(),
            6
        );
    }

    #[test]
    fn explicit_layout() {
        let source = parse(
            r#"
version: 1
controls: { buttons: 4, sticks: 1, pressable_sticks: [1], diamond: [3, 2, 4, 1] }
"#,
        )
        .expect("source");
        assert!(source.layout().contains(&InputControl::button(4)));
        assert!(!source.layout().contains(&InputControl::button(5)));
        assert!(source.layout().diamond(1).is_some());
    }

    #[test]
    fn rejects_bad_ids_and_controls() {
        assert!(matches!(
            parse("version: 1\nmodes: [ { id: 0, name: Zero } ]"),
            Err(Error::InvalidId(_))
        ));
        assert!(matches!(
            parse("version: 1\nmodes: [ { id: 1, name: A }, { id: 1, name: B } ]"),
            Err(Error::DuplicateId(_))
        ));
        assert!(matches!(
            parse("version: 1\ncontrols: arcade"),
            Err(Error::UnknownPreset(_))
        ));
        assert!(matches!(
            parse("version: 1\nmodes: [ { id: 1, name: A, grid: { type: keyboard } } ]"),
            Err(Error::InvalidControls(_))
        ));
        assert!(matches!(
            parse("version: 1\nactions: [ { situation: \"4,*,*\", control: button1 } ]"),
            Err(Error::InvalidActions(_))
        ));
    }
}
