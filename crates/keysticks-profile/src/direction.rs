//! How controls interpret their directions in a situation, which actions
//! they may carry and whether a set can move from one control to another.

use keysticks_control::{
    ControlKind, ControlLayout, ControlSetting, Direction, DirectionMode, DirectionShape,
    EventReason, GeneralisedControl, InputControl,
};

use crate::action::{Action, ActionList, ActionSet, ActionType};
use crate::error::EditError;
use crate::settings::EngineSettings;
use crate::state::StateVector;
use crate::store::ActionStore;
use crate::tree::SituationTree;

/// How a set is moved onto its new control.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Conversion {
    control: InputControl,
    swap_reasons: bool,
}

/// Read-only view answering directionality questions against one source.
#[derive(Debug, Clone, Copy)]
pub struct DirectionalityResolver<'a> {
    layout: &'a ControlLayout,
    tree: &'a SituationTree,
    store: &'a ActionStore,
    settings: &'a EngineSettings,
}

impl<'a> DirectionalityResolver<'a> {
    pub fn new(
        layout: &'a ControlLayout,
        tree: &'a SituationTree,
        store: &'a ActionStore,
        settings: &'a EngineSettings,
    ) -> Self {
        Self {
            layout,
            tree,
            store,
            settings,
        }
    }

    /// The direction mode `control` is in at `situation`.
    ///
    /// Sticks and D-pads use the `SetDirectionMode` action bound to their
    /// direction mode setting, inherited like any other binding, and fall
    /// back to the configured default. The button diamond is always
    /// four-way; buttons and triggers are non-directional.
    pub fn active_direction_mode(
        &self,
        situation: &StateVector,
        control: &InputControl,
    ) -> DirectionMode {
        match control.kind {
            ControlKind::ButtonDiamond => DirectionMode::FourWay,
            ControlKind::Button | ControlKind::Trigger => DirectionMode::NonDirectional,
            ControlKind::Stick | ControlKind::DPad => {
                let supported = self.layout.supported_direction_modes(control);
                let setting = control.general().setting_control(ControlSetting::DirectionMode);
                self.store
                    .get_actions_for_input_control(situation, &setting, true)
                    .and_then(|set| set.actions(EventReason::Activated))
                    .and_then(|list| {
                        list.iter().find_map(|action| match action {
                            Action::SetDirectionMode { mode } => Some(*mode),
                            _ => None,
                        })
                    })
                    .filter(|mode| supported.contains(*mode))
                    .unwrap_or(self.default_direction_mode(control))
            }
        }
    }

    fn default_direction_mode(&self, control: &InputControl) -> DirectionMode {
        let mode = self.settings.default_direction_mode;
        if self.layout.supported_direction_modes(control).contains(mode) {
            mode
        } else {
            DirectionMode::EightWay
        }
    }

    /// Whether an action of `action_type` may be bound to `reason` of
    /// `control` at `situation`.
    pub fn is_action_type_valid(
        &self,
        situation: &StateVector,
        control: &InputControl,
        reason: EventReason,
        action_type: ActionType,
    ) -> bool {
        match control.setting {
            ControlSetting::DirectionMode => {
                return reason == EventReason::Activated
                    && action_type == ActionType::SetDirectionMode;
            }
            ControlSetting::DwellAndRepeat => {
                return reason == EventReason::Activated
                    && action_type == ActionType::SetDwellAndAutorepeat;
            }
            ControlSetting::None => {}
        }

        let directed_away = !matches!(control.direction, Direction::Centre);
        let held = matches!(
            reason,
            EventReason::DirectionRepeated | EventReason::DirectedLong | EventReason::DirectedShort
        );

        match action_type {
            ActionType::ControlThePointer => reason == EventReason::Moved,
            ActionType::SetDirectionMode | ActionType::SetDwellAndAutorepeat => false,
            ActionType::DoNothing => true,
            ActionType::NavigateCells | ActionType::WordPrediction => {
                if self.tree.grid(situation.mode).is_none() {
                    false
                } else if reason == EventReason::Moved {
                    false
                } else if held {
                    directed_away
                } else {
                    true
                }
            }
            ActionType::ReleaseKey
            | ActionType::ReleaseMouseButton
            | ActionType::MoveThePointer
            | ActionType::ChangeSituation
            | ActionType::ToggleControlsWindow
            | ActionType::ToggleKey
            | ActionType::ToggleMouseButton => match reason {
                EventReason::Moved => false,
                _ if held => directed_away,
                _ => true,
            },
            ActionType::TypeKey
            | ActionType::PressDownKey
            | ActionType::TypeText
            | ActionType::ClickMouseButton
            | ActionType::DoubleClickMouseButton
            | ActionType::PressDownMouseButton
            | ActionType::MouseWheelUp
            | ActionType::MouseWheelDown
            | ActionType::Wait => match reason {
                EventReason::Moved => false,
                EventReason::Directed => directed_away,
                _ if held => directed_away,
                _ => true,
            },
            ActionType::LoadProfile
            | ActionType::StartProgram
            | ActionType::ActivateWindow
            | ActionType::MaximiseWindow
            | ActionType::MinimiseWindow => match reason {
                EventReason::Moved
                | EventReason::DirectionRepeated
                | EventReason::PressRepeated => false,
                EventReason::Directed | EventReason::DirectedLong | EventReason::DirectedShort => {
                    directed_away
                }
                _ => true,
            },
        }
    }

    /// Whether `set`, authored for one of the addresses of `from`, can be
    /// moved onto the matching address of `to` at `to_situation`.
    ///
    /// Continuous controls only exchange sets with continuous ones. The
    /// target address must raise every reason of the set and accept every
    /// action, either as-is or with all reasons swapped for their
    /// alternatives (pressed for directed and so on).
    pub fn can_convert_action_set(
        &self,
        set: &ActionSet,
        from: &GeneralisedControl,
        to_situation: &StateVector,
        to: &GeneralisedControl,
    ) -> bool {
        self.plan(set, from, to_situation, to).is_ok()
    }

    /// Moves `set` onto the address of `to` matching its position in
    /// `from`. The set is left untouched on error.
    pub fn convert_action_set(
        &self,
        set: &mut ActionSet,
        from: &GeneralisedControl,
        to_situation: &StateVector,
        to: &GeneralisedControl,
    ) -> Result<(), EditError> {
        let conversion = self.plan(set, from, to_situation, to)?;
        if conversion.swap_reasons {
            set.swap_reasons();
        }
        if conversion.control != *set.control() {
            log::debug!("converted {} to {}", set.control(), conversion.control);
        }
        set.set_control(conversion.control);
        Ok(())
    }

    /// Shape of a control playing a role declared with `mode`. A stick
    /// switched to continuous at `situation` counts as continuous whatever
    /// the declared mode.
    fn resolved_shape(
        &self,
        mode: DirectionMode,
        situation: &StateVector,
        control: &InputControl,
    ) -> DirectionShape {
        if !control.is_setting() && self.active_direction_mode(situation, control).is_continuous() {
            DirectionShape::Continuous
        } else {
            mode.shape()
        }
    }

    fn plan(
        &self,
        set: &ActionSet,
        from: &GeneralisedControl,
        to_situation: &StateVector,
        to: &GeneralisedControl,
    ) -> Result<Conversion, EditError> {
        let control = *set.control();
        let incompatible = |target: InputControl| EditError::IncompatibleConversion { control, target };

        if !self.layout.is_general_type_of(&control, from) {
            return Err(incompatible(to.reference));
        }

        let direction = self.layout.input_control_direction(&control, from);
        let target = self
            .layout
            .specific_input_control(to, control.setting, direction)
            .filter(|target| self.layout.contains(target))
            .ok_or_else(|| incompatible(to.reference))?;

        let from_shape = self.resolved_shape(from.mode, set.logical_state(), &control);
        let to_shape = self.resolved_shape(to.mode, to_situation, &target);
        if !from_shape.is_compatible_with(to_shape) {
            return Err(incompatible(target));
        }

        let accepts = |reason: EventReason, list: &ActionList| {
            self.layout.is_reason_supported(&target, reason)
                && list
                    .iter()
                    .all(|action| self.is_action_type_valid(to_situation, &target, reason, action.action_type()))
        };

        if set.lists().iter().all(|list| accepts(list.reason, list)) {
            return Ok(Conversion {
                control: target,
                swap_reasons: false,
            });
        }

        let swapped = set.lists().iter().all(|list| {
            list.reason
                .alternative()
                .is_some_and(|alternative| accepts(alternative, list))
        });
        if swapped {
            Ok(Conversion {
                control: target,
                swap_reasons: true,
            })
        } else {
            Err(incompatible(target))
        }
    }
}

#[cfg(test)]
mod tests {
    use keysticks_control::ControlKind;

    use super::*;
    use crate::tree::tests::sample_tree;

    fn state(s: &str) -> StateVector {
        s.parse().expect("valid state")
    }

    fn key(combo: &str) -> Action {
        Action::TypeKey {
            key: combo.parse().expect("combo"),
        }
    }

    fn general(mode: DirectionMode, reference: InputControl) -> GeneralisedControl {
        GeneralisedControl::new(mode, reference)
    }

    struct Fixture {
        layout: ControlLayout,
        tree: SituationTree,
        store: ActionStore,
        settings: EngineSettings,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                layout: ControlLayout::standard(),
                tree: sample_tree(),
                store: ActionStore::new(),
                settings: EngineSettings::default(),
            }
        }

        fn resolver(&self) -> DirectionalityResolver<'_> {
            DirectionalityResolver::new(&self.layout, &self.tree, &self.store, &self.settings)
        }
    }

    #[test]
    fn direction_mode_defaults_by_kind() {
        let fixture = Fixture::new();
        let resolver = fixture.resolver();
        let root = StateVector::root();
        assert_eq!(
            resolver.active_direction_mode(&root, &InputControl::diamond(1)),
            DirectionMode::FourWay
        );
        assert_eq!(
            resolver.active_direction_mode(&root, &InputControl::button(1)),
            DirectionMode::NonDirectional
        );
        assert_eq!(
            resolver.active_direction_mode(&root, &InputControl::stick(1, Direction::Left)),
            DirectionMode::EightWay
        );
    }

    #[test]
    fn direction_mode_setting_is_inherited() {
        let mut fixture = Fixture::new();
        let setting = InputControl::new(ControlKind::Stick, 1).setting_control(ControlSetting::DirectionMode);
        let mut set = ActionSet::new(state("1,*,*"), setting);
        set.push(
            EventReason::Activated,
            Action::SetDirectionMode {
                mode: DirectionMode::Continuous,
            },
        );
        fixture.store.add_action_set(set);

        let resolver = fixture.resolver();
        let stick = InputControl::stick(1, Direction::Centre);
        assert_eq!(
            resolver.active_direction_mode(&state("1,2,*"), &stick),
            DirectionMode::Continuous
        );
        assert_eq!(
            resolver.active_direction_mode(&state("3,*,*"), &stick),
            DirectionMode::EightWay
        );
    }

    #[test]
    fn unsupported_direction_mode_falls_back_to_default() {
        let mut fixture = Fixture::new();
        let setting = InputControl::new(ControlKind::DPad, 1).setting_control(ControlSetting::DirectionMode);
        let mut set = ActionSet::new(StateVector::root(), setting);
        set.push(
            EventReason::Activated,
            Action::SetDirectionMode {
                mode: DirectionMode::Continuous,
            },
        );
        fixture.store.add_action_set(set);
        assert_eq!(
            fixture
                .resolver()
                .active_direction_mode(&StateVector::root(), &InputControl::dpad(1, Direction::Up)),
            DirectionMode::EightWay
        );
    }

    #[test]
    fn settings_controls_only_take_their_setting_action() {
        let fixture = Fixture::new();
        let resolver = fixture.resolver();
        let root = StateVector::root();
        let setting = InputControl::stick(1, Direction::None).setting_control(ControlSetting::DirectionMode);
        assert!(resolver.is_action_type_valid(&root, &setting, EventReason::Activated, ActionType::SetDirectionMode));
        assert!(!resolver.is_action_type_valid(&root, &setting, EventReason::Activated, ActionType::TypeKey));
        assert!(!resolver.is_action_type_valid(
            &root,
            &InputControl::button(1),
            EventReason::Pressed,
            ActionType::SetDirectionMode
        ));
    }

    #[test]
    fn pointer_and_typing_rules() {
        let fixture = Fixture::new();
        let resolver = fixture.resolver();
        let root = StateVector::root();
        let centre = InputControl::stick(1, Direction::Centre);
        let left = InputControl::stick(1, Direction::Left);

        assert!(resolver.is_action_type_valid(&root, &centre, EventReason::Moved, ActionType::ControlThePointer));
        assert!(!resolver.is_action_type_valid(&root, &left, EventReason::Directed, ActionType::ControlThePointer));
        assert!(!resolver.is_action_type_valid(&root, &centre, EventReason::Moved, ActionType::TypeKey));
        assert!(!resolver.is_action_type_valid(&root, &centre, EventReason::Directed, ActionType::TypeKey));
        assert!(resolver.is_action_type_valid(&root, &left, EventReason::Directed, ActionType::TypeKey));
        assert!(resolver.is_action_type_valid(&root, &centre, EventReason::Pressed, ActionType::TypeKey));
        assert!(!resolver.is_action_type_valid(&root, &left, EventReason::DirectionRepeated, ActionType::StartProgram));
        assert!(resolver.is_action_type_valid(&root, &left, EventReason::DirectionRepeated, ActionType::ChangeSituation));
    }

    #[test]
    fn grid_actions_need_a_grid_mode() {
        let fixture = Fixture::new();
        let resolver = fixture.resolver();
        let up = InputControl::dpad(1, Direction::Up);
        assert!(!resolver.is_action_type_valid(&state("1,*,*"), &up, EventReason::Directed, ActionType::NavigateCells));
        assert!(resolver.is_action_type_valid(&state("3,*,*"), &up, EventReason::Directed, ActionType::NavigateCells));
        assert!(resolver.is_action_type_valid(
            &state("3,*,*"),
            &up,
            EventReason::DirectionRepeated,
            ActionType::NavigateCells
        ));
    }

    #[test]
    fn button_set_converts_onto_diamond_position_with_swapped_reasons() {
        let fixture = Fixture::new();
        let resolver = fixture.resolver();
        let mut set = ActionSet::new(StateVector::root(), InputControl::dpad(1, Direction::Left));
        set.push(EventReason::Directed, key("a"));
        set.push(EventReason::Undirected, key("b"));

        let from = general(DirectionMode::FourWay, InputControl::dpad(1, Direction::None));
        let to = general(DirectionMode::FourWay, InputControl::diamond(1));
        assert!(resolver.can_convert_action_set(&set, &from, &StateVector::root(), &to));

        resolver
            .convert_action_set(&mut set, &from, &StateVector::root(), &to)
            .expect("convertible");
        assert_eq!(*set.control(), InputControl::button(3));
        assert!(set.actions(EventReason::Pressed).is_some());
        assert!(set.actions(EventReason::Released).is_some());
    }

    #[test]
    fn matching_shapes_convert_without_swapping() {
        let fixture = Fixture::new();
        let resolver = fixture.resolver();
        let mut set = ActionSet::new(StateVector::root(), InputControl::dpad(1, Direction::Up));
        set.push(EventReason::DirectedLong, key("a"));

        let from = general(DirectionMode::FourWay, InputControl::dpad(1, Direction::None));
        let to = general(DirectionMode::FourWay, InputControl::stick(2, Direction::None));
        resolver
            .convert_action_set(&mut set, &from, &StateVector::root(), &to)
            .expect("convertible");
        assert_eq!(*set.control(), InputControl::stick(2, Direction::Up));
        assert!(set.actions(EventReason::DirectedLong).is_some());
    }

    #[test]
    fn continuous_and_discrete_never_convert_either_way() {
        let fixture = Fixture::new();
        let resolver = fixture.resolver();
        let root = StateVector::root();
        let continuous = general(DirectionMode::Continuous, InputControl::stick(1, Direction::None));
        let discrete = general(DirectionMode::EightWay, InputControl::stick(2, Direction::None));

        let mut centre = ActionSet::new(root, InputControl::stick(1, Direction::Centre));
        centre.push(EventReason::Directed, Action::DoNothing);
        let mut other = ActionSet::new(root, InputControl::stick(2, Direction::Centre));
        other.push(EventReason::Directed, Action::DoNothing);

        assert!(!resolver.can_convert_action_set(&centre, &continuous, &root, &discrete));
        assert!(!resolver.can_convert_action_set(&other, &discrete, &root, &continuous));

        let original = centre.clone();
        let err = resolver
            .convert_action_set(&mut centre, &continuous, &root, &discrete)
            .expect_err("incompatible");
        assert!(matches!(err, EditError::IncompatibleConversion { .. }));
        assert_eq!(centre, original);
    }

    #[test]
    fn invalid_action_blocks_conversion() {
        let fixture = Fixture::new();
        let resolver = fixture.resolver();
        let root = StateVector::root();
        let mut set = ActionSet::new(root, InputControl::button(1));
        set.push(EventReason::PressRepeated, Action::StartProgram {
            program: "calc".into(),
            args: String::new(),
        });
        let from = general(DirectionMode::NonDirectional, InputControl::button(1));
        let to = general(DirectionMode::NonDirectional, InputControl::stick(1, Direction::Up));
        assert!(!resolver.can_convert_action_set(&set, &from, &root, &to));
    }
}
