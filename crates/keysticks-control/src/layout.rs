use smallvec::SmallVec;

use crate::{
    ControlId, ControlKind, ControlSetting, Direction, DirectionMode, DirectionModes,
    EventReason, GeneralisedControl, InputControl, ReasonSet,
};

/// Four buttons that together act as a four-way control.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ButtonDiamond {
    pub id: ControlId,
    /// Button ids for left, right, up and down.
    pub lrud: [ControlId; 4],
}

const LRUD: [Direction; 4] = [
    Direction::Left,
    Direction::Right,
    Direction::Up,
    Direction::Down,
];

impl ButtonDiamond {
    pub fn direction_of(&self, button: ControlId) -> Option<Direction> {
        self.lrud
            .iter()
            .position(|id| *id == button)
            .map(|index| LRUD[index])
    }

    pub fn button_for(&self, direction: Direction) -> Option<ControlId> {
        LRUD.iter()
            .position(|d| *d == direction)
            .map(|index| self.lrud[index])
    }

    #[inline]
    pub fn contains(&self, button: ControlId) -> bool {
        self.lrud.contains(&button)
    }
}

fn press_reasons() -> ReasonSet {
    ReasonSet::new(&[
        EventReason::Pressed,
        EventReason::PressedShort,
        EventReason::PressedLong,
        EventReason::PressRepeated,
        EventReason::Released,
    ])
}

/// The virtual controls a source offers.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ControlLayout {
    controls: Vec<InputControl>,
    pressable_sticks: SmallVec<[ControlId; 2]>,
    diamonds: SmallVec<[ButtonDiamond; 1]>,
}

impl ControlLayout {
    pub fn new() -> Self {
        Self::default()
    }

    /// A typical gamepad: ten buttons (1-4 being A, B, X, Y), the ABXY
    /// diamond, one D-pad, two clickable sticks and two triggers.
    pub fn standard() -> Self {
        Self::new()
            .with_controls(ControlKind::Button, 10)
            .with_diamond(ButtonDiamond {
                id: 1,
                lrud: [3, 2, 4, 1],
            })
            .with_controls(ControlKind::DPad, 1)
            .with_pressable_stick(1)
            .with_pressable_stick(2)
            .with_controls(ControlKind::Trigger, 2)
    }

    #[must_use]
    pub fn with_control(mut self, kind: ControlKind, id: ControlId) -> Self {
        let control = InputControl::new(kind, id);
        if !self.controls.contains(&control) {
            self.controls.push(control);
        }
        self
    }

    /// Adds controls `1..=count` of the given kind.
    #[must_use]
    pub fn with_controls(self, kind: ControlKind, count: ControlId) -> Self {
        (1..=count).fold(self, |layout, id| layout.with_control(kind, id))
    }

    #[must_use]
    pub fn with_pressable_stick(mut self, id: ControlId) -> Self {
        if !self.pressable_sticks.contains(&id) {
            self.pressable_sticks.push(id);
        }
        self.with_control(ControlKind::Stick, id)
    }

    #[must_use]
    pub fn with_diamond(mut self, diamond: ButtonDiamond) -> Self {
        self.diamonds.retain(|d| d.id != diamond.id);
        self.diamonds.push(diamond);
        self.with_control(ControlKind::ButtonDiamond, diamond.id)
    }

    /// Controls in declaration order, without direction or setting.
    #[inline]
    pub fn controls(&self) -> &[InputControl] {
        &self.controls
    }

    pub fn contains(&self, control: &InputControl) -> bool {
        self.controls
            .iter()
            .any(|c| c.kind == control.kind && c.id == control.id)
    }

    pub fn diamond(&self, id: ControlId) -> Option<&ButtonDiamond> {
        self.diamonds.iter().find(|d| d.id == id)
    }

    pub fn diamond_containing(&self, button: ControlId) -> Option<&ButtonDiamond> {
        self.diamonds.iter().find(|d| d.contains(button))
    }

    pub fn is_pressable(&self, control: &InputControl) -> bool {
        match control.kind {
            ControlKind::Button | ControlKind::Trigger => true,
            ControlKind::Stick => self.pressable_sticks.contains(&control.id),
            ControlKind::DPad | ControlKind::ButtonDiamond => false,
        }
    }

    /// Event reasons a control address can raise. Setting addresses only
    /// ever raise `Activated`; the diamond raises nothing itself, its
    /// buttons do.
    pub fn supported_reasons(&self, control: &InputControl) -> ReasonSet {
        if control.kind == ControlKind::ButtonDiamond {
            return ReasonSet::empty();
        }
        if control.is_setting() {
            return ReasonSet::new(&[EventReason::Activated]);
        }

        let directed = ReasonSet::new(&[EventReason::Directed, EventReason::Undirected]);
        let held = ReasonSet::new(&[
            EventReason::DirectedShort,
            EventReason::DirectedLong,
            EventReason::DirectionRepeated,
        ]);
        let centre = control.direction.is_centre();

        match control.kind {
            ControlKind::Button | ControlKind::Trigger => press_reasons(),
            ControlKind::DPad => {
                if centre {
                    directed
                } else {
                    directed.union(&held)
                }
            }
            ControlKind::Stick => {
                let mut reasons = directed;
                if centre {
                    reasons.insert(EventReason::Moved);
                    if self.is_pressable(control) {
                        reasons = reasons.union(&press_reasons());
                    }
                } else {
                    reasons = reasons.union(&held);
                }
                reasons
            }
            ControlKind::ButtonDiamond => ReasonSet::empty(),
        }
    }

    #[inline]
    pub fn is_reason_supported(&self, control: &InputControl, reason: EventReason) -> bool {
        self.supported_reasons(control).contains(reason)
    }

    /// Direction modes a control can be configured with.
    pub fn supported_direction_modes(&self, control: &InputControl) -> DirectionModes {
        let discrete = [
            DirectionMode::NonDirectional,
            DirectionMode::AxisStyle,
            DirectionMode::TwoWay,
            DirectionMode::FourWay,
            DirectionMode::EightWay,
        ];
        match control.kind {
            ControlKind::Button => {
                let mut modes = DirectionModes::new(&[DirectionMode::NonDirectional]);
                if self.diamond_containing(control.id).is_some() {
                    modes.insert(DirectionMode::FourWay);
                }
                modes
            }
            ControlKind::ButtonDiamond => DirectionModes::new(&[DirectionMode::FourWay]),
            ControlKind::DPad => DirectionModes::new(&discrete),
            ControlKind::Stick => {
                DirectionModes::new(&discrete).with(DirectionMode::Continuous)
            }
            ControlKind::Trigger => DirectionModes::new(&[DirectionMode::NonDirectional]),
        }
    }

    /// Whether `control` is one of the addresses covered by `general`.
    pub fn is_general_type_of(&self, control: &InputControl, general: &GeneralisedControl) -> bool {
        let reference = &general.reference;
        let same = control.general_id() == reference.general_id();
        match general.mode {
            DirectionMode::NonDirectional => same && control.direction == reference.direction,
            DirectionMode::TwoWay => {
                same && matches!(
                    control.direction,
                    Direction::None | Direction::Left | Direction::Right
                )
            }
            DirectionMode::FourWay => match reference.kind {
                ControlKind::ButtonDiamond => match control.kind {
                    ControlKind::ButtonDiamond => same,
                    ControlKind::Button => self
                        .diamond(reference.id)
                        .is_some_and(|d| d.contains(control.id)),
                    _ => false,
                },
                ControlKind::Stick | ControlKind::DPad => {
                    same && matches!(
                        control.direction,
                        Direction::None
                            | Direction::Left
                            | Direction::Right
                            | Direction::Up
                            | Direction::Down
                    )
                }
                ControlKind::Button | ControlKind::Trigger => false,
            },
            DirectionMode::EightWay | DirectionMode::AxisStyle | DirectionMode::Continuous => same,
        }
    }

    pub fn do_controls_overlap(&self, first: &GeneralisedControl, second: &GeneralisedControl) -> bool {
        self.is_general_type_of(&first.reference, second)
            || self.is_general_type_of(&second.reference, first)
    }

    /// Direction `control` stands for when viewed as part of `general`.
    pub fn input_control_direction(
        &self,
        control: &InputControl,
        general: &GeneralisedControl,
    ) -> Direction {
        if control.is_setting() || general.mode == DirectionMode::NonDirectional {
            return Direction::None;
        }
        match control.kind {
            ControlKind::Button if general.reference.kind == ControlKind::ButtonDiamond => self
                .diamond(general.reference.id)
                .and_then(|d| d.direction_of(control.id))
                .unwrap_or(Direction::None),
            ControlKind::DPad | ControlKind::Stick => control.direction,
            _ => Direction::None,
        }
    }

    /// The concrete address that plays `general`'s role for `direction`,
    /// e.g. four-way ABXY + left -> the X button.
    pub fn specific_input_control(
        &self,
        general: &GeneralisedControl,
        setting: ControlSetting,
        direction: Direction,
    ) -> Option<InputControl> {
        let reference = general.reference;
        let specific = match reference.kind {
            ControlKind::Trigger => {
                (general.mode == DirectionMode::NonDirectional).then_some(reference)?
            }
            ControlKind::Button | ControlKind::ButtonDiamond => match general.mode {
                DirectionMode::NonDirectional => reference,
                DirectionMode::FourWay => {
                    if setting == ControlSetting::DirectionMode {
                        return None;
                    }
                    let diamond = if reference.kind == ControlKind::ButtonDiamond {
                        self.diamond(reference.id)
                    } else {
                        self.diamond_containing(reference.id)
                    }?;
                    InputControl::button(diamond.button_for(direction)?)
                }
                _ => return None,
            },
            ControlKind::DPad | ControlKind::Stick => {
                if !setting.is_none() {
                    reference.with_direction(Direction::None)
                } else if general.mode != DirectionMode::NonDirectional
                    && !direction.is_none()
                {
                    reference.with_direction(direction)
                } else {
                    reference
                }
            }
        };

        Some(specific.with_setting(setting))
    }

    /// Generalised controls of this layout that can play a role with the
    /// given direction mode, skipping any that overlap `avoid`.
    pub fn controls_with_direction_mode(
        &self,
        mode: DirectionMode,
        avoid: Option<&GeneralisedControl>,
    ) -> Vec<GeneralisedControl> {
        let mut candidates = Vec::new();
        for control in &self.controls {
            match mode {
                DirectionMode::Continuous => {
                    if control.kind == ControlKind::Stick {
                        candidates.push(*control);
                    }
                }
                DirectionMode::EightWay
                | DirectionMode::AxisStyle
                | DirectionMode::FourWay
                | DirectionMode::TwoWay => {
                    if control.kind.is_directional()
                        || (mode == DirectionMode::FourWay
                            && control.kind == ControlKind::ButtonDiamond)
                    {
                        candidates.push(*control);
                    }
                }
                DirectionMode::NonDirectional => match control.kind {
                    ControlKind::Button | ControlKind::Trigger => candidates.push(*control),
                    ControlKind::Stick | ControlKind::DPad => {
                        for direction in Direction::LRUDC {
                            if control.kind == ControlKind::DPad && direction.is_centre() {
                                continue;
                            }
                            candidates.push(control.with_direction(direction));
                        }
                    }
                    ControlKind::ButtonDiamond => {}
                },
            }
        }

        candidates
            .into_iter()
            .map(|reference| GeneralisedControl::new(mode, reference))
            .filter(|general| avoid.map_or(true, |avoid| !self.do_controls_overlap(general, avoid)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn four_way_abxy() -> GeneralisedControl {
        GeneralisedControl::new(DirectionMode::FourWay, InputControl::diamond(1))
    }

    // -------- reasons

    #[test]
    fn buttons_support_press_reasons_only() {
        let layout = ControlLayout::standard();
        let reasons = layout.supported_reasons(&InputControl::button(1));
        assert!(reasons.contains(EventReason::Pressed));
        assert!(reasons.contains(EventReason::Released));
        assert!(!reasons.contains(EventReason::Directed));
        assert!(!reasons.contains(EventReason::Activated));
    }

    #[test]
    fn settings_only_support_activated() {
        let layout = ControlLayout::standard();
        let setting = InputControl::stick(1, Direction::None)
            .with_setting(ControlSetting::DirectionMode);
        assert_eq!(
            layout.supported_reasons(&setting),
            ReasonSet::new(&[EventReason::Activated])
        );
    }

    #[test]
    fn stick_centre_supports_moved_and_presses_when_pressable() {
        let layout = ControlLayout::new()
            .with_pressable_stick(1)
            .with_control(ControlKind::Stick, 2);
        let pressable = layout.supported_reasons(&InputControl::stick(1, Direction::Centre));
        let fixed = layout.supported_reasons(&InputControl::stick(2, Direction::Centre));
        assert!(pressable.contains(EventReason::Moved));
        assert!(pressable.contains(EventReason::Pressed));
        assert!(fixed.contains(EventReason::Moved));
        assert!(!fixed.contains(EventReason::Pressed));
    }

    #[test]
    fn held_direction_reasons_exclude_centre() {
        let layout = ControlLayout::standard();
        assert!(layout.is_reason_supported(
            &InputControl::dpad(1, Direction::Up),
            EventReason::DirectionRepeated
        ));
        assert!(!layout.is_reason_supported(
            &InputControl::dpad(1, Direction::Centre),
            EventReason::DirectedLong
        ));
        assert!(layout.is_reason_supported(
            &InputControl::dpad(1, Direction::Centre),
            EventReason::Directed
        ));
    }

    // -------- direction modes

    #[test]
    fn diamond_buttons_also_support_four_way() {
        let layout = ControlLayout::standard();
        let a = layout.supported_direction_modes(&InputControl::button(1));
        let back = layout.supported_direction_modes(&InputControl::button(7));
        assert!(a.contains(DirectionMode::FourWay));
        assert!(!back.contains(DirectionMode::FourWay));
    }

    #[test]
    fn only_sticks_support_continuous() {
        let layout = ControlLayout::standard();
        assert!(layout
            .supported_direction_modes(&InputControl::stick(1, Direction::None))
            .contains(DirectionMode::Continuous));
        assert!(!layout
            .supported_direction_modes(&InputControl::dpad(1, Direction::None))
            .contains(DirectionMode::Continuous));
    }

    // -------- generalised controls

    #[test]
    fn diamond_buttons_are_general_type_of_four_way_abxy() {
        let layout = ControlLayout::standard();
        assert!(layout.is_general_type_of(&InputControl::button(3), &four_way_abxy()));
        assert!(!layout.is_general_type_of(&InputControl::button(5), &four_way_abxy()));
    }

    #[test]
    fn four_way_stick_excludes_diagonals() {
        let layout = ControlLayout::standard();
        let general = GeneralisedControl::new(
            DirectionMode::FourWay,
            InputControl::stick(1, Direction::None),
        );
        assert!(layout.is_general_type_of(&InputControl::stick(1, Direction::Up), &general));
        assert!(!layout.is_general_type_of(&InputControl::stick(1, Direction::UpLeft), &general));
        assert!(!layout.is_general_type_of(&InputControl::stick(2, Direction::Up), &general));
    }

    #[test]
    fn diamond_maps_directions_to_buttons() {
        let layout = ControlLayout::standard();
        let general = four_way_abxy();
        let left = layout
            .specific_input_control(&general, ControlSetting::None, Direction::Left)
            .expect("left button");
        assert_eq!(left, InputControl::button(3));
        assert_eq!(
            layout.input_control_direction(&left, &general),
            Direction::Left
        );
        assert_eq!(
            layout.specific_input_control(&general, ControlSetting::DirectionMode, Direction::Left),
            None
        );
    }

    #[test]
    fn specific_stick_control_takes_direction_unless_setting() {
        let layout = ControlLayout::standard();
        let general = GeneralisedControl::new(
            DirectionMode::EightWay,
            InputControl::stick(2, Direction::None),
        );
        assert_eq!(
            layout.specific_input_control(&general, ControlSetting::None, Direction::DownLeft),
            Some(InputControl::stick(2, Direction::DownLeft))
        );
        assert_eq!(
            layout.specific_input_control(&general, ControlSetting::DirectionMode, Direction::Left),
            Some(InputControl::stick(2, Direction::None).with_setting(ControlSetting::DirectionMode))
        );
    }

    #[test]
    fn triggers_only_have_a_non_directional_role() {
        let layout = ControlLayout::standard();
        let four = GeneralisedControl::new(DirectionMode::FourWay, InputControl::trigger(1));
        let plain = GeneralisedControl::new(DirectionMode::NonDirectional, InputControl::trigger(1));
        assert_eq!(
            layout.specific_input_control(&four, ControlSetting::None, Direction::Up),
            None
        );
        assert_eq!(
            layout.specific_input_control(&plain, ControlSetting::None, Direction::None),
            Some(InputControl::trigger(1))
        );
    }

    #[test]
    fn four_way_candidates_skip_the_avoided_control() {
        let layout = ControlLayout::standard();
        let dpad = GeneralisedControl::new(
            DirectionMode::FourWay,
            InputControl::dpad(1, Direction::None),
        );
        let candidates = layout.controls_with_direction_mode(DirectionMode::FourWay, Some(&dpad));
        assert!(candidates.iter().all(|c| c.reference.kind != ControlKind::DPad));
        assert!(candidates.contains(&four_way_abxy()));
        assert_eq!(
            candidates
                .iter()
                .filter(|c| c.reference.kind == ControlKind::Stick)
                .count(),
            2
        );
    }

    #[test]
    fn non_directional_candidates_expand_dpad_without_centre() {
        let layout = ControlLayout::new().with_controls(ControlKind::DPad, 1);
        let candidates = layout.controls_with_direction_mode(DirectionMode::NonDirectional, None);
        assert_eq!(candidates.len(), 4);
        assert!(candidates.iter().all(|c| !c.reference.direction.is_centre()));
    }
}
