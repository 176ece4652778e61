//! Grid layouts of a mode: which cells a page has and which UI slots
//! address which cell through which control.

use std::fmt;
use std::str::FromStr;

use keysticks_control::{
    is_direction_valid, ControlLayout, ControlSetting, Direction, DirectionMode,
    GeneralisedControl, InputControl, Key, KEYBOARD,
};
use serde::Deserialize;

use crate::state::{AxisKey, RelativeState};

/// Cell ids of the square grids, row by row from the top left.
pub const SQUARE_CELL_IDS: [u32; 9] = [100, 101, 102, 103, 104, 105, 106, 107, 108];

pub const CENTRE_CELL_ID: u32 = 104;

const SQUARE_CELL_NAMES: [&str; 9] = [
    "Top left",
    "Top",
    "Top right",
    "Left",
    "Centre",
    "Right",
    "Bottom left",
    "Bottom",
    "Bottom right",
];

/// Cell id of a key on the keyboard grid.
pub fn keyboard_cell_id(key: Key) -> Option<u32> {
    KEYBOARD
        .iter()
        .position(|k| *k == key)
        .and_then(|index| u32::try_from(index + 1).ok())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GridType {
    Keyboard,
    ActionStrip,
    #[serde(rename = "square_4x4")]
    Square4x4,
    #[serde(rename = "square_8x4")]
    Square8x4,
}

impl GridType {
    pub const fn name(self) -> &'static str {
        match self {
            GridType::Keyboard => "keyboard",
            GridType::ActionStrip => "action_strip",
            GridType::Square4x4 => "square_4x4",
            GridType::Square8x4 => "square_8x4",
        }
    }

    /// Direction modes used to lay out the square grids: the first picks
    /// which cells exist, the second which bindings each cell gets.
    const fn square_modes(self) -> (DirectionMode, DirectionMode) {
        match self {
            GridType::Square4x4 => (DirectionMode::FourWay, DirectionMode::FourWay),
            GridType::Square8x4 => (DirectionMode::EightWay, DirectionMode::FourWay),
            GridType::Keyboard | GridType::ActionStrip => {
                (DirectionMode::EightWay, DirectionMode::EightWay)
            }
        }
    }

    /// Concrete cells of a page laid out with this grid, in display order.
    pub fn cells(self, cols: u32) -> Vec<(u32, String)> {
        match self {
            GridType::Keyboard => KEYBOARD
                .iter()
                .zip(1u32..)
                .map(|(key, id)| (id, format!("{key} key")))
                .collect(),
            GridType::ActionStrip => (1..=cols).map(|id| (id, format!("Cell {id}"))).collect(),
            GridType::Square4x4 | GridType::Square8x4 => {
                let (cells_mode, _) = self.square_modes();
                Direction::SQUARE
                    .iter()
                    .zip(SQUARE_CELL_IDS)
                    .zip(SQUARE_CELL_NAMES)
                    .filter(|((direction, _), _)| is_direction_valid(**direction, cells_mode))
                    .map(|((_, id), name)| (id, format!("{name} cell")))
                    .collect()
            }
        }
    }

    /// Cell a situation lands on when only the mode and page are known.
    pub fn default_cell(self) -> u32 {
        match self {
            GridType::Keyboard => keyboard_cell_id(Key::Char('a')).unwrap_or(1),
            GridType::ActionStrip => 1,
            GridType::Square4x4 | GridType::Square8x4 => CENTRE_CELL_ID,
        }
    }

    /// Names of the UI slots of this grid, indexed by slot number.
    pub fn slot_names(self, cols: u32) -> Vec<String> {
        match self {
            GridType::Keyboard => KEYBOARD.iter().map(ToString::to_string).collect(),
            GridType::ActionStrip => (0..cols).map(|i| format!("A{i}")).collect(),
            GridType::Square4x4 | GridType::Square8x4 => {
                let mut names = Vec::with_capacity(81);
                for i in 0..9 {
                    for j in 0..9 {
                        names.push(square_slot_name(i, j));
                    }
                }
                names
            }
        }
    }
}

fn square_slot_name(cell: usize, position: usize) -> String {
    format!("A{}{}{}{}", cell / 3, cell % 3, position / 3, position % 3)
}

impl fmt::Display for GridType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for GridType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "keyboard" => Ok(GridType::Keyboard),
            "action_strip" => Ok(GridType::ActionStrip),
            "square_4x4" => Ok(GridType::Square4x4),
            "square_8x4" => Ok(GridType::Square8x4),
            other => Err(format!("unknown grid type: {other}")),
        }
    }
}

/// The controls that navigate between and select within the cells of a
/// mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ControlsDefinition {
    pub navigation: Option<GeneralisedControl>,
    pub selection: Option<GeneralisedControl>,
}

impl ControlsDefinition {
    pub const fn new(navigation: GeneralisedControl, selection: GeneralisedControl) -> Self {
        Self {
            navigation: Some(navigation),
            selection: Some(selection),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.navigation.is_none() && self.selection.is_none()
    }

    /// Whether every defined control exists in `layout`.
    pub fn is_valid_for(&self, layout: &ControlLayout) -> bool {
        [self.navigation, self.selection]
            .iter()
            .flatten()
            .all(|general| layout.contains(&general.reference))
    }
}

/// Static link between a UI slot and the situation and control it stands
/// for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridBinding {
    pub slot: String,
    pub state: RelativeState,
    pub control: InputControl,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridConfig {
    pub grid_type: GridType,
    pub cols: u32,
    pub bindings: Vec<GridBinding>,
}

fn cell_state(cell: u32) -> RelativeState {
    RelativeState::new(None, None, Some(AxisKey::Id(cell)))
}

impl GridConfig {
    /// Builds the bindings of a grid from the mode's selection control.
    /// Keyboard and action strip cells are all selected by the reference
    /// control; square grid cells get one binding per valid direction.
    pub fn create(
        grid_type: GridType,
        cols: u32,
        selection: &GeneralisedControl,
        layout: &ControlLayout,
    ) -> Self {
        let mut bindings = Vec::new();
        match grid_type {
            GridType::Keyboard => {
                for (key, cell) in KEYBOARD.iter().zip(1u32..) {
                    bindings.push(GridBinding {
                        slot: key.to_string(),
                        state: cell_state(cell),
                        control: selection.reference,
                    });
                }
            }
            GridType::ActionStrip => {
                for i in 0..cols {
                    bindings.push(GridBinding {
                        slot: format!("A{i}"),
                        state: cell_state(i + 1),
                        control: selection.reference,
                    });
                }
            }
            GridType::Square4x4 | GridType::Square8x4 => {
                let (navigation_mode, selection_mode) = grid_type.square_modes();
                for (i, direction) in Direction::SQUARE.iter().enumerate() {
                    if !is_direction_valid(*direction, navigation_mode) {
                        continue;
                    }
                    for (j, position) in Direction::SQUARE.iter().enumerate() {
                        if !is_direction_valid(*position, selection_mode) {
                            continue;
                        }
                        let Some(control) =
                            layout.specific_input_control(selection, ControlSetting::None, *position)
                        else {
                            continue;
                        };
                        bindings.push(GridBinding {
                            slot: square_slot_name(i, j),
                            state: cell_state(SQUARE_CELL_IDS[i]),
                            control,
                        });
                    }
                }
            }
        }

        let cols = if grid_type == GridType::ActionStrip { cols } else { 0 };
        Self {
            grid_type,
            cols,
            bindings,
        }
    }

    pub fn slot_names(&self) -> Vec<String> {
        self.grid_type.slot_names(self.cols)
    }
}
