//! Fixed lineup configuration: the seed roster, row labels and wire constants.

/// Number of position rows on every grid variant.
pub const GRID_ROWS: usize = 9;

/// Row labels, top to bottom.
pub const POSITIONS: [&str; GRID_ROWS] = ["FB", "HB", "C", "HF", "FF", "FOL", "INT", "BENCH", "EXTRA"];

/// First row that holds interchange players rather than on-field ones.
pub const INTERCHANGE_FROM_ROW: usize = 6;

/// Drop zone id of the roster list.
pub const ROSTER_ZONE: &str = "player-list";

/// Broadcast topic shared by every client.
pub const SYNC_TOPIC: &str = "team-selector-sync";

/// Event name carried by mutation broadcasts.
pub const DRAG_EVENT: &str = "drag";

/// Reserved layout name holding the running live snapshot.
pub const LIVE_LAYOUT_NAME: &str = "live";

/// Dimensions of a position grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GridShape {
    pub rows: usize,
    pub cols: usize,
}

impl GridShape {
    /// Three slots per position.
    pub const STANDARD: GridShape = GridShape::new(GRID_ROWS, 3);
    /// Two slots per position.
    pub const COMPACT: GridShape = GridShape::new(GRID_ROWS, 2);

    pub const fn new(rows: usize, cols: usize) -> Self {
        Self { rows, cols }
    }

    pub const fn cells(&self) -> usize {
        self.rows * self.cols
    }

    pub const fn contains(&self, row: usize, col: usize) -> bool {
        row < self.rows && col < self.cols
    }
}

/// Static definition of a seeded player.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayerDef {
    pub number: u32,
    pub name: &'static str,
}

impl PlayerDef {
    pub const fn new(number: u32, name: &'static str) -> Self {
        Self { number, name }
    }
}

pub const NUM_PLAYERS: usize = 31;

/// Squad loaded into the roster at startup, in display order.
pub const SEED_ROSTER: [PlayerDef; NUM_PLAYERS] = [
    PlayerDef::new(15, "POGGENPOEL"),
    PlayerDef::new(6, "SAWYERS"),
    PlayerDef::new(33, "BAKER"),
    PlayerDef::new(14, "BUCHMASSER"),
    PlayerDef::new(9, "JOHNSTONE"),
    PlayerDef::new(3, "WILD"),
    PlayerDef::new(1, "KULIBABA"),
    PlayerDef::new(23, "BANDERA"),
    PlayerDef::new(18, "PORTER"),
    PlayerDef::new(21, "MARTIN"),
    PlayerDef::new(42, "SMITH"),
    PlayerDef::new(65, "THOMAS"),
    PlayerDef::new(87, "LEE"),
    PlayerDef::new(38, "JONES"),
    PlayerDef::new(74, "WALKER"),
    PlayerDef::new(92, "CLARKE"),
    PlayerDef::new(56, "ADAMS"),
    PlayerDef::new(27, "NELSON"),
    PlayerDef::new(60, "MURPHY"),
    PlayerDef::new(48, "TURNER"),
    PlayerDef::new(39, "MOSS"),
    PlayerDef::new(84, "JACKSON"),
    PlayerDef::new(73, "HOWARD"),
    PlayerDef::new(59, "DAVIS"),
    PlayerDef::new(31, "WILLIAMS"),
    PlayerDef::new(77, "COOPER"),
    PlayerDef::new(66, "EVANS"),
    PlayerDef::new(12, "ALLEN"),
    PlayerDef::new(30, "BLAKE"),
    PlayerDef::new(47, "BROOKS"),
    PlayerDef::new(36, "REED"),
];

/// Label for a grid row, or `None` past the last position.
pub fn position_label(row: usize) -> Option<&'static str> {
    POSITIONS.get(row).copied()
}

/// Whether `row` is one of the interchange rows.
pub fn is_interchange_row(row: usize) -> bool {
    row >= INTERCHANGE_FROM_ROW
}
