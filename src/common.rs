//! Common types for the lineup: store errors and player locations.

use alloc::string::String;

/// Where a player currently sits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Location {
    /// Index into the roster list.
    Roster(usize),
    /// Grid cell.
    Cell { row: usize, col: usize },
}

/// Errors returned by lineup store transitions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineupError {
    /// Target cell already holds another player.
    OccupiedCell { row: usize, col: usize, occupant: String },
    /// Cell coordinates fall outside the grid.
    OutOfBounds { row: usize, col: usize },
    /// No player with this id is known.
    UnknownPlayer(String),
    /// The same player id appears more than once.
    DuplicatePlayer(String),
    /// A grid of a different size was supplied.
    ShapeMismatch {
        expected: (usize, usize),
        found: (usize, usize),
    },
    /// A drop arrived while nothing was being dragged.
    NotDragging,
}

impl core::fmt::Display for LineupError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            LineupError::OccupiedCell { row, col, occupant } => {
                write!(f, "Cell {}-{} is already occupied by player {}", row, col, occupant)
            }
            LineupError::OutOfBounds { row, col } => {
                write!(f, "Cell {}-{} is outside the grid", row, col)
            }
            LineupError::UnknownPlayer(id) => write!(f, "Unknown player id {}", id),
            LineupError::DuplicatePlayer(id) => write!(f, "Player {} appears more than once", id),
            LineupError::ShapeMismatch { expected, found } => write!(
                f,
                "Grid shape mismatch: expected {}x{}, found {}x{}",
                expected.0, expected.1, found.0, found.1
            ),
            LineupError::NotDragging => write!(f, "No drag in progress"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for LineupError {}
