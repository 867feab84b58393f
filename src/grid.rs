//! Fixed-size position grid. Each cell holds at most one player.

use alloc::vec;
use alloc::vec::Vec;

use crate::common::LineupError;
use crate::config::GridShape;
use crate::player::Player;

/// Row-major matrix of optional players.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    shape: GridShape,
    cells: Vec<Option<Player>>,
}

impl Grid {
    /// Create an empty grid of the given shape.
    pub fn new(shape: GridShape) -> Self {
        Self {
            shape,
            cells: vec![None; shape.cells()],
        }
    }

    pub fn shape(&self) -> GridShape {
        self.shape
    }

    pub fn rows(&self) -> usize {
        self.shape.rows
    }

    pub fn cols(&self) -> usize {
        self.shape.cols
    }

    fn index(&self, row: usize, col: usize) -> Result<usize, LineupError> {
        if !self.shape.contains(row, col) {
            return Err(LineupError::OutOfBounds { row, col });
        }
        Ok(row * self.shape.cols + col)
    }

    /// Player at `(row, col)`, if any.
    pub fn get(&self, row: usize, col: usize) -> Result<Option<&Player>, LineupError> {
        let idx = self.index(row, col)?;
        Ok(self.cells[idx].as_ref())
    }

    /// Put `player` into a cell, returning whatever was there before.
    pub fn set(&mut self, row: usize, col: usize, player: Player) -> Result<Option<Player>, LineupError> {
        let idx = self.index(row, col)?;
        Ok(self.cells[idx].replace(player))
    }

    /// Empty a cell, returning its previous occupant.
    pub fn take(&mut self, row: usize, col: usize) -> Result<Option<Player>, LineupError> {
        let idx = self.index(row, col)?;
        Ok(self.cells[idx].take())
    }

    /// Coordinates of the player with `id`.
    pub fn find(&self, id: &str) -> Option<(usize, usize)> {
        self.cells
            .iter()
            .position(|cell| cell.as_ref().is_some_and(|p| p.id == id))
            .map(|idx| (idx / self.shape.cols, idx % self.shape.cols))
    }

    /// Clear every cell holding `id` and return the first removed player.
    pub fn remove(&mut self, id: &str) -> Option<Player> {
        let mut removed = None;
        for cell in self.cells.iter_mut() {
            if cell.as_ref().is_some_and(|p| p.id == id) {
                let player = cell.take();
                if removed.is_none() {
                    removed = player;
                }
            }
        }
        removed
    }

    /// Mutable access to the player with `id`, wherever it sits.
    pub fn player_mut(&mut self, id: &str) -> Option<&mut Player> {
        self.cells.iter_mut().flatten().find(|p| p.id == id)
    }

    /// Iterate over occupied cells as `(row, col, player)`.
    pub fn occupied(&self) -> impl Iterator<Item = (usize, usize, &Player)> + '_ {
        let cols = self.shape.cols;
        self.cells
            .iter()
            .enumerate()
            .filter_map(move |(idx, cell)| cell.as_ref().map(|p| (idx / cols, idx % cols, p)))
    }

    /// Number of occupied cells.
    pub fn count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.count() == 0
    }

    /// Grid contents as nested rows.
    pub fn to_rows(&self) -> Vec<Vec<Option<Player>>> {
        let cols = self.shape.cols;
        (0..self.shape.rows)
            .map(|row| self.cells[row * cols..(row + 1) * cols].to_vec())
            .collect()
    }

    /// Build a grid from nested rows. Every row must have the same width.
    pub fn from_rows(rows: Vec<Vec<Option<Player>>>) -> Result<Self, LineupError> {
        let height = rows.len();
        let width = rows.first().map_or(0, |r| r.len());
        if let Some(bad) = rows.iter().find(|r| r.len() != width) {
            return Err(LineupError::ShapeMismatch {
                expected: (height, width),
                found: (height, bad.len()),
            });
        }
        let shape = GridShape::new(height, width);
        let cells: Vec<Option<Player>> = rows.into_iter().flatten().collect();
        let grid = Self { shape, cells };
        grid.check_unique()?;
        Ok(grid)
    }

    /// Fail if any player id occupies more than one cell.
    pub fn check_unique(&self) -> Result<(), LineupError> {
        let mut seen: Vec<&str> = Vec::with_capacity(self.cells.len());
        for (_, _, player) in self.occupied() {
            if seen.contains(&player.id.as_str()) {
                return Err(LineupError::DuplicatePlayer(player.id.clone()));
            }
            seen.push(player.id.as_str());
        }
        Ok(())
    }
}
