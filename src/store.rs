//! Lineup store: the roster list and the position grid, with the pure
//! transitions that move players between them.
//!
//! Every transition either succeeds and leaves each player id in exactly one
//! place, or fails and leaves the state untouched.

use alloc::string::String;
use alloc::vec::Vec;

use crate::common::{LineupError, Location};
use crate::config::GridShape;
use crate::grid::Grid;
use crate::mutation::Mutation;
use crate::player::{seed_players, Player};

/// Snapshot of a store, used for projections and restoring.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineupState {
    pub roster: Vec<Player>,
    pub grid: Grid,
}

/// Owner of the roster and grid.
#[derive(Debug, Clone)]
pub struct LineupStore {
    roster: Vec<Player>,
    grid: Grid,
    catalogue: Vec<Player>,
    revision: u64,
}

impl LineupStore {
    /// Seeded squad in the roster and an empty grid of `shape`.
    pub fn new(shape: GridShape) -> Self {
        Self::with_roster(seed_players(), shape)
    }

    /// Store whose roster and catalogue are `roster`.
    pub fn with_roster(roster: Vec<Player>, shape: GridShape) -> Self {
        Self {
            catalogue: roster.clone(),
            roster,
            grid: Grid::new(shape),
            revision: 0,
        }
    }

    /// Restore a store from a snapshot. The catalogue is every player it holds.
    pub fn from_state(state: LineupState) -> Result<Self, LineupError> {
        let mut catalogue = state.roster.clone();
        catalogue.extend(state.grid.occupied().map(|(_, _, p)| p.clone()));
        let store = Self {
            roster: state.roster,
            grid: state.grid,
            catalogue,
            revision: 0,
        };
        store.check_invariants()?;
        Ok(store)
    }

    pub fn roster(&self) -> &[Player] {
        &self.roster
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn shape(&self) -> GridShape {
        self.grid.shape()
    }

    /// Bumped on every successful transition.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn state(&self) -> LineupState {
        LineupState {
            roster: self.roster.clone(),
            grid: self.grid.clone(),
        }
    }

    /// Grid first, then roster.
    pub fn locate(&self, id: &str) -> Option<Location> {
        if let Some((row, col)) = self.grid.find(id) {
            return Some(Location::Cell { row, col });
        }
        self.roster.iter().position(|p| p.id == id).map(Location::Roster)
    }

    /// Current copy of the player with `id`, searching grid then roster.
    pub fn find_player(&self, id: &str) -> Option<&Player> {
        match self.locate(id)? {
            Location::Cell { row, col } => self.grid.get(row, col).ok().flatten(),
            Location::Roster(idx) => self.roster.get(idx),
        }
    }

    /// Place `id` at `(row, col)`, taking it from the roster or another cell.
    ///
    /// Fails without touching state when the cell holds a different player.
    pub fn move_player(&mut self, id: &str, row: usize, col: usize) -> Result<Player, LineupError> {
        self.move_or_insert(id, row, col, None)
    }

    /// Remove `id` from the grid and append it to the roster unless it is
    /// already listed there.
    pub fn return_player(&mut self, id: &str) -> Result<Player, LineupError> {
        self.return_or_insert(id, None)
    }

    /// Change the display name of `id` wherever it sits.
    pub fn rename_player(&mut self, id: &str, name: &str) -> Result<(), LineupError> {
        let mut found = false;
        if let Some(p) = self.grid.player_mut(id) {
            p.name = String::from(name);
            found = true;
        }
        if let Some(p) = self.roster.iter_mut().find(|p| p.id == id) {
            p.name = String::from(name);
            found = true;
        }
        if let Some(p) = self.catalogue.iter_mut().find(|p| p.id == id) {
            p.name = String::from(name);
        }
        if !found {
            return Err(LineupError::UnknownPlayer(String::from(id)));
        }
        self.revision += 1;
        Ok(())
    }

    /// Replay a mutation through the same transitions local gestures use.
    ///
    /// A MOVE places the carried player as sent, name included. Ids unknown
    /// here are resolved from the carried player, then from the catalogue.
    pub fn apply(&mut self, mutation: &Mutation) -> Result<Player, LineupError> {
        match mutation {
            Mutation::Move { id, row, col, player } => self.move_or_insert(id, *row, *col, Some(player)),
            Mutation::Return { id, player } => self.return_or_insert(id, player.as_ref()),
        }
    }

    /// Replace the whole grid and reconcile the roster against it.
    ///
    /// Players on the new grid leave the roster; players displaced from the
    /// old grid are appended to it.
    pub fn replace_grid(&mut self, grid: Grid) -> Result<(), LineupError> {
        let expected = self.grid.shape();
        let found = grid.shape();
        if expected != found {
            return Err(LineupError::ShapeMismatch {
                expected: (expected.rows, expected.cols),
                found: (found.rows, found.cols),
            });
        }
        grid.check_unique()?;

        let displaced: Vec<Player> = self
            .grid
            .occupied()
            .filter(|(_, _, p)| grid.find(&p.id).is_none())
            .map(|(_, _, p)| p.clone())
            .collect();
        self.roster.retain(|p| grid.find(&p.id).is_none());
        for player in displaced {
            if !self.roster.iter().any(|p| p.id == player.id) {
                self.roster.push(player);
            }
        }
        for (_, _, player) in grid.occupied() {
            if !self.catalogue.iter().any(|p| p.id == player.id) {
                self.catalogue.push(player.clone());
            }
        }
        self.grid = grid;
        self.revision += 1;
        Ok(())
    }

    /// Verify that no player id appears in more than one place.
    pub fn check_invariants(&self) -> Result<(), LineupError> {
        self.grid.check_unique()?;
        for (i, player) in self.roster.iter().enumerate() {
            if self.roster[..i].iter().any(|p| p.id == player.id) || self.grid.find(&player.id).is_some() {
                return Err(LineupError::DuplicatePlayer(player.id.clone()));
            }
        }
        Ok(())
    }

    fn move_or_insert(
        &mut self,
        id: &str,
        row: usize,
        col: usize,
        carried: Option<&Player>,
    ) -> Result<Player, LineupError> {
        if let Some(occupant) = self.grid.get(row, col)? {
            if occupant.id != id {
                return Err(LineupError::OccupiedCell {
                    row,
                    col,
                    occupant: occupant.id.clone(),
                });
            }
        }
        let carried = carried.filter(|p| p.id == id);
        let local = match self.locate(id) {
            Some(Location::Cell { .. }) => self.grid.remove(id),
            Some(Location::Roster(idx)) => Some(self.roster.remove(idx)),
            None => None,
        };
        // The sender's copy wins, name included.
        let player = carried
            .cloned()
            .or(local)
            .or_else(|| self.from_catalogue(id))
            .ok_or_else(|| LineupError::UnknownPlayer(String::from(id)))?;
        self.roster.retain(|p| p.id != id);
        if let Some(p) = carried {
            self.remember(p);
        }
        self.grid.set(row, col, player.clone())?;
        self.revision += 1;
        Ok(player)
    }

    fn return_or_insert(&mut self, id: &str, carried: Option<&Player>) -> Result<Player, LineupError> {
        let from_grid = self.grid.remove(id);
        if let Some(existing) = self.roster.iter().find(|p| p.id == id) {
            let existing = existing.clone();
            if from_grid.is_some() {
                self.revision += 1;
            }
            return Ok(existing);
        }
        let player = from_grid
            .or_else(|| carried.cloned())
            .or_else(|| self.from_catalogue(id))
            .ok_or_else(|| LineupError::UnknownPlayer(String::from(id)))?;
        self.roster.push(player.clone());
        self.revision += 1;
        Ok(player)
    }

    fn remember(&mut self, player: &Player) {
        match self.catalogue.iter_mut().find(|p| p.id == player.id) {
            Some(known) => *known = player.clone(),
            None => self.catalogue.push(player.clone()),
        }
    }

    fn from_catalogue(&self, id: &str) -> Option<Player> {
        self.catalogue.iter().find(|p| p.id == id).cloned()
    }
}
