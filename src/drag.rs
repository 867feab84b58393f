//! Drag controller: turns pick-up/drop gestures into store transitions.
//!
//! The controller is either idle or dragging one player. A drop emits exactly
//! one [`Mutation`] when it changes the lineup and nothing otherwise.

use alloc::string::String;

use crate::common::LineupError;
use crate::config::ROSTER_ZONE;
use crate::mutation::Mutation;
use crate::player::Player;
use crate::store::LineupStore;

/// Where a dragged player was released.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropZone {
    /// The roster list.
    Roster,
    /// A grid cell.
    Cell { row: usize, col: usize },
}

impl DropZone {
    /// Parse a drop zone id: `"player-list"` or `"<row>-<col>"`.
    pub fn parse(zone_id: &str) -> Option<DropZone> {
        let zone_id = zone_id.trim();
        if zone_id == ROSTER_ZONE {
            return Some(DropZone::Roster);
        }
        let (row, col) = zone_id.split_once('-')?;
        let row = row.parse().ok()?;
        let col = col.parse().ok()?;
        Some(DropZone::Cell { row, col })
    }
}

/// Controller state.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DragState {
    #[default]
    Idle,
    Dragging(Player),
}

/// Result of releasing a drag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropOutcome {
    /// The store changed; broadcast this.
    Applied(Mutation),
    /// The store refused the move, typically an occupied cell.
    Rejected(LineupError),
    /// No drag, or no valid target.
    Cancelled,
}

impl DropOutcome {
    pub fn mutation(&self) -> Option<&Mutation> {
        match self {
            DropOutcome::Applied(m) => Some(m),
            _ => None,
        }
    }
}

/// Gesture capability implemented by the UI adapter.
#[cfg(feature = "std")]
#[async_trait::async_trait]
pub trait DragGestures: Send {
    /// A gesture started on the player card with `id`.
    async fn on_pick_up(&mut self, id: &str) -> Result<(), LineupError>;
    /// The gesture ended over `zone_id`, or over nothing.
    async fn on_drop(&mut self, zone_id: Option<&str>) -> DropOutcome;
}

/// Idle/Dragging state machine.
#[derive(Debug, Default)]
pub struct DragController {
    state: DragState,
}

impl DragController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &DragState {
        &self.state
    }

    /// The player currently being dragged.
    pub fn active(&self) -> Option<&Player> {
        match &self.state {
            DragState::Dragging(p) => Some(p),
            DragState::Idle => None,
        }
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging(_))
    }

    /// Start dragging `id`. Any drag already in progress is replaced.
    pub fn pick_up(&mut self, store: &LineupStore, id: &str) -> Result<&Player, LineupError> {
        let player = store
            .find_player(id)
            .cloned()
            .ok_or_else(|| LineupError::UnknownPlayer(String::from(id)))?;
        self.state = DragState::Dragging(player);
        match &self.state {
            DragState::Dragging(p) => Ok(p),
            DragState::Idle => Err(LineupError::NotDragging),
        }
    }

    /// Abandon the current drag without touching the store.
    pub fn cancel(&mut self) {
        self.state = DragState::Idle;
    }

    /// Release the current drag over `zone`. Always ends idle.
    pub fn drop_on(&mut self, store: &mut LineupStore, zone: Option<DropZone>) -> DropOutcome {
        let active = match core::mem::take(&mut self.state) {
            DragState::Dragging(p) => p,
            DragState::Idle => return DropOutcome::Cancelled,
        };
        let Some(zone) = zone else {
            return DropOutcome::Cancelled;
        };
        match zone {
            DropZone::Roster => match store.return_player(&active.id) {
                Ok(player) => DropOutcome::Applied(Mutation::Return {
                    id: player.id.clone(),
                    player: Some(player),
                }),
                Err(e) => DropOutcome::Rejected(e),
            },
            DropZone::Cell { row, col } => {
                if !store.shape().contains(row, col) {
                    return DropOutcome::Cancelled;
                }
                match store.move_player(&active.id, row, col) {
                    Ok(player) => DropOutcome::Applied(Mutation::Move {
                        id: player.id.clone(),
                        row,
                        col,
                        player,
                    }),
                    Err(e) => DropOutcome::Rejected(e),
                }
            }
        }
    }

    /// Release over a raw zone id. Unknown ids count as no target.
    pub fn drop_on_zone(&mut self, store: &mut LineupStore, zone_id: Option<&str>) -> DropOutcome {
        let zone = zone_id.and_then(DropZone::parse);
        self.drop_on(store, zone)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_roster_and_cells() {
        assert_eq!(DropZone::parse("player-list"), Some(DropZone::Roster));
        assert_eq!(DropZone::parse("3-2"), Some(DropZone::Cell { row: 3, col: 2 }));
        assert_eq!(DropZone::parse(" 0-0 "), Some(DropZone::Cell { row: 0, col: 0 }));
    }

    #[test]
    fn rejects_garbage_zone_ids() {
        assert_eq!(DropZone::parse(""), None);
        assert_eq!(DropZone::parse("bench"), None);
        assert_eq!(DropZone::parse("1-"), None);
        assert_eq!(DropZone::parse("-1-2"), None);
        assert_eq!(DropZone::parse("a-b"), None);
    }
}
