//! Commonly used types and utilities for ease of import.

pub use crate::{DragController, DropOutcome, DropZone, Grid, GridShape, LineupError, LineupStore, Mutation, Player};

#[cfg(feature = "std")]
pub use crate::{LineupSession, MemoryBackend, SyncClient, SyncConfig, SyncMode};

#[cfg(feature = "std")]
pub use crate::backend::{BroadcastChannel, LayoutStore};
