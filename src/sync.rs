//! Sync client: publishes local mutations, replays peer ones, and talks to
//! the layouts table.
//!
//! Nothing here is retried. Failures are logged and the caller keeps its
//! last good state; only a reused layout name is reported to the user.

use core::fmt;

use crate::backend::{BroadcastChannel, LayoutStore, StoreError};
use crate::config::{GridShape, DRAG_EVENT, LIVE_LAYOUT_NAME, SYNC_TOPIC};
use crate::grid::Grid;
use crate::layout::{decode_grid, layout_row};
use crate::mutation::Mutation;

/// Which flavour of synchronization a client runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SyncMode {
    /// Broadcast mutations only.
    BroadcastOnly,
    /// Broadcast plus save and load by name.
    #[default]
    Layouts,
    /// Layouts plus a live snapshot restored at startup.
    Live,
}

impl SyncMode {
    pub fn has_layouts(self) -> bool {
        !matches!(self, SyncMode::BroadcastOnly)
    }

    pub fn is_live(self) -> bool {
        matches!(self, SyncMode::Live)
    }
}

/// Runtime settings of a sync client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncConfig {
    pub topic: String,
    pub live_name: String,
    pub mode: SyncMode,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            topic: SYNC_TOPIC.to_string(),
            live_name: LIVE_LAYOUT_NAME.to_string(),
            mode: SyncMode::default(),
        }
    }
}

impl SyncConfig {
    pub fn with_mode(mode: SyncMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }
}

/// User-facing notices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Alert {
    /// A layout with this name exists (or the name is reserved).
    DuplicateName(String),
    /// Blank layout name.
    InvalidName,
    /// This client runs without the layouts table.
    LayoutsDisabled,
}

impl fmt::Display for Alert {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Alert::DuplicateName(name) => write!(f, "A layout named '{}' already exists", name),
            Alert::InvalidName => write!(f, "Layout name cannot be empty"),
            Alert::LayoutsDisabled => write!(f, "Saving layouts is not available in this mode"),
        }
    }
}

/// Result of a save-by-name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    Saved,
    /// Refused before writing; show the alert.
    Alerted(Alert),
    /// The store failed; already logged.
    Failed,
}

/// Result of a load-by-name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    Loaded(Grid),
    /// No layout has this name.
    Missing,
    /// Stored data could not be decoded.
    Malformed,
    /// The store failed, or layouts are disabled.
    Failed,
}

/// Client of the shared channel and layouts table.
pub struct SyncClient<C, L> {
    channel: C,
    layouts: L,
    config: SyncConfig,
    saved_names: Vec<String>,
}

impl<C: BroadcastChannel, L: LayoutStore> SyncClient<C, L> {
    pub fn new(channel: C, layouts: L, config: SyncConfig) -> Self {
        Self {
            channel,
            layouts,
            config,
            saved_names: Vec::new(),
        }
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    pub fn mode(&self) -> SyncMode {
        self.config.mode
    }

    /// Names of saved layouts as last loaded, excluding the live snapshot.
    pub fn saved_names(&self) -> &[String] {
        &self.saved_names
    }

    /// Reload the saved names. On failure the previous list is kept.
    pub async fn refresh_names(&mut self) -> bool {
        if !self.config.mode.has_layouts() {
            return false;
        }
        match self.layouts.names().await {
            Ok(names) => {
                self.saved_names = names.into_iter().filter(|n| *n != self.config.live_name).collect();
                log::info!("[sync] {} saved layouts available", self.saved_names.len());
                true
            }
            Err(e) => {
                log::error!("[sync] failed to load layout names: {}", e);
                false
            }
        }
    }

    /// Fetch the live snapshot, if this client runs in live mode and one exists.
    pub async fn load_live(&self, shape: GridShape) -> Option<Grid> {
        if !self.config.mode.is_live() {
            return None;
        }
        match self.fetch_grid(&self.config.live_name, shape).await {
            LoadOutcome::Loaded(grid) => Some(grid),
            LoadOutcome::Missing => {
                log::info!("[sync] no live snapshot yet");
                None
            }
            _ => None,
        }
    }

    /// Publish a locally applied mutation and refresh the live snapshot.
    pub async fn on_local_mutation(&mut self, mutation: &Mutation, grid: &Grid) {
        self.publish(mutation).await;
        self.upsert_live(grid).await;
    }

    /// Fire-and-forget broadcast of `mutation`.
    pub async fn publish(&mut self, mutation: &Mutation) {
        let payload = match mutation.to_json() {
            Ok(p) => p,
            Err(e) => {
                log::error!("[sync] {}", e);
                return;
            }
        };
        match self.channel.publish(DRAG_EVENT, payload).await {
            Ok(()) => log::debug!("[sync] broadcast {} {}", mutation.kind(), mutation.player_id()),
            Err(e) => log::error!("[sync] broadcast error: {}", e),
        }
    }

    /// Overwrite the live snapshot with `grid` when in live mode.
    pub async fn upsert_live(&self, grid: &Grid) {
        if !self.config.mode.is_live() {
            return;
        }
        let row = match layout_row(&self.config.live_name, grid) {
            Ok(row) => row,
            Err(e) => {
                log::error!("[sync] {}", e);
                return;
            }
        };
        if let Err(e) = self.layouts.upsert(row).await {
            log::error!("[sync] failed to store live snapshot: {}", e);
        }
    }

    /// Store `grid` under a new `name`. Existing and reserved names are refused.
    pub async fn save_as(&mut self, name: &str, grid: &Grid) -> SaveOutcome {
        if !self.config.mode.has_layouts() {
            return SaveOutcome::Alerted(Alert::LayoutsDisabled);
        }
        let name = name.trim();
        if name.is_empty() {
            return SaveOutcome::Alerted(Alert::InvalidName);
        }
        if name == self.config.live_name || self.saved_names.iter().any(|n| n == name) {
            return SaveOutcome::Alerted(Alert::DuplicateName(name.to_string()));
        }
        let row = match layout_row(name, grid) {
            Ok(row) => row,
            Err(e) => {
                log::error!("[sync] {}", e);
                return SaveOutcome::Failed;
            }
        };
        match self.layouts.insert(row).await {
            Ok(()) => {
                log::info!("[sync] saved layout '{}'", name);
                self.saved_names.push(name.to_string());
                SaveOutcome::Saved
            }
            Err(StoreError::Conflict(existing)) => {
                self.saved_names.push(existing.clone());
                SaveOutcome::Alerted(Alert::DuplicateName(existing))
            }
            Err(e) => {
                log::error!("[sync] failed to save layout '{}': {}", name, e);
                SaveOutcome::Failed
            }
        }
    }

    /// Fetch and decode the layout called `name`.
    pub async fn load(&self, name: &str, shape: GridShape) -> LoadOutcome {
        if !self.config.mode.has_layouts() {
            return LoadOutcome::Failed;
        }
        self.fetch_grid(name.trim(), shape).await
    }

    async fn fetch_grid(&self, name: &str, shape: GridShape) -> LoadOutcome {
        let row = match self.layouts.fetch(name).await {
            Ok(Some(row)) => row,
            Ok(None) => return LoadOutcome::Missing,
            Err(e) => {
                log::error!("[sync] failed to load layout '{}': {}", name, e);
                return LoadOutcome::Failed;
            }
        };
        match decode_grid(&row.data, Some(shape)) {
            Ok(grid) => {
                log::info!("[sync] loaded layout '{}'", name);
                LoadOutcome::Loaded(grid)
            }
            Err(e) => {
                log::error!("[sync] layout '{}' is unusable: {}", name, e);
                LoadOutcome::Malformed
            }
        }
    }

    /// Wait for the next peer mutation, skipping foreign events and
    /// undecodable payloads. Errors only when the channel itself fails.
    pub async fn next_remote(&mut self) -> anyhow::Result<Mutation> {
        loop {
            let event = self.channel.recv().await?;
            if event.event != DRAG_EVENT {
                log::debug!("[sync] ignoring {} event", event.event);
                continue;
            }
            match Mutation::from_json(&event.payload) {
                Ok(mutation) => return Ok(mutation),
                Err(e) => log::warn!("[sync] {}", e),
            }
        }
    }
}
