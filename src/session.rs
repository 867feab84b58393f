//! A client session: the lineup store, the drag controller and the sync
//! client wired together behind the gesture capability.
//!
//! The session is owned by a single task. Gestures and peer events are
//! handled one at a time, so the store needs no locking. Readers follow
//! changes through [`LineupSession::subscribe`].

use tokio::sync::watch;

use crate::backend::{BroadcastChannel, LayoutStore};
use crate::common::LineupError;
use crate::drag::{DragController, DragGestures, DragState, DropOutcome, DropZone};
use crate::mutation::Mutation;
use crate::player::Player;
use crate::store::{LineupState, LineupStore};
use crate::sync::{LoadOutcome, SaveOutcome, SyncClient};

pub struct LineupSession<C, L> {
    store: LineupStore,
    drag: DragController,
    sync: SyncClient<C, L>,
    view: watch::Sender<LineupState>,
}

impl<C: BroadcastChannel, L: LayoutStore> LineupSession<C, L> {
    /// Load saved names and, in live mode, the live snapshot before any
    /// gesture is accepted.
    pub async fn start(mut store: LineupStore, mut sync: SyncClient<C, L>) -> Self {
        sync.refresh_names().await;
        if let Some(grid) = sync.load_live(store.shape()).await {
            match store.replace_grid(grid) {
                Ok(()) => log::info!("[session] restored live snapshot"),
                Err(e) => log::error!("[session] live snapshot rejected: {}", e),
            }
        }
        let (view, _) = watch::channel(store.state());
        Self {
            store,
            drag: DragController::new(),
            sync,
            view,
        }
    }

    pub fn store(&self) -> &LineupStore {
        &self.store
    }

    pub fn sync(&self) -> &SyncClient<C, L> {
        &self.sync
    }

    pub fn drag_state(&self) -> &DragState {
        self.drag.state()
    }

    pub fn state(&self) -> LineupState {
        self.store.state()
    }

    /// Receiver that always holds the latest lineup.
    pub fn subscribe(&self) -> watch::Receiver<LineupState> {
        self.view.subscribe()
    }

    fn notify(&self) {
        self.view.send_replace(self.store.state());
    }

    pub fn pick_up(&mut self, id: &str) -> Result<Player, LineupError> {
        self.drag.pick_up(&self.store, id).cloned()
    }

    pub fn cancel_drag(&mut self) {
        self.drag.cancel();
    }

    /// Release the current drag over `zone`; broadcasts when the lineup changed.
    pub async fn drop_on(&mut self, zone: Option<DropZone>) -> DropOutcome {
        let outcome = self.drag.drop_on(&mut self.store, zone);
        self.after_drop(&outcome).await;
        outcome
    }

    /// Same as [`drop_on`](Self::drop_on) for a raw zone id.
    pub async fn drop_on_zone(&mut self, zone_id: Option<&str>) -> DropOutcome {
        let outcome = self.drag.drop_on_zone(&mut self.store, zone_id);
        self.after_drop(&outcome).await;
        outcome
    }

    async fn after_drop(&mut self, outcome: &DropOutcome) {
        match outcome {
            DropOutcome::Applied(mutation) => {
                self.notify();
                self.sync.on_local_mutation(mutation, self.store.grid()).await;
            }
            DropOutcome::Rejected(e) => log::debug!("[session] drop rejected: {}", e),
            DropOutcome::Cancelled => log::debug!("[session] drag cancelled"),
        }
    }

    /// Drag `id` straight onto `(row, col)`.
    pub async fn move_player(&mut self, id: &str, row: usize, col: usize) -> Result<DropOutcome, LineupError> {
        self.pick_up(id)?;
        Ok(self.drop_on(Some(DropZone::Cell { row, col })).await)
    }

    /// Drag `id` straight onto the roster list.
    pub async fn return_player(&mut self, id: &str) -> Result<DropOutcome, LineupError> {
        self.pick_up(id)?;
        Ok(self.drop_on(Some(DropZone::Roster)).await)
    }

    /// Rename locally. Renames are not broadcast; the live snapshot picks
    /// them up.
    pub async fn rename_player(&mut self, id: &str, name: &str) -> Result<(), LineupError> {
        self.store.rename_player(id, name)?;
        self.notify();
        self.sync.upsert_live(self.store.grid()).await;
        Ok(())
    }

    pub async fn save_layout(&mut self, name: &str) -> SaveOutcome {
        self.sync.save_as(name, self.store.grid()).await
    }

    /// Replace the grid with a saved layout. Prior state survives any failure.
    pub async fn load_layout(&mut self, name: &str) -> LoadOutcome {
        let outcome = self.sync.load(name, self.store.shape()).await;
        if let LoadOutcome::Loaded(grid) = &outcome {
            if let Err(e) = self.store.replace_grid(grid.clone()) {
                log::error!("[session] layout '{}' rejected: {}", name, e);
                return LoadOutcome::Malformed;
            }
            self.notify();
            self.sync.upsert_live(self.store.grid()).await;
        }
        outcome
    }

    pub async fn refresh_layouts(&mut self) -> &[String] {
        self.sync.refresh_names().await;
        self.sync.saved_names()
    }

    /// Replay a peer mutation without re-broadcasting it.
    pub fn apply_remote(&mut self, mutation: &Mutation) -> bool {
        match self.store.apply(mutation) {
            Ok(_) => {
                self.notify();
                true
            }
            Err(e) => {
                log::warn!(
                    "[session] peer {} of {} not applied: {}",
                    mutation.kind(),
                    mutation.player_id(),
                    e
                );
                false
            }
        }
    }

    /// Wait for one peer mutation and replay it. Cancel-safe.
    pub async fn recv_remote(&mut self) -> anyhow::Result<bool> {
        let mutation = self.sync.next_remote().await?;
        Ok(self.apply_remote(&mutation))
    }
}

#[async_trait::async_trait]
impl<C: BroadcastChannel, L: LayoutStore> DragGestures for LineupSession<C, L> {
    async fn on_pick_up(&mut self, id: &str) -> Result<(), LineupError> {
        self.pick_up(id).map(|_| ())
    }

    async fn on_drop(&mut self, zone_id: Option<&str>) -> DropOutcome {
        self.drop_on_zone(zone_id).await
    }
}
