//! In-process backend: one broadcast topic plus a layouts table, shared by
//! every endpoint handed out by the same [`MemoryBackend`].

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use tokio::sync::broadcast;

use super::{BroadcastChannel, ChannelEvent, LayoutStore, StoreError};
use crate::protocol::LayoutRow;

const TOPIC_CAPACITY: usize = 256;

#[derive(Debug, Clone)]
struct Envelope {
    origin: u64,
    event: String,
    payload: String,
}

struct Shared {
    topic: broadcast::Sender<Envelope>,
    table: Mutex<BTreeMap<String, String>>,
    next_id: AtomicU64,
    offline: AtomicBool,
}

/// Factory for connected in-process endpoints.
#[derive(Clone)]
pub struct MemoryBackend {
    shared: Arc<Shared>,
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryBackend {
    pub fn new() -> Self {
        let (topic, _) = broadcast::channel(TOPIC_CAPACITY);
        Self {
            shared: Arc::new(Shared {
                topic,
                table: Mutex::new(BTreeMap::new()),
                next_id: AtomicU64::new(1),
                offline: AtomicBool::new(false),
            }),
        }
    }

    /// Subscribe a new client to the topic.
    pub fn channel(&self) -> MemoryChannel {
        MemoryChannel {
            id: self.shared.next_id.fetch_add(1, Ordering::SeqCst),
            rx: self.shared.topic.subscribe(),
            shared: self.shared.clone(),
        }
    }

    /// Handle on the shared layouts table.
    pub fn layouts(&self) -> MemoryLayoutStore {
        MemoryLayoutStore {
            shared: self.shared.clone(),
        }
    }

    /// Simulate losing the service: every publish and table call fails.
    pub fn set_offline(&self, offline: bool) {
        self.shared.offline.store(offline, Ordering::SeqCst);
    }

    fn check_online(shared: &Shared) -> Result<(), StoreError> {
        if shared.offline.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("backend offline".to_string()));
        }
        Ok(())
    }
}

/// One client's subscription to the in-process topic.
pub struct MemoryChannel {
    id: u64,
    rx: broadcast::Receiver<Envelope>,
    shared: Arc<Shared>,
}

impl MemoryChannel {
    pub fn client_id(&self) -> u64 {
        self.id
    }
}

#[async_trait::async_trait]
impl BroadcastChannel for MemoryChannel {
    async fn publish(&mut self, event: &str, payload: String) -> anyhow::Result<()> {
        MemoryBackend::check_online(&self.shared)?;
        // No receivers is fine: nobody else is listening yet.
        let _ = self.shared.topic.send(Envelope {
            origin: self.id,
            event: event.to_string(),
            payload,
        });
        Ok(())
    }

    async fn recv(&mut self) -> anyhow::Result<ChannelEvent> {
        loop {
            match self.rx.recv().await {
                Ok(env) if env.origin == self.id => continue,
                Ok(env) => {
                    return Ok(ChannelEvent {
                        event: env.event,
                        payload: env.payload,
                    })
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    log::warn!("[MemoryChannel] client {} lagged, {} events dropped", self.id, skipped);
                }
                Err(broadcast::error::RecvError::Closed) => {
                    return Err(anyhow::anyhow!("Channel closed"));
                }
            }
        }
    }
}

/// Shared handle on the in-process layouts table.
#[derive(Clone)]
pub struct MemoryLayoutStore {
    shared: Arc<Shared>,
}

impl MemoryLayoutStore {
    fn table(&self) -> Result<std::sync::MutexGuard<'_, BTreeMap<String, String>>, StoreError> {
        MemoryBackend::check_online(&self.shared)?;
        self.shared
            .table
            .lock()
            .map_err(|_| StoreError::Unavailable("table lock poisoned".to_string()))
    }
}

#[async_trait::async_trait]
impl LayoutStore for MemoryLayoutStore {
    async fn names(&self) -> Result<Vec<String>, StoreError> {
        Ok(self.table()?.keys().cloned().collect())
    }

    async fn fetch(&self, name: &str) -> Result<Option<LayoutRow>, StoreError> {
        Ok(self
            .table()?
            .get(name)
            .map(|data| LayoutRow::new(name, data.clone())))
    }

    async fn insert(&self, row: LayoutRow) -> Result<(), StoreError> {
        let mut table = self.table()?;
        if table.contains_key(&row.name) {
            return Err(StoreError::Conflict(row.name));
        }
        table.insert(row.name, row.data);
        Ok(())
    }

    async fn upsert(&self, row: LayoutRow) -> Result<(), StoreError> {
        self.table()?.insert(row.name, row.data);
        Ok(())
    }
}
