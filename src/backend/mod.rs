//! Capabilities a sync client needs from the hosted service: a broadcast
//! channel and a table of named layouts.

use crate::protocol::LayoutRow;

/// One delivery from a broadcast topic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelEvent {
    pub event: String,
    pub payload: String,
}

/// Shared realtime topic. A sender never receives its own events.
#[async_trait::async_trait]
pub trait BroadcastChannel: Send + Sync {
    /// Publish `payload` under `event` to every other subscriber.
    async fn publish(&mut self, event: &str, payload: String) -> anyhow::Result<()>;
    /// Wait for the next peer event. Cancel-safe.
    async fn recv(&mut self) -> anyhow::Result<ChannelEvent>;
}

/// Failures reported by a [`LayoutStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// A row with this name already exists.
    Conflict(String),
    /// The store could not be reached or refused the request.
    Unavailable(String),
}

impl core::fmt::Display for StoreError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            StoreError::Conflict(name) => write!(f, "A layout named '{}' already exists", name),
            StoreError::Unavailable(reason) => write!(f, "Layout store unavailable: {}", reason),
        }
    }
}

impl std::error::Error for StoreError {}

/// Table of named layouts keyed by unique name.
#[async_trait::async_trait]
pub trait LayoutStore: Send + Sync {
    async fn names(&self) -> Result<Vec<String>, StoreError>;
    async fn fetch(&self, name: &str) -> Result<Option<LayoutRow>, StoreError>;
    /// Create a row. Fails with [`StoreError::Conflict`] if the name is taken.
    async fn insert(&self, row: LayoutRow) -> Result<(), StoreError>;
    /// Create or overwrite a row.
    async fn upsert(&self, row: LayoutRow) -> Result<(), StoreError>;
}

pub mod memory;
pub mod remote;

pub use memory::{MemoryBackend, MemoryChannel, MemoryLayoutStore};
pub use remote::{RemoteChannel, RemoteLayoutStore};
