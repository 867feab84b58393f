//! Messages exchanged between sync clients and the hub.

use serde::{Deserialize, Serialize};

/// Current wire protocol version.
pub const PROTOCOL_VERSION: u8 = 1;

/// Upper bound on a single encoded frame.
pub const MAX_FRAME_SIZE: u32 = 1_000_000;

/// A named row of the layouts table. `data` is the serialized grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutRow {
    pub name: String,
    pub data: String,
}

impl LayoutRow {
    pub fn new(name: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data: data.into(),
        }
    }
}

/// Operations on the layouts table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TableOp {
    /// All layout names.
    ListNames,
    /// Row with this name.
    Fetch { name: String },
    /// New row; fails on an existing name.
    Insert { row: LayoutRow },
    /// Insert or overwrite by name.
    Upsert { row: LayoutRow },
}

/// Outcome of a [`TableOp`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TableResult {
    Names(Vec<String>),
    Row(Option<LayoutRow>),
    Done,
    Conflict { name: String },
    Failed { reason: String },
}

/// Frames carried by a [`crate::transport::Transport`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Message {
    /// First frame from a client.
    Hello { version: u8, access_key: String },
    /// Handshake accepted; the hub assigns a client id.
    HelloAck { version: u8, client_id: u64 },
    /// Handshake refused.
    Rejected { reason: String },
    /// Join a broadcast topic.
    Subscribe { topic: String },
    /// Subscription confirmed.
    Subscribed { topic: String },
    /// Client publishes to a topic.
    Publish { topic: String, event: String, payload: String },
    /// Hub delivers a peer's publish.
    Broadcast { topic: String, event: String, payload: String, origin: u64 },
    /// Table request, correlated by `id`.
    Request { id: u64, op: TableOp },
    /// Table response for request `id`.
    Response { id: u64, result: TableResult },
}
