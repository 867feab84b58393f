//! TCP client for the hub: a [`BroadcastChannel`] and a [`LayoutStore`]
//! sharing one connection.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use tokio::sync::{mpsc, oneshot};
use tokio::time::{timeout, Duration};

use super::{BroadcastChannel, ChannelEvent, LayoutStore, StoreError};
use crate::protocol::{LayoutRow, Message, TableOp, TableResult, PROTOCOL_VERSION};
use crate::transport::{tcp::TcpTransport, Transport};

/// How long a table request may wait for its response.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

const OUTBOUND_CAPACITY: usize = 64;
const EVENT_CAPACITY: usize = 256;

type Pending = Arc<Mutex<HashMap<u64, oneshot::Sender<TableResult>>>>;

/// Perform the client side of the handshake and return the assigned id.
pub async fn client_handshake<T: Transport + ?Sized>(transport: &mut T, access_key: &str) -> anyhow::Result<u64> {
    transport
        .send(Message::Hello {
            version: PROTOCOL_VERSION,
            access_key: access_key.to_string(),
        })
        .await?;
    match transport.recv().await? {
        Message::HelloAck { version, client_id } if version == PROTOCOL_VERSION => Ok(client_id),
        Message::HelloAck { version, .. } => Err(anyhow::anyhow!(
            "Protocol version mismatch in HelloAck: expected {}, got {}",
            PROTOCOL_VERSION,
            version
        )),
        Message::Rejected { reason } => Err(anyhow::anyhow!("Hub rejected connection: {}", reason)),
        other => Err(anyhow::anyhow!("Expected HelloAck, got {:?}", other)),
    }
}

/// Subscribe to `topic` and wait for the confirmation.
pub async fn subscribe<T: Transport + ?Sized>(transport: &mut T, topic: &str) -> anyhow::Result<()> {
    transport
        .send(Message::Subscribe {
            topic: topic.to_string(),
        })
        .await?;
    match transport.recv().await? {
        Message::Subscribed { topic: joined } if joined == topic => Ok(()),
        other => Err(anyhow::anyhow!("Expected Subscribed for {}, got {:?}", topic, other)),
    }
}

struct Link {
    client_id: u64,
    outbound: mpsc::Sender<Message>,
    pending: Pending,
    next_request: AtomicU64,
}

impl Link {
    async fn send(&self, msg: Message) -> anyhow::Result<()> {
        self.outbound
            .send(msg)
            .await
            .map_err(|_| anyhow::anyhow!("Connection to hub closed"))
    }

    async fn request(&self, op: TableOp) -> Result<TableResult, StoreError> {
        let id = self.next_request.fetch_add(1, Ordering::SeqCst);
        let (tx, rx) = oneshot::channel();
        self.pending
            .lock()
            .map_err(|_| StoreError::Unavailable("pending map poisoned".to_string()))?
            .insert(id, tx);
        if let Err(e) = self.send(Message::Request { id, op }).await {
            self.forget(id);
            return Err(StoreError::Unavailable(e.to_string()));
        }
        match timeout(REQUEST_TIMEOUT, rx).await {
            Ok(Ok(result)) => Ok(result),
            Ok(Err(_)) => Err(StoreError::Unavailable("connection to hub closed".to_string())),
            Err(_) => {
                self.forget(id);
                Err(StoreError::Unavailable(format!(
                    "request {} timed out after {:?}",
                    id, REQUEST_TIMEOUT
                )))
            }
        }
    }

    fn forget(&self, id: u64) {
        if let Ok(mut pending) = self.pending.lock() {
            pending.remove(&id);
        }
    }
}

/// Connect to a hub, authenticate, and join `topic`.
pub async fn connect(endpoint: &str, access_key: &str, topic: &str) -> anyhow::Result<(RemoteChannel, RemoteLayoutStore)> {
    let mut transport = TcpTransport::connect(endpoint).await?;
    let client_id = client_handshake(&mut transport, access_key).await?;
    subscribe(&mut transport, topic).await?;
    log::info!("[remote] joined {} on {} as client {}", topic, endpoint, client_id);

    let (mut reader, mut writer) = transport.into_split();
    let (outbound, mut outbound_rx) = mpsc::channel::<Message>(OUTBOUND_CAPACITY);
    let (events_tx, events) = mpsc::channel::<ChannelEvent>(EVENT_CAPACITY);
    let pending: Pending = Arc::new(Mutex::new(HashMap::new()));

    tokio::spawn(async move {
        while let Some(msg) = outbound_rx.recv().await {
            if let Err(e) = writer.write_message(&msg).await {
                log::error!("[remote] write failed: {}", e);
                break;
            }
        }
        let _ = writer.shutdown().await;
    });

    let reader_pending = pending.clone();
    let our_topic = topic.to_string();
    tokio::spawn(async move {
        loop {
            match reader.read_message().await {
                Ok(Message::Broadcast { topic, event, payload, origin }) => {
                    if topic != our_topic {
                        log::debug!("[remote] ignoring broadcast on foreign topic {}", topic);
                        continue;
                    }
                    log::debug!("[remote] {} event from client {}", event, origin);
                    if events_tx.send(ChannelEvent { event, payload }).await.is_err() {
                        break;
                    }
                }
                Ok(Message::Response { id, result }) => {
                    let waiter = reader_pending.lock().ok().and_then(|mut p| p.remove(&id));
                    match waiter {
                        Some(tx) => {
                            let _ = tx.send(result);
                        }
                        None => log::warn!("[remote] response for unknown request {}", id),
                    }
                }
                Ok(other) => log::debug!("[remote] unexpected message {:?}", other),
                Err(e) => {
                    log::warn!("[remote] connection lost: {}", e);
                    break;
                }
            }
        }
        if let Ok(mut p) = reader_pending.lock() {
            p.clear();
        }
    });

    let link = Arc::new(Link {
        client_id,
        outbound,
        pending,
        next_request: AtomicU64::new(1),
    });
    Ok((
        RemoteChannel {
            link: link.clone(),
            topic: topic.to_string(),
            events,
        },
        RemoteLayoutStore { link },
    ))
}

/// Topic subscription over a hub connection.
pub struct RemoteChannel {
    link: Arc<Link>,
    topic: String,
    events: mpsc::Receiver<ChannelEvent>,
}

impl RemoteChannel {
    pub fn client_id(&self) -> u64 {
        self.link.client_id
    }
}

#[async_trait::async_trait]
impl BroadcastChannel for RemoteChannel {
    async fn publish(&mut self, event: &str, payload: String) -> anyhow::Result<()> {
        self.link
            .send(Message::Publish {
                topic: self.topic.clone(),
                event: event.to_string(),
                payload,
            })
            .await
    }

    async fn recv(&mut self) -> anyhow::Result<ChannelEvent> {
        self.events
            .recv()
            .await
            .ok_or_else(|| anyhow::anyhow!("Connection to hub closed"))
    }
}

/// Layouts table served by the hub.
#[derive(Clone)]
pub struct RemoteLayoutStore {
    link: Arc<Link>,
}

fn unexpected(result: TableResult) -> StoreError {
    match result {
        TableResult::Conflict { name } => StoreError::Conflict(name),
        TableResult::Failed { reason } => StoreError::Unavailable(reason),
        other => StoreError::Unavailable(format!("unexpected table result {:?}", other)),
    }
}

#[async_trait::async_trait]
impl LayoutStore for RemoteLayoutStore {
    async fn names(&self) -> Result<Vec<String>, StoreError> {
        match self.link.request(TableOp::ListNames).await? {
            TableResult::Names(names) => Ok(names),
            other => Err(unexpected(other)),
        }
    }

    async fn fetch(&self, name: &str) -> Result<Option<LayoutRow>, StoreError> {
        match self.link.request(TableOp::Fetch { name: name.to_string() }).await? {
            TableResult::Row(row) => Ok(row),
            other => Err(unexpected(other)),
        }
    }

    async fn insert(&self, row: LayoutRow) -> Result<(), StoreError> {
        match self.link.request(TableOp::Insert { row }).await? {
            TableResult::Done => Ok(()),
            other => Err(unexpected(other)),
        }
    }

    async fn upsert(&self, row: LayoutRow) -> Result<(), StoreError> {
        match self.link.request(TableOp::Upsert { row }).await? {
            TableResult::Done => Ok(()),
            other => Err(unexpected(other)),
        }
    }
}
