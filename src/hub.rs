//! TCP hub standing in for the hosted service: it fans out topic
//! broadcasts and serves the layouts table.
//!
//! Every connection gets a reader task (this module's loop) and a writer
//! task fed through an mpsc queue, so broadcasts never interleave with a
//! partially written response.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{broadcast, mpsc, watch};
use tokio::task::JoinHandle;

use crate::protocol::{LayoutRow, Message, TableOp, TableResult, PROTOCOL_VERSION};
use crate::transport::{tcp::TcpTransport, Transport};

const TOPIC_CAPACITY: usize = 256;
const OUTBOUND_CAPACITY: usize = 256;

/// Runtime settings of a hub.
#[derive(Debug, Clone)]
pub struct HubConfig {
    pub bind: String,
    pub access_key: String,
    /// JSON file the layouts table is loaded from and saved to.
    pub data_file: Option<PathBuf>,
}

#[derive(Debug, Clone)]
struct Envelope {
    origin: u64,
    event: String,
    payload: String,
}

struct HubState {
    access_key: String,
    topics: Mutex<HashMap<String, broadcast::Sender<Envelope>>>,
    table: Mutex<BTreeMap<String, String>>,
    /// Latest table for the persister task, when a data file is set.
    saved: Option<watch::Sender<BTreeMap<String, String>>>,
    next_client: AtomicU64,
}

impl HubState {
    fn topic(&self, name: &str) -> broadcast::Sender<Envelope> {
        let mut topics = match self.topics.lock() {
            Ok(t) => t,
            Err(poisoned) => poisoned.into_inner(),
        };
        topics
            .entry(name.to_string())
            .or_insert_with(|| broadcast::channel(TOPIC_CAPACITY).0)
            .clone()
    }

    /// Apply a table operation. Writes hand the new table to the persister
    /// while the lock is still held, so snapshots arrive in order.
    fn execute(&self, op: TableOp) -> TableResult {
        let mut table = match self.table.lock() {
            Ok(t) => t,
            Err(_) => {
                return TableResult::Failed {
                    reason: "table lock poisoned".to_string(),
                }
            }
        };
        match op {
            TableOp::ListNames => TableResult::Names(table.keys().cloned().collect()),
            TableOp::Fetch { name } => {
                let row = table.get(&name).map(|data| LayoutRow::new(name.clone(), data.clone()));
                TableResult::Row(row)
            }
            TableOp::Insert { row } => {
                if table.contains_key(&row.name) {
                    return TableResult::Conflict { name: row.name };
                }
                table.insert(row.name, row.data);
                self.save(&table);
                TableResult::Done
            }
            TableOp::Upsert { row } => {
                table.insert(row.name, row.data);
                self.save(&table);
                TableResult::Done
            }
        }
    }

    fn save(&self, table: &BTreeMap<String, String>) {
        if let Some(saved) = &self.saved {
            saved.send_replace(table.clone());
        }
    }
}

/// Write each new table snapshot to `path`, newest only. Runs until the hub
/// state is dropped.
async fn run_persister(path: PathBuf, mut snapshots: watch::Receiver<BTreeMap<String, String>>) {
    while snapshots.changed().await.is_ok() {
        let snapshot = snapshots.borrow_and_update().clone();
        if let Err(e) = write_table(&path, &snapshot).await {
            log::error!("[hub] failed to write {}: {}", path.display(), e);
        }
    }
}

/// Replace the table file through a temporary sibling and a rename.
async fn write_table(path: &Path, table: &BTreeMap<String, String>) -> anyhow::Result<()> {
    let data = serde_json::to_vec_pretty(table).map_err(|e| anyhow::anyhow!("Failed to encode table: {}", e))?;
    let tmp = temp_path(path);
    tokio::fs::write(&tmp, data).await?;
    tokio::fs::rename(&tmp, path).await?;
    Ok(())
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Read a persisted table, treating a missing file as empty.
async fn load_table(path: &Path) -> anyhow::Result<BTreeMap<String, String>> {
    match tokio::fs::read(path).await {
        Ok(bytes) => serde_json::from_slice(&bytes)
            .map_err(|e| anyhow::anyhow!("Malformed table file {}: {}", path.display(), e)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
        Err(e) => Err(anyhow::anyhow!("Failed to read {}: {}", path.display(), e)),
    }
}

/// A bound hub ready to accept clients.
pub struct Hub {
    listener: TcpListener,
    state: Arc<HubState>,
}

impl Hub {
    pub async fn bind(config: HubConfig) -> anyhow::Result<Self> {
        let table = match &config.data_file {
            Some(path) => load_table(path).await?,
            None => BTreeMap::new(),
        };
        let listener = TcpListener::bind(&config.bind).await?;
        log::info!(
            "[hub] listening on {} with {} stored layouts",
            listener.local_addr()?,
            table.len()
        );
        let saved = config.data_file.map(|path| {
            let (tx, rx) = watch::channel(table.clone());
            tokio::spawn(run_persister(path, rx));
            tx
        });
        Ok(Self {
            listener,
            state: Arc::new(HubState {
                access_key: config.access_key,
                topics: Mutex::new(HashMap::new()),
                table: Mutex::new(table),
                saved,
                next_client: AtomicU64::new(1),
            }),
        })
    }

    pub fn local_addr(&self) -> anyhow::Result<std::net::SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Accept clients until the listener fails.
    pub async fn run(self) -> anyhow::Result<()> {
        loop {
            let (stream, addr) = self.listener.accept().await?;
            let state = self.state.clone();
            tokio::spawn(async move {
                if let Err(e) = serve_client(state, stream).await {
                    log::warn!("[hub] client {} ended: {}", addr, e);
                }
            });
        }
    }

    /// Run the hub on a background task.
    pub fn spawn(self) -> JoinHandle<anyhow::Result<()>> {
        tokio::spawn(self.run())
    }
}

/// Hub side of the handshake. Returns the id assigned to the client.
pub async fn accept_handshake<T: Transport + ?Sized>(
    transport: &mut T,
    access_key: &str,
    client_id: u64,
) -> anyhow::Result<u64> {
    match transport.recv().await? {
        Message::Hello { version, .. } if version != PROTOCOL_VERSION => {
            let reason = format!("protocol version {} unsupported, expected {}", version, PROTOCOL_VERSION);
            transport.send(Message::Rejected { reason: reason.clone() }).await?;
            Err(anyhow::anyhow!(reason))
        }
        Message::Hello { access_key: offered, .. } if offered != access_key => {
            transport
                .send(Message::Rejected {
                    reason: "invalid access key".to_string(),
                })
                .await?;
            Err(anyhow::anyhow!("client offered an invalid access key"))
        }
        Message::Hello { .. } => {
            transport
                .send(Message::HelloAck {
                    version: PROTOCOL_VERSION,
                    client_id,
                })
                .await?;
            Ok(client_id)
        }
        other => Err(anyhow::anyhow!("Expected Hello, got {:?}", other)),
    }
}

async fn serve_client(state: Arc<HubState>, stream: TcpStream) -> anyhow::Result<()> {
    let mut transport = TcpTransport::new(stream);
    let client_id = state.next_client.fetch_add(1, Ordering::SeqCst);
    accept_handshake(&mut transport, &state.access_key, client_id).await?;
    log::info!("[hub] client {} connected", client_id);

    let (mut reader, mut writer) = transport.into_split();
    let (outbound, mut outbound_rx) = mpsc::channel::<Message>(OUTBOUND_CAPACITY);
    let writer_task = tokio::spawn(async move {
        while let Some(msg) = outbound_rx.recv().await {
            if let Err(e) = writer.write_message(&msg).await {
                log::debug!("[hub] write to client {} failed: {}", client_id, e);
                break;
            }
        }
    });

    let mut forwarders: Vec<JoinHandle<()>> = Vec::new();
    let result = loop {
        let msg = match reader.read_message().await {
            Ok(msg) => msg,
            Err(e) => break Err(e),
        };
        match msg {
            Message::Subscribe { topic } => {
                // The ack is queued before the forwarder starts.
                let mut rx = state.topic(&topic).subscribe();
                log::info!("[hub] client {} subscribed to {}", client_id, topic);
                if outbound.send(Message::Subscribed { topic: topic.clone() }).await.is_err() {
                    break Ok(());
                }
                let out = outbound.clone();
                let forward_topic = topic.clone();
                forwarders.push(tokio::spawn(async move {
                    loop {
                        match rx.recv().await {
                            Ok(env) if env.origin == client_id => continue,
                            Ok(env) => {
                                let msg = Message::Broadcast {
                                    topic: forward_topic.clone(),
                                    event: env.event,
                                    payload: env.payload,
                                    origin: env.origin,
                                };
                                if out.send(msg).await.is_err() {
                                    break;
                                }
                            }
                            Err(broadcast::error::RecvError::Lagged(n)) => {
                                log::warn!("[hub] client {} lagged on {}, {} events dropped", client_id, forward_topic, n);
                            }
                            Err(broadcast::error::RecvError::Closed) => break,
                        }
                    }
                }));
            }
            Message::Publish { topic, event, payload } => {
                // Nobody subscribed is not an error.
                let _ = state.topic(&topic).send(Envelope {
                    origin: client_id,
                    event,
                    payload,
                });
            }
            Message::Request { id, op } => {
                let result = state.execute(op);
                if outbound.send(Message::Response { id, result }).await.is_err() {
                    break Ok(());
                }
            }
            other => log::debug!("[hub] client {} sent unexpected {:?}", client_id, other),
        }
    };

    for f in forwarders {
        f.abort();
    }
    drop(outbound);
    let _ = writer_task.await;
    log::info!("[hub] client {} disconnected", client_id);
    match result {
        Err(e) if e.to_string().contains("closed by peer") => Ok(()),
        other => other,
    }
}
