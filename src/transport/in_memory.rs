use tokio::sync::mpsc;

use crate::protocol::Message;
use crate::transport::Transport;

/// Queue depth of each direction.
const CAPACITY: usize = 64;

/// Connected pair of in-process transports.
pub struct InMemoryTransport {
    tx: Option<mpsc::Sender<Message>>,
    rx: mpsc::Receiver<Message>,
}

impl InMemoryTransport {
    pub fn pair() -> (Self, Self) {
        let (tx_a, rx_b) = mpsc::channel(CAPACITY);
        let (tx_b, rx_a) = mpsc::channel(CAPACITY);
        (
            Self { tx: Some(tx_a), rx: rx_a },
            Self { tx: Some(tx_b), rx: rx_b },
        )
    }

    /// Stop sending. The peer sees the channel close once drained.
    pub fn shutdown(&mut self) {
        self.tx = None;
    }
}

#[async_trait::async_trait]
impl Transport for InMemoryTransport {
    async fn send(&mut self, msg: Message) -> anyhow::Result<()> {
        let tx = self.tx.as_ref().ok_or_else(|| anyhow::anyhow!("Transport is shut down"))?;
        tx.send(msg).await.map_err(|_| anyhow::anyhow!("Channel closed"))
    }

    async fn recv(&mut self) -> anyhow::Result<Message> {
        self.rx.recv().await.ok_or_else(|| anyhow::anyhow!("Channel closed"))
    }
}
