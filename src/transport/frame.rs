//! Length-prefixed bincode framing over any async byte stream.
//!
//! Each frame is a 4-byte big-endian length followed by the encoded
//! [`Message`]. Oversized and empty frames are refused on both sides.

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::protocol::{Message, MAX_FRAME_SIZE};

fn map_io(e: std::io::Error) -> anyhow::Error {
    match e.kind() {
        std::io::ErrorKind::UnexpectedEof => anyhow::anyhow!("Connection closed by peer"),
        std::io::ErrorKind::ConnectionReset | std::io::ErrorKind::BrokenPipe => {
            anyhow::anyhow!("Connection reset by peer")
        }
        _ => anyhow::anyhow!("I/O error: {}", e),
    }
}

/// Reads frames from the read half of a stream.
pub struct FrameReader<R> {
    inner: R,
    max_frame_size: u32,
}

impl<R: AsyncRead + Unpin + Send> FrameReader<R> {
    pub fn new(inner: R) -> Self {
        Self::with_limit(inner, MAX_FRAME_SIZE)
    }

    pub fn with_limit(inner: R, max_frame_size: u32) -> Self {
        Self { inner, max_frame_size }
    }

    /// Read the next message. Not cancel-safe; keep it on its own task.
    pub async fn read_message(&mut self) -> anyhow::Result<Message> {
        let mut len_buf = [0u8; 4];
        self.inner.read_exact(&mut len_buf).await.map_err(map_io)?;
        let len = u32::from_be_bytes(len_buf);
        if len == 0 {
            return Err(anyhow::anyhow!("Invalid frame length: 0"));
        }
        if len > self.max_frame_size {
            return Err(anyhow::anyhow!(
                "Frame too large: {} bytes (max: {})",
                len,
                self.max_frame_size
            ));
        }
        let mut buf = vec![0u8; len as usize];
        self.inner.read_exact(&mut buf).await.map_err(map_io)?;
        bincode::deserialize(&buf).map_err(|e| anyhow::anyhow!("Deserialization error: {}", e))
    }
}

/// Writes frames to the write half of a stream.
pub struct FrameWriter<W> {
    inner: W,
    max_frame_size: u32,
}

impl<W: AsyncWrite + Unpin + Send> FrameWriter<W> {
    pub fn new(inner: W) -> Self {
        Self::with_limit(inner, MAX_FRAME_SIZE)
    }

    pub fn with_limit(inner: W, max_frame_size: u32) -> Self {
        Self { inner, max_frame_size }
    }

    pub async fn write_message(&mut self, msg: &Message) -> anyhow::Result<()> {
        let data = bincode::serialize(msg).map_err(|e| anyhow::anyhow!("Serialization error: {}", e))?;
        if data.len() as u64 > self.max_frame_size as u64 {
            return Err(anyhow::anyhow!(
                "Frame too large: {} bytes (max: {})",
                data.len(),
                self.max_frame_size
            ));
        }
        let len = (data.len() as u32).to_be_bytes();
        self.inner.write_all(&len).await.map_err(map_io)?;
        self.inner.write_all(&data).await.map_err(map_io)?;
        self.inner.flush().await.map_err(map_io)?;
        Ok(())
    }

    /// Close the write direction.
    pub async fn shutdown(&mut self) -> anyhow::Result<()> {
        self.inner.shutdown().await.map_err(map_io)
    }
}
