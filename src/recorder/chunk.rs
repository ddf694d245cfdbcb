use bytes::{Bytes, BytesMut};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::media::Chunk;

/// Ordered chunks of one recording
#[derive(Debug, Default)]
pub struct ChunkBuffer {
    chunks: Vec<Chunk>,
    total_bytes: usize,
    skipped_empty: usize,
}

impl ChunkBuffer {
    /// Append a chunk; empty chunks are counted but never stored
    pub fn push(&mut self, chunk: Chunk) -> bool {
        if chunk.is_empty() {
            self.skipped_empty += 1;
            return false;
        }
        self.total_bytes += chunk.len();
        self.chunks.push(chunk);
        true
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    pub fn total_bytes(&self) -> usize {
        self.total_bytes
    }

    pub fn skipped_empty(&self) -> usize {
        self.skipped_empty
    }

    /// Concatenate all chunks in delivery order, no framing
    pub fn concat(&self) -> Bytes {
        let mut blob = BytesMut::with_capacity(self.total_bytes);
        for chunk in &self.chunks {
            blob.extend_from_slice(&chunk.data);
        }
        blob.freeze()
    }
}

/// Receives chunks from an encoder into a shared `ChunkBuffer`
///
/// The collector task ends when the encoder closes its channel, which is the
/// "recorder fully stopped" signal.
pub struct ChunkCollector {
    buffer: Arc<Mutex<ChunkBuffer>>,
    handle: JoinHandle<()>,
}

impl ChunkCollector {
    /// Start collecting into `buffer`
    pub fn spawn(buffer: Arc<Mutex<ChunkBuffer>>, chunk_rx: mpsc::Receiver<Chunk>) -> Self {
        Self::spawn_reporting(buffer, chunk_rx, |_| {})
    }

    /// Start collecting into `buffer`, calling `on_stored` with the new
    /// chunk count after every stored chunk
    pub fn spawn_reporting<F>(
        buffer: Arc<Mutex<ChunkBuffer>>,
        mut chunk_rx: mpsc::Receiver<Chunk>,
        on_stored: F,
    ) -> Self
    where
        F: Fn(usize) + Send + 'static,
    {
        let shared = Arc::clone(&buffer);
        let handle = tokio::spawn(async move {
            while let Some(chunk) = chunk_rx.recv().await {
                let sequence = chunk.sequence;
                let size = chunk.len();
                let mut buffer = shared.lock().await;
                if buffer.push(chunk) {
                    on_stored(buffer.len());
                    debug!("Chunk {} received ({} bytes)", sequence, size);
                } else {
                    debug!("Chunk {} was empty, skipped", sequence);
                }
            }
        });

        Self { buffer, handle }
    }

    pub async fn chunk_count(&self) -> usize {
        self.buffer.lock().await.len()
    }

    /// Wait for the encoder to close its channel, at most `timeout`
    ///
    /// On timeout, whatever arrived so far is returned.
    pub async fn finish(mut self, timeout: Duration) -> ChunkBuffer {
        match tokio::time::timeout(timeout, &mut self.handle).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => warn!("Chunk collector failed: {}", e),
            Err(_) => {
                warn!(
                    "Encoder did not finish within {}ms, flushing received chunks",
                    timeout.as_millis()
                );
                self.handle.abort();
            }
        }
        self.take().await
    }

    /// Wait a fixed delay, then take whatever arrived
    ///
    /// Chunks delivered after the delay are lost.
    pub async fn finish_after(self, delay: Duration) -> ChunkBuffer {
        tokio::time::sleep(delay).await;
        self.handle.abort();
        self.take().await
    }

    /// Stop collecting and drop everything received
    pub fn abort(self) {
        self.handle.abort();
    }

    async fn take(self) -> ChunkBuffer {
        std::mem::take(&mut *self.buffer.lock().await)
    }
}
