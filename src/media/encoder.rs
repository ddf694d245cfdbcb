use anyhow::{bail, Result};
use bytes::Bytes;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use super::platform::{CaptureStream, Chunk, MediaEncoder};

/// Produces the encoded bytes for each delivered segment
pub trait SegmentSource: Send + Sync + 'static {
    /// Bytes for segment `sequence`, nominally `len` bytes long
    fn next_segment(&mut self, sequence: u64, len: usize) -> Bytes;
}

/// Encoder that delivers one segment per timeslice from a `SegmentSource`
///
/// Segment size follows the configured bitrate. On stop, the partial segment
/// since the last tick is delivered and then the channel closes.
pub struct PacedEncoder<S: SegmentSource> {
    name: String,
    stream: CaptureStream,
    bytes_per_sec: u64,
    source: Option<S>,
    stop_tx: Option<oneshot::Sender<()>>,
    recording: Arc<AtomicBool>,
}

impl<S: SegmentSource> PacedEncoder<S> {
    pub fn new(name: impl Into<String>, stream: CaptureStream, bitrate_kbps: u32, source: S) -> Self {
        Self {
            name: name.into(),
            stream,
            bytes_per_sec: u64::from(bitrate_kbps) * 1000 / 8,
            source: Some(source),
            stop_tx: None,
            recording: Arc::new(AtomicBool::new(false)),
        }
    }
}

fn segment_len(bytes_per_sec: u64, elapsed: Duration) -> usize {
    (bytes_per_sec * elapsed.as_millis() as u64 / 1000) as usize
}

#[async_trait::async_trait]
impl<S: SegmentSource> MediaEncoder for PacedEncoder<S> {
    async fn start(&mut self, timeslice: Duration) -> Result<mpsc::Receiver<Chunk>> {
        let Some(mut source) = self.source.take() else {
            bail!("Encoder {} cannot be started twice", self.name);
        };
        if timeslice.is_zero() {
            bail!("Timeslice must be greater than zero");
        }
        if !self.stream.is_live() {
            bail!("Capture stream {} has been released", self.stream.id());
        }

        let (chunk_tx, chunk_rx) = mpsc::channel(64);
        let (stop_tx, mut stop_rx) = oneshot::channel();
        self.stop_tx = Some(stop_tx);
        self.recording.store(true, Ordering::SeqCst);

        let stream = self.stream.clone();
        let recording = Arc::clone(&self.recording);
        let bytes_per_sec = self.bytes_per_sec;
        let name = self.name.clone();

        info!("{}: encoding every {}ms", name, timeslice.as_millis());

        tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + timeslice, timeslice);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            let mut segment_start = Instant::now();
            let mut sequence = 0u64;

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        if !stream.is_live() {
                            warn!("{}: capture stream ended, stopping", name);
                            break;
                        }
                        let len = segment_len(bytes_per_sec, segment_start.elapsed());
                        segment_start = Instant::now();
                        let chunk = Chunk::new(sequence, source.next_segment(sequence, len));
                        sequence += 1;
                        if chunk_tx.send(chunk).await.is_err() {
                            debug!("{}: chunk receiver dropped", name);
                            break;
                        }
                    }
                    _ = &mut stop_rx => {
                        // Final partial segment
                        let len = segment_len(bytes_per_sec, segment_start.elapsed());
                        let chunk = Chunk::new(sequence, source.next_segment(sequence, len));
                        sequence += 1;
                        let _ = chunk_tx.send(chunk).await;
                        break;
                    }
                }
            }

            recording.store(false, Ordering::SeqCst);
            debug!("{}: delivered {} segments", name, sequence);
        });

        Ok(chunk_rx)
    }

    async fn stop(&mut self) -> Result<()> {
        match self.stop_tx.take() {
            Some(stop_tx) => {
                // The delivery task may already have exited on its own
                let _ = stop_tx.send(());
                Ok(())
            }
            None => bail!("Encoder {} is not recording", self.name),
        }
    }

    fn is_recording(&self) -> bool {
        self.recording.load(Ordering::SeqCst)
    }

    fn name(&self) -> &str {
        &self.name
    }
}
