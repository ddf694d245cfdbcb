use anyhow::{anyhow, Context};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{error, info, warn};

use super::chunk::{ChunkBuffer, ChunkCollector};
use super::state::{RecordCommand, RecordControls, RecordState, RecordStatus};
use crate::error::ControlError;
use crate::events::{EventSink, UiEvent};
use crate::media::{CaptureStream, MediaConstraints, MediaEncoder, MediaPlatform, RecorderProfile};
use crate::storage::{FilePersistence, SaveOutcome};

/// How the controller decides that all chunks have arrived after stop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinalizePolicy {
    /// Wait for the encoder to close its chunk channel, bounded by `timeout`
    AwaitStop { timeout: Duration },
    /// Sleep a fixed delay and use whatever has arrived
    FixedDelay(Duration),
}

impl Default for FinalizePolicy {
    fn default() -> Self {
        Self::AwaitStop {
            timeout: Duration::from_secs(5),
        }
    }
}

/// Recording parameters for a Record Area session
#[derive(Debug, Clone)]
pub struct RecorderSettings {
    pub profile: RecorderProfile,
    /// Interval between delivered chunks
    pub timeslice: Duration,
    pub finalize: FinalizePolicy,
}

impl Default for RecorderSettings {
    fn default() -> Self {
        Self {
            profile: RecorderProfile::default(),
            timeslice: Duration::from_millis(1000),
            finalize: FinalizePolicy::default(),
        }
    }
}

struct ActiveRecording {
    encoder: Box<dyn MediaEncoder>,
    collector: ChunkCollector,
    started_at: DateTime<Utc>,
}

/// Drives one Record Area session: stream, recorder, chunks, save
///
/// Constructed when the Record Area is built and consumed by `teardown` when
/// the area is switched away.
pub struct RecordController {
    settings: RecorderSettings,
    platform: Arc<dyn MediaPlatform>,
    persistence: FilePersistence,
    events: EventSink,
    stream: CaptureStream,
    status: Arc<watch::Sender<RecordStatus>>,
    active: Option<ActiveRecording>,
}

/// Result of building the Record Area
pub enum RecordSetup {
    /// Controls wired, state `Normal`
    Ready(RecordController),
    /// A capability check failed; the user was alerted
    Unsupported(String),
    /// The capture request was refused
    Denied,
}

impl RecordController {
    /// Check capabilities, acquire a capture stream and wire the controls
    pub async fn setup(
        settings: RecorderSettings,
        platform: Arc<dyn MediaPlatform>,
        persistence: FilePersistence,
        events: EventSink,
    ) -> RecordSetup {
        events.emit(UiEvent::RecordState {
            state: RecordState::Normal,
            controls: RecordControls::disabled(),
        });

        if let Err(missing) = platform.capabilities().check(&settings.profile) {
            warn!("Record area unavailable: {}", missing);
            let message = missing.to_string();
            events.emit(UiEvent::Alert {
                message: message.clone(),
            });
            return RecordSetup::Unsupported(message);
        }

        let constraints = MediaConstraints::for_profile(&settings.profile);
        let stream = match platform.request_stream(constraints).await {
            Ok(stream) => stream,
            Err(e) => {
                info!("Capture request refused: {:#}", e);
                return RecordSetup::Denied;
            }
        };

        info!(
            "Capture stream {} acquired (audio: {})",
            stream.id(),
            stream.constraints().audio
        );
        events.emit(UiEvent::PreviewAttached {
            stream_id: stream.id(),
        });

        let controller = Self {
            settings,
            platform,
            persistence,
            events,
            stream,
            status: Arc::new(watch::channel(RecordStatus::default()).0),
            active: None,
        };
        controller.publish_state();

        RecordSetup::Ready(controller)
    }

    pub fn state(&self) -> RecordState {
        self.status.borrow().state
    }

    pub fn controls(&self) -> RecordControls {
        self.state().controls()
    }

    /// Follow state and chunk count without borrowing the controller
    pub fn watch_status(&self) -> watch::Receiver<RecordStatus> {
        self.status.subscribe()
    }

    pub fn stream(&self) -> &CaptureStream {
        &self.stream
    }

    pub fn profile(&self) -> &RecorderProfile {
        &self.settings.profile
    }

    /// Number of non-empty chunks received by the current recording
    pub async fn chunk_count(&self) -> usize {
        match &self.active {
            Some(active) => active.collector.chunk_count().await,
            None => 0,
        }
    }

    /// Start a new recording with an empty chunk sequence
    pub async fn start(&mut self) -> Result<(), ControlError> {
        let next = self.state().apply(RecordCommand::Start)?;

        let buffer = Arc::new(tokio::sync::Mutex::new(ChunkBuffer::default()));

        let mut encoder = self
            .platform
            .create_encoder(&self.stream, &self.settings.profile)
            .context("Failed to create encoder")?;

        let chunk_rx = encoder
            .start(self.settings.timeslice)
            .await
            .context("Failed to start encoder")?;

        info!(
            "Started recording with {} ({})",
            encoder.name(),
            self.settings.profile.mime_type()
        );

        self.set_state(next);

        let status = Arc::clone(&self.status);
        let collector = ChunkCollector::spawn_reporting(buffer, chunk_rx, move |count| {
            status.send_if_modified(|status| {
                // Late reports from an aborted collector are ignored
                if status.state == RecordState::Normal {
                    return false;
                }
                status.chunks_buffered = count;
                true
            });
        });

        self.active = Some(ActiveRecording {
            encoder,
            collector,
            started_at: Utc::now(),
        });

        Ok(())
    }

    /// Stop the recording, concatenate its chunks and save them
    ///
    /// The state is `Processing` until the save returns and `Normal` afterwards,
    /// whether the save succeeded, was cancelled or failed.
    pub async fn stop_and_save(&mut self) -> Result<SaveOutcome, ControlError> {
        let next = self.state().apply(RecordCommand::Stop)?;
        let mut active = self
            .active
            .take()
            .ok_or_else(|| anyhow!("No active recorder while recording"))?;

        self.set_state(next);

        if let Err(e) = active.encoder.stop().await {
            warn!("Failed to stop {}: {:#}", active.encoder.name(), e);
        }

        let elapsed = Utc::now().signed_duration_since(active.started_at);
        info!(
            "Stopped recording after {:.1}s",
            elapsed.num_milliseconds() as f64 / 1000.0
        );

        let chunks = match self.settings.finalize {
            FinalizePolicy::AwaitStop { timeout } => active.collector.finish(timeout).await,
            FinalizePolicy::FixedDelay(delay) => active.collector.finish_after(delay).await,
        };

        let blob = chunks.concat();
        info!(
            "Recording finalized: {} chunks, {} bytes ({} empty skipped)",
            chunks.len(),
            blob.len(),
            chunks.skipped_empty()
        );

        let result = self.persistence.save(&blob, &self.settings.profile).await;

        let finished = self.state().apply(RecordCommand::Finish)?;
        self.set_state(finished);

        match result {
            Ok(outcome) => {
                self.events.emit(UiEvent::Saved {
                    outcome: outcome.clone(),
                });
                Ok(outcome)
            }
            Err(e) => {
                error!("Failed to save recording: {:#}", e);
                Err(e.into())
            }
        }
    }

    /// Tear down the session: abandon any recording and release the stream
    pub async fn teardown(mut self) {
        if let Some(mut active) = self.active.take() {
            let dropped = active.collector.chunk_count().await;
            warn!(
                "Record area closed while {}; discarding {} chunks",
                self.state(),
                dropped
            );
            if let Err(e) = active.encoder.stop().await {
                warn!("Failed to stop {}: {:#}", active.encoder.name(), e);
            }
            active.collector.abort();
        }

        self.stream.release();
        info!("Capture stream {} released", self.stream.id());
    }

    fn set_state(&mut self, state: RecordState) {
        self.status.send_modify(|status| {
            status.state = state;
            if state == RecordState::Normal {
                status.chunks_buffered = 0;
            }
        });
        self.publish_state();
    }

    fn publish_state(&self) {
        let state = self.state();
        self.events.emit(UiEvent::RecordState {
            state,
            controls: state.controls(),
        });
    }
}

impl Drop for RecordController {
    fn drop(&mut self) {
        if let Some(active) = self.active.take() {
            active.collector.abort();
        }
        self.stream.release();
    }
}
