use anyhow::Result;
use bytes::Bytes;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::mpsc;
use uuid::Uuid;

use super::profile::RecorderProfile;

/// Which tracks to request from the capture device
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MediaConstraints {
    pub video: bool,
    pub audio: bool,
}

impl MediaConstraints {
    /// Constraints implied by a recorder profile (video always on)
    pub fn for_profile(profile: &RecorderProfile) -> Self {
        Self {
            video: true,
            audio: profile.audio_enabled,
        }
    }
}

/// Handle to a live capture source
///
/// Clones share liveness: releasing one releases them all.
#[derive(Debug, Clone)]
pub struct CaptureStream {
    id: Uuid,
    constraints: MediaConstraints,
    live: Arc<AtomicBool>,
}

impl CaptureStream {
    pub fn new(constraints: MediaConstraints) -> Self {
        Self {
            id: Uuid::new_v4(),
            constraints,
            live: Arc::new(AtomicBool::new(true)),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn constraints(&self) -> MediaConstraints {
        self.constraints
    }

    pub fn is_live(&self) -> bool {
        self.live.load(Ordering::SeqCst)
    }

    /// Stop all tracks of this stream
    pub fn release(&self) {
        self.live.store(false, Ordering::SeqCst);
    }
}

/// One unit of encoded media delivered by an encoder
#[derive(Debug, Clone)]
pub struct Chunk {
    /// Delivery order, starting at 0 for each recording
    pub sequence: u64,
    /// Encoded bytes (may be empty; empty chunks are never stored)
    pub data: Bytes,
}

impl Chunk {
    pub fn new(sequence: u64, data: impl Into<Bytes>) -> Self {
        Self {
            sequence,
            data: data.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Feature-detection results for a hosting platform
#[derive(Debug, Clone, Default)]
pub struct Capabilities {
    /// Stream capture from camera/microphone
    pub capture: bool,
    /// Encoder MIME types the platform can record
    pub encoder_mime_types: Vec<String>,
    /// File-system access through pickers
    pub file_access: bool,
}

/// A capability check that failed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MissingCapability {
    #[error("Devices access is not accepted.")]
    Capture,
    #[error("Recording as {0} is not supported.")]
    Encoding(String),
    #[error("File system access is not supported.")]
    FileAccess,
}

impl Capabilities {
    /// Check everything the Record Area needs for `profile`
    pub fn check(&self, profile: &RecorderProfile) -> Result<(), MissingCapability> {
        if !self.capture {
            return Err(MissingCapability::Capture);
        }

        let mime = profile.mime_type();
        if !self.encoder_mime_types.iter().any(|m| m == &mime) {
            return Err(MissingCapability::Encoding(mime));
        }

        if !self.file_access {
            return Err(MissingCapability::FileAccess);
        }

        Ok(())
    }
}

/// Media encoder bound to one capture stream
///
/// Implementations:
/// - Synthetic: generated data at a fixed bitrate
/// - Replay: slices of an existing media file
#[async_trait::async_trait]
pub trait MediaEncoder: Send + Sync {
    /// Begin encoding, delivering a chunk every `timeslice`
    ///
    /// The returned channel closes once the encoder has fully stopped and the
    /// final segment has been delivered.
    async fn start(&mut self, timeslice: Duration) -> Result<mpsc::Receiver<Chunk>>;

    /// Ask the encoder to stop; delivery of the final segment may still be pending
    async fn stop(&mut self) -> Result<()>;

    /// Check if the encoder is currently recording
    fn is_recording(&self) -> bool;

    /// Get encoder name for logging
    fn name(&self) -> &str;
}

/// Hosting platform: device capture and encoding capabilities
#[async_trait::async_trait]
pub trait MediaPlatform: Send + Sync {
    /// Feature detection, performed before using any capability
    fn capabilities(&self) -> Capabilities;

    /// Request a capture stream (may prompt for permission)
    async fn request_stream(&self, constraints: MediaConstraints) -> Result<CaptureStream>;

    /// Create an encoder bound to `stream` using the profile's container and codec
    fn create_encoder(
        &self,
        stream: &CaptureStream,
        profile: &RecorderProfile,
    ) -> Result<Box<dyn MediaEncoder>>;
}
