use anyhow::{bail, Result};
use bytes::Bytes;
use tracing::info;

use super::encoder::{PacedEncoder, SegmentSource};
use super::platform::{
    Capabilities, CaptureStream, MediaConstraints, MediaEncoder, MediaPlatform,
};
use super::profile::RecorderProfile;

/// EBML magic shared by Matroska and WebM files
const EBML_MAGIC: [u8; 4] = [0x1A, 0x45, 0xDF, 0xA3];

/// Platform backed by a generated test-pattern camera
///
/// Useful for headless runs: every capability is present and capture
/// permission is always granted.
pub struct SyntheticPlatform {
    bitrate_kbps: u32,
}

impl SyntheticPlatform {
    pub fn new(bitrate_kbps: u32) -> Self {
        Self { bitrate_kbps }
    }
}

#[async_trait::async_trait]
impl MediaPlatform for SyntheticPlatform {
    fn capabilities(&self) -> Capabilities {
        Capabilities {
            capture: true,
            encoder_mime_types: vec![
                RecorderProfile::matroska().mime_type(),
                RecorderProfile::webm().mime_type(),
            ],
            file_access: true,
        }
    }

    async fn request_stream(&self, constraints: MediaConstraints) -> Result<CaptureStream> {
        if !constraints.video && !constraints.audio {
            bail!("At least one of video or audio must be requested");
        }

        let stream = CaptureStream::new(constraints);
        info!(
            "Synthetic camera opened: {} (video={}, audio={})",
            stream.id(),
            constraints.video,
            constraints.audio
        );
        Ok(stream)
    }

    fn create_encoder(
        &self,
        stream: &CaptureStream,
        profile: &RecorderProfile,
    ) -> Result<Box<dyn MediaEncoder>> {
        let name = format!("synthetic[{}]", profile.mime_type());
        Ok(Box::new(PacedEncoder::new(
            name,
            stream.clone(),
            self.bitrate_kbps,
            TestPattern,
        )))
    }
}

/// Deterministic filler data; the first segment opens with the EBML magic
struct TestPattern;

impl SegmentSource for TestPattern {
    fn next_segment(&mut self, sequence: u64, len: usize) -> Bytes {
        let mut data: Vec<u8> = (0..len)
            .map(|i| (sequence as u8).wrapping_add(i as u8))
            .collect();

        if sequence == 0 {
            let n = EBML_MAGIC.len().min(data.len());
            data[..n].copy_from_slice(&EBML_MAGIC[..n]);
        }

        Bytes::from(data)
    }
}
