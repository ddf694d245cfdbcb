use anyhow::{Context, Result};
use bytes::Bytes;
use std::path::{Path, PathBuf};
use tracing::info;

use super::encoder::{PacedEncoder, SegmentSource};
use super::platform::{
    Capabilities, CaptureStream, MediaConstraints, MediaEncoder, MediaPlatform,
};
use super::profile::RecorderProfile;

/// Platform that "captures" by replaying an existing media file
///
/// The file is read once when the platform is created. Each recording
/// replays it from the start; after the end, empty segments are delivered.
pub struct ReplayPlatform {
    path: PathBuf,
    data: Bytes,
    bitrate_kbps: u32,
}

impl ReplayPlatform {
    pub async fn open(path: impl AsRef<Path>, bitrate_kbps: u32) -> Result<Self> {
        let path = path.as_ref();
        info!("Opening replay source: {}", path.display());

        let data = tokio::fs::read(path)
            .await
            .with_context(|| format!("Failed to read replay source: {}", path.display()))?;

        info!("Replay source loaded: {} bytes", data.len());

        Ok(Self {
            path: path.to_path_buf(),
            data: Bytes::from(data),
            bitrate_kbps,
        })
    }
}

#[async_trait::async_trait]
impl MediaPlatform for ReplayPlatform {
    fn capabilities(&self) -> Capabilities {
        // The replayed bytes are written as-is, so any profile is accepted
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
        Ok(CaptureStream::new(constraints))
    }

    fn create_encoder(
        &self,
        stream: &CaptureStream,
        _profile: &RecorderProfile,
    ) -> Result<Box<dyn MediaEncoder>> {
        let name = format!("replay[{}]", self.path.display());
        let cursor = ReplayCursor {
            data: self.data.clone(),
            offset: 0,
        };
        Ok(Box::new(PacedEncoder::new(
            name,
            stream.clone(),
            self.bitrate_kbps,
            cursor,
        )))
    }
}

struct ReplayCursor {
    data: Bytes,
    offset: usize,
}

impl SegmentSource for ReplayCursor {
    fn next_segment(&mut self, _sequence: u64, len: usize) -> Bytes {
        let end = (self.offset + len).min(self.data.len());
        let segment = self.data.slice(self.offset..end);
        self.offset = end;
        segment
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cursor_slices_then_runs_dry() {
        let mut cursor = ReplayCursor {
            data: Bytes::from_static(b"0123456789"),
            offset: 0,
        };

        assert_eq!(cursor.next_segment(0, 4).as_ref(), b"0123");
        assert_eq!(cursor.next_segment(1, 4).as_ref(), b"4567");
        assert_eq!(cursor.next_segment(2, 4).as_ref(), b"89");
        assert!(cursor.next_segment(3, 4).is_empty());
    }
}
