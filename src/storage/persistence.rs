use anyhow::{Context, Result};
use bytes::Bytes;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

use super::picker::{media_type_for, FilePicker, FileTypeFilter};
use crate::media::RecorderProfile;

/// Result of a save request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "lowercase")]
pub enum SaveOutcome {
    /// The dialog was cancelled or failed; nothing was written
    Cancelled,
    /// The blob was written in full
    Saved { path: PathBuf, bytes: u64 },
}

/// A file chosen through the open dialog
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OpenedFile {
    pub path: PathBuf,
    pub size: u64,
    pub media_type: Option<String>,
}

/// Save/open operations over a `FilePicker`
#[derive(Clone)]
pub struct FilePersistence {
    picker: Arc<dyn FilePicker>,
}

impl FilePersistence {
    pub fn new(picker: Arc<dyn FilePicker>) -> Self {
        Self { picker }
    }

    /// Ask for a destination and write `blob` to it
    ///
    /// Cancellation and picker failures are not errors. Write failures are.
    pub async fn save(&self, blob: &Bytes, profile: &RecorderProfile) -> Result<SaveOutcome> {
        let filter = FileTypeFilter::for_profile(profile);

        let path = match self.picker.pick_save(&filter).await {
            Ok(Some(path)) => path,
            Ok(None) => {
                debug!("Save dialog cancelled");
                return Ok(SaveOutcome::Cancelled);
            }
            Err(e) => {
                debug!("Save dialog failed: {:#}", e);
                return Ok(SaveOutcome::Cancelled);
            }
        };

        let mut file = tokio::fs::File::create(&path)
            .await
            .with_context(|| format!("Failed to create file: {}", path.display()))?;

        file.write_all(blob)
            .await
            .with_context(|| format!("Failed to write recording: {}", path.display()))?;

        file.flush()
            .await
            .with_context(|| format!("Failed to flush recording: {}", path.display()))?;

        info!("Saved recording: {} ({} bytes)", path.display(), blob.len());

        Ok(SaveOutcome::Saved {
            path,
            bytes: blob.len() as u64,
        })
    }

    /// Ask for an existing video file
    ///
    /// Returns `None` when cancelled, when the picker fails, or when the pick
    /// is not a regular file.
    pub async fn open_video(&self) -> Option<OpenedFile> {
        let path = match self.picker.pick_open(&FileTypeFilter::videos()).await {
            Ok(Some(path)) => path,
            Ok(None) => {
                debug!("Open dialog cancelled");
                return None;
            }
            Err(e) => {
                debug!("Open dialog failed: {:#}", e);
                return None;
            }
        };

        let metadata = match tokio::fs::metadata(&path).await {
            Ok(metadata) => metadata,
            Err(e) => {
                debug!("Cannot read picked file {}: {}", path.display(), e);
                return None;
            }
        };

        if !metadata.is_file() {
            debug!("Picked entry is not a file: {}", path.display());
            return None;
        }

        Some(OpenedFile {
            media_type: media_type_for(&path).map(str::to_string),
            size: metadata.len(),
            path,
        })
    }
}
