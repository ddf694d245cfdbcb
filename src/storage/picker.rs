use anyhow::{Context, Result};
use chrono::Local;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::media::RecorderProfile;

/// Extensions accepted for a bare `video/*` pattern
const VIDEO_EXTENSIONS: &[&str] = &[".mkv", ".webm", ".mp4", ".m4v", ".mov", ".avi", ".ogv"];

/// One entry of a picker type filter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileTypeFilter {
    /// Human-readable label (e.g. "Videos")
    pub description: String,
    /// MIME pattern, possibly a wildcard (e.g. "video/*")
    pub mime_pattern: String,
    /// Accepted extensions, including the dot; empty means "any for the pattern"
    pub extensions: Vec<String>,
}

impl FileTypeFilter {
    /// Filter used by the player's open dialog
    pub fn videos() -> Self {
        Self {
            description: "Videos".to_string(),
            mime_pattern: "video/*".to_string(),
            extensions: Vec::new(),
        }
    }

    /// Filter used when saving a recording made with `profile`
    pub fn for_profile(profile: &RecorderProfile) -> Self {
        Self {
            description: "Video".to_string(),
            mime_pattern: profile.container_type.clone(),
            extensions: vec![profile.file_extension.clone()],
        }
    }

    /// Extensions this filter accepts
    pub fn accepted_extensions(&self) -> Vec<String> {
        if !self.extensions.is_empty() {
            return self.extensions.clone();
        }
        if self.mime_pattern == "video/*" {
            return VIDEO_EXTENSIONS.iter().map(|e| e.to_string()).collect();
        }
        Vec::new()
    }

    /// Extension used for newly saved files
    pub fn default_extension(&self) -> Option<String> {
        self.accepted_extensions().into_iter().next()
    }

    pub fn matches(&self, path: &Path) -> bool {
        let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
            return false;
        };
        let ext = format!(".{}", ext.to_ascii_lowercase());
        self.accepted_extensions().iter().any(|e| e.eq_ignore_ascii_case(&ext))
    }
}

/// Guess a video MIME type from a file extension
pub fn media_type_for(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    let mime = match ext.as_str() {
        "mkv" => "video/x-matroska",
        "webm" => "video/webm",
        "mp4" | "m4v" => "video/mp4",
        "mov" => "video/quicktime",
        "avi" => "video/x-msvideo",
        "ogv" => "video/ogg",
        _ => return None,
    };
    Some(mime)
}

/// Open/save file dialog capability
///
/// `Ok(None)` means the user cancelled. Errors are picker failures; callers
/// treat both the same way.
#[async_trait::async_trait]
pub trait FilePicker: Send + Sync {
    /// Pick one existing file matching `filter`
    async fn pick_open(&self, filter: &FileTypeFilter) -> Result<Option<PathBuf>>;

    /// Pick a destination for a new file matching `filter`
    async fn pick_save(&self, filter: &FileTypeFilter) -> Result<Option<PathBuf>>;
}

/// Non-interactive picker rooted at a recordings directory
///
/// Saves get a timestamped name; opens pick the newest matching file.
pub struct DirectoryPicker {
    dir: PathBuf,
}

impl DirectoryPicker {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

#[async_trait::async_trait]
impl FilePicker for DirectoryPicker {
    async fn pick_open(&self, filter: &FileTypeFilter) -> Result<Option<PathBuf>> {
        let mut entries = match tokio::fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("Recordings directory does not exist: {}", self.dir.display());
                return Ok(None);
            }
            Err(e) => {
                return Err(e).with_context(|| {
                    format!("Failed to list directory: {}", self.dir.display())
                })
            }
        };

        let mut newest: Option<(std::time::SystemTime, PathBuf)> = None;

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if !filter.matches(&path) {
                continue;
            }
            let metadata = entry.metadata().await?;
            if !metadata.is_file() {
                continue;
            }
            let modified = metadata.modified()?;
            if newest.as_ref().map_or(true, |(t, _)| modified >= *t) {
                newest = Some((modified, path));
            }
        }

        Ok(newest.map(|(_, path)| path))
    }

    async fn pick_save(&self, filter: &FileTypeFilter) -> Result<Option<PathBuf>> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .with_context(|| format!("Failed to create directory: {}", self.dir.display()))?;

        let ext = filter.default_extension().unwrap_or_default();
        let stem = format!("recording-{}", Local::now().format("%Y%m%d-%H%M%S"));

        let mut path = self.dir.join(format!("{stem}{ext}"));
        let mut n = 1;
        while tokio::fs::try_exists(&path).await? {
            path = self.dir.join(format!("{stem}-{n}{ext}"));
            n += 1;
        }

        Ok(Some(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_video_filter_accepts_common_containers() {
        let filter = FileTypeFilter::videos();
        assert!(filter.matches(Path::new("/tmp/a.mkv")));
        assert!(filter.matches(Path::new("/tmp/a.WEBM")));
        assert!(filter.matches(Path::new("clip.mp4")));
        assert!(!filter.matches(Path::new("notes.txt")));
        assert!(!filter.matches(Path::new("no_extension")));
    }

    #[test]
    fn test_profile_filter_is_scoped_to_one_extension() {
        let filter = FileTypeFilter::for_profile(&RecorderProfile::matroska());
        assert_eq!(filter.description, "Video");
        assert_eq!(filter.mime_pattern, "video/x-matroska");
        assert_eq!(filter.default_extension().as_deref(), Some(".mkv"));
        assert!(filter.matches(Path::new("out.mkv")));
        assert!(!filter.matches(Path::new("out.webm")));
    }

    #[test]
    fn test_media_type_for() {
        assert_eq!(media_type_for(Path::new("a.mkv")), Some("video/x-matroska"));
        assert_eq!(media_type_for(Path::new("a.webm")), Some("video/webm"));
        assert_eq!(media_type_for(Path::new("a.bin")), None);
    }
}
