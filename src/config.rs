use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::media::{MediaPlatform, ProfilePreset, RecorderProfile, ReplayPlatform, SyntheticPlatform};
use crate::recorder::{FinalizePolicy, RecorderSettings};
use crate::session::Area;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub service: ServiceConfig,
    pub recorder: RecorderConfig,
    pub capture: CaptureConfig,
    pub storage: StorageConfig,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub name: String,
    pub http: HttpConfig,
    /// Area mounted at startup
    pub initial_area: Area,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub bind: String,
    pub port: u16,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinalizeMode {
    #[default]
    AwaitStop,
    FixedDelay,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct RecorderConfig {
    pub profile: ProfilePreset,
    /// Overrides for individual profile fields
    pub container_type: Option<String>,
    pub codec: Option<String>,
    pub audio_enabled: Option<bool>,
    pub file_extension: Option<String>,
    pub timeslice_ms: u64,
    pub finalize: FinalizeMode,
    pub finalize_delay_ms: u64,
    pub finalize_timeout_ms: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaptureSource {
    #[default]
    Synthetic,
    Replay,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    pub source: CaptureSource,
    pub bitrate_kbps: u32,
    /// Media file replayed when `source = "replay"`
    pub replay_path: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub recordings_path: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            name: "camdeck".to_string(),
            http: HttpConfig::default(),
            initial_area: Area::Player,
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1".to_string(),
            port: 8686,
        }
    }
}

impl Default for RecorderConfig {
    fn default() -> Self {
        Self {
            profile: ProfilePreset::Matroska,
            container_type: None,
            codec: None,
            audio_enabled: None,
            file_extension: None,
            timeslice_ms: 1000,
            finalize: FinalizeMode::AwaitStop,
            finalize_delay_ms: 1000,
            finalize_timeout_ms: 5000,
        }
    }
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            source: CaptureSource::Synthetic,
            bitrate_kbps: 2500,
            replay_path: None,
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            recordings_path: "~/.camdeck/recordings".to_string(),
        }
    }
}

impl Config {
    /// Load from `path` (any extension the config crate understands)
    ///
    /// A missing file yields the defaults.
    pub fn load(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path).required(false))
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    pub fn recorder_settings(&self) -> RecorderSettings {
        let finalize = match self.recorder.finalize {
            FinalizeMode::AwaitStop => FinalizePolicy::AwaitStop {
                timeout: Duration::from_millis(self.recorder.finalize_timeout_ms),
            },
            FinalizeMode::FixedDelay => {
                FinalizePolicy::FixedDelay(Duration::from_millis(self.recorder.finalize_delay_ms))
            }
        };

        RecorderSettings {
            profile: self.recorder.profile(),
            timeslice: Duration::from_millis(self.recorder.timeslice_ms),
            finalize,
        }
    }

    pub fn recordings_dir(&self) -> PathBuf {
        PathBuf::from(shellexpand::tilde(&self.storage.recordings_path).into_owned())
    }

    pub async fn create_platform(&self) -> Result<Arc<dyn MediaPlatform>> {
        match self.capture.source {
            CaptureSource::Synthetic => Ok(Arc::new(SyntheticPlatform::new(self.capture.bitrate_kbps))),
            CaptureSource::Replay => {
                let path = self
                    .capture
                    .replay_path
                    .as_deref()
                    .context("capture.replay_path is required for the replay source")?;
                let path = shellexpand::tilde(path).into_owned();
                Ok(Arc::new(ReplayPlatform::open(path, self.capture.bitrate_kbps).await?))
            }
        }
    }
}

impl RecorderConfig {
    /// Preset with any per-field overrides applied
    pub fn profile(&self) -> RecorderProfile {
        let mut profile = RecorderProfile::from_preset(self.profile);
        if let Some(container_type) = &self.container_type {
            profile.container_type = container_type.clone();
        }
        if let Some(codec) = &self.codec {
            profile.codec = codec.clone();
        }
        if let Some(audio_enabled) = self.audio_enabled {
            profile.audio_enabled = audio_enabled;
        }
        if let Some(file_extension) = &self.file_extension {
            profile.file_extension = file_extension.clone();
        }
        profile
    }
}
