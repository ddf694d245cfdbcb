use serde::{Deserialize, Serialize};

/// Container/codec parameters for a recording
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecorderProfile {
    /// Container MIME type (e.g. "video/x-matroska")
    pub container_type: String,
    /// Codec identifier passed to the encoder (e.g. "avc1")
    pub codec: String,
    /// Whether the microphone track is captured
    pub audio_enabled: bool,
    /// Extension used for saved files, including the dot
    pub file_extension: String,
}

/// Built-in profile presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ProfilePreset {
    /// Matroska + H.264, no audio
    Matroska,
    /// WebM + VP9, with audio
    Webm,
}

impl RecorderProfile {
    pub fn matroska() -> Self {
        Self {
            container_type: "video/x-matroska".to_string(),
            codec: "avc1".to_string(),
            audio_enabled: false,
            file_extension: ".mkv".to_string(),
        }
    }

    pub fn webm() -> Self {
        Self {
            container_type: "video/webm".to_string(),
            codec: "vp9".to_string(),
            audio_enabled: true,
            file_extension: ".webm".to_string(),
        }
    }

    pub fn from_preset(preset: ProfilePreset) -> Self {
        match preset {
            ProfilePreset::Matroska => Self::matroska(),
            ProfilePreset::Webm => Self::webm(),
        }
    }

    /// MIME string handed to the encoder
    pub fn mime_type(&self) -> String {
        format!("{};codecs={}", self.container_type, self.codec)
    }
}

impl Default for RecorderProfile {
    fn default() -> Self {
        Self::matroska()
    }
}
