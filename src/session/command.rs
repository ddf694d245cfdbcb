use serde::Serialize;

use super::area::Area;
use crate::storage::{OpenedFile, SaveOutcome};

/// Commands sent from a UI surface to the area switcher
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppCommand {
    /// Switch to the other area
    ToggleArea,
    /// Record Area: start recording
    StartRecording,
    /// Record Area: stop recording and save
    StopAndSave,
    /// Player Area: pick a file to play
    OpenVideo,
}

/// What a successfully applied command did
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum CommandOutcome {
    Mounted { area: Area, toggle_label: String },
    Started,
    Saved { save: SaveOutcome },
    /// `file` is `None` when the dialog was cancelled
    Opened { file: Option<OpenedFile> },
}
