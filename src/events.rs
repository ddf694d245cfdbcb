use serde::Serialize;
use tokio::sync::mpsc;
use tracing::debug;
use uuid::Uuid;

use crate::recorder::{RecordControls, RecordState};
use crate::session::Area;
use crate::storage::{OpenedFile, SaveOutcome};

/// Notifications for whatever surface presents the UI
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum UiEvent {
    /// An area was built and its controls wired
    AreaMounted { area: Area, toggle_label: String },
    /// Blocking user-facing message
    Alert { message: String },
    /// Live preview now shows this capture stream
    PreviewAttached { stream_id: Uuid },
    /// Record state and control enablement changed
    RecordState {
        state: RecordState,
        controls: RecordControls,
    },
    /// A stop-and-save finished
    Saved { outcome: SaveOutcome },
    /// The player has a new playback source
    PlaybackSourceChanged { file: OpenedFile },
}

/// Sending half of the UI event stream
///
/// Events are dropped silently when nobody is listening.
#[derive(Debug, Clone, Default)]
pub struct EventSink {
    tx: Option<mpsc::UnboundedSender<UiEvent>>,
}

impl EventSink {
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<UiEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx: Some(tx) }, rx)
    }

    pub fn disconnected() -> Self {
        Self::default()
    }

    pub fn emit(&self, event: UiEvent) {
        debug!("UI event: {:?}", event);
        if let Some(tx) = &self.tx {
            let _ = tx.send(event);
        }
    }
}
