//! Player Area: open a saved recording and make it the playback source

use tracing::info;

use crate::events::{EventSink, UiEvent};
use crate::storage::{FilePersistence, OpenedFile};

pub struct PlayerController {
    persistence: FilePersistence,
    events: EventSink,
    source: Option<OpenedFile>,
}

impl PlayerController {
    pub fn new(persistence: FilePersistence, events: EventSink) -> Self {
        Self {
            persistence,
            events,
            source: None,
        }
    }

    /// Current playback source, if any
    pub fn source(&self) -> Option<&OpenedFile> {
        self.source.as_ref()
    }

    /// Pick a video file and play it
    ///
    /// On cancel or failure the current source is left unchanged and `None`
    /// is returned.
    pub async fn open_video(&mut self) -> Option<OpenedFile> {
        let file = self.persistence.open_video().await?;

        info!(
            "Playing {} ({} bytes, {})",
            file.path.display(),
            file.size,
            file.media_type.as_deref().unwrap_or("unknown type")
        );

        self.source = Some(file.clone());
        self.events.emit(UiEvent::PlaybackSourceChanged { file: file.clone() });

        Some(file)
    }
}
