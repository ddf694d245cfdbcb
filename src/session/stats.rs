use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::{watch, RwLock};

use super::area::Area;
use crate::recorder::{RecordControls, RecordState, RecordStatus};
use crate::storage::OpenedFile;

/// Point-in-time view of the mounted area
#[derive(Debug, Clone, Serialize)]
pub struct AppSnapshot {
    /// Currently mounted area
    pub area: Area,

    /// Label of the toggle control
    pub toggle_label: String,

    /// When the current area was built
    pub mounted_at: DateTime<Utc>,

    /// Number of areas built since startup
    pub mount_count: u64,

    /// Record Area only: state machine position (absent if setup failed)
    pub record_state: Option<RecordState>,

    /// Record Area only: control enablement
    pub record_controls: Option<RecordControls>,

    /// Record Area only: non-empty chunks in the current recording
    pub chunks_buffered: usize,

    /// Player Area only: current playback source
    pub playback_source: Option<OpenedFile>,
}

impl AppSnapshot {
    /// Snapshot of a freshly mounted area with nothing area-specific filled in
    pub fn mounted(area: Area, mounted_at: DateTime<Utc>, mount_count: u64) -> Self {
        Self {
            area,
            toggle_label: area.toggle_label().to_string(),
            mounted_at,
            mount_count,
            record_state: None,
            record_controls: None,
            chunks_buffered: 0,
            playback_source: None,
        }
    }

    fn overlay(&mut self, status: RecordStatus) {
        self.record_state = Some(status.state);
        self.record_controls = Some(status.state.controls());
        self.chunks_buffered = status.chunks_buffered;
    }
}

struct Published {
    snapshot: AppSnapshot,
    record: Option<watch::Receiver<RecordStatus>>,
}

/// Latest published snapshot, readable while a command is being applied
///
/// The area switcher republishes after every command. The record state and
/// chunk count are read live from the mounted controller, so `Processing`
/// is visible during a stop-and-save.
#[derive(Clone)]
pub struct StatusBoard {
    inner: Arc<RwLock<Published>>,
}

impl StatusBoard {
    pub fn new(snapshot: AppSnapshot) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Published {
                snapshot,
                record: None,
            })),
        }
    }

    /// Replace the snapshot; `record` follows the mounted Record Controller
    pub async fn publish(&self, snapshot: AppSnapshot, record: Option<watch::Receiver<RecordStatus>>) {
        *self.inner.write().await = Published { snapshot, record };
    }

    pub async fn current(&self) -> AppSnapshot {
        let published = self.inner.read().await;
        let mut snapshot = published.snapshot.clone();
        if let Some(record) = &published.record {
            let status = *record.borrow();
            snapshot.overlay(status);
        }
        snapshot
    }
}
