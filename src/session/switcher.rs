use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{info, warn};

use super::area::Area;
use super::command::{AppCommand, CommandOutcome};
use super::stats::{AppSnapshot, StatusBoard};
use crate::error::ControlError;
use crate::events::{EventSink, UiEvent};
use crate::media::MediaPlatform;
use crate::player::PlayerController;
use crate::recorder::{RecordController, RecordControls, RecordSetup, RecorderSettings};
use crate::storage::FilePersistence;

/// Record Area contents; `controller` is `None` when setup did not complete
struct RecordArea {
    controller: Option<RecordController>,
    unavailable: String,
}

enum MountedArea {
    Record(RecordArea),
    Player(PlayerController),
}

/// Owns whichever area is mounted and routes commands to it
///
/// Exactly one area exists at a time. Switching tears the old area down
/// (stopping any recording and releasing the capture stream) before the new
/// one is built.
pub struct AreaSwitcher {
    settings: RecorderSettings,
    platform: Arc<dyn MediaPlatform>,
    persistence: FilePersistence,
    events: EventSink,
    mounted: MountedArea,
    mounted_at: DateTime<Utc>,
    mount_count: u64,
    board: StatusBoard,
}

impl AreaSwitcher {
    /// Build `initial` and wire its controls
    pub async fn new(
        initial: Area,
        settings: RecorderSettings,
        platform: Arc<dyn MediaPlatform>,
        persistence: FilePersistence,
        events: EventSink,
    ) -> Self {
        let mounted = Self::build(initial, &settings, &platform, &persistence, &events).await;
        let mounted_at = Utc::now();

        let switcher = Self {
            settings,
            platform,
            persistence,
            events,
            mounted,
            mounted_at,
            mount_count: 1,
            board: StatusBoard::new(AppSnapshot::mounted(initial, mounted_at, 1)),
        };
        switcher.refresh().await;
        switcher
    }

    pub fn area(&self) -> Area {
        match self.mounted {
            MountedArea::Record(_) => Area::Record,
            MountedArea::Player(_) => Area::Player,
        }
    }

    pub fn mount_count(&self) -> u64 {
        self.mount_count
    }

    /// Status readable without going through the command queue
    pub fn status_board(&self) -> StatusBoard {
        self.board.clone()
    }

    /// Record controller of the mounted Record Area, if its setup succeeded
    pub fn record_controller(&self) -> Option<&RecordController> {
        match &self.mounted {
            MountedArea::Record(area) => area.controller.as_ref(),
            MountedArea::Player(_) => None,
        }
    }

    pub fn player(&self) -> Option<&PlayerController> {
        match &self.mounted {
            MountedArea::Player(player) => Some(player),
            MountedArea::Record(_) => None,
        }
    }

    /// Tear down the mounted area and build the other one
    pub async fn toggle_area(&mut self) -> Area {
        let next = self.area().other();
        info!("Switching area: {} -> {}", self.area(), next);

        self.teardown().await;
        self.mounted = Self::build(
            next,
            &self.settings,
            &self.platform,
            &self.persistence,
            &self.events,
        )
        .await;
        self.mount_count += 1;
        self.mounted_at = Utc::now();
        self.refresh().await;
        next
    }

    /// Apply one UI command to the mounted area
    pub async fn dispatch(&mut self, command: AppCommand) -> Result<CommandOutcome, ControlError> {
        let result = self.apply(command).await;
        self.refresh().await;
        result
    }

    async fn apply(&mut self, command: AppCommand) -> Result<CommandOutcome, ControlError> {
        match command {
            AppCommand::ToggleArea => {
                let area = self.toggle_area().await;
                Ok(CommandOutcome::Mounted {
                    area,
                    toggle_label: area.toggle_label().to_string(),
                })
            }
            AppCommand::StartRecording => {
                self.record_controls()?.start().await?;
                Ok(CommandOutcome::Started)
            }
            AppCommand::StopAndSave => {
                let save = self.record_controls()?.stop_and_save().await?;
                Ok(CommandOutcome::Saved { save })
            }
            AppCommand::OpenVideo => match &mut self.mounted {
                MountedArea::Player(player) => Ok(CommandOutcome::Opened {
                    file: player.open_video().await,
                }),
                MountedArea::Record(_) => Err(ControlError::NotMounted(Area::Player)),
            },
        }
    }

    pub async fn snapshot(&self) -> AppSnapshot {
        let mut snapshot = AppSnapshot::mounted(self.area(), self.mounted_at, self.mount_count);

        match &self.mounted {
            MountedArea::Record(record) => match &record.controller {
                Some(controller) => {
                    snapshot.record_state = Some(controller.state());
                    snapshot.record_controls = Some(controller.controls());
                    snapshot.chunks_buffered = controller.chunk_count().await;
                }
                None => {
                    snapshot.record_controls = Some(RecordControls::disabled());
                }
            },
            MountedArea::Player(player) => {
                snapshot.playback_source = player.source().cloned();
            }
        }

        snapshot
    }

    async fn refresh(&self) {
        let record = self.record_controller().map(RecordController::watch_status);
        self.board.publish(self.snapshot().await, record).await;
    }

    /// Tear down the mounted area before exit
    pub async fn shutdown(mut self) {
        self.teardown().await;
        info!("Area switcher shut down after {} mounts", self.mount_count);
    }

    fn record_controls(&mut self) -> Result<&mut RecordController, ControlError> {
        match &mut self.mounted {
            MountedArea::Record(area) => match area.controller.as_mut() {
                Some(controller) => Ok(controller),
                None => Err(ControlError::Unavailable(area.unavailable.clone())),
            },
            MountedArea::Player(_) => Err(ControlError::NotMounted(Area::Record)),
        }
    }

    async fn teardown(&mut self) {
        if let MountedArea::Record(area) = &mut self.mounted {
            if let Some(controller) = area.controller.take() {
                controller.teardown().await;
            }
        }
    }

    async fn build(
        area: Area,
        settings: &RecorderSettings,
        platform: &Arc<dyn MediaPlatform>,
        persistence: &FilePersistence,
        events: &EventSink,
    ) -> MountedArea {
        events.emit(UiEvent::AreaMounted {
            area,
            toggle_label: area.toggle_label().to_string(),
        });

        match area {
            Area::Player => {
                MountedArea::Player(PlayerController::new(persistence.clone(), events.clone()))
            }
            Area::Record => {
                let setup = RecordController::setup(
                    settings.clone(),
                    Arc::clone(platform),
                    persistence.clone(),
                    events.clone(),
                )
                .await;

                let (controller, unavailable) = match setup {
                    RecordSetup::Ready(controller) => (Some(controller), String::new()),
                    RecordSetup::Unsupported(message) => (None, message),
                    RecordSetup::Denied => {
                        warn!("Record area has no capture stream");
                        (None, "capture was not granted".to_string())
                    }
                };

                MountedArea::Record(RecordArea {
                    controller,
                    unavailable,
                })
            }
        }
    }
}
