pub mod config;
pub mod console;
pub mod error;
pub mod events;
pub mod http;
pub mod media;
pub mod player;
pub mod recorder;
pub mod session;
pub mod storage;

pub use config::Config;
pub use error::ControlError;
pub use events::{EventSink, UiEvent};
pub use http::{create_router, AppState};
pub use media::{
    Capabilities, CaptureStream, Chunk, MediaConstraints, MediaEncoder, MediaPlatform,
    RecorderProfile,
};
pub use player::PlayerController;
pub use recorder::{FinalizePolicy, RecordController, RecordState, RecorderSettings};
pub use session::{spawn_dispatcher, AppCommand, Area, AreaSwitcher, CommandOutcome, CommandSender};
pub use storage::{DirectoryPicker, FilePersistence, FilePicker, SaveOutcome};
