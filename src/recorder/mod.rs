pub mod chunk;
pub mod controller;
pub mod state;

pub use chunk::{ChunkBuffer, ChunkCollector};
pub use controller::{FinalizePolicy, RecordController, RecordSetup, RecorderSettings};
pub use state::{InvalidTransition, RecordCommand, RecordControls, RecordState, RecordStatus};
