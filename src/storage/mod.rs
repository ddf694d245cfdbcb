//! File persistence: picker capability plus stream-based write

mod persistence;
mod picker;

pub use persistence::{FilePersistence, OpenedFile, SaveOutcome};
pub use picker::{media_type_for, DirectoryPicker, FilePicker, FileTypeFilter};
