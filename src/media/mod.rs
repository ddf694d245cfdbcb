pub mod encoder;
pub mod platform;
pub mod profile;
pub mod replay;
pub mod synthetic;

pub use encoder::{PacedEncoder, SegmentSource};
pub use platform::{
    Capabilities, CaptureStream, Chunk, MediaConstraints, MediaEncoder, MediaPlatform,
    MissingCapability,
};
pub use profile::{ProfilePreset, RecorderProfile};
pub use replay::ReplayPlatform;
pub use synthetic::SyntheticPlatform;
