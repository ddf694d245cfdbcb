//! HTTP API for driving the UI from another process
//!
//! This module exposes the area switcher's commands over REST:
//! - GET /status - Mounted area, record state and playback source
//! - POST /area/toggle - Switch between Record and Player areas
//! - POST /record/start - Start recording
//! - POST /record/stop - Stop recording and save
//! - POST /player/open - Open a video for playback
//! - GET /health - Health check

mod handlers;
mod routes;
mod state;

pub use routes::create_router;
pub use state::AppState;
