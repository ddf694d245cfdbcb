use super::state::AppState;
use crate::error::ControlError;
use crate::session::AppCommand;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use tracing::{error, info};

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

fn error_response(e: ControlError) -> Response {
    let status = if e.is_rejection() {
        StatusCode::CONFLICT
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    };

    (
        status,
        Json(ErrorResponse {
            error: format!("{:#}", e),
        }),
    )
        .into_response()
}

async fn run_command(state: &AppState, command: AppCommand) -> Response {
    match state.commands.send(command).await {
        Ok(outcome) => (StatusCode::OK, Json(outcome)).into_response(),
        Err(e) => {
            if e.is_rejection() {
                info!("{:?} rejected: {}", command, e);
            } else {
                error!("{:?} failed: {:#}", command, e);
            }
            error_response(e)
        }
    }
}

/// POST /area/toggle
/// Switch to the other area
pub async fn toggle_area(State(state): State<AppState>) -> impl IntoResponse {
    run_command(&state, AppCommand::ToggleArea).await
}

/// POST /record/start
/// Start a new recording (Record Area, state normal)
pub async fn start_recording(State(state): State<AppState>) -> impl IntoResponse {
    run_command(&state, AppCommand::StartRecording).await
}

/// POST /record/stop
/// Stop the recording and save it (Record Area, state recording)
pub async fn stop_recording(State(state): State<AppState>) -> impl IntoResponse {
    run_command(&state, AppCommand::StopAndSave).await
}

/// POST /player/open
/// Pick a video and make it the playback source (Player Area)
pub async fn open_video(State(state): State<AppState>) -> impl IntoResponse {
    run_command(&state, AppCommand::OpenVideo).await
}

/// GET /status
/// Snapshot of the mounted area
pub async fn get_status(State(state): State<AppState>) -> impl IntoResponse {
    let snapshot = state.commands.status().await;
    (StatusCode::OK, Json(snapshot))
}

/// GET /health
/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}
