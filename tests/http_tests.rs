// Tests for the HTTP control API
//
// Requests go through the router into a running dispatcher task.

mod common;

use anyhow::Result;
use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use camdeck::events::EventSink;
use camdeck::recorder::RecorderSettings;
use camdeck::storage::FilePersistence;
use camdeck::{create_router, spawn_dispatcher, AppState, Area, AreaSwitcher};
use common::{MockPlatform, ScriptedPicker};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tower::ServiceExt;

async fn router(platform: &Arc<MockPlatform>, picker: &Arc<ScriptedPicker>) -> Router {
    let switcher = AreaSwitcher::new(
        Area::Player,
        RecorderSettings::default(),
        platform.clone(),
        FilePersistence::new(picker.clone()),
        EventSink::disconnected(),
    )
    .await;
    let (commands, _handle) = spawn_dispatcher(switcher);
    create_router(AppState::new(commands))
}

async fn call(app: &Router, method: &str, uri: &str) -> Result<(StatusCode, Value)> {
    let response = app
        .clone()
        .oneshot(Request::builder().method(method).uri(uri).body(Body::empty())?)
        .await?;
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await?;
    let json = serde_json::from_slice(&body).unwrap_or(Value::Null);
    Ok((status, json))
}

#[tokio::test]
async fn test_health() -> Result<()> {
    let platform = Arc::new(MockPlatform::new());
    let picker = Arc::new(ScriptedPicker::new());
    let app = router(&platform, &picker).await;

    let (status, _) = call(&app, "GET", "/health").await?;
    assert_eq!(status, StatusCode::OK);

    Ok(())
}

#[tokio::test]
async fn test_record_cycle_over_http() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let out = temp_dir.path().join("http.mkv");

    let platform = Arc::new(MockPlatform::new());
    let picker = Arc::new(ScriptedPicker::new());
    picker.answer_save(Some(out.clone()));
    let app = router(&platform, &picker).await;

    let (status, body) = call(&app, "GET", "/status").await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["area"], "player");
    assert_eq!(body["toggle_label"], "Load Record");

    // Recording is not possible from the Player Area
    let (status, body) = call(&app, "POST", "/record/start").await?;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"].as_str().unwrap().contains("Record"));

    let (status, body) = call(&app, "POST", "/area/toggle").await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["result"], "mounted");
    assert_eq!(body["area"], "record");

    let (status, body) = call(&app, "POST", "/record/start").await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["result"], "started");

    let (_, body) = call(&app, "GET", "/status").await?;
    assert_eq!(body["record_state"], "in_record");
    assert_eq!(body["record_controls"]["stop_enabled"], true);

    platform.deliver(4096).await;
    platform.deliver(2048).await;

    let (status, body) = call(&app, "POST", "/record/stop").await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["result"], "saved");
    assert_eq!(body["save"]["outcome"], "saved");
    assert_eq!(body["save"]["bytes"], 6144);
    assert_eq!(std::fs::metadata(&out)?.len(), 6144);

    let (_, body) = call(&app, "GET", "/status").await?;
    assert_eq!(body["record_state"], "normal");

    // Stop is only valid while recording
    let (status, _) = call(&app, "POST", "/record/stop").await?;
    assert_eq!(status, StatusCode::CONFLICT);

    Ok(())
}

#[tokio::test]
async fn test_open_cancelled_over_http() -> Result<()> {
    let platform = Arc::new(MockPlatform::new());
    let picker = Arc::new(ScriptedPicker::new());
    let app = router(&platform, &picker).await;

    let (status, body) = call(&app, "POST", "/player/open").await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["result"], "opened");
    assert!(body["file"].is_null());

    let (_, body) = call(&app, "GET", "/status").await?;
    assert!(body["playback_source"].is_null());

    Ok(())
}

#[tokio::test]
async fn test_status_reports_processing_while_saving() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let out = temp_dir.path().join("slow.mkv");

    // The final segment arrives well after stop, keeping the save in progress
    let mut platform = MockPlatform::new();
    platform.final_segment = 512;
    platform.final_delay = Duration::from_millis(800);
    let platform = Arc::new(platform);
    let picker = Arc::new(ScriptedPicker::new());
    picker.answer_save(Some(out.clone()));
    let app = router(&platform, &picker).await;

    call(&app, "POST", "/area/toggle").await?;
    call(&app, "POST", "/record/start").await?;
    platform.deliver(100).await;

    let stop = tokio::spawn({
        let app = app.clone();
        async move { call(&app, "POST", "/record/stop").await }
    });
    tokio::time::sleep(Duration::from_millis(100)).await;

    let (status, body) =
        tokio::time::timeout(Duration::from_millis(300), call(&app, "GET", "/status")).await??;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["record_state"], "processing");
    assert_eq!(body["record_controls"]["start_enabled"], false);
    assert_eq!(body["record_controls"]["stop_enabled"], false);
    assert_eq!(body["chunks_buffered"], 1);

    let (status, body) = stop.await??;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["save"]["bytes"], 612);

    let (_, body) = call(&app, "GET", "/status").await?;
    assert_eq!(body["record_state"], "normal");
    assert_eq!(body["chunks_buffered"], 0);

    Ok(())
}
