use anyhow::{Context, Result};
use camdeck::media::ProfilePreset;
use camdeck::{
    console, create_router, spawn_dispatcher, AppState, AreaSwitcher, Config, DirectoryPicker,
    EventSink, FilePersistence, UiEvent,
};
use clap::{Parser, Subcommand};
use std::sync::Arc;
use tokio::io::BufReader;
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "camdeck")]
#[command(about = "Record camera video and play saved recordings")]
struct Args {
    /// Config file (extension optional)
    #[arg(short, long, default_value = "config/camdeck")]
    config: String,

    /// Override the recorder profile preset
    #[arg(short, long, value_enum)]
    profile: Option<ProfilePreset>,

    #[command(subcommand)]
    mode: Option<Mode>,
}

#[derive(Subcommand, Clone, Copy)]
enum Mode {
    /// Control from stdin (default)
    Console,
    /// Serve the HTTP control API
    Serve,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    let mut cfg = Config::load(&args.config)?;
    if let Some(preset) = args.profile {
        cfg.recorder.profile = preset;
    }

    info!("Camdeck v{}", env!("CARGO_PKG_VERSION"));
    info!("Loaded config: {}", cfg.service.name);

    let settings = cfg.recorder_settings();
    info!(
        "Recorder profile: {} ({}), audio {}",
        settings.profile.mime_type(),
        settings.profile.file_extension,
        if settings.profile.audio_enabled { "on" } else { "off" }
    );

    let recordings_dir = cfg.recordings_dir();
    info!("Recordings directory: {}", recordings_dir.display());

    let platform = cfg.create_platform().await?;
    let persistence = FilePersistence::new(Arc::new(DirectoryPicker::new(recordings_dir)));

    let (events, mut event_rx) = EventSink::channel();
    tokio::spawn(async move {
        while let Some(event) = event_rx.recv().await {
            match event {
                UiEvent::Alert { message } => warn!("ALERT: {}", message),
                other => info!("{:?}", other),
            }
        }
    });

    let switcher = AreaSwitcher::new(
        cfg.service.initial_area,
        settings,
        platform,
        persistence,
        events,
    )
    .await;
    let (commands, dispatcher) = spawn_dispatcher(switcher);

    match args.mode.unwrap_or(Mode::Console) {
        Mode::Console => {
            let stdin = BufReader::new(tokio::io::stdin());
            console::run(stdin, commands).await?;
        }
        Mode::Serve => {
            let addr = format!("{}:{}", cfg.service.http.bind, cfg.service.http.port);
            let listener = tokio::net::TcpListener::bind(&addr)
                .await
                .with_context(|| format!("Failed to bind {}", addr))?;
            info!("HTTP server listening on {}", addr);

            let app = create_router(AppState::new(commands));
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    let _ = tokio::signal::ctrl_c().await;
                    info!("Shutting down");
                })
                .await?;
        }
    }

    dispatcher.await.context("Dispatcher task panicked")?;

    Ok(())
}
