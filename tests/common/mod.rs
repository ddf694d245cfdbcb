// Test doubles shared by the integration tests
//
// MockPlatform hands out encoders whose chunks are delivered by the test
// itself; ScriptedPicker answers file dialogs from a queue.

#![allow(dead_code)]

use anyhow::{bail, Result};
use camdeck::media::{
    Capabilities, CaptureStream, Chunk, MediaConstraints, MediaEncoder, MediaPlatform,
    RecorderProfile,
};
use camdeck::storage::{FilePicker, FileTypeFilter};
use camdeck::{RecordController, RecordState, UiEvent};
use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;

type Feed = Arc<Mutex<Option<mpsc::Sender<Chunk>>>>;

pub struct MockPlatform {
    pub capabilities: Capabilities,
    pub deny_capture: bool,
    /// Size of the segment delivered after stop (0 = none)
    pub final_segment: usize,
    /// How long after stop the final segment arrives
    pub final_delay: Duration,
    feed: Feed,
    sequence: Arc<AtomicU64>,
    streams: Mutex<Vec<CaptureStream>>,
    encoders_created: AtomicUsize,
}

impl MockPlatform {
    pub fn new() -> Self {
        Self {
            capabilities: Capabilities {
                capture: true,
                encoder_mime_types: vec![
                    RecorderProfile::matroska().mime_type(),
                    RecorderProfile::webm().mime_type(),
                ],
                file_access: true,
            },
            deny_capture: false,
            final_segment: 0,
            final_delay: Duration::ZERO,
            feed: Arc::default(),
            sequence: Arc::default(),
            streams: Mutex::default(),
            encoders_created: AtomicUsize::new(0),
        }
    }

    /// Deliver a chunk of `size` bytes from the running encoder
    pub async fn deliver(&self, size: usize) {
        let tx = self
            .feed
            .lock()
            .unwrap()
            .clone()
            .expect("no encoder is running");
        let sequence = self.sequence.fetch_add(1, Ordering::SeqCst);
        tx.send(Chunk::new(sequence, vec![(sequence % 251) as u8; size]))
            .await
            .expect("collector dropped");
    }

    pub fn streams(&self) -> Vec<CaptureStream> {
        self.streams.lock().unwrap().clone()
    }

    pub fn encoders_created(&self) -> usize {
        self.encoders_created.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl MediaPlatform for MockPlatform {
    fn capabilities(&self) -> Capabilities {
        self.capabilities.clone()
    }

    async fn request_stream(&self, constraints: MediaConstraints) -> Result<CaptureStream> {
        if self.deny_capture {
            bail!("Permission denied");
        }
        let stream = CaptureStream::new(constraints);
        self.streams.lock().unwrap().push(stream.clone());
        Ok(stream)
    }

    fn create_encoder(
        &self,
        _stream: &CaptureStream,
        _profile: &RecorderProfile,
    ) -> Result<Box<dyn MediaEncoder>> {
        self.encoders_created.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(MockEncoder {
            feed: Arc::clone(&self.feed),
            sequence: Arc::clone(&self.sequence),
            final_segment: self.final_segment,
            final_delay: self.final_delay,
            recording: false,
        }))
    }
}

struct MockEncoder {
    feed: Feed,
    sequence: Arc<AtomicU64>,
    final_segment: usize,
    final_delay: Duration,
    recording: bool,
}

#[async_trait::async_trait]
impl MediaEncoder for MockEncoder {
    async fn start(&mut self, _timeslice: Duration) -> Result<mpsc::Receiver<Chunk>> {
        let (tx, rx) = mpsc::channel(64);
        *self.feed.lock().unwrap() = Some(tx);
        self.recording = true;
        Ok(rx)
    }

    async fn stop(&mut self) -> Result<()> {
        let Some(tx) = self.feed.lock().unwrap().take() else {
            bail!("not recording");
        };
        self.recording = false;

        let size = self.final_segment;
        let delay = self.final_delay;
        let sequence = self.sequence.fetch_add(1, Ordering::SeqCst);
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if size > 0 {
                let _ = tx.send(Chunk::new(sequence, vec![0xEE; size])).await;
            }
        });
        Ok(())
    }

    fn is_recording(&self) -> bool {
        self.recording
    }

    fn name(&self) -> &str {
        "mock"
    }
}

/// One scripted dialog result
enum Answer {
    /// `None` = cancel
    Pick(Option<PathBuf>),
    Fail(&'static str),
}

impl Answer {
    fn into_result(self) -> Result<Option<PathBuf>> {
        match self {
            Answer::Pick(path) => Ok(path),
            Answer::Fail(reason) => bail!("{}", reason),
        }
    }
}

#[derive(Default)]
pub struct ScriptedPicker {
    open: Mutex<VecDeque<Answer>>,
    save: Mutex<VecDeque<Answer>>,
    open_requests: AtomicUsize,
    save_requests: AtomicUsize,
}

impl ScriptedPicker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue the answer to the next open dialog (`None` = cancel)
    pub fn answer_open(&self, path: Option<PathBuf>) {
        self.open.lock().unwrap().push_back(Answer::Pick(path));
    }

    /// Make the next open dialog fail
    pub fn fail_open(&self, reason: &'static str) {
        self.open.lock().unwrap().push_back(Answer::Fail(reason));
    }

    /// Queue the answer to the next save dialog (`None` = cancel)
    pub fn answer_save(&self, path: Option<PathBuf>) {
        self.save.lock().unwrap().push_back(Answer::Pick(path));
    }

    /// Make the next save dialog fail
    pub fn fail_save(&self, reason: &'static str) {
        self.save.lock().unwrap().push_back(Answer::Fail(reason));
    }

    pub fn open_requests(&self) -> usize {
        self.open_requests.load(Ordering::SeqCst)
    }

    pub fn save_requests(&self) -> usize {
        self.save_requests.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl FilePicker for ScriptedPicker {
    async fn pick_open(&self, _filter: &FileTypeFilter) -> Result<Option<PathBuf>> {
        self.open_requests.fetch_add(1, Ordering::SeqCst);
        let answer = self.open.lock().unwrap().pop_front();
        answer.map_or(Ok(None), Answer::into_result)
    }

    async fn pick_save(&self, _filter: &FileTypeFilter) -> Result<Option<PathBuf>> {
        self.save_requests.fetch_add(1, Ordering::SeqCst);
        let answer = self.save.lock().unwrap().pop_front();
        answer.map_or(Ok(None), Answer::into_result)
    }
}

/// Wait until the controller has stored `count` chunks
pub async fn wait_for_chunks(controller: &RecordController, count: usize) {
    for _ in 0..200 {
        if controller.chunk_count().await == count {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!(
        "expected {} chunks, have {}",
        count,
        controller.chunk_count().await
    );
}

/// Drain every event emitted so far
pub fn drain_events(rx: &mut mpsc::UnboundedReceiver<UiEvent>) -> Vec<UiEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

/// Record states in the order they were published
pub fn record_states(events: &[UiEvent]) -> Vec<RecordState> {
    events
        .iter()
        .filter_map(|e| match e {
            UiEvent::RecordState { state, .. } => Some(*state),
            _ => None,
        })
        .collect()
}
