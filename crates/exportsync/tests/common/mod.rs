#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use bytes::Bytes;
use exportsync::{ArchiveDecoder, ContentSource, ExportArchive, ExportInfo, MetadataSource, ResourceKey};
use tokio::sync::Notify;

/// Initialize test logging. Safe to call from every test.
pub fn init_test_logging() {
    use tracing_subscriber::{EnvFilter, fmt};

    let _ = fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("exportsync=debug".parse().expect("valid directive")))
        .with_test_writer()
        .try_init();
}

#[derive(Debug)]
pub struct StageError(pub String);

impl std::fmt::Display for StageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { f.write_str(&self.0) }
}

impl std::error::Error for StageError {}

/// Scripted stand-in for all three stages.
///
/// Metadata requests block on `gate` when `gated` is set, so a test can
/// attach more waiters while the first retrieval is still in flight.
#[derive(Default)]
pub struct MockStages {
    pub metadata_calls: AtomicUsize,
    pub content_calls:  AtomicUsize,
    pub decode_calls:   AtomicUsize,
    pub gated:          bool,
    pub gate:           Notify,
    pub fail_metadata:  Option<String>,
    pub fail_content:   Option<String>,
    pub fail_decode:    Option<String>,
    pub panic_decode:   bool,
    pub locations:      Mutex<Vec<String>>,
}

impl MockStages {
    pub fn gated() -> Self {
        Self {
            gated: true,
            ..Self::default()
        }
    }

    pub fn release(&self) { self.gate.notify_one(); }

    pub fn metadata_calls(&self) -> usize { self.metadata_calls.load(Ordering::SeqCst) }

    pub fn content_calls(&self) -> usize { self.content_calls.load(Ordering::SeqCst) }

    pub fn decode_calls(&self) -> usize { self.decode_calls.load(Ordering::SeqCst) }
}

impl MetadataSource for MockStages {
    type Error = StageError;

    async fn fetch_metadata(&self, key: &ResourceKey) -> Result<ExportInfo, StageError> {
        self.metadata_calls.fetch_add(1, Ordering::SeqCst);
        if self.gated {
            self.gate.notified().await;
        }
        match &self.fail_metadata {
            Some(message) => Err(StageError(message.clone())),
            None => Ok(ExportInfo::new(format!("https://cdn.test/{key}.zip"))),
        }
    }
}

impl ContentSource for MockStages {
    type Error = StageError;

    async fn fetch_content(&self, location: &str) -> Result<Bytes, StageError> {
        self.content_calls.fetch_add(1, Ordering::SeqCst);
        self.locations.lock().unwrap().push(location.to_string());
        match &self.fail_content {
            Some(message) => Err(StageError(message.clone())),
            None => Ok(Bytes::from_static(b"export")),
        }
    }
}

impl ArchiveDecoder for MockStages {
    type Error = StageError;

    fn decode(&self, _data: Bytes) -> Result<ExportArchive, StageError> {
        self.decode_calls.fetch_add(1, Ordering::SeqCst);
        if self.panic_decode {
            panic!("decoder blew up");
        }
        match &self.fail_decode {
            Some(message) => Err(StageError(message.clone())),
            None => Ok(ExportArchive::default()),
        }
    }
}

pub type MockRegistry = exportsync::Registry<Arc<MockStages>, Arc<MockStages>, Arc<MockStages>>;

pub fn registry(stages: &Arc<MockStages>) -> MockRegistry {
    exportsync::Registry::new(exportsync::Pipeline::new(
        Arc::clone(stages),
        Arc::clone(stages),
        Arc::clone(stages),
    ))
}
