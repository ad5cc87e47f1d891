//! Pipeline - the three-stage retrieval for one key.
//!
//! ```text
//! Idle -> FetchingMetadata -> FetchingContent -> Decoding -> Done
//! ```
//!
//! The first failing stage ends the run; later stages are skipped. Decoding
//! runs on Tokio's blocking pool.

use std::fmt;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::data::{Outcome, ResourceKey};
use crate::error::RetrieveError;
use crate::stage::{ArchiveDecoder, ContentSource, MetadataSource};

/// Stages of a retrieval, in the order they are entered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    /// Asking the metadata source for the export location.
    FetchingMetadata,

    /// Downloading the raw export from that location.
    FetchingContent,

    /// Decoding the downloaded bytes.
    Decoding,

    /// Terminal; entered exactly once per run, on success or failure.
    Done,
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineStage::FetchingMetadata => write!(f, "FetchingMetadata"),
            PipelineStage::FetchingContent => write!(f, "FetchingContent"),
            PipelineStage::Decoding => write!(f, "Decoding"),
            PipelineStage::Done => write!(f, "Done"),
        }
    }
}

/// Observer invoked on every stage transition.
pub type StageHook = Arc<dyn Fn(&ResourceKey, PipelineStage) + Send + Sync>;

/// Sequences the metadata, content, and decode stages for one key.
pub struct Pipeline<M, C, D> {
    metadata: M,
    content:  C,
    decoder:  Arc<D>,
    on_stage: Option<StageHook>,
}

impl<M, C, D> Pipeline<M, C, D>
where
    M: MetadataSource,
    C: ContentSource,
    D: ArchiveDecoder,
{
    pub fn new(metadata: M, content: C, decoder: D) -> Self {
        Self {
            metadata,
            content,
            decoder: Arc::new(decoder),
            on_stage: None,
        }
    }

    /// Set the stage transition observer.
    #[must_use]
    pub fn on_stage(mut self, on_stage: StageHook) -> Self {
        self.on_stage = Some(on_stage);
        self
    }

    /// Run all stages for `key` and produce its outcome.
    pub async fn run(&self, key: &ResourceKey) -> Outcome {
        let outcome = self.run_stages(key).await;

        match &outcome {
            Ok(archive) => debug!(key = %key, entries = archive.len(), "export retrieved"),
            Err(error) => warn!(key = %key, %error, "export retrieval failed"),
        }
        self.enter(key, PipelineStage::Done);

        outcome
    }

    async fn run_stages(&self, key: &ResourceKey) -> Outcome {
        self.enter(key, PipelineStage::FetchingMetadata);
        let info = self
            .metadata
            .fetch_metadata(key)
            .await
            .map_err(|e| RetrieveError::Metadata(e.to_string()))?;

        self.enter(key, PipelineStage::FetchingContent);
        let data = self
            .content
            .fetch_content(&info.uri)
            .await
            .map_err(|e| RetrieveError::Transport(e.to_string()))?;

        self.enter(key, PipelineStage::Decoding);
        let decoder = Arc::clone(&self.decoder);
        let archive = tokio::task::spawn_blocking(move || decoder.decode(data))
            .await
            .map_err(|e| {
                warn!(key = %key, error = %e, "decoder task failed");
                RetrieveError::Abandoned
            })?
            .map_err(|e| RetrieveError::Decode(e.to_string()))?;

        Ok(Arc::new(archive))
    }

    fn enter(&self, key: &ResourceKey, stage: PipelineStage) {
        debug!(key = %key, %stage, "pipeline stage");
        if let Some(ref hook) = self.on_stage {
            hook(key, stage);
        }
    }
}
