//! Registry - single-flight coalescing of export retrievals.
//!
//! The first attach for a key launches a pipeline task; later attaches for
//! the same key join it. When the pipeline finishes, every waiter receives
//! the same outcome and the key is forgotten, so the next attach starts a
//! fresh retrieval.

use std::sync::Arc;

use tokio::sync::oneshot;
use tracing::{Instrument, debug, info_span};

use crate::broadcast::{Completion, PendingTable, Registration};
use crate::config::ExportConfiguration;
use crate::data::{Outcome, ResourceKey, WaiterToken};
use crate::error::RetrieveError;
use crate::pipeline::Pipeline;
use crate::stage::{ArchiveDecoder, ContentSource, MetadataSource};
use crate::waiter::Waiter;

/// What an attach call did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttachStatus {
    /// No retrieval was in flight; one was launched.
    Started,
    /// A retrieval was already in flight; no new one was launched.
    Joined,
    /// The key was invalid; nothing happened.
    Rejected,
}

/// Result of [`Registry::attach`].
#[derive(Debug)]
#[must_use]
pub struct Attachment {
    pub status: AttachStatus,
    pub token:  WaiterToken,
    /// Present when this call registered a new waiter. `None` when the key
    /// was rejected or the token was already waiting on this key.
    pub waiter: Option<Waiter>,
}

impl Attachment {
    fn rejected(token: WaiterToken) -> Self {
        Self {
            status: AttachStatus::Rejected,
            token,
            waiter: None,
        }
    }

    /// Wait for the outcome. A rejected or duplicate attachment has nothing
    /// to wait for and resolves to `None` immediately.
    pub async fn outcome(self) -> Option<Outcome> {
        match self.waiter {
            Some(waiter) => Some(waiter.await),
            None => None,
        }
    }
}

/// Coalescing registry of in-flight export retrievals.
///
/// Cheap to clone; clones share the same in-flight state. Attaching must
/// happen inside a Tokio runtime, which runs the pipeline tasks.
pub struct Registry<M, C, D> {
    pipeline: Arc<Pipeline<M, C, D>>,
    pending:  Arc<PendingTable>,
}

impl<M, C, D> Clone for Registry<M, C, D> {
    fn clone(&self) -> Self {
        Self {
            pipeline: Arc::clone(&self.pipeline),
            pending:  Arc::clone(&self.pending),
        }
    }
}

impl<M, C, D> Registry<M, C, D>
where
    M: MetadataSource,
    C: ContentSource,
    D: ArchiveDecoder,
{
    pub fn new(pipeline: Pipeline<M, C, D>) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
            pending:  Arc::new(PendingTable::default()),
        }
    }

    /// Register `token` as a waiter for `key`, launching a retrieval if none
    /// is in flight.
    pub fn attach(&self, key: &str, token: WaiterToken) -> Attachment {
        let key = match ResourceKey::new(key) {
            Ok(key) => key,
            Err(_) => {
                debug!(key, %token, "attach rejected: invalid key");
                return Attachment::rejected(token);
            }
        };

        let (sender, receiver) = oneshot::channel();
        let status = match self.pending.register(&key, token, sender) {
            Registration::Created => AttachStatus::Started,
            Registration::Appended => AttachStatus::Joined,
            Registration::Duplicate => {
                debug!(key = %key, %token, "attach ignored: token already waiting");
                return Attachment {
                    status: AttachStatus::Joined,
                    token,
                    waiter: None,
                };
            }
        };
        debug!(key = %key, %token, ?status, "attached");

        if status == AttachStatus::Started {
            self.launch(key.clone());
        }

        Attachment {
            status,
            token,
            waiter: Some(Waiter::new(key, token, receiver)),
        }
    }

    /// Attach with a freshly minted token.
    pub fn attach_new(&self, key: &str) -> Attachment { self.attach(key, WaiterToken::new()) }

    /// Attach using the application id of `configuration`.
    pub fn attach_config<E>(&self, configuration: &E, token: WaiterToken) -> Attachment
    where
        E: ExportConfiguration + ?Sized,
    {
        self.attach(configuration.application_id().unwrap_or_default(), token)
    }

    /// Callback-style attach. `on_complete` runs once with the outcome.
    ///
    /// When the key is rejected or `token` is already waiting on this key,
    /// `on_complete` is dropped without being called.
    pub fn attach_with<F>(&self, key: &str, token: WaiterToken, on_complete: F) -> AttachStatus
    where
        F: FnOnce(Outcome) + Send + 'static,
    {
        let attachment = self.attach(key, token);
        if let Some(waiter) = attachment.waiter {
            tokio::spawn(async move { on_complete(waiter.await) });
        }
        attachment.status
    }

    /// Attach with a fresh token and wait for the outcome.
    pub async fn retrieve(&self, key: &str) -> Outcome {
        match self.attach_new(key).waiter {
            Some(waiter) => waiter.await,
            None => Err(RetrieveError::InvalidKey(key.to_string())),
        }
    }

    /// Whether a retrieval for `key` is in flight.
    pub fn is_pending(&self, key: &str) -> bool { self.pending.is_pending(key) }

    /// Number of waiters registered for the in-flight retrieval of `key`.
    pub fn waiter_count(&self, key: &str) -> usize { self.pending.waiter_count(key) }

    /// Keys with a retrieval in flight, sorted.
    pub fn pending_keys(&self) -> Vec<ResourceKey> { self.pending.keys() }

    fn launch(&self, key: ResourceKey) {
        let pipeline = Arc::clone(&self.pipeline);
        let completion = Completion::new(Arc::clone(&self.pending), key.clone());
        let span = info_span!("export_retrieval", key = %key);

        tokio::spawn(
            async move {
                let outcome = pipeline.run(&key).await;
                completion.finish(outcome);
            }
            .instrument(span),
        );
    }
}
