use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use tokio::sync::oneshot;

use crate::data::{Outcome, ResourceKey, WaiterToken};
use crate::error::RetrieveError;

/// Resolves to the outcome of the retrieval it was attached to.
///
/// Dropping a `Waiter` does not cancel the retrieval; other waiters still
/// receive the outcome.
#[derive(Debug)]
#[must_use = "a waiter does nothing unless awaited"]
pub struct Waiter {
    key:      ResourceKey,
    token:    WaiterToken,
    receiver: oneshot::Receiver<Outcome>,
}

impl Waiter {
    pub(crate) fn new(key: ResourceKey, token: WaiterToken, receiver: oneshot::Receiver<Outcome>) -> Self {
        Self { key, token, receiver }
    }

    pub fn key(&self) -> &ResourceKey { &self.key }

    pub fn token(&self) -> WaiterToken { self.token }
}

impl Future for Waiter {
    type Output = Outcome;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Outcome> {
        Pin::new(&mut self.receiver)
            .poll(cx)
            .map(|received| received.unwrap_or(Err(RetrieveError::Abandoned)))
    }
}
