//! Live query results.
//!
//! A [`ChangeFeed`] is the receiving half of a store subscription. The store
//! pushes a full [`QuerySnapshot`] whenever the query's result set changes,
//! starting with the current result set at subscription time. Dropping the
//! feed detaches the subscription from the store.

use std::pin::Pin;
use std::task::{Context, Poll};

use futures::Stream;
use tokio::sync::mpsc;

use crate::document::Document;

// ---------------------------------------------------------------------------
// QuerySnapshot
// ---------------------------------------------------------------------------

/// The complete result set of a query at one point in time.
///
/// Snapshots replace each other wholesale; there is no delta encoding.
/// Documents are ordered by id so equal result sets compare equal.
#[derive(Debug, Clone, PartialEq)]
pub struct QuerySnapshot {
    /// Every document currently matching the query.
    pub docs: Vec<Document>,
}

impl QuerySnapshot {
    /// Snapshot with no matching documents.
    pub fn empty() -> Self {
        Self { docs: Vec::new() }
    }

    /// Number of documents in the snapshot.
    pub fn len(&self) -> usize {
        self.docs.len()
    }

    /// Whether the snapshot holds no documents.
    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }
}

// ---------------------------------------------------------------------------
// UnsubscribeGuard
// ---------------------------------------------------------------------------

/// Runs a teardown closure when dropped.
///
/// Store backends hand one of these to each [`ChangeFeed`] so that dropping
/// the feed detaches the subscription without the caller having to remember
/// an explicit unsubscribe call.
pub struct UnsubscribeGuard {
    teardown: Option<Box<dyn FnOnce() + Send>>,
}

impl UnsubscribeGuard {
    /// Wrap a teardown closure.
    ///
    /// The closure must not block: it typically just posts a message back to
    /// the store.
    pub fn new(teardown: impl FnOnce() + Send + 'static) -> Self {
        Self {
            teardown: Some(Box::new(teardown)),
        }
    }
}

impl Drop for UnsubscribeGuard {
    fn drop(&mut self) {
        if let Some(teardown) = self.teardown.take() {
            teardown();
        }
    }
}

impl std::fmt::Debug for UnsubscribeGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UnsubscribeGuard")
            .field("armed", &self.teardown.is_some())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// ChangeFeed
// ---------------------------------------------------------------------------

/// Receiving half of a live query subscription.
///
/// The first snapshot describes the result set as of subscription time;
/// later snapshots arrive whenever the result set changes. `None` from
/// [`recv`](ChangeFeed::recv) means the store ended the feed, which happens
/// on shutdown or when the backend goes offline.
#[derive(Debug)]
pub struct ChangeFeed {
    receiver: mpsc::UnboundedReceiver<QuerySnapshot>,
    _guard: UnsubscribeGuard,
}

impl ChangeFeed {
    /// Assemble a feed from its channel half and teardown guard.
    pub fn new(receiver: mpsc::UnboundedReceiver<QuerySnapshot>, guard: UnsubscribeGuard) -> Self {
        Self {
            receiver,
            _guard: guard,
        }
    }

    /// Wait for the next snapshot.
    ///
    /// Returns `None` once the store has ended the feed. Callers treat that
    /// as the signal to resubscribe or degrade, not as an empty result set.
    pub async fn recv(&mut self) -> Option<QuerySnapshot> {
        self.receiver.recv().await
    }

    /// Detach from the store by consuming the feed.
    ///
    /// Equivalent to dropping it; exists to make teardown explicit at call
    /// sites that would otherwise hold the feed in an unused binding.
    pub fn unsubscribe(self) {}
}

impl Stream for ChangeFeed {
    type Item = QuerySnapshot;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.receiver.poll_recv(cx)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
