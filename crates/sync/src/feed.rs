//! Typed wrappers over raw store feeds.
//!
//! A [`TypedFeed`] decodes each [`QuerySnapshot`] into domain models as it
//! arrives. Documents that fail to decode are logged and skipped rather than
//! poisoning the whole snapshot; one malformed write from another client must
//! not blank a user's list.

use std::marker::PhantomData;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures::Stream;
use serde::de::DeserializeOwned;

use honeydo_core::{Project, Todo};
use honeydo_store::{ChangeFeed, QuerySnapshot};

/// Live feed of the user's projects.
pub type ProjectFeed = TypedFeed<Project>;

/// Live feed of one project's todos.
pub type TodoFeed = TypedFeed<Todo>;

// ---------------------------------------------------------------------------
// TypedFeed
// ---------------------------------------------------------------------------

/// A [`ChangeFeed`] whose snapshots are decoded into `Vec<T>`.
///
/// Carries the underlying feed's semantics: the first delivery is the
/// current result set, later deliveries are full replacements, and `None`
/// means the store ended the feed. Dropping the typed feed drops the inner
/// feed and with it the store subscription.
#[derive(Debug)]
pub struct TypedFeed<T> {
    inner: ChangeFeed,
    entity: &'static str,
    _marker: PhantomData<fn() -> T>,
}

impl<T: DeserializeOwned> TypedFeed<T> {
    pub(crate) fn new(inner: ChangeFeed, entity: &'static str) -> Self {
        Self {
            inner,
            entity,
            _marker: PhantomData,
        }
    }

    /// Wait for the next decoded snapshot.
    ///
    /// Returns `None` once the store has ended the feed.
    pub async fn recv(&mut self) -> Option<Vec<T>> {
        let snapshot = self.inner.recv().await?;
        Some(self.decode_snapshot(snapshot))
    }

    /// Detach from the store by consuming the feed.
    pub fn unsubscribe(self) {}

    fn decode_snapshot(&self, snapshot: QuerySnapshot) -> Vec<T> {
        let mut items = Vec::with_capacity(snapshot.len());
        for doc in &snapshot.docs {
            match doc.decode::<T>() {
                Ok(item) => items.push(item),
                Err(e) => {
                    tracing::warn!(
                        entity = self.entity,
                        doc_id = %doc.id,
                        error = %e,
                        "Skipping document that does not decode"
                    );
                }
            }
        }
        items
    }
}

impl<T: DeserializeOwned> Stream for TypedFeed<T> {
    type Item = Vec<T>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        match Pin::new(&mut this.inner).poll_next(cx) {
            Poll::Ready(Some(snapshot)) => Poll::Ready(Some(this.decode_snapshot(snapshot))),
            Poll::Ready(None) => Poll::Ready(None),
            Poll::Pending => Poll::Pending,
        }
    }
}
