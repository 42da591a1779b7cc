//! The [`DocumentStore`] trait.

use async_trait::async_trait;

use crate::document::Document;
use crate::error::StoreError;
use crate::feed::ChangeFeed;
use crate::query::Query;

/// Backend-agnostic document store.
///
/// The sync layer only ever talks to this trait, so backends can be swapped
/// without touching the view models. Semantics all implementations must
/// honour:
///
/// - Writes are last-write-wins at document granularity; there are no
///   transactions spanning documents.
/// - [`subscribe`](DocumentStore::subscribe) delivers the current result set
///   as its first snapshot, then a full replacement snapshot after every
///   change to the result set.
/// - [`delete_document`](DocumentStore::delete_document) is idempotent:
///   deleting an absent document succeeds.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Insert a new document and return it with its assigned id.
    ///
    /// `fields` must be a JSON object.
    async fn add_document(
        &self,
        collection: &'static str,
        fields: serde_json::Value,
    ) -> Result<Document, StoreError>;

    /// Merge `patch` into an existing document's fields.
    ///
    /// Only the keys present in `patch` are touched; absent keys keep their
    /// stored values. Fails with [`StoreError::NotFound`] if the document
    /// does not exist.
    async fn update_document(
        &self,
        collection: &'static str,
        id: &str,
        patch: serde_json::Value,
    ) -> Result<(), StoreError>;

    /// Delete a document. Succeeds even if the document is already gone.
    async fn delete_document(&self, collection: &'static str, id: &str) -> Result<(), StoreError>;

    /// Fetch a single document by id, or `None` if absent.
    async fn get_document(
        &self,
        collection: &'static str,
        id: &str,
    ) -> Result<Option<Document>, StoreError>;

    /// Evaluate a query once and return the matching documents.
    async fn fetch(&self, query: &Query) -> Result<Vec<Document>, StoreError>;

    /// Open a live feed over a query.
    async fn subscribe(&self, query: Query) -> Result<ChangeFeed, StoreError>;
}
