//! Error types for store operations.

use honeydo_core::types::DocId;

/// Errors surfaced by [`DocumentStore`](crate::DocumentStore) implementations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The addressed document does not exist.
    #[error("Document not found: {collection}/{id}")]
    NotFound {
        collection: &'static str,
        id: DocId,
    },

    /// The backend cannot currently serve reads or writes.
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// A write carried a body that is not a JSON object.
    #[error("Document fields must be a JSON object")]
    InvalidFields,

    /// A document body could not be serialized or deserialized.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The store has been shut down and no longer accepts operations.
    #[error("Store is closed")]
    Closed,
}
