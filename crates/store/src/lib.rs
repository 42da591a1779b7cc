//! Document-store seam for the honeydo workspace.
//!
//! Defines the [`DocumentStore`] trait that the sync layer programs against,
//! the [`Document`] envelope and [`Query`] language it speaks, and the
//! [`ChangeFeed`] handle through which live query results are delivered.
//! [`MemoryStore`] is the bundled in-process backend used by the view-model
//! tests and the demo binary.

pub mod document;
pub mod error;
pub mod feed;
pub mod memory;
pub mod query;
pub mod store;

pub use document::Document;
pub use error::StoreError;
pub use feed::{ChangeFeed, QuerySnapshot, UnsubscribeGuard};
pub use memory::{MemoryStore, MemoryStoreConfig};
pub use query::{Filter, Query};
pub use store::DocumentStore;
