//! Live-sync view-model layer.
//!
//! Sits between the UI and the document store: [`ProjectViewModel`] and
//! [`TodoViewModel`] expose validated mutations and typed live feeds,
//! [`SelectionCoordinator`] decides which todo feed should be open, and
//! [`SyncSession`] ties all three to an authenticated user as a single
//! background task with watchable outputs.

pub mod error;
pub mod feed;
pub mod projects;
pub mod selection;
pub mod session;
pub mod todos;

pub use error::{SyncError, SyncResult};
pub use feed::{ProjectFeed, TodoFeed, TypedFeed};
pub use projects::{ProjectViewModel, SweepReport};
pub use selection::{Selection, SelectionCoordinator, SelectionEffect};
pub use session::{SessionHandle, SessionState, SyncSession};
pub use todos::TodoViewModel;
