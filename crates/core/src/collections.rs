//! Well-known document collection name constants.
//!
//! These must match the collection names in the backing store; every client
//! that shares the store reads and writes the same two collections.

/// Projects, each owned by exactly one user (`userId` field).
pub const COLLECTION_PROJECTS: &str = "projects";

/// Todos, each nested under exactly one project (`projectId` field).
pub const COLLECTION_TODOS: &str = "todos";
