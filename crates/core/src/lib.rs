//! Shared domain types for the honeydo sync core.
//!
//! This crate has no internal dependencies so the store seam, the auth seam,
//! and the view-model layer can all reference the same collection names,
//! entity models, validation rules, and error taxonomy.

pub mod collections;
pub mod error;
pub mod project;
pub mod todo;
pub mod types;

pub use error::CoreError;
pub use project::{CreateProject, Project, UpdateProject};
pub use todo::{CreateTodo, Todo, UpdateTodo};
