use crate::types::DocId;

/// Domain-level errors shared by the view-model layer.
///
/// Infrastructure failures (backend unreachable, store shut down) live in
/// the store crate's error type; this enum covers only what the domain
/// itself can reject.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DocId },

    #[error("Validation failed: {0}")]
    Validation(String),
}
