//! Error type for the sync layer.

use honeydo_core::CoreError;
use honeydo_store::StoreError;

/// Errors surfaced by view models and the sync session.
///
/// Wraps [`CoreError`] for domain validation and [`StoreError`] for backend
/// failures. The predicate methods classify errors the way callers branch on
/// them: reject the input, tell the user the thing is gone, or offer a retry.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    /// A domain-level error from `honeydo_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A backend error from `honeydo_store`.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

/// Convenience type alias for sync-layer return values.
pub type SyncResult<T> = Result<T, SyncError>;

impl SyncError {
    /// The input was rejected before reaching the store.
    pub fn is_validation(&self) -> bool {
        matches!(self, SyncError::Core(CoreError::Validation(_)))
    }

    /// The addressed entity does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            SyncError::Core(CoreError::NotFound { .. })
                | SyncError::Store(StoreError::NotFound { .. })
        )
    }

    /// The backend is unreachable; the operation may succeed on retry.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, SyncError::Store(StoreError::Unavailable(_)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_errors_are_classified() {
        let err = SyncError::from(CoreError::Validation("empty name".to_string()));
        assert!(err.is_validation());
        assert!(!err.is_not_found());
        assert!(!err.is_unavailable());
    }

    #[test]
    fn not_found_is_detected_from_both_layers() {
        let core = SyncError::from(CoreError::NotFound {
            entity: "project",
            id: "p-1".to_string(),
        });
        assert!(core.is_not_found());

        let store = SyncError::from(StoreError::NotFound {
            collection: "todos",
            id: "t-1".to_string(),
        });
        assert!(store.is_not_found());
    }

    #[test]
    fn unavailable_maps_to_retryable() {
        let err = SyncError::from(StoreError::Unavailable("offline".to_string()));
        assert!(err.is_unavailable());
        assert!(!err.is_validation());
    }

    #[test]
    fn core_errors_display_transparently() {
        let err = SyncError::from(CoreError::Validation("empty name".to_string()));
        assert_eq!(err.to_string(), "Validation failed: empty name");
    }
}
