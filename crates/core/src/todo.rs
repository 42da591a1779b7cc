//! Todo entity model, write DTOs, and validation.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::{DocId, Timestamp};

/// A todo document from the `todos` collection.
///
/// A todo exists only while its parent project exists; the link is the
/// `projectId` field, enforced by the deleting client rather than by the
/// store itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    pub id: DocId,
    pub title: String,
    pub completed: bool,
    pub project_id: DocId,
    pub created_at: Timestamp,
}

/// DTO for creating a new todo. `completed` always starts `false`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTodo {
    pub title: String,
    pub completed: bool,
    pub project_id: DocId,
    pub created_at: Timestamp,
}

impl CreateTodo {
    /// Build a creation payload stamped with the current time.
    pub fn new(title: impl Into<String>, project_id: impl Into<DocId>) -> Self {
        Self {
            title: title.into(),
            completed: false,
            project_id: project_id.into(),
            created_at: chrono::Utc::now(),
        }
    }
}

/// DTO for a partial todo update. Only non-`None` fields are written.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTodo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
}

/// Validate a todo title: must contain at least one non-whitespace
/// character.
pub fn validate_todo_title(title: &str) -> Result<(), CoreError> {
    if title.trim().is_empty() {
        Err(CoreError::Validation(
            "Todo title must not be empty".to_string(),
        ))
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_title_passes() {
        assert!(validate_todo_title("Buy milk").is_ok());
    }

    #[test]
    fn empty_title_fails() {
        assert!(validate_todo_title("").is_err());
    }

    #[test]
    fn whitespace_only_title_fails() {
        assert!(validate_todo_title(" \n ").is_err());
    }

    #[test]
    fn new_todo_starts_uncompleted() {
        let input = CreateTodo::new("Buy milk", "p-1");
        assert!(!input.completed);
    }

    #[test]
    fn create_payload_uses_camel_case_keys() {
        let input = CreateTodo::new("Buy milk", "p-1");
        let value = serde_json::to_value(&input).expect("should serialize");

        assert_eq!(value["title"], "Buy milk");
        assert_eq!(value["completed"], false);
        assert_eq!(value["projectId"], "p-1");
        assert!(value.get("project_id").is_none());
    }

    #[test]
    fn toggle_patch_carries_only_completed() {
        let patch = UpdateTodo {
            title: None,
            completed: Some(true),
        };
        let value = serde_json::to_value(&patch).expect("should serialize");
        assert_eq!(value, serde_json::json!({ "completed": true }));
    }
}
