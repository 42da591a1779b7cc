//! Project entity model, write DTOs, and validation.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::{DocId, Timestamp, UserId};

/// A project document from the `projects` collection.
///
/// Field names serialize in camelCase: the stored schema uses camelCase
/// keys (`userId`, `createdAt`), and every client sharing the store must
/// write the same shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: DocId,
    pub name: String,
    pub user_id: UserId,
    pub created_at: Timestamp,
}

/// DTO for creating a new project. Serialized into the document payload;
/// the store assigns the id.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProject {
    pub name: String,
    pub user_id: UserId,
    pub created_at: Timestamp,
}

impl CreateProject {
    /// Build a creation payload stamped with the current time.
    pub fn new(name: impl Into<String>, user_id: impl Into<UserId>) -> Self {
        Self {
            name: name.into(),
            user_id: user_id.into(),
            created_at: chrono::Utc::now(),
        }
    }
}

/// DTO for a partial project update. Only non-`None` fields are written.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProject {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Validate a project name: must contain at least one non-whitespace
/// character.
pub fn validate_project_name(name: &str) -> Result<(), CoreError> {
    if name.trim().is_empty() {
        Err(CoreError::Validation(
            "Project name must not be empty".to_string(),
        ))
    } else {
        Ok(())
    }
}
