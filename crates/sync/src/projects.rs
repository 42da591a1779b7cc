//! Project view model: validated mutations and a live feed of the user's
//! projects.

use std::collections::HashSet;
use std::sync::Arc;

use honeydo_core::collections::{COLLECTION_PROJECTS, COLLECTION_TODOS};
use honeydo_core::project::{validate_project_name, CreateProject, UpdateProject};
use honeydo_core::Project;
use honeydo_store::{DocumentStore, Query, StoreError};

use crate::error::SyncResult;
use crate::feed::{ProjectFeed, TypedFeed};

// ---------------------------------------------------------------------------
// SweepReport
// ---------------------------------------------------------------------------

/// Outcome of an orphaned-todo sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SweepReport {
    /// Todos examined.
    pub scanned: usize,

    /// Todos deleted because their project no longer exists.
    pub removed: usize,
}

// ---------------------------------------------------------------------------
// ProjectViewModel
// ---------------------------------------------------------------------------

/// Operations on the `projects` collection.
///
/// Holds only the injected store, so it is cheap to clone and safe to share;
/// all state lives in the store and in feeds handed out by
/// [`subscribe`](ProjectViewModel::subscribe).
#[derive(Clone)]
pub struct ProjectViewModel {
    store: Arc<dyn DocumentStore>,
}

impl ProjectViewModel {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Open a live feed of the projects owned by `user_id`.
    pub async fn subscribe(&self, user_id: &str) -> SyncResult<ProjectFeed> {
        let query = Query::where_eq(COLLECTION_PROJECTS, "userId", user_id);
        let feed = self.store.subscribe(query).await?;
        Ok(TypedFeed::new(feed, "project"))
    }

    /// Create a project owned by `user_id`.
    pub async fn create(&self, user_id: &str, name: &str) -> SyncResult<Project> {
        validate_project_name(name)?;

        let create = CreateProject::new(name, user_id);
        let payload =
            serde_json::to_value(&create).expect("CreateProject is always serialisable");
        let doc = self.store.add_document(COLLECTION_PROJECTS, payload).await?;

        let project = doc.decode::<Project>().map_err(StoreError::from)?;
        tracing::info!(project_id = %project.id, user_id, "Project created");
        Ok(project)
    }

    /// Rename a project.
    pub async fn rename(&self, project_id: &str, name: &str) -> SyncResult<()> {
        validate_project_name(name)?;

        let update = UpdateProject {
            name: Some(name.to_string()),
        };
        let payload =
            serde_json::to_value(&update).expect("UpdateProject is always serialisable");
        self.store
            .update_document(COLLECTION_PROJECTS, project_id, payload)
            .await?;

        tracing::debug!(project_id, "Project renamed");
        Ok(())
    }

    /// Delete a project together with its todos.
    ///
    /// The todos go first, then the project document, so an interruption
    /// leaves a still-listed project with fewer todos rather than todos
    /// whose project is gone. The cascade is not transactional; a todo
    /// created concurrently with the cascade can still be orphaned, which
    /// [`sweep_orphans`](ProjectViewModel::sweep_orphans) cleans up.
    pub async fn delete(&self, project_id: &str) -> SyncResult<()> {
        let todo_query = Query::where_eq(COLLECTION_TODOS, "projectId", project_id);
        let todos = self.store.fetch(&todo_query).await?;
        let todos_removed = todos.len();

        for todo in &todos {
            self.store
                .delete_document(COLLECTION_TODOS, &todo.id)
                .await?;
        }
        self.store
            .delete_document(COLLECTION_PROJECTS, project_id)
            .await?;

        tracing::info!(project_id, todos_removed, "Project deleted with its todos");
        Ok(())
    }

    /// Delete todos whose project no longer exists, store-wide.
    ///
    /// Orphans carry no owner information once their project is gone, so the
    /// sweep scans all projects and all todos rather than one user's slice.
    pub async fn sweep_orphans(&self) -> SyncResult<SweepReport> {
        let projects = self.store.fetch(&Query::all(COLLECTION_PROJECTS)).await?;
        let live: HashSet<&str> = projects.iter().map(|doc| doc.id.as_str()).collect();

        let todos = self.store.fetch(&Query::all(COLLECTION_TODOS)).await?;
        let scanned = todos.len();
        let mut removed = 0;

        for todo in &todos {
            let parent = todo.field("projectId").and_then(|value| value.as_str());
            let orphaned = match parent {
                Some(project_id) => !live.contains(project_id),
                // No parent reference at all: nothing can ever claim it.
                None => true,
            };
            if orphaned {
                self.store.delete_document(COLLECTION_TODOS, &todo.id).await?;
                removed += 1;
            }
        }

        if removed > 0 {
            tracing::info!(scanned, removed, "Swept orphaned todos");
        }
        Ok(SweepReport { scanned, removed })
    }
}
