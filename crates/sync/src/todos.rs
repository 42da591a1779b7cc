//! Todo view model: validated mutations and a live feed of one project's
//! todos.

use std::sync::Arc;

use honeydo_core::collections::COLLECTION_TODOS;
use honeydo_core::todo::{validate_todo_title, CreateTodo, UpdateTodo};
use honeydo_core::Todo;
use honeydo_store::{DocumentStore, Query, StoreError};

use crate::error::SyncResult;
use crate::feed::{TodoFeed, TypedFeed};

/// Operations on the `todos` collection.
#[derive(Clone)]
pub struct TodoViewModel {
    store: Arc<dyn DocumentStore>,
}

impl TodoViewModel {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Open a live feed of the todos belonging to `project_id`.
    pub async fn subscribe(&self, project_id: &str) -> SyncResult<TodoFeed> {
        let query = Query::where_eq(COLLECTION_TODOS, "projectId", project_id);
        let feed = self.store.subscribe(query).await?;
        Ok(TypedFeed::new(feed, "todo"))
    }

    /// Create an uncompleted todo under `project_id`.
    pub async fn create(&self, project_id: &str, title: &str) -> SyncResult<Todo> {
        validate_todo_title(title)?;

        let create = CreateTodo::new(title, project_id);
        let payload = serde_json::to_value(&create).expect("CreateTodo is always serialisable");
        let doc = self.store.add_document(COLLECTION_TODOS, payload).await?;

        let todo = doc.decode::<Todo>().map_err(StoreError::from)?;
        tracing::debug!(todo_id = %todo.id, project_id, "Todo created");
        Ok(todo)
    }

    /// Flip a todo's completion state.
    ///
    /// Writes the negation of the completion the caller saw. Two clients
    /// toggling concurrently resolve last-write-wins, the same as any other
    /// field update.
    pub async fn toggle(&self, todo: &Todo) -> SyncResult<()> {
        let update = UpdateTodo {
            title: None,
            completed: Some(!todo.completed),
        };
        let payload = serde_json::to_value(&update).expect("UpdateTodo is always serialisable");
        self.store
            .update_document(COLLECTION_TODOS, &todo.id, payload)
            .await?;

        tracing::debug!(todo_id = %todo.id, completed = !todo.completed, "Todo toggled");
        Ok(())
    }

    /// Rename a todo.
    pub async fn rename(&self, todo_id: &str, title: &str) -> SyncResult<()> {
        validate_todo_title(title)?;

        let update = UpdateTodo {
            title: Some(title.to_string()),
            completed: None,
        };
        let payload = serde_json::to_value(&update).expect("UpdateTodo is always serialisable");
        self.store
            .update_document(COLLECTION_TODOS, todo_id, payload)
            .await?;

        tracing::debug!(todo_id, "Todo renamed");
        Ok(())
    }

    /// Delete a todo. Deleting one that is already gone is a success, so
    /// two clients racing to delete the same todo both see it work.
    pub async fn delete(&self, todo_id: &str) -> SyncResult<()> {
        self.store.delete_document(COLLECTION_TODOS, todo_id).await?;
        tracing::debug!(todo_id, "Todo deleted");
        Ok(())
    }
}
