//! Project selection state machine.
//!
//! Pure logic, no I/O: the coordinator tracks which project is selected and
//! answers every transition with a [`SelectionEffect`] telling the caller
//! what to do about the todo feed. Keeping the decisions here and the feed
//! handling in the session makes the transition table testable on its own.

use honeydo_core::types::DocId;
use honeydo_core::Project;

// ---------------------------------------------------------------------------
// Selection
// ---------------------------------------------------------------------------

/// The current selection: nothing, or exactly one project.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Selection {
    /// No project selected; no todo feed should be open.
    #[default]
    None,

    /// The project whose todos are being followed.
    Project(DocId),
}

impl Selection {
    /// The selected project id, if any.
    pub fn project_id(&self) -> Option<&str> {
        match self {
            Selection::None => None,
            Selection::Project(id) => Some(id),
        }
    }

    /// Whether `project_id` is the selected project.
    pub fn is_selected(&self, project_id: &str) -> bool {
        self.project_id() == Some(project_id)
    }
}

// ---------------------------------------------------------------------------
// SelectionEffect
// ---------------------------------------------------------------------------

/// What the caller must do to the todo feed after a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionEffect {
    /// Open a todo feed for this project. Any previously open todo feed
    /// must be dropped first; at most one is ever live.
    OpenTodoFeed(DocId),

    /// Close the open todo feed and clear its data.
    CloseTodoFeed,

    /// Nothing to do.
    None,
}

// ---------------------------------------------------------------------------
// SelectionCoordinator
// ---------------------------------------------------------------------------

/// Tracks the selection and decides todo-feed transitions.
#[derive(Debug, Default)]
pub struct SelectionCoordinator {
    selection: Selection,
}

impl SelectionCoordinator {
    /// Start with nothing selected.
    pub fn new() -> Self {
        Self::default()
    }

    /// The current selection.
    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// Select a project.
    ///
    /// Re-selecting the current project is a no-op so the feed is not
    /// churned; selecting a different one replaces the selection and asks
    /// for its feed.
    pub fn select(&mut self, project_id: DocId) -> SelectionEffect {
        if self.selection.is_selected(&project_id) {
            return SelectionEffect::None;
        }
        self.selection = Selection::Project(project_id.clone());
        SelectionEffect::OpenTodoFeed(project_id)
    }

    /// Drop the selection, if there is one.
    pub fn clear(&mut self) -> SelectionEffect {
        match std::mem::take(&mut self.selection) {
            Selection::None => SelectionEffect::None,
            Selection::Project(_) => SelectionEffect::CloseTodoFeed,
        }
    }

    /// Reconcile the selection against a fresh project snapshot.
    ///
    /// When the selected project is no longer in the list (deleted locally
    /// or by another client), the selection clears itself and the feed must
    /// close; a feed over a deleted project would only ever deliver noise.
    pub fn observe_projects(&mut self, projects: &[Project]) -> SelectionEffect {
        match &self.selection {
            Selection::Project(id) if !projects.iter().any(|p| p.id == *id) => {
                self.selection = Selection::None;
                SelectionEffect::CloseTodoFeed
            }
            _ => SelectionEffect::None,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::Utc;

    fn project(id: &str) -> Project {
        Project {
            id: id.to_string(),
            name: format!("Project {id}"),
            user_id: "user-1".to_string(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn default_selection_is_none() {
        let coordinator = SelectionCoordinator::new();
        assert_eq!(*coordinator.selection(), Selection::None);
        assert_eq!(coordinator.selection().project_id(), None);
    }

    #[test]
    fn selecting_a_project_opens_its_feed() {
        let mut coordinator = SelectionCoordinator::new();

        let effect = coordinator.select("p-1".to_string());

        assert_eq!(effect, SelectionEffect::OpenTodoFeed("p-1".to_string()));
        assert!(coordinator.selection().is_selected("p-1"));
    }

    #[test]
    fn reselecting_the_same_project_is_a_noop() {
        let mut coordinator = SelectionCoordinator::new();
        coordinator.select("p-1".to_string());

        let effect = coordinator.select("p-1".to_string());

        assert_eq!(effect, SelectionEffect::None);
        assert!(coordinator.selection().is_selected("p-1"));
    }

    #[test]
    fn switching_projects_replaces_the_feed() {
        let mut coordinator = SelectionCoordinator::new();
        coordinator.select("p-1".to_string());

        let effect = coordinator.select("p-2".to_string());

        assert_eq!(effect, SelectionEffect::OpenTodoFeed("p-2".to_string()));
        assert!(coordinator.selection().is_selected("p-2"));
        assert!(!coordinator.selection().is_selected("p-1"));
    }

    #[test]
    fn clear_closes_the_feed() {
        let mut coordinator = SelectionCoordinator::new();
        coordinator.select("p-1".to_string());

        let effect = coordinator.clear();

        assert_eq!(effect, SelectionEffect::CloseTodoFeed);
        assert_eq!(*coordinator.selection(), Selection::None);
    }

    #[test]
    fn clear_without_a_selection_is_a_noop() {
        let mut coordinator = SelectionCoordinator::new();

        let effect = coordinator.clear();

        assert_eq!(effect, SelectionEffect::None);
    }

    #[test]
    fn removing_the_selected_project_clears_the_selection() {
        let mut coordinator = SelectionCoordinator::new();
        coordinator.select("p-1".to_string());

        let effect = coordinator.observe_projects(&[project("p-2"), project("p-3")]);

        assert_eq!(effect, SelectionEffect::CloseTodoFeed);
        assert_eq!(*coordinator.selection(), Selection::None);
    }

    #[test]
    fn snapshots_containing_the_selection_keep_it() {
        let mut coordinator = SelectionCoordinator::new();
        coordinator.select("p-1".to_string());

        let effect = coordinator.observe_projects(&[project("p-1"), project("p-2")]);

        assert_eq!(effect, SelectionEffect::None);
        assert!(coordinator.selection().is_selected("p-1"));
    }

    #[test]
    fn observing_with_no_selection_is_a_noop() {
        let mut coordinator = SelectionCoordinator::new();

        let effect = coordinator.observe_projects(&[project("p-1")]);

        assert_eq!(effect, SelectionEffect::None);
        assert_eq!(*coordinator.selection(), Selection::None);
    }

    #[test]
    fn an_empty_snapshot_clears_any_selection() {
        let mut coordinator = SelectionCoordinator::new();
        coordinator.select("p-1".to_string());

        let effect = coordinator.observe_projects(&[]);

        assert_eq!(effect, SelectionEffect::CloseTodoFeed);
        assert_eq!(*coordinator.selection(), Selection::None);
    }
}
