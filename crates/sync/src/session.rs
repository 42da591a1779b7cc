//! The sync session: one background task per signed-in user.
//!
//! [`SyncSession::start`] spawns the task and returns a [`SessionHandle`].
//! Commands flow in over an unbounded channel; projects, todos, selection,
//! and session state flow out over `watch` channels, so any number of UI
//! observers can follow along without touching the loop itself.
//!
//! The loop owns both live feeds. The todo feed is replaced or dropped as
//! the selection changes, which keeps at most one todo feed live at any
//! time; the old feed's store registration is torn down by its drop guard.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use tokio::sync::{mpsc, watch, Mutex};
use tokio::task::JoinHandle;

use honeydo_auth::{AuthProvider, AuthUser};
use honeydo_core::types::{DocId, UserId};
use honeydo_core::{Project, Todo};
use honeydo_store::DocumentStore;

use crate::error::SyncResult;
use crate::feed::{ProjectFeed, TodoFeed, TypedFeed};
use crate::projects::ProjectViewModel;
use crate::selection::{Selection, SelectionCoordinator, SelectionEffect};
use crate::todos::TodoViewModel;

// ---------------------------------------------------------------------------
// SessionState
// ---------------------------------------------------------------------------

/// Lifecycle of the session's connection to the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Feeds are being established; no data published yet.
    Starting,

    /// The project feed is delivering snapshots.
    Live,

    /// The store became unavailable. The last published data is kept so the
    /// UI can keep showing it; [`SessionHandle::retry`] attempts to go live
    /// again.
    Degraded,
}

/// Commands accepted by the session loop.
#[derive(Debug)]
enum SessionCommand {
    Select(DocId),
    ClearSelection,
    Retry,
    Shutdown,
}

// ---------------------------------------------------------------------------
// SessionHandle
// ---------------------------------------------------------------------------

/// The caller's side of a running [`SyncSession`].
///
/// Command methods never block and never fail; commands sent after the
/// session ended are silently dropped. Output accessors hand out fresh
/// `watch` receivers positioned at the current value.
pub struct SessionHandle {
    commands: mpsc::UnboundedSender<SessionCommand>,
    projects: watch::Receiver<Vec<Project>>,
    todos: watch::Receiver<Vec<Todo>>,
    selection: watch::Receiver<Selection>,
    state: watch::Receiver<SessionState>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl SessionHandle {
    /// Select a project and follow its todos.
    pub fn select(&self, project_id: impl Into<DocId>) {
        let _ = self.commands.send(SessionCommand::Select(project_id.into()));
    }

    /// Drop the selection and stop following todos.
    pub fn clear_selection(&self) {
        let _ = self.commands.send(SessionCommand::ClearSelection);
    }

    /// Ask a degraded session to re-establish its feeds.
    pub fn retry(&self) {
        let _ = self.commands.send(SessionCommand::Retry);
    }

    /// Stop the session and wait for its task to finish.
    pub async fn shutdown(&self) {
        let _ = self.commands.send(SessionCommand::Shutdown);
        let task = self.task.lock().await.take();
        if let Some(task) = task {
            let _ = task.await;
        }
    }

    /// Whether the session task is still running.
    pub fn is_running(&self) -> bool {
        !self.commands.is_closed()
    }

    /// Follow the user's project list.
    pub fn projects(&self) -> watch::Receiver<Vec<Project>> {
        self.projects.clone()
    }

    /// Follow the selected project's todos. Empty while nothing is selected.
    pub fn todos(&self) -> watch::Receiver<Vec<Todo>> {
        self.todos.clone()
    }

    /// Follow the selection itself.
    pub fn selection(&self) -> watch::Receiver<Selection> {
        self.selection.clone()
    }

    /// Follow the session lifecycle state.
    pub fn state(&self) -> watch::Receiver<SessionState> {
        self.state.clone()
    }
}

// ---------------------------------------------------------------------------
// SyncSession
// ---------------------------------------------------------------------------

/// Everything the session loop reacts to, gathered in one place so the
/// select arms stay free of handler logic.
enum LoopEvent {
    Command(SessionCommand),
    HandleDropped,
    AuthChanged(bool),
    Projects(Option<Vec<Project>>),
    Todos(Option<Vec<Todo>>),
}

/// Per-user sync task state. Constructed and consumed by
/// [`SyncSession::start`]; everything after that happens inside the loop.
pub struct SyncSession {
    projects_vm: ProjectViewModel,
    todos_vm: TodoViewModel,
    user_id: UserId,
    coordinator: SelectionCoordinator,
    state: SessionState,
    project_feed: Option<ProjectFeed>,
    todo_feed: Option<TodoFeed>,
    auth_session: watch::Receiver<Option<AuthUser>>,
    projects_tx: watch::Sender<Vec<Project>>,
    todos_tx: watch::Sender<Vec<Todo>>,
    selection_tx: watch::Sender<Selection>,
    state_tx: watch::Sender<SessionState>,
}

impl SyncSession {
    /// Spawn a sync session for `user` and return its handle.
    ///
    /// The session follows the auth provider's session watch and ends
    /// itself when `user` is no longer the signed-in user.
    pub fn start(
        store: Arc<dyn DocumentStore>,
        auth: &dyn AuthProvider,
        user: AuthUser,
    ) -> SessionHandle {
        let (commands_tx, commands_rx) = mpsc::unbounded_channel();
        let (projects_tx, projects_rx) = watch::channel(Vec::new());
        let (todos_tx, todos_rx) = watch::channel(Vec::new());
        let (selection_tx, selection_rx) = watch::channel(Selection::None);
        let (state_tx, state_rx) = watch::channel(SessionState::Starting);

        let session = SyncSession {
            projects_vm: ProjectViewModel::new(Arc::clone(&store)),
            todos_vm: TodoViewModel::new(store),
            user_id: user.id,
            coordinator: SelectionCoordinator::new(),
            state: SessionState::Starting,
            project_feed: None,
            todo_feed: None,
            auth_session: auth.watch_session(),
            projects_tx,
            todos_tx,
            selection_tx,
            state_tx,
        };
        let task = tokio::spawn(session.run(commands_rx));

        SessionHandle {
            commands: commands_tx,
            projects: projects_rx,
            todos: todos_rx,
            selection: selection_rx,
            state: state_rx,
            task: Mutex::new(Some(task)),
        }
    }

    async fn run(mut self, mut commands: mpsc::UnboundedReceiver<SessionCommand>) {
        tracing::info!(user_id = %self.user_id, "Sync session started");

        // The auth watch only reports transitions after this receiver was
        // created; a sign-out that completed before the spawn has to be
        // checked directly.
        if !self.still_signed_in() {
            tracing::info!(user_id = %self.user_id, "User not signed in; sync session ended");
            return;
        }

        if let Err(e) = self.open_project_feed().await {
            tracing::warn!(user_id = %self.user_id, error = %e, "Starting degraded: no project feed");
            self.enter_degraded();
        }

        loop {
            let event = tokio::select! {
                command = commands.recv() => match command {
                    Some(command) => LoopEvent::Command(command),
                    None => LoopEvent::HandleDropped,
                },
                changed = self.auth_session.changed() => LoopEvent::AuthChanged(changed.is_ok()),
                snapshot = next_feed(&mut self.project_feed) => LoopEvent::Projects(snapshot),
                snapshot = next_feed(&mut self.todo_feed) => LoopEvent::Todos(snapshot),
            };

            match event {
                LoopEvent::Command(SessionCommand::Select(project_id)) => {
                    self.handle_select(project_id).await;
                }
                LoopEvent::Command(SessionCommand::ClearSelection) => {
                    let effect = self.coordinator.clear();
                    self.apply_effect(effect).await;
                }
                LoopEvent::Command(SessionCommand::Retry) => {
                    self.handle_retry().await;
                }
                LoopEvent::Command(SessionCommand::Shutdown) | LoopEvent::HandleDropped => {
                    tracing::info!(user_id = %self.user_id, "Sync session shutting down");
                    break;
                }
                LoopEvent::AuthChanged(open) => {
                    if !open || !self.still_signed_in() {
                        tracing::info!(user_id = %self.user_id, "User signed out; ending sync session");
                        break;
                    }
                }
                LoopEvent::Projects(Some(projects)) => {
                    self.handle_projects(projects).await;
                }
                LoopEvent::Todos(Some(todos)) => {
                    self.todos_tx.send_replace(todos);
                }
                LoopEvent::Projects(None) | LoopEvent::Todos(None) => {
                    self.enter_degraded();
                }
            }
        }

        tracing::info!(user_id = %self.user_id, "Sync session ended");
    }

    /// Whether the auth session still belongs to this session's user.
    fn still_signed_in(&mut self) -> bool {
        let session = self.auth_session.borrow_and_update();
        session
            .as_ref()
            .map(|user| user.id == self.user_id)
            .unwrap_or(false)
    }

    async fn handle_select(&mut self, project_id: DocId) {
        let effect = self.coordinator.select(project_id);
        self.apply_effect(effect).await;
    }

    async fn handle_projects(&mut self, projects: Vec<Project>) {
        self.set_state(SessionState::Live);

        let effect = self.coordinator.observe_projects(&projects);
        if effect == SelectionEffect::CloseTodoFeed {
            tracing::info!(user_id = %self.user_id, "Selected project disappeared; selection cleared");
        }
        self.projects_tx.send_replace(projects);
        self.apply_effect(effect).await;
    }

    async fn handle_retry(&mut self) {
        if self.state != SessionState::Degraded {
            return;
        }

        tracing::info!(user_id = %self.user_id, "Retrying live feeds");
        if let Err(e) = self.open_project_feed().await {
            tracing::warn!(user_id = %self.user_id, error = %e, "Retry failed; staying degraded");
            return;
        }

        // Reattach the todo feed for whatever is still selected. The state
        // flips back to Live when the first project snapshot lands.
        let selected = self.coordinator.selection().project_id().map(String::from);
        if let Some(project_id) = selected {
            self.open_todo_feed(&project_id).await;
        }
    }

    /// Carry out a coordinator decision against the actual feeds.
    async fn apply_effect(&mut self, effect: SelectionEffect) {
        match effect {
            SelectionEffect::None => {}
            SelectionEffect::OpenTodoFeed(project_id) => {
                self.publish_selection();
                self.open_todo_feed(&project_id).await;
            }
            SelectionEffect::CloseTodoFeed => {
                self.publish_selection();
                self.todo_feed = None;
                self.todos_tx.send_replace(Vec::new());
            }
        }
    }

    async fn open_project_feed(&mut self) -> SyncResult<()> {
        let feed = self.projects_vm.subscribe(&self.user_id).await?;
        self.project_feed = Some(feed);
        Ok(())
    }

    /// Replace the todo feed with one for `project_id`.
    ///
    /// Published todos are cleared and the previous feed is dropped before
    /// the new subscription is opened, so observers never see the old
    /// project's todos and the session never holds two todo registrations.
    async fn open_todo_feed(&mut self, project_id: &str) {
        self.todos_tx.send_replace(Vec::new());
        // Close before open: the old registration must be released before
        // the subscribe call reaches the store.
        self.todo_feed = None;
        match self.todos_vm.subscribe(project_id).await {
            Ok(feed) => {
                self.todo_feed = Some(feed);
                tracing::debug!(user_id = %self.user_id, project_id, "Todo feed opened");
            }
            Err(e) => {
                tracing::warn!(user_id = %self.user_id, project_id, error = %e, "Could not open todo feed");
                if e.is_unavailable() {
                    self.enter_degraded();
                }
            }
        }
    }

    /// Drop both feeds and mark the session degraded.
    ///
    /// The last published projects and todos are left in place; stale data
    /// beats a blank screen while the store is away.
    fn enter_degraded(&mut self) {
        self.project_feed = None;
        self.todo_feed = None;
        if self.state != SessionState::Degraded {
            tracing::warn!(user_id = %self.user_id, "Live feeds lost; session degraded");
            self.set_state(SessionState::Degraded);
        }
    }

    fn set_state(&mut self, state: SessionState) {
        if self.state == state {
            return;
        }
        self.state = state;
        self.state_tx.send_replace(state);
    }

    fn publish_selection(&self) {
        self.selection_tx
            .send_replace(self.coordinator.selection().clone());
    }
}

/// Yield the feed's next snapshot, or park forever while there is no feed.
///
/// Parking keeps a closed or absent feed from spinning the select loop; the
/// slot only becomes active again once a new feed is installed.
async fn next_feed<T>(feed: &mut Option<TypedFeed<T>>) -> Option<Vec<T>>
where
    T: DeserializeOwned,
{
    match feed {
        Some(feed) => feed.recv().await,
        None => std::future::pending().await,
    }
}
