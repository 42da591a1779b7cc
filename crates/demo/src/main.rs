//! `honeydo-demo` -- scripted walkthrough of the live-sync layer.
//!
//! Runs the whole stack in one process: an in-memory document store with a
//! configurable propagation delay, in-memory auth, and a sync session. One
//! task plays the user (sign up, create, select, toggle, go offline,
//! recover, sign out) while an observer task logs every watch update the
//! way a UI would re-render it.
//!
//! # Environment variables
//!
//! | Variable                | Required | Default | Description                              |
//! |-------------------------|----------|---------|------------------------------------------|
//! | `HONEYDO_PROPAGATION_MS`| no       | `150`   | Simulated backend propagation delay (ms) |

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use honeydo_auth::{AuthProvider, MemoryAuth};
use honeydo_core::collections::COLLECTION_TODOS;
use honeydo_store::{DocumentStore, MemoryStore, MemoryStoreConfig};
use honeydo_sync::{
    ProjectViewModel, SessionHandle, SessionState, SyncSession, TodoViewModel,
};

/// Default simulated propagation delay.
const DEFAULT_PROPAGATION_MS: u64 = 150;

/// Pause between scripted steps so the observer output stays readable.
const STEP_PAUSE: Duration = Duration::from_millis(400);

type DemoResult<T> = Result<T, Box<dyn std::error::Error + Send + Sync>>;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "honeydo_demo=info,honeydo_sync=debug,honeydo_store=info,honeydo_auth=info".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let propagation_ms: u64 = std::env::var("HONEYDO_PROPAGATION_MS")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(DEFAULT_PROPAGATION_MS);

    tracing::info!(propagation_ms, "Starting honeydo-demo");

    let store = MemoryStore::start_with(MemoryStoreConfig {
        propagation_delay: Duration::from_millis(propagation_ms),
    });
    let auth = Arc::new(MemoryAuth::new());

    if let Err(e) = run_script(store, auth).await {
        tracing::error!(error = %e, "Demo failed");
        std::process::exit(1);
    }

    tracing::info!("Demo finished");
}

/// The user's side of the demo: every mutation and lifecycle step.
async fn run_script(store: Arc<MemoryStore>, auth: Arc<MemoryAuth>) -> DemoResult<()> {
    let projects_vm = ProjectViewModel::new(store.clone());
    let todos_vm = TodoViewModel::new(store.clone());

    let user = auth.sign_up("demo@honeydo.app", "hunter2").await?;
    let handle = SyncSession::start(store.clone(), auth.as_ref(), user.clone());
    let observer = spawn_observer(&handle);

    let mut state = handle.state();
    wait_for(&mut state, |s| *s == SessionState::Live).await?;

    // Build out a small workspace.
    let kitchen = projects_vm.create(&user.id, "Kitchen").await?;
    let garage = projects_vm.create(&user.id, "Garage").await?;
    pause().await;

    // Follow the kitchen and work its list.
    handle.select(kitchen.id.clone());
    todos_vm.create(&kitchen.id, "Buy milk").await?;
    todos_vm.create(&kitchen.id, "Wipe counters").await?;

    let mut todos = handle.todos();
    let list = wait_for(&mut todos, |list| list.len() == 2).await?;
    pause().await;

    let milk = list
        .iter()
        .find(|todo| todo.title == "Buy milk")
        .cloned()
        .ok_or("the kitchen list should contain Buy milk")?;
    todos_vm.toggle(&milk).await?;
    wait_for(&mut todos, |list| list.iter().any(|t| t.completed)).await?;
    pause().await;

    // Switch over to the garage.
    handle.select(garage.id.clone());
    todos_vm.create(&garage.id, "Inflate tires").await?;
    wait_for(&mut todos, |list| {
        list.iter().any(|t| t.title == "Inflate tires")
    })
    .await?;
    pause().await;

    // Pull the plug: the session degrades and keeps the last data.
    store.set_offline(true);
    wait_for(&mut state, |s| *s == SessionState::Degraded).await?;
    match projects_vm.create(&user.id, "Basement").await {
        Err(e) if e.is_unavailable() => {
            tracing::warn!(error = %e, "Write rejected while offline")
        }
        other => tracing::error!(?other, "Expected an unavailable error"),
    }
    pause().await;

    // Plug it back in and retry.
    store.set_offline(false);
    handle.retry();
    wait_for(&mut state, |s| *s == SessionState::Live).await?;
    pause().await;

    // Cascade delete the selected project; the selection clears itself.
    projects_vm.delete(&garage.id).await?;
    wait_for(&mut todos, |list| list.is_empty()).await?;
    pause().await;

    // Simulate another client that crashed between deleting a project and
    // its todos, then sweep the leftovers.
    store
        .add_document(
            COLLECTION_TODOS,
            serde_json::json!({
                "title": "Left behind",
                "completed": false,
                "projectId": "crashed-client-project",
                "createdAt": chrono::Utc::now(),
            }),
        )
        .await?;
    let report = projects_vm.sweep_orphans().await?;
    tracing::info!(
        scanned = report.scanned,
        removed = report.removed,
        "Orphan sweep finished"
    );
    pause().await;

    // Sign out; the session notices and winds itself down.
    auth.sign_out().await;
    for _ in 0..100 {
        if !handle.is_running() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    store.shutdown().await;
    let _ = observer.await;
    Ok(())
}

/// Log every watch update the way a UI would re-render it.
///
/// Ends on its own once the session's watch channels close.
fn spawn_observer(handle: &SessionHandle) -> tokio::task::JoinHandle<()> {
    let mut projects = handle.projects();
    let mut todos = handle.todos();
    let mut selection = handle.selection();
    let mut state = handle.state();

    tokio::spawn(async move {
        loop {
            tokio::select! {
                changed = state.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    let current = *state.borrow_and_update();
                    tracing::info!(state = ?current, "Session state changed");
                }
                changed = projects.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    let names: Vec<String> = projects
                        .borrow_and_update()
                        .iter()
                        .map(|p| p.name.clone())
                        .collect();
                    tracing::info!(count = names.len(), ?names, "Project list updated");
                }
                changed = selection.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    let current = selection.borrow_and_update().clone();
                    tracing::info!(selection = ?current, "Selection changed");
                }
                changed = todos.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    let items: Vec<String> = todos
                        .borrow_and_update()
                        .iter()
                        .map(|t| {
                            let mark = if t.completed { "[x]" } else { "[ ]" };
                            format!("{mark} {}", t.title)
                        })
                        .collect();
                    tracing::info!(count = items.len(), ?items, "Todo list updated");
                }
            }
        }
        tracing::debug!("Watch observer stopped");
    })
}

/// Wait until a watch channel holds a value satisfying `pred`.
async fn wait_for<T, F>(rx: &mut watch::Receiver<T>, mut pred: F) -> DemoResult<T>
where
    T: Clone,
    F: FnMut(&T) -> bool,
{
    let outcome = tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            {
                let current = rx.borrow_and_update();
                if pred(&current) {
                    return Ok(current.clone());
                }
            }
            if rx.changed().await.is_err() {
                return Err("watch channel closed while waiting");
            }
        }
    })
    .await;
    match outcome {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => Err(e.into()),
        Err(_) => Err("timed out waiting for a watch update".into()),
    }
}

/// Give the observer a beat to print before the next step.
async fn pause() {
    tokio::time::sleep(STEP_PAUSE).await;
}
