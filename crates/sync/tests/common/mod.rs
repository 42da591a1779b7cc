//! Shared helpers for the sync-layer integration tests.
//!
//! Every test runs against a real `MemoryStore` and `MemoryAuth`, so the
//! fixtures here only wire the two together and provide bounded waiting
//! utilities for the asynchronous parts.

// Not every test binary uses every helper.
#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use tokio::sync::watch;

use honeydo_auth::{AuthProvider, AuthUser, MemoryAuth};
use honeydo_store::MemoryStore;
use honeydo_sync::TypedFeed;

/// Upper bound for any single wait in these tests.
pub const WAIT_TIMEOUT: Duration = Duration::from_secs(5);

/// A store and auth pair with one signed-in user.
pub struct Fixture {
    pub store: Arc<MemoryStore>,
    pub auth: Arc<MemoryAuth>,
    pub user: AuthUser,
}

/// Build a fixture with a default store and `alice` signed in.
pub async fn signed_in_fixture() -> Fixture {
    let store = MemoryStore::start();
    let auth = Arc::new(MemoryAuth::new());
    let user = auth
        .sign_up("alice@example.com", "hunter2")
        .await
        .expect("fixture sign-up should succeed");
    Fixture { store, auth, user }
}

/// Wait until a watch channel holds a value satisfying `pred`, then return
/// that value.
pub async fn wait_for<T, F>(rx: &mut watch::Receiver<T>, mut pred: F) -> T
where
    T: Clone,
    F: FnMut(&T) -> bool,
{
    let result = tokio::time::timeout(WAIT_TIMEOUT, async {
        loop {
            {
                let current = rx.borrow_and_update();
                if pred(&current) {
                    return current.clone();
                }
            }
            rx.changed().await.expect("watch should stay open");
        }
    })
    .await;
    result.expect("timed out waiting for a watch value")
}

/// Poll `condition` until it holds or the timeout elapses.
pub async fn wait_until(mut condition: impl FnMut() -> bool) {
    for _ in 0..200 {
        if condition() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("condition not met within the polling window");
}

/// Receive the next snapshot from a typed feed, with a timeout.
pub async fn next_snapshot<T: DeserializeOwned>(feed: &mut TypedFeed<T>) -> Vec<T> {
    tokio::time::timeout(WAIT_TIMEOUT, feed.recv())
        .await
        .expect("timed out waiting for a snapshot")
        .expect("feed should stay open")
}
