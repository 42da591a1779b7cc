//! The [`AuthProvider`] trait and the session user it hands out.

use async_trait::async_trait;
use tokio::sync::watch;

use honeydo_core::types::UserId;

use crate::error::AuthError;

// ---------------------------------------------------------------------------
// AuthUser
// ---------------------------------------------------------------------------

/// The signed-in identity as seen by the rest of the application.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthUser {
    /// Stable user id; documents are scoped to this.
    pub id: UserId,

    /// Email the account was registered with.
    pub email: String,
}

// ---------------------------------------------------------------------------
// AuthProvider
// ---------------------------------------------------------------------------

/// Backend-agnostic authentication provider.
///
/// Consumers hold the provider behind `Arc<dyn AuthProvider>` and follow the
/// session through [`watch_session`](AuthProvider::watch_session); the watch
/// channel holds `Some(user)` while signed in and `None` otherwise, and
/// observers see every transition between the two.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// The currently signed-in user, if any.
    async fn current_user(&self) -> Option<AuthUser>;

    /// Subscribe to session changes.
    ///
    /// The receiver immediately holds the current session state, so new
    /// observers do not miss an already-established sign-in.
    fn watch_session(&self) -> watch::Receiver<Option<AuthUser>>;

    /// Register a new account and sign it in.
    async fn sign_up(&self, email: &str, password: &str) -> Result<AuthUser, AuthError>;

    /// Sign in to an existing account.
    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthUser, AuthError>;

    /// End the current session. Signing out while signed out is a no-op.
    async fn sign_out(&self);
}
