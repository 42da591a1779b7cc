//! In-process [`AuthProvider`] backend.
//!
//! [`MemoryAuth`] keeps accounts in memory and stores SHA-256 digests of
//! passwords rather than the passwords themselves. It exists for tests and
//! the demo; a production deployment would put a real identity service
//! behind the same trait.

use std::collections::HashMap;

use async_trait::async_trait;
use sha2::{Digest, Sha256};
use tokio::sync::{watch, RwLock};

use crate::error::AuthError;
use crate::provider::{AuthProvider, AuthUser};

/// Minimum accepted password length, in bytes.
const MIN_PASSWORD_LENGTH: usize = 6;

// ---------------------------------------------------------------------------
// MemoryAuth
// ---------------------------------------------------------------------------

/// One registered account.
struct Account {
    user: AuthUser,
    password_digest: String,
}

/// In-memory authentication provider with a single active session.
///
/// Thread-safe via interior `RwLock`; designed to be wrapped in `Arc` and
/// shared across the application.
pub struct MemoryAuth {
    /// Accounts keyed by normalized email.
    accounts: RwLock<HashMap<String, Account>>,
    session: watch::Sender<Option<AuthUser>>,
}

impl MemoryAuth {
    /// Create a provider with no accounts and no active session.
    pub fn new() -> Self {
        let (session, _) = watch::channel(None);
        Self {
            accounts: RwLock::new(HashMap::new()),
            session,
        }
    }
}

impl Default for MemoryAuth {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AuthProvider for MemoryAuth {
    async fn current_user(&self) -> Option<AuthUser> {
        self.session.borrow().clone()
    }

    fn watch_session(&self) -> watch::Receiver<Option<AuthUser>> {
        self.session.subscribe()
    }

    async fn sign_up(&self, email: &str, password: &str) -> Result<AuthUser, AuthError> {
        let email = normalize_email(email);
        validate_email(&email)?;
        validate_password(password)?;

        let mut accounts = self.accounts.write().await;
        if accounts.contains_key(&email) {
            return Err(AuthError::EmailTaken(email));
        }

        let user = AuthUser {
            id: uuid::Uuid::new_v4().to_string(),
            email: email.clone(),
        };
        accounts.insert(
            email,
            Account {
                user: user.clone(),
                password_digest: sha256_hex(password.as_bytes()),
            },
        );
        drop(accounts);

        // Registration establishes a session, so the new user is live
        // immediately.
        self.session.send_replace(Some(user.clone()));
        tracing::info!(user_id = %user.id, "User signed up");
        Ok(user)
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthUser, AuthError> {
        let email = normalize_email(email);

        let accounts = self.accounts.read().await;
        let account = accounts
            .get(&email)
            .ok_or(AuthError::InvalidCredentials)?;
        if account.password_digest != sha256_hex(password.as_bytes()) {
            return Err(AuthError::InvalidCredentials);
        }
        let user = account.user.clone();
        drop(accounts);

        self.session.send_replace(Some(user.clone()));
        tracing::info!(user_id = %user.id, "User signed in");
        Ok(user)
    }

    async fn sign_out(&self) {
        let previous = self.session.send_replace(None);
        if let Some(user) = previous {
            tracing::info!(user_id = %user.id, "User signed out");
        }
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Lowercase and trim an email so lookups are case-insensitive.
fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn validate_email(email: &str) -> Result<(), AuthError> {
    // Shape check only; real address verification belongs to a real backend.
    let well_formed = email.contains('@') && !email.starts_with('@') && !email.ends_with('@');
    if !well_formed {
        return Err(AuthError::Validation(format!(
            "'{email}' is not a valid email address"
        )));
    }
    Ok(())
}

fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::Validation(format!(
            "Password must be at least {MIN_PASSWORD_LENGTH} characters long"
        )));
    }
    Ok(())
}

/// Compute a SHA-256 hex digest of the given bytes.
fn sha256_hex(data: &[u8]) -> String {
    let hash = Sha256::digest(data);
    format!("{hash:x}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sha256_hex_produces_known_digest() {
        assert_eq!(
            sha256_hex(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
        assert_eq!(sha256_hex(b"hunter2").len(), 64);
    }

    #[test]
    fn normalize_email_lowercases_and_trims() {
        assert_eq!(normalize_email("  Alice@Example.COM "), "alice@example.com");
    }

    #[test]
    fn validate_email_rejects_malformed_addresses() {
        assert!(validate_email("alice@example.com").is_ok());
        assert!(validate_email("no-at-sign").is_err());
        assert!(validate_email("@leading").is_err());
        assert!(validate_email("trailing@").is_err());
    }

    #[test]
    fn validate_password_enforces_minimum_length() {
        assert!(validate_password("hunter2").is_ok());
        assert!(validate_password("short").is_err());
    }
}
