//! Behavioural tests for `MemoryAuth`.
//!
//! Exercised through the `AuthProvider` trait: account registration, sign-in
//! and sign-out, and the session watch channel.

use assert_matches::assert_matches;

use honeydo_auth::{AuthError, AuthProvider, MemoryAuth};

// ---------------------------------------------------------------------------
// Test: sign-up registers the account and establishes a session
// ---------------------------------------------------------------------------

#[tokio::test]
async fn sign_up_creates_a_session() {
    let auth = MemoryAuth::new();

    let user = auth
        .sign_up("alice@example.com", "hunter2")
        .await
        .expect("sign-up should succeed");

    assert_eq!(user.email, "alice@example.com");

    let current = auth.current_user().await.expect("session should be active");
    assert_eq!(current, user);
}

// ---------------------------------------------------------------------------
// Test: duplicate emails are rejected, regardless of case
// ---------------------------------------------------------------------------

#[tokio::test]
async fn sign_up_rejects_duplicate_emails() {
    let auth = MemoryAuth::new();

    auth.sign_up("alice@example.com", "hunter2")
        .await
        .expect("first sign-up should succeed");

    let err = auth
        .sign_up("Alice@Example.com", "different-password")
        .await
        .expect_err("second sign-up should fail");

    assert_matches!(err, AuthError::EmailTaken(email) if email == "alice@example.com");
}

// ---------------------------------------------------------------------------
// Test: malformed emails and short passwords fail validation
// ---------------------------------------------------------------------------

#[tokio::test]
async fn sign_up_validates_email_and_password() {
    let auth = MemoryAuth::new();

    let err = auth
        .sign_up("not-an-email", "hunter2")
        .await
        .expect_err("malformed email should be rejected");
    assert_matches!(err, AuthError::Validation(_));

    let err = auth
        .sign_up("bob@example.com", "short")
        .await
        .expect_err("short password should be rejected");
    assert_matches!(err, AuthError::Validation(_));

    // Neither failed attempt should have established a session.
    assert!(auth.current_user().await.is_none());
}

// ---------------------------------------------------------------------------
// Test: sign-in succeeds with the registered credentials
// ---------------------------------------------------------------------------

#[tokio::test]
async fn sign_in_with_correct_credentials() {
    let auth = MemoryAuth::new();

    let registered = auth
        .sign_up("alice@example.com", "hunter2")
        .await
        .expect("sign-up should succeed");
    auth.sign_out().await;

    let signed_in = auth
        .sign_in("alice@example.com", "hunter2")
        .await
        .expect("sign-in should succeed");

    assert_eq!(signed_in, registered);
    assert!(auth.current_user().await.is_some());
}

// ---------------------------------------------------------------------------
// Test: wrong password and unknown email both report InvalidCredentials
// ---------------------------------------------------------------------------

#[tokio::test]
async fn sign_in_rejects_bad_credentials() {
    let auth = MemoryAuth::new();

    auth.sign_up("alice@example.com", "hunter2")
        .await
        .expect("sign-up should succeed");
    auth.sign_out().await;

    let err = auth
        .sign_in("alice@example.com", "wrong-password")
        .await
        .expect_err("wrong password should fail");
    assert_matches!(err, AuthError::InvalidCredentials);

    let err = auth
        .sign_in("nobody@example.com", "hunter2")
        .await
        .expect_err("unknown email should fail");
    assert_matches!(err, AuthError::InvalidCredentials);

    assert!(auth.current_user().await.is_none());
}

// ---------------------------------------------------------------------------
// Test: emails are matched case-insensitively
// ---------------------------------------------------------------------------

#[tokio::test]
async fn emails_are_case_insensitive() {
    let auth = MemoryAuth::new();

    auth.sign_up("alice@example.com", "hunter2")
        .await
        .expect("sign-up should succeed");
    auth.sign_out().await;

    let user = auth
        .sign_in("ALICE@EXAMPLE.COM", "hunter2")
        .await
        .expect("sign-in should be case-insensitive");
    assert_eq!(user.email, "alice@example.com");
}

// ---------------------------------------------------------------------------
// Test: sign-out clears the session and is idempotent
// ---------------------------------------------------------------------------

#[tokio::test]
async fn sign_out_clears_the_session() {
    let auth = MemoryAuth::new();

    auth.sign_up("alice@example.com", "hunter2")
        .await
        .expect("sign-up should succeed");
    assert!(auth.current_user().await.is_some());

    auth.sign_out().await;
    assert!(auth.current_user().await.is_none());

    // Signing out again must not panic or change anything.
    auth.sign_out().await;
    assert!(auth.current_user().await.is_none());
}

// ---------------------------------------------------------------------------
// Test: watchers observe sign-in and sign-out transitions
// ---------------------------------------------------------------------------

#[tokio::test]
async fn watch_observes_session_transitions() {
    let auth = MemoryAuth::new();
    let mut session = auth.watch_session();

    assert!(session.borrow().is_none());

    auth.sign_up("alice@example.com", "hunter2")
        .await
        .expect("sign-up should succeed");
    session.changed().await.expect("watch should stay open");
    assert!(session.borrow_and_update().is_some());

    auth.sign_out().await;
    session.changed().await.expect("watch should stay open");
    assert!(session.borrow_and_update().is_none());
}

// ---------------------------------------------------------------------------
// Test: a late watcher sees the already-established session
// ---------------------------------------------------------------------------

#[tokio::test]
async fn late_watcher_sees_current_session() {
    let auth = MemoryAuth::new();

    auth.sign_up("alice@example.com", "hunter2")
        .await
        .expect("sign-up should succeed");

    let session = auth.watch_session();
    let current = session.borrow().clone();
    assert_eq!(
        current.map(|user| user.email),
        Some("alice@example.com".to_string())
    );
}
