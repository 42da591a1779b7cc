//! Error types for authentication operations.

/// Errors surfaced by [`AuthProvider`](crate::AuthProvider) implementations.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// The supplied email or password failed validation.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// An account already exists for the given email.
    #[error("An account already exists for {0}")]
    EmailTaken(String),

    /// Unknown email or wrong password.
    ///
    /// Deliberately does not say which, so callers cannot tell which
    /// addresses are registered.
    #[error("Invalid email or password")]
    InvalidCredentials,

    /// The identity backend cannot currently be reached.
    #[error("Authentication service unavailable: {0}")]
    Unavailable(String),
}
