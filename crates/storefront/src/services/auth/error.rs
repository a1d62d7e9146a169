//! Authentication error types.

use thiserror::Error;

/// Errors that can occur while signing a user in.
#[derive(Debug, Error)]
pub enum AuthError {
    /// HTTP request to the identity provider failed.
    #[error("identity provider request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The identity provider rejected the request.
    #[error("identity provider returned {status}: {body}")]
    Provider { status: u16, body: String },

    /// Session state missing or invalid (CSRF state mismatch, expired flow).
    #[error("invalid session state")]
    InvalidSessionState,

    /// The provider did not return a usable email address.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] voyager_core::EmailError),
}
