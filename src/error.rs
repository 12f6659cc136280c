//! Error taxonomy shared across the vault and session lifecycle.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuthError {
    /// Vault file absent. The normal logged-out state, never fatal.
    #[error("not logged in")]
    NotFound,

    /// Vault file present but undecryptable or unparseable. Never
    /// downgraded to `NotFound`: a corrupt vault is a tampering or
    /// key-loss signal, not an empty one.
    #[error("credential vault is corrupted: {0}")]
    Corrupted(String),

    #[error("decryption failed: wrong key or tampered data")]
    DecryptionFailed,

    #[error("encryption failed")]
    EncryptionFailed,

    #[error("key file holds {actual} bytes, expected {expected}")]
    InvalidKeyLength { expected: usize, actual: usize },

    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("auth service error: {0}")]
    Remote(String),
}

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

impl AuthError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        AuthError::Io {
            path: path.into(),
            source,
        }
    }

    /// Truncate a response body to avoid logging excessive data
    fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            body.to_string()
        } else {
            let mut end = MAX_ERROR_BODY_LENGTH;
            while !body.is_char_boundary(end) {
                end -= 1;
            }
            format!(
                "{}... (truncated, {} total bytes)",
                &body[..end],
                body.len()
            )
        }
    }

    /// Map an HTTP status from the auth service onto the taxonomy:
    /// a 401/403 is the service rejecting the credentials or token,
    /// anything else non-success is the service misbehaving.
    pub fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        let truncated = Self::truncate_body(body);
        match status.as_u16() {
            401 | 403 => {
                if truncated.is_empty() {
                    AuthError::Unauthorized("credentials rejected by the auth service".to_string())
                } else {
                    AuthError::Unauthorized(truncated)
                }
            }
            500..=599 => AuthError::Remote(format!("server error ({}): {}", status, truncated)),
            _ => AuthError::Remote(format!("unexpected status {}: {}", status, truncated)),
        }
    }
}

impl From<reqwest::Error> for AuthError {
    fn from(err: reqwest::Error) -> Self {
        AuthError::Remote(err.to_string())
    }
}
