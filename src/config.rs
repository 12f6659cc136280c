//! Authentication configuration.
//!
//! Everything the session manager needs arrives as an explicit
//! `AuthConfig` value passed to its constructor; there is no ambient or
//! process-global state. Defaults put the key and vault files under
//! `~/.config/vigil/`.

use std::path::{Path, PathBuf};

use chrono::Duration;

use crate::error::AuthError;

/// Application name used for the per-installation directory path
const APP_NAME: &str = "vigil";

/// Encryption key file name
const KEY_FILE: &str = "vault.key";

/// Encrypted token record file name
const VAULT_FILE: &str = "session.vault";

/// Token lifetime in seconds.
/// The auth service invalidates sessions after roughly an hour, so the
/// client treats tokens as dead at the one hour mark regardless of what
/// the server might still accept.
const DEFAULT_TOKEN_TTL_SECS: i64 = 3600;

/// Remaining lifetime below which tokens are proactively renewed.
/// 5 minutes leaves room for a slow refresh call without ever handing a
/// command a token that dies mid-request.
const DEFAULT_REFRESH_THRESHOLD_SECS: i64 = 300;

/// HTTP request timeout in seconds.
/// 30s tolerates a slow auth service without letting a command hang.
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Lifetime granted to freshly issued tokens.
    pub token_ttl: Duration,
    /// Remaining lifetime at which `ensure_valid` refreshes first.
    pub refresh_threshold: Duration,
    /// Timeout applied to every remote auth call.
    pub request_timeout: std::time::Duration,
    /// Where the encryption key lives.
    pub key_path: PathBuf,
    /// Where the encrypted token record lives.
    pub vault_path: PathBuf,
}

impl AuthConfig {
    /// Build a config rooted at the platform config directory
    /// (`~/.config/vigil` on Linux).
    pub fn resolve() -> Result<Self, AuthError> {
        let base = dirs::config_dir().ok_or_else(|| {
            AuthError::io(
                APP_NAME,
                std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    "could not find platform config directory",
                ),
            )
        })?;
        Ok(Self::with_dir(base.join(APP_NAME)))
    }

    /// Build a config with both identity files under `dir`.
    pub fn with_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            token_ttl: Duration::seconds(DEFAULT_TOKEN_TTL_SECS),
            refresh_threshold: Duration::seconds(DEFAULT_REFRESH_THRESHOLD_SECS),
            request_timeout: std::time::Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            key_path: dir.join(KEY_FILE),
            vault_path: dir.join(VAULT_FILE),
        }
    }
}
