//! Token lifecycle management.
//!
//! [`SessionManager`] owns the stored session end to end: logging in,
//! deciding when the access token is close enough to expiry to renew,
//! renewing it, and tearing the session down. All timing comes from the
//! injected [`AuthConfig`]; token lifetime is a local policy and never
//! read from the remote service. All remote traffic goes through the
//! injected [`RemoteAuthClient`].

use chrono::{Duration, Utc};
use tracing::{debug, info, warn};

use crate::config::AuthConfig;
use crate::error::AuthError;
use crate::models::{SessionStatus, TokenRecord};
use crate::remote::RemoteAuthClient;
use crate::vault::TokenVault;

/// Owns the credential vault and the session stored in it.
pub struct SessionManager {
    config: AuthConfig,
    vault: TokenVault,
    remote: Box<dyn RemoteAuthClient>,
}

impl SessionManager {
    pub fn new(config: AuthConfig, remote: Box<dyn RemoteAuthClient>) -> Self {
        let vault = TokenVault::new(&config.key_path, &config.vault_path);
        Self {
            config,
            vault,
            remote,
        }
    }

    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    /// Exchange credentials for a session and store it.
    ///
    /// The stored `expires_at` is `now` plus the configured TTL. The
    /// remote response is the source of identity, never of lifetime.
    pub async fn login(&self, email: &str, password: &str) -> Result<SessionStatus, AuthError> {
        let email = email.trim();
        if email.is_empty() || password.is_empty() {
            return Err(AuthError::Unauthorized(
                "email and password are required".to_string(),
            ));
        }

        let response = self.remote.login(email, password).await?;
        let token_type = if response.token_type.is_empty() {
            "Bearer".to_string()
        } else {
            response.token_type
        };
        let record = TokenRecord {
            access_token: response.access_token,
            refresh_token: response.refresh_token,
            token_type,
            expires_at: Utc::now() + self.config.token_ttl,
            user_id: response.user.id,
            email: response.user.email,
            tenant_id: response.user.tenant_id,
            tenant_name: response.user.tenant_name,
        };
        self.vault.save(&record)?;
        info!(email = %record.email, tenant = %record.tenant_name, "Logged in");
        Ok(SessionStatus::from_record(&record))
    }

    /// Tear down the session. Safe to call when not logged in.
    ///
    /// Remote revocation is best effort: an unreachable service or an
    /// unreadable vault is logged and the local session is cleared
    /// regardless, so logout always leaves the machine signed out.
    pub async fn logout(&self) -> Result<(), AuthError> {
        if !self.vault.has_tokens() {
            debug!("No stored session; nothing to log out");
            return Ok(());
        }

        match self.vault.load() {
            Ok(record) => {
                if let Err(e) = self.remote.logout(&record.access_token).await {
                    warn!(error = %e, "Remote logout failed; clearing local session anyway");
                }
            }
            Err(e) => {
                warn!(error = %e, "Could not read vault during logout; clearing local session anyway");
            }
        }

        self.vault.clear()?;
        info!("Logged out");
        Ok(())
    }

    /// Whether a live session is stored right now.
    ///
    /// An unreadable vault answers false here; the operation that
    /// actually needs the record still sees the distinct error.
    pub fn is_authenticated(&self) -> bool {
        match self.vault.load() {
            Ok(record) => !record.is_expired(),
            Err(AuthError::NotFound) => false,
            Err(e) => {
                debug!(error = %e, "Vault unreadable; treating session as unauthenticated");
                false
            }
        }
    }

    /// Whether the stored token will expire within `threshold`.
    ///
    /// False when logged out, expired, or exactly `threshold` from
    /// expiry; renewal triggers strictly inside the window.
    pub fn should_refresh(&self, threshold: Duration) -> bool {
        match self.vault.load() {
            Ok(record) => record.needs_refresh(threshold),
            Err(_) => false,
        }
    }

    /// Renew the token pair and return the updated record.
    ///
    /// Only the tokens and `expires_at` change; identity fields carry
    /// over from the stored record. Nothing is written unless the
    /// remote call succeeds.
    pub async fn refresh(&self) -> Result<TokenRecord, AuthError> {
        let record = self.vault.load()?;
        let renewed = self.remote.refresh(&record.refresh_token).await?;
        let record = TokenRecord {
            access_token: renewed.access_token,
            refresh_token: renewed.refresh_token,
            expires_at: Utc::now() + self.config.token_ttl,
            ..record
        };
        self.vault.save(&record)?;
        info!(expires_at = %record.expires_at, "Session tokens refreshed");
        Ok(record)
    }

    /// Return a record guaranteed usable for an authenticated call,
    /// refreshing first when expiry is inside the configured threshold.
    ///
    /// Fails `Unauthorized` when there is no live session or when a
    /// needed refresh fails; a corrupted vault keeps its own error.
    pub async fn ensure_valid(&self) -> Result<TokenRecord, AuthError> {
        let record = match self.vault.load() {
            Ok(record) => record,
            Err(AuthError::NotFound) => {
                return Err(AuthError::Unauthorized(
                    "not logged in - please log in first".to_string(),
                ));
            }
            Err(e) => return Err(e),
        };

        if record.is_expired() {
            return Err(AuthError::Unauthorized(
                "session expired - please log in again".to_string(),
            ));
        }

        if !record.needs_refresh(self.config.refresh_threshold) {
            return Ok(record);
        }

        debug!(
            minutes_left = record.minutes_until_expiry(),
            "Access token expiring soon; refreshing"
        );
        match self.refresh().await {
            Ok(renewed) => Ok(renewed),
            Err(e) => Err(AuthError::Unauthorized(format!("token refresh failed: {e}"))),
        }
    }

    /// Snapshot of the current session for status output. Reports a
    /// clean logged-out state when no vault exists; a corrupted vault
    /// surfaces its error so diagnostics can see it.
    pub fn status(&self) -> Result<SessionStatus, AuthError> {
        match self.vault.load() {
            Ok(record) => Ok(SessionStatus::from_record(&record)),
            Err(AuthError::NotFound) => Ok(SessionStatus::logged_out()),
            Err(e) => Err(e),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
