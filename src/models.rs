//! Identity data carried through the vault and the remote auth contract.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Identity metadata attached to a session. Not secret.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: String,
    pub email: String,
    pub tenant_id: String,
    pub tenant_name: String,
}

/// The vault's payload: one signed-in session.
///
/// Token fields are secrets and must never appear in logs or status
/// output; the identity fields are plain metadata. `expires_at` is set
/// from the configured TTL when the record is written and is the only
/// clock the lifecycle manager trusts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenRecord {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub expires_at: DateTime<Utc>,
    pub user_id: String,
    pub email: String,
    pub tenant_id: String,
    pub tenant_name: String,
}

impl TokenRecord {
    /// Expiry check against an explicit instant. A record is live
    /// strictly before `expires_at`; at the instant itself it is expired.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    /// Whether the record will expire within `threshold` of `now`.
    ///
    /// True strictly inside the window: with exactly `threshold`
    /// remaining this is still false. An already expired record is past
    /// refreshing and returns false as well.
    pub fn needs_refresh_at(&self, now: DateTime<Utc>, threshold: Duration) -> bool {
        !self.is_expired_at(now) && self.expires_at - now < threshold
    }

    /// Check if the session will expire soon and should be refreshed
    pub fn needs_refresh(&self, threshold: Duration) -> bool {
        self.needs_refresh_at(Utc::now(), threshold)
    }

    pub fn time_until_expiry(&self) -> Duration {
        self.expires_at - Utc::now()
    }

    /// Get minutes remaining until expiry (for display)
    pub fn minutes_until_expiry(&self) -> i64 {
        self.time_until_expiry().num_minutes().max(0)
    }

    /// The non-secret identity carried by this record.
    pub fn profile(&self) -> UserProfile {
        UserProfile {
            id: self.user_id.clone(),
            email: self.email.clone(),
            tenant_id: self.tenant_id.clone(),
            tenant_name: self.tenant_name.clone(),
        }
    }
}

/// Derived lifecycle state of the stored session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    Unauthenticated,
    Authenticated,
    Expired,
}

/// Snapshot reported for the CLI's status output. Carries no secrets,
/// safe to render or log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionStatus {
    pub state: SessionState,
    pub user: Option<UserProfile>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl SessionStatus {
    pub(crate) fn logged_out() -> Self {
        Self {
            state: SessionState::Unauthenticated,
            user: None,
            expires_at: None,
        }
    }

    pub(crate) fn from_record(record: &TokenRecord) -> Self {
        let state = if record.is_expired() {
            SessionState::Expired
        } else {
            SessionState::Authenticated
        };
        Self {
            state,
            user: Some(record.profile()),
            expires_at: Some(record.expires_at),
        }
    }

    /// True only for a live, unexpired session.
    pub fn is_active(&self) -> bool {
        self.state == SessionState::Authenticated
    }

    /// Minutes left on the session (for display). Zero when expired or
    /// logged out.
    pub fn minutes_until_expiry(&self) -> i64 {
        match self.expires_at {
            Some(at) => (at - Utc::now()).num_minutes().max(0),
            None => 0,
        }
    }
}
