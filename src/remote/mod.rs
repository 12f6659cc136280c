//! Remote auth service contract.
//!
//! This module provides:
//! - The [`RemoteAuthClient`] trait the session manager calls through
//! - An HTTP implementation backed by reqwest
//! - A mock implementation for tests
//!
//! The backend is chosen once at construction and injected; nothing in
//! the lifecycle logic branches on which implementation it is talking
//! to.

pub mod http;
pub mod mock;

pub use http::HttpAuthClient;
pub use mock::MockAuthClient;

use async_trait::async_trait;

use crate::error::AuthError;
use crate::models::UserProfile;

/// Successful login: a token pair plus the identity it belongs to.
/// Carries no expiry; token lifetime is decided locally by the caller's
/// configuration.
#[derive(Debug, Clone)]
pub struct LoginResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub user: UserProfile,
}

/// Successful refresh: a replacement token pair.
#[derive(Debug, Clone)]
pub struct RefreshResponse {
    pub access_token: String,
    pub refresh_token: String,
}

/// Operations the auth service exposes.
///
/// Implementations keep the error split meaningful: rejected
/// credentials map to [`AuthError::Unauthorized`], while an unreachable
/// or failing service maps to [`AuthError::Remote`].
#[async_trait]
pub trait RemoteAuthClient: Send + Sync {
    /// Exchange credentials for a token pair and the caller's identity.
    async fn login(&self, email: &str, password: &str) -> Result<LoginResponse, AuthError>;

    /// Exchange a refresh token for a new token pair.
    async fn refresh(&self, refresh_token: &str) -> Result<RefreshResponse, AuthError>;

    /// Revoke the session server-side. Callers treat failures as
    /// non-fatal; local state is cleared regardless.
    async fn logout(&self, access_token: &str) -> Result<(), AuthError>;
}
