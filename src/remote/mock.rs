//! In-memory auth client for tests.
//!
//! Deterministic stand-in for the hosted service: hands out serial
//! token pairs, counts every call, and can be told to fail any single
//! operation so callers' error paths can be exercised without a
//! network.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::AuthError;
use crate::models::UserProfile;
use crate::remote::{LoginResponse, RefreshResponse, RemoteAuthClient};

/// Per-operation call counters, shared with the test that owns them.
#[derive(Debug, Default)]
pub struct CallCounts {
    login: AtomicUsize,
    refresh: AtomicUsize,
    logout: AtomicUsize,
}

impl CallCounts {
    pub fn logins(&self) -> usize {
        self.login.load(Ordering::Relaxed)
    }

    pub fn refreshes(&self) -> usize {
        self.refresh.load(Ordering::Relaxed)
    }

    pub fn logouts(&self) -> usize {
        self.logout.load(Ordering::Relaxed)
    }
}

/// Scriptable [`RemoteAuthClient`] implementation.
pub struct MockAuthClient {
    user: UserProfile,
    fail_login: bool,
    fail_refresh: bool,
    fail_logout: bool,
    calls: Arc<CallCounts>,
    serial: AtomicUsize,
}

impl MockAuthClient {
    pub fn new() -> Self {
        Self {
            user: UserProfile {
                id: "usr_1001".to_string(),
                email: "dev@example.com".to_string(),
                tenant_id: "tn_01".to_string(),
                tenant_name: "Example Corp".to_string(),
            },
            fail_login: false,
            fail_refresh: false,
            fail_logout: false,
            calls: Arc::new(CallCounts::default()),
            serial: AtomicUsize::new(0),
        }
    }

    pub fn with_user(mut self, user: UserProfile) -> Self {
        self.user = user;
        self
    }

    /// Make `login` fail as if the service rejected the credentials.
    pub fn fail_login(mut self) -> Self {
        self.fail_login = true;
        self
    }

    /// Make `refresh` fail as if the refresh token were revoked.
    pub fn fail_refresh(mut self) -> Self {
        self.fail_refresh = true;
        self
    }

    /// Make `logout` fail as if the service were unreachable.
    pub fn fail_logout(mut self) -> Self {
        self.fail_logout = true;
        self
    }

    /// Handle to the call counters, valid after the client is boxed.
    pub fn counters(&self) -> Arc<CallCounts> {
        Arc::clone(&self.calls)
    }

    fn next_serial(&self) -> usize {
        self.serial.fetch_add(1, Ordering::Relaxed) + 1
    }
}

impl Default for MockAuthClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RemoteAuthClient for MockAuthClient {
    async fn login(&self, email: &str, _password: &str) -> Result<LoginResponse, AuthError> {
        self.calls.login.fetch_add(1, Ordering::Relaxed);
        if self.fail_login {
            return Err(AuthError::Unauthorized(
                "invalid email or password".to_string(),
            ));
        }
        let n = self.next_serial();
        Ok(LoginResponse {
            access_token: format!("mock-access-{n}"),
            refresh_token: format!("mock-refresh-{n}"),
            token_type: "Bearer".to_string(),
            user: UserProfile {
                email: email.to_string(),
                ..self.user.clone()
            },
        })
    }

    async fn refresh(&self, _refresh_token: &str) -> Result<RefreshResponse, AuthError> {
        self.calls.refresh.fetch_add(1, Ordering::Relaxed);
        if self.fail_refresh {
            return Err(AuthError::Unauthorized(
                "refresh token rejected".to_string(),
            ));
        }
        let n = self.next_serial();
        Ok(RefreshResponse {
            access_token: format!("mock-access-{n}"),
            refresh_token: format!("mock-refresh-{n}"),
        })
    }

    async fn logout(&self, _access_token: &str) -> Result<(), AuthError> {
        self.calls.logout.fetch_add(1, Ordering::Relaxed);
        if self.fail_logout {
            return Err(AuthError::Remote("connection timed out".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_hands_out_serial_tokens() {
        let mock = MockAuthClient::new();
        let first = mock.login("dev@example.com", "pw").await.unwrap();
        let second = mock.refresh(&first.refresh_token).await.unwrap();

        assert_eq!(first.access_token, "mock-access-1");
        assert_eq!(second.access_token, "mock-access-2");
        assert_ne!(first.refresh_token, second.refresh_token);
        assert_eq!(first.user.email, "dev@example.com");
    }

    #[tokio::test]
    async fn test_mock_counts_calls() {
        let mock = MockAuthClient::new().fail_refresh();
        let counts = mock.counters();

        mock.login("dev@example.com", "pw").await.unwrap();
        let _ = mock.refresh("rt").await;
        let _ = mock.refresh("rt").await;
        mock.logout("at").await.unwrap();

        assert_eq!(counts.logins(), 1);
        assert_eq!(counts.refreshes(), 2);
        assert_eq!(counts.logouts(), 1);
    }

    #[tokio::test]
    async fn test_mock_failure_modes() {
        let mock = MockAuthClient::new().fail_login();
        assert!(matches!(
            mock.login("dev@example.com", "pw").await,
            Err(AuthError::Unauthorized(_))
        ));

        let mock = MockAuthClient::new().fail_logout();
        assert!(matches!(
            mock.logout("at").await,
            Err(AuthError::Remote(_))
        ));
    }
}
