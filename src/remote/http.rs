//! HTTP implementation of the auth service contract.
//!
//! Thin reqwest wrapper around three endpoints under `/v1/auth/`. Wire
//! types are private; callers only ever see the transport-neutral
//! response structs.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::AuthError;
use crate::models::UserProfile;
use crate::remote::{LoginResponse, RefreshResponse, RemoteAuthClient};

/// Auth client speaking JSON over HTTPS to the hosted service.
pub struct HttpAuthClient {
    client: Client,
    base_url: String,
}

impl HttpAuthClient {
    /// Build a client for the service at `base_url`. The timeout bounds
    /// every request; there are no internal retries.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, AuthError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/v1/auth/{}", self.base_url, path)
    }

    /// Check response status and convert HTTP errors to AuthError.
    async fn check_response(response: Response) -> Result<Response, AuthError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(AuthError::from_status(status, &body))
    }
}

#[async_trait]
impl RemoteAuthClient for HttpAuthClient {
    async fn login(&self, email: &str, password: &str) -> Result<LoginResponse, AuthError> {
        debug!(url = %self.endpoint("login"), "Requesting login");
        let response = self
            .client
            .post(self.endpoint("login"))
            .json(&LoginRequest { email, password })
            .send()
            .await?;
        let response = Self::check_response(response).await?;
        let wire: LoginWire = response
            .json()
            .await
            .map_err(|e| AuthError::Remote(format!("invalid login response: {e}")))?;
        Ok(wire.into())
    }

    async fn refresh(&self, refresh_token: &str) -> Result<RefreshResponse, AuthError> {
        debug!(url = %self.endpoint("refresh"), "Requesting token refresh");
        let response = self
            .client
            .post(self.endpoint("refresh"))
            .json(&RefreshRequest { refresh_token })
            .send()
            .await?;
        let response = Self::check_response(response).await?;
        let wire: RefreshWire = response
            .json()
            .await
            .map_err(|e| AuthError::Remote(format!("invalid refresh response: {e}")))?;
        Ok(RefreshResponse {
            access_token: wire.access_token,
            refresh_token: wire.refresh_token,
        })
    }

    async fn logout(&self, access_token: &str) -> Result<(), AuthError> {
        debug!(url = %self.endpoint("logout"), "Requesting logout");
        let response = self
            .client
            .post(self.endpoint("logout"))
            .bearer_auth(access_token)
            .send()
            .await?;
        Self::check_response(response).await?;
        Ok(())
    }
}

// ============================================================================
// Wire types
// ============================================================================

#[derive(Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
struct LoginWire {
    access_token: String,
    refresh_token: String,
    #[serde(default = "default_token_type")]
    token_type: String,
    user: UserWire,
}

#[derive(Deserialize)]
struct UserWire {
    id: String,
    email: String,
    tenant_id: String,
    tenant_name: String,
}

fn default_token_type() -> String {
    "Bearer".to_string()
}

impl From<LoginWire> for LoginResponse {
    fn from(wire: LoginWire) -> Self {
        LoginResponse {
            access_token: wire.access_token,
            refresh_token: wire.refresh_token,
            token_type: wire.token_type,
            user: UserProfile {
                id: wire.user.id,
                email: wire.user.email,
                tenant_id: wire.user.tenant_id,
                tenant_name: wire.user.tenant_name,
            },
        }
    }
}

#[derive(Serialize)]
struct RefreshRequest<'a> {
    refresh_token: &'a str,
}

#[derive(Deserialize)]
struct RefreshWire {
    access_token: String,
    refresh_token: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_trims_trailing_slash() {
        let client =
            HttpAuthClient::new("https://auth.example.com/", Duration::from_secs(30)).unwrap();
        assert_eq!(
            client.endpoint("login"),
            "https://auth.example.com/v1/auth/login"
        );

        let client =
            HttpAuthClient::new("https://auth.example.com", Duration::from_secs(30)).unwrap();
        assert_eq!(
            client.endpoint("refresh"),
            "https://auth.example.com/v1/auth/refresh"
        );
    }

    #[test]
    fn test_parse_login_response() {
        let json = r#"{
            "access_token": "at-abc",
            "refresh_token": "rt-def",
            "token_type": "Bearer",
            "user": {
                "id": "usr_42",
                "email": "ops@example.com",
                "tenant_id": "tn_09",
                "tenant_name": "Example Ops"
            }
        }"#;

        let wire: LoginWire = serde_json::from_str(json).unwrap();
        let response: LoginResponse = wire.into();
        assert_eq!(response.access_token, "at-abc");
        assert_eq!(response.refresh_token, "rt-def");
        assert_eq!(response.token_type, "Bearer");
        assert_eq!(response.user.id, "usr_42");
        assert_eq!(response.user.tenant_name, "Example Ops");
    }

    #[test]
    fn test_login_response_defaults_token_type() {
        let json = r#"{
            "access_token": "at-abc",
            "refresh_token": "rt-def",
            "user": {
                "id": "usr_42",
                "email": "ops@example.com",
                "tenant_id": "tn_09",
                "tenant_name": "Example Ops"
            }
        }"#;

        let wire: LoginWire = serde_json::from_str(json).unwrap();
        assert_eq!(wire.token_type, "Bearer");
    }

    #[test]
    fn test_parse_refresh_response() {
        let json = r#"{"access_token": "at-new", "refresh_token": "rt-new"}"#;
        let wire: RefreshWire = serde_json::from_str(json).unwrap();
        assert_eq!(wire.access_token, "at-new");
        assert_eq!(wire.refresh_token, "rt-new");
    }

    #[test]
    fn test_login_request_serializes_fields() {
        let body = serde_json::to_value(LoginRequest {
            email: "dev@example.com",
            password: "hunter2",
        })
        .unwrap();
        assert_eq!(body["email"], "dev@example.com");
        assert_eq!(body["password"], "hunter2");

        let body = serde_json::to_value(RefreshRequest {
            refresh_token: "rt-def",
        })
        .unwrap();
        assert_eq!(body["refresh_token"], "rt-def");
    }
}
