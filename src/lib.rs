//! Vigil auth - the local identity layer for the Vigil CLI.
//!
//! Keeps the signed-in session in an encrypted vault on disk and keeps
//! its tokens usable: logging in, proactively refreshing close to
//! expiry, and tearing everything down on logout.
//!
//! The crate splits along three seams:
//! - `vault`: key management, authenticated encryption, atomic storage
//! - `remote`: the auth service contract plus HTTP and mock clients
//! - `auth`: the session lifecycle manager tying the two together
//!
//! Commands that need authentication call `SessionManager::ensure_valid`
//! and use the record it returns; everything else is plumbing.

pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod remote;
pub mod vault;

pub use auth::SessionManager;
pub use config::AuthConfig;
pub use error::AuthError;
pub use models::{SessionState, SessionStatus, TokenRecord, UserProfile};
pub use remote::{HttpAuthClient, MockAuthClient, RemoteAuthClient};
pub use vault::TokenVault;
