//! Session lifecycle management.
//!
//! This module provides:
//! - `SessionManager`: login, logout, proactive refresh, and validity
//!   checks over the encrypted vault and the injected remote client
//!
//! Token lifetime is decided locally from configuration; the remote
//! service is never consulted about expiry.

pub mod manager;

pub use manager::SessionManager;
