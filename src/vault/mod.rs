//! Encrypted credential vault.
//!
//! This module provides:
//! - Key management: a 32-byte key generated once and kept owner-only
//! - Authenticated encryption of vault contents
//! - Atomic, owner-only storage of the session record

pub mod cipher;
pub mod keys;
pub mod store;

pub use keys::{get_or_create_key, EncryptionKey};
pub use store::TokenVault;
