//! Encryption key storage for the credential vault.
//!
//! The key is 32 bytes of OS randomness kept in a file readable only by
//! the owner. It is generated on first use and reused on every run after
//! that; losing the file orphans any vault encrypted with it.

use std::fs;
use std::path::Path;

use rand::rngs::OsRng;
use rand::RngCore;
use tracing::debug;
use zeroize::Zeroize;

use crate::error::AuthError;

/// Key length required by the vault cipher.
pub const KEY_SIZE: usize = 32;

/// A vault encryption key. Wiped from memory on drop.
#[derive(Clone)]
pub struct EncryptionKey([u8; KEY_SIZE]);

impl Drop for EncryptionKey {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}

impl EncryptionKey {
    pub fn from_bytes(bytes: [u8; KEY_SIZE]) -> Self {
        Self(bytes)
    }

    /// Generate a fresh key from the operating system's CSPRNG.
    pub fn generate() -> Self {
        let mut bytes = [0u8; KEY_SIZE];
        OsRng.fill_bytes(&mut bytes);
        Self(bytes)
    }

    pub(crate) fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.0
    }
}

impl std::fmt::Debug for EncryptionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Never print key material, even in debug output.
        write!(f, "EncryptionKey(..)")
    }
}

/// Load the key at `path`, creating it on first use.
///
/// A missing file is not an error: a new key is generated, written with
/// owner-only permissions, and returned. An existing file must hold
/// exactly [`KEY_SIZE`] bytes; anything else fails rather than silently
/// regenerating, since overwriting the key would orphan the vault.
pub fn get_or_create_key(path: &Path) -> Result<EncryptionKey, AuthError> {
    if path.exists() {
        let mut raw = fs::read(path).map_err(|e| AuthError::io(path, e))?;
        if raw.len() != KEY_SIZE {
            let actual = raw.len();
            raw.zeroize();
            return Err(AuthError::InvalidKeyLength {
                expected: KEY_SIZE,
                actual,
            });
        }
        let mut bytes = [0u8; KEY_SIZE];
        bytes.copy_from_slice(&raw);
        raw.zeroize();
        return Ok(EncryptionKey::from_bytes(bytes));
    }

    let key = EncryptionKey::generate();
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| AuthError::io(parent, e))?;
        set_owner_only_dir(parent)?;
    }
    fs::write(path, key.as_bytes()).map_err(|e| AuthError::io(path, e))?;
    set_owner_only_file(path)?;
    debug!(path = %path.display(), "Generated new vault encryption key");
    Ok(key)
}

/// Restrict a file to owner read/write. No-op on platforms without
/// Unix permission bits.
#[cfg(unix)]
pub(crate) fn set_owner_only_file(path: &Path) -> Result<(), AuthError> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o600))
        .map_err(|e| AuthError::io(path, e))
}

#[cfg(not(unix))]
pub(crate) fn set_owner_only_file(_path: &Path) -> Result<(), AuthError> {
    Ok(())
}

/// Restrict a directory to owner access. No-op on platforms without
/// Unix permission bits.
#[cfg(unix)]
pub(crate) fn set_owner_only_dir(path: &Path) -> Result<(), AuthError> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o700))
        .map_err(|e| AuthError::io(path, e))
}

#[cfg(not(unix))]
pub(crate) fn set_owner_only_dir(_path: &Path) -> Result<(), AuthError> {
    Ok(())
}
