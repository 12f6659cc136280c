//! Encrypted on-disk storage for the session record.
//!
//! This module provides:
//! - Atomic vault writes (temp file, then rename over the target)
//! - Owner-only permissions on the vault file and its directory
//! - A strict split between "no vault" and "vault present but unreadable"
//!
//! Callers rely on that split: a missing vault means logged out, while a
//! vault that exists but cannot be decrypted or parsed is corruption and
//! is never reported as a clean logged-out state.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::debug;
use zeroize::Zeroize;

use crate::error::AuthError;
use crate::models::TokenRecord;
use crate::vault::cipher;
use crate::vault::keys::{get_or_create_key, set_owner_only_dir, set_owner_only_file};

/// Encrypted vault holding at most one [`TokenRecord`].
pub struct TokenVault {
    key_path: PathBuf,
    vault_path: PathBuf,
}

impl TokenVault {
    pub fn new(key_path: impl Into<PathBuf>, vault_path: impl Into<PathBuf>) -> Self {
        Self {
            key_path: key_path.into(),
            vault_path: vault_path.into(),
        }
    }

    /// Whether a vault file exists on disk. Says nothing about whether
    /// it can be decrypted.
    pub fn has_tokens(&self) -> bool {
        self.vault_path.exists()
    }

    pub fn vault_path(&self) -> &Path {
        &self.vault_path
    }

    /// Encrypt `record` and write it to disk, replacing any previous
    /// vault.
    ///
    /// The blob is written to a temp file in the same directory, synced,
    /// and renamed over the target, so a crash mid-write leaves either
    /// the old vault or the new one, never a half-written file.
    pub fn save(&self, record: &TokenRecord) -> Result<(), AuthError> {
        let key = get_or_create_key(&self.key_path)?;
        let mut plaintext = serde_json::to_vec(record)?;
        let blob = cipher::encrypt(&plaintext, &key);
        plaintext.zeroize();
        let blob = blob?;

        if let Some(parent) = self.vault_path.parent() {
            fs::create_dir_all(parent).map_err(|e| AuthError::io(parent, e))?;
            set_owner_only_dir(parent)?;
        }

        let tmp_path = self
            .vault_path
            .with_extension(format!("tmp.{}", std::process::id()));
        let write_tmp = || -> Result<(), AuthError> {
            let mut file =
                fs::File::create(&tmp_path).map_err(|e| AuthError::io(&tmp_path, e))?;
            file.write_all(blob.as_bytes())
                .map_err(|e| AuthError::io(&tmp_path, e))?;
            file.sync_all().map_err(|e| AuthError::io(&tmp_path, e))?;
            set_owner_only_file(&tmp_path)
        };
        if let Err(e) = write_tmp() {
            let _ = fs::remove_file(&tmp_path);
            return Err(e);
        }
        if let Err(e) = fs::rename(&tmp_path, &self.vault_path) {
            let _ = fs::remove_file(&tmp_path);
            return Err(AuthError::io(&self.vault_path, e));
        }

        debug!(path = %self.vault_path.display(), "Vault written");
        Ok(())
    }

    /// Decrypt and return the stored record.
    ///
    /// Fails with [`AuthError::NotFound`] when no vault file exists, and
    /// with [`AuthError::Corrupted`] when one exists but cannot be
    /// decoded, decrypted, or parsed. The two are never conflated.
    pub fn load(&self) -> Result<TokenRecord, AuthError> {
        let raw = match fs::read(&self.vault_path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(AuthError::NotFound);
            }
            Err(e) => return Err(AuthError::io(&self.vault_path, e)),
        };
        // The blob is ASCII base64 when intact; damaged bytes are
        // corruption, not a read failure.
        let blob = String::from_utf8(raw)
            .map_err(|e| AuthError::Corrupted(format!("not valid UTF-8: {e}")))?;

        let key = get_or_create_key(&self.key_path)?;
        let mut plaintext = cipher::decrypt(&blob, &key)
            .map_err(|e| AuthError::Corrupted(format!("decrypt failed: {e}")))?;
        let record = serde_json::from_slice(&plaintext)
            .map_err(|e| AuthError::Corrupted(format!("invalid record: {e}")));
        plaintext.zeroize();
        record
    }

    /// Delete the vault file. Succeeds whether or not one existed.
    pub fn clear(&self) -> Result<(), AuthError> {
        match fs::remove_file(&self.vault_path) {
            Ok(()) => {
                debug!(path = %self.vault_path.display(), "Vault cleared");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AuthError::io(&self.vault_path, e)),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use base64::engine::general_purpose::STANDARD as BASE64;
    use base64::Engine;
    use chrono::{Duration, Utc};
    use tempfile::TempDir;

    fn vault_in(dir: &TempDir) -> TokenVault {
        TokenVault::new(
            dir.path().join("vault.key"),
            dir.path().join("session.vault"),
        )
    }

    fn sample_record() -> TokenRecord {
        TokenRecord {
            access_token: "at-12345".to_string(),
            refresh_token: "rt-67890".to_string(),
            token_type: "Bearer".to_string(),
            expires_at: Utc::now() + Duration::hours(1),
            user_id: "usr_1001".to_string(),
            email: "dev@example.com".to_string(),
            tenant_id: "tn_01".to_string(),
            tenant_name: "Example Corp".to_string(),
        }
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let vault = vault_in(&dir);
        let record = sample_record();

        vault.save(&record).unwrap();
        let loaded = vault.load().unwrap();
        assert_eq!(loaded, record);
    }

    #[test]
    fn test_load_missing_vault_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let vault = vault_in(&dir);
        assert!(matches!(vault.load(), Err(AuthError::NotFound)));
    }

    #[test]
    fn test_has_tokens_tracks_save_and_clear() {
        let dir = tempfile::tempdir().unwrap();
        let vault = vault_in(&dir);

        assert!(!vault.has_tokens());
        vault.save(&sample_record()).unwrap();
        assert!(vault.has_tokens());
        vault.clear().unwrap();
        assert!(!vault.has_tokens());
    }

    #[test]
    fn test_clear_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let vault = vault_in(&dir);

        vault.clear().unwrap();
        vault.save(&sample_record()).unwrap();
        vault.clear().unwrap();
        vault.clear().unwrap();
        assert!(!vault.has_tokens());
    }

    #[test]
    fn test_tampered_vault_is_corrupted_not_missing() {
        let dir = tempfile::tempdir().unwrap();
        let vault = vault_in(&dir);
        vault.save(&sample_record()).unwrap();

        let blob = fs::read_to_string(vault.vault_path()).unwrap();
        let mut raw = BASE64.decode(blob.trim()).unwrap();
        let mid = raw.len() / 2;
        raw[mid] ^= 0x01;
        fs::write(vault.vault_path(), BASE64.encode(raw)).unwrap();

        assert!(matches!(vault.load(), Err(AuthError::Corrupted(_))));
    }

    #[test]
    fn test_garbage_vault_is_corrupted() {
        let dir = tempfile::tempdir().unwrap();
        let vault = vault_in(&dir);
        // Make sure a key exists, then plant garbage where the vault goes.
        vault.save(&sample_record()).unwrap();
        fs::write(vault.vault_path(), "definitely not ciphertext").unwrap();

        assert!(matches!(vault.load(), Err(AuthError::Corrupted(_))));
    }

    #[test]
    fn test_file_byte_flip_is_corrupted_not_io() {
        let dir = tempfile::tempdir().unwrap();
        let vault = vault_in(&dir);
        vault.save(&sample_record()).unwrap();

        // Flip the high bit of single bytes in the stored file itself.
        // The file stops being readable as text, but that is still
        // corruption, not a read failure.
        let pristine = fs::read(vault.vault_path()).unwrap();
        for index in [0, pristine.len() / 2, pristine.len() - 1] {
            let mut raw = pristine.clone();
            raw[index] ^= 0x80;
            fs::write(vault.vault_path(), &raw).unwrap();

            match vault.load() {
                Err(AuthError::Corrupted(_)) => {}
                other => panic!("flip at byte {index}: expected Corrupted, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_lost_key_makes_vault_corrupted() {
        let dir = tempfile::tempdir().unwrap();
        let vault = vault_in(&dir);
        vault.save(&sample_record()).unwrap();

        // A regenerated key cannot open the old vault.
        fs::remove_file(dir.path().join("vault.key")).unwrap();
        assert!(matches!(vault.load(), Err(AuthError::Corrupted(_))));
    }

    #[test]
    fn test_save_overwrites_and_leaves_no_temp_files() {
        let dir = tempfile::tempdir().unwrap();
        let vault = vault_in(&dir);

        let mut record = sample_record();
        vault.save(&record).unwrap();
        record.access_token = "at-rotated".to_string();
        vault.save(&record).unwrap();

        assert_eq!(vault.load().unwrap().access_token, "at-rotated");
        let stray: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .filter(|name| name.contains("tmp"))
            .collect();
        assert!(stray.is_empty(), "temp files left behind: {stray:?}");
    }

    #[cfg(unix)]
    #[test]
    fn test_vault_file_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let subdir = dir.path().join("state");
        let vault = TokenVault::new(subdir.join("vault.key"), subdir.join("session.vault"));
        vault.save(&sample_record()).unwrap();

        let file_mode = fs::metadata(vault.vault_path())
            .unwrap()
            .permissions()
            .mode()
            & 0o777;
        assert_eq!(file_mode, 0o600);
        let dir_mode = fs::metadata(&subdir).unwrap().permissions().mode() & 0o777;
        assert_eq!(dir_mode, 0o700);
    }
}
