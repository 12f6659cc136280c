//! Authenticated encryption for vault contents.
//!
//! XChaCha20-Poly1305 with a fresh random nonce per call. The sealed
//! form is base64 over `nonce || ciphertext || tag`, so a blob carries
//! everything needed to open it except the key. Any tampering, any
//! truncation, or the wrong key all surface as the same
//! [`AuthError::DecryptionFailed`] with no detail about which check
//! failed.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use chacha20poly1305::aead::{Aead, AeadCore, KeyInit, OsRng};
use chacha20poly1305::{XChaCha20Poly1305, XNonce};

use crate::error::AuthError;
use crate::vault::keys::EncryptionKey;

/// XChaCha20-Poly1305 nonce length. The extended nonce is large enough
/// that random generation cannot realistically collide.
const NONCE_SIZE: usize = 24;

/// Poly1305 authentication tag length, appended to the ciphertext.
const TAG_SIZE: usize = 16;

/// Seal `plaintext` under `key`, returning a base64 blob.
pub fn encrypt(plaintext: &[u8], key: &EncryptionKey) -> Result<String, AuthError> {
    let cipher = XChaCha20Poly1305::new(key.as_bytes().into());

    // Random nonce, fresh for every call (never reuse!)
    let nonce = XChaCha20Poly1305::generate_nonce(&mut OsRng);
    let ciphertext = cipher
        .encrypt(&nonce, plaintext)
        .map_err(|_| AuthError::EncryptionFailed)?;

    let mut blob = Vec::with_capacity(NONCE_SIZE + ciphertext.len());
    blob.extend_from_slice(&nonce);
    blob.extend_from_slice(&ciphertext);
    Ok(BASE64.encode(blob))
}

/// Open a blob produced by [`encrypt`].
pub fn decrypt(blob: &str, key: &EncryptionKey) -> Result<Vec<u8>, AuthError> {
    let raw = BASE64
        .decode(blob.trim())
        .map_err(|_| AuthError::DecryptionFailed)?;
    if raw.len() < NONCE_SIZE + TAG_SIZE {
        return Err(AuthError::DecryptionFailed);
    }

    let (nonce, ciphertext) = raw.split_at(NONCE_SIZE);
    let cipher = XChaCha20Poly1305::new(key.as_bytes().into());
    cipher
        .decrypt(XNonce::from_slice(nonce), ciphertext)
        .map_err(|_| AuthError::DecryptionFailed)
}
