//! Secure Storage Codec
//!
//! AES-256-GCM encryption for the session cookie blob and every value the
//! console persists client-side. The key is derived from a configured
//! passphrase with SHA-256; blobs are base64 of `nonce || ciphertext`.
//!
//! Decryption is fail closed: any malformed, truncated, or tampered blob
//! decodes to `None`, never to an error the caller has to handle.

use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Key, Nonce,
};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use rand::RngCore;
use serde::{de::DeserializeOwned, Serialize};
use sha2::{Digest, Sha256};

/// AES-GCM nonce length in bytes.
const NONCE_LEN: usize = 12;

/// Crypto error type
#[derive(Debug, thiserror::Error)]
pub enum CryptoError {
    #[error("encryption failed")]
    Encrypt,

    #[error("payload serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Symmetric codec shared by the session cookie and secure storage.
#[derive(Clone)]
pub struct SecureCodec {
    key: [u8; 32],
}

impl SecureCodec {
    /// Derive a codec from a passphrase.
    pub fn new(passphrase: &str) -> Self {
        let key: [u8; 32] = Sha256::digest(passphrase.as_bytes()).into();
        Self { key }
    }

    /// Encrypt a UTF-8 string into an opaque base64 blob.
    pub fn encrypt_str(&self, plaintext: &str) -> Result<String, CryptoError> {
        let key = Key::<Aes256Gcm>::from_slice(&self.key);
        let cipher = Aes256Gcm::new(key);

        let nonce_bytes = generate_nonce();
        let nonce = Nonce::from_slice(&nonce_bytes);

        let ciphertext = cipher
            .encrypt(nonce, plaintext.as_bytes())
            .map_err(|_| CryptoError::Encrypt)?;

        // Prepend nonce to ciphertext
        let mut blob = Vec::with_capacity(NONCE_LEN + ciphertext.len());
        blob.extend_from_slice(&nonce_bytes);
        blob.extend_from_slice(&ciphertext);

        Ok(BASE64.encode(blob))
    }

    /// Decrypt a blob produced by [`encrypt_str`](Self::encrypt_str).
    ///
    /// Fail closed: returns `None` for anything that does not decrypt and
    /// authenticate cleanly.
    pub fn decrypt_str(&self, blob: &str) -> Option<String> {
        let raw = BASE64.decode(blob).ok()?;
        if raw.len() < NONCE_LEN {
            return None;
        }

        let key = Key::<Aes256Gcm>::from_slice(&self.key);
        let cipher = Aes256Gcm::new(key);

        let (nonce_bytes, ciphertext) = raw.split_at(NONCE_LEN);
        let nonce = Nonce::from_slice(nonce_bytes);

        let plaintext = cipher.decrypt(nonce, ciphertext).ok()?;
        String::from_utf8(plaintext).ok()
    }

    /// Serialize a value to JSON and encrypt it.
    pub fn encrypt_json<T: Serialize>(&self, value: &T) -> Result<String, CryptoError> {
        let json = serde_json::to_string(value)?;
        self.encrypt_str(&json)
    }

    /// Decrypt a blob and deserialize the JSON inside it. Fail closed.
    pub fn decrypt_json<T: DeserializeOwned>(&self, blob: &str) -> Option<T> {
        let json = self.decrypt_str(blob)?;
        serde_json::from_str(&json).ok()
    }
}

fn generate_nonce() -> [u8; NONCE_LEN] {
    let mut nonce = [0u8; NONCE_LEN];
    rand::rng().fill_bytes(&mut nonce);
    nonce
}
