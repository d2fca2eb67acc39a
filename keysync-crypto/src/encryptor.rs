//! Local at-rest encryption for bootstrap tokens.
//!
//! The cryptographer depends on `Arc<dyn Encryptor>` and never sees how the
//! platform protects its secrets. Production code uses a
//! [`LocalKeyEncryptor`] keyed from platform storage; tests use
//! [`PassthroughEncryptor`].

use crate::error::{CryptoError, CryptoResult};
use crate::nigori::{KEY_SIZE, NONCE_SIZE, TAG_SIZE};
use chacha20poly1305::aead::{Aead, KeyInit};
use chacha20poly1305::{ChaCha20Poly1305, Key, Nonce};
use rand::RngCore;
use thiserror::Error;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Errors from the at-rest encryption layer.
#[derive(Debug, Error)]
pub enum EncryptorError {
    /// Input is not something this encryptor produced.
    #[error("malformed ciphertext: {0}")]
    Malformed(String),
    /// Underlying crypto failure.
    #[error("crypto error: {0}")]
    Crypto(String),
}

pub type EncryptorResult<T> = Result<T, EncryptorError>;

/// Trait for protecting opaque byte strings at rest.
pub trait Encryptor: Send + Sync {
    /// Encrypt `plaintext`, returning an opaque blob.
    fn encrypt_bytes(&self, plaintext: &[u8]) -> EncryptorResult<Vec<u8>>;

    /// Decrypt a blob previously produced by `encrypt_bytes`.
    fn decrypt_bytes(&self, ciphertext: &[u8]) -> EncryptorResult<Vec<u8>>;
}

/// No-op encryptor for tests. Data passes through unchanged.
pub struct PassthroughEncryptor;

impl Encryptor for PassthroughEncryptor {
    fn encrypt_bytes(&self, plaintext: &[u8]) -> EncryptorResult<Vec<u8>> {
        Ok(plaintext.to_vec())
    }

    fn decrypt_bytes(&self, ciphertext: &[u8]) -> EncryptorResult<Vec<u8>> {
        Ok(ciphertext.to_vec())
    }
}

/// ChaCha20-Poly1305 under a single machine-local key.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct LocalKeyEncryptor {
    key: [u8; KEY_SIZE],
}

impl LocalKeyEncryptor {
    pub fn new(key: [u8; KEY_SIZE]) -> Self {
        Self { key }
    }

    /// Builds an encryptor from a key loaded out of platform storage.
    pub fn from_slice(key: &[u8]) -> CryptoResult<Self> {
        let key = key.try_into().map_err(|_| CryptoError::InvalidKeyLength {
            expected: KEY_SIZE,
            actual: key.len(),
        })?;
        Ok(Self { key })
    }

    /// Generates a fresh random local key.
    pub fn generate() -> Self {
        let mut key = [0u8; KEY_SIZE];
        rand::rng().fill_bytes(&mut key);
        Self { key }
    }

    /// Raw key bytes, for persisting to platform storage.
    pub fn key_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.key
    }
}

impl Encryptor for LocalKeyEncryptor {
    fn encrypt_bytes(&self, plaintext: &[u8]) -> EncryptorResult<Vec<u8>> {
        let cipher = ChaCha20Poly1305::new(Key::from_slice(&self.key));

        let mut nonce_bytes = [0u8; NONCE_SIZE];
        rand::rng().fill_bytes(&mut nonce_bytes);

        let ciphertext = cipher
            .encrypt(Nonce::from_slice(&nonce_bytes), plaintext)
            .map_err(|e| EncryptorError::Crypto(format!("local encrypt failed: {e}")))?;

        let mut out = Vec::with_capacity(NONCE_SIZE + ciphertext.len());
        out.extend_from_slice(&nonce_bytes);
        out.extend_from_slice(&ciphertext);
        Ok(out)
    }

    fn decrypt_bytes(&self, ciphertext: &[u8]) -> EncryptorResult<Vec<u8>> {
        if ciphertext.len() < NONCE_SIZE + TAG_SIZE {
            return Err(EncryptorError::Malformed(format!(
                "{} bytes is shorter than nonce and tag",
                ciphertext.len()
            )));
        }

        let (nonce, body) = ciphertext.split_at(NONCE_SIZE);
        let cipher = ChaCha20Poly1305::new(Key::from_slice(&self.key));
        cipher
            .decrypt(Nonce::from_slice(nonce), body)
            .map_err(|_| EncryptorError::Crypto("wrong local key or tampered data".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn passthrough_is_identity() {
        let enc = PassthroughEncryptor;
        assert_eq!(enc.encrypt_bytes(b"abc").unwrap(), b"abc");
        assert_eq!(enc.decrypt_bytes(b"abc").unwrap(), b"abc");
    }

    #[test]
    fn from_slice_roundtrips_key_bytes() {
        let a = LocalKeyEncryptor::generate();
        let b = LocalKeyEncryptor::from_slice(a.key_bytes()).unwrap();
        let blob = a.encrypt_bytes(b"token").unwrap();
        assert_eq!(b.decrypt_bytes(&blob).unwrap(), b"token");
    }

    #[test]
    fn from_slice_rejects_wrong_length() {
        assert!(matches!(
            LocalKeyEncryptor::from_slice(&[0u8; 31]),
            Err(CryptoError::InvalidKeyLength {
                expected: 32,
                actual: 31
            })
        ));
    }

    #[test]
    fn short_input_is_malformed() {
        let enc = LocalKeyEncryptor::generate();
        assert!(matches!(
            enc.decrypt_bytes(&[1, 2, 3]),
            Err(EncryptorError::Malformed(_))
        ));
    }
}
