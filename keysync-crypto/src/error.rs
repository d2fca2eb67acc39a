//! Error types for the key primitives.

use thiserror::Error;

/// Result type for key primitive operations.
pub type CryptoResult<T> = Result<T, CryptoError>;

/// Errors that can occur deriving, importing, or using a key.
#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("key derivation failed: {0}")]
    KeyDerivation(String),

    #[error("encryption failed: {0}")]
    Encryption(String),

    #[error("decryption failed: {0}")]
    Decryption(String),

    #[error("invalid key length: expected {expected}, got {actual}")]
    InvalidKeyLength { expected: usize, actual: usize },
}
