//! Cryptographer error types.

use keysync_crypto::CryptoError;
use thiserror::Error;

/// Result type for cryptographer operations.
pub type CryptographerResult<T> = Result<T, CryptographerError>;

/// Errors that can occur managing or using the key bag.
#[derive(Debug, Error)]
pub enum CryptographerError {
    #[error("cryptographer not ready: no default key")]
    NotReady,

    #[error("no key named {0} in the key bag")]
    KeyNotFound(String),

    #[error("no keystore key installed")]
    NoKeystoreKey,

    #[error("keystore key is empty")]
    EmptyKeystoreKey,

    #[error("no pending keys to decrypt")]
    NoPendingKeys,

    #[error("pending keys could not be decrypted with the supplied credentials")]
    IncorrectCredentials,

    #[error("key {0} is already in the key bag; install the bag instead")]
    AlreadyDecryptable(String),

    #[error("bootstrap token is invalid or unreadable")]
    InvalidBootstrapToken,

    #[error("no nigori handler registered")]
    NoNigoriHandler,

    #[error("internal invariant violated: {0}")]
    Internal(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("crypto error: {0}")]
    Crypto(#[from] CryptoError),
}
