//! Key primitives for keysync.
//!
//! Provides:
//! - [`Nigori`]: a credential-derived symmetric key with deterministic naming
//! - [`KdfParams`]: Argon2id cost parameters for deriving a [`Nigori`]
//! - [`Encryptor`]: local at-rest protection for bootstrap tokens
//!
//! # Key derivation
//!
//! A [`Nigori`] is derived from a `(hostname, username, password)` triplet:
//!
//! 1. **Salt**: SHA-256 over the hostname and username, so every account
//!    gets its own salt without storing one.
//! 2. **Master**: Argon2id over the password and that salt.
//! 3. **Components**: HKDF-SHA256 expands the master into a user key, an
//!    encryption key, and a MAC key.
//!
//! The same triplet always yields the same components, so two devices that
//! know the same passphrase derive the same key and the same key name.

pub mod encryptor;
mod error;
mod kdf;
mod nigori;

pub use encryptor::{
    Encryptor, EncryptorError, EncryptorResult, LocalKeyEncryptor, PassthroughEncryptor,
};
pub use error::{CryptoError, CryptoResult};
pub use kdf::{KdfParams, SALT_SIZE};
pub use nigori::{ExportedKeys, KeyType, Nigori, KEY_SIZE, NONCE_SIZE, TAG_SIZE};
