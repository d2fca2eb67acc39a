//! Key management for keysync.
//!
//! The [`Cryptographer`] owns every key a client knows about and decides
//! which one encrypts outgoing data:
//! - **Default key**: encrypts all new data; set by [`Cryptographer::add_key`],
//!   bootstrap, or [`Cryptographer::set_default_key`]
//! - **Keystore key**: a server-issued recovery key, never used for
//!   [`Cryptographer::encrypt`]
//! - **Pending keys**: a peer's key bag this client cannot read yet, held
//!   until the user supplies credentials that decrypt it
//!
//! Keys survive restarts as bootstrap tokens (see [`bootstrap`]): a key's
//! raw components, protected by a platform [`Encryptor`] and base64 encoded.
//!
//! The cryptographer is synchronous and not internally locked. Mutations
//! take `&mut self`; callers sharing one across threads wrap it in a lock.

pub mod bootstrap;
pub mod config;
mod cryptographer;
pub mod error;
mod handler;

pub use bootstrap::{pack_bootstrap_token, unpack_bootstrap_token};
pub use config::CryptographerConfig;
pub use cryptographer::Cryptographer;
pub use error::{CryptographerError, CryptographerResult};
pub use handler::NigoriHandler;

pub use keysync_crypto::{Encryptor, KdfParams, LocalKeyEncryptor, PassthroughEncryptor};
pub use keysync_types::{
    BaseTransaction, EncryptedData, KeyParams, ModelType, ModelTypeSet, NigoriKey, NigoriKeyBag,
    NigoriSpecifics,
};
