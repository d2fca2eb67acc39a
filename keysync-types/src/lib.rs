//! Shared data model for keysync.
//!
//! These are the records exchanged between the cryptographer, the
//! transaction layer, and peers on other devices:
//! - [`EncryptedData`]: the only on-wire/at-rest form of anything encrypted
//! - [`NigoriKeyBag`]: every known key, shipped inside an [`EncryptedData`]
//! - [`BootstrapKey`]: a single key's raw material, wrapped in a bootstrap token
//! - [`NigoriSpecifics`]: the nigori node payload owned by the transaction layer

mod encrypted;
mod model_type;
mod nigori;
mod params;
mod transaction;

pub use encrypted::EncryptedData;
pub use model_type::{ModelType, ModelTypeSet};
pub use nigori::{BootstrapKey, NigoriKey, NigoriKeyBag, NigoriSpecifics};
pub use params::KeyParams;
pub use transaction::BaseTransaction;
