//! Cryptographer configuration.

use keysync_crypto::KdfParams;
use serde::{Deserialize, Serialize};

/// Configuration for a [`crate::Cryptographer`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CryptographerConfig {
    /// Argon2id cost used for every credential-derived key.
    ///
    /// All clients of one account must agree on this, or they derive
    /// different keys from the same passphrase.
    pub kdf: KdfParams,

    /// Tag permuted through a key to produce its name.
    pub key_name_tag: String,

    /// Hostname paired with a server-issued keystore key for derivation.
    pub keystore_hostname: String,

    /// Username paired with a server-issued keystore key for derivation.
    pub keystore_username: String,
}

impl Default for CryptographerConfig {
    fn default() -> Self {
        Self {
            kdf: KdfParams::default(),
            key_name_tag: "nigori-key".to_string(),
            keystore_hostname: "localhost".to_string(),
            keystore_username: "dummy".to_string(),
        }
    }
}

impl CryptographerConfig {
    /// Creates a config with minimal KDF cost for testing.
    #[cfg(test)]
    pub fn test() -> Self {
        Self {
            kdf: KdfParams::fast(),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let config: CryptographerConfig =
            serde_json::from_str(r#"{"key_name_tag":"custom"}"#).unwrap();
        assert_eq!(config.key_name_tag, "custom");
        assert_eq!(config.keystore_hostname, "localhost");
        assert_eq!(config.kdf, KdfParams::default());
    }
}
