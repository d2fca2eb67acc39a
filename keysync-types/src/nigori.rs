use crate::{EncryptedData, ModelTypeSet};
use serde::{Deserialize, Serialize};
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// One named key in a key bag, with its exported raw components.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
pub struct NigoriKey {
    pub name: String,
    pub user_key: Vec<u8>,
    pub encryption_key: Vec<u8>,
    pub mac_key: Vec<u8>,
}

impl fmt::Debug for NigoriKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NigoriKey")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Every key a client knows about. Peers exchange this encrypted under the
/// sender's default key.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NigoriKeyBag {
    pub keys: Vec<NigoriKey>,
}

/// Raw material of a single key, as wrapped inside a bootstrap token.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
pub struct BootstrapKey {
    pub user_key: Vec<u8>,
    pub encryption_key: Vec<u8>,
    pub mac_key: Vec<u8>,
}

impl fmt::Debug for BootstrapKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("BootstrapKey { .. }")
    }
}

/// Contents of the nigori node. Owned by the transaction layer; the
/// cryptographer only forwards it.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NigoriSpecifics {
    /// The sender's key bag, encrypted under its default key.
    pub encryption_keybag: EncryptedData,
    pub encrypted_types: ModelTypeSet,
    pub encrypt_everything: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_hides_key_material() {
        let key = NigoriKey {
            name: "visible-name".into(),
            user_key: vec![0xAA; 4],
            encryption_key: vec![0xBB; 4],
            mac_key: vec![0xCC; 4],
        };
        let rendered = format!("{key:?}");
        assert!(rendered.contains("visible-name"));
        assert!(!rendered.contains("170"));

        let bootstrap = BootstrapKey {
            user_key: vec![1],
            encryption_key: vec![2],
            mac_key: vec![3],
        };
        assert_eq!(format!("{bootstrap:?}"), "BootstrapKey { .. }");
    }

    fn assert_zeroize_on_drop<T: ZeroizeOnDrop>() {}

    #[test]
    fn key_records_wipe_their_material() {
        assert_zeroize_on_drop::<NigoriKey>();
        assert_zeroize_on_drop::<BootstrapKey>();

        let mut key = NigoriKey {
            name: "k".into(),
            user_key: vec![0xAA; 32],
            encryption_key: vec![0xBB; 32],
            mac_key: vec![0xCC; 32],
        };
        key.zeroize();
        assert!(key.name.is_empty());
        assert!(key.user_key.is_empty());
        assert!(key.encryption_key.is_empty());
        assert!(key.mac_key.is_empty());

        let mut bootstrap = BootstrapKey {
            user_key: vec![1; 32],
            encryption_key: vec![2; 32],
            mac_key: vec![3; 32],
        };
        bootstrap.zeroize();
        assert!(bootstrap.user_key.is_empty());
        assert!(bootstrap.mac_key.is_empty());
    }
}
