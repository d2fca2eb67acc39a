use serde::{Deserialize, Serialize};

/// Ciphertext tagged with the name of the key that produced it.
///
/// The name lets a receiver pick the right key out of its bag without
/// trial-decrypting against every key it holds.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptedData {
    pub key_name: String,
    pub blob: Vec<u8>,
}

impl EncryptedData {
    pub fn new(key_name: impl Into<String>, blob: Vec<u8>) -> Self {
        Self {
            key_name: key_name.into(),
            blob,
        }
    }

    /// True for the default envelope that no key has written to yet.
    pub fn is_empty(&self) -> bool {
        self.key_name.is_empty() && self.blob.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_empty() {
        assert!(EncryptedData::default().is_empty());
        assert!(!EncryptedData::new("k", vec![]).is_empty());
    }

    #[test]
    fn json_shape_is_stable() {
        let data = EncryptedData::new("abc", vec![1, 2, 3]);
        let json = serde_json::to_string(&data).unwrap();
        assert_eq!(json, r#"{"key_name":"abc","blob":[1,2,3]}"#);

        let back: EncryptedData = serde_json::from_str(&json).unwrap();
        assert_eq!(back, data);
    }
}
