//! Credential-derived symmetric keys.
//!
//! A [`Nigori`] holds three 32-byte components:
//! - **user key**: carried along with the others so a key can be exported and
//!   re-imported losslessly
//! - **encryption key**: ChaCha20-Poly1305 key for [`Nigori::encrypt`]
//! - **MAC key**: names the key via [`Nigori::permute`] and is bound into
//!   every ciphertext as associated data

use crate::error::{CryptoError, CryptoResult};
use crate::kdf::{KdfParams, SALT_SIZE};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use chacha20poly1305::aead::{Aead, KeyInit, Payload};
use chacha20poly1305::{ChaCha20Poly1305, Key, Nonce};
use hkdf::Hkdf;
use hmac::{Hmac, Mac};
use rand::RngCore;
use sha2::{Digest, Sha256};
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

type HmacSha256 = Hmac<Sha256>;

/// Size of each key component in bytes.
pub const KEY_SIZE: usize = 32;

/// ChaCha20-Poly1305 nonce size, prepended to every blob.
pub const NONCE_SIZE: usize = 12;

/// Poly1305 tag size, appended to every blob.
pub const TAG_SIZE: usize = 16;

const SALT_LABEL: &[u8] = b"keysync-nigori-salt-v1";
const USER_KEY_LABEL: &[u8] = b"keysync-nigori-user-key";
const ENCRYPTION_KEY_LABEL: &[u8] = b"keysync-nigori-encryption-key";
const MAC_KEY_LABEL: &[u8] = b"keysync-nigori-mac-key";

/// Namespace a permuted name belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum KeyType {
    Password = 1,
}

/// Raw components of a [`Nigori`], zeroized on drop.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct ExportedKeys {
    pub user_key: Vec<u8>,
    pub encryption_key: Vec<u8>,
    pub mac_key: Vec<u8>,
}

impl fmt::Debug for ExportedKeys {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ExportedKeys { .. }")
    }
}

/// A symmetric key derived from credentials or imported from raw components.
///
/// Immutable once built. Key material is zeroized when the value is dropped.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct Nigori {
    user_key: [u8; KEY_SIZE],
    encryption_key: [u8; KEY_SIZE],
    mac_key: [u8; KEY_SIZE],
}

impl Nigori {
    /// Derives a key from a credential triplet.
    ///
    /// Deterministic: the same triplet and parameters always produce the same
    /// components. An empty password is rejected.
    pub fn derive(
        hostname: &str,
        username: &str,
        password: &str,
        params: &KdfParams,
    ) -> CryptoResult<Self> {
        if password.is_empty() {
            return Err(CryptoError::KeyDerivation("password is empty".to_string()));
        }

        let salt = account_salt(hostname, username);
        let mut master = params.stretch(password.as_bytes(), &salt)?;
        let hkdf = Hkdf::<Sha256>::new(Some(&salt), &master);
        master.zeroize();

        let mut nigori = Self {
            user_key: [0u8; KEY_SIZE],
            encryption_key: [0u8; KEY_SIZE],
            mac_key: [0u8; KEY_SIZE],
        };
        expand(&hkdf, USER_KEY_LABEL, &mut nigori.user_key)?;
        expand(&hkdf, ENCRYPTION_KEY_LABEL, &mut nigori.encryption_key)?;
        expand(&hkdf, MAC_KEY_LABEL, &mut nigori.mac_key)?;
        Ok(nigori)
    }

    /// Rebuilds a key from components previously returned by
    /// [`Nigori::export_keys`].
    pub fn import(user_key: &[u8], encryption_key: &[u8], mac_key: &[u8]) -> CryptoResult<Self> {
        Ok(Self {
            user_key: to_component(user_key)?,
            encryption_key: to_component(encryption_key)?,
            mac_key: to_component(mac_key)?,
        })
    }

    /// Deterministically maps `name` to an opaque string under this key.
    ///
    /// Used to name keys: permuting a fixed tag gives every client that
    /// derived the same key the same name for it.
    pub fn permute(&self, key_type: KeyType, name: &str) -> CryptoResult<String> {
        let mut mac = <HmacSha256 as Mac>::new_from_slice(&self.mac_key)
            .map_err(|e| CryptoError::KeyDerivation(format!("hmac init failed: {e}")))?;
        mac.update(&[key_type as u8]);
        mac.update(name.as_bytes());
        Ok(BASE64.encode(mac.finalize().into_bytes()))
    }

    /// Encrypts `plaintext`, returning `nonce || ciphertext || tag`.
    pub fn encrypt(&self, plaintext: &[u8]) -> CryptoResult<Vec<u8>> {
        let cipher = ChaCha20Poly1305::new(Key::from_slice(&self.encryption_key));

        let mut nonce_bytes = [0u8; NONCE_SIZE];
        rand::rng().fill_bytes(&mut nonce_bytes);

        let ciphertext = cipher
            .encrypt(
                Nonce::from_slice(&nonce_bytes),
                Payload {
                    msg: plaintext,
                    aad: &self.mac_key,
                },
            )
            .map_err(|e| CryptoError::Encryption(format!("nigori encrypt failed: {e}")))?;

        let mut blob = Vec::with_capacity(NONCE_SIZE + ciphertext.len());
        blob.extend_from_slice(&nonce_bytes);
        blob.extend_from_slice(&ciphertext);
        Ok(blob)
    }

    /// Decrypts a blob produced by [`Nigori::encrypt`].
    pub fn decrypt(&self, blob: &[u8]) -> CryptoResult<Vec<u8>> {
        if blob.len() < NONCE_SIZE + TAG_SIZE {
            return Err(CryptoError::Decryption(format!(
                "blob too short: {} bytes",
                blob.len()
            )));
        }

        let (nonce, ciphertext) = blob.split_at(NONCE_SIZE);
        let cipher = ChaCha20Poly1305::new(Key::from_slice(&self.encryption_key));
        cipher
            .decrypt(
                Nonce::from_slice(nonce),
                Payload {
                    msg: ciphertext,
                    aad: &self.mac_key,
                },
            )
            .map_err(|_| {
                CryptoError::Decryption("wrong key or tampered data".to_string())
            })
    }

    /// Exports the raw components for serialization.
    pub fn export_keys(&self) -> ExportedKeys {
        ExportedKeys {
            user_key: self.user_key.to_vec(),
            encryption_key: self.encryption_key.to_vec(),
            mac_key: self.mac_key.to_vec(),
        }
    }
}

impl fmt::Debug for Nigori {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Nigori { .. }")
    }
}

/// Per-account salt: SHA-256 over length-prefixed hostname and username.
fn account_salt(hostname: &str, username: &str) -> [u8; SALT_SIZE] {
    let mut hasher = Sha256::new();
    hasher.update(SALT_LABEL);
    for part in [hostname, username] {
        hasher.update((part.len() as u64).to_be_bytes());
        hasher.update(part.as_bytes());
    }
    let digest = hasher.finalize();

    let mut salt = [0u8; SALT_SIZE];
    salt.copy_from_slice(&digest[..SALT_SIZE]);
    salt
}

fn expand(hkdf: &Hkdf<Sha256>, label: &[u8], out: &mut [u8; KEY_SIZE]) -> CryptoResult<()> {
    hkdf.expand(label, out)
        .map_err(|e| CryptoError::KeyDerivation(format!("hkdf expand failed: {e}")))
}

fn to_component(bytes: &[u8]) -> CryptoResult<[u8; KEY_SIZE]> {
    bytes.try_into().map_err(|_| CryptoError::InvalidKeyLength {
        expected: KEY_SIZE,
        actual: bytes.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn derive(password: &str) -> Nigori {
        Nigori::derive("example.com", "alice", password, &KdfParams::fast()).unwrap()
    }

    #[test]
    fn components_are_distinct() {
        let keys = derive("pw").export_keys();
        assert_ne!(keys.user_key, keys.encryption_key);
        assert_ne!(keys.encryption_key, keys.mac_key);
        assert_ne!(keys.user_key, keys.mac_key);
    }

    #[test]
    fn salt_separates_hostname_and_username() {
        // Length prefixes keep ("ab", "c") and ("a", "bc") apart.
        assert_ne!(account_salt("ab", "c"), account_salt("a", "bc"));
        assert_eq!(account_salt("host", "user"), account_salt("host", "user"));
    }

    #[test]
    fn empty_password_rejected() {
        let err = Nigori::derive("host", "user", "", &KdfParams::fast()).unwrap_err();
        assert!(matches!(err, CryptoError::KeyDerivation(_)));
    }

    #[test]
    fn import_rejects_short_component() {
        let keys = derive("pw").export_keys();
        let err = Nigori::import(&keys.user_key, &keys.encryption_key[..16], &keys.mac_key)
            .unwrap_err();
        assert!(matches!(
            err,
            CryptoError::InvalidKeyLength {
                expected: 32,
                actual: 16
            }
        ));
    }

    #[test]
    fn blob_layout_is_nonce_ciphertext_tag() {
        let nigori = derive("pw");
        let blob = nigori.encrypt(b"hello").unwrap();
        assert_eq!(blob.len(), NONCE_SIZE + 5 + TAG_SIZE);
    }

    #[test]
    fn truncated_blob_rejected() {
        let nigori = derive("pw");
        let err = nigori.decrypt(&[0u8; NONCE_SIZE + TAG_SIZE - 1]).unwrap_err();
        assert!(matches!(err, CryptoError::Decryption(_)));
    }

    #[test]
    fn debug_does_not_leak_material() {
        assert_eq!(format!("{:?}", derive("pw")), "Nigori { .. }");
    }
}
