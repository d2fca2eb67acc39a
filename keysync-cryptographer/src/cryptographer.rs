//! The key bag and its default/keystore/pending state machine.

use crate::bootstrap::{pack_bootstrap_token, unpack_bootstrap_token};
use crate::config::CryptographerConfig;
use crate::error::{CryptographerError, CryptographerResult};
use crate::handler::NigoriHandler;
use keysync_crypto::{CryptoResult, Encryptor, KeyType, Nigori};
use keysync_types::{
    BaseTransaction, EncryptedData, KeyParams, ModelTypeSet, NigoriKey, NigoriKeyBag,
    NigoriSpecifics,
};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, error, warn};
use zeroize::Zeroizing;

/// Which reference a newly installed key becomes.
#[derive(Clone, Copy)]
enum KeySlot {
    Default,
    Keystore,
}

/// Owns every known key and encrypts/decrypts against them.
///
/// Keys are stored by name. The default and keystore references are names
/// looked up on every use, and always name a key present in the bag.
pub struct Cryptographer {
    config: CryptographerConfig,
    encryptor: Arc<dyn Encryptor>,
    nigoris: BTreeMap<String, Nigori>,
    default_key_name: Option<String>,
    keystore_key_name: Option<String>,
    pending_keys: Option<EncryptedData>,
    nigori_handler: Option<Box<dyn NigoriHandler>>,
}

impl Cryptographer {
    pub fn new(encryptor: Arc<dyn Encryptor>) -> Self {
        Self::with_config(encryptor, CryptographerConfig::default())
    }

    pub fn with_config(encryptor: Arc<dyn Encryptor>, config: CryptographerConfig) -> Self {
        Self {
            config,
            encryptor,
            nigoris: BTreeMap::new(),
            default_key_name: None,
            keystore_key_name: None,
            pending_keys: None,
            nigori_handler: None,
        }
    }

    pub fn config(&self) -> &CryptographerConfig {
        &self.config
    }

    // ── State queries ──

    /// Whether a default key is set.
    pub fn is_initialized(&self) -> bool {
        self.default_key_name.is_some()
    }

    /// Initialized and not waiting on pending keys.
    pub fn is_ready(&self) -> bool {
        self.is_initialized() && !self.has_pending_keys()
    }

    pub fn has_pending_keys(&self) -> bool {
        self.pending_keys.is_some()
    }

    pub fn pending_keys(&self) -> Option<&EncryptedData> {
        self.pending_keys.as_ref()
    }

    pub fn has_keystore_key(&self) -> bool {
        self.keystore_key_name.is_some()
    }

    pub fn default_key_name(&self) -> Option<&str> {
        self.default_key_name.as_deref()
    }

    pub fn keystore_key_name(&self) -> Option<&str> {
        self.keystore_key_name.as_deref()
    }

    pub fn has_key(&self, name: &str) -> bool {
        self.nigoris.contains_key(name)
    }

    /// Number of keys in the bag.
    pub fn key_count(&self) -> usize {
        self.nigoris.len()
    }

    pub fn can_decrypt(&self, encrypted: &EncryptedData) -> bool {
        self.nigoris.contains_key(&encrypted.key_name)
    }

    pub fn can_decrypt_using_default_key(&self, encrypted: &EncryptedData) -> bool {
        self.default_key_name.as_deref() == Some(encrypted.key_name.as_str())
    }

    // ── Key installation ──

    /// Derives a key from `params`, adds it to the bag, and makes it the
    /// default. Replaces any key of the same name.
    pub fn add_key(&mut self, params: &KeyParams) -> CryptographerResult<()> {
        let nigori = self.derive(params).map_err(|e| {
            error!("failed to derive key from credentials: {e}");
            e
        })?;
        self.install_nigori(nigori, KeySlot::Default)
    }

    /// Restores the default key from a bootstrap token.
    ///
    /// Only valid before any key has been installed; later calls are ignored.
    pub fn bootstrap(&mut self, token: &str) {
        if self.is_initialized() {
            error!("bootstrap called on an initialized cryptographer, ignoring");
            return;
        }
        self.install_from_token(token, KeySlot::Default);
    }

    /// Restores the keystore key from a bootstrap token.
    ///
    /// Only valid while no keystore key is held; later calls are ignored.
    pub fn bootstrap_keystore_key(&mut self, token: &str) {
        if self.has_keystore_key() {
            error!("keystore key already installed, ignoring bootstrap");
            return;
        }
        self.install_from_token(token, KeySlot::Keystore);
    }

    /// Installs the key in `token` as the new default, whatever the current
    /// state.
    pub fn add_key_from_bootstrap_token(&mut self, token: &str) -> CryptographerResult<()> {
        let nigori = unpack_bootstrap_token(token, self.encryptor.as_ref())
            .ok_or(CryptographerError::InvalidBootstrapToken)?;
        self.install_nigori(nigori, KeySlot::Default)
    }

    /// Derives the keystore key from a server-issued secret.
    pub fn set_keystore_key(&mut self, keystore_key: &str) -> CryptographerResult<()> {
        if keystore_key.is_empty() {
            return Err(CryptographerError::EmptyKeystoreKey);
        }
        let params = KeyParams::new(
            self.config.keystore_hostname.clone(),
            self.config.keystore_username.clone(),
            keystore_key,
        );
        let nigori = self.derive(&params).map_err(|e| {
            error!("failed to derive keystore key: {e}");
            e
        })?;
        self.install_nigori(nigori, KeySlot::Keystore)
    }

    /// Merges the key bag in `encrypted` into ours. Keys already present by
    /// name are never replaced. Returns how many keys were added.
    ///
    /// `encrypted` must be decryptable; a bag that fails to decrypt or parse
    /// is skipped.
    pub fn install_keys(&mut self, encrypted: &EncryptedData) -> usize {
        if !self.can_decrypt(encrypted) {
            error!(
                "install_keys called with a bag under unknown key {}",
                encrypted.key_name
            );
            return 0;
        }

        let bag: NigoriKeyBag = match self.decrypt(encrypted) {
            Ok(bag) => bag,
            Err(e) => {
                debug!("ignoring key bag that failed to decrypt: {e}");
                return 0;
            }
        };
        self.install_key_bag(&bag)
    }

    /// Points the default reference at an installed key.
    pub fn set_default_key(&mut self, name: &str) -> CryptographerResult<()> {
        if !self.nigoris.contains_key(name) {
            error!("set_default_key called with unknown key {name}");
            return Err(CryptographerError::KeyNotFound(name.to_string()));
        }
        self.default_key_name = Some(name.to_string());
        Ok(())
    }

    /// Holds a key bag we cannot decrypt yet, replacing any earlier one.
    pub fn set_pending_keys(&mut self, encrypted: EncryptedData) -> CryptographerResult<()> {
        if self.can_decrypt(&encrypted) {
            error!(
                "set_pending_keys called with decryptable bag under {}",
                encrypted.key_name
            );
            return Err(CryptographerError::AlreadyDecryptable(encrypted.key_name));
        }
        if self.pending_keys.is_some() {
            debug!("replacing pending keys with bag under {}", encrypted.key_name);
        }
        self.pending_keys = Some(encrypted);
        Ok(())
    }

    /// Tries to open the pending key bag with a key derived from `params`.
    ///
    /// On success every key in the bag is merged in, the pending bag's key
    /// becomes the default, and the pending bag is cleared. Wrong
    /// credentials leave everything untouched so the caller can retry.
    pub fn decrypt_pending_keys(&mut self, params: &KeyParams) -> CryptographerResult<()> {
        let pending = self
            .pending_keys
            .as_ref()
            .ok_or(CryptographerError::NoPendingKeys)?;

        let candidate = self.derive(params).map_err(|e| {
            error!("failed to derive key from credentials: {e}");
            e
        })?;
        let plaintext = Zeroizing::new(candidate.decrypt(&pending.blob).map_err(|e| {
            debug!("pending keys did not decrypt with supplied credentials: {e}");
            CryptographerError::IncorrectCredentials
        })?);
        let new_default = pending.key_name.clone();

        let bag: NigoriKeyBag = serde_json::from_slice(&plaintext).map_err(|e| {
            error!("decrypted pending keys are not a key bag: {e}");
            CryptographerError::Internal(format!("pending keys are not a key bag: {e}"))
        })?;
        self.install_key_bag(&bag);

        if !self.nigoris.contains_key(&new_default) {
            error!("pending key bag does not contain its own key {new_default}");
            return Err(CryptographerError::Internal(format!(
                "pending key bag does not contain key {new_default}"
            )));
        }
        self.default_key_name = Some(new_default);
        self.pending_keys = None;
        Ok(())
    }

    // ── Encrypt / decrypt ──

    /// Serializes `message` and encrypts it under the default key.
    ///
    /// If `previous` already holds the same serialized bytes under the
    /// default key it is returned unchanged, so unchanged data does not get
    /// a fresh ciphertext.
    pub fn encrypt<M: Serialize + ?Sized>(
        &self,
        message: &M,
        previous: Option<&EncryptedData>,
    ) -> CryptographerResult<EncryptedData> {
        if !self.is_initialized() {
            error!("cryptographer not ready, failed to encrypt");
            return Err(CryptographerError::NotReady);
        }
        let serialized = Zeroizing::new(serde_json::to_vec(message).map_err(|e| {
            error!("message failed to serialize: {e}");
            e
        })?);
        self.encrypt_bytes(&serialized, previous)
    }

    /// Encrypts raw bytes under the default key, with the same
    /// re-encryption rule as [`Cryptographer::encrypt`].
    pub fn encrypt_bytes(
        &self,
        plaintext: &[u8],
        previous: Option<&EncryptedData>,
    ) -> CryptographerResult<EncryptedData> {
        let Some((name, nigori)) = self.default_nigori() else {
            error!("cryptographer not ready, failed to encrypt");
            return Err(CryptographerError::NotReady);
        };

        if let Some(previous) = previous.filter(|p| self.can_decrypt_using_default_key(p)) {
            match nigori.decrypt(&previous.blob) {
                Ok(original) if original == plaintext => {
                    debug!("re-encryption unnecessary, encrypted data already matches");
                    return Ok(previous.clone());
                }
                Ok(_) => {}
                Err(e) => debug!("previous blob unreadable, re-encrypting: {e}"),
            }
        }

        let blob = nigori.encrypt(plaintext).map_err(|e| {
            error!("failed to encrypt data: {e}");
            e
        })?;
        Ok(EncryptedData::new(name, blob))
    }

    /// Decrypts `encrypted` and deserializes the plaintext.
    pub fn decrypt<M: DeserializeOwned>(&self, encrypted: &EncryptedData) -> CryptographerResult<M> {
        let plaintext = Zeroizing::new(self.decrypt_to_bytes(encrypted)?);
        Ok(serde_json::from_slice(&plaintext)?)
    }

    /// Decrypts `encrypted` to raw bytes.
    ///
    /// The key must be in the bag; check [`Cryptographer::can_decrypt`] first.
    pub fn decrypt_to_bytes(&self, encrypted: &EncryptedData) -> CryptographerResult<Vec<u8>> {
        let Some(nigori) = self.nigoris.get(&encrypted.key_name) else {
            error!("cannot decrypt, no key named {}", encrypted.key_name);
            return Err(CryptographerError::KeyNotFound(encrypted.key_name.clone()));
        };
        Ok(nigori.decrypt(&encrypted.blob)?)
    }

    /// Every known key, bagged and encrypted under the default key.
    pub fn get_keys(&self) -> CryptographerResult<EncryptedData> {
        let bag = NigoriKeyBag {
            keys: self
                .nigoris
                .iter()
                .map(|(name, nigori)| {
                    let exported = nigori.export_keys();
                    NigoriKey {
                        name: name.clone(),
                        user_key: exported.user_key.clone(),
                        encryption_key: exported.encryption_key.clone(),
                        mac_key: exported.mac_key.clone(),
                    }
                })
                .collect(),
        };
        self.encrypt(&bag, None)
    }

    // ── Bootstrap tokens ──

    pub fn get_bootstrap_token(&self) -> CryptographerResult<String> {
        let (_, nigori) = self.default_nigori().ok_or(CryptographerError::NotReady)?;
        pack_bootstrap_token(nigori, self.encryptor.as_ref())
    }

    pub fn get_keystore_key_bootstrap_token(&self) -> CryptographerResult<String> {
        let nigori = self
            .keystore_key_name
            .as_deref()
            .and_then(|name| self.nigoris.get(name))
            .ok_or(CryptographerError::NoKeystoreKey)?;
        pack_bootstrap_token(nigori, self.encryptor.as_ref())
    }

    // ── Nigori node forwarding ──

    pub fn set_nigori_handler(&mut self, handler: Box<dyn NigoriHandler>) {
        self.nigori_handler = Some(handler);
    }

    pub fn apply_nigori_update(
        &mut self,
        nigori: &NigoriSpecifics,
        trans: &mut dyn BaseTransaction,
    ) -> CryptographerResult<()> {
        let handler = self
            .nigori_handler
            .as_mut()
            .ok_or(CryptographerError::NoNigoriHandler)?;
        handler.apply_nigori_update(nigori, trans);
        Ok(())
    }

    pub fn update_nigori_from_encrypted_types(
        &self,
        nigori: &mut NigoriSpecifics,
        trans: &dyn BaseTransaction,
    ) -> CryptographerResult<()> {
        let handler = self
            .nigori_handler
            .as_ref()
            .ok_or(CryptographerError::NoNigoriHandler)?;
        handler.update_nigori_from_encrypted_types(nigori, trans);
        Ok(())
    }

    pub fn encrypted_types(&self) -> CryptographerResult<ModelTypeSet> {
        self.nigori_handler
            .as_ref()
            .map(|handler| handler.encrypted_types())
            .ok_or(CryptographerError::NoNigoriHandler)
    }

    // ── Internals ──

    fn derive(&self, params: &KeyParams) -> CryptoResult<Nigori> {
        Nigori::derive(
            &params.hostname,
            &params.username,
            &params.password,
            &self.config.kdf,
        )
    }

    fn default_nigori(&self) -> Option<(&str, &Nigori)> {
        let name = self.default_key_name.as_deref()?;
        self.nigoris.get(name).map(|nigori| (name, nigori))
    }

    fn install_from_token(&mut self, token: &str, slot: KeySlot) {
        let Some(nigori) = unpack_bootstrap_token(token, self.encryptor.as_ref()) else {
            return;
        };
        if let Err(e) = self.install_nigori(nigori, slot) {
            error!("failed to install bootstrapped key: {e}");
        }
    }

    fn install_nigori(&mut self, nigori: Nigori, slot: KeySlot) -> CryptographerResult<()> {
        let name = nigori.permute(KeyType::Password, &self.config.key_name_tag)?;
        debug!("installed key {name}");
        self.nigoris.insert(name.clone(), nigori);
        match slot {
            KeySlot::Default => self.default_key_name = Some(name),
            KeySlot::Keystore => self.keystore_key_name = Some(name),
        }
        Ok(())
    }

    fn install_key_bag(&mut self, bag: &NigoriKeyBag) -> usize {
        let mut installed = 0;
        for key in &bag.keys {
            if self.nigoris.contains_key(&key.name) {
                continue;
            }
            match Nigori::import(&key.user_key, &key.encryption_key, &key.mac_key) {
                Ok(nigori) => {
                    self.nigoris.insert(key.name.clone(), nigori);
                    installed += 1;
                }
                Err(e) => warn!("skipping malformed key {} in bag: {e}", key.name),
            }
        }
        debug!("installed {installed} of {} keys from bag", bag.keys.len());
        installed
    }
}

impl fmt::Debug for Cryptographer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cryptographer")
            .field("keys", &self.nigoris.keys().collect::<Vec<_>>())
            .field("default_key_name", &self.default_key_name)
            .field("keystore_key_name", &self.keystore_key_name)
            .field("has_pending_keys", &self.has_pending_keys())
            .field("has_nigori_handler", &self.nigori_handler.is_some())
            .finish_non_exhaustive()
    }
}
