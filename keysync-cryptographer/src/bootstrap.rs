//! Bootstrap tokens: a single key's raw material, protected at rest.
//!
//! Token layout: `base64(encryptor(json(BootstrapKey)))`. Only this module
//! parses it.
//!
//! Packing works on values this process just derived or serialized, so
//! every failure there is an internal error. Unpacking works on tokens read
//! back from storage that may be stale or corrupt, so failures there are
//! expected and only yield `None`.

use crate::error::{CryptographerError, CryptographerResult};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use keysync_crypto::{Encryptor, Nigori};
use keysync_types::BootstrapKey;
use std::fmt::Display;
use tracing::{error, warn};
use zeroize::Zeroizing;

/// Packs `nigori` into a bootstrap token.
pub fn pack_bootstrap_token(
    nigori: &Nigori,
    encryptor: &dyn Encryptor,
) -> CryptographerResult<String> {
    let exported = nigori.export_keys();
    let record = BootstrapKey {
        user_key: exported.user_key.clone(),
        encryption_key: exported.encryption_key.clone(),
        mac_key: exported.mac_key.clone(),
    };

    let serialized = Zeroizing::new(
        serde_json::to_vec(&record).map_err(|e| internal("serializing bootstrap key", e))?,
    );
    let encrypted = encryptor
        .encrypt_bytes(&serialized)
        .map_err(|e| internal("encrypting bootstrap token", e))?;

    Ok(BASE64.encode(encrypted))
}

/// Unpacks a bootstrap token into a key.
///
/// Returns `None` for an empty, undecodable, undecryptable, or unparsable
/// token.
pub fn unpack_bootstrap_token(token: &str, encryptor: &dyn Encryptor) -> Option<Nigori> {
    if token.is_empty() {
        return None;
    }

    let encrypted = match BASE64.decode(token) {
        Ok(bytes) => bytes,
        Err(e) => {
            warn!("could not decode bootstrap token: {e}");
            return None;
        }
    };

    let serialized = match encryptor.decrypt_bytes(&encrypted) {
        Ok(bytes) => Zeroizing::new(bytes),
        Err(e) => {
            warn!("decryption of bootstrap token failed: {e}");
            return None;
        }
    };

    let record: BootstrapKey = match serde_json::from_slice(&serialized) {
        Ok(record) => record,
        Err(e) => {
            warn!("parsing of bootstrap token failed: {e}");
            return None;
        }
    };

    match Nigori::import(&record.user_key, &record.encryption_key, &record.mac_key) {
        Ok(nigori) => Some(nigori),
        Err(e) => {
            error!("bootstrap token holds unusable key material: {e}");
            None
        }
    }
}

fn internal(step: &str, err: impl Display) -> CryptographerError {
    error!("{step} failed: {err}");
    CryptographerError::Internal(format!("{step} failed: {err}"))
}
