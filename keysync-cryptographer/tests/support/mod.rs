//! Shared helpers for cryptographer integration tests.
#![allow(dead_code)]

use keysync_cryptographer::{
    Cryptographer, CryptographerConfig, Encryptor, KdfParams, KeyParams, LocalKeyEncryptor,
};
use std::sync::{Arc, Once};

static TRACING: Once = Once::new();

/// Installs a test subscriber once; honours `RUST_LOG`.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// Config with minimal Argon2 cost so derivations stay fast.
pub fn fast_config() -> CryptographerConfig {
    CryptographerConfig {
        kdf: KdfParams::fast(),
        ..CryptographerConfig::default()
    }
}

/// A cryptographer with its own local at-rest key.
pub fn new_cryptographer() -> Cryptographer {
    with_encryptor(Arc::new(LocalKeyEncryptor::generate()))
}

pub fn with_encryptor(encryptor: Arc<dyn Encryptor>) -> Cryptographer {
    init_tracing();
    Cryptographer::with_config(encryptor, fast_config())
}

pub fn params(password: &str) -> KeyParams {
    KeyParams::new("host", "alice", password)
}

/// Name a cryptographer assigns to the key derived from `password`.
pub fn key_name_for(password: &str) -> String {
    let mut c = new_cryptographer();
    c.add_key(&params(password)).expect("derivation must succeed");
    c.default_key_name().expect("default key set").to_string()
}
