//! Argon2id key stretching.

use crate::error::{CryptoError, CryptoResult};
use crate::nigori::KEY_SIZE;
use argon2::{Algorithm, Argon2, Params, Version};
use serde::{Deserialize, Serialize};

/// Salt length fed to Argon2id.
pub const SALT_SIZE: usize = 16;

/// Argon2id cost parameters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct KdfParams {
    /// Memory cost in KiB.
    pub memory_kib: u32,
    /// Number of passes.
    pub iterations: u32,
    /// Degree of parallelism (lanes).
    pub parallelism: u32,
}

impl Default for KdfParams {
    fn default() -> Self {
        Self {
            memory_kib: 19 * 1024,
            iterations: 2,
            parallelism: 1,
        }
    }
}

impl KdfParams {
    /// Smallest parameters Argon2 accepts. Only for tests.
    pub fn fast() -> Self {
        Self {
            memory_kib: 8,
            iterations: 1,
            parallelism: 1,
        }
    }

    pub(crate) fn stretch(
        &self,
        password: &[u8],
        salt: &[u8; SALT_SIZE],
    ) -> CryptoResult<[u8; KEY_SIZE]> {
        let params = Params::new(
            self.memory_kib,
            self.iterations,
            self.parallelism,
            Some(KEY_SIZE),
        )
        .map_err(|e| CryptoError::KeyDerivation(format!("invalid argon2 params: {e}")))?;

        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);
        let mut out = [0u8; KEY_SIZE];
        argon2
            .hash_password_into(password, salt, &mut out)
            .map_err(|e| CryptoError::KeyDerivation(format!("argon2 failed: {e}")))?;
        Ok(out)
    }
}
