use serde::{Deserialize, Serialize};
use std::fmt;

/// Credential triplet a key is derived from.
///
/// Identical triplets always derive identical keys, which is how two
/// devices that know the same passphrase end up agreeing on a key.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyParams {
    pub hostname: String,
    pub username: String,
    pub password: String,
}

impl KeyParams {
    pub fn new(
        hostname: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            hostname: hostname.into(),
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for KeyParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyParams")
            .field("hostname", &self.hostname)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_redacts_password() {
        let params = KeyParams::new("host", "alice", "hunter2");
        let rendered = format!("{params:?}");
        assert!(rendered.contains("alice"));
        assert!(!rendered.contains("hunter2"));
    }
}
