//! Cipher configuration.

use serde::{Deserialize, Serialize};

/// Construction-time choices for an [`EnvelopeCipher`](crate::EnvelopeCipher).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CipherConfig {
    /// Require exactly [`KEY_LEN`](crate::KEY_LEN) key bytes (AES-256).
    ///
    /// When `false`, any non-empty key is accepted at construction and the
    /// AES variant is picked from its length at call time; lengths other than
    /// 16, 24 or 32 bytes then fail inside the engine.
    pub fixed_key_length: bool,
}

impl Default for CipherConfig {
    fn default() -> Self {
        Self {
            fixed_key_length: true,
        }
    }
}

impl CipherConfig {
    /// Config accepting any non-empty key.
    pub fn variable() -> Self {
        Self {
            fixed_key_length: false,
        }
    }
}
