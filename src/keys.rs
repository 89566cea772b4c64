//! Key ownership.
//!
//! `KeyMaterial` is the one secret a caller hands to an `EnvelopeCipher`.
//! It is validated once at construction and immutable afterwards.
//!
//! - Not `Clone`. Share a cipher through `Arc` instead of duplicating keys.
//! - Zeroised on drop. Memory is overwritten before deallocation.
//! - `Debug` never prints the bytes.

use std::fmt;

use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::config::CipherConfig;
use crate::crypto::{self, KEY_LEN};
use crate::error::CipherError;

/// Validated symmetric key bytes.
///
/// The bytes are wiped on drop, but there is no public way to wipe or
/// otherwise mutate them while the key is alive:
///
/// ```compile_fail
/// use cbc_envelope::KeyMaterial;
/// use zeroize::Zeroize;
///
/// let mut key = KeyMaterial::fixed(&[7u8; 32]).unwrap();
/// key.zeroize();
/// ```
#[derive(ZeroizeOnDrop)]
pub struct KeyMaterial {
    bytes: Vec<u8>,
}

impl KeyMaterial {
    /// Validate `raw` under the policy in `config` and take a copy of it.
    ///
    /// Fails with [`CipherError::InvalidKey`] when `raw` is empty, or when
    /// `config.fixed_key_length` is set and `raw` is not exactly
    /// [`KEY_LEN`] bytes. No cryptographic operation is attempted.
    pub fn new(raw: &[u8], config: &CipherConfig) -> Result<Self, CipherError> {
        if raw.is_empty() {
            return Err(CipherError::InvalidKey);
        }
        if config.fixed_key_length && raw.len() != KEY_LEN {
            return Err(CipherError::InvalidKey);
        }
        Ok(Self {
            bytes: raw.to_vec(),
        })
    }

    /// Exactly 32 bytes, AES-256.
    pub fn fixed(raw: &[u8]) -> Result<Self, CipherError> {
        Self::new(raw, &CipherConfig::default())
    }

    /// Any non-empty key. Lengths AES cannot use are rejected per call.
    pub fn variable(raw: &[u8]) -> Result<Self, CipherError> {
        Self::new(raw, &CipherConfig::variable())
    }

    /// Use the UTF-8 bytes of `passphrase` directly as the key.
    ///
    /// No key derivation happens here; a 32-character ASCII passphrase
    /// becomes an AES-256 key, anything AES cannot use fails at call time.
    pub fn from_passphrase(passphrase: &str) -> Result<Self, CipherError> {
        Self::variable(passphrase.as_bytes())
    }

    /// Generate a fresh AES-256 key from the OS secure random source.
    pub fn generate() -> Result<Self, CipherError> {
        let mut raw = crypto::generate_random_key()?;
        let key = Self::fixed(&raw);
        raw.zeroize();
        key
    }

    /// Number of key bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Always `false` for a constructed key; present for API symmetry.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Borrow the raw key bytes for cipher calls.
    ///
    /// `pub(crate)`: raw bytes never leave the crate.
    pub(crate) fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

impl fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyMaterial")
            .field("len", &self.bytes.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_key_rejected_under_both_policies() {
        assert_eq!(KeyMaterial::fixed(&[]).unwrap_err(), CipherError::InvalidKey);
        assert_eq!(KeyMaterial::variable(&[]).unwrap_err(), CipherError::InvalidKey);
        assert_eq!(KeyMaterial::from_passphrase("").unwrap_err(), CipherError::InvalidKey);
    }

    #[test]
    fn test_fixed_policy_requires_exact_length() {
        assert_eq!(KeyMaterial::fixed(&[0u8; 10]).unwrap_err(), CipherError::InvalidKey);
        assert_eq!(KeyMaterial::fixed(&[0u8; 31]).unwrap_err(), CipherError::InvalidKey);
        assert_eq!(KeyMaterial::fixed(&[0u8; 33]).unwrap_err(), CipherError::InvalidKey);
        assert_eq!(KeyMaterial::fixed(&[0u8; 32]).unwrap().len(), 32);
    }

    #[test]
    fn test_variable_policy_accepts_any_non_empty_length() {
        assert_eq!(KeyMaterial::variable(&[0u8; 10]).unwrap().len(), 10);
        assert_eq!(KeyMaterial::from_passphrase("InvalidKey").unwrap().len(), 10);
    }

    #[test]
    fn test_debug_does_not_leak_bytes() {
        let key = KeyMaterial::fixed(&[0xAB; 32]).unwrap();
        let rendered = format!("{:?}", key);
        assert!(rendered.contains("len: 32"));
        assert!(!rendered.contains("171"));
    }

    #[test]
    fn test_key_stays_intact_across_cipher_use() {
        let key = KeyMaterial::fixed(&[7u8; 32]).unwrap();
        let cipher = crate::EnvelopeCipher::new(key);

        let envelope = cipher.encrypt(b"x").unwrap();
        assert_eq!(cipher.key_len(), 32);
        assert_eq!(cipher.decrypt(envelope.as_bytes()).unwrap(), b"x");
    }

    #[test]
    fn test_generated_keys_are_distinct() {
        let a = KeyMaterial::generate().unwrap();
        let b = KeyMaterial::generate().unwrap();
        assert_eq!(a.len(), KEY_LEN);
        assert_ne!(a.as_bytes(), b.as_bytes());
    }
}
