//! Error types for cbc-envelope.
//!
//! The cipher error is a flat enumeration: one variant per failure kind, no
//! nested causes. Messages signal *what* failed without revealing *why*.
//! In particular every decryption failure (wrong key, corrupted IV, bad
//! padding, truncated envelope) renders identically.

use std::fmt;

/// The single error type for all key and envelope operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CipherError {
    /// Key was empty, or not exactly 32 bytes under the fixed-length policy.
    InvalidKey,

    /// The secure random source could not fill the IV.
    IvGenerationFailed,

    /// The secure random source could not produce fresh key material.
    KeyGenerationFailed,

    /// Empty input rejected by the convenience API, or the cipher engine
    /// refused the operation (e.g. a key length AES does not support).
    EncryptionFailed,

    /// Envelope too short, wrong key, corrupted IV or ciphertext, invalid
    /// padding. Deliberately indistinguishable.
    DecryptionFailed,
}

impl fmt::Display for CipherError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidKey => write!(f, "invalid key"),
            Self::IvGenerationFailed => write!(f, "IV generation failed"),
            Self::KeyGenerationFailed => write!(f, "key generation failed"),
            Self::EncryptionFailed => write!(f, "encryption failed"),
            Self::DecryptionFailed => write!(f, "decryption failed"),
        }
    }
}

impl std::error::Error for CipherError {}
