//! # cbc-envelope
//!
//! Symmetric envelope encryption with AES-CBC and PKCS7 padding.
//!
//! Given a caller-supplied key, plaintext bytes become a self-contained
//! envelope (a fresh random IV followed by the ciphertext), and the same key
//! turns the envelope back into plaintext. There is no MAC: integrity is out
//! of scope, and a consumer that needs it should wrap the envelope.
//!
//! Around the core sit two external capabilities, an HTTP fetch and a
//! reachability check, glued together by [`EncryptedClient`]. The core never
//! initiates network calls itself.
//!
//! ## Public API
//!
//! ```no_run
//! use cbc_envelope::{Crypter, EnvelopeCipher, KeyMaterial};
//!
//! # fn main() -> Result<(), cbc_envelope::CipherError> {
//! let cipher = EnvelopeCipher::new(KeyMaterial::fixed(b"FiugQTgPNwCWUY,VhfmM4cKXTLVFvHFe")?);
//! let envelope = cipher.seal(b"please encrypt")?;
//! assert_eq!(cipher.open(envelope.as_bytes())?, b"please encrypt");
//! # Ok(())
//! # }
//! ```

// Module declarations.
pub(crate) mod crypto;
pub mod client;
pub mod config;
pub mod crypter;
pub mod envelope;
pub mod error;
pub mod fetch;
pub mod journal;
pub mod keys;
pub mod reachability;

pub use client::{ClientError, EncryptedClient, SealedResponse};
pub use config::CipherConfig;
pub use crypter::Crypter;
pub use crypto::{BLOCK_LEN, IV_LEN, KEY_LEN};
pub use envelope::{Envelope, EnvelopeCipher};
pub use error::CipherError;
pub use keys::KeyMaterial;

/// Generate a cryptographically secure AES-256 key.
///
/// In production, callers should source keys from a dedicated key store;
/// key derivation and storage are outside this crate.
pub fn generate_key() -> Result<KeyMaterial, CipherError> {
    KeyMaterial::generate()
}
