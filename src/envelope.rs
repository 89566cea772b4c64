//! Envelope encryption.
//!
//! An envelope is the only wire/at-rest representation this crate produces:
//!
//! ```text
//! [ IV (16 bytes) ][ AES-CBC ciphertext, PKCS7-padded to a multiple of 16 ]
//! ```
//!
//! There is no version tag, no length prefix and no MAC. The IV is not secret
//! and travels with the ciphertext; the key must be known out of band.
//!
//! CBC provides no integrity. A tampered envelope whose last block happens to
//! unpad cleanly decrypts to garbage without an error.

use std::fmt;

use zeroize::Zeroize;

use crate::config::CipherConfig;
use crate::crypto::{self, RandomSource, BLOCK_LEN, IV_LEN};
use crate::error::CipherError;
use crate::keys::KeyMaterial;

/// IV-prefixed ciphertext produced by [`EnvelopeCipher::encrypt`].
#[derive(Clone, PartialEq, Eq)]
pub struct Envelope(Vec<u8>);

impl Envelope {
    /// Wrap bytes received from storage or the wire.
    ///
    /// Checks the layout only: at least one IV block followed by a non-empty,
    /// block-aligned ciphertext. Whether the key fits is decided by `decrypt`.
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, CipherError> {
        if bytes.len() < IV_LEN + BLOCK_LEN || (bytes.len() - IV_LEN) % BLOCK_LEN != 0 {
            return Err(CipherError::DecryptionFailed);
        }
        Ok(Self(bytes))
    }

    /// The 16-byte IV prefix.
    pub fn iv(&self) -> &[u8] {
        &self.0[..IV_LEN]
    }

    /// The ciphertext following the IV.
    pub fn ciphertext(&self) -> &[u8] {
        &self.0[IV_LEN..]
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }

    /// Total length, IV included.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Never true for an envelope built by this crate.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl AsRef<[u8]> for Envelope {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<Envelope> for Vec<u8> {
    fn from(envelope: Envelope) -> Self {
        envelope.0
    }
}

impl fmt::Debug for Envelope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Envelope").field("len", &self.0.len()).finish()
    }
}

/// Encrypts and decrypts envelopes under one key.
///
/// Each call is independent: buffers are call-local and the key is read-only,
/// so a single cipher can be shared across threads behind an `Arc`.
#[derive(Debug)]
pub struct EnvelopeCipher {
    key: KeyMaterial,
}

impl EnvelopeCipher {
    /// Take ownership of already-validated key material.
    pub fn new(key: KeyMaterial) -> Self {
        Self { key }
    }

    /// Validate `raw` under `config` and build a cipher from it.
    pub fn with_config(raw: &[u8], config: &CipherConfig) -> Result<Self, CipherError> {
        Ok(Self::new(KeyMaterial::new(raw, config)?))
    }

    /// Length of the held key in bytes.
    pub fn key_len(&self) -> usize {
        self.key.len()
    }

    /// Encrypt `plaintext` under a fresh random IV.
    ///
    /// Empty plaintext is accepted here and yields one padding block; the
    /// guarded entry points on [`Crypter`](crate::Crypter) reject it instead.
    pub fn encrypt(&self, plaintext: &[u8]) -> Result<Envelope, CipherError> {
        self.encrypt_with(plaintext, &crypto::system_random())
    }

    pub(crate) fn encrypt_with(
        &self,
        plaintext: &[u8],
        rng: &dyn RandomSource,
    ) -> Result<Envelope, CipherError> {
        let mut buffer = vec![0u8; IV_LEN + plaintext.len() + BLOCK_LEN];

        let iv = match crypto::generate_iv(rng) {
            Ok(iv) => iv,
            Err(err) => {
                tracing::debug!(plaintext_len = plaintext.len(), "iv generation failed");
                return Err(err);
            }
        };
        buffer[..IV_LEN].copy_from_slice(&iv);

        let written =
            match crypto::encrypt_into(self.key.as_bytes(), &iv, plaintext, &mut buffer[IV_LEN..]) {
                Ok(written) => written,
                Err(err) => {
                    tracing::debug!(plaintext_len = plaintext.len(), "envelope encryption failed");
                    return Err(err);
                }
            };
        buffer.truncate(IV_LEN + written);

        tracing::trace!(
            plaintext_len = plaintext.len(),
            envelope_len = buffer.len(),
            "sealed envelope"
        );
        Ok(Envelope(buffer))
    }

    /// Recover the plaintext from an envelope produced under the same key.
    ///
    /// Every failure, including input shorter than one IV block, is reported
    /// as [`CipherError::DecryptionFailed`].
    pub fn decrypt(&self, envelope: &[u8]) -> Result<Vec<u8>, CipherError> {
        let Some(body_len) = envelope.len().checked_sub(IV_LEN) else {
            return Err(CipherError::DecryptionFailed);
        };

        let (iv, ciphertext) = envelope.split_at(IV_LEN);
        let iv: &[u8; IV_LEN] = iv.try_into().map_err(|_| CipherError::DecryptionFailed)?;

        let mut buffer = vec![0u8; body_len];
        match crypto::decrypt_into(self.key.as_bytes(), iv, ciphertext, &mut buffer) {
            Ok(written) => {
                buffer.truncate(written);
                tracing::trace!(
                    envelope_len = envelope.len(),
                    plaintext_len = written,
                    "opened envelope"
                );
                Ok(buffer)
            }
            Err(err) => {
                // Scratch may hold partially decrypted blocks.
                buffer.zeroize();
                tracing::debug!(envelope_len = envelope.len(), "envelope decryption failed");
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: &[u8; 32] = b"FiugQTgPNwCWUY,VhfmM4cKXTLVFvHFe";

    fn cipher() -> EnvelopeCipher {
        EnvelopeCipher::new(KeyMaterial::fixed(KEY).unwrap())
    }

    #[test]
    fn test_please_encrypt_fits_one_block() {
        let cipher = cipher();
        let envelope = cipher.encrypt(b"please encrypt").unwrap();

        assert_eq!(envelope.len(), 32);
        assert_eq!(envelope.iv().len(), 16);
        assert_eq!(envelope.ciphertext().len(), 16);
        assert_eq!(cipher.decrypt(envelope.as_bytes()).unwrap(), b"please encrypt");
    }

    #[test]
    fn test_output_sizes_follow_pkcs7() {
        let cipher = cipher();
        for (len, expected) in [(0, 32), (1, 32), (15, 32), (16, 48), (17, 48), (32, 64)] {
            let envelope = cipher.encrypt(&vec![0x5A; len]).unwrap();
            assert_eq!(envelope.len(), expected, "plaintext length {}", len);
        }
    }

    #[test]
    fn test_short_envelopes_rejected_without_underflow() {
        let cipher = cipher();
        for len in [0, 1, 15, 16] {
            assert_eq!(
                cipher.decrypt(&vec![0u8; len]).unwrap_err(),
                CipherError::DecryptionFailed,
                "envelope length {}",
                len
            );
        }
    }

    #[test]
    fn test_from_bytes_checks_layout() {
        assert!(Envelope::from_bytes(vec![0u8; 15]).is_err());
        assert!(Envelope::from_bytes(vec![0u8; 16]).is_err());
        assert!(Envelope::from_bytes(vec![0u8; 33]).is_err());

        let envelope = Envelope::from_bytes(vec![0u8; 48]).unwrap();
        assert_eq!(envelope.ciphertext().len(), 32);
    }

    #[test]
    fn test_with_config_respects_policy() {
        let short = [9u8; 16];
        assert_eq!(
            EnvelopeCipher::with_config(&short, &CipherConfig::default()).unwrap_err(),
            CipherError::InvalidKey
        );
        let aes128 = EnvelopeCipher::with_config(&short, &CipherConfig::variable()).unwrap();
        let envelope = aes128.encrypt(b"sixteen byte key").unwrap();
        assert_eq!(aes128.decrypt(envelope.as_bytes()).unwrap(), b"sixteen byte key");
    }

    struct ExhaustedRandom;

    impl RandomSource for ExhaustedRandom {
        fn fill(&self, _dest: &mut [u8]) -> Result<(), crypto::Unspecified> {
            Err(crypto::Unspecified)
        }
    }

    #[test]
    fn test_rng_failure_produces_no_envelope() {
        let err = cipher()
            .encrypt_with(b"please encrypt", &ExhaustedRandom)
            .unwrap_err();
        assert_eq!(err, CipherError::IvGenerationFailed);
    }

    #[test]
    fn test_debug_shows_length_only() {
        let envelope = cipher().encrypt(b"secret").unwrap();
        assert_eq!(format!("{:?}", envelope), "Envelope { len: 32 }");
    }
}
