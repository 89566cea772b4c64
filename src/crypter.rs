//! Caller-facing encrypt/decrypt surface.
//!
//! Two conventions over the same engine:
//! - direct results: [`Crypter::seal`] / [`Crypter::open`]
//! - dual callbacks: [`Crypter::seal_with`] / [`Crypter::open_with`], where
//!   exactly one of `on_success` / `on_failure` runs synchronously on the
//!   caller's stack before the method returns.
//!
//! Both reject empty input at the boundary without touching the engine.
//! `encrypt` / `decrypt` remain the unguarded primitives.

use crate::envelope::{Envelope, EnvelopeCipher};
use crate::error::CipherError;

/// Envelope encryption under one key, with guarded and callback entry points
/// built on the two required primitives.
pub trait Crypter {
    /// Low-level encryption. Empty plaintext yields a single padding block.
    fn encrypt(&self, plaintext: &[u8]) -> Result<Envelope, CipherError>;

    /// Low-level decryption.
    fn decrypt(&self, envelope: &[u8]) -> Result<Vec<u8>, CipherError>;

    /// Encrypt non-empty plaintext.
    fn seal(&self, plaintext: &[u8]) -> Result<Envelope, CipherError> {
        if plaintext.is_empty() {
            return Err(CipherError::EncryptionFailed);
        }
        self.encrypt(plaintext)
    }

    /// Decrypt a non-empty envelope.
    fn open(&self, envelope: &[u8]) -> Result<Vec<u8>, CipherError> {
        if envelope.is_empty() {
            return Err(CipherError::DecryptionFailed);
        }
        self.decrypt(envelope)
    }

    /// Callback form of [`Crypter::seal`].
    fn seal_with<S, F>(&self, plaintext: &[u8], on_success: S, on_failure: F)
    where
        S: FnOnce(Envelope),
        F: FnOnce(CipherError),
    {
        match self.seal(plaintext) {
            Ok(envelope) => on_success(envelope),
            Err(err) => on_failure(err),
        }
    }

    /// Callback form of [`Crypter::open`].
    fn open_with<S, F>(&self, envelope: &[u8], on_success: S, on_failure: F)
    where
        S: FnOnce(Vec<u8>),
        F: FnOnce(CipherError),
    {
        match self.open(envelope) {
            Ok(plaintext) => on_success(plaintext),
            Err(err) => on_failure(err),
        }
    }
}

impl Crypter for EnvelopeCipher {
    fn encrypt(&self, plaintext: &[u8]) -> Result<Envelope, CipherError> {
        EnvelopeCipher::encrypt(self, plaintext)
    }

    fn decrypt(&self, envelope: &[u8]) -> Result<Vec<u8>, CipherError> {
        EnvelopeCipher::decrypt(self, envelope)
    }
}
