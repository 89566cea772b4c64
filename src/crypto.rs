//! Low-level cryptographic operations.
//!
//! This module is the only place in the crate that imports `ring`, `aes` or
//! `cbc` directly. `keys` and `envelope` reach the primitives exclusively
//! through the functions exposed here.
//!
//! Primitive choices:
//! - **Cipher**: AES in CBC mode with PKCS7 padding (unauthenticated)
//! - **IV**: 128 bits (one block), generated fresh per encryption via `SystemRandom`
//! - **Key size**: 256 bits under the fixed policy; 128/192/256 under the variable one

use aes::{Aes128, Aes192, Aes256};
use cbc::cipher::block_padding::Pkcs7;
use cbc::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit};
pub(crate) use ring::error::Unspecified;
use ring::rand::{SecureRandom, SystemRandom};

use crate::error::CipherError;

/// AES block size in bytes.
pub const BLOCK_LEN: usize = 16;

/// Size of the IV in bytes. CBC needs exactly one block.
pub const IV_LEN: usize = BLOCK_LEN;

/// Size of a fixed-policy (AES-256) key in bytes.
pub const KEY_LEN: usize = 32;

/// Source of the random bytes behind IVs.
///
/// `ring` seals `SecureRandom`, so this is the seam encryption goes through.
/// Production code only ever uses `SystemRandom`.
pub(crate) trait RandomSource {
    fn fill(&self, dest: &mut [u8]) -> Result<(), Unspecified>;
}

impl RandomSource for SystemRandom {
    fn fill(&self, dest: &mut [u8]) -> Result<(), Unspecified> {
        SecureRandom::fill(self, dest)
    }
}

/// The OS secure random source.
pub(crate) fn system_random() -> impl RandomSource {
    SystemRandom::new()
}

/// Generate a random IV from `rng`.
///
/// A fresh IV is drawn for every encryption call. There is no caching and no
/// counter-based generation. A failing source surfaces as
/// [`CipherError::IvGenerationFailed`].
pub(crate) fn generate_iv(rng: &dyn RandomSource) -> Result<[u8; IV_LEN], CipherError> {
    let mut iv = [0u8; IV_LEN];
    rng.fill(&mut iv).map_err(|_| CipherError::IvGenerationFailed)?;
    Ok(iv)
}

/// Generate a cryptographically secure random AES-256 key.
pub(crate) fn generate_random_key() -> Result<[u8; KEY_LEN], CipherError> {
    let rng = system_random();
    let mut key = [0u8; KEY_LEN];
    rng.fill(&mut key).map_err(|_| CipherError::KeyGenerationFailed)?;
    Ok(key)
}

/// Encrypt `plaintext` into `out`, returning the number of bytes written.
///
/// `out` must hold at least `plaintext.len() + BLOCK_LEN` bytes; PKCS7 always
/// appends between 1 and 16 bytes. The AES variant follows the key length.
pub(crate) fn encrypt_into(
    key: &[u8],
    iv: &[u8; IV_LEN],
    plaintext: &[u8],
    out: &mut [u8],
) -> Result<usize, CipherError> {
    match key.len() {
        16 => encrypt_blocks::<cbc::Encryptor<Aes128>>(key, iv, plaintext, out),
        24 => encrypt_blocks::<cbc::Encryptor<Aes192>>(key, iv, plaintext, out),
        32 => encrypt_blocks::<cbc::Encryptor<Aes256>>(key, iv, plaintext, out),
        _ => Err(CipherError::EncryptionFailed),
    }
}

/// Decrypt `ciphertext` into `out` and strip PKCS7 padding, returning the
/// number of plaintext bytes.
///
/// `out` must hold at least `ciphertext.len()` bytes. Empty or non
/// block-aligned ciphertext, an unsupported key length and inconsistent
/// padding all fail the same way.
pub(crate) fn decrypt_into(
    key: &[u8],
    iv: &[u8; IV_LEN],
    ciphertext: &[u8],
    out: &mut [u8],
) -> Result<usize, CipherError> {
    if ciphertext.is_empty() || ciphertext.len() % BLOCK_LEN != 0 {
        return Err(CipherError::DecryptionFailed);
    }

    match key.len() {
        16 => decrypt_blocks::<cbc::Decryptor<Aes128>>(key, iv, ciphertext, out),
        24 => decrypt_blocks::<cbc::Decryptor<Aes192>>(key, iv, ciphertext, out),
        32 => decrypt_blocks::<cbc::Decryptor<Aes256>>(key, iv, ciphertext, out),
        _ => Err(CipherError::DecryptionFailed),
    }
}

fn encrypt_blocks<E>(
    key: &[u8],
    iv: &[u8; IV_LEN],
    plaintext: &[u8],
    out: &mut [u8],
) -> Result<usize, CipherError>
where
    E: KeyIvInit + BlockEncryptMut,
{
    let encryptor = E::new_from_slices(key, iv).map_err(|_| CipherError::EncryptionFailed)?;
    let ciphertext = encryptor
        .encrypt_padded_b2b_mut::<Pkcs7>(plaintext, out)
        .map_err(|_| CipherError::EncryptionFailed)?;
    Ok(ciphertext.len())
}

fn decrypt_blocks<D>(
    key: &[u8],
    iv: &[u8; IV_LEN],
    ciphertext: &[u8],
    out: &mut [u8],
) -> Result<usize, CipherError>
where
    D: KeyIvInit + BlockDecryptMut,
{
    let decryptor = D::new_from_slices(key, iv).map_err(|_| CipherError::DecryptionFailed)?;
    let plaintext = decryptor
        .decrypt_padded_b2b_mut::<Pkcs7>(ciphertext, out)
        .map_err(|_| CipherError::DecryptionFailed)?;
    Ok(plaintext.len())
}
