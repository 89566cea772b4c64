use cbc_envelope::{CipherConfig, CipherError, Crypter, EnvelopeCipher, KeyMaterial};

const KEY: &str = "FiugQTgPNwCWUY,VhfmM4cKXTLVFvHFe";

#[test]
fn test_empty_key_rejected() {
    assert_eq!(KeyMaterial::from_passphrase("").unwrap_err(), CipherError::InvalidKey);
    assert_eq!(
        EnvelopeCipher::with_config(b"", &CipherConfig::variable()).unwrap_err(),
        CipherError::InvalidKey
    );
}

#[test]
fn test_fixed_policy_rejects_wrong_length_before_any_cipher_call() {
    assert_eq!(KeyMaterial::fixed(&[0u8; 10]).unwrap_err(), CipherError::InvalidKey);
    assert_eq!(
        EnvelopeCipher::with_config(b"InvalidKey", &CipherConfig::default()).unwrap_err(),
        CipherError::InvalidKey
    );
}

#[test]
fn test_passphrase_key_of_aes256_length() {
    let cipher = EnvelopeCipher::new(KeyMaterial::from_passphrase(KEY).unwrap());
    assert_eq!(cipher.key_len(), 32);

    let envelope = cipher.seal(b"please encrypt").unwrap();
    assert_eq!(envelope.len(), 32);
    assert_eq!(cipher.open(envelope.as_bytes()).unwrap(), b"please encrypt");
}

#[test]
fn test_variable_key_of_unsupported_length_fails_per_call() {
    // Accepted at construction, refused by the engine.
    let cipher = EnvelopeCipher::new(KeyMaterial::from_passphrase("InvalidKey").unwrap());

    assert_eq!(cipher.seal(b"data").unwrap_err(), CipherError::EncryptionFailed);
    assert_eq!(cipher.open(&[0u8; 32]).unwrap_err(), CipherError::DecryptionFailed);
}

#[test]
fn test_config_from_json() {
    let config: CipherConfig = serde_json::from_str(r#"{"fixed_key_length": true}"#).unwrap();
    assert!(KeyMaterial::new(&[1u8; 16], &config).is_err());

    let config: CipherConfig = serde_json::from_str(r#"{"fixed_key_length": false}"#).unwrap();
    assert!(KeyMaterial::new(&[1u8; 16], &config).is_ok());
}
