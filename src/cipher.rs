//! Credential Cipher
//!
//! Authenticated encryption for broker investor passwords at rest.
//! AES-256-GCM with a fresh 96-bit nonce per call. The stored blob is
//! `base64(nonce || ciphertext || tag)`.
//!
//! Key material never leaves this module: the cipher state is zeroized on drop
//! and `Debug` is redacted.

use aes_gcm::aead::{Aead, AeadCore, KeyInit};
use aes_gcm::{Aes256Gcm, Nonce};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use rand::rngs::OsRng;
use zeroize::Zeroizing;

/// Required key length in bytes (AES-256)
pub const KEY_LEN: usize = 32;

/// Nonce length in bytes (GCM standard nonce)
pub const NONCE_LEN: usize = 12;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CipherError {
    #[error("cipher key must be exactly {KEY_LEN} bytes")]
    InvalidKey,

    #[error("malformed ciphertext")]
    MalformedCiphertext,

    #[error("ciphertext authentication failed")]
    AuthenticationFailed,

    #[error("encryption failed")]
    EncryptionFailed,
}

/// AES-256-GCM cipher bound to one key
#[derive(Clone)]
pub struct CredentialCipher {
    aead: Aes256Gcm,
}

impl std::fmt::Debug for CredentialCipher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialCipher").finish_non_exhaustive()
    }
}

impl CredentialCipher {
    pub fn new(key: &[u8]) -> Result<Self, CipherError> {
        if key.len() != KEY_LEN {
            return Err(CipherError::InvalidKey);
        }
        let aead = Aes256Gcm::new_from_slice(key).map_err(|_| CipherError::InvalidKey)?;
        Ok(Self { aead })
    }

    pub fn encrypt(&self, plaintext: &str) -> Result<String, CipherError> {
        let nonce = Aes256Gcm::generate_nonce(&mut OsRng);
        let sealed = self
            .aead
            .encrypt(&nonce, plaintext.as_bytes())
            .map_err(|_| CipherError::EncryptionFailed)?;

        let mut blob = Vec::with_capacity(NONCE_LEN + sealed.len());
        blob.extend_from_slice(&nonce);
        blob.extend_from_slice(&sealed);
        Ok(STANDARD.encode(blob))
    }

    pub fn decrypt(&self, blob: &str) -> Result<Zeroizing<String>, CipherError> {
        let raw = STANDARD
            .decode(blob.trim())
            .map_err(|_| CipherError::MalformedCiphertext)?;
        if raw.len() < NONCE_LEN {
            return Err(CipherError::MalformedCiphertext);
        }

        let (nonce, sealed) = raw.split_at(NONCE_LEN);
        let plain = Zeroizing::new(
            self.aead
                .decrypt(Nonce::from_slice(nonce), sealed)
                .map_err(|_| CipherError::AuthenticationFailed)?,
        );

        // Authenticated bytes were produced from a &str, so this only fails on a foreign blob.
        let text = std::str::from_utf8(&plain).map_err(|_| CipherError::MalformedCiphertext)?;
        Ok(Zeroizing::new(text.to_owned()))
    }
}

/// One-shot encryption with a raw key
pub fn encrypt(key: &[u8], plaintext: &str) -> Result<String, CipherError> {
    CredentialCipher::new(key)?.encrypt(plaintext)
}

/// One-shot decryption with a raw key
pub fn decrypt(key: &[u8], blob: &str) -> Result<Zeroizing<String>, CipherError> {
    CredentialCipher::new(key)?.decrypt(blob)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(byte: u8) -> [u8; KEY_LEN] {
        [byte; KEY_LEN]
    }

    #[test]
    fn test_round_trip_preserves_plaintext() {
        let k = key(7);
        for plaintext in ["investor-pass", "", "lozinka ćčžšđ 密码 🔐", " spaced "] {
            let blob = encrypt(&k, plaintext).unwrap();
            assert_eq!(*decrypt(&k, &blob).unwrap(), plaintext);
        }
    }

    #[test]
    fn test_fresh_nonce_per_call() {
        let cipher = CredentialCipher::new(&key(1)).unwrap();
        let a = cipher.encrypt("same").unwrap();
        let b = cipher.encrypt("same").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_rejects_wrong_key_length() {
        assert_eq!(CredentialCipher::new(&[0u8; 16]).unwrap_err(), CipherError::InvalidKey);
        assert_eq!(CredentialCipher::new(&[0u8; 33]).unwrap_err(), CipherError::InvalidKey);
        assert_eq!(encrypt(&[], "x").unwrap_err(), CipherError::InvalidKey);
        assert_eq!(decrypt(&[1u8; 31], "AAAA").unwrap_err(), CipherError::InvalidKey);
    }

    #[test]
    fn test_wrong_key_fails_authentication() {
        let blob = encrypt(&key(1), "secret").unwrap();
        assert_eq!(
            decrypt(&key(2), &blob).unwrap_err(),
            CipherError::AuthenticationFailed
        );
    }

    #[test]
    fn test_tampered_blob_fails_authentication() {
        let k = key(3);
        let blob = encrypt(&k, "secret").unwrap();
        let mut raw = STANDARD.decode(&blob).unwrap();
        let last = raw.len() - 1;
        raw[last] ^= 0x01;
        let tampered = STANDARD.encode(raw);
        assert_eq!(
            decrypt(&k, &tampered).unwrap_err(),
            CipherError::AuthenticationFailed
        );
    }

    #[test]
    fn test_short_or_undecodable_blob_is_malformed() {
        let k = key(4);
        let short = STANDARD.encode([0u8; NONCE_LEN - 1]);
        assert_eq!(decrypt(&k, &short).unwrap_err(), CipherError::MalformedCiphertext);
        assert_eq!(decrypt(&k, "not base64!!").unwrap_err(), CipherError::MalformedCiphertext);
    }

    #[test]
    fn test_debug_is_redacted() {
        let cipher = CredentialCipher::new(&key(9)).unwrap();
        let shown = format!("{:?}", cipher);
        assert!(!shown.contains("09"));
        assert!(shown.starts_with("CredentialCipher"));
    }
}
