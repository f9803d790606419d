// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Symmetric Encryption (AES-GCM)
//!
//! Authenticated encryption of envelope contents with a pre-shared key.
//!
//! Ciphertext format: `nonce (12 bytes) || ciphertext || tag (16 bytes)`
//!
//! The cipher is picked from the key length: 16-byte keys use AES-128-GCM,
//! 32-byte keys use AES-256-GCM. No associated data is bound.
//!
//! Nonces are drawn at random for every call rather than from a counter, so
//! nothing has to be persisted across restarts. The birthday bound on 96-bit
//! nonces means a single key must stay far below 2^32 messages.

use std::path::Path;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use ring::aead::{Aad, Algorithm, LessSafeKey, Nonce, UnboundKey, AES_128_GCM, AES_256_GCM};
use ring::rand::{SecureRandom, SystemRandom};
use zeroize::Zeroize;

use super::error::CryptoError;

/// Nonce size for AES-GCM (96 bits = 12 bytes).
pub const NONCE_SIZE: usize = 12;
/// Authentication tag size.
pub const TAG_SIZE: usize = 16;
/// Key length for AES-128-GCM.
pub const AES_128_KEY_LEN: usize = 16;
/// Key length for AES-256-GCM.
pub const AES_256_KEY_LEN: usize = 32;

/// Pre-shared symmetric key (AES-128 or AES-256).
#[derive(Clone)]
pub struct SymmetricKey {
    bytes: Vec<u8>,
}

impl std::fmt::Debug for SymmetricKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Don't expose key bytes in debug output
        f.debug_struct("SymmetricKey")
            .field("len", &self.bytes.len())
            .field("bytes", &"[REDACTED]")
            .finish()
    }
}

impl Drop for SymmetricKey {
    fn drop(&mut self) {
        self.bytes.zeroize();
    }
}

impl SymmetricKey {
    /// Generates a new random 256-bit key.
    pub fn generate() -> Result<Self, CryptoError> {
        let rng = SystemRandom::new();
        let key = ring::rand::generate::<[u8; AES_256_KEY_LEN]>(&rng)
            .map_err(|_| CryptoError::Rng)?
            .expose();
        Ok(SymmetricKey { bytes: key.to_vec() })
    }

    /// Creates a key from raw bytes, rejecting lengths other than 16 or 32.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, CryptoError> {
        match bytes.len() {
            AES_128_KEY_LEN | AES_256_KEY_LEN => Ok(SymmetricKey {
                bytes: bytes.to_vec(),
            }),
            other => Err(CryptoError::InvalidKeyLength(other)),
        }
    }

    /// Reads a raw key file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, CryptoError> {
        let mut data = std::fs::read(path)?;
        let key = Self::from_slice(&data);
        data.zeroize();
        key
    }

    /// Writes the key to `path` as raw bytes, replacing any existing file.
    ///
    /// On Unix the file is left read-only for the owner.
    pub fn write_to_file(&self, path: impl AsRef<Path>) -> Result<(), CryptoError> {
        super::keys::write_secret_file(path.as_ref(), &self.bytes)
    }

    /// Returns a reference to the key bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    fn algorithm(&self) -> &'static Algorithm {
        if self.bytes.len() == AES_128_KEY_LEN {
            &AES_128_GCM
        } else {
            &AES_256_GCM
        }
    }

    fn aead_key(&self) -> Result<LessSafeKey, CryptoError> {
        let unbound =
            UnboundKey::new(self.algorithm(), &self.bytes).map_err(|_| CryptoError::CipherInit)?;
        Ok(LessSafeKey::new(unbound))
    }
}

/// Encrypts `plaintext` under a fresh random nonce.
///
/// Output format: `nonce (12 bytes) || ciphertext || tag (16 bytes)`
pub fn encrypt(key: &SymmetricKey, plaintext: &[u8]) -> Result<Vec<u8>, CryptoError> {
    let rng = SystemRandom::new();

    let mut nonce_bytes = [0u8; NONCE_SIZE];
    rng.fill(&mut nonce_bytes).map_err(|_| CryptoError::Rng)?;

    let sealing_key = key.aead_key()?;

    let mut in_out = plaintext.to_vec();
    let nonce = Nonce::assume_unique_for_key(nonce_bytes);
    sealing_key
        .seal_in_place_append_tag(nonce, Aad::empty(), &mut in_out)
        .map_err(|_| CryptoError::CipherInit)?;

    let mut output = Vec::with_capacity(NONCE_SIZE + in_out.len());
    output.extend_from_slice(&nonce_bytes);
    output.extend_from_slice(&in_out);

    Ok(output)
}

/// Decrypts `nonce || ciphertext || tag` produced by [`encrypt`].
pub fn decrypt(key: &SymmetricKey, data: &[u8]) -> Result<Vec<u8>, CryptoError> {
    let min_size = NONCE_SIZE + TAG_SIZE;
    if data.len() < min_size {
        return Err(CryptoError::Malformed(format!(
            "ciphertext too short: {} bytes (minimum {})",
            data.len(),
            min_size
        )));
    }

    let nonce_bytes: [u8; NONCE_SIZE] = data[..NONCE_SIZE]
        .try_into()
        .map_err(|_| CryptoError::Malformed("invalid nonce".into()))?;
    let nonce = Nonce::assume_unique_for_key(nonce_bytes);

    let opening_key = key.aead_key()?;

    let mut buffer = data[NONCE_SIZE..].to_vec();
    let plaintext = opening_key
        .open_in_place(nonce, Aad::empty(), &mut buffer)
        .map_err(|_| CryptoError::Authentication)?;

    Ok(plaintext.to_vec())
}

/// Encrypts and base64-encodes, for transports that need printable payloads.
pub fn encrypt_to_text(key: &SymmetricKey, plaintext: &[u8]) -> Result<String, CryptoError> {
    Ok(STANDARD.encode(encrypt(key, plaintext)?))
}

/// Base64-decodes and decrypts text produced by [`encrypt_to_text`].
pub fn decrypt_from_text(key: &SymmetricKey, text: &str) -> Result<Vec<u8>, CryptoError> {
    let data = STANDARD
        .decode(text)
        .map_err(|e| CryptoError::Malformed(format!("invalid base64: {}", e)))?;
    decrypt(key, &data)
}
