// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Envelope Signatures (ECDSA P-256 / SHA-256)
//!
//! The message is hashed with SHA-256 and the digest signed with ECDSA over
//! P-256. Signatures use the fixed-width encoding `r (32 bytes) || s (32 bytes)`
//! and travel base64-encoded.

use std::path::Path;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use ring::digest::{digest, SHA256};
use ring::rand::SystemRandom;
use ring::signature::{
    EcdsaKeyPair, KeyPair, UnparsedPublicKey, ECDSA_P256_SHA256_FIXED,
    ECDSA_P256_SHA256_FIXED_SIGNING,
};
use zeroize::Zeroize;

use super::error::CryptoError;

/// Width of one P-256 scalar.
pub const SCALAR_SIZE: usize = 32;
/// Width of an encoded signature (`r || s`).
pub const SIGNATURE_SIZE: usize = 2 * SCALAR_SIZE;
/// Width of an uncompressed SEC1 P-256 point.
pub const PUBLIC_KEY_SIZE: usize = 65;

/// Fixed-width ECDSA signature.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Signature([u8; SIGNATURE_SIZE]);

impl std::fmt::Debug for Signature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Signature({})", hex::encode(&self.0[..8]))
    }
}

impl Signature {
    /// Decodes a base64 signature, checking its width.
    pub fn from_base64(encoded: &str) -> Result<Self, CryptoError> {
        let bytes = STANDARD
            .decode(encoded)
            .map_err(|e| CryptoError::Malformed(format!("invalid base64 signature: {}", e)))?;
        Self::from_slice(&bytes)
    }

    /// Builds a signature from raw bytes, checking its width.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, CryptoError> {
        if bytes.len() != SIGNATURE_SIZE {
            return Err(CryptoError::SignatureLength {
                expected: SIGNATURE_SIZE,
                actual: bytes.len(),
            });
        }
        let mut array = [0u8; SIGNATURE_SIZE];
        array.copy_from_slice(bytes);
        Ok(Signature(array))
    }

    pub fn as_bytes(&self) -> &[u8; SIGNATURE_SIZE] {
        &self.0
    }

    pub fn to_base64(&self) -> String {
        STANDARD.encode(self.0)
    }
}

/// P-256 public key (uncompressed SEC1 point).
#[derive(Clone, PartialEq, Eq)]
pub struct PublicKey {
    bytes: Vec<u8>,
}

impl std::fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PublicKey")
            .field("fingerprint", &self.fingerprint())
            .finish()
    }
}

impl PublicKey {
    /// Wraps an uncompressed SEC1 point. The point itself is validated on
    /// first use by `ring`.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CryptoError> {
        if bytes.len() != PUBLIC_KEY_SIZE || bytes[0] != 0x04 {
            return Err(CryptoError::SigningKeyRejected(format!(
                "expected {} byte uncompressed point, got {} bytes",
                PUBLIC_KEY_SIZE,
                bytes.len()
            )));
        }
        Ok(PublicKey {
            bytes: bytes.to_vec(),
        })
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Hex SHA-256 of the encoded point.
    pub fn fingerprint(&self) -> String {
        hex::encode(digest(&SHA256, &self.bytes))
    }

    /// Checks `signature` over `message`, distinguishing width errors from
    /// verification failures.
    pub fn check(&self, message: &[u8], signature: &Signature) -> Result<(), CryptoError> {
        UnparsedPublicKey::new(&ECDSA_P256_SHA256_FIXED, &self.bytes)
            .verify(message, signature.as_bytes())
            .map_err(|_| CryptoError::SignatureInvalid)
    }
}

/// ECDSA P-256 signing key pair, kept in PKCS#8 form for persistence.
pub struct SigningKeyPair {
    key_pair: EcdsaKeyPair,
    pkcs8: Vec<u8>,
    rng: SystemRandom,
}

impl std::fmt::Debug for SigningKeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SigningKeyPair")
            .field("public_key", &self.public_key())
            .field("pkcs8", &"[REDACTED]")
            .finish()
    }
}

impl Drop for SigningKeyPair {
    fn drop(&mut self) {
        self.pkcs8.zeroize();
    }
}

impl SigningKeyPair {
    /// Generates a fresh key pair.
    pub fn generate() -> Result<Self, CryptoError> {
        let rng = SystemRandom::new();
        let document = EcdsaKeyPair::generate_pkcs8(&ECDSA_P256_SHA256_FIXED_SIGNING, &rng)
            .map_err(|_| CryptoError::Rng)?;
        Self::from_pkcs8(document.as_ref())
    }

    /// Parses a PKCS#8 v1/v2 document.
    pub fn from_pkcs8(pkcs8: &[u8]) -> Result<Self, CryptoError> {
        let rng = SystemRandom::new();
        let key_pair = EcdsaKeyPair::from_pkcs8(&ECDSA_P256_SHA256_FIXED_SIGNING, pkcs8, &rng)
            .map_err(|e| CryptoError::SigningKeyRejected(e.to_string()))?;
        Ok(SigningKeyPair {
            key_pair,
            pkcs8: pkcs8.to_vec(),
            rng,
        })
    }

    /// Reads a PKCS#8 key file.
    pub fn from_pkcs8_file(path: impl AsRef<Path>) -> Result<Self, CryptoError> {
        let mut data = std::fs::read(path)?;
        let key_pair = Self::from_pkcs8(&data);
        data.zeroize();
        key_pair
    }

    /// Writes the PKCS#8 document to `path`, replacing any existing file.
    pub fn write_pkcs8_file(&self, path: impl AsRef<Path>) -> Result<(), CryptoError> {
        super::keys::write_secret_file(path.as_ref(), &self.pkcs8)
    }

    pub fn public_key(&self) -> PublicKey {
        PublicKey {
            bytes: self.key_pair.public_key().as_ref().to_vec(),
        }
    }

    /// Signs `message` (SHA-256, then ECDSA).
    pub fn sign(&self, message: &[u8]) -> Result<Signature, CryptoError> {
        let signature = self
            .key_pair
            .sign(&self.rng, message)
            .map_err(|_| CryptoError::Signing)?;
        Signature::from_slice(signature.as_ref())
    }
}

/// Signs `message` and returns the base64 signature.
pub fn sign_to_text(key_pair: &SigningKeyPair, message: &[u8]) -> Result<String, CryptoError> {
    Ok(key_pair.sign(message)?.to_base64())
}

/// Checks a base64 signature, reporting why it was rejected.
///
/// A decoded signature that is not exactly two scalars wide fails with
/// [`CryptoError::SignatureLength`] before any curve arithmetic happens.
pub fn check_signature(
    public_key: &PublicKey,
    message: &[u8],
    signature: &str,
) -> Result<(), CryptoError> {
    let signature = Signature::from_base64(signature)?;
    public_key.check(message, &signature)
}

/// Returns true if `signature` is a valid base64 signature of `message`.
pub fn verify(public_key: &PublicKey, message: &[u8], signature: &str) -> bool {
    check_signature(public_key, message, signature).is_ok()
}
