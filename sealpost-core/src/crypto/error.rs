// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Crypto Error Types

use thiserror::Error;

/// Errors raised by the crypto provider.
///
/// `Malformed` and `Authentication` are distinct: the first means
/// the input could never have been a ciphertext, the second means it was
/// rejected by the AEAD tag check. Neither carries plaintext.
#[derive(Error, Debug)]
pub enum CryptoError {
    #[error("invalid key length: {0} bytes (expected 16 or 32)")]
    InvalidKeyLength(usize),

    #[error("cipher construction failed")]
    CipherInit,

    #[error("system RNG failed")]
    Rng,

    #[error("malformed ciphertext: {0}")]
    Malformed(String),

    #[error("decryption failed: data may be corrupted or wrong key")]
    Authentication,

    #[error("signature has wrong length: expected {expected} bytes, got {actual}")]
    SignatureLength { expected: usize, actual: usize },

    #[error("signature verification failed")]
    SignatureInvalid,

    #[error("envelope is unsigned but a signature is required")]
    SignatureMissing,

    #[error("signing key rejected: {0}")]
    SigningKeyRejected(String),

    #[error("signing failed")]
    Signing,

    #[error("key file error: {0}")]
    KeyIo(#[from] std::io::Error),
}
