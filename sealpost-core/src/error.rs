// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Error Types
//!
//! Unified error type for relay client operations.

use thiserror::Error;

use crate::crypto::CryptoError;
use crate::envelope::EncodingError;
use crate::network::TransportError;

/// Result type for relay client operations.
pub type RelayResult<T> = Result<T, RelayError>;

/// Unified error type for relay client operations.
#[derive(Error, Debug)]
pub enum RelayError {
    /// Encryption, decryption or signature failure.
    #[error("crypto error: {0}")]
    Crypto(#[from] CryptoError),

    /// Serialization or envelope structure failure.
    #[error("encoding error: {0}")]
    Encoding(#[from] EncodingError),

    /// Dial, read, write or HTTP failure.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Configuration(String),
}
