// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Envelope Wire Type
//!
//! The unit of transfer between a client and the relay.

use serde::{Deserialize, Serialize};

/// Encrypted, optionally signed container for one application message.
///
/// `contents` always holds base64 of `nonce || AEAD output`; an envelope is
/// never built around plaintext. `signature`, when present, covers the UTF-8
/// bytes of `contents` exactly as they appear on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope {
    /// Opaque identifier of the intended recipient.
    pub destination: String,
    /// Identifier of the sender.
    #[serde(default)]
    pub origin: Option<String>,
    /// Relative validity in seconds. Advisory; the relay enforces it.
    #[serde(default)]
    pub ttl: Option<u64>,
    /// Base64 ciphertext of the serialized payload.
    pub contents: String,
    /// Base64 ECDSA signature over `contents`.
    #[serde(default)]
    pub signature: Option<String>,
}

impl Envelope {
    pub fn is_signed(&self) -> bool {
        self.signature.is_some()
    }
}
