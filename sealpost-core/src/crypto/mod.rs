// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

pub mod encryption;
pub mod error;
pub mod keys;
pub mod provider;
pub mod signing;

pub use encryption::{decrypt, decrypt_from_text, encrypt, encrypt_to_text, SymmetricKey};
pub use error::CryptoError;
pub use keys::{KeySource, PublicKeySource, SigningKeySource};
pub use provider::CryptoProvider;
pub use signing::{check_signature, sign_to_text, verify, PublicKey, Signature, SigningKeyPair};
