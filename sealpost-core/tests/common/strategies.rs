// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Proptest Strategies
//!
//! Reusable proptest strategies for property-based testing.

use proptest::prelude::*;

/// Arbitrary payload bytes, including empty.
pub fn payload_strategy() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 0..512)
}

/// A valid AES key: 16 or 32 random bytes.
pub fn key_bytes_strategy() -> impl Strategy<Value = Vec<u8>> {
    prop_oneof![
        prop::collection::vec(any::<u8>(), 16),
        prop::collection::vec(any::<u8>(), 32),
    ]
}

/// Key lengths the cipher must refuse.
pub fn invalid_key_len_strategy() -> impl Strategy<Value = usize> {
    (0usize..64).prop_filter("not an AES key length", |len| *len != 16 && *len != 32)
}

/// Client or destination identifiers.
pub fn client_id_strategy() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9-]{0,23}"
}
