// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Tests for envelope building, wire encoding and opening.

mod common;

use std::sync::Arc;

use common::strategies::{client_id_strategy, payload_strategy};
use common::{plain_provider, shared_key, signed_pair};
use proptest::prelude::*;
use sealpost_core::crypto::{CryptoError, CryptoProvider, SymmetricKey};
use sealpost_core::envelope::{
    BincodeFormat, EncodingError, Envelope, EnvelopeCodec, JsonFormat, WireFormat,
};
use sealpost_core::error::RelayError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Command {
    action: String,
    level: u8,
}

fn command() -> Command {
    Command {
        action: "open".into(),
        level: 3,
    }
}

// =============================================================================
// Building
// =============================================================================

#[test]
fn test_seal_never_carries_plaintext() {
    let codec = EnvelopeCodec::new(plain_provider(), JsonFormat).with_origin("pi-0");
    let envelope = codec.seal("garage", &command(), Some(60)).unwrap();

    assert_eq!(envelope.destination, "garage");
    assert_eq!(envelope.origin.as_deref(), Some("pi-0"));
    assert_eq!(envelope.ttl, Some(60));
    assert!(!envelope.contents.contains("open"));
    assert!(!envelope.is_signed());
}

#[test]
fn test_seal_signs_when_key_configured() {
    let (sender, _) = signed_pair();
    let codec = EnvelopeCodec::new(sender.clone(), JsonFormat);
    let envelope = codec.seal("garage", &command(), None).unwrap();

    let signature = envelope.signature.as_deref().unwrap();
    let public_key = sender.signing_public_key().unwrap();
    assert!(sealpost_core::crypto::verify(
        &public_key,
        envelope.contents.as_bytes(),
        signature
    ));
}

#[test]
fn test_json_field_names_on_the_wire() {
    let codec = EnvelopeCodec::new(plain_provider(), JsonFormat).with_origin("pi-0");
    let envelope = codec.seal("garage", "hi", None).unwrap();
    let value: serde_json::Value = serde_json::from_slice(&codec.encode(&envelope).unwrap()).unwrap();

    assert_eq!(value["destination"], "garage");
    assert_eq!(value["origin"], "pi-0");
    assert!(value["contents"].is_string());
    assert!(value["signature"].is_null());
}

// =============================================================================
// Parsing and Opening
// =============================================================================

#[test]
fn test_json_roundtrip_through_wire() {
    let codec = EnvelopeCodec::new(plain_provider(), JsonFormat);
    let envelope = codec.seal("garage", &command(), None).unwrap();
    let wire = codec.encode(&envelope).unwrap();

    let parsed = codec.parse(&wire).unwrap();
    assert_eq!(parsed, envelope);

    let plaintext = codec.open(&parsed).unwrap();
    let decoded: Command = JsonFormat.from_bytes(&plaintext).unwrap();
    assert_eq!(decoded, command());
}

#[test]
fn test_bincode_roundtrip_through_wire() {
    let codec = EnvelopeCodec::new(plain_provider(), BincodeFormat).with_origin("pi-0");
    let envelope = codec.seal("garage", &command(), Some(5)).unwrap();
    let wire = codec.encode(&envelope).unwrap();

    let parsed = codec.parse(&wire).unwrap();
    assert_eq!(parsed, envelope);
    let decoded: Command = BincodeFormat.from_bytes(&codec.open(&parsed).unwrap()).unwrap();
    assert_eq!(decoded, command());
}

/// Peers that omit the optional fields still parse.
#[test]
fn test_parse_minimal_json_envelope() {
    let codec = EnvelopeCodec::new(plain_provider(), JsonFormat);
    let contents = codec.crypto().encrypt_to_text(b"\"hi\"").unwrap();
    let raw = format!(r#"{{"destination":"pi-0","contents":"{}"}}"#, contents);

    let envelope = codec.parse(raw.as_bytes()).unwrap();
    assert_eq!(envelope.origin, None);
    assert_eq!(envelope.ttl, None);
    assert_eq!(codec.open(&envelope).unwrap(), b"\"hi\"");
}

#[test]
fn test_parse_garbage_is_malformed() {
    let codec = EnvelopeCodec::new(plain_provider(), JsonFormat);
    assert!(matches!(
        codec.parse(b"{not json"),
        Err(EncodingError::MalformedEnvelope(_))
    ));
    assert!(matches!(
        codec.parse(br#"{"origin":"x"}"#),
        Err(EncodingError::MalformedEnvelope(_))
    ));
}

#[test]
fn test_parse_batch() {
    let codec = EnvelopeCodec::new(plain_provider(), JsonFormat);
    let batch = vec![
        codec.seal("pi-0", "one", None).unwrap(),
        codec.seal("pi-0", "two", None).unwrap(),
    ];
    let raw = JsonFormat.to_bytes(&batch).unwrap();

    let parsed: Vec<Envelope> = codec
        .parse_batch(&raw)
        .unwrap()
        .into_iter()
        .map(Result::unwrap)
        .collect();
    assert_eq!(parsed, batch);
    assert!(codec.parse_batch(b"[]").unwrap().is_empty());
}

/// A structurally broken entry fails alone; its neighbours still parse.
#[test]
fn test_parse_batch_isolates_malformed_entry() {
    let codec = EnvelopeCodec::new(plain_provider(), JsonFormat);
    let one = codec.seal("pi-0", "one", None).unwrap();
    let three = codec.seal("pi-0", "three", None).unwrap();
    let raw = format!(
        "[{},{{\"destination\":\"pi-0\"}},{}]",
        String::from_utf8(codec.encode(&one).unwrap()).unwrap(),
        String::from_utf8(codec.encode(&three).unwrap()).unwrap(),
    );

    let entries = codec.parse_batch(raw.as_bytes()).unwrap();

    assert_eq!(entries.len(), 3);
    assert_eq!(entries[0].as_ref().unwrap(), &one);
    assert!(matches!(
        entries[1],
        Err(EncodingError::MalformedEnvelope(_))
    ));
    assert_eq!(entries[2].as_ref().unwrap(), &three);
}

#[test]
fn test_parse_batch_rejects_non_list() {
    let codec = EnvelopeCodec::new(plain_provider(), JsonFormat);
    assert!(matches!(
        codec.parse_batch(br#"{"destination":"pi-0"}"#),
        Err(EncodingError::MalformedEnvelope(_))
    ));
}

/// Bincode mailboxes carry one byte string per envelope, so a corrupt
/// entry is isolated there too.
#[test]
fn test_bincode_batch_isolates_corrupt_entry() {
    let codec = EnvelopeCodec::new(plain_provider(), BincodeFormat);
    let one = codec.seal("pi-0", "one", None).unwrap();
    let three = codec.seal("pi-0", "three", None).unwrap();
    let raw = BincodeFormat
        .join_list(&[
            codec.encode(&one).unwrap(),
            vec![0xFF, 0x01],
            codec.encode(&three).unwrap(),
        ])
        .unwrap();

    let entries = codec.parse_batch(&raw).unwrap();

    assert_eq!(entries[0].as_ref().unwrap(), &one);
    assert!(entries[1].is_err());
    assert_eq!(entries[2].as_ref().unwrap(), &three);
}

#[test]
fn test_encode_batch_roundtrip() {
    let codec = EnvelopeCodec::new(plain_provider(), BincodeFormat);
    let batch = vec![
        codec.seal("pi-0", "one", None).unwrap(),
        codec.seal("pi-0", "two", None).unwrap(),
    ];

    let raw = codec.encode_batch(&batch).unwrap();
    let parsed: Vec<Envelope> = codec
        .parse_batch(&raw)
        .unwrap()
        .into_iter()
        .map(Result::unwrap)
        .collect();

    assert_eq!(parsed, batch);
}

#[test]
fn test_open_with_wrong_key_fails() {
    let sender = EnvelopeCodec::new(plain_provider(), JsonFormat);
    let other = CryptoProvider::new(SymmetricKey::generate().unwrap());
    let receiver = EnvelopeCodec::new(Arc::new(other), JsonFormat);

    let envelope = sender.seal("pi-0", "hi", None).unwrap();
    assert!(matches!(
        receiver.open(&envelope),
        Err(RelayError::Crypto(CryptoError::Authentication))
    ));
}

#[test]
fn test_open_signed_from_trusted_peer() {
    let (sender, receiver) = signed_pair();
    let envelope = EnvelopeCodec::new(sender, JsonFormat)
        .seal("pi-0", "hi", None)
        .unwrap();

    let opened = EnvelopeCodec::new(receiver, JsonFormat).open(&envelope).unwrap();
    assert_eq!(opened, b"\"hi\"");
}

#[test]
fn test_open_unsigned_when_peer_required() {
    let (_, receiver) = signed_pair();
    let envelope = EnvelopeCodec::new(plain_provider(), JsonFormat)
        .seal("pi-0", "hi", None)
        .unwrap();

    assert!(matches!(
        EnvelopeCodec::new(receiver, JsonFormat).open(&envelope),
        Err(RelayError::Crypto(CryptoError::SignatureMissing))
    ));
}

/// Contents swapped under an old signature: still decryptable with the
/// shared key, but no longer what the peer signed.
#[test]
fn test_open_rejects_resigned_contents() {
    let (sender, receiver) = signed_pair();
    let mut envelope = EnvelopeCodec::new(sender, JsonFormat)
        .seal("pi-0", "hi", None)
        .unwrap();
    envelope.contents = CryptoProvider::new(shared_key())
        .encrypt_to_text(b"\"forged\"")
        .unwrap();

    assert!(matches!(
        EnvelopeCodec::new(receiver, JsonFormat).open(&envelope),
        Err(RelayError::Crypto(CryptoError::SignatureInvalid))
    ));
}

#[test]
fn test_open_rejects_empty_destination() {
    let codec = EnvelopeCodec::new(plain_provider(), JsonFormat);
    let mut envelope = codec.seal("pi-0", "hi", None).unwrap();
    envelope.destination.clear();
    assert!(matches!(
        codec.open(&envelope),
        Err(RelayError::Encoding(EncodingError::MalformedEnvelope(_)))
    ));
}

proptest! {
    #[test]
    fn prop_open_recovers_sealed_bytes(
        destination in client_id_strategy(),
        payload in payload_strategy(),
    ) {
        let codec = EnvelopeCodec::new(plain_provider(), BincodeFormat);
        let envelope: Envelope = codec.build(&destination, &payload, None).unwrap();
        let parsed = codec.parse(&codec.encode(&envelope).unwrap()).unwrap();
        prop_assert_eq!(codec.open(&parsed).unwrap(), payload);
    }
}
