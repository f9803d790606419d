//! Envelope Codec
//!
//! Turns serialized payloads into sealed envelopes and wire bytes back into
//! envelopes. The codec never sees the application payload type: it hands
//! out decrypted bytes and leaves decoding to the caller.

use std::sync::Arc;

use serde::Serialize;

use super::error::EncodingError;
use super::format::WireFormat;
use super::message::Envelope;
use crate::crypto::CryptoProvider;
use crate::error::RelayResult;

/// Builds, encodes, parses and opens envelopes.
#[derive(Debug, Clone)]
pub struct EnvelopeCodec<F: WireFormat> {
    crypto: Arc<CryptoProvider>,
    format: F,
    origin: Option<String>,
}

impl<F: WireFormat> EnvelopeCodec<F> {
    pub fn new(crypto: Arc<CryptoProvider>, format: F) -> Self {
        EnvelopeCodec {
            crypto,
            format,
            origin: None,
        }
    }

    /// Stamps `origin` on every envelope this codec builds.
    pub fn with_origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = Some(origin.into());
        self
    }

    pub fn format(&self) -> &F {
        &self.format
    }

    pub fn crypto(&self) -> &Arc<CryptoProvider> {
        &self.crypto
    }

    /// Encrypts an already-serialized payload and wraps it for `destination`.
    ///
    /// The envelope is only returned once encryption and (if configured)
    /// signing have both succeeded.
    pub fn build(
        &self,
        destination: &str,
        serialized: &[u8],
        ttl: Option<u64>,
    ) -> RelayResult<Envelope> {
        let contents = self.crypto.encrypt_to_text(serialized)?;
        let signature = self.crypto.sign(contents.as_bytes())?;

        Ok(Envelope {
            destination: destination.to_string(),
            origin: self.origin.clone(),
            ttl,
            contents,
            signature,
        })
    }

    /// Serializes `payload` with the wire format, then [`build`](Self::build)s.
    pub fn seal<T: Serialize + ?Sized>(
        &self,
        destination: &str,
        payload: &T,
        ttl: Option<u64>,
    ) -> RelayResult<Envelope> {
        let serialized = self.format.to_bytes(payload)?;
        self.build(destination, &serialized, ttl)
    }

    /// Encodes an envelope for the wire.
    pub fn encode(&self, envelope: &Envelope) -> Result<Vec<u8>, EncodingError> {
        self.format.to_bytes(envelope)
    }

    /// Parses one envelope from wire bytes.
    pub fn parse(&self, raw: &[u8]) -> Result<Envelope, EncodingError> {
        let envelope: Envelope = self
            .format
            .from_bytes(raw)
            .map_err(|e| EncodingError::MalformedEnvelope(e.to_string()))?;
        validate(&envelope)?;
        Ok(envelope)
    }

    /// Parses a mailbox download (a serialized list of envelopes).
    ///
    /// Only an unreadable list fails as a whole; each entry is parsed on its
    /// own, so one malformed envelope leaves its neighbours intact.
    pub fn parse_batch(
        &self,
        raw: &[u8],
    ) -> Result<Vec<Result<Envelope, EncodingError>>, EncodingError> {
        let entries = self
            .format
            .split_list(raw)
            .map_err(|e| EncodingError::MalformedEnvelope(e.to_string()))?;
        Ok(entries.iter().map(|entry| self.parse(entry)).collect())
    }

    /// Encodes envelopes as a mailbox list, the inverse of
    /// [`parse_batch`](Self::parse_batch).
    pub fn encode_batch(&self, envelopes: &[Envelope]) -> Result<Vec<u8>, EncodingError> {
        let entries = envelopes
            .iter()
            .map(|envelope| self.encode(envelope))
            .collect::<Result<Vec<_>, _>>()?;
        self.format.join_list(&entries)
    }

    /// Checks the signature (when a trusted peer is configured) and decrypts.
    pub fn open(&self, envelope: &Envelope) -> RelayResult<Vec<u8>> {
        validate(envelope)?;
        self.crypto
            .check_inbound(envelope.contents.as_bytes(), envelope.signature.as_deref())?;
        Ok(self.crypto.decrypt_from_text(&envelope.contents)?)
    }
}

fn validate(envelope: &Envelope) -> Result<(), EncodingError> {
    if envelope.destination.is_empty() {
        return Err(EncodingError::MalformedEnvelope("empty destination".into()));
    }
    if envelope.contents.is_empty() {
        return Err(EncodingError::MalformedEnvelope("empty contents".into()));
    }
    Ok(())
}
