//! Wire Formats
//!
//! The serializer used for payloads and envelopes is injected by the caller.
//! JSON and bincode adapters are provided; anything implementing
//! [`WireFormat`] can be plugged in instead.

use bincode::Options;
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::error::EncodingError;

/// A pluggable serializer/deserializer pair.
pub trait WireFormat: Clone + Send + Sync + 'static {
    /// MIME type announced on HTTP requests carrying this format.
    fn content_type(&self) -> &'static str;

    fn to_bytes<T: Serialize + ?Sized>(&self, value: &T) -> Result<Vec<u8>, EncodingError>;

    fn from_bytes<T: DeserializeOwned>(&self, bytes: &[u8]) -> Result<T, EncodingError>;

    /// Splits a serialized list into the encoded bytes of each entry, so
    /// entries can be decoded (and rejected) one at a time.
    fn split_list(&self, bytes: &[u8]) -> Result<Vec<Vec<u8>>, EncodingError>;

    /// Joins individually encoded entries into a list, the inverse of
    /// [`split_list`](Self::split_list).
    fn join_list(&self, entries: &[Vec<u8>]) -> Result<Vec<u8>, EncodingError>;
}

/// JSON via `serde_json`.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonFormat;

impl WireFormat for JsonFormat {
    fn content_type(&self) -> &'static str {
        "application/json"
    }

    fn to_bytes<T: Serialize + ?Sized>(&self, value: &T) -> Result<Vec<u8>, EncodingError> {
        serde_json::to_vec(value).map_err(|e| EncodingError::Serialize(e.to_string()))
    }

    fn from_bytes<T: DeserializeOwned>(&self, bytes: &[u8]) -> Result<T, EncodingError> {
        serde_json::from_slice(bytes).map_err(|e| EncodingError::Deserialize(e.to_string()))
    }

    /// A JSON array of arbitrary values; each value is re-encoded on its own.
    fn split_list(&self, bytes: &[u8]) -> Result<Vec<Vec<u8>>, EncodingError> {
        let entries: Vec<serde_json::Value> = self.from_bytes(bytes)?;
        entries.iter().map(|entry| self.to_bytes(entry)).collect()
    }

    fn join_list(&self, entries: &[Vec<u8>]) -> Result<Vec<u8>, EncodingError> {
        let values = entries
            .iter()
            .map(|entry| self.from_bytes::<serde_json::Value>(entry))
            .collect::<Result<Vec<_>, _>>()?;
        self.to_bytes(&values)
    }
}

/// Upper bound on bincode allocations while decoding untrusted input.
pub const MAX_BINCODE_SIZE: u64 = 16 * 1024 * 1024;

fn bincode_options() -> impl Options {
    bincode::DefaultOptions::new().with_limit(MAX_BINCODE_SIZE)
}

/// Compact binary via `bincode` (varint integers, size-limited decoding).
///
/// Bincode is not self-describing, so a list is carried as a sequence of
/// byte strings, each holding one encoded entry.
#[derive(Debug, Clone, Copy, Default)]
pub struct BincodeFormat;

impl WireFormat for BincodeFormat {
    fn content_type(&self) -> &'static str {
        "application/octet-stream"
    }

    fn to_bytes<T: Serialize + ?Sized>(&self, value: &T) -> Result<Vec<u8>, EncodingError> {
        bincode_options()
            .serialize(value)
            .map_err(|e| EncodingError::Serialize(e.to_string()))
    }

    fn from_bytes<T: DeserializeOwned>(&self, bytes: &[u8]) -> Result<T, EncodingError> {
        bincode_options()
            .deserialize(bytes)
            .map_err(|e| EncodingError::Deserialize(e.to_string()))
    }

    fn split_list(&self, bytes: &[u8]) -> Result<Vec<Vec<u8>>, EncodingError> {
        self.from_bytes(bytes)
    }

    fn join_list(&self, entries: &[Vec<u8>]) -> Result<Vec<u8>, EncodingError> {
        self.to_bytes(entries)
    }
}
