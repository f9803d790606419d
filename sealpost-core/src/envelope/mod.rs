//! Envelope Protocol
//!
//! Wire type, pluggable serializers, and the codec that seals payloads into
//! envelopes (marshal, encrypt, sign) and opens them again.

mod codec;
mod error;
mod format;
mod message;

pub use codec::EnvelopeCodec;
pub use error::EncodingError;
pub use format::{BincodeFormat, JsonFormat, WireFormat, MAX_BINCODE_SIZE};
pub use message::Envelope;
