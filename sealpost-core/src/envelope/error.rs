//! Encoding Error Types

use thiserror::Error;

/// Failures turning values into wire bytes and back.
#[derive(Error, Debug)]
pub enum EncodingError {
    #[error("serialization failed: {0}")]
    Serialize(String),

    #[error("deserialization failed: {0}")]
    Deserialize(String),

    #[error("malformed envelope: {0}")]
    MalformedEnvelope(String),
}
