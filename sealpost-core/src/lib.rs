//! Sealpost Core Library
//!
//! Client side of a message relay: payloads are serialized, encrypted with a
//! pre-shared AES-GCM key, optionally signed with ECDSA P-256, wrapped in an
//! envelope and delivered over a WebSocket or, when no socket is open, HTTP
//! polling. All cryptographic operations use the audited `ring` crate.

pub mod client;
pub mod crypto;
pub mod envelope;
pub mod error;
pub mod network;

pub use client::{Inbox, RelayClient, RelayClientBuilder, RelayClientConfig};
pub use crypto::{
    decrypt, encrypt, CryptoError, CryptoProvider, KeySource, PublicKey, PublicKeySource,
    Signature, SigningKeyPair, SigningKeySource, SymmetricKey,
};
pub use envelope::{BincodeFormat, EncodingError, Envelope, EnvelopeCodec, JsonFormat, WireFormat};
pub use error::{RelayError, RelayResult};
pub use network::{
    ConnectionState, MockTransport, PollingTransport, ReconnectPolicy, Transport, TransportConfig,
    TransportError, TransportFrame, TransportMode, WebSocketTransport,
};
