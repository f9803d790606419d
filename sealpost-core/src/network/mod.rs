//! Network + Transport Layer
//!
//! Moves encoded envelopes between the client and the relay.
//!
//! # Architecture
//!
//! The network layer consists of:
//! - **Transport trait**: one capability set shared by both strategies
//! - **WebSocket transport**: persistent duplex socket, continuous inbound feed
//! - **Polling transport**: one HTTP request per send, one mailbox download
//!   per receive
//! - **Reconnect policy**: explicit, bounded redial; off by default
//!
//! # Example
//!
//! ```ignore
//! use sealpost_core::network::{PollingTransport, Transport, TransportConfig};
//!
//! let config = TransportConfig::new("relay.example.com:8080");
//! let polling = PollingTransport::new(&config, "pi-0", "application/json")?;
//! let response = polling.send(frame).await?;
//! ```

mod connection;
mod error;
mod mock;
mod polling;
mod transport;
mod websocket;

// Error types
pub use error::TransportError;

// Transport abstraction
pub use transport::{
    ConnectionState, FrameStream, Transport, TransportConfig, TransportFrame, TransportMode,
    TransportResult, DEFAULT_MAX_RESPONSE_BYTES,
};

// Mock transport for testing
pub use mock::MockTransport;

// Polling transport
pub use polling::PollingTransport;

// WebSocket transport
pub use websocket::{WebSocketTransport, SOCKET_SEND_ACK};

// Reconnection
pub use connection::{redial, ReconnectPolicy};
