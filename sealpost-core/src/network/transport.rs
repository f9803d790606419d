//! Transport Trait
//!
//! Abstraction over the two ways of reaching the relay: a persistent socket
//! and one-shot HTTP polling.

use std::time::Duration;

use async_trait::async_trait;
use futures::stream::BoxStream;

use super::error::TransportError;

/// Result type for transport operations.
pub type TransportResult<T> = Result<T, TransportError>;

/// Default cap on HTTP response bodies (1 MiB).
pub const DEFAULT_MAX_RESPONSE_BYTES: usize = 1024 * 1024;

/// Connection state.
///
/// Polling transports are always `Disconnected`: they hold no connection
/// between calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// No persistent connection.
    Disconnected,
    /// Persistent connection open.
    Connected,
}

/// Which delivery strategy a transport (or the client) is using.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportMode {
    /// Persistent duplex socket.
    Socket,
    /// Request/response polling.
    Polling,
}

/// One unit handed up by a transport's inbound stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportFrame {
    /// A single serialized envelope (socket frames).
    Envelope(Vec<u8>),
    /// A serialized list of envelopes (a polled mailbox).
    Mailbox(Vec<u8>),
}

/// Lazy sequence of inbound frames. Ends when the transport closes.
pub type FrameStream = BoxStream<'static, TransportFrame>;

/// Configuration for transport connections.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// Relay address as `host[:port]`, without scheme.
    pub relay_host: String,
    /// Use `https`/`wss` instead of `http`/`ws`.
    pub use_tls: bool,
    /// Socket dial timeout.
    pub connect_timeout: Duration,
    /// Whole-request timeout for polling; `None` waits indefinitely.
    pub request_timeout: Option<Duration>,
    /// Cap on HTTP response bodies.
    pub max_response_bytes: usize,
}

impl Default for TransportConfig {
    fn default() -> Self {
        TransportConfig {
            relay_host: "localhost:12345".to_string(),
            use_tls: false,
            connect_timeout: Duration::from_secs(10),
            request_timeout: None,
            max_response_bytes: DEFAULT_MAX_RESPONSE_BYTES,
        }
    }
}

impl TransportConfig {
    /// Creates a config for `relay_host` with default limits.
    pub fn new(relay_host: &str) -> Self {
        TransportConfig {
            relay_host: relay_host.to_string(),
            ..Default::default()
        }
    }

    pub fn with_tls(mut self, use_tls: bool) -> Self {
        self.use_tls = use_tls;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn with_max_response_bytes(mut self, max: usize) -> Self {
        self.max_response_bytes = max;
        self
    }

    /// Checks that `relay_host` is a bare `host[:port]`.
    pub fn validate(&self) -> TransportResult<()> {
        let host = self.relay_host.as_str();
        if host.is_empty() {
            return Err(TransportError::InvalidUrl("empty relay host".into()));
        }
        if host.contains("://") || host.contains('/') || host.contains(char::is_whitespace) {
            return Err(TransportError::InvalidUrl(format!(
                "expected host[:port], got {:?}",
                host
            )));
        }
        Ok(())
    }

    /// Base URL for HTTP requests, e.g. `http://relay:8080`.
    pub fn http_base(&self) -> String {
        let scheme = if self.use_tls { "https" } else { "http" };
        format!("{}://{}", scheme, self.relay_host)
    }

    /// WebSocket endpoint, e.g. `ws://relay:8080/socket`.
    pub fn socket_url(&self) -> String {
        let scheme = if self.use_tls { "wss" } else { "ws" };
        format!("{}://{}/socket", scheme, self.relay_host)
    }
}

/// Delivery strategy for envelope frames.
///
/// Implementations are shared behind `Arc<dyn Transport>`, so every method
/// takes `&self`; implementations guard their own mutable state.
#[async_trait]
pub trait Transport: Send + Sync {
    /// The strategy this transport implements.
    fn mode(&self) -> TransportMode;

    /// Current connection state.
    fn state(&self) -> ConnectionState;

    /// Sends one frame and returns the relay's response bytes.
    async fn send(&self, frame: Vec<u8>) -> TransportResult<Vec<u8>>;

    /// Opens the inbound frame stream.
    async fn stream(&self) -> TransportResult<FrameStream>;

    /// Releases the connection, if any. Safe to call more than once.
    async fn close(&self) -> TransportResult<()>;
}
