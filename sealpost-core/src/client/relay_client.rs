// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Relay Client
//!
//! High-level interface for sending and receiving sealed envelopes through
//! the relay.

use std::sync::{Arc, RwLock};

use futures::StreamExt;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use super::config::RelayClientConfig;
use super::inbox::Inbox;
use crate::crypto::CryptoProvider;
use crate::envelope::{Envelope, EnvelopeCodec, JsonFormat, WireFormat};
use crate::error::RelayResult;
use crate::network::{
    redial, ConnectionState, FrameStream, PollingTransport, Transport, TransportFrame,
    TransportMode, WebSocketTransport,
};

/// Relay client.
///
/// Routes every operation through exactly one transport: the socket while
/// one is connected, HTTP polling otherwise. [`mode`](Self::mode) reports
/// which. Failures are returned to the caller and never retried internally.
///
/// # Example
///
/// ```ignore
/// use sealpost_core::{CryptoProvider, JsonFormat, RelayClient, RelayClientConfig, SymmetricKey};
///
/// let crypto = CryptoProvider::new(SymmetricKey::from_file("shared.key")?);
/// let config = RelayClientConfig::new("pi-0", "localhost:12345");
/// let client = RelayClient::new(config, crypto, JsonFormat)?;
///
/// if let Err(e) = client.open_socket().await {
///     eprintln!("socket unavailable, polling instead: {e}");
/// }
/// client.send("garage", &command).await?;
///
/// let mut inbox = client.receive().await?;
/// while let Some(message) = inbox.recv().await {
///     // ...
/// }
/// ```
pub struct RelayClient<F: WireFormat = JsonFormat> {
    config: RelayClientConfig,
    codec: EnvelopeCodec<F>,
    polling: Arc<dyn Transport>,
    /// Written on dial/reconnect/close, read on every operation.
    socket: RwLock<Option<Arc<dyn Transport>>>,
}

impl<F: WireFormat> RelayClient<F> {
    /// Creates a client that polls over HTTP until a socket is opened.
    pub fn new(config: RelayClientConfig, crypto: CryptoProvider, format: F) -> RelayResult<Self> {
        config.validate()?;
        let polling = PollingTransport::new(
            &config.transport,
            &config.client_id,
            format.content_type(),
        )?;
        Ok(Self::with_transports(
            config,
            Arc::new(crypto),
            format,
            Arc::new(polling),
            None,
        ))
    }

    /// Creates a client over caller-supplied transports.
    pub fn with_transports(
        config: RelayClientConfig,
        crypto: Arc<CryptoProvider>,
        format: F,
        polling: Arc<dyn Transport>,
        socket: Option<Arc<dyn Transport>>,
    ) -> Self {
        let codec = EnvelopeCodec::new(crypto, format).with_origin(config.client_id.clone());
        RelayClient {
            config,
            codec,
            polling,
            socket: RwLock::new(socket),
        }
    }

    pub fn client_id(&self) -> &str {
        &self.config.client_id
    }

    pub fn config(&self) -> &RelayClientConfig {
        &self.config
    }

    pub fn codec(&self) -> &EnvelopeCodec<F> {
        &self.codec
    }

    /// The transport the next operation will use.
    pub fn mode(&self) -> TransportMode {
        match self.live_socket() {
            Some(_) => TransportMode::Socket,
            None => TransportMode::Polling,
        }
    }

    /// Socket connection state; `Disconnected` when no socket was ever opened.
    pub fn socket_state(&self) -> ConnectionState {
        self.current_socket()
            .map(|socket| socket.state())
            .unwrap_or(ConnectionState::Disconnected)
    }

    /// Dials the relay socket.
    ///
    /// On failure the error is returned and the client keeps polling; a
    /// missing socket is never fatal.
    pub async fn open_socket(&self) -> RelayResult<()> {
        match WebSocketTransport::connect(&self.config.transport, &self.config.client_id).await {
            Ok(socket) => {
                self.set_socket_transport(Arc::new(socket));
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "socket dial failed, staying on polling");
                Err(e.into())
            }
        }
    }

    /// Replaces the socket with a fresh dial under the configured
    /// [`ReconnectPolicy`](crate::network::ReconnectPolicy).
    pub async fn reconnect_socket(&self) -> RelayResult<()> {
        if let Some(old) = self.take_socket() {
            let _ = old.close().await; // Ignore errors on close
        }

        let transport = &self.config.transport;
        let client_id = self.config.client_id.as_str();
        let socket = redial(&self.config.reconnect, |attempt| {
            debug!(attempt, "dialing relay socket");
            WebSocketTransport::connect(transport, client_id)
        })
        .await?;

        self.set_socket_transport(Arc::new(socket));
        Ok(())
    }

    /// Installs a socket transport; it takes over from polling while connected.
    pub fn set_socket_transport(&self, socket: Arc<dyn Transport>) {
        let mut slot = self
            .socket
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *slot = Some(socket);
        info!(client_id = %self.config.client_id, "socket transport installed");
    }

    /// Builds a sealed envelope for `destination` without sending it.
    ///
    /// `ttl` falls back to the configured default.
    pub fn new_envelope<T: Serialize + ?Sized>(
        &self,
        destination: &str,
        payload: &T,
        ttl: Option<u64>,
    ) -> RelayResult<Envelope> {
        let ttl = ttl.or(self.config.default_ttl);
        self.codec.seal(destination, payload, ttl)
    }

    /// Serializes, encrypts, signs and sends `payload` to `destination`.
    ///
    /// Returns the transport's raw response: the relay's HTTP body when
    /// polling, [`SOCKET_SEND_ACK`](crate::network::SOCKET_SEND_ACK) on the
    /// socket.
    pub async fn send<T: Serialize + ?Sized>(
        &self,
        destination: &str,
        payload: &T,
    ) -> RelayResult<Vec<u8>> {
        let envelope = self.new_envelope(destination, payload, None)?;
        self.send_envelope(&envelope).await
    }

    /// Sends an envelope built earlier.
    pub async fn send_envelope(&self, envelope: &Envelope) -> RelayResult<Vec<u8>> {
        let frame = self.codec.encode(envelope)?;
        let transport = self.active_transport();
        debug!(
            destination = %envelope.destination,
            mode = ?transport.mode(),
            bytes = frame.len(),
            "sending envelope"
        );
        Ok(transport.send(frame).await?)
    }

    /// Starts receiving decrypted payload bytes.
    ///
    /// On the socket the inbox stays open until the connection drops; when
    /// polling it holds one mailbox download and then ends.
    ///
    /// The socket feeds one inbox at a time. Dropping the inbox stops its
    /// producer, which hands the socket's read half back; until that happens
    /// a second call fails with [`TransportError::StreamTaken`].
    ///
    /// [`TransportError::StreamTaken`]: crate::network::TransportError::StreamTaken
    pub async fn receive(&self) -> RelayResult<Inbox<Vec<u8>>> {
        self.receive_with(Ok).await
    }

    /// Starts receiving payloads decoded as `T` with the client's wire format.
    ///
    /// Payloads that fail to decode are dropped like any other bad envelope.
    pub async fn receive_as<T>(&self) -> RelayResult<Inbox<T>>
    where
        T: DeserializeOwned + Send + 'static,
    {
        let format = self.codec.format().clone();
        self.receive_with(move |plaintext| Ok(format.from_bytes(&plaintext)?))
            .await
    }

    /// Closes the socket, if any. Later operations poll.
    pub async fn close(&self) -> RelayResult<()> {
        if let Some(socket) = self.take_socket() {
            socket.close().await?;
        }
        Ok(())
    }

    async fn receive_with<T, D>(&self, decode: D) -> RelayResult<Inbox<T>>
    where
        T: Send + 'static,
        D: Fn(Vec<u8>) -> RelayResult<T> + Send + 'static,
    {
        let transport = self.active_transport();
        let mode = transport.mode();
        let frames = transport.stream().await?;

        let (sender, receiver) = mpsc::channel(self.config.inbox_capacity);
        tokio::spawn(pump_inbound(frames, self.codec.clone(), decode, sender, mode));

        debug!(?mode, "inbound producer started");
        Ok(Inbox::new(receiver))
    }

    fn current_socket(&self) -> Option<Arc<dyn Transport>> {
        self.socket
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    fn take_socket(&self) -> Option<Arc<dyn Transport>> {
        self.socket
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take()
    }

    fn live_socket(&self) -> Option<Arc<dyn Transport>> {
        self.current_socket()
            .filter(|socket| socket.state() == ConnectionState::Connected)
    }

    fn active_transport(&self) -> Arc<dyn Transport> {
        self.live_socket()
            .unwrap_or_else(|| Arc::clone(&self.polling))
    }
}

/// Producer task: frames in, decrypted (and decoded) items out.
///
/// A frame or envelope that fails is logged and skipped. The task ends when
/// the frame stream ends or the inbox is dropped; either way the sender is
/// dropped exactly once, on return.
async fn pump_inbound<F, T, D>(
    mut frames: FrameStream,
    codec: EnvelopeCodec<F>,
    decode: D,
    sender: mpsc::Sender<T>,
    mode: TransportMode,
) where
    F: WireFormat,
    T: Send + 'static,
    D: Fn(Vec<u8>) -> RelayResult<T> + Send + 'static,
{
    let mut delivered = 0usize;
    let mut dropped = 0usize;

    loop {
        let frame = tokio::select! {
            _ = sender.closed() => {
                debug!(?mode, "inbox dropped, stopping producer");
                return;
            }
            frame = frames.next() => match frame {
                Some(frame) => frame,
                None => break,
            },
        };

        let entries = match frame {
            TransportFrame::Envelope(raw) => vec![codec.parse(&raw)],
            TransportFrame::Mailbox(raw) => match codec.parse_batch(&raw) {
                Ok(entries) => entries,
                Err(e) => {
                    warn!(error = %e, "dropping unreadable mailbox");
                    dropped += 1;
                    continue;
                }
            },
        };

        for entry in entries {
            let envelope = match entry {
                Ok(envelope) => envelope,
                Err(e) => {
                    warn!(error = %e, "dropping unparseable envelope");
                    dropped += 1;
                    continue;
                }
            };
            let item = codec.open(&envelope).and_then(&decode);
            match item {
                Ok(item) => {
                    if sender.send(item).await.is_err() {
                        debug!(?mode, "inbox dropped, stopping producer");
                        return;
                    }
                    delivered += 1;
                }
                Err(e) => {
                    warn!(origin = ?envelope.origin, error = %e, "dropping envelope");
                    dropped += 1;
                }
            }
        }
    }

    debug!(?mode, delivered, dropped, "inbound stream closed");
}
