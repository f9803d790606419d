// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! WebSocket Transport
//!
//! Persistent socket to the relay using tokio-tungstenite. Frames in both
//! directions are raw serialized envelopes.

use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::task::{Context, Poll};

use async_trait::async_trait;
use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, Stream, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::header::ORIGIN;
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tokio_tungstenite::tungstenite::{self, Message};
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::{debug, info, warn};

use super::error::TransportError;
use super::transport::{
    ConnectionState, FrameStream, Transport, TransportConfig, TransportFrame, TransportMode,
    TransportResult,
};

/// Response returned by [`WebSocketTransport::send`]. The socket carries no
/// application-level reply, only the fact that the frame was written.
pub const SOCKET_SEND_ACK: &[u8] = b"sent via websocket";

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;
type ReaderSlot = Arc<Mutex<Option<SplitStream<Socket>>>>;

fn lock_reader(slot: &ReaderSlot) -> MutexGuard<'_, Option<SplitStream<Socket>>> {
    slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// WebSocket transport for relay communication.
///
/// The write half is shared by all senders; the read half has one owner at a
/// time. [`stream`](Transport::stream) lends it out and dropping the returned
/// stream gives it back, so a later call can read on. A read or write
/// failure flips the state to `Disconnected`. Nothing here redials.
///
/// # Example
///
/// ```ignore
/// use sealpost_core::network::{TransportConfig, WebSocketTransport};
///
/// let config = TransportConfig::new("relay.example.com:8080");
/// let transport = WebSocketTransport::connect(&config, "pi-0").await?;
/// ```
pub struct WebSocketTransport {
    writer: tokio::sync::Mutex<SplitSink<Socket, Message>>,
    reader: ReaderSlot,
    connected: Arc<AtomicBool>,
    url: String,
}

impl WebSocketTransport {
    /// Dials `<scheme>://<relay_host>/socket`.
    ///
    /// `client_id` travels in the `Origin` header as `http://<client_id>`; the
    /// relay uses it to correlate the connection, not to authenticate it.
    pub async fn connect(config: &TransportConfig, client_id: &str) -> TransportResult<Self> {
        config.validate()?;
        let url = config.socket_url();

        let mut request = url
            .as_str()
            .into_client_request()
            .map_err(|e| TransportError::InvalidUrl(format!("{}: {}", url, e)))?;
        let origin = HeaderValue::from_str(&format!("http://{}", client_id)).map_err(|e| {
            TransportError::InvalidUrl(format!("client id not usable as origin: {}", e))
        })?;
        request.headers_mut().insert(ORIGIN, origin);

        let dial = connect_async(request);
        let (socket, _response) = tokio::time::timeout(config.connect_timeout, dial)
            .await
            .map_err(|_| TransportError::Timeout(format!("dialing {}", url)))?
            .map_err(|e| TransportError::Dial(format!("{}: {}", url, e)))?;

        info!(url = %url, "socket connected");
        Ok(Self::from_socket(socket, url))
    }

    fn from_socket(socket: Socket, url: String) -> Self {
        let (writer, reader) = socket.split();
        WebSocketTransport {
            writer: tokio::sync::Mutex::new(writer),
            reader: Arc::new(Mutex::new(Some(reader))),
            connected: Arc::new(AtomicBool::new(true)),
            url,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    fn mark_disconnected(&self) {
        self.connected.store(false, Ordering::SeqCst);
    }
}

#[async_trait]
impl Transport for WebSocketTransport {
    fn mode(&self) -> TransportMode {
        TransportMode::Socket
    }

    fn state(&self) -> ConnectionState {
        if self.connected.load(Ordering::SeqCst) {
            ConnectionState::Connected
        } else {
            ConnectionState::Disconnected
        }
    }

    async fn send(&self, frame: Vec<u8>) -> TransportResult<Vec<u8>> {
        if self.state() != ConnectionState::Connected {
            return Err(TransportError::NotConnected);
        }

        let mut writer = self.writer.lock().await;
        // SinkExt::send flushes before returning
        writer.send(Message::Binary(frame)).await.map_err(|e| {
            self.mark_disconnected();
            match e {
                tungstenite::Error::ConnectionClosed | tungstenite::Error::AlreadyClosed => {
                    TransportError::ConnectionClosed
                }
                other => TransportError::Write(other.to_string()),
            }
        })?;

        Ok(SOCKET_SEND_ACK.to_vec())
    }

    async fn stream(&self) -> TransportResult<FrameStream> {
        if self.state() != ConnectionState::Connected {
            return Err(TransportError::NotConnected);
        }
        let reader = lock_reader(&self.reader)
            .take()
            .ok_or(TransportError::StreamTaken)?;

        Ok(SocketFrames {
            reader: Some(reader),
            slot: self.reader.clone(),
            connected: self.connected.clone(),
        }
        .boxed())
    }

    async fn close(&self) -> TransportResult<()> {
        self.mark_disconnected();
        let mut writer = self.writer.lock().await;
        let _ = writer.close().await; // Ignore errors on close
        Ok(())
    }
}

/// Inbound frames borrowed from a [`WebSocketTransport`].
///
/// Ends on close or read error, marking the socket disconnected. Dropped
/// early while the socket is still up, it puts the read half back.
struct SocketFrames {
    reader: Option<SplitStream<Socket>>,
    slot: ReaderSlot,
    connected: Arc<AtomicBool>,
}

impl SocketFrames {
    fn finish(&mut self) -> Poll<Option<TransportFrame>> {
        self.connected.store(false, Ordering::SeqCst);
        self.reader = None;
        Poll::Ready(None)
    }
}

impl Stream for SocketFrames {
    type Item = TransportFrame;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<TransportFrame>> {
        let this = self.get_mut();
        loop {
            let Some(reader) = this.reader.as_mut() else {
                return Poll::Ready(None);
            };
            match reader.poll_next_unpin(cx) {
                Poll::Pending => return Poll::Pending,
                Poll::Ready(Some(Ok(Message::Binary(data)))) => {
                    return Poll::Ready(Some(TransportFrame::Envelope(data)));
                }
                Poll::Ready(Some(Ok(Message::Text(text)))) => {
                    return Poll::Ready(Some(TransportFrame::Envelope(text.into_bytes())));
                }
                // Pongs to pings are queued by tungstenite itself
                Poll::Ready(Some(Ok(Message::Ping(_) | Message::Pong(_) | Message::Frame(_)))) => {
                    continue;
                }
                Poll::Ready(Some(Ok(Message::Close(frame)))) => {
                    debug!(?frame, "relay closed socket");
                    return this.finish();
                }
                Poll::Ready(Some(Err(e))) => {
                    warn!(error = %e, "socket read failed, closing inbound stream");
                    return this.finish();
                }
                Poll::Ready(None) => return this.finish(),
            }
        }
    }
}

impl Drop for SocketFrames {
    fn drop(&mut self) {
        if let Some(reader) = self.reader.take() {
            if self.connected.load(Ordering::SeqCst) {
                *lock_reader(&self.slot) = Some(reader);
                debug!("inbound stream released");
            }
        }
    }
}
