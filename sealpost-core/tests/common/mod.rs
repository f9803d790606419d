// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Common Test Utilities
//!
//! Key fixtures plus two local relay doubles: an axum app serving the
//! polling endpoints and a tokio-tungstenite listener serving one socket.

#![allow(dead_code)]

pub mod strategies;

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::post;
use axum::Router;
use futures::{SinkExt, StreamExt};
use tokio::net::TcpListener;
use tokio::sync::{mpsc, oneshot};
use tokio_tungstenite::tungstenite::handshake::server::{ErrorResponse, Request, Response};
use tokio_tungstenite::tungstenite::Message;
use tracing_subscriber::EnvFilter;

use sealpost_core::crypto::{CryptoProvider, SigningKeyPair, SymmetricKey};
use sealpost_core::envelope::{EnvelopeCodec, JsonFormat};

/// Routes library logs to the test harness; set `RUST_LOG` to see them.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

// ============================================================
// Key Fixtures
// ============================================================

pub const SHARED_KEY: [u8; 32] = [0x5A; 32];

pub fn shared_key() -> SymmetricKey {
    SymmetricKey::from_slice(&SHARED_KEY).unwrap()
}

/// Provider that only encrypts.
pub fn plain_provider() -> Arc<CryptoProvider> {
    Arc::new(CryptoProvider::new(shared_key()))
}

/// A sender that signs, and a receiver that trusts that sender.
pub fn signed_pair() -> (Arc<CryptoProvider>, Arc<CryptoProvider>) {
    let signer = SigningKeyPair::generate().unwrap();
    let public_key = signer.public_key();
    let sender = CryptoProvider::new(shared_key()).with_signing_key(signer);
    let receiver = CryptoProvider::new(shared_key()).with_trusted_peer(public_key);
    (Arc::new(sender), Arc::new(receiver))
}

/// Codec for a remote peer sharing [`SHARED_KEY`].
pub fn peer_codec(origin: &str) -> EnvelopeCodec<JsonFormat> {
    EnvelopeCodec::new(plain_provider(), JsonFormat).with_origin(origin)
}

/// Wire bytes of one envelope addressed to `destination`.
pub fn wire_envelope(codec: &EnvelopeCodec<JsonFormat>, destination: &str, payload: &str) -> Vec<u8> {
    let envelope = codec.seal(destination, payload, None).unwrap();
    codec.encode(&envelope).unwrap()
}

// ============================================================
// HTTP Relay Double
// ============================================================

#[derive(Debug, Clone)]
pub struct PostedFrame {
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

/// Shared state behind the HTTP relay double.
#[derive(Clone)]
pub struct HttpRelay {
    pub posted: Arc<Mutex<Vec<PostedFrame>>>,
    pub polled_for: Arc<Mutex<Vec<String>>>,
    pub mailbox: Arc<Mutex<Vec<u8>>>,
    pub send_response: Arc<Mutex<Vec<u8>>>,
    pub status: Arc<Mutex<StatusCode>>,
}

impl HttpRelay {
    pub fn new() -> Self {
        HttpRelay {
            posted: Arc::new(Mutex::new(Vec::new())),
            polled_for: Arc::new(Mutex::new(Vec::new())),
            mailbox: Arc::new(Mutex::new(Vec::new())),
            send_response: Arc::new(Mutex::new(b"queued".to_vec())),
            status: Arc::new(Mutex::new(StatusCode::OK)),
        }
    }

    pub fn set_mailbox(&self, body: Vec<u8>) {
        *self.mailbox.lock().unwrap() = body;
    }

    pub fn set_send_response(&self, body: Vec<u8>) {
        *self.send_response.lock().unwrap() = body;
    }

    pub fn set_status(&self, status: StatusCode) {
        *self.status.lock().unwrap() = status;
    }

    pub fn posted(&self) -> Vec<PostedFrame> {
        self.posted.lock().unwrap().clone()
    }

    pub fn polled_for(&self) -> Vec<String> {
        self.polled_for.lock().unwrap().clone()
    }

    /// Serves `/messages` on an ephemeral port; returns `host:port`.
    pub async fn spawn(&self) -> String {
        let app = Router::new()
            .route("/messages", post(post_message).get(get_mailbox))
            .with_state(self.clone());
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        addr.to_string()
    }
}

async fn post_message(
    State(relay): State<HttpRelay>,
    headers: HeaderMap,
    body: Bytes,
) -> (StatusCode, Vec<u8>) {
    let content_type = headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);
    relay.posted.lock().unwrap().push(PostedFrame {
        content_type,
        body: body.to_vec(),
    });
    let status = *relay.status.lock().unwrap();
    (status, relay.send_response.lock().unwrap().clone())
}

async fn get_mailbox(
    State(relay): State<HttpRelay>,
    Query(params): Query<HashMap<String, String>>,
) -> (StatusCode, Vec<u8>) {
    if let Some(to) = params.get("to") {
        relay.polled_for.lock().unwrap().push(to.clone());
    }
    let status = *relay.status.lock().unwrap();
    let body = std::mem::take(&mut *relay.mailbox.lock().unwrap());
    (status, body)
}

// ============================================================
// Socket Relay Double
// ============================================================

/// Handles onto a relay socket accepting exactly one client.
pub struct SocketRelay {
    pub host: String,
    /// Binary frames the client wrote.
    pub received: mpsc::UnboundedReceiver<Vec<u8>>,
    /// Messages to push to the client. `Message::Close` ends the session.
    pub outbound: mpsc::UnboundedSender<Message>,
    /// `Origin` header seen during the handshake.
    pub origin: oneshot::Receiver<Option<String>>,
}

pub async fn spawn_socket_relay() -> SocketRelay {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let host = listener.local_addr().unwrap().to_string();
    let (received_tx, received) = mpsc::unbounded_channel();
    let (outbound, mut outbound_rx) = mpsc::unbounded_channel::<Message>();
    let (origin_tx, origin) = oneshot::channel();

    tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let callback = move |request: &Request, response: Response| -> Result<Response, ErrorResponse> {
            let seen = request
                .headers()
                .get("origin")
                .and_then(|value| value.to_str().ok())
                .map(str::to_string);
            let _ = origin_tx.send(seen);
            Ok(response)
        };
        let socket = tokio_tungstenite::accept_hdr_async(stream, callback)
            .await
            .unwrap();
        let (mut write, mut read) = socket.split();

        loop {
            tokio::select! {
                incoming = read.next() => match incoming {
                    Some(Ok(Message::Binary(data))) => {
                        let _ = received_tx.send(data);
                    }
                    Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                    Some(Ok(_)) => {}
                },
                outgoing = outbound_rx.recv() => match outgoing {
                    Some(message) => {
                        let closing = matches!(message, Message::Close(_));
                        if write.send(message).await.is_err() || closing {
                            break;
                        }
                    }
                    None => break,
                },
            }
        }
    });

    SocketRelay {
        host,
        received,
        outbound,
        origin,
    }
}

/// An address nothing is listening on.
pub async fn dead_host() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let host = listener.local_addr().unwrap().to_string();
    drop(listener);
    host
}
