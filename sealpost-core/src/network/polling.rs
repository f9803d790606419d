//! Polling Transport
//!
//! Request/response delivery over HTTP with no persistent connection:
//! - `POST /messages` carries one envelope
//! - `GET /messages?to=<id>` downloads the queued mailbox
//!
//! Response bodies are read chunk by chunk and never buffered past
//! `max_response_bytes`.

use async_trait::async_trait;
use futures::StreamExt;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Response};
use tracing::{debug, warn};

use super::error::TransportError;
use super::transport::{
    ConnectionState, FrameStream, Transport, TransportConfig, TransportFrame, TransportMode,
    TransportResult,
};

/// A response body read up to a byte cap.
#[derive(Debug)]
struct CappedBody {
    bytes: Vec<u8>,
    truncated: bool,
}

/// HTTP polling transport.
///
/// Each [`stream`](Transport::stream) call is one finite burst: the current
/// mailbox is downloaded and the stream ends. Callers poll again for more.
pub struct PollingTransport {
    client: Client,
    base_url: String,
    client_id: String,
    content_type: &'static str,
    max_response_bytes: usize,
}

impl PollingTransport {
    /// Creates a polling transport announcing bodies as `content_type`.
    pub fn new(
        config: &TransportConfig,
        client_id: &str,
        content_type: &'static str,
    ) -> TransportResult<Self> {
        config.validate()?;

        let mut builder = Client::builder()
            .connect_timeout(config.connect_timeout)
            .user_agent(format!(
                "Sealpost/{}",
                option_env!("CARGO_PKG_VERSION").unwrap_or("0.1.0")
            ));
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }

        Ok(PollingTransport {
            client: builder
                .build()
                .map_err(|e| TransportError::Dial(format!("HTTP client setup failed: {}", e)))?,
            base_url: config.http_base(),
            client_id: client_id.to_string(),
            content_type,
            max_response_bytes: config.max_response_bytes,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn messages_url(&self) -> String {
        format!("{}/messages", self.base_url)
    }

    /// Rejects non-2xx responses.
    fn check_status(response: &Response) -> TransportResult<()> {
        if response.status().is_success() {
            Ok(())
        } else {
            Err(TransportError::Status(response.status().as_u16()))
        }
    }

    async fn read_capped(&self, mut response: Response) -> TransportResult<CappedBody> {
        let max = self.max_response_bytes;
        let mut bytes = Vec::new();

        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| TransportError::Read(e.to_string()))?
        {
            let room = max - bytes.len();
            if chunk.len() > room {
                bytes.extend_from_slice(&chunk[..room]);
                return Ok(CappedBody {
                    bytes,
                    truncated: true,
                });
            }
            bytes.extend_from_slice(&chunk);
        }

        Ok(CappedBody {
            bytes,
            truncated: false,
        })
    }
}

fn request_error(e: reqwest::Error) -> TransportError {
    if e.is_timeout() {
        TransportError::Timeout(e.to_string())
    } else if e.is_connect() {
        TransportError::Dial(e.to_string())
    } else {
        TransportError::Write(e.to_string())
    }
}

#[async_trait]
impl Transport for PollingTransport {
    fn mode(&self) -> TransportMode {
        TransportMode::Polling
    }

    fn state(&self) -> ConnectionState {
        ConnectionState::Disconnected
    }

    async fn send(&self, frame: Vec<u8>) -> TransportResult<Vec<u8>> {
        let length = frame.len();
        let response = self
            .client
            .post(self.messages_url())
            .header(CONTENT_TYPE, self.content_type)
            .body(frame)
            .send()
            .await
            .map_err(request_error)?;
        Self::check_status(&response)?;

        let body = self.read_capped(response).await?;
        if body.truncated {
            warn!(
                max = self.max_response_bytes,
                "send response exceeded cap, returning truncated body"
            );
        }
        debug!(sent = length, received = body.bytes.len(), "posted envelope");
        Ok(body.bytes)
    }

    async fn stream(&self) -> TransportResult<FrameStream> {
        let response = self
            .client
            .get(self.messages_url())
            .query(&[("to", self.client_id.as_str())])
            .send()
            .await
            .map_err(request_error)?;
        Self::check_status(&response)?;

        let body = self.read_capped(response).await?;
        if body.truncated {
            // A cut-off mailbox cannot be parsed; refuse it outright
            return Err(TransportError::ResponseTooLarge {
                max: self.max_response_bytes,
            });
        }

        debug!(bytes = body.bytes.len(), "downloaded mailbox");
        let frames = if body.bytes.is_empty() {
            Vec::new()
        } else {
            vec![TransportFrame::Mailbox(body.bytes)]
        };
        Ok(futures::stream::iter(frames).boxed())
    }

    async fn close(&self) -> TransportResult<()> {
        Ok(())
    }
}
