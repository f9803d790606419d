//! Mock Transport
//!
//! In-memory transport for tests. Records every frame sent, counts calls per
//! operation, replays queued inbound frames, and can fail on demand.

use std::sync::Mutex;

use async_trait::async_trait;
use futures::StreamExt;

use super::error::TransportError;
use super::transport::{
    ConnectionState, FrameStream, Transport, TransportFrame, TransportMode, TransportResult,
};

#[derive(Debug)]
struct MockState {
    state: ConnectionState,
    sent: Vec<Vec<u8>>,
    inbound: Vec<TransportFrame>,
    send_response: Vec<u8>,
    next_error: Option<TransportError>,
    send_calls: usize,
    stream_calls: usize,
    close_calls: usize,
}

/// Test double for [`Transport`].
///
/// # Example
///
/// ```ignore
/// let socket = Arc::new(MockTransport::socket());
/// socket.queue_receive(TransportFrame::Envelope(bytes));
/// client.set_socket_transport(socket.clone());
/// assert_eq!(socket.send_count(), 1);
/// ```
#[derive(Debug)]
pub struct MockTransport {
    mode: TransportMode,
    inner: Mutex<MockState>,
}

impl MockTransport {
    fn with_mode(mode: TransportMode, state: ConnectionState) -> Self {
        MockTransport {
            mode,
            inner: Mutex::new(MockState {
                state,
                sent: Vec::new(),
                inbound: Vec::new(),
                send_response: b"ok".to_vec(),
                next_error: None,
                send_calls: 0,
                stream_calls: 0,
                close_calls: 0,
            }),
        }
    }

    /// A connected socket-mode double.
    pub fn socket() -> Self {
        Self::with_mode(TransportMode::Socket, ConnectionState::Connected)
    }

    /// A polling-mode double.
    pub fn polling() -> Self {
        Self::with_mode(TransportMode::Polling, ConnectionState::Disconnected)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MockState> {
        self.inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Queues a frame for the next [`stream`](Transport::stream) call.
    pub fn queue_receive(&self, frame: TransportFrame) {
        self.lock().inbound.push(frame);
    }

    /// Sets the bytes returned by `send`.
    pub fn set_send_response(&self, response: &[u8]) {
        self.lock().send_response = response.to_vec();
    }

    /// Makes the next `send` or `stream` call fail with `error`.
    pub fn inject_error(&self, error: TransportError) {
        self.lock().next_error = Some(error);
    }

    pub fn set_state(&self, state: ConnectionState) {
        self.lock().state = state;
    }

    /// Frames passed to `send`, oldest first.
    pub fn sent_frames(&self) -> Vec<Vec<u8>> {
        self.lock().sent.clone()
    }

    pub fn clear_sent(&self) {
        self.lock().sent.clear();
    }

    pub fn send_count(&self) -> usize {
        self.lock().send_calls
    }

    pub fn stream_count(&self) -> usize {
        self.lock().stream_calls
    }

    pub fn close_count(&self) -> usize {
        self.lock().close_calls
    }

    pub fn has_pending(&self) -> bool {
        !self.lock().inbound.is_empty()
    }
}

#[async_trait]
impl Transport for MockTransport {
    fn mode(&self) -> TransportMode {
        self.mode
    }

    fn state(&self) -> ConnectionState {
        self.lock().state
    }

    async fn send(&self, frame: Vec<u8>) -> TransportResult<Vec<u8>> {
        let mut inner = self.lock();
        inner.send_calls += 1;
        if let Some(error) = inner.next_error.take() {
            return Err(error);
        }
        if self.mode == TransportMode::Socket && inner.state != ConnectionState::Connected {
            return Err(TransportError::NotConnected);
        }
        inner.sent.push(frame);
        Ok(inner.send_response.clone())
    }

    async fn stream(&self) -> TransportResult<FrameStream> {
        let mut inner = self.lock();
        inner.stream_calls += 1;
        if let Some(error) = inner.next_error.take() {
            return Err(error);
        }
        let frames = std::mem::take(&mut inner.inbound);
        Ok(futures::stream::iter(frames).boxed())
    }

    async fn close(&self) -> TransportResult<()> {
        let mut inner = self.lock();
        inner.close_calls += 1;
        inner.state = ConnectionState::Disconnected;
        Ok(())
    }
}
