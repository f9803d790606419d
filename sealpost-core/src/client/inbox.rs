//! Inbound message queue handed to the caller.

use std::pin::Pin;
use std::task::{Context, Poll};

use futures::Stream;
use tokio::sync::mpsc;

/// Receiving end of an inbound stream.
///
/// Fed by one producer task per [`receive`](super::RelayClient::receive)
/// call. Yields `None` once the transport has closed and everything already
/// decrypted has been drained. Dropping the inbox stops the producer.
#[derive(Debug)]
pub struct Inbox<T> {
    receiver: mpsc::Receiver<T>,
}

impl<T> Inbox<T> {
    pub(crate) fn new(receiver: mpsc::Receiver<T>) -> Self {
        Inbox { receiver }
    }

    /// Waits for the next message.
    pub async fn recv(&mut self) -> Option<T> {
        self.receiver.recv().await
    }

    /// Stops accepting new messages. Already queued ones can still be read.
    pub fn close(&mut self) {
        self.receiver.close();
    }
}

impl<T> Stream for Inbox<T> {
    type Item = T;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<T>> {
        self.get_mut().receiver.poll_recv(cx)
    }
}
