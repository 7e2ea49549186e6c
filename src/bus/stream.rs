//! Async view of the bus.
//!
//! The broadcast mirror lets async code observe bus traffic without taking
//! messages away from pollers.

use super::{BusMessage, ErrorReport};
use tokio::sync::broadcast;

/// Receiver for mirrored bus messages.
///
/// Multiple receivers can be created from one bus.
pub struct BusReceiver {
    receiver: broadcast::Receiver<BusMessage>,
}

impl BusReceiver {
    pub(super) fn new(receiver: broadcast::Receiver<BusMessage>) -> Self {
        Self { receiver }
    }

    /// Receive the next message.
    ///
    /// Returns `None` once every bus handle has been dropped.
    pub async fn recv(&mut self) -> Option<BusMessage> {
        loop {
            match self.receiver.recv().await {
                Ok(message) => return Some(message),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "bus subscriber lagged");
                    continue;
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    /// Try to receive a message without waiting.
    pub fn try_recv(&mut self) -> Option<BusMessage> {
        loop {
            match self.receiver.try_recv() {
                Ok(message) => return Some(message),
                Err(broadcast::error::TryRecvError::Lagged(_)) => continue,
                Err(_) => return None,
            }
        }
    }

    /// Wait for the next error report, skipping everything else.
    pub async fn wait_error(&mut self) -> Option<ErrorReport> {
        while let Some(message) = self.recv().await {
            if let BusMessage::Error(report) = message {
                return Some(report);
            }
        }
        None
    }
}

/// A `futures::Stream` of mirrored bus messages.
pub struct BusStream {
    receiver: BusReceiver,
}

impl BusStream {
    /// Wrap a receiver.
    pub fn new(receiver: BusReceiver) -> Self {
        Self { receiver }
    }
}

impl futures::Stream for BusStream {
    type Item = BusMessage;

    fn poll_next(
        mut self: std::pin::Pin<&mut Self>,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Option<Self::Item>> {
        let fut = self.receiver.recv();
        tokio::pin!(fut);
        fut.poll(cx)
    }
}
