//! Ordered diagnostic bus.
//!
//! The bus is a single queue. Producers (resolvers, the preroll worker,
//! the state machine) append; consumers [`poll`](DiagnosticBus::poll) with a
//! [`MessageMask`] and a timeout. Polling removes the *first* queued message
//! that matches the mask and leaves every other message in place, so a
//! diagnostic posted before an error report is always seen first by a
//! consumer that polls for both.
//!
//! Async consumers can additionally [`subscribe`](DiagnosticBus::subscribe)
//! to a broadcast mirror that sees every message as it is posted.
//!
//! # Example
//!
//! ```rust
//! use parallax_playbin::bus::{BusMessage, DiagnosticBus, ElementDiagnostic, MessageMask};
//! use std::time::Duration;
//!
//! let bus = DiagnosticBus::new();
//! bus.post(BusMessage::Element(ElementDiagnostic::missing_uri_source("playbin", "cookie")));
//!
//! let msg = bus.poll(MessageMask::ELEMENT | MessageMask::ERROR, Some(Duration::ZERO));
//! assert!(msg.unwrap().as_diagnostic().is_some());
//! ```

mod message;
mod stream;

pub use message::{
    BusMessage, DiagnosticDetail, ElementDiagnostic, ErrorReport, MISSING_PLUGIN, MessageMask,
    MissingPluginType,
};
pub use stream::{BusReceiver, BusStream};

use std::collections::VecDeque;
use std::sync::{Arc, Condvar, Mutex};
use std::time::{Duration, Instant};
use tokio::sync::broadcast;

/// Handle to a bus. Clones share the same queue.
#[derive(Clone)]
pub struct DiagnosticBus {
    inner: Arc<BusInner>,
}

struct BusInner {
    queue: Mutex<BusQueue>,
    posted: Condvar,
    mirror: broadcast::Sender<BusMessage>,
}

struct BusQueue {
    messages: VecDeque<BusMessage>,
    total_posted: u64,
}

impl DiagnosticBus {
    /// Create a bus with the default mirror capacity.
    pub fn new() -> Self {
        Self::with_mirror_capacity(256)
    }

    /// Create a bus whose broadcast mirror buffers `capacity` messages.
    pub fn with_mirror_capacity(capacity: usize) -> Self {
        let (mirror, _) = broadcast::channel(capacity.max(1));
        Self {
            inner: Arc::new(BusInner {
                queue: Mutex::new(BusQueue {
                    messages: VecDeque::new(),
                    total_posted: 0,
                }),
                posted: Condvar::new(),
                mirror,
            }),
        }
    }

    /// Append a message.
    pub fn post(&self, message: BusMessage) {
        tracing::trace!(message = %message, "bus post");
        {
            let mut queue = self.inner.queue.lock().unwrap();
            // Mirror under the queue lock so subscribers see the same order.
            let _ = self.inner.mirror.send(message.clone());
            queue.messages.push_back(message);
            queue.total_posted += 1;
        }
        self.inner.posted.notify_all();
    }

    /// Post a missing-capability diagnostic.
    pub fn post_diagnostic(&self, diagnostic: ElementDiagnostic) {
        self.post(BusMessage::Element(diagnostic));
    }

    /// Post a terminal error report.
    pub fn post_error(&self, report: ErrorReport) {
        self.post(BusMessage::Error(report));
    }

    /// Remove and return the first message matching `mask`.
    ///
    /// - `Some(Duration::ZERO)` checks once without blocking
    /// - `None` blocks until a matching message arrives
    /// - any other value blocks for at most that long
    pub fn poll(&self, mask: MessageMask, timeout: Option<Duration>) -> Option<BusMessage> {
        let deadline = timeout.map(|t| Instant::now() + t);
        let mut queue = self.inner.queue.lock().unwrap();

        loop {
            if let Some(pos) = queue.messages.iter().position(|m| mask.matches(m)) {
                return queue.messages.remove(pos);
            }

            queue = match deadline {
                None => self.inner.posted.wait(queue).unwrap(),
                Some(deadline) => {
                    let now = Instant::now();
                    if now >= deadline {
                        return None;
                    }
                    let (q, _) = self
                        .inner
                        .posted
                        .wait_timeout(queue, deadline - now)
                        .unwrap();
                    q
                }
            };
        }
    }

    /// Remove and return the oldest message of any type without blocking.
    pub fn pop(&self) -> Option<BusMessage> {
        self.inner.queue.lock().unwrap().messages.pop_front()
    }

    /// Remove and return every queued message matching `mask`, in order.
    pub fn drain(&self, mask: MessageMask) -> Vec<BusMessage> {
        let mut queue = self.inner.queue.lock().unwrap();
        let (matching, rest): (VecDeque<_>, VecDeque<_>) =
            queue.messages.drain(..).partition(|m| mask.matches(m));
        queue.messages = rest;
        matching.into()
    }

    /// Drop every queued message matching `mask` without returning it.
    ///
    /// The broadcast mirror is unaffected. Returns the number dropped.
    pub fn discard(&self, mask: MessageMask) -> usize {
        let mut queue = self.inner.queue.lock().unwrap();
        let before = queue.messages.len();
        queue.messages.retain(|m| !mask.matches(m));
        before - queue.messages.len()
    }

    /// Number of queued messages.
    pub fn len(&self) -> usize {
        self.inner.queue.lock().unwrap().messages.len()
    }

    /// Whether the queue is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Total number of messages ever posted.
    pub fn total_posted(&self) -> u64 {
        self.inner.queue.lock().unwrap().total_posted
    }

    /// Subscribe to the broadcast mirror.
    ///
    /// Only messages posted after subscribing are received.
    pub fn subscribe(&self) -> BusReceiver {
        BusReceiver::new(self.inner.mirror.subscribe())
    }

    /// Subscribe as a `futures::Stream`.
    pub fn stream(&self) -> BusStream {
        BusStream::new(self.subscribe())
    }
}

impl Default for DiagnosticBus {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for DiagnosticBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let queue = self.inner.queue.lock().unwrap();
        f.debug_struct("DiagnosticBus")
            .field("queued", &queue.messages.len())
            .field("total_posted", &queue.total_posted)
            .finish()
    }
}
