//! Event sinks: where the broadcaster delivers an id's events.

use std::fmt;
use std::sync::mpsc::{self, RecvTimeoutError, TrySendError};
use std::time::Duration;

use super::event::AdEvent;

/// Why a sink refused an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkError {
    /// The consumer is gone.
    Disconnected,
    /// A bounded queue is full; the event was dropped.
    Full,
}

impl fmt::Display for SinkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SinkError::Disconnected => write!(f, "event sink disconnected"),
            SinkError::Full => write!(f, "event sink full"),
        }
    }
}

impl std::error::Error for SinkError {}

/// Receives the events of one ad id.
///
/// A sink passed to `attach` runs on its own forwarding thread, never on
/// the engine's callback path, so it may block or call back into
/// [`crate::RewardAds`]. Returning `Disconnected` stops the forwarding.
pub trait EventSink: Send + Sync {
    fn deliver(&self, event: &AdEvent) -> Result<(), SinkError>;
}

impl<F> EventSink for F
where
    F: Fn(&AdEvent) + Send + Sync,
{
    fn deliver(&self, event: &AdEvent) -> Result<(), SinkError> {
        self(event);
        Ok(())
    }
}

enum QueueSender {
    Unbounded(mpsc::Sender<AdEvent>),
    Bounded(mpsc::SyncSender<AdEvent>),
}

/// Queue-backed sink with a single consumer, the paired [`EventReceiver`].
pub struct ChannelSink {
    sender: QueueSender,
}

/// Create a sink/receiver pair. `capacity` of `None` means unbounded;
/// a bounded sink drops events instead of blocking when full.
pub fn channel(capacity: Option<usize>) -> (ChannelSink, EventReceiver) {
    match capacity {
        Some(capacity) => {
            let (tx, rx) = mpsc::sync_channel(capacity);
            (
                ChannelSink {
                    sender: QueueSender::Bounded(tx),
                },
                EventReceiver { receiver: rx },
            )
        }
        None => {
            let (tx, rx) = mpsc::channel();
            (
                ChannelSink {
                    sender: QueueSender::Unbounded(tx),
                },
                EventReceiver { receiver: rx },
            )
        }
    }
}

impl EventSink for ChannelSink {
    fn deliver(&self, event: &AdEvent) -> Result<(), SinkError> {
        match &self.sender {
            QueueSender::Unbounded(tx) => tx
                .send(event.clone())
                .map_err(|_| SinkError::Disconnected),
            QueueSender::Bounded(tx) => tx.try_send(event.clone()).map_err(|e| match e {
                TrySendError::Full(_) => SinkError::Full,
                TrySendError::Disconnected(_) => SinkError::Disconnected,
            }),
        }
    }
}

/// Consumer side of an ad id's event stream.
///
/// Once the id is destroyed (or the subscription replaced) the sender side
/// is dropped: buffered events can still be drained, then `recv_timeout`
/// returns `None` immediately.
pub struct EventReceiver {
    receiver: mpsc::Receiver<AdEvent>,
}

impl EventReceiver {
    /// Block until the next event, or `None` once the sender side is gone
    /// and the queue is empty.
    pub fn recv(&self) -> Option<AdEvent> {
        self.receiver.recv().ok()
    }

    /// Wait up to `timeout` for the next event.
    pub fn recv_timeout(&self, timeout: Duration) -> Option<AdEvent> {
        match self.receiver.recv_timeout(timeout) {
            Ok(event) => Some(event),
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => None,
        }
    }

    /// Next event if one is already queued.
    pub fn try_recv(&self) -> Option<AdEvent> {
        self.receiver.try_recv().ok()
    }

    /// Drain everything currently queued.
    pub fn drain(&self) -> Vec<AdEvent> {
        self.receiver.try_iter().collect()
    }
}
