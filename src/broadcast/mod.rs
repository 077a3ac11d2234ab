//! Per-id event broadcaster.
//!
//! Each initialized ad id owns one subscription slot. The slot is opened at
//! init with a queue whose receiver waits until the caller subscribes, so
//! events are buffered rather than lost when they fire before anyone
//! listens. Destroying the ad removes the slot; anything emitted for the id
//! afterwards is dropped.
//!
//! ```text
//!  engine callback ──► AdListener ──► EventBroadcaster::emit(id, gen, event)
//!                                           │ (queue push only)
//!                          ┌────────────────┴─────────────────┐
//!                          ▼                                  ▼
//!                   ChannelSink ─► EventReceiver       ChannelSink ─► forwarding thread ─► attached sink
//! ```
//!
//! The producer side never runs caller code: an attached sink is fed from
//! its own queue on a forwarding thread, outside every lock, so it may
//! block or call back into [`crate::RewardAds`].
//!
//! Slots are tagged with the generation of the instance that opened them.
//! A callback from an instance that was since replaced under the same id
//! carries a stale generation and is dropped.

mod event;
mod sink;

use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};
use std::thread;

use tracing::{debug, trace, warn};

pub use event::AdEvent;
pub use sink::{channel, ChannelSink, EventReceiver, EventSink, SinkError};

use crate::error::AdError;
use crate::instance::{AdId, Generation};

struct Subscription {
    generation: Generation,
    /// `None` while detached; events are dropped until a new sink arrives.
    queue: Option<Arc<ChannelSink>>,
    /// Receiver created at `open`, waiting for the first `subscribe`.
    pending: Mutex<Option<EventReceiver>>,
}

/// Routes events to the single consumer registered for each ad id.
pub struct EventBroadcaster {
    subscriptions: RwLock<HashMap<AdId, Subscription>>,
    capacity: Option<usize>,
}

impl Default for EventBroadcaster {
    fn default() -> Self {
        Self::new(None)
    }
}

impl EventBroadcaster {
    /// Create a broadcaster whose per-id queues hold at most `capacity`
    /// events (`None` = unbounded).
    pub fn new(capacity: Option<usize>) -> Self {
        Self {
            subscriptions: RwLock::new(HashMap::new()),
            capacity,
        }
    }

    /// Open (or reopen) the slot for `id` on behalf of instance `generation`.
    pub fn open(&self, id: AdId, generation: Generation) -> Result<(), AdError> {
        let (queue, receiver) = channel(self.capacity);
        let mut subscriptions = self
            .subscriptions
            .write()
            .map_err(|_| AdError::LockPoisoned("event broadcaster open"))?;
        subscriptions.insert(
            id,
            Subscription {
                generation,
                queue: Some(Arc::new(queue)),
                pending: Mutex::new(Some(receiver)),
            },
        );
        debug!(ad_id = id, generation, "event channel opened");
        Ok(())
    }

    /// Register `sink` as the one consumer for `id`, replacing any previous
    /// sink or receiver.
    ///
    /// The sink runs on a dedicated forwarding thread that lives until the
    /// slot's queue is replaced, detached or removed.
    pub fn attach<S>(&self, id: AdId, sink: S) -> Result<(), AdError>
    where
        S: EventSink + 'static,
    {
        let receiver = self.install(id, "attach")?;
        thread::spawn(move || forward(id, receiver, sink));
        debug!(ad_id = id, "event sink attached");
        Ok(())
    }

    /// Take the receiving end of `id`'s event queue.
    ///
    /// The first call returns the receiver opened at init, including any
    /// events buffered since. Later calls install a fresh queue, which
    /// disconnects the previous receiver or attached sink.
    pub fn subscribe(&self, id: AdId) -> Result<EventReceiver, AdError> {
        {
            let mut subscriptions = self
                .subscriptions
                .write()
                .map_err(|_| AdError::LockPoisoned("event broadcaster subscribe"))?;
            let subscription = subscriptions.get_mut(&id).ok_or(AdError::NotFound {
                id,
                method: "subscribe",
            })?;
            let pending = subscription
                .pending
                .get_mut()
                .map_err(|_| AdError::LockPoisoned("event broadcaster subscribe"))?
                .take();
            if let Some(receiver) = pending {
                return Ok(receiver);
            }
        }

        let receiver = self.install(id, "subscribe")?;
        debug!(ad_id = id, "event channel resubscribed");
        Ok(receiver)
    }

    /// Put a fresh queue into `id`'s slot and hand back its receiver.
    fn install(&self, id: AdId, method: &'static str) -> Result<EventReceiver, AdError> {
        let (queue, receiver) = channel(self.capacity);
        let mut subscriptions = self
            .subscriptions
            .write()
            .map_err(|_| AdError::LockPoisoned("event broadcaster install"))?;
        let subscription = subscriptions
            .get_mut(&id)
            .ok_or(AdError::NotFound { id, method })?;
        subscription.queue = Some(Arc::new(queue));
        subscription.pending = Mutex::new(None);
        Ok(receiver)
    }

    /// Stop delivering `id`'s events while keeping its slot, so a later
    /// `attach` or `subscribe` can install a new consumer. Returns whether a
    /// consumer was removed.
    pub fn detach(&self, id: AdId) -> Result<bool, AdError> {
        let mut subscriptions = self
            .subscriptions
            .write()
            .map_err(|_| AdError::LockPoisoned("event broadcaster detach"))?;
        let Some(subscription) = subscriptions.get_mut(&id) else {
            return Ok(false);
        };
        subscription.pending = Mutex::new(None);
        let removed = subscription.queue.take().is_some();
        if removed {
            debug!(ad_id = id, "event consumer detached");
        }
        Ok(removed)
    }

    /// Remove the slot for `id` only if it still belongs to `generation`.
    pub fn detach_generation(&self, id: AdId, generation: Generation) -> Result<bool, AdError> {
        let mut subscriptions = self
            .subscriptions
            .write()
            .map_err(|_| AdError::LockPoisoned("event broadcaster detach"))?;
        match subscriptions.get(&id) {
            Some(subscription) if subscription.generation == generation => {
                subscriptions.remove(&id);
                debug!(ad_id = id, generation, "event channel closed");
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    /// Queue `event` for `id`'s consumer if the slot belongs to `generation`.
    ///
    /// Never blocks and never fails on the caller: missing slots, stale
    /// generations, detached slots and full or abandoned queues are logged
    /// and the event is dropped.
    pub fn emit(&self, id: AdId, generation: Generation, event: &AdEvent) -> bool {
        let queue = {
            let subscriptions = match self.subscriptions.read() {
                Ok(subscriptions) => subscriptions,
                Err(_) => {
                    warn!(ad_id = id, event = event.name(), "event broadcaster poisoned");
                    return false;
                }
            };
            let Some(subscription) = subscriptions.get(&id) else {
                trace!(ad_id = id, event = event.name(), "no event channel, dropped");
                return false;
            };
            if subscription.generation != generation {
                trace!(
                    ad_id = id,
                    generation,
                    event = event.name(),
                    "stale generation, dropped"
                );
                return false;
            }
            match &subscription.queue {
                Some(queue) => Arc::clone(queue),
                None => {
                    trace!(ad_id = id, event = event.name(), "detached, dropped");
                    return false;
                }
            }
        };

        match queue.deliver(event) {
            Ok(()) => true,
            Err(SinkError::Full) => {
                warn!(ad_id = id, event = event.name(), "event queue full, dropped");
                false
            }
            Err(SinkError::Disconnected) => {
                debug!(ad_id = id, event = event.name(), "subscriber gone, dropped");
                false
            }
        }
    }

    /// Whether `id` has a slot, attached or not.
    pub fn is_open(&self, id: AdId) -> bool {
        self.subscriptions
            .read()
            .map(|subscriptions| subscriptions.contains_key(&id))
            .unwrap_or(false)
    }

    /// Remove every slot (shutdown). Forwarding threads exit once their
    /// queues drain.
    pub fn clear(&self) -> Result<(), AdError> {
        self.subscriptions
            .write()
            .map_err(|_| AdError::LockPoisoned("event broadcaster clear"))?
            .clear();
        Ok(())
    }
}

/// Feed `sink` from `receiver` until the queue closes or the sink hangs up.
fn forward<S: EventSink>(id: AdId, receiver: EventReceiver, sink: S) {
    while let Some(event) = receiver.recv() {
        match sink.deliver(&event) {
            Ok(()) => {}
            Err(SinkError::Full) => {
                warn!(ad_id = id, event = event.name(), "attached sink full, dropped");
            }
            Err(SinkError::Disconnected) => {
                debug!(ad_id = id, "attached sink gone");
                return;
            }
        }
    }
    trace!(ad_id = id, "event forwarding finished");
}
