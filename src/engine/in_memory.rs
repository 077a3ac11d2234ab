//! In-memory ad engine for testing and single-process scenarios.
//!
//! The engine records every call it receives and keeps the last listener
//! it was handed, so a test (or a simulator) can play the part of the ad
//! network by firing callbacks whenever it likes, including after the ad
//! was destroyed.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde_json::{Map, Value};

use super::{AdEngine, AdEngineFactory, EngineError, LoadRequest};
use crate::instance::{AdId, AdListener, Reward};

/// A call received by an [`InMemoryEngine`].
#[derive(Debug, Clone, PartialEq)]
pub enum EngineCall {
    Load {
        slot_id: String,
        params: Map<String, Value>,
    },
    Show,
    Pause,
    Resume,
    Destroy,
}

#[derive(Default)]
struct EngineState {
    calls: Vec<EngineCall>,
    listener: Option<AdListener>,
    destroyed: bool,
    reward: Option<Reward>,
}

/// Call-recording engine. Clones share the same state.
///
/// ## Example
///
/// ```ignore
/// let factory = InMemoryEngineFactory::new();
/// let ads = RewardAds::new(factory.clone());
/// ads.init(1)?;
/// ads.load(1, LoadRequest::new("slot", Map::new()))?;
///
/// // Play the ad network: report a successful load.
/// factory.engine(1).unwrap().fire_loaded();
/// assert!(ads.is_loaded(1)?);
/// ```
#[derive(Clone, Default)]
pub struct InMemoryEngine {
    state: Arc<Mutex<EngineState>>,
}

impl InMemoryEngine {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, EngineState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// All calls received so far, in order.
    pub fn calls(&self) -> Vec<EngineCall> {
        self.state().calls.clone()
    }

    /// Number of `load` calls received.
    pub fn load_count(&self) -> usize {
        self.state()
            .calls
            .iter()
            .filter(|c| matches!(c, EngineCall::Load { .. }))
            .count()
    }

    pub fn is_destroyed(&self) -> bool {
        self.state().destroyed
    }

    /// The listener from the most recent `load` or `show`.
    pub fn listener(&self) -> Option<AdListener> {
        self.state().listener.clone()
    }

    // Callbacks are fired outside the engine lock: the listener locks the
    // ad instance, and the instance may be calling into this engine.

    pub fn fire_loaded(&self) {
        if let Some(listener) = self.listener() {
            listener.on_loaded();
        }
    }

    pub fn fire_load_failed(&self, code: i32, reason: &str) {
        if let Some(listener) = self.listener() {
            listener.on_load_failed(code, reason);
        }
    }

    pub fn fire_opened(&self) {
        if let Some(listener) = self.listener() {
            listener.on_opened();
        }
    }

    pub fn fire_show_failed(&self, code: i32, reason: &str) {
        if let Some(listener) = self.listener() {
            listener.on_show_failed(code, reason);
        }
    }

    pub fn fire_impression(&self) {
        if let Some(listener) = self.listener() {
            listener.on_impression();
        }
    }

    pub fn fire_clicked(&self) {
        if let Some(listener) = self.listener() {
            listener.on_clicked();
        }
    }

    pub fn fire_completed(&self) {
        if let Some(listener) = self.listener() {
            listener.on_completed();
        }
    }

    pub fn fire_left_app(&self) {
        if let Some(listener) = self.listener() {
            listener.on_left_app();
        }
    }

    /// Grant a reward; the engine also remembers it for [`AdEngine::reward`].
    pub fn fire_rewarded(&self, name: &str, amount: i64) {
        let reward = Reward::new(name, amount);
        self.state().reward = Some(reward.clone());
        if let Some(listener) = self.listener() {
            listener.on_rewarded(reward);
        }
    }

    pub fn fire_closed(&self) {
        if let Some(listener) = self.listener() {
            listener.on_closed();
        }
    }
}

impl AdEngine for InMemoryEngine {
    fn load(&mut self, request: &LoadRequest, listener: AdListener) {
        let mut state = self.state();
        state.calls.push(EngineCall::Load {
            slot_id: request.slot_id.clone(),
            params: request.params.clone(),
        });
        state.listener = Some(listener);
    }

    fn show(&mut self, listener: AdListener) {
        let mut state = self.state();
        state.calls.push(EngineCall::Show);
        state.listener = Some(listener);
    }

    fn pause(&mut self) {
        self.state().calls.push(EngineCall::Pause);
    }

    fn resume(&mut self) {
        self.state().calls.push(EngineCall::Resume);
    }

    fn destroy(&mut self) {
        let mut state = self.state();
        state.calls.push(EngineCall::Destroy);
        state.destroyed = true;
    }

    fn reward(&self) -> Option<Reward> {
        self.state().reward.clone()
    }
}

#[derive(Default)]
struct FactoryState {
    engines: HashMap<AdId, Vec<InMemoryEngine>>,
    unavailable: Option<String>,
}

/// Factory handing out [`InMemoryEngine`]s and keeping a handle to each.
#[derive(Clone, Default)]
pub struct InMemoryEngineFactory {
    state: Arc<Mutex<FactoryState>>,
}

impl InMemoryEngineFactory {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, FactoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Make subsequent `create` calls fail with `reason` (`None` restores).
    pub fn set_unavailable(&self, reason: Option<&str>) {
        self.state().unavailable = reason.map(str::to_string);
    }

    /// The most recent engine created for `id`.
    pub fn engine(&self, id: AdId) -> Option<InMemoryEngine> {
        self.state()
            .engines
            .get(&id)
            .and_then(|engines| engines.last().cloned())
    }

    /// Every engine created for `id`, oldest first.
    pub fn engines(&self, id: AdId) -> Vec<InMemoryEngine> {
        self.state().engines.get(&id).cloned().unwrap_or_default()
    }
}

impl AdEngineFactory for InMemoryEngineFactory {
    fn create(&self, id: AdId) -> Result<Box<dyn AdEngine>, EngineError> {
        let mut state = self.state();
        if let Some(reason) = &state.unavailable {
            return Err(EngineError(reason.clone()));
        }
        let engine = InMemoryEngine::new();
        state.engines.entry(id).or_default().push(engine.clone());
        Ok(Box::new(engine))
    }
}
