//! Ad instance: one reward ad's lifecycle state around its engine.
//!
//! ```text
//! Created ──load──► Loading ──on_loaded──► Loaded ──show──► Shown ──pause──► Paused
//!    ▲                 │                                      ▲  ◄──resume── Resumed
//!    │                 └──on_load_failed──► Failed ──load──┐  │
//!    └──────────────────────────────────────────────────────┘  (any) ──destroy──► Destroyed
//! ```

use std::fmt;
use std::sync::{Arc, Mutex, Weak};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, trace};

use crate::broadcast::{AdEvent, EventBroadcaster};
use crate::engine::{AdEngine, LoadRequest};
use crate::error::AdError;
use crate::method::Method;

/// Caller-chosen identifier of an ad instance.
pub type AdId = i64;

/// Distinguishes successive instances created under the same id.
pub type Generation = u64;

/// Shared, independently lockable handle to one ad instance.
pub type InstanceHandle = Arc<Mutex<AdInstance>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleState {
    Created,
    Loading,
    Loaded,
    Failed,
    Shown,
    Paused,
    Resumed,
    Destroyed,
}

impl LifecycleState {
    /// Whether a `load` would start a new engine load from this state.
    pub fn accepts_load(&self) -> bool {
        matches!(self, LifecycleState::Created | LifecycleState::Failed)
    }

    /// Whether the ad has been shown, which `pause`/`resume` require.
    pub fn was_shown(&self) -> bool {
        matches!(
            self,
            LifecycleState::Shown | LifecycleState::Paused | LifecycleState::Resumed
        )
    }
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LifecycleState::Created => "created",
            LifecycleState::Loading => "loading",
            LifecycleState::Loaded => "loaded",
            LifecycleState::Failed => "failed",
            LifecycleState::Shown => "shown",
            LifecycleState::Paused => "paused",
            LifecycleState::Resumed => "resumed",
            LifecycleState::Destroyed => "destroyed",
        };
        f.write_str(name)
    }
}

/// Reward granted by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reward {
    pub name: String,
    pub amount: i64,
}

impl Reward {
    pub fn new(name: impl Into<String>, amount: i64) -> Self {
        Self {
            name: name.into(),
            amount,
        }
    }
}

/// Callback handle given to the engine with every `load` and `show`.
///
/// Holds only a weak reference to its instance: once the instance is
/// destroyed and dropped, callbacks fall on the floor.
#[derive(Clone)]
pub struct AdListener {
    id: AdId,
    generation: Generation,
    instance: Weak<Mutex<AdInstance>>,
    events: Arc<EventBroadcaster>,
}

impl AdListener {
    pub fn id(&self) -> AdId {
        self.id
    }

    pub fn on_loaded(&self) {
        self.deliver(AdEvent::Loaded);
    }

    pub fn on_load_failed(&self, code: i32, reason: &str) {
        self.deliver(AdEvent::LoadFailed {
            code,
            reason: reason.to_string(),
        });
    }

    pub fn on_opened(&self) {
        self.deliver(AdEvent::Opened);
    }

    pub fn on_show_failed(&self, code: i32, reason: &str) {
        self.deliver(AdEvent::ShowFailed {
            code,
            reason: reason.to_string(),
        });
    }

    pub fn on_impression(&self) {
        self.deliver(AdEvent::Impression);
    }

    pub fn on_clicked(&self) {
        self.deliver(AdEvent::Clicked);
    }

    pub fn on_completed(&self) {
        self.deliver(AdEvent::Completed);
    }

    pub fn on_left_app(&self) {
        self.deliver(AdEvent::LeftApp);
    }

    pub fn on_rewarded(&self, reward: Reward) {
        self.deliver(AdEvent::Rewarded {
            name: reward.name,
            amount: reward.amount,
        });
    }

    pub fn on_closed(&self) {
        self.deliver(AdEvent::Closed);
    }

    /// Apply `event` to the instance and forward it, both under the
    /// instance lock so the subscriber sees callbacks in engine order.
    fn deliver(&self, event: AdEvent) {
        let Some(instance) = self.instance.upgrade() else {
            trace!(ad_id = self.id, event = event.name(), "instance gone, callback dropped");
            return;
        };
        let mut instance = match instance.lock() {
            Ok(instance) => instance,
            Err(_) => {
                debug!(ad_id = self.id, event = event.name(), "instance poisoned, callback dropped");
                return;
            }
        };
        if instance.state == LifecycleState::Destroyed {
            trace!(ad_id = self.id, event = event.name(), "instance destroyed, callback dropped");
            return;
        }
        instance.apply(&event);
        self.events.emit(self.id, self.generation, &event);
    }
}

/// One reward ad. Owned by the registry behind an [`InstanceHandle`].
pub struct AdInstance {
    id: AdId,
    generation: Generation,
    state: LifecycleState,
    engine: Box<dyn AdEngine>,
    listener: AdListener,
    user_id: Option<String>,
    data: Option<String>,
    reward_verify_config: Option<Map<String, Value>>,
    reward: Option<Reward>,
}

impl AdInstance {
    /// Wrap `engine` in a new instance in state `Created`.
    pub fn create(
        id: AdId,
        generation: Generation,
        engine: Box<dyn AdEngine>,
        events: Arc<EventBroadcaster>,
    ) -> InstanceHandle {
        Arc::new_cyclic(|weak| {
            Mutex::new(AdInstance {
                id,
                generation,
                state: LifecycleState::Created,
                engine,
                listener: AdListener {
                    id,
                    generation,
                    instance: weak.clone(),
                    events,
                },
                user_id: None,
                data: None,
                reward_verify_config: None,
                reward: None,
            })
        })
    }

    pub fn id(&self) -> AdId {
        self.id
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }

    pub fn data(&self) -> Option<&str> {
        self.data.as_deref()
    }

    pub fn reward_verify_config(&self) -> Option<&Map<String, Value>> {
        self.reward_verify_config.as_ref()
    }

    pub fn is_destroyed(&self) -> bool {
        self.state == LifecycleState::Destroyed
    }

    fn ensure_live(&self, method: Method) -> Result<(), AdError> {
        if self.is_destroyed() {
            return Err(AdError::NotFound {
                id: self.id,
                method: method.name(),
            });
        }
        Ok(())
    }

    /// Start loading. Returns `false` without touching the engine when a
    /// load is already in flight or has succeeded.
    pub fn load(&mut self, request: LoadRequest) -> Result<bool, AdError> {
        self.ensure_live(Method::Load)?;
        if !self.state.accepts_load() {
            debug!(ad_id = self.id, state = %self.state, "load skipped");
            return Ok(false);
        }

        if let Some(user_id) = &request.user_id {
            self.user_id = Some(user_id.clone());
        }
        if let Some(data) = &request.data {
            self.data = Some(data.clone());
        }
        if let Some(config) = &request.reward_verify_config {
            if !config.is_empty() {
                self.reward_verify_config = Some(config.clone());
            }
        }

        self.state = LifecycleState::Loading;
        debug!(ad_id = self.id, slot_id = %request.slot_id, "loading");
        self.engine.load(&request, self.listener.clone());
        Ok(true)
    }

    pub fn show(&mut self) -> Result<(), AdError> {
        self.ensure_live(Method::Show)?;
        if self.state == LifecycleState::Loaded {
            self.state = LifecycleState::Shown;
        }
        self.engine.show(self.listener.clone());
        Ok(())
    }

    pub fn reward(&self) -> Result<Reward, AdError> {
        self.ensure_live(Method::GetReward)?;
        self.reward
            .clone()
            .or_else(|| self.engine.reward())
            .ok_or(AdError::NoReward { id: self.id })
    }

    pub fn is_loaded(&self) -> Result<bool, AdError> {
        self.ensure_live(Method::IsAdLoaded)?;
        Ok(self.state == LifecycleState::Loaded)
    }

    /// Pause a shown ad. Before `show` this is a tolerated no-op; returns
    /// whether the engine was called.
    pub fn pause(&mut self) -> Result<bool, AdError> {
        self.ensure_live(Method::Pause)?;
        if !self.state.was_shown() {
            debug!(ad_id = self.id, state = %self.state, "pause ignored");
            return Ok(false);
        }
        self.engine.pause();
        self.state = LifecycleState::Paused;
        Ok(true)
    }

    /// Resume a shown ad. Same no-op rule as [`AdInstance::pause`].
    pub fn resume(&mut self) -> Result<bool, AdError> {
        self.ensure_live(Method::Resume)?;
        if !self.state.was_shown() {
            debug!(ad_id = self.id, state = %self.state, "resume ignored");
            return Ok(false);
        }
        self.engine.resume();
        self.state = LifecycleState::Resumed;
        Ok(true)
    }

    /// Release the engine and mark the instance destroyed.
    pub fn destroy(&mut self) -> Result<(), AdError> {
        self.ensure_live(Method::Destroy)?;
        self.engine.destroy();
        self.state = LifecycleState::Destroyed;
        Ok(())
    }

    fn apply(&mut self, event: &AdEvent) {
        match event {
            AdEvent::Loaded if self.state == LifecycleState::Loading => {
                self.state = LifecycleState::Loaded;
            }
            AdEvent::LoadFailed { .. } if self.state == LifecycleState::Loading => {
                self.state = LifecycleState::Failed;
            }
            AdEvent::Opened if self.state == LifecycleState::Loaded => {
                self.state = LifecycleState::Shown;
            }
            AdEvent::Rewarded { name, amount } => {
                self.reward = Some(Reward::new(name.clone(), *amount));
            }
            _ => {}
        }
        trace!(ad_id = self.id, event = event.name(), state = %self.state, "callback applied");
    }
}
