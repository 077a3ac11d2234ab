//! Ad engine seam.
//!
//! The engine is the black box that fetches, renders and rewards an ad.
//! Each ad instance owns one engine. Outcomes are never returned from the
//! engine methods; they are reported later through the [`AdListener`]
//! handed to `load` and `show`.
//!
//! ```text
//!  AdInstance ──load/show/pause/resume/destroy──► AdEngine
//!      ▲                                            │
//!      └──────────── AdListener callbacks ◄─────────┘
//! ```
//!
//! Engines must not call the listener re-entrantly from inside `load` or
//! `show`: the instance is locked for the duration of those calls. Deliver
//! callbacks from the engine's own thread, task or completion handler.

mod in_memory;

use std::error::Error;
use std::fmt;

use serde_json::{Map, Value};

pub use in_memory::{EngineCall, InMemoryEngine, InMemoryEngineFactory};

use crate::instance::{AdId, AdListener, Reward};

/// Parameters for a single load, assembled by the dispatcher.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadRequest {
    pub slot_id: String,
    pub params: Map<String, Value>,
    pub user_id: Option<String>,
    pub data: Option<String>,
    pub reward_verify_config: Option<Map<String, Value>>,
}

impl LoadRequest {
    pub fn new(slot_id: impl Into<String>, params: Map<String, Value>) -> Self {
        Self {
            slot_id: slot_id.into(),
            params,
            user_id: None,
            data: None,
            reward_verify_config: None,
        }
    }

    pub fn with_user_id(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    pub fn with_data(mut self, data: impl Into<String>) -> Self {
        self.data = Some(data.into());
        self
    }

    /// Set the server-side reward verification config. Empty maps are ignored.
    pub fn with_reward_verify_config(mut self, config: Map<String, Value>) -> Self {
        if !config.is_empty() {
            self.reward_verify_config = Some(config);
        }
        self
    }
}

/// A single ad's engine.
pub trait AdEngine: Send {
    /// Start loading an ad for `request.slot_id`. Completion is reported via
    /// `listener.on_loaded()` or `listener.on_load_failed(..)`.
    fn load(&mut self, request: &LoadRequest, listener: AdListener);

    /// Present the loaded ad. Rejections are reported via
    /// `listener.on_show_failed(..)`.
    fn show(&mut self, listener: AdListener);

    fn pause(&mut self);

    fn resume(&mut self);

    /// Release engine resources. Callbacks arriving afterwards are dropped.
    fn destroy(&mut self);

    /// The engine's own view of the last granted reward, if it keeps one.
    fn reward(&self) -> Option<Reward> {
        None
    }
}

/// Error allocating an engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineError(pub String);

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "engine error: {}", self.0)
    }
}

impl Error for EngineError {}

/// Allocates one engine per initialized ad id.
pub trait AdEngineFactory: Send + Sync {
    fn create(&self, id: AdId) -> Result<Box<dyn AdEngine>, EngineError>;
}

impl<F> AdEngineFactory for F
where
    F: Fn(AdId) -> Result<Box<dyn AdEngine>, EngineError> + Send + Sync,
{
    fn create(&self, id: AdId) -> Result<Box<dyn AdEngine>, EngineError> {
        self(id)
    }
}
