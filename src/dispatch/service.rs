//! Method table and dispatch for the reward ad surface.
//!
//! `Dispatcher` holds the runtime and a set of named method handlers.
//! Each handler receives a `Context` and returns `Result<Value, AdError>`.
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use reward_ads::{Dispatcher, InMemoryEngineFactory, RewardAds};
//! use serde_json::json;
//!
//! let ads = Arc::new(RewardAds::new(InMemoryEngineFactory::new()));
//! let dispatcher = Dispatcher::reward_ads(ads);
//!
//! dispatcher.dispatch("initRewardAd", json!({ "id": 1 })).unwrap();
//! let loaded = dispatcher
//!     .dispatch("isAdLoaded", json!({ "id": 1, "adType": "Reward" }))
//!     .unwrap();
//! assert_eq!(loaded, json!(false));
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use super::context::Context;
use super::handlers;
use crate::error::{AdError, ErrorCode};
use crate::runtime::RewardAds;

type Handler = Box<dyn Fn(&Context<'_>) -> Result<Value, AdError> + Send + Sync>;

/// Routes named method calls to handler functions.
pub struct Dispatcher {
    ads: Arc<RewardAds>,
    handlers: HashMap<&'static str, Handler>,
}

impl Dispatcher {
    /// Create a dispatcher with no methods registered.
    pub fn new(ads: Arc<RewardAds>) -> Self {
        Self {
            ads,
            handlers: HashMap::new(),
        }
    }

    /// Create a dispatcher with every reward ad method registered.
    pub fn reward_ads(ads: Arc<RewardAds>) -> Self {
        crate::register_handlers!(
            Self::new(ads),
            handlers::init,
            handlers::load,
            handlers::show,
            handlers::get_reward,
            handlers::is_ad_loaded,
            handlers::pause,
            handlers::resume,
            handlers::destroy,
        )
    }

    /// Register a method handler.
    ///
    /// Builder style: returns `self` for chaining.
    pub fn command<F>(mut self, method: &'static str, handler: F) -> Self
    where
        F: Fn(&Context<'_>) -> Result<Value, AdError> + Send + Sync + 'static,
    {
        self.handlers.insert(method, Box::new(handler));
        self
    }

    /// Dispatch a method call by name.
    ///
    /// Unknown names fail with `AdError::NotImplemented`.
    pub fn dispatch(&self, method: &str, args: Value) -> Result<Value, AdError> {
        let (&name, handler) = self
            .handlers
            .get_key_value(method)
            .ok_or_else(|| AdError::NotImplemented(method.to_string()))?;

        debug!(method = name, "dispatching");
        let ctx = Context::new(name, args, &self.ads);
        let result = handler(&ctx);
        if let Err(e) = &result {
            debug!(method = name, code = %e.code(), ad_id = ?e.id(), "method failed");
        }
        result
    }

    /// Dispatch a `MethodCall`, returning a `MethodResponse`.
    pub fn handle(&self, call: &MethodCall) -> MethodResponse {
        MethodResponse::from_result(self.dispatch(&call.method, call.arguments.clone()))
    }

    /// List registered method names.
    pub fn methods(&self) -> Vec<&'static str> {
        self.handlers.keys().copied().collect()
    }

    pub fn ads(&self) -> &Arc<RewardAds> {
        &self.ads
    }
}

// =============================================================================
// Call / Response types
// =============================================================================

/// An inbound method call.
///
/// ```json
/// { "method": "loadRewardAd", "arguments": { "id": 1, "adSlotId": "testx9dtjwj8hp", "adParam": {} } }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodCall {
    pub method: String,
    #[serde(default)]
    pub arguments: Value,
}

impl MethodCall {
    pub fn new(method: impl Into<String>, arguments: Value) -> Self {
        Self {
            method: method.into(),
            arguments,
        }
    }
}

/// Outcome of a method call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum MethodResponse {
    Success {
        value: Value,
    },
    Error {
        code: ErrorCode,
        message: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        details: Option<Value>,
    },
    /// The method name is not one this dispatcher knows.
    NotImplemented,
}

impl MethodResponse {
    pub fn from_result(result: Result<Value, AdError>) -> Self {
        match result {
            Ok(value) => MethodResponse::Success { value },
            Err(AdError::NotImplemented(_)) => MethodResponse::NotImplemented,
            Err(e) => MethodResponse::Error {
                code: e.code(),
                message: e.to_string(),
                details: e.details(),
            },
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, MethodResponse::Success { .. })
    }

    pub fn error_code(&self) -> Option<ErrorCode> {
        match self {
            MethodResponse::Error { code, .. } => Some(*code),
            _ => None,
        }
    }
}
