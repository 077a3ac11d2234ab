//! Runtime configuration.

use serde::{Deserialize, Serialize};

/// What `initRewardAd` does when the id already has a live instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReinitPolicy {
    /// Destroy the previous instance (engine and event channel), then
    /// install the new one.
    #[default]
    Replace,
    /// Fail with `DUPLICATE_ID` and keep the existing instance.
    Reject,
}

/// Configuration for [`crate::RewardAds`].
///
/// ```
/// use reward_ads::{ReinitPolicy, RewardAdsConfig};
///
/// let config = RewardAdsConfig::from_json(r#"{ "reinit_policy": "reject", "event_buffer": 64 }"#).unwrap();
/// assert_eq!(config.reinit_policy, ReinitPolicy::Reject);
/// assert_eq!(config.event_buffer, Some(64));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RewardAdsConfig {
    pub reinit_policy: ReinitPolicy,
    /// Capacity of each id's event queue. `None` is unbounded; when bounded,
    /// events that do not fit are dropped rather than blocking the engine.
    pub event_buffer: Option<usize>,
}

impl RewardAdsConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn with_reinit_policy(mut self, policy: ReinitPolicy) -> Self {
        self.reinit_policy = policy;
        self
    }

    pub fn with_event_buffer(mut self, capacity: usize) -> Self {
        self.event_buffer = Some(capacity);
        self
    }
}
