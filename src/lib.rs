//! Reward ads: named-method dispatch over a registry of per-id ad
//! instances, with lifecycle events delivered on a per-id stream.
//!
//! ```text
//!  caller ──MethodCall──► Dispatcher ──► RewardAds ──► InstanceRegistry ──► AdInstance ──► AdEngine
//!     ▲                                      │                                   ▲            │
//!     │                                      ▼                                   └─AdListener◄┘
//!     └──────── EventReceiver ◄──────── EventBroadcaster ◄──────────────────────────┘
//! ```
//!
//! The ad engine itself (fetching, rendering, rewarding) sits behind the
//! [`AdEngine`] trait. [`InMemoryEngine`] stands in for it in tests.

mod broadcast;
mod config;
pub mod dispatch;
mod engine;
mod error;
mod instance;
mod method;
mod registry;
mod runtime;

pub use broadcast::{
    channel, AdEvent, ChannelSink, EventBroadcaster, EventReceiver, EventSink, SinkError,
};
pub use config::{ReinitPolicy, RewardAdsConfig};
pub use dispatch::{Context, Dispatcher, MethodCall, MethodResponse};
pub use engine::{
    AdEngine, AdEngineFactory, EngineCall, EngineError, InMemoryEngine, InMemoryEngineFactory,
    LoadRequest,
};
pub use error::{AdError, ErrorCode};
pub use instance::{
    AdId, AdInstance, AdListener, Generation, InstanceHandle, LifecycleState, Reward,
};
pub use method::{AdType, Method};
pub use registry::InstanceRegistry;
pub use runtime::RewardAds;
