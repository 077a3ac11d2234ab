//! Named method dispatch for reward ads.
//!
//! A caller sends a method name plus an argument bag; the `Dispatcher`
//! validates the arguments, resolves the ad id against the registry and
//! runs the matching operation on [`crate::RewardAds`]. Asynchronous
//! outcomes (load result, rewards) are not part of the response; they
//! arrive on the id's event stream.
//!
//! ## Quick Start
//!
//! ```
//! use std::sync::Arc;
//! use reward_ads::{Dispatcher, InMemoryEngineFactory, MethodCall, MethodResponse, RewardAds};
//! use serde_json::json;
//!
//! let dispatcher = Dispatcher::reward_ads(Arc::new(RewardAds::new(InMemoryEngineFactory::new())));
//!
//! dispatcher.dispatch("initRewardAd", json!({ "id": 7 })).unwrap();
//! let response = dispatcher.handle(&MethodCall::new(
//!     "loadRewardAd",
//!     json!({ "id": 7, "adSlotId": "testx9dtjwj8hp", "adParam": {} }),
//! ));
//! assert_eq!(response, MethodResponse::Success { value: json!(true) });
//!
//! // Unknown methods are reported, not failed.
//! let response = dispatcher.handle(&MethodCall::new("loadBannerAd", json!({})));
//! assert_eq!(response, MethodResponse::NotImplemented);
//! ```
//!
//! ## Handler Convention
//!
//! ```ignore
//! // src/dispatch/handlers/show.rs
//!
//! pub const METHOD: &str = Method::Show.name();
//!
//! pub fn handle(ctx: &Context<'_>) -> Result<Value, AdError> {
//!     let id = ctx.id()?;
//!     ctx.ads().show(id)?;
//!     Ok(json!(true))
//! }
//! ```

mod context;
pub mod handlers;
mod service;

pub use context::Context;
pub use service::{Dispatcher, MethodCall, MethodResponse};

// HTTP transport (requires "http" feature)
#[cfg(feature = "http")]
mod http;
#[cfg(feature = "http")]
pub use http::{router, serve};

/// Register handler modules with a dispatcher using the convention pattern.
///
/// Each handler module must export:
/// - `METHOD: &str`: the method name
/// - `handle(ctx) -> Result<Value, AdError>`: the handler
///
/// # Example
/// ```ignore
/// let dispatcher = reward_ads::register_handlers!(
///     Dispatcher::new(ads),
///     handlers::init,
///     handlers::load,
/// );
/// ```
#[macro_export]
macro_rules! register_handlers {
    ($dispatcher:expr, $( $($seg:ident)::+ ),+ $(,)?) => {
        $dispatcher
        $(
            .command(
                $($seg)::+::METHOD,
                $($seg)::+::handle,
            )
        )+
    };
}
