//! Reward ad method handlers, one file per method.
//!
//! Each handler module exports:
//! - `METHOD: &str`: the wire name
//! - `handle(ctx) -> Result<Value, AdError>`: the handler
//!
//! Handlers resolve the id before validating the remaining arguments, so
//! any call against an id that was never initialized is `NotFound`.

pub mod destroy;
pub mod get_reward;
pub mod init;
pub mod is_ad_loaded;
pub mod load;
pub mod pause;
pub mod resume;
pub mod show;
