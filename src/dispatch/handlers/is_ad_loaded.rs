//! Handler: isAdLoaded
//!
//! `true` only once the engine has reported a successful load.

use serde_json::{json, Value};

use crate::dispatch::Context;
use crate::error::AdError;
use crate::method::{AdType, Method};

pub const METHOD: &str = Method::IsAdLoaded.name();

pub fn handle(ctx: &Context<'_>) -> Result<Value, AdError> {
    let id = ctx.id()?;
    ctx.ads().registry().require(id, Method::IsAdLoaded)?;
    ctx.expect_ad_type(id, AdType::Reward)?;
    let loaded = ctx.ads().is_loaded(id)?;
    Ok(json!(loaded))
}
