//! Handler: resumeAd

use serde_json::{json, Value};

use crate::dispatch::Context;
use crate::error::AdError;
use crate::method::{AdType, Method};

pub const METHOD: &str = Method::Resume.name();

pub fn handle(ctx: &Context<'_>) -> Result<Value, AdError> {
    let id = ctx.id()?;
    ctx.ads().registry().require(id, Method::Resume)?;
    ctx.expect_ad_type(id, AdType::Reward)?;
    ctx.ads().resume(id)?;
    Ok(json!(true))
}
