//! Handler: initRewardAd

use serde_json::Value;

use crate::dispatch::Context;
use crate::error::AdError;
use crate::method::Method;

pub const METHOD: &str = Method::Init.name();

pub fn handle(ctx: &Context<'_>) -> Result<Value, AdError> {
    let id = ctx.id()?;
    ctx.ads().init(id)?;
    Ok(Value::Null)
}
