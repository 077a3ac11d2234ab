//! Handler: showRewardAd

use serde_json::{json, Value};

use crate::dispatch::Context;
use crate::error::AdError;
use crate::method::Method;

pub const METHOD: &str = Method::Show.name();

pub fn handle(ctx: &Context<'_>) -> Result<Value, AdError> {
    let id = ctx.id()?;
    ctx.ads().show(id)?;
    Ok(json!(true))
}
