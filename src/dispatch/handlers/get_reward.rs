//! Handler: getRewardAdReward

use serde_json::{json, Value};

use crate::dispatch::Context;
use crate::error::AdError;
use crate::method::Method;

pub const METHOD: &str = Method::GetReward.name();

pub fn handle(ctx: &Context<'_>) -> Result<Value, AdError> {
    let id = ctx.id()?;
    let reward = ctx.ads().reward(id)?;
    Ok(json!({ "name": reward.name, "amount": reward.amount }))
}
