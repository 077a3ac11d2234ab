//! Handler: loadRewardAd

use serde_json::{json, Value};

use crate::dispatch::Context;
use crate::engine::LoadRequest;
use crate::error::AdError;
use crate::method::Method;

pub const METHOD: &str = Method::Load.name();

pub fn handle(ctx: &Context<'_>) -> Result<Value, AdError> {
    let id = ctx.id()?;
    ctx.ads().registry().require(id, Method::Load)?;

    let slot_id = ctx.require_str("adSlotId", id)?;
    let params = ctx.require_object("adParam", id)?;

    let mut request = LoadRequest::new(slot_id, params.clone());
    if let Some(user_id) = ctx.optional_str("userId", id)? {
        request = request.with_user_id(user_id);
    }
    if let Some(data) = ctx.optional_str("data", id)? {
        request = request.with_data(data);
    }
    if let Some(config) = ctx.optional_object("rewardVerifyConfig", id)? {
        request = request.with_reward_verify_config(config.clone());
    }

    ctx.ads().load(id, request)?;
    Ok(json!(true))
}
