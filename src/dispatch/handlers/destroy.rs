//! Handler: destroyAd
//!
//! Also closes the id's event channel; a second destroy is `NotFound`.

use serde_json::{json, Value};

use crate::dispatch::Context;
use crate::error::AdError;
use crate::method::{AdType, Method};

pub const METHOD: &str = Method::Destroy.name();

pub fn handle(ctx: &Context<'_>) -> Result<Value, AdError> {
    let id = ctx.id()?;
    ctx.ads().registry().require(id, Method::Destroy)?;
    ctx.expect_ad_type(id, AdType::Reward)?;
    ctx.ads().destroy(id)?;
    Ok(json!(true))
}
