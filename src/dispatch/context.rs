//! Context passed to method handlers.
//!
//! Carries the argument bag and a reference to the runtime. The typed
//! accessors turn the loosely typed bag into checked values, failing with
//! `NullParam` for missing/null fields and `InvalidParam` for fields of
//! the wrong type, each naming the field and the ad id.

use serde_json::{Map, Value};

use crate::error::AdError;
use crate::instance::AdId;
use crate::method::AdType;
use crate::runtime::RewardAds;

/// The context passed to every method handler.
pub struct Context<'a> {
    /// Wire name of the method being handled.
    method: &'static str,
    /// Raw argument bag.
    args: Value,
    ads: &'a RewardAds,
}

impl<'a> Context<'a> {
    pub(crate) fn new(method: &'static str, args: Value, ads: &'a RewardAds) -> Self {
        Self { method, args, ads }
    }

    pub fn method(&self) -> &'static str {
        self.method
    }

    pub fn ads(&self) -> &RewardAds {
        self.ads
    }

    /// A field's value; null counts as absent.
    pub fn arg(&self, field: &str) -> Option<&Value> {
        self.args.get(field).filter(|v| !v.is_null())
    }

    fn null_param(&self, field: &'static str, id: Option<AdId>) -> AdError {
        AdError::NullParam {
            field,
            id,
            method: self.method,
        }
    }

    fn invalid_param(&self, field: &'static str, id: Option<AdId>, reason: String) -> AdError {
        AdError::InvalidParam {
            field,
            id,
            method: self.method,
            reason,
        }
    }

    /// The required integer `id`.
    pub fn id(&self) -> Result<AdId, AdError> {
        let value = self.arg("id").ok_or_else(|| self.null_param("id", None))?;
        as_id(value).ok_or_else(|| {
            self.invalid_param("id", None, format!("expected an integer, got {}", value))
        })
    }

    /// A required string that must also be non-empty.
    pub fn require_str(&self, field: &'static str, id: AdId) -> Result<&str, AdError> {
        match self.arg(field) {
            None => Err(self.null_param(field, Some(id))),
            Some(Value::String(s)) if s.is_empty() => Err(self.null_param(field, Some(id))),
            Some(Value::String(s)) => Ok(s),
            Some(other) => Err(self.invalid_param(
                field,
                Some(id),
                format!("expected a string, got {}", other),
            )),
        }
    }

    pub fn optional_str(&self, field: &'static str, id: AdId) -> Result<Option<&str>, AdError> {
        match self.arg(field) {
            None => Ok(None),
            Some(Value::String(s)) => Ok(Some(s)),
            Some(other) => Err(self.invalid_param(
                field,
                Some(id),
                format!("expected a string, got {}", other),
            )),
        }
    }

    /// A required config bag (JSON object). An empty object is accepted.
    pub fn require_object(&self, field: &'static str, id: AdId) -> Result<&Map<String, Value>, AdError> {
        self.optional_object(field, id)?
            .ok_or_else(|| self.null_param(field, Some(id)))
    }

    pub fn optional_object(
        &self,
        field: &'static str,
        id: AdId,
    ) -> Result<Option<&Map<String, Value>>, AdError> {
        match self.arg(field) {
            None => Ok(None),
            Some(Value::Object(map)) => Ok(Some(map)),
            Some(other) => Err(self.invalid_param(
                field,
                Some(id),
                format!("expected an object, got {}", other),
            )),
        }
    }

    /// Check the `adType` discriminator against `expected`.
    pub fn expect_ad_type(&self, id: AdId, expected: AdType) -> Result<(), AdError> {
        let tag = self.require_str("adType", id)?;
        let ad_type = tag
            .parse::<AdType>()
            .map_err(|reason| self.invalid_param("adType", Some(id), reason))?;
        if ad_type != expected {
            return Err(self.invalid_param(
                "adType",
                Some(id),
                format!("expected {}, got {}", expected.tag(), ad_type.tag()),
            ));
        }
        Ok(())
    }
}

/// Integers, and floats with no fractional part, are ids.
fn as_id(value: &Value) -> Option<AdId> {
    let Value::Number(number) = value else {
        return None;
    };
    if let Some(id) = number.as_i64() {
        return Some(id);
    }
    number
        .as_f64()
        .filter(|f| f.fract() == 0.0 && f.abs() < i64::MAX as f64)
        .map(|f| f as AdId)
}
