//! Error types returned through the command surface.

use std::error::Error;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::instance::AdId;

/// Stable error code carried by every failed method call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// A required argument is missing or null.
    NullParam,
    /// An argument is present but has the wrong type or value.
    InvalidParam,
    /// No live ad instance for the id.
    NotFound,
    /// The ad has not granted a reward yet.
    NoReward,
    /// The id is already in use and the re-init policy rejects duplicates.
    DuplicateId,
    /// The ad engine could not be allocated.
    EngineUnavailable,
    /// No handler for the method name.
    NotImplemented,
    /// Internal failure (poisoned lock).
    Internal,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::NullParam => "NULL_PARAM",
            ErrorCode::InvalidParam => "INVALID_PARAM",
            ErrorCode::NotFound => "NOT_FOUND",
            ErrorCode::NoReward => "NO_REWARD",
            ErrorCode::DuplicateId => "DUPLICATE_ID",
            ErrorCode::EngineUnavailable => "ENGINE_UNAVAILABLE",
            ErrorCode::NotImplemented => "NOT_IMPLEMENTED",
            ErrorCode::Internal => "INTERNAL",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error type for reward ad operations.
///
/// `method` fields hold the wire name of the command that failed so the
/// message reads the same whether it surfaces through direct dispatch or
/// a transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdError {
    /// Required argument missing or null.
    NullParam {
        field: &'static str,
        id: Option<AdId>,
        method: &'static str,
    },
    /// Argument present but unusable.
    InvalidParam {
        field: &'static str,
        id: Option<AdId>,
        method: &'static str,
        reason: String,
    },
    /// No ad instance registered for the id.
    NotFound { id: AdId, method: &'static str },
    /// `getRewardAdReward` called before any reward was granted.
    NoReward { id: AdId },
    /// `initRewardAd` for an id that is still live, under the reject policy.
    DuplicateId { id: AdId },
    /// The engine factory failed to allocate an engine during init.
    EngineUnavailable { id: AdId, reason: String },
    /// No handler registered for this method name.
    NotImplemented(String),
    /// A lock guarding shared state was poisoned.
    LockPoisoned(&'static str),
}

impl AdError {
    /// The stable code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            AdError::NullParam { .. } => ErrorCode::NullParam,
            AdError::InvalidParam { .. } => ErrorCode::InvalidParam,
            AdError::NotFound { .. } => ErrorCode::NotFound,
            AdError::NoReward { .. } => ErrorCode::NoReward,
            AdError::DuplicateId { .. } => ErrorCode::DuplicateId,
            AdError::EngineUnavailable { .. } => ErrorCode::EngineUnavailable,
            AdError::NotImplemented(_) => ErrorCode::NotImplemented,
            AdError::LockPoisoned(_) => ErrorCode::Internal,
        }
    }

    /// The ad id this error refers to, when known.
    pub fn id(&self) -> Option<AdId> {
        match self {
            AdError::NullParam { id, .. } | AdError::InvalidParam { id, .. } => *id,
            AdError::NotFound { id, .. }
            | AdError::NoReward { id }
            | AdError::DuplicateId { id }
            | AdError::EngineUnavailable { id, .. } => Some(*id),
            AdError::NotImplemented(_) | AdError::LockPoisoned(_) => None,
        }
    }

    /// Structured detail for the error payload.
    pub fn details(&self) -> Option<Value> {
        match self {
            AdError::NullParam { field, id, .. } => Some(json!({ "field": field, "id": id })),
            AdError::InvalidParam { field, id, reason, .. } => {
                Some(json!({ "field": field, "id": id, "reason": reason }))
            }
            AdError::EngineUnavailable { reason, .. } => Some(json!({ "reason": reason })),
            _ => None,
        }
    }

    /// Map this error to an HTTP-style status code.
    pub fn status_code(&self) -> u16 {
        match self {
            AdError::NullParam { .. } => 400,
            AdError::InvalidParam { .. } => 400,
            AdError::NotFound { .. } => 404,
            AdError::NoReward { .. } => 409,
            AdError::DuplicateId { .. } => 409,
            AdError::EngineUnavailable { .. } => 503,
            AdError::NotImplemented(_) => 501,
            AdError::LockPoisoned(_) => 500,
        }
    }
}

fn fmt_id(id: &Option<AdId>) -> String {
    match id {
        Some(id) => id.to_string(),
        None => "none".to_string(),
    }
}

impl fmt::Display for AdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AdError::NullParam { field, id, method } => write!(
                f,
                "{} is null or empty. {} failed. | Ad id : {}",
                field,
                method,
                fmt_id(id)
            ),
            AdError::InvalidParam {
                field,
                id,
                method,
                reason,
            } => write!(
                f,
                "{} parameter is invalid ({}). {} failed. | Ad id : {}",
                field,
                reason,
                method,
                fmt_id(id)
            ),
            AdError::NotFound { id, method } => {
                write!(f, "no ad for given id. {} failed. | Ad id : {}", method, id)
            }
            AdError::NoReward { id } => {
                write!(f, "no reward has been granted yet. | Ad id : {}", id)
            }
            AdError::DuplicateId { id } => {
                write!(f, "an ad is already registered for this id. | Ad id : {}", id)
            }
            AdError::EngineUnavailable { id, reason } => {
                write!(f, "ad engine unavailable: {}. | Ad id : {}", reason, id)
            }
            AdError::NotImplemented(method) => write!(f, "method not implemented: {}", method),
            AdError::LockPoisoned(operation) => {
                write!(f, "lock poisoned during {}", operation)
            }
        }
    }
}

impl Error for AdError {}
