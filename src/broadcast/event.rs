use serde::{Deserialize, Serialize};

/// A lifecycle or reward event pushed to the subscriber of one ad id.
///
/// Mirrors the engine's callback surface one-to-one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum AdEvent {
    Loaded,
    LoadFailed { code: i32, reason: String },
    Opened,
    ShowFailed { code: i32, reason: String },
    Impression,
    Clicked,
    Completed,
    LeftApp,
    Rewarded { name: String, amount: i64 },
    Closed,
}

impl AdEvent {
    pub fn name(&self) -> &'static str {
        match self {
            AdEvent::Loaded => "loaded",
            AdEvent::LoadFailed { .. } => "load_failed",
            AdEvent::Opened => "opened",
            AdEvent::ShowFailed { .. } => "show_failed",
            AdEvent::Impression => "impression",
            AdEvent::Clicked => "clicked",
            AdEvent::Completed => "completed",
            AdEvent::LeftApp => "left_app",
            AdEvent::Rewarded { .. } => "rewarded",
            AdEvent::Closed => "closed",
        }
    }
}
