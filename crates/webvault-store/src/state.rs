use crate::preferences::ViewPreferences;
use crate::session::VisitSession;
use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use webvault_core::{CardSummary, Item};

/// Number of detail load failures after which `retry_load` stops retrying.
pub const MAX_RETRIES: u32 = 3;

/// In-progress flags, one per concern.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadingFlags {
    pub detail: bool,
    pub related: bool,
    pub visit: bool,
}

/// User-facing error messages, one per concern.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorSlots {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub related: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visit: Option<String>,
}

/// Session-only interaction state. Not persisted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interaction {
    pub bookmarked: bool,
    pub share_count: u32,
}

/// Everything a detail page renders.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item: Option<Item>,
    pub related: Vec<CardSummary>,
    pub loading: LoadingFlags,
    pub errors: ErrorSlots,
    pub retry_count: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_loaded_at: Option<Timestamp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session: Option<VisitSession>,
    pub interaction: Interaction,
    pub preferences: ViewPreferences,
}

impl PageState {
    pub fn with_preferences(preferences: ViewPreferences) -> Self {
        Self {
            preferences,
            ..Self::default()
        }
    }

    /// Whether the item with `id` is loaded and current.
    pub fn is_showing(&self, id: &str) -> bool {
        self.item.as_ref().is_some_and(|item| item.id.as_str() == id)
    }

    pub fn can_retry(&self) -> bool {
        self.retry_count < MAX_RETRIES
    }
}
