use crate::item_id::ItemId;
use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Moderation status of a cataloged website.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemStatus {
    #[default]
    Active,
    Inactive,
    Pending,
    Rejected,
}

impl Display for ItemStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ItemStatus::Active => f.write_str("active"),
            ItemStatus::Inactive => f.write_str("inactive"),
            ItemStatus::Pending => f.write_str("pending"),
            ItemStatus::Rejected => f.write_str("rejected"),
        }
    }
}

/// The category a website is filed under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub name: String,
    pub slug: String,
}

/// Visibility flags that decide whether end users may see a website.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Access {
    pub status: ItemStatus,
    pub is_accessible: bool,
    pub is_public: bool,
}

impl Access {
    /// Flags used for sources that carry no moderation data at all.
    pub const PERMISSIVE: Access = Access {
        status: ItemStatus::Active,
        is_accessible: true,
        is_public: true,
    };

    /// A website is retrievable by end users only when it is accessible,
    /// public and active.
    pub fn is_retrievable(&self) -> bool {
        self.is_accessible && self.is_public && self.status == ItemStatus::Active
    }
}

/// Estimated visit aggregates. These are derived from the visit counter and
/// are not independently measured.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisitStats {
    pub total_visits: u64,
    pub monthly_visits: u64,
    pub weekly_visits: u64,
    pub daily_visits: u64,
    pub bounce_rate: f64,
    pub avg_session_duration_secs: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pricing {
    pub is_free: bool,
    pub has_paid_plans: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub starting_price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
}

/// The canonical, normalized detail record of one cataloged website.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub favicon_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
    pub status: ItemStatus,
    pub is_accessible: bool,
    pub is_public: bool,
    #[serde(default)]
    pub is_featured: bool,
    #[serde(default)]
    pub is_ad: bool,
    #[serde(default)]
    pub visit_count: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    #[serde(default)]
    pub content: String,
    pub language: String,
    #[serde(default)]
    pub popularity_score: f64,
    pub last_checked_at: Timestamp,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stats: Option<VisitStats>,
    #[serde(default)]
    pub features: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pricing: Option<Pricing>,
}

impl Item {
    pub fn access(&self) -> Access {
        Access {
            status: self.status,
            is_accessible: self.is_accessible,
            is_public: self.is_public,
        }
    }

    /// Whether end users may retrieve this website.
    pub fn is_retrievable(&self) -> bool {
        self.access().is_retrievable()
    }
}

/// The projection of an [`Item`] used by list and grid displays.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardSummary {
    pub id: ItemId,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub favicon_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_ad: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visit_count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_featured: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<Timestamp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<Timestamp>,
}

impl From<&Item> for CardSummary {
    fn from(item: &Item) -> Self {
        Self {
            id: item.id.clone(),
            title: item.title.clone(),
            description: item.description.clone(),
            url: item.url.clone(),
            favicon_url: item.favicon_url.clone(),
            image_url: item.image_url.clone(),
            tags: item.tags.clone(),
            category: item.category.clone(),
            is_ad: Some(item.is_ad),
            rating: item.rating,
            visit_count: Some(item.visit_count),
            is_featured: Some(item.is_featured),
            created_at: Some(item.created_at),
            updated_at: Some(item.updated_at),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_active_public_accessible_is_retrievable() {
        assert!(Access::PERMISSIVE.is_retrievable());

        for status in [
            ItemStatus::Inactive,
            ItemStatus::Pending,
            ItemStatus::Rejected,
        ] {
            let access = Access {
                status,
                ..Access::PERMISSIVE
            };
            assert!(!access.is_retrievable(), "{status} should not be visible");
        }

        let private = Access {
            is_public: false,
            ..Access::PERMISSIVE
        };
        assert!(!private.is_retrievable());

        let unreachable = Access {
            is_accessible: false,
            ..Access::PERMISSIVE
        };
        assert!(!unreachable.is_retrievable());
    }

    #[test]
    fn status_serializes_lowercase() {
        let json = serde_json::to_string(&ItemStatus::Rejected).unwrap();
        assert_eq!(json, "\"rejected\"");
        let status: ItemStatus = serde_json::from_str("\"pending\"").unwrap();
        assert_eq!(status, ItemStatus::Pending);
    }
}
