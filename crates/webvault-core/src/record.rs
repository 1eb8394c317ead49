//! Raw record shapes as held by a content repository.
//!
//! Websites reach the repository in one of three overlapping shapes. They are
//! modelled as a tagged union so that normalization can match on the shape
//! instead of probing for fields.

use crate::item::{Access, Category, Item, ItemStatus, Pricing};
use crate::item_id::ItemId;
use jiff::Timestamp;
use serde::{Deserialize, Serialize};

/// A full catalog row as written by the admin layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogRecord {
    pub id: ItemId,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub url: String,
    #[serde(default)]
    pub favicon_url: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
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
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub features: Option<Vec<String>>,
    #[serde(default)]
    pub pricing: Option<Pricing>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// The minimal shape used by card grids. It carries no moderation data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListingRecord {
    pub id: ItemId,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub url: String,
    #[serde(default)]
    pub favicon_url: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub category: Option<Category>,
    #[serde(default)]
    pub is_ad: bool,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub visit_count: u64,
    #[serde(default)]
    pub is_featured: bool,
    #[serde(default)]
    pub created_at: Option<Timestamp>,
    #[serde(default)]
    pub updated_at: Option<Timestamp>,
}

/// A website record in whichever shape its source produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SourceRecord {
    Catalog(CatalogRecord),
    Listing(ListingRecord),
    Detail(Box<Item>),
}

impl SourceRecord {
    pub fn id(&self) -> &ItemId {
        match self {
            SourceRecord::Catalog(r) => &r.id,
            SourceRecord::Listing(r) => &r.id,
            SourceRecord::Detail(item) => &item.id,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            SourceRecord::Catalog(r) => &r.title,
            SourceRecord::Listing(r) => &r.title,
            SourceRecord::Detail(item) => &item.title,
        }
    }

    /// Visibility flags of the record. Listings default to permissive flags.
    pub fn access(&self) -> Access {
        match self {
            SourceRecord::Catalog(r) => Access {
                status: r.status,
                is_accessible: r.is_accessible,
                is_public: r.is_public,
            },
            SourceRecord::Listing(_) => Access::PERMISSIVE,
            SourceRecord::Detail(item) => item.access(),
        }
    }

    pub fn is_ad(&self) -> bool {
        match self {
            SourceRecord::Catalog(r) => r.is_ad,
            SourceRecord::Listing(r) => r.is_ad,
            SourceRecord::Detail(item) => item.is_ad,
        }
    }

    pub fn visit_count(&self) -> u64 {
        match self {
            SourceRecord::Catalog(r) => r.visit_count,
            SourceRecord::Listing(r) => r.visit_count,
            SourceRecord::Detail(item) => item.visit_count,
        }
    }

    /// Overwrites the visit counter and stamps the modification time.
    pub fn set_visit_count(&mut self, visit_count: u64, updated_at: Timestamp) {
        match self {
            SourceRecord::Catalog(r) => {
                r.visit_count = visit_count;
                r.updated_at = updated_at;
            }
            SourceRecord::Listing(r) => {
                r.visit_count = visit_count;
                r.updated_at = Some(updated_at);
            }
            SourceRecord::Detail(item) => {
                item.visit_count = visit_count;
                item.updated_at = updated_at;
                if let Some(stats) = item.stats.as_mut() {
                    stats.total_visits = visit_count;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listing(id: &str) -> SourceRecord {
        SourceRecord::Listing(ListingRecord {
            id: ItemId::new_unchecked(id),
            title: "Demo".to_string(),
            description: None,
            url: "https://demo.test".to_string(),
            favicon_url: None,
            image_url: None,
            tags: vec![],
            category: None,
            is_ad: false,
            rating: None,
            visit_count: 4,
            is_featured: false,
            created_at: None,
            updated_at: None,
        })
    }

    #[test]
    fn listing_defaults_to_permissive_access() {
        assert_eq!(listing("w1").access(), Access::PERMISSIVE);
    }

    #[test]
    fn set_visit_count_stamps_listing() {
        let mut record = listing("w1");
        let at = Timestamp::from_second(1_700_000_000).unwrap();
        record.set_visit_count(5, at);

        assert_eq!(record.visit_count(), 5);
        match record {
            SourceRecord::Listing(r) => assert_eq!(r.updated_at, Some(at)),
            other => panic!("unexpected shape: {other:?}"),
        }
    }

    #[test]
    fn deserializes_by_kind_tag() {
        let json = r#"{
            "kind": "catalog",
            "id": "w1",
            "title": "Demo",
            "url": "https://demo.test",
            "tags": ["ai", "tools"],
            "status": "inactive",
            "is_accessible": true,
            "is_public": true,
            "visit_count": 10,
            "created_at": "2024-01-01T00:00:00Z",
            "updated_at": "2024-01-02T00:00:00Z"
        }"#;

        let record: SourceRecord = serde_json::from_str(json).unwrap();
        assert!(matches!(record, SourceRecord::Catalog(_)));
        assert_eq!(record.id().as_str(), "w1");
        assert_eq!(record.visit_count(), 10);
        assert!(!record.access().is_retrievable());
    }
}
