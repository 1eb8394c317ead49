use jiff::Timestamp;
use typed_builder::TypedBuilder;
use webvault_core::{
    CatalogRecord, Category, ItemId, ItemStatus, ListingRecord, SourceRecord,
};

/// Creation and update time of every fixture record.
pub const FIXTURE_TIME: Timestamp = Timestamp::constant(1_700_000_000, 0);

/// Builds a category whose slug is the lowercased name.
pub fn category(id: &str, name: &str) -> Category {
    Category {
        id: id.to_string(),
        name: name.to_string(),
        slug: name.to_lowercase(),
    }
}

/// A website record for tests. Defaults describe an active, public and
/// accessible website with no visits.
#[derive(Debug, Clone, TypedBuilder)]
pub struct ItemFixture {
    #[builder(setter(into))]
    pub id: String,
    #[builder(default = "Example website".to_string(), setter(into))]
    pub title: String,
    #[builder(default, setter(strip_option, into))]
    pub description: Option<String>,
    #[builder(default = "https://example.com".to_string(), setter(into))]
    pub url: String,
    #[builder(
        default,
        setter(transform = |tags: &[&str]| tags.iter().map(|tag| tag.to_string()).collect::<Vec<_>>())
    )]
    pub tags: Vec<String>,
    #[builder(default, setter(strip_option))]
    pub category: Option<Category>,
    #[builder(default)]
    pub status: ItemStatus,
    #[builder(default = true)]
    pub is_accessible: bool,
    #[builder(default = true)]
    pub is_public: bool,
    #[builder(default)]
    pub is_featured: bool,
    #[builder(default)]
    pub is_ad: bool,
    #[builder(default)]
    pub visit_count: u64,
    #[builder(default, setter(strip_option))]
    pub rating: Option<f64>,
}

impl ItemFixture {
    /// The fixture as a full catalog record.
    pub fn record(self) -> SourceRecord {
        SourceRecord::Catalog(CatalogRecord {
            id: ItemId::new_unchecked(self.id),
            title: self.title,
            description: self.description,
            url: self.url,
            favicon_url: None,
            image_url: None,
            tags: self.tags,
            category: self.category,
            status: self.status,
            is_accessible: self.is_accessible,
            is_public: self.is_public,
            is_featured: self.is_featured,
            is_ad: self.is_ad,
            visit_count: self.visit_count,
            rating: self.rating,
            content: None,
            language: None,
            features: None,
            pricing: None,
            created_at: FIXTURE_TIME,
            updated_at: FIXTURE_TIME,
        })
    }

    /// The fixture as a listing record. Moderation flags are dropped.
    pub fn listing(self) -> SourceRecord {
        SourceRecord::Listing(ListingRecord {
            id: ItemId::new_unchecked(self.id),
            title: self.title,
            description: self.description,
            url: self.url,
            favicon_url: None,
            image_url: None,
            tags: self.tags,
            category: self.category,
            is_ad: self.is_ad,
            rating: self.rating,
            visit_count: self.visit_count,
            is_featured: self.is_featured,
            created_at: Some(FIXTURE_TIME),
            updated_at: Some(FIXTURE_TIME),
        })
    }
}
