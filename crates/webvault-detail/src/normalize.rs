//! Normalization of raw repository records into canonical [`Item`]s.

use crate::error::{DetailError, Result};
use jiff::Timestamp;
use rand_core::{OsRng, RngCore};
use std::sync::Arc;
use url::Url;
use webvault_core::{
    Access, CatalogRecord, Clock, Item, ListingRecord, Pricing, SourceRecord, VisitStats,
};

pub const DEFAULT_LANGUAGE: &str = "en";

/// Tags that are surfaced as product features.
const FEATURE_KEYWORDS: &[&str] = &[
    "ai",
    "api",
    "analytics",
    "automation",
    "browser-extension",
    "cloud",
    "collaboration",
    "desktop",
    "free",
    "integrations",
    "mobile",
    "open-source",
    "privacy",
    "self-hosted",
    "templates",
];

const PAID_MARKERS: &[&str] = &["paid", "premium", "freemium", "subscription"];

const MONTHLY_RATIO: f64 = 0.3;
const WEEKLY_RATIO: f64 = 0.1;
const DAILY_RATIO: f64 = 0.02;

const MAX_RATING: f64 = 5.0;

/// `clamp01(0.4 * min(visits / 1000, 1) + 0.4 * rating / 5 + 0.2 * featured)`
pub fn popularity_score(visit_count: u64, rating: Option<f64>, is_featured: bool) -> f64 {
    let visits = (visit_count as f64 / 1000.0).min(1.0);
    let rating = rating.unwrap_or(0.0) / MAX_RATING;
    let featured = if is_featured { 1.0 } else { 0.0 };
    (0.4 * visits + 0.4 * rating + 0.2 * featured).clamp(0.0, 1.0)
}

/// Turns any [`SourceRecord`] shape into a canonical [`Item`], filling in the
/// derived fields.
#[derive(Clone)]
pub struct Normalizer {
    clock: Arc<dyn Clock>,
    language: String,
}

impl Normalizer {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            language: DEFAULT_LANGUAGE.to_string(),
        }
    }

    /// Overrides the language assumed for records that do not declare one.
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    pub fn normalize(&self, record: SourceRecord) -> Item {
        let now = self.clock.now();
        let mut item = match record {
            SourceRecord::Catalog(record) => self.from_catalog(record, now),
            SourceRecord::Listing(record) => self.from_listing(record, now),
            SourceRecord::Detail(item) => *item,
        };

        if item.content.is_empty() {
            item.content = item.description.clone().unwrap_or_default();
        }
        if item.language.is_empty() {
            item.language = self.language.clone();
        }
        if item.features.is_empty() {
            item.features = extract_features(&item.tags);
        }
        if item.pricing.is_none() {
            item.pricing = Some(infer_pricing(&item.tags));
        }
        match item.stats.as_mut() {
            // the counter is authoritative once a visit has been recorded
            Some(stats) => stats.total_visits = item.visit_count,
            None => item.stats = Some(estimate_stats(item.visit_count)),
        }
        item.popularity_score = popularity_score(item.visit_count, item.rating, item.is_featured);
        item
    }

    fn from_catalog(&self, record: CatalogRecord, now: Timestamp) -> Item {
        Item {
            id: record.id,
            title: record.title,
            description: record.description,
            url: record.url,
            favicon_url: record.favicon_url,
            image_url: record.image_url,
            tags: record.tags,
            category: record.category,
            status: record.status,
            is_accessible: record.is_accessible,
            is_public: record.is_public,
            is_featured: record.is_featured,
            is_ad: record.is_ad,
            visit_count: record.visit_count,
            rating: record.rating,
            created_at: record.created_at,
            updated_at: record.updated_at,
            content: record.content.unwrap_or_default(),
            language: record.language.unwrap_or_default(),
            popularity_score: 0.0,
            last_checked_at: now,
            stats: None,
            features: record.features.unwrap_or_default(),
            pricing: record.pricing,
        }
    }

    fn from_listing(&self, record: ListingRecord, now: Timestamp) -> Item {
        let access = Access::PERMISSIVE;
        Item {
            id: record.id,
            title: record.title,
            description: record.description,
            url: record.url,
            favicon_url: record.favicon_url,
            image_url: record.image_url,
            tags: record.tags,
            category: record.category,
            status: access.status,
            is_accessible: access.is_accessible,
            is_public: access.is_public,
            is_featured: record.is_featured,
            is_ad: record.is_ad,
            visit_count: record.visit_count,
            rating: record.rating,
            created_at: record.created_at.unwrap_or(now),
            updated_at: record.updated_at.unwrap_or(now),
            content: String::new(),
            language: String::new(),
            popularity_score: 0.0,
            last_checked_at: now,
            stats: None,
            features: vec![],
            pricing: None,
        }
    }
}

/// Checks the invariants of a canonical item, reporting every violated rule
/// at once.
pub fn validate(item: &Item) -> Result<()> {
    let mut violations = Vec::new();

    if item.id.as_str().trim().is_empty() {
        violations.push("id must not be empty".to_string());
    }

    if item.title.trim().is_empty() {
        violations.push("title must not be empty".to_string());
    }

    match Url::parse(&item.url) {
        Ok(url) if url.has_host() => {}
        Ok(_) => violations.push(format!("url has no host: '{}'", item.url)),
        Err(e) => violations.push(format!("url is not valid ({e}): '{}'", item.url)),
    }

    if let Some(rating) = item.rating {
        if !(0.0..=MAX_RATING).contains(&rating) {
            violations.push(format!("rating must be between 0 and 5, got {rating}"));
        }
    }

    if violations.is_empty() {
        Ok(())
    } else {
        Err(DetailError::Validation(format!(
            "website '{}' is malformed: {}",
            item.id,
            violations.join("; ")
        )))
    }
}

fn extract_features(tags: &[String]) -> Vec<String> {
    let mut features: Vec<String> = Vec::new();
    for tag in tags {
        let tag = tag.trim().to_lowercase();
        if FEATURE_KEYWORDS.contains(&tag.as_str()) && !features.contains(&tag) {
            features.push(tag);
        }
    }
    features
}

fn infer_pricing(tags: &[String]) -> Pricing {
    let lowered: Vec<String> = tags.iter().map(|tag| tag.to_lowercase()).collect();
    let is_free = lowered.iter().any(|tag| tag.contains("free"));
    let paid_marker = lowered
        .iter()
        .any(|tag| PAID_MARKERS.contains(&tag.as_str()));

    Pricing {
        is_free,
        has_paid_plans: paid_marker || !is_free,
        starting_price: None,
        currency: Some("USD".to_string()),
    }
}

/// Placeholder visit aggregates scaled from the visit counter. Bounce rate
/// and session duration are random estimates.
fn estimate_stats(visit_count: u64) -> VisitStats {
    let scaled = |ratio: f64| (visit_count as f64 * ratio).round() as u64;
    let bounce_roll = OsRng.next_u32() as f64 / u32::MAX as f64;

    VisitStats {
        total_visits: visit_count,
        monthly_visits: scaled(MONTHLY_RATIO),
        weekly_visits: scaled(WEEKLY_RATIO),
        daily_visits: scaled(DAILY_RATIO),
        bounce_rate: 0.2 + bounce_roll * 0.4,
        avg_session_duration_secs: 60 + OsRng.next_u32() % 300,
    }
}
