use async_trait::async_trait;
use moka::future::Cache;
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, trace};
use typed_builder::TypedBuilder;
use webvault_core::cache::Result;
use webvault_core::{CardSummary, Item, ItemCache, ItemId, RelatedKey};

/// An in-memory cache implementation using Moka.
///
/// Holds two caches: website details keyed by id, and related-website
/// rankings keyed by [`RelatedKey`]. By default both are unbounded and never
/// expire; entries only leave through [`ItemCache::invalidate`] or
/// [`ItemCache::clear`].
#[derive(Debug, Clone)]
pub struct MokaItemCache {
    details: Cache<ItemId, Item>,
    related: Cache<RelatedKey, Arc<Vec<CardSummary>>>,
    // Related keys per anchor id, so one id's rankings can be dropped together.
    anchors: Arc<Mutex<HashMap<ItemId, HashSet<RelatedKey>>>>,
}

impl MokaItemCache {
    /// Creates a new unbounded cache without expiration.
    pub fn new() -> Self {
        CacheConfig::default().into()
    }

    /// Creates a new cache where each of the two inner caches holds at most
    /// `max_capacity` entries.
    pub fn with_capacity(max_capacity: u64) -> Self {
        CacheConfig::builder()
            .max_capacity(max_capacity)
            .build()
            .into()
    }

    /// Creates a new cache whose entries expire `ttl` after insertion.
    pub fn with_ttl(max_capacity: u64, ttl: Duration) -> Self {
        CacheConfig::builder()
            .max_capacity(max_capacity)
            .ttl(ttl)
            .build()
            .into()
    }

    /// Returns a builder for creating a custom cache configuration.
    pub fn builder() -> CacheConfigBuilder {
        CacheConfig::builder()
    }
}

impl Default for MokaItemCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ItemCache for MokaItemCache {
    async fn get_item(&self, id: &ItemId) -> Result<Option<Item>> {
        match self.details.get(id).await {
            Some(item) => {
                debug!(id = %id, "detail cache hit");
                Ok(Some(item))
            }
            None => {
                trace!(id = %id, "detail cache miss");
                Ok(None)
            }
        }
    }

    async fn set_item(&self, id: &ItemId, item: &Item) -> Result<()> {
        self.details.insert(id.clone(), item.clone()).await;
        debug!(id = %id, "cached website detail");
        Ok(())
    }

    async fn get_related(&self, key: &RelatedKey) -> Result<Option<Vec<CardSummary>>> {
        match self.related.get(key).await {
            Some(cards) => {
                debug!(key = %key, "related cache hit");
                Ok(Some(cards.as_ref().clone()))
            }
            None => {
                trace!(key = %key, "related cache miss");
                Ok(None)
            }
        }
    }

    async fn set_related(&self, key: &RelatedKey, cards: &[CardSummary]) -> Result<()> {
        self.anchors
            .lock()
            .entry(key.id.clone())
            .or_default()
            .insert(key.clone());
        self.related
            .insert(key.clone(), Arc::new(cards.to_vec()))
            .await;
        debug!(key = %key, count = cards.len(), "cached related websites");
        Ok(())
    }

    async fn invalidate(&self, id: &ItemId) -> Result<()> {
        trace!(id = %id, "invalidating cached entries");

        self.details.invalidate(id).await;

        let keys = self.anchors.lock().remove(id).unwrap_or_default();
        for key in &keys {
            self.related.invalidate(key).await;
        }

        debug!(id = %id, related = keys.len(), "invalidated cached entries (if present)");
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        self.details.invalidate_all();
        self.related.invalidate_all();
        self.anchors.lock().clear();
        debug!("cleared website caches");
        Ok(())
    }
}

/// Configuration for creating a MokaItemCache with custom settings.
#[derive(Debug, TypedBuilder, Default)]
pub struct CacheConfig {
    /// Maximum number of entries each inner cache can hold.
    #[builder(default, setter(strip_option(fallback = max_capacity_opt)))]
    max_capacity: Option<u64>,
    /// Time-to-live for cache entries.
    #[builder(default, setter(strip_option(fallback = ttl_opt)))]
    ttl: Option<Duration>,
    /// Time-to-idle for cache entries.
    #[builder(default, setter(strip_option))]
    tti: Option<Duration>,
}

impl CacheConfig {
    fn build_cache<K, V>(&self) -> Cache<K, V>
    where
        K: std::hash::Hash + Eq + Send + Sync + 'static,
        V: Clone + Send + Sync + 'static,
    {
        let mut builder = Cache::builder();

        if let Some(capacity) = self.max_capacity {
            builder = builder.max_capacity(capacity);
        }

        if let Some(ttl) = self.ttl {
            builder = builder.time_to_live(ttl);
        }

        if let Some(tti) = self.tti {
            builder = builder.time_to_idle(tti);
        }

        builder.build()
    }
}

impl From<CacheConfig> for MokaItemCache {
    fn from(config: CacheConfig) -> Self {
        MokaItemCache {
            details: config.build_cache(),
            related: config.build_cache(),
            anchors: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}
