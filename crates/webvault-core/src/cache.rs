use crate::error::CacheError;
use crate::item::{CardSummary, Item};
use crate::item_id::ItemId;
use crate::related::RelatedKey;
use async_trait::async_trait;

/// Type alias for cache results.
pub type Result<T> = std::result::Result<T, CacheError>;

/// A cache for resolved website details and related-website rankings.
///
/// Two logical caches live behind this trait: one keyed by [`ItemId`] holding
/// normalized [`Item`]s, and one keyed by [`RelatedKey`] holding ranked
/// [`CardSummary`] lists. Values are handed out as owned copies, so callers
/// can never mutate cached state.
#[async_trait]
pub trait ItemCache: Send + Sync + 'static {
    /// Get a website detail from cache.
    ///
    /// Returns `Ok(None)` if the id is not in the cache.
    async fn get_item(&self, id: &ItemId) -> Result<Option<Item>>;

    /// Store a website detail in cache.
    async fn set_item(&self, id: &ItemId, item: &Item) -> Result<()>;

    /// Get a related-websites ranking from cache.
    async fn get_related(&self, key: &RelatedKey) -> Result<Option<Vec<CardSummary>>>;

    /// Store a related-websites ranking in cache.
    async fn set_related(&self, key: &RelatedKey, cards: &[CardSummary]) -> Result<()>;

    /// Remove the detail entry of `id` and every related entry anchored at `id`.
    ///
    /// It is not an error if nothing is cached for `id`.
    async fn invalidate(&self, id: &ItemId) -> Result<()>;

    /// Remove every entry from both caches.
    async fn clear(&self) -> Result<()>;
}
