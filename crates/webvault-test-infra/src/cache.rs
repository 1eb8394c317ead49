use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use webvault_core::cache::Result;
use webvault_core::{CacheError, CardSummary, Item, ItemCache, ItemId, RelatedKey};

/// Wraps a cache and counts invalidations made through it.
#[derive(Debug)]
pub struct CountingCache<C> {
    inner: C,
    invalidations: AtomicUsize,
}

impl<C> CountingCache<C> {
    pub fn new(inner: C) -> Self {
        Self {
            inner,
            invalidations: AtomicUsize::new(0),
        }
    }

    pub fn inner(&self) -> &C {
        &self.inner
    }

    pub fn invalidations(&self) -> usize {
        self.invalidations.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl<C: ItemCache> ItemCache for CountingCache<C> {
    async fn get_item(&self, id: &ItemId) -> Result<Option<Item>> {
        self.inner.get_item(id).await
    }

    async fn set_item(&self, id: &ItemId, item: &Item) -> Result<()> {
        self.inner.set_item(id, item).await
    }

    async fn get_related(&self, key: &RelatedKey) -> Result<Option<Vec<CardSummary>>> {
        self.inner.get_related(key).await
    }

    async fn set_related(&self, key: &RelatedKey, cards: &[CardSummary]) -> Result<()> {
        self.inner.set_related(key, cards).await
    }

    async fn invalidate(&self, id: &ItemId) -> Result<()> {
        self.invalidations.fetch_add(1, Ordering::SeqCst);
        self.inner.invalidate(id).await
    }

    async fn clear(&self) -> Result<()> {
        self.inner.clear().await
    }
}

/// A cache whose every call fails with [`CacheError::Unavailable`].
#[derive(Debug, Clone, Default)]
pub struct FailingCache;

impl FailingCache {
    fn error() -> CacheError {
        CacheError::Unavailable("cache is offline".to_string())
    }
}

#[async_trait]
impl ItemCache for FailingCache {
    async fn get_item(&self, _id: &ItemId) -> Result<Option<Item>> {
        Err(Self::error())
    }

    async fn set_item(&self, _id: &ItemId, _item: &Item) -> Result<()> {
        Err(Self::error())
    }

    async fn get_related(&self, _key: &RelatedKey) -> Result<Option<Vec<CardSummary>>> {
        Err(Self::error())
    }

    async fn set_related(&self, _key: &RelatedKey, _cards: &[CardSummary]) -> Result<()> {
        Err(Self::error())
    }

    async fn invalidate(&self, _id: &ItemId) -> Result<()> {
        Err(Self::error())
    }

    async fn clear(&self) -> Result<()> {
        Err(Self::error())
    }
}
