use std::sync::Arc;

use crate::error::{DetailError, Result};
use crate::normalize::{self, Normalizer};
use crate::resolver::DetailResolver;
use crate::similarity;
use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::{debug, info, trace, warn};
use webvault_core::{
    CardSummary, Clock, Item, ItemCache, ItemId, RelatedKey, RelatedOptions, Repository,
    SystemClock, VisitOutcome, MAX_RELATED_LIMIT, MIN_RELATED_LIMIT,
};

/// Service resolving website details and related websites.
///
/// Wraps a [`Repository`] and an [`ItemCache`] to handle:
/// - id validation and access control
/// - normalization of raw records
/// - related-website scoring and ranking
/// - visit counting with cache invalidation
///
/// Cache failures never fail a read; they are logged and the repository is
/// used instead.
pub struct DetailService<R, C> {
    repository: Arc<R>,
    cache: Arc<C>,
    normalizer: Normalizer,
    clock: Arc<dyn Clock>,
    // Repository reads that fill the cache hold this shared. Visit mutations
    // and invalidations hold it exclusively, so no fill can write a value read
    // before a mutation after that mutation's invalidation.
    fill_lock: Arc<RwLock<()>>,
}

impl<R, C> Clone for DetailService<R, C> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            cache: Arc::clone(&self.cache),
            normalizer: self.normalizer.clone(),
            clock: Arc::clone(&self.clock),
            fill_lock: Arc::clone(&self.fill_lock),
        }
    }
}

impl<R: Repository, C: ItemCache> DetailService<R, C> {
    /// Creates a new `DetailService` using the system clock.
    pub fn new(repository: R, cache: C) -> Self {
        Self::with_clock(repository, cache, SystemClock)
    }

    /// Creates a new `DetailService` with a custom clock.
    pub fn with_clock(repository: R, cache: C, clock: impl Clock + 'static) -> Self {
        let clock: Arc<dyn Clock> = Arc::new(clock);
        Self {
            repository: Arc::new(repository),
            cache: Arc::new(cache),
            normalizer: Normalizer::new(Arc::clone(&clock)),
            clock,
            fill_lock: Arc::new(RwLock::new(())),
        }
    }

    /// Returns a reference to the repository.
    pub fn repository(&self) -> &R {
        &self.repository
    }

    /// Returns a reference to the cache.
    pub fn cache(&self) -> &C {
        &self.cache
    }

    /// Resolves an id to a normalized website detail.
    ///
    /// # Returns
    ///
    /// * `Ok(item)` - The website, served from cache when possible
    /// * `Err(Validation)` - The id is blank or the record is malformed
    /// * `Err(NotFound)` - No website with this id exists
    /// * `Err(AccessDenied)` - The website is private, unreachable or inactive
    /// * `Err(Fetch)` - The repository failed
    pub async fn get_by_id(&self, id: &str) -> Result<Item> {
        DetailResolver::get_by_id(self, id).await
    }

    /// Ranks the websites most related to `id` according to `options`.
    pub async fn get_related(&self, id: &str, options: &RelatedOptions) -> Result<Vec<CardSummary>> {
        DetailResolver::get_related(self, id, options).await
    }

    /// Records one visit to `id`, invalidating everything cached for it.
    pub async fn track_visit(&self, id: &str) -> VisitOutcome {
        DetailResolver::track_visit(self, id).await
    }

    /// Drops the cached detail of `id` and every ranking anchored at it.
    pub async fn invalidate(&self, id: &str) -> Result<()> {
        let id = ItemId::new(id)?;
        let _guard = self.fill_lock.write().await;
        self.cache.invalidate(&id).await?;
        Ok(())
    }

    /// Drops every cached detail and ranking.
    pub async fn clear_cache(&self) -> Result<()> {
        let _guard = self.fill_lock.write().await;
        self.cache.clear().await?;
        info!("website caches cleared");
        Ok(())
    }

    async fn cached_item(&self, id: &ItemId) -> Option<Item> {
        match self.cache.get_item(id).await {
            Ok(item) => item,
            Err(e) => {
                warn!(id = %id, error = %e, "detail cache read failed, falling back to repository");
                None
            }
        }
    }

    async fn cached_related(&self, key: &RelatedKey) -> Option<Vec<CardSummary>> {
        match self.cache.get_related(key).await {
            Ok(cards) => cards,
            Err(e) => {
                warn!(key = %key, error = %e, "related cache read failed, recomputing");
                None
            }
        }
    }

    fn rank(&self, anchor: &Item, candidates: Vec<Item>, options: &RelatedOptions) -> Vec<CardSummary> {
        let mut scored: Vec<(f64, Item)> = candidates
            .into_iter()
            .map(|candidate| {
                let score = similarity::score(options.strategy, anchor, &candidate);
                (score, candidate)
            })
            .filter(|(score, candidate)| {
                trace!(id = %candidate.id, score, "scored candidate");
                *score >= options.min_score
            })
            .collect();

        // stable, so equal scores keep repository order
        scored.sort_by(|a, b| b.0.total_cmp(&a.0));

        scored
            .iter()
            .take(options.limit)
            .map(|(_, item)| CardSummary::from(item))
            .collect()
    }
}

#[async_trait]
impl<R: Repository, C: ItemCache> DetailResolver for DetailService<R, C> {
    async fn get_by_id(&self, id: &str) -> Result<Item> {
        let id = ItemId::new(id)?;
        trace!(id = %id, "resolving website detail");

        if let Some(item) = self.cached_item(&id).await {
            normalize::validate(&item)?;
            debug!(id = %id, "served website detail from cache");
            return Ok(item);
        }

        let _fill = self.fill_lock.read().await;
        let record = self
            .repository
            .find_by_id(&id)
            .await?
            .ok_or_else(|| DetailError::NotFound(id.to_string()))?;

        let access = record.access();
        if !access.is_retrievable() {
            debug!(id = %id, status = %access.status, "website is not retrievable");
            return Err(DetailError::AccessDenied(format!(
                "website '{}' is {} (accessible: {}, public: {})",
                id, access.status, access.is_accessible, access.is_public
            )));
        }

        let item = self.normalizer.normalize(record);
        normalize::validate(&item)?;

        if let Err(e) = self.cache.set_item(&item.id, &item).await {
            warn!(id = %id, error = %e, "failed to cache website detail");
        }

        debug!(id = %id, "resolved website detail");
        Ok(item)
    }

    async fn get_related(&self, id: &str, options: &RelatedOptions) -> Result<Vec<CardSummary>> {
        let id = ItemId::new(id)?;

        if !options.limit_in_range() {
            return Err(DetailError::Validation(format!(
                "limit must be between {} and {}, got {}",
                MIN_RELATED_LIMIT, MAX_RELATED_LIMIT, options.limit
            )));
        }

        let key = RelatedKey::new(&id, options);
        trace!(key = %key, "resolving related websites");

        if let Some(cards) = self.cached_related(&key).await {
            debug!(key = %key, "served related websites from cache");
            return Ok(cards.into_iter().take(options.limit).collect());
        }

        let _fill = self.fill_lock.read().await;
        let anchor = self
            .repository
            .find_by_id(&id)
            .await?
            .ok_or_else(|| DetailError::NotFound(id.to_string()))?;
        let anchor = self.normalizer.normalize(anchor);

        let candidates: Vec<Item> = self
            .repository
            .list_all()
            .await?
            .into_iter()
            .filter(|record| !(options.exclude_self && record.id() == &id))
            .filter(|record| record.access().is_retrievable())
            .filter(|record| options.include_ads || !record.is_ad())
            .map(|record| self.normalizer.normalize(record))
            .collect();

        let cards = self.rank(&anchor, candidates, options);

        if let Err(e) = self.cache.set_related(&key, &cards).await {
            warn!(key = %key, error = %e, "failed to cache related websites");
        }

        debug!(key = %key, count = cards.len(), "ranked related websites");
        Ok(cards)
    }

    async fn track_visit(&self, id: &str) -> VisitOutcome {
        let Ok(id) = ItemId::new(id) else {
            return VisitOutcome::failed(0, "Invalid website ID parameter");
        };

        let _guard = self.fill_lock.write().await;

        let record = match self.repository.find_by_id(&id).await {
            Ok(Some(record)) => record,
            Ok(None) => {
                debug!(id = %id, "visit to unknown website");
                return VisitOutcome::failed(0, format!("Website not found: {id}"));
            }
            Err(e) => {
                warn!(id = %id, error = %e, "failed to look up website for visit");
                return VisitOutcome::failed(0, format!("Failed to track visit: {e}"));
            }
        };

        let current = record.visit_count();
        if !record.access().is_retrievable() {
            debug!(id = %id, "visit to website that is not retrievable");
            return VisitOutcome::failed(current, format!("Website is not accessible: {id}"));
        }

        let new_count = current.saturating_add(1);
        match self
            .repository
            .mutate_visit_count(&id, new_count, self.clock.now())
            .await
        {
            Ok(true) => {}
            Ok(false) => return VisitOutcome::failed(0, format!("Website not found: {id}")),
            Err(e) => {
                warn!(id = %id, error = %e, "failed to update visit count");
                return VisitOutcome::failed(current, format!("Failed to track visit: {e}"));
            }
        }

        if let Err(e) = self.cache.invalidate(&id).await {
            warn!(id = %id, error = %e, "failed to invalidate cache after visit");
        }

        info!(id = %id, visit_count = new_count, "visit recorded");
        VisitOutcome::recorded(new_count)
    }
}
