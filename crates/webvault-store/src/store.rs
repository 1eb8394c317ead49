use std::sync::Arc;

use crate::preferences::{
    PreferenceStorage, RelatedConfigPatch, ViewPreferences, PREFERENCES_NAMESPACE,
};
use crate::session::VisitSession;
use crate::state::PageState;
use parking_lot::Mutex;
use tokio::sync::{watch, OnceCell};
use tracing::{debug, info, trace, warn};
use webvault_core::{Clock, SystemClock, VisitOutcome};
use webvault_detail::{DetailError, DetailResolver};

const NOT_FOUND_MESSAGE: &str = "Website not found";
const ACCESS_DENIED_MESSAGE: &str = "This website is private or inactive";
const FETCH_FAILED_MESSAGE: &str = "Failed to load website details. Please try again.";
const RELATED_FAILED_MESSAGE: &str = "Failed to load related websites";

/// Page state container for a website detail view.
///
/// Wraps a [`DetailResolver`] with loading flags, per-concern errors, a
/// capped retry counter and once-per-session visit recording. Every change
/// is published on a [`watch`] channel, see [`PageStore::subscribe`].
///
/// Loads are deduplicated per concern: a second load of the id already in
/// flight is dropped, while a load of a different id supersedes it and the
/// older result is discarded when it arrives.
pub struct PageStore<D> {
    inner: Arc<Inner<D>>,
}

impl<D> Clone for PageStore<D> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

struct Inner<D> {
    resolver: D,
    clock: Arc<dyn Clock>,
    storage: Arc<dyn PreferenceStorage>,
    shared: Mutex<Shared>,
    tx: watch::Sender<PageState>,
}

struct Shared {
    page: PageState,
    control: Control,
}

/// Bookkeeping that is never shown to the UI.
#[derive(Default)]
struct Control {
    detail_generation: u64,
    detail_in_flight: Option<String>,
    related_generation: u64,
    related_in_flight: Option<String>,
    // One cell per session; holds the first successful visit outcome.
    visit: Option<Arc<OnceCell<VisitOutcome>>>,
}

impl Control {
    /// Forgets every in-flight load and makes their results stale.
    fn abandon(&mut self) {
        self.detail_generation += 1;
        self.detail_in_flight = None;
        self.related_generation += 1;
        self.related_in_flight = None;
        self.visit = None;
    }
}

impl<D: DetailResolver> PageStore<D> {
    /// Creates a store, restoring view preferences from `storage`.
    pub fn new(resolver: D, storage: impl PreferenceStorage) -> Self {
        Self::with_clock(resolver, storage, SystemClock)
    }

    pub fn with_clock(
        resolver: D,
        storage: impl PreferenceStorage,
        clock: impl Clock + 'static,
    ) -> Self {
        let preferences = match storage.load(PREFERENCES_NAMESPACE) {
            Ok(Some(mut preferences)) => {
                preferences.related.sanitize();
                preferences
            }
            Ok(None) => ViewPreferences::default(),
            Err(e) => {
                warn!(error = %e, "failed to restore view preferences, using defaults");
                ViewPreferences::default()
            }
        };

        let page = PageState::with_preferences(preferences);
        let (tx, _) = watch::channel(page.clone());

        Self {
            inner: Arc::new(Inner {
                resolver,
                clock: Arc::new(clock),
                storage: Arc::new(storage),
                shared: Mutex::new(Shared {
                    page,
                    control: Control::default(),
                }),
                tx,
            }),
        }
    }

    pub fn resolver(&self) -> &D {
        &self.inner.resolver
    }

    /// Returns a snapshot of the current page state.
    pub fn state(&self) -> PageState {
        self.inner.shared.lock().page.clone()
    }

    /// Subscribes to page state changes.
    pub fn subscribe(&self) -> watch::Receiver<PageState> {
        self.inner.tx.subscribe()
    }

    /// Loads the detail of `id`, then its related websites.
    ///
    /// Does nothing if `id` is already loading, or already shown and `force`
    /// is false. On failure the retry counter is incremented and a
    /// user-facing message is stored.
    pub async fn load_detail(&self, id: &str, force: bool) {
        let id = id.trim().to_string();

        let generation = self.update(|shared| {
            if shared.control.detail_in_flight.as_deref() == Some(id.as_str()) {
                debug!(id = %id, "detail already loading");
                return None;
            }
            if !force && shared.page.is_showing(&id) {
                trace!(id = %id, "detail already loaded");
                return None;
            }

            shared.control.detail_generation += 1;
            shared.control.detail_in_flight = Some(id.clone());
            shared.page.current_id = Some(id.clone());
            shared.page.loading.detail = true;
            shared.page.errors.detail = None;
            Some(shared.control.detail_generation)
        });
        let Some(generation) = generation else {
            return;
        };

        let result = self.inner.resolver.get_by_id(&id).await;
        let now = self.inner.clock.now();

        let loaded = self.update(|shared| {
            if shared.control.detail_generation != generation {
                debug!(id = %id, "discarding superseded detail load");
                return false;
            }
            shared.control.detail_in_flight = None;
            shared.page.loading.detail = false;

            match result {
                Ok(item) => {
                    shared.page.item = Some(item);
                    shared.page.related.clear();
                    shared.page.retry_count = 0;
                    shared.page.last_loaded_at = Some(now);
                    shared.page.session = Some(VisitSession::start(now));
                    shared.page.loading.visit = false;
                    shared.page.errors.visit = None;
                    shared.control.visit = Some(Arc::new(OnceCell::new()));
                    true
                }
                Err(e) => {
                    warn!(id = %id, error = %e, "failed to load website detail");
                    shared.page.item = None;
                    shared.page.session = None;
                    shared.control.visit = None;
                    shared.page.retry_count += 1;
                    shared.page.errors.detail = Some(detail_message(&e));
                    false
                }
            }
        });

        if loaded {
            debug!(id = %id, "website detail loaded");
            self.load_related(&id, None).await;
        }
    }

    /// Loads websites related to `id` using the stored related config,
    /// after merging `patch` into it.
    ///
    /// Failures land in the related error slot and never touch the detail.
    pub async fn load_related(&self, id: &str, patch: Option<RelatedConfigPatch>) {
        let id = id.trim().to_string();

        let started = self.update(|shared| {
            if shared.control.related_in_flight.as_deref() == Some(id.as_str()) {
                debug!(id = %id, "related websites already loading");
                return None;
            }
            if let Some(patch) = &patch {
                shared.page.preferences.related.apply(patch);
            }

            shared.control.related_generation += 1;
            shared.control.related_in_flight = Some(id.clone());
            shared.page.loading.related = true;
            shared.page.errors.related = None;
            Some((
                shared.control.related_generation,
                shared.page.preferences.clone(),
            ))
        });
        let Some((generation, preferences)) = started else {
            return;
        };

        if patch.is_some() {
            self.persist(&preferences);
        }

        let options = preferences.related.to_options();
        let result = self.inner.resolver.get_related(&id, &options).await;

        self.update(|shared| {
            if shared.control.related_generation != generation {
                debug!(id = %id, "discarding superseded related load");
                return;
            }
            shared.control.related_in_flight = None;
            shared.page.loading.related = false;

            match result {
                Ok(cards) => {
                    debug!(id = %id, count = cards.len(), "related websites loaded");
                    shared.page.related = cards;
                }
                Err(e) => {
                    warn!(id = %id, error = %e, "failed to load related websites");
                    shared.page.related.clear();
                    shared.page.errors.related = Some(RELATED_FAILED_MESSAGE.to_string());
                }
            }
        });
    }

    /// Reloads the current id, unless the retry budget is spent.
    ///
    /// Returns whether a reload was attempted.
    pub async fn retry_load(&self) -> bool {
        let id = {
            let shared = self.inner.shared.lock();
            if !shared.page.can_retry() {
                debug!(retries = shared.page.retry_count, "retry budget spent, ignoring");
                return false;
            }
            shared.page.current_id.clone()
        };

        match id {
            Some(id) => {
                self.load_detail(&id, true).await;
                true
            }
            None => false,
        }
    }

    /// Records a visit to `id`, at most once per loaded session.
    ///
    /// Calls after the first successful one return its outcome without
    /// reaching the resolver; concurrent calls wait for the first. A failed
    /// attempt is not remembered. Visits to an id that is not the shown item
    /// are passed straight through.
    pub async fn track_visit(&self, id: &str) -> VisitOutcome {
        let id = id.trim();

        let cell = {
            let shared = self.inner.shared.lock();
            if shared.page.is_showing(id) {
                shared.control.visit.clone()
            } else {
                None
            }
        };
        let Some(cell) = cell else {
            debug!(id = %id, "visit outside a loaded session");
            return self.inner.resolver.track_visit(id).await;
        };

        match cell.get_or_try_init(|| self.record_visit(id, &cell)).await {
            Ok(outcome) => outcome.clone(),
            Err(outcome) => outcome,
        }
    }

    async fn record_visit(
        &self,
        id: &str,
        cell: &Arc<OnceCell<VisitOutcome>>,
    ) -> Result<VisitOutcome, VisitOutcome> {
        self.update(|shared| {
            shared.page.loading.visit = true;
            shared.page.errors.visit = None;
        });

        let outcome = self.inner.resolver.track_visit(id).await;

        self.update(|shared| {
            let current = shared
                .control
                .visit
                .as_ref()
                .is_some_and(|active| Arc::ptr_eq(active, cell));
            if !current {
                debug!(id = %id, "visit finished after its session ended");
                return;
            }
            shared.page.loading.visit = false;

            if !outcome.success {
                shared.page.errors.visit = outcome.error.clone();
                return;
            }
            if let Some(item) = shared.page.item.as_mut() {
                item.visit_count = outcome.new_visit_count;
            }
            if let Some(session) = shared.page.session.as_mut() {
                session.has_recorded_visit = true;
                session.last_visit = Some(outcome.clone());
            }
        });

        if outcome.success {
            info!(id = %id, visit_count = outcome.new_visit_count, "visit recorded for session");
            Ok(outcome)
        } else {
            Err(outcome)
        }
    }

    /// Warms the related cache for `id`. Errors are logged and dropped.
    ///
    /// The page is only updated if `id` is the shown item and no related
    /// load is running.
    pub async fn preload_related(&self, id: &str) {
        let id = id.trim();
        let options = self.inner.shared.lock().page.preferences.related.to_options();

        match self.inner.resolver.get_related(id, &options).await {
            Ok(cards) => {
                trace!(id = %id, count = cards.len(), "preloaded related websites");
                self.update(|shared| {
                    if shared.page.is_showing(id) && shared.control.related_in_flight.is_none() {
                        shared.page.related = cards;
                        shared.page.errors.related = None;
                    }
                });
            }
            Err(e) => warn!(id = %id, error = %e, "preloading related websites failed"),
        }
    }

    /// Stops the session clock, folding elapsed time into the session.
    pub fn end_session(&self) {
        let now = self.inner.clock.now();
        self.update(|shared| {
            if let Some(session) = shared.page.session.as_mut() {
                session.end(now);
            }
        });
    }

    /// Merges `patch` into the related config and persists it.
    pub fn set_related_config(&self, patch: RelatedConfigPatch) {
        self.update_preferences(|preferences| preferences.related.apply(&patch));
    }

    pub fn toggle_related_panel(&self) {
        self.update_preferences(|preferences| {
            preferences.panels.related = !preferences.panels.related;
        });
    }

    pub fn toggle_share_panel(&self) {
        self.update_preferences(|preferences| {
            preferences.panels.share = !preferences.panels.share;
        });
    }

    pub fn toggle_fullscreen(&self) {
        self.update_preferences(|preferences| {
            preferences.panels.fullscreen = !preferences.panels.fullscreen;
        });
    }

    /// Flips the bookmark flag and returns the new value.
    pub fn toggle_bookmark(&self) -> bool {
        self.update(|shared| {
            let interaction = &mut shared.page.interaction;
            interaction.bookmarked = !interaction.bookmarked;
            interaction.bookmarked
        })
    }

    /// Counts one share and returns the new total.
    pub fn record_share(&self) -> u32 {
        self.update(|shared| {
            let interaction = &mut shared.page.interaction;
            interaction.share_count = interaction.share_count.saturating_add(1);
            interaction.share_count
        })
    }

    /// Clears everything, including view preferences, which are reset to
    /// their defaults and persisted.
    pub fn reset(&self) {
        let preferences = ViewPreferences::default();
        self.update(|shared| {
            shared.control.abandon();
            shared.page = PageState::with_preferences(preferences.clone());
        });
        self.persist(&preferences);
        debug!("page state reset");
    }

    /// Clears the page but keeps view preferences.
    pub fn soft_reset(&self) {
        self.update(|shared| {
            shared.control.abandon();
            let preferences = std::mem::take(&mut shared.page.preferences);
            shared.page = PageState::with_preferences(preferences);
        });
        debug!("page state soft reset");
    }

    fn update_preferences(&self, f: impl FnOnce(&mut ViewPreferences)) {
        let preferences = self.update(|shared| {
            f(&mut shared.page.preferences);
            shared.page.preferences.clone()
        });
        self.persist(&preferences);
    }

    fn persist(&self, preferences: &ViewPreferences) {
        if let Err(e) = self.inner.storage.save(PREFERENCES_NAMESPACE, preferences) {
            warn!(error = %e, "failed to persist view preferences");
        }
    }

    /// Applies `f` under the state lock and publishes the result.
    fn update<T>(&self, f: impl FnOnce(&mut Shared) -> T) -> T {
        let mut shared = self.inner.shared.lock();
        let value = f(&mut shared);
        self.inner.tx.send_replace(shared.page.clone());
        value
    }
}

fn detail_message(err: &DetailError) -> String {
    match err {
        DetailError::NotFound(_) => NOT_FOUND_MESSAGE.to_string(),
        DetailError::AccessDenied(_) => ACCESS_DENIED_MESSAGE.to_string(),
        DetailError::Validation(message) => format!("Invalid request: {message}"),
        DetailError::Fetch(_) => FETCH_FAILED_MESSAGE.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preferences::MemoryPreferenceStorage;
    use crate::state::MAX_RETRIES;
    use jiff::{SignedDuration, Timestamp};
    use webvault_cache::MokaItemCache;
    use webvault_core::{ManualClock, Strategy};
    use webvault_detail::DetailService;
    use webvault_storage::InMemoryRepository;
    use webvault_test_infra::{FailingRepository, ItemFixture};

    type Store = PageStore<DetailService<InMemoryRepository, MokaItemCache>>;

    fn store(records: Vec<ItemFixture>) -> Store {
        let repo = InMemoryRepository::with_records(records.into_iter().map(ItemFixture::record));
        let service = DetailService::new(repo, MokaItemCache::new());
        PageStore::new(service, MemoryPreferenceStorage::new())
    }

    #[test]
    fn messages_per_error_kind() {
        assert_eq!(detail_message(&DetailError::NotFound("x".into())), "Website not found");
        assert_eq!(
            detail_message(&DetailError::AccessDenied("x".into())),
            "This website is private or inactive"
        );
        assert_eq!(
            detail_message(&DetailError::Validation("empty id".into())),
            "Invalid request: empty id"
        );
    }

    #[tokio::test]
    async fn load_detail_then_related() {
        let store = store(vec![
            ItemFixture::builder().id("w1").tags(&["rust"]).build(),
            ItemFixture::builder().id("w2").tags(&["rust"]).build(),
        ]);

        store.load_detail("w1", false).await;

        let state = store.state();
        assert_eq!(state.current_id.as_deref(), Some("w1"));
        assert!(state.is_showing("w1"));
        assert!(!state.loading.detail && !state.loading.related);
        assert_eq!(state.related.len(), 1);
        assert_eq!(state.related[0].id.as_str(), "w2");

        let session = state.session.unwrap();
        assert!(session.active);
        assert!(!session.has_recorded_visit);
    }

    #[tokio::test]
    async fn not_found_sets_error_and_counts_retry() {
        let store = store(vec![]);

        store.load_detail("missing-id", false).await;

        let state = store.state();
        assert!(state.item.is_none());
        assert_eq!(state.errors.detail.as_deref(), Some("Website not found"));
        assert_eq!(state.retry_count, 1);
    }

    #[tokio::test]
    async fn retry_is_capped() {
        let service = DetailService::new(FailingRepository, MokaItemCache::new());
        let store = PageStore::new(service, MemoryPreferenceStorage::new());

        store.load_detail("w1", false).await;
        assert_eq!(
            store.state().errors.detail.as_deref(),
            Some("Failed to load website details. Please try again.")
        );

        assert!(store.retry_load().await);
        assert!(store.retry_load().await);
        assert_eq!(store.state().retry_count, MAX_RETRIES);

        assert!(!store.retry_load().await);
        assert_eq!(store.state().retry_count, MAX_RETRIES);
    }

    #[tokio::test]
    async fn retry_without_current_id_does_nothing() {
        let store = store(vec![]);
        assert!(!store.retry_load().await);
    }

    #[tokio::test]
    async fn successful_retry_clears_counter() {
        let store = store(vec![]);
        store.load_detail("w1", false).await;
        assert_eq!(store.state().retry_count, 1);

        store
            .resolver()
            .repository()
            .upsert(ItemFixture::builder().id("w1").build().record());

        assert!(store.retry_load().await);
        let state = store.state();
        assert!(state.is_showing("w1"));
        assert_eq!(state.retry_count, 0);
        assert_eq!(state.errors.detail, None);
    }

    #[tokio::test]
    async fn visit_patches_item_and_is_remembered() {
        let store = store(vec![ItemFixture::builder().id("w1").visit_count(4).build()]);
        store.load_detail("w1", false).await;

        let first = store.track_visit("w1").await;
        let second = store.track_visit("w1").await;

        assert_eq!(first, second);
        assert_eq!(first.new_visit_count, 5);

        let state = store.state();
        assert_eq!(state.item.unwrap().visit_count, 5);
        let session = state.session.unwrap();
        assert!(session.has_recorded_visit);
        assert_eq!(session.last_visit, Some(first));
    }

    #[tokio::test]
    async fn forced_reload_starts_a_new_session() {
        let store = store(vec![ItemFixture::builder().id("w1").build()]);
        store.load_detail("w1", false).await;
        store.track_visit("w1").await;
        let first_session = store.state().session.unwrap().id;

        store.load_detail("w1", true).await;
        let session = store.state().session.unwrap();
        assert_ne!(session.id, first_session);
        assert!(!session.has_recorded_visit);

        assert_eq!(store.track_visit("w1").await.new_visit_count, 2);
    }

    #[tokio::test]
    async fn preferences_are_persisted_and_restored() {
        let storage = Arc::new(MemoryPreferenceStorage::new());
        let service = DetailService::new(InMemoryRepository::new(), MokaItemCache::new());
        let store = PageStore::new(service.clone(), Arc::clone(&storage));

        store.set_related_config(RelatedConfigPatch {
            strategy: Some(Strategy::Content),
            ..RelatedConfigPatch::default()
        });
        store.toggle_fullscreen();
        store.toggle_related_panel();

        let restored = PageStore::new(service, storage);
        let preferences = restored.state().preferences;
        assert_eq!(preferences.related.strategy, Strategy::Content);
        assert!(preferences.panels.fullscreen);
        assert!(!preferences.panels.related);
    }

    #[tokio::test]
    async fn interaction_is_session_only() {
        let store = store(vec![]);

        assert!(store.toggle_bookmark());
        assert_eq!(store.record_share(), 1);
        assert_eq!(store.record_share(), 2);
        assert!(!store.toggle_bookmark());

        store.toggle_share_panel();
        store.soft_reset();

        let state = store.state();
        assert_eq!(state.interaction.share_count, 0);
        assert!(state.preferences.panels.share);

        store.reset();
        assert!(!store.state().preferences.panels.share);
    }

    #[tokio::test]
    async fn end_session_accumulates_time() {
        let clock = ManualClock::new(Timestamp::from_second(1_700_000_000).unwrap());
        let repo = InMemoryRepository::with_records([ItemFixture::builder().id("w1").build().record()]);
        let service = DetailService::new(repo, MokaItemCache::new());
        let store = PageStore::with_clock(service, MemoryPreferenceStorage::new(), clock.clone());

        store.load_detail("w1", false).await;
        clock.advance(SignedDuration::from_secs(42));
        store.end_session();

        let session = store.state().session.unwrap();
        assert!(!session.active);
        assert_eq!(session.accumulated, SignedDuration::from_secs(42));
    }

    #[tokio::test]
    async fn subscribers_see_updates() {
        let store = store(vec![ItemFixture::builder().id("w1").build()]);
        let mut rx = store.subscribe();

        store.load_detail("w1", false).await;

        assert!(rx.has_changed().unwrap());
        assert!(rx.borrow_and_update().is_showing("w1"));
    }
}
