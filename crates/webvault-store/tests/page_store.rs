use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use webvault_cache::MokaItemCache;
use webvault_core::{
    CardSummary, Item, ItemId, RelatedOptions, Strategy, VisitOutcome, MIN_RELATED_LIMIT,
};
use webvault_detail::{DetailResolver, DetailService, Result};
use webvault_storage::InMemoryRepository;
use webvault_store::{
    FilePreferenceStorage, MemoryPreferenceStorage, PageStore, PreferenceStorage,
    RelatedConfigPatch, ViewPreferences, PREFERENCES_NAMESPACE,
};
use webvault_test_infra::{CountingCache, CountingRepository, FailingCache, ItemFixture};

type CountingService =
    DetailService<CountingRepository<InMemoryRepository>, CountingCache<MokaItemCache>>;

fn counting_service(records: Vec<ItemFixture>, delay: Duration) -> CountingService {
    let repo = InMemoryRepository::with_records(records.into_iter().map(ItemFixture::record));
    DetailService::new(
        CountingRepository::new(repo).with_delay(delay),
        CountingCache::new(MokaItemCache::new()),
    )
}

/// Delays detail lookups of selected ids.
struct SlowResolver<D> {
    inner: D,
    delays: HashMap<String, Duration>,
}

#[async_trait]
impl<D: DetailResolver> DetailResolver for SlowResolver<D> {
    async fn get_by_id(&self, id: &str) -> Result<Item> {
        if let Some(delay) = self.delays.get(id) {
            tokio::time::sleep(*delay).await;
        }
        self.inner.get_by_id(id).await
    }

    async fn get_related(&self, id: &str, options: &RelatedOptions) -> Result<Vec<CardSummary>> {
        self.inner.get_related(id, options).await
    }

    async fn track_visit(&self, id: &str) -> VisitOutcome {
        self.inner.track_visit(id).await
    }
}

#[tokio::test]
async fn concurrent_visits_record_once_per_session() {
    let service = counting_service(
        vec![ItemFixture::builder().id("w1").visit_count(10).build()],
        Duration::from_millis(20),
    );
    let store = PageStore::new(service, MemoryPreferenceStorage::new());
    store.load_detail("w1", false).await;

    let (a, b, c) = tokio::join!(
        store.track_visit("w1"),
        store.track_visit("w1"),
        store.track_visit("w1"),
    );

    assert_eq!(store.resolver().repository().mutations(), 1);
    assert_eq!(store.resolver().cache().invalidations(), 1);
    for outcome in [&a, &b, &c] {
        assert!(outcome.success);
        assert_eq!(outcome.new_visit_count, 11);
    }
    assert_eq!(store.state().item.unwrap().visit_count, 11);
}

#[tokio::test]
async fn duplicate_in_flight_load_is_dropped() {
    let service = counting_service(
        vec![ItemFixture::builder().id("w1").build()],
        Duration::from_millis(20),
    );
    let store = PageStore::new(service, MemoryPreferenceStorage::new());

    tokio::join!(store.load_detail("w1", false), store.load_detail("w1", false));

    let repo = store.resolver().repository();
    // one detail lookup plus one anchor lookup for related websites
    assert_eq!(repo.finds(), 2);
    assert_eq!(repo.lists(), 1);

    store.load_detail("w1", false).await;
    assert_eq!(repo.finds(), 2);
}

#[tokio::test]
async fn superseded_load_does_not_overwrite_newer_one() {
    let repo = InMemoryRepository::with_records([
        ItemFixture::builder().id("slow").build().record(),
        ItemFixture::builder().id("fast").build().record(),
    ]);
    let resolver = SlowResolver {
        inner: DetailService::new(repo, MokaItemCache::new()),
        delays: HashMap::from([("slow".to_string(), Duration::from_millis(50))]),
    };
    let store = PageStore::new(resolver, MemoryPreferenceStorage::new());

    tokio::join!(store.load_detail("slow", false), store.load_detail("fast", false));

    let state = store.state();
    assert_eq!(state.current_id.as_deref(), Some("fast"));
    assert!(state.is_showing("fast"));
    assert!(!state.loading.detail);
}

#[tokio::test]
async fn related_failure_leaves_detail_intact() {
    let repo = InMemoryRepository::with_records([ItemFixture::builder().id("w1").build().record()]);
    let service = DetailService::new(repo, MokaItemCache::new());
    let store = PageStore::new(service, MemoryPreferenceStorage::new());
    store.load_detail("w1", false).await;

    // the detail stays cached; a fresh ranking needs the anchor record
    store.resolver().repository().remove(&ItemId::new_unchecked("w1"));
    store
        .load_related(
            "w1",
            Some(RelatedConfigPatch {
                strategy: Some(Strategy::Content),
                ..RelatedConfigPatch::default()
            }),
        )
        .await;

    let state = store.state();
    assert!(state.is_showing("w1"));
    assert_eq!(state.errors.detail, None);
    assert_eq!(
        state.errors.related.as_deref(),
        Some("Failed to load related websites")
    );
    assert!(state.related.is_empty());
}

#[tokio::test]
async fn out_of_range_limit_never_reaches_storage() {
    let storage = Arc::new(MemoryPreferenceStorage::new());
    let service = DetailService::new(InMemoryRepository::new(), MokaItemCache::new());
    let store = PageStore::new(service, Arc::clone(&storage));

    store.set_related_config(RelatedConfigPatch {
        limit: Some(0),
        ..RelatedConfigPatch::default()
    });

    let saved = storage.load(PREFERENCES_NAMESPACE).unwrap().unwrap();
    assert_eq!(saved.related.limit, MIN_RELATED_LIMIT);
}

#[tokio::test]
async fn restored_out_of_range_limit_still_loads_related() {
    let storage = Arc::new(MemoryPreferenceStorage::new());
    let mut poisoned = ViewPreferences::default();
    poisoned.related.strategy = Strategy::Tags;
    poisoned.related.limit = 0;
    storage.save(PREFERENCES_NAMESPACE, &poisoned).unwrap();

    let repo = InMemoryRepository::with_records([
        ItemFixture::builder().id("w1").tags(&["rust"]).build().record(),
        ItemFixture::builder().id("w2").tags(&["rust"]).build().record(),
    ]);
    let service = DetailService::new(repo, MokaItemCache::new());
    let store = PageStore::new(service, storage);
    assert_eq!(store.state().preferences.related.limit, MIN_RELATED_LIMIT);

    store.load_detail("w1", false).await;

    let state = store.state();
    assert_eq!(state.errors.related, None);
    assert_eq!(state.related.len(), 1);
}

#[tokio::test]
async fn load_related_patch_is_persisted() {
    let dir = tempfile::tempdir().unwrap();
    let repo = InMemoryRepository::with_records([
        ItemFixture::builder().id("w1").tags(&["rust"]).build().record(),
        ItemFixture::builder().id("w2").tags(&["rust"]).build().record(),
    ]);
    let service = DetailService::new(repo, MokaItemCache::new());
    let store = PageStore::new(service.clone(), FilePreferenceStorage::new(dir.path()));
    store.load_detail("w1", false).await;

    store
        .load_related(
            "w1",
            Some(RelatedConfigPatch {
                strategy: Some(Strategy::Tags),
                limit: Some(5),
                ..RelatedConfigPatch::default()
            }),
        )
        .await;
    assert_eq!(store.state().related.len(), 1);

    let reopened = PageStore::new(service, FilePreferenceStorage::new(dir.path()));
    let related = reopened.state().preferences.related;
    assert_eq!(related.strategy, Strategy::Tags);
    assert_eq!(related.limit, 5);
    assert!(dir
        .path()
        .join(format!("{PREFERENCES_NAMESPACE}.json"))
        .exists());
}

#[tokio::test]
async fn preload_errors_are_swallowed() {
    let service = counting_service(vec![], Duration::ZERO);
    let store = PageStore::new(service, MemoryPreferenceStorage::new());

    store.preload_related("missing-id").await;

    let state = store.state();
    assert_eq!(state.errors.related, None);
    assert!(state.related.is_empty());
}

#[tokio::test]
async fn preload_warms_cache_for_other_ids() {
    let service = counting_service(
        vec![
            ItemFixture::builder().id("w1").tags(&["rust"]).build(),
            ItemFixture::builder().id("w2").tags(&["rust"]).build(),
        ],
        Duration::ZERO,
    );
    let store = PageStore::new(service, MemoryPreferenceStorage::new());
    store.load_detail("w1", false).await;
    let shown = store.state().related;

    store.preload_related("w2").await;
    let lists = store.resolver().repository().lists();

    // the page still shows w1's related websites
    assert_eq!(store.state().related, shown);

    store.load_related("w2", None).await;
    assert_eq!(store.resolver().repository().lists(), lists);
}

#[tokio::test]
async fn visit_with_failing_cache_still_counts() {
    let repo = InMemoryRepository::with_records([ItemFixture::builder().id("w1").build().record()]);
    let store = PageStore::new(
        DetailService::new(repo, FailingCache),
        MemoryPreferenceStorage::new(),
    );
    store.load_detail("w1", false).await;

    let outcome = store.track_visit("w1").await;
    assert!(outcome.success);
    assert_eq!(store.state().item.unwrap().visit_count, 1);
}

#[tokio::test]
async fn visit_outside_session_passes_through() {
    let service = counting_service(
        vec![
            ItemFixture::builder().id("w1").build(),
            ItemFixture::builder().id("w2").build(),
        ],
        Duration::ZERO,
    );
    let store = PageStore::new(service, MemoryPreferenceStorage::new());
    store.load_detail("w1", false).await;

    store.track_visit("w2").await;
    store.track_visit("w2").await;

    assert_eq!(store.resolver().repository().mutations(), 2);
    assert_eq!(store.state().item.unwrap().visit_count, 0);
}

#[tokio::test]
async fn shared_store_handles_are_one_store() {
    let service = counting_service(vec![ItemFixture::builder().id("w1").build()], Duration::ZERO);
    let store = PageStore::new(service, MemoryPreferenceStorage::new());
    let other = store.clone();

    other.load_detail("w1", false).await;
    assert!(store.state().is_showing("w1"));
}
