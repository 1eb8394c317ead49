use async_trait::async_trait;
use jiff::Timestamp;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use webvault_core::repository::Result;
use webvault_core::{ItemId, ReadRepository, Repository, SourceRecord, StorageError};

/// Wraps a repository and counts the calls made through it.
///
/// An optional delay is applied before every call, which lets tests keep
/// several operations in flight at once.
#[derive(Debug)]
pub struct CountingRepository<R> {
    inner: R,
    delay: Option<Duration>,
    finds: AtomicUsize,
    lists: AtomicUsize,
    mutations: AtomicUsize,
}

impl<R> CountingRepository<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            delay: None,
            finds: AtomicUsize::new(0),
            lists: AtomicUsize::new(0),
            mutations: AtomicUsize::new(0),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn inner(&self) -> &R {
        &self.inner
    }

    pub fn finds(&self) -> usize {
        self.finds.load(Ordering::SeqCst)
    }

    pub fn lists(&self) -> usize {
        self.lists.load(Ordering::SeqCst)
    }

    pub fn mutations(&self) -> usize {
        self.mutations.load(Ordering::SeqCst)
    }

    async fn pause(&self) {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
    }
}

#[async_trait]
impl<R: ReadRepository> ReadRepository for CountingRepository<R> {
    async fn find_by_id(&self, id: &ItemId) -> Result<Option<SourceRecord>> {
        self.finds.fetch_add(1, Ordering::SeqCst);
        self.pause().await;
        self.inner.find_by_id(id).await
    }

    async fn list_all(&self) -> Result<Vec<SourceRecord>> {
        self.lists.fetch_add(1, Ordering::SeqCst);
        self.pause().await;
        self.inner.list_all().await
    }
}

#[async_trait]
impl<R: Repository> Repository for CountingRepository<R> {
    async fn mutate_visit_count(
        &self,
        id: &ItemId,
        visit_count: u64,
        updated_at: Timestamp,
    ) -> Result<bool> {
        self.mutations.fetch_add(1, Ordering::SeqCst);
        self.pause().await;
        self.inner.mutate_visit_count(id, visit_count, updated_at).await
    }
}

/// A repository whose every call fails with [`StorageError::Unavailable`].
#[derive(Debug, Clone, Default)]
pub struct FailingRepository;

impl FailingRepository {
    fn error() -> StorageError {
        StorageError::Unavailable("repository is offline".to_string())
    }
}

#[async_trait]
impl ReadRepository for FailingRepository {
    async fn find_by_id(&self, _id: &ItemId) -> Result<Option<SourceRecord>> {
        Err(Self::error())
    }

    async fn list_all(&self) -> Result<Vec<SourceRecord>> {
        Err(Self::error())
    }
}

#[async_trait]
impl Repository for FailingRepository {
    async fn mutate_visit_count(
        &self,
        _id: &ItemId,
        _visit_count: u64,
        _updated_at: Timestamp,
    ) -> Result<bool> {
        Err(Self::error())
    }
}
