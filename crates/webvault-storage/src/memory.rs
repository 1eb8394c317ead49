use async_trait::async_trait;
use dashmap::DashMap;
use jiff::Timestamp;
use parking_lot::RwLock;
use tracing::{debug, trace};
use webvault_core::repository::Result;
use webvault_core::{ItemId, ReadRepository, Repository, SourceRecord};

/// In-memory implementation of the repository traits.
///
/// Records live in a `DashMap` keyed by id. A separate insertion-order list
/// keeps [`ReadRepository::list_all`] stable, which related-website ranking
/// relies on to break score ties.
#[derive(Debug, Default)]
pub struct InMemoryRepository {
    storage: DashMap<ItemId, SourceRecord>,
    order: RwLock<Vec<ItemId>>,
}

impl InMemoryRepository {
    /// Creates a new, empty in-memory repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a repository seeded with `records`, in the given order.
    ///
    /// Later records replace earlier ones with the same id but keep the
    /// original position.
    pub fn with_records(records: impl IntoIterator<Item = SourceRecord>) -> Self {
        let repo = Self::new();
        for record in records {
            repo.upsert(record);
        }
        repo
    }

    /// Inserts or replaces a record. New ids are appended to the end of the
    /// repository order.
    pub fn upsert(&self, record: SourceRecord) {
        let id = record.id().clone();
        trace!(id = %id, "upserting record");

        if self.storage.insert(id.clone(), record).is_none() {
            self.order.write().push(id);
        }
    }

    /// Removes a record. Returns `true` if the record existed.
    pub fn remove(&self, id: &ItemId) -> bool {
        let removed = self.storage.remove(id).is_some();
        if removed {
            self.order.write().retain(|existing| existing != id);
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.storage.len()
    }

    pub fn is_empty(&self) -> bool {
        self.storage.is_empty()
    }
}

#[async_trait]
impl ReadRepository for InMemoryRepository {
    async fn find_by_id(&self, id: &ItemId) -> Result<Option<SourceRecord>> {
        Ok(self.storage.get(id).map(|entry| entry.value().clone()))
    }

    async fn list_all(&self) -> Result<Vec<SourceRecord>> {
        let order = self.order.read();
        Ok(order
            .iter()
            .filter_map(|id| self.storage.get(id).map(|entry| entry.value().clone()))
            .collect())
    }
}

#[async_trait]
impl Repository for InMemoryRepository {
    async fn mutate_visit_count(
        &self,
        id: &ItemId,
        visit_count: u64,
        updated_at: Timestamp,
    ) -> Result<bool> {
        let Some(mut entry) = self.storage.get_mut(id) else {
            return Ok(false);
        };

        entry.set_visit_count(visit_count, updated_at);
        debug!(id = %id, visit_count, "visit count updated");
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use webvault_core::ListingRecord;

    fn id(s: &str) -> ItemId {
        ItemId::new_unchecked(s)
    }

    fn listing(s: &str, title: &str) -> SourceRecord {
        SourceRecord::Listing(ListingRecord {
            id: id(s),
            title: title.to_string(),
            description: None,
            url: format!("https://{s}.test"),
            favicon_url: None,
            image_url: None,
            tags: vec![],
            category: None,
            is_ad: false,
            rating: None,
            visit_count: 0,
            is_featured: false,
            created_at: None,
            updated_at: None,
        })
    }

    #[tokio::test]
    async fn upsert_and_find() {
        let repo = InMemoryRepository::new();
        repo.upsert(listing("w1", "Demo"));

        let found = repo.find_by_id(&id("w1")).await.unwrap().unwrap();
        assert_eq!(found.title(), "Demo");
    }

    #[tokio::test]
    async fn find_nonexistent() {
        let repo = InMemoryRepository::new();
        assert!(repo.find_by_id(&id("nope")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn list_all_keeps_insertion_order() {
        let repo = InMemoryRepository::with_records([
            listing("c", "C"),
            listing("a", "A"),
            listing("b", "B"),
        ]);

        let ids: Vec<String> = repo
            .list_all()
            .await
            .unwrap()
            .iter()
            .map(|r| r.id().to_string())
            .collect();
        assert_eq!(ids, ["c", "a", "b"]);
    }

    #[tokio::test]
    async fn replacing_keeps_position() {
        let repo = InMemoryRepository::with_records([listing("a", "A"), listing("b", "B")]);
        repo.upsert(listing("a", "A2"));

        let all = repo.list_all().await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].title(), "A2");
        assert_eq!(all[1].title(), "B");
    }

    #[tokio::test]
    async fn remove_drops_from_order() {
        let repo = InMemoryRepository::with_records([listing("a", "A"), listing("b", "B")]);

        assert!(repo.remove(&id("a")));
        assert!(!repo.remove(&id("a")));

        let all = repo.list_all().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].id().as_str(), "b");
    }

    #[tokio::test]
    async fn mutate_visit_count_existing() {
        let repo = InMemoryRepository::with_records([listing("w1", "Demo")]);
        let at = Timestamp::from_second(1_700_000_000).unwrap();

        assert!(repo.mutate_visit_count(&id("w1"), 7, at).await.unwrap());

        let found = repo.find_by_id(&id("w1")).await.unwrap().unwrap();
        assert_eq!(found.visit_count(), 7);
    }

    #[tokio::test]
    async fn mutate_visit_count_nonexistent() {
        let repo = InMemoryRepository::new();
        let at = Timestamp::now();

        assert!(!repo.mutate_visit_count(&id("nope"), 1, at).await.unwrap());
    }

    #[tokio::test]
    async fn concurrent_access() {
        use std::sync::Arc;

        let repo = Arc::new(InMemoryRepository::new());
        let mut handles = vec![];

        for i in 0..10u64 {
            let repo = Arc::clone(&repo);
            handles.push(tokio::spawn(async move {
                repo.upsert(listing(&format!("w-{i:03}"), "Site"));
            }));
        }

        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(repo.len(), 10);
        assert_eq!(repo.list_all().await.unwrap().len(), 10);
    }
}
