use crate::error::StorageError;
use crate::item_id::ItemId;
use crate::record::SourceRecord;
use async_trait::async_trait;
use jiff::Timestamp;

/// Type alias for repository results.
pub type Result<T> = std::result::Result<T, StorageError>;

/// A read-only view of the website catalog.
#[async_trait]
pub trait ReadRepository: Send + Sync + 'static {
    /// Retrieves the raw record for a given id.
    /// Returns `None` if the id does not exist.
    async fn find_by_id(&self, id: &ItemId) -> Result<Option<SourceRecord>>;

    /// Returns every record in repository order.
    async fn list_all(&self) -> Result<Vec<SourceRecord>>;
}

#[async_trait]
pub trait Repository: ReadRepository {
    /// Overwrites the visit counter of a record and stamps `updated_at`.
    ///
    /// Returns `Ok(false)` if the id does not exist.
    async fn mutate_visit_count(
        &self,
        id: &ItemId,
        visit_count: u64,
        updated_at: Timestamp,
    ) -> Result<bool>;
}
