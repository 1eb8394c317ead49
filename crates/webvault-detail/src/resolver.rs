use crate::Result;
use async_trait::async_trait;
use webvault_core::{CardSummary, Item, RelatedOptions, VisitOutcome};

/// Resolves website details for a UI layer.
///
/// Ids are taken as raw strings since they come straight from routes and
/// query parameters; implementations validate them.
#[async_trait]
pub trait DetailResolver: Send + Sync + 'static {
    /// Resolves an id to a normalized, access-checked website detail.
    async fn get_by_id(&self, id: &str) -> Result<Item>;

    /// Ranks the websites most related to `id`.
    async fn get_related(&self, id: &str, options: &RelatedOptions) -> Result<Vec<CardSummary>>;

    /// Records one visit to `id`. Never fails; see [`VisitOutcome`].
    async fn track_visit(&self, id: &str) -> VisitOutcome;
}
