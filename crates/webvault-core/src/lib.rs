//! Core types and traits for the WebVault website directory.
//!
//! This crate provides the domain model shared by the detail service, the
//! repository and cache backends and the page state store.

pub mod cache;
pub mod clock;
pub mod error;
pub mod item;
pub mod item_id;
pub mod record;
pub mod related;
pub mod repository;
pub mod visit;

pub use cache::ItemCache;
pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{CacheError, CoreError, StorageError};
pub use item::{Access, CardSummary, Category, Item, ItemStatus, Pricing, VisitStats};
pub use item_id::ItemId;
pub use record::{CatalogRecord, ListingRecord, SourceRecord};
pub use related::{RelatedKey, RelatedOptions, Strategy, MAX_RELATED_LIMIT, MIN_RELATED_LIMIT};
pub use repository::{ReadRepository, Repository};
pub use visit::VisitOutcome;
