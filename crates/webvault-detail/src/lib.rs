//! Detail resolution service for the WebVault website directory.
//!
//! This crate provides a [`DetailService`] that resolves website ids to
//! normalized details, ranks related websites and records visits. It sits
//! between a [`Repository`](webvault_core::Repository) holding raw catalog
//! records and an [`ItemCache`](webvault_core::ItemCache) holding resolved
//! results.
//!
//! # Example
//!
//! ```rust
//! use webvault_cache::MokaItemCache;
//! use webvault_core::RelatedOptions;
//! use webvault_detail::DetailService;
//! use webvault_storage::InMemoryRepository;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let service = DetailService::new(InMemoryRepository::new(), MokaItemCache::new());
//!
//! let item = service.get_by_id("w1").await?;
//! println!("{} ({} visits)", item.title, item.visit_count);
//!
//! for card in service.get_related("w1", &RelatedOptions::default()).await? {
//!     println!("related: {}", card.title);
//! }
//!
//! let outcome = service.track_visit("w1").await;
//! assert!(outcome.success);
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod normalize;
pub mod resolver;
pub mod service;
pub mod similarity;

pub use error::{DetailError, FetchError, Result};
pub use normalize::{popularity_score, Normalizer};
pub use resolver::DetailResolver;
pub use service::DetailService;
