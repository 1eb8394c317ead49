//! Shared fixtures and repository doubles for WebVault tests.

pub mod cache;
pub mod fixtures;
pub mod repository;

pub use cache::{CountingCache, FailingCache};
pub use fixtures::{category, ItemFixture, FIXTURE_TIME};
pub use repository::{CountingRepository, FailingRepository};
