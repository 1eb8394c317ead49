//! Process-local cache implementations for resolved website details.

pub mod moka;

pub use self::moka::{CacheConfig, MokaItemCache};
pub use webvault_core::{CacheError, ItemCache};
