//! Content repository backends for the website catalog.

pub mod memory;

pub use memory::InMemoryRepository;
pub use webvault_core::{ReadRepository, Repository, StorageError};
