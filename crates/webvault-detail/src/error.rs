use thiserror::Error;
use webvault_core::{CacheError, CoreError, StorageError};

pub type Result<T> = std::result::Result<T, DetailError>;

#[derive(Debug, Clone, Error)]
pub enum DetailError {
    /// The caller supplied malformed input, or a record failed validation.
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("website not found: {0}")]
    NotFound(String),
    /// The website exists but is private, unreachable or not active.
    #[error("website is not accessible: {0}")]
    AccessDenied(String),
    #[error("failed to fetch website data: {0}")]
    Fetch(#[source] FetchError),
}

/// The underlying cause of a [`DetailError::Fetch`].
#[derive(Debug, Clone, Error)]
pub enum FetchError {
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Cache(#[from] CacheError),
}

impl From<StorageError> for DetailError {
    fn from(value: StorageError) -> Self {
        Self::Fetch(value.into())
    }
}

impl From<CacheError> for DetailError {
    fn from(value: CacheError) -> Self {
        Self::Fetch(value.into())
    }
}

impl From<CoreError> for DetailError {
    fn from(value: CoreError) -> Self {
        match value {
            CoreError::InvalidItemId(message) => Self::Validation(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn fetch_keeps_original_cause() {
        let err = DetailError::from(StorageError::Unavailable("db down".to_string()));

        assert!(matches!(err, DetailError::Fetch(FetchError::Storage(_))));
        let source = err.source().expect("fetch errors carry a source");
        assert!(source.to_string().contains("db down"));
    }

    #[test]
    fn invalid_id_is_a_validation_error() {
        let err = DetailError::from(CoreError::InvalidItemId("empty".to_string()));
        assert!(matches!(err, DetailError::Validation(_)));
    }
}
