use thiserror::Error;

pub type Result<T> = std::result::Result<T, PreferenceError>;

/// Errors raised while loading or saving view preferences.
#[derive(Debug, Clone, Error)]
pub enum PreferenceError {
    #[error("preference storage I/O failed: {0}")]
    Io(String),
    #[error("preference serialization failed: {0}")]
    Serialization(String),
}

impl From<std::io::Error> for PreferenceError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value.to_string())
    }
}

impl From<serde_json::Error> for PreferenceError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialization(value.to_string())
    }
}
