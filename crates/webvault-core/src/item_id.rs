use crate::error::{CoreError, Result};
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// A validated, stable identifier of a cataloged website.
///
/// Ids are trimmed on construction and must be 1-128 characters long.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ItemId(String);

const MAX_LENGTH: usize = 128;

impl ItemId {
    /// Creates a new `ItemId` after trimming and validating the input.
    pub fn new(id: impl AsRef<str>) -> Result<Self> {
        let id = id.as_ref().trim();
        Self::validate(id)?;
        Ok(Self(id.to_owned()))
    }

    /// Creates an `ItemId` without validation.
    ///
    /// Use this only for ids produced by trusted internal sources
    /// (e.g. records already stored in a repository).
    pub fn new_unchecked(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn validate(id: &str) -> Result<()> {
        if id.is_empty() {
            return Err(CoreError::InvalidItemId(
                "website id cannot be empty".to_string(),
            ));
        }

        if id.len() > MAX_LENGTH {
            return Err(CoreError::InvalidItemId(format!(
                "length must be at most {}, got {}",
                MAX_LENGTH,
                id.len()
            )));
        }

        Ok(())
    }
}

impl Display for ItemId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ItemId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for ItemId {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self> {
        Self::new(value)
    }
}

impl From<ItemId> for String {
    fn from(value: ItemId) -> Self {
        value.0
    }
}
