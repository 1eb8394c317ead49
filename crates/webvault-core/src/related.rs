use crate::item_id::ItemId;
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::fmt::Display;
use std::str::FromStr;

/// Smallest number of related websites that may be requested.
pub const MIN_RELATED_LIMIT: usize = 1;
/// Largest number of related websites that may be requested.
pub const MAX_RELATED_LIMIT: usize = 20;

/// The algorithm used to score relatedness between two websites.
///
/// Parsing is lenient: any unrecognized name falls back to [`Strategy::Mixed`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum Strategy {
    Category,
    Tags,
    Content,
    #[default]
    Mixed,
}

impl Strategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::Category => "category",
            Strategy::Tags => "tags",
            Strategy::Content => "content",
            Strategy::Mixed => "mixed",
        }
    }
}

impl FromStr for Strategy {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_ascii_lowercase().as_str() {
            "category" => Strategy::Category,
            "tags" => Strategy::Tags,
            "content" => Strategy::Content,
            _ => Strategy::Mixed,
        })
    }
}

impl From<String> for Strategy {
    fn from(value: String) -> Self {
        match value.parse() {
            Ok(strategy) => strategy,
            Err(never) => match never {},
        }
    }
}

impl Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Options for ranking related websites.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RelatedOptions {
    pub strategy: Strategy,
    /// Number of results, in `[MIN_RELATED_LIMIT, MAX_RELATED_LIMIT]`.
    pub limit: usize,
    pub exclude_self: bool,
    /// Candidates scoring below this value are dropped.
    pub min_score: f64,
    pub include_ads: bool,
}

impl Default for RelatedOptions {
    fn default() -> Self {
        Self {
            strategy: Strategy::Mixed,
            limit: 3,
            exclude_self: true,
            min_score: 0.1,
            include_ads: false,
        }
    }
}

impl RelatedOptions {
    pub fn limit_in_range(&self) -> bool {
        (MIN_RELATED_LIMIT..=MAX_RELATED_LIMIT).contains(&self.limit)
    }
}

/// Cache key of a related-websites query.
///
/// `min_score` is not part of the key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RelatedKey {
    pub id: ItemId,
    pub strategy: Strategy,
    pub limit: usize,
    pub exclude_self: bool,
    pub include_ads: bool,
}

impl RelatedKey {
    pub fn new(id: &ItemId, options: &RelatedOptions) -> Self {
        Self {
            id: id.clone(),
            strategy: options.strategy,
            limit: options.limit,
            exclude_self: options.exclude_self,
            include_ads: options.include_ads,
        }
    }
}

impl Display for RelatedKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}:{}:{}:{}:{}",
            self.id, self.strategy, self.limit, self.exclude_self, self.include_ads
        )
    }
}
