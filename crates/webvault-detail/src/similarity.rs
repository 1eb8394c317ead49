//! Relatedness scoring between two websites.
//!
//! Every scorer is a pure function returning a value in `[0, 1]`.

use std::collections::HashSet;
use webvault_core::{Item, Strategy};

/// Score for two websites filed under the same category.
pub const SAME_CATEGORY_SCORE: f64 = 1.0;
/// Score for two websites whose categories are listed as neighbours.
pub const RELATED_CATEGORY_SCORE: f64 = 0.6;
/// Score for any other pair, including websites without a category.
pub const UNRELATED_CATEGORY_SCORE: f64 = 0.1;
/// Floor used when both compared sets are empty, so untagged or
/// undescribed websites are not scored as completely unrelated.
pub const EMPTY_SETS_SCORE: f64 = 0.1;

const CATEGORY_WEIGHT: f64 = 0.5;
const TAGS_WEIGHT: f64 = 0.3;
const CONTENT_WEIGHT: f64 = 0.2;

/// Category names considered neighbours. Lookup goes both ways.
const RELATED_CATEGORIES: &[(&str, &[&str])] = &[
    ("development", &["design", "devops", "ai"]),
    ("design", &["development", "productivity"]),
    ("ai", &["development", "data"]),
    ("productivity", &["design", "business"]),
    ("marketing", &["business", "analytics"]),
    ("business", &["marketing", "finance"]),
];

/// Scores `candidate` against `anchor` under `strategy`.
pub fn score(strategy: Strategy, anchor: &Item, candidate: &Item) -> f64 {
    match strategy {
        Strategy::Category => category_score(anchor, candidate),
        Strategy::Tags => tag_score(anchor, candidate),
        Strategy::Content => content_score(anchor, candidate),
        Strategy::Mixed => mixed_score(anchor, candidate),
    }
}

pub fn category_score(anchor: &Item, candidate: &Item) -> f64 {
    let (Some(a), Some(b)) = (&anchor.category, &candidate.category) else {
        return UNRELATED_CATEGORY_SCORE;
    };

    if a.id == b.id {
        return SAME_CATEGORY_SCORE;
    }

    if categories_related(&a.name, &b.name) {
        RELATED_CATEGORY_SCORE
    } else {
        UNRELATED_CATEGORY_SCORE
    }
}

/// Jaccard similarity of the two tag sets, case-insensitive.
pub fn tag_score(anchor: &Item, candidate: &Item) -> f64 {
    jaccard(&tag_set(anchor), &tag_set(candidate))
}

/// Jaccard similarity of the words (longer than two characters) in title
/// and description, case-insensitive.
pub fn content_score(anchor: &Item, candidate: &Item) -> f64 {
    jaccard(&word_set(anchor), &word_set(candidate))
}

pub fn mixed_score(anchor: &Item, candidate: &Item) -> f64 {
    let blended = CATEGORY_WEIGHT * category_score(anchor, candidate)
        + TAGS_WEIGHT * tag_score(anchor, candidate)
        + CONTENT_WEIGHT * content_score(anchor, candidate);
    blended.clamp(0.0, 1.0)
}

fn categories_related(a: &str, b: &str) -> bool {
    let a = a.to_lowercase();
    let b = b.to_lowercase();
    let lists = |from: &str, to: &str| {
        RELATED_CATEGORIES
            .iter()
            .any(|(name, related)| *name == from && related.contains(&to))
    };
    lists(&a, &b) || lists(&b, &a)
}

fn tag_set(item: &Item) -> HashSet<String> {
    item.tags
        .iter()
        .map(|tag| tag.trim().to_lowercase())
        .filter(|tag| !tag.is_empty())
        .collect()
}

fn word_set(item: &Item) -> HashSet<String> {
    let text = match &item.description {
        Some(description) => format!("{} {}", item.title, description),
        None => item.title.clone(),
    };

    text.split(|c: char| !c.is_alphanumeric())
        .filter(|word| word.chars().count() > 2)
        .map(str::to_lowercase)
        .collect()
}

fn jaccard(a: &HashSet<String>, b: &HashSet<String>) -> f64 {
    if a.is_empty() && b.is_empty() {
        return EMPTY_SETS_SCORE;
    }

    let intersection = a.intersection(b).count();
    let union = a.len() + b.len() - intersection;
    intersection as f64 / union as f64
}
