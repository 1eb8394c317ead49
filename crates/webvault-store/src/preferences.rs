//! User view preferences and their persistence.

use crate::error::Result;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::trace;
use webvault_core::{RelatedOptions, Strategy, MAX_RELATED_LIMIT, MIN_RELATED_LIMIT};

/// Namespace under which the detail page stores its preferences.
pub const PREFERENCES_NAMESPACE: &str = "webvault-website-detail";

/// How related websites are fetched and shown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RelatedConfig {
    pub strategy: Strategy,
    pub limit: usize,
    pub exclude_self: bool,
    pub min_score: f64,
    pub show_ads: bool,
}

impl Default for RelatedConfig {
    fn default() -> Self {
        RelatedOptions::default().into()
    }
}

impl From<RelatedOptions> for RelatedConfig {
    fn from(options: RelatedOptions) -> Self {
        Self {
            strategy: options.strategy,
            limit: options.limit,
            exclude_self: options.exclude_self,
            min_score: options.min_score,
            show_ads: options.include_ads,
        }
    }
}

impl RelatedConfig {
    pub fn to_options(&self) -> RelatedOptions {
        RelatedOptions {
            strategy: self.strategy,
            limit: self.limit,
            exclude_self: self.exclude_self,
            min_score: self.min_score,
            include_ads: self.show_ads,
        }
    }

    pub fn apply(&mut self, patch: &RelatedConfigPatch) {
        if let Some(strategy) = patch.strategy {
            self.strategy = strategy;
        }
        if let Some(limit) = patch.limit {
            self.limit = clamp_limit(limit);
        }
        if let Some(exclude_self) = patch.exclude_self {
            self.exclude_self = exclude_self;
        }
        if let Some(min_score) = patch.min_score {
            self.min_score = min_score;
        }
        if let Some(show_ads) = patch.show_ads {
            self.show_ads = show_ads;
        }
    }

    /// Clamps values restored from storage into the range the resolver
    /// accepts.
    pub fn sanitize(&mut self) {
        self.limit = clamp_limit(self.limit);
    }
}

fn clamp_limit(limit: usize) -> usize {
    limit.clamp(MIN_RELATED_LIMIT, MAX_RELATED_LIMIT)
}

/// A partial update of [`RelatedConfig`]. Unset fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RelatedConfigPatch {
    pub strategy: Option<Strategy>,
    pub limit: Option<usize>,
    pub exclude_self: Option<bool>,
    pub min_score: Option<f64>,
    pub show_ads: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PanelVisibility {
    pub related: bool,
    pub share: bool,
    pub fullscreen: bool,
}

impl Default for PanelVisibility {
    fn default() -> Self {
        Self {
            related: true,
            share: false,
            fullscreen: false,
        }
    }
}

/// The part of the page state that survives across sessions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewPreferences {
    pub related: RelatedConfig,
    pub panels: PanelVisibility,
}

/// Client-local key/value persistence for [`ViewPreferences`].
pub trait PreferenceStorage: Send + Sync + 'static {
    /// Returns `Ok(None)` if nothing was saved under `namespace`.
    fn load(&self, namespace: &str) -> Result<Option<ViewPreferences>>;

    fn save(&self, namespace: &str, preferences: &ViewPreferences) -> Result<()>;
}

impl<T: PreferenceStorage> PreferenceStorage for std::sync::Arc<T> {
    fn load(&self, namespace: &str) -> Result<Option<ViewPreferences>> {
        (**self).load(namespace)
    }

    fn save(&self, namespace: &str, preferences: &ViewPreferences) -> Result<()> {
        (**self).save(namespace, preferences)
    }
}

/// Keeps serialized preferences in memory. Nothing outlives the process.
#[derive(Debug, Default)]
pub struct MemoryPreferenceStorage {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryPreferenceStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PreferenceStorage for MemoryPreferenceStorage {
    fn load(&self, namespace: &str) -> Result<Option<ViewPreferences>> {
        match self.entries.lock().get(namespace) {
            Some(raw) => Ok(Some(serde_json::from_str(raw)?)),
            None => Ok(None),
        }
    }

    fn save(&self, namespace: &str, preferences: &ViewPreferences) -> Result<()> {
        let raw = serde_json::to_string(preferences)?;
        self.entries.lock().insert(namespace.to_string(), raw);
        Ok(())
    }
}

/// Stores each namespace as `<dir>/<namespace>.json`.
#[derive(Debug, Clone)]
pub struct FilePreferenceStorage {
    dir: PathBuf,
}

impl FilePreferenceStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path(&self, namespace: &str) -> PathBuf {
        self.dir.join(format!("{namespace}.json"))
    }
}

impl PreferenceStorage for FilePreferenceStorage {
    fn load(&self, namespace: &str) -> Result<Option<ViewPreferences>> {
        let path = self.path(namespace);
        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        trace!(path = %path.display(), "loaded preferences");
        Ok(Some(serde_json::from_str(&raw)?))
    }

    fn save(&self, namespace: &str, preferences: &ViewPreferences) -> Result<()> {
        fs::create_dir_all(&self.dir)?;
        let path = self.path(namespace);
        fs::write(&path, serde_json::to_vec_pretty(preferences)?)?;
        trace!(path = %path.display(), "saved preferences");
        Ok(())
    }
}
