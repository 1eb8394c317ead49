//! Page state store for the WebVault website detail view.
//!
//! [`PageStore`] wraps any [`DetailResolver`](webvault_detail::DetailResolver)
//! and turns its calls into observable [`PageState`] changes: loading flags,
//! user-facing error messages, a capped retry counter, once-per-session visit
//! recording and persisted view preferences.

pub mod error;
pub mod preferences;
pub mod session;
pub mod state;
pub mod store;

pub use error::{PreferenceError, Result};
pub use preferences::{
    FilePreferenceStorage, MemoryPreferenceStorage, PanelVisibility, PreferenceStorage,
    RelatedConfig, RelatedConfigPatch, ViewPreferences, PREFERENCES_NAMESPACE,
};
pub use session::{SessionId, VisitSession};
pub use state::{ErrorSlots, Interaction, LoadingFlags, PageState, MAX_RETRIES};
pub use store::PageStore;
