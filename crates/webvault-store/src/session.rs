use jiff::{SignedDuration, Timestamp};
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::sync::atomic::{AtomicU32, Ordering};
use webvault_core::VisitOutcome;

static SEQUENCE: AtomicU32 = AtomicU32::new(0);

/// Identifier of one detail-page session, encoded as base58.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    /// Generates a session id from the start time and a process-wide sequence
    /// number, so ids stay unique even when the clock does not move.
    pub fn generate(started_at: Timestamp) -> Self {
        let millis = started_at.as_millisecond().to_be_bytes();
        let sequence = SEQUENCE.fetch_add(1, Ordering::Relaxed).to_be_bytes();

        let mut bytes = [0u8; 12];
        bytes[..8].copy_from_slice(&millis);
        bytes[8..].copy_from_slice(&sequence);
        Self(bs58::encode(bytes).into_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Visit bookkeeping for the currently loaded website.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisitSession {
    pub id: SessionId,
    pub started_at: Timestamp,
    /// Time spent on the page across ended stretches of this session.
    pub accumulated: SignedDuration,
    pub active: bool,
    pub has_recorded_visit: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_visit: Option<VisitOutcome>,
}

impl VisitSession {
    pub fn start(now: Timestamp) -> Self {
        Self {
            id: SessionId::generate(now),
            started_at: now,
            accumulated: SignedDuration::ZERO,
            active: true,
            has_recorded_visit: false,
            last_visit: None,
        }
    }

    /// Folds the running stretch into `accumulated`. Ending an ended session
    /// changes nothing.
    pub fn end(&mut self, now: Timestamp) {
        if !self.active {
            return;
        }
        let elapsed = now.duration_since(self.started_at);
        if elapsed.is_positive() {
            self.accumulated = self.accumulated.saturating_add(elapsed);
        }
        self.active = false;
    }
}
