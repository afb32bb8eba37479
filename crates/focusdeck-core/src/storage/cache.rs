//! Single-slot local durable cache for the active timer.
//!
//! One JSON record at a fixed path, overwritten wholesale on every
//! transition and deleted on terminal transitions and reset. The record is
//! schema-tagged so future format changes can be migrated instead of
//! silently misread. Functionally this is a one-record write-ahead log
//! with a single in-flight entry: it is what makes a closed or crashed
//! client resumable before the remote store ever hears about the session.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::warn;

use crate::error::CacheError;
use crate::model::{Session, TimerState};
use crate::storage::data_dir;

/// Current on-disk schema tag. Bump on incompatible changes and add a
/// migration arm in `TimerCache::read`.
pub const CACHE_SCHEMA_VERSION: u32 = 1;

/// The most recent timer snapshot for whichever item is active.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedTimerState {
    #[serde(default)]
    pub schema: u32,
    pub item_id: String,
    pub timer_state: TimerState,
    /// Start mark of the open session; `None` unless Running.
    pub session_start_ms: Option<u64>,
    pub sessions: Vec<Session>,
    /// When this slot was written (epoch ms).
    pub saved_at_ms: u64,
}

/// Device-scoped single-slot store, keyed by one fixed file.
pub struct TimerCache {
    path: PathBuf,
}

impl TimerCache {
    /// Cache at the default location under the app data dir.
    pub fn open() -> Result<Self, std::io::Error> {
        Ok(Self {
            path: data_dir()?.join("active_timer.json"),
        })
    }

    /// Cache at a specific path (for testing).
    pub fn open_at(path: PathBuf) -> Self {
        Self { path }
    }

    /// Read the slot. A missing, corrupt, or schema-mismatched record is
    /// treated as absent, never an error -- the caller falls through to
    /// the remote snapshot.
    pub fn read(&self) -> Option<SavedTimerState> {
        let content = std::fs::read_to_string(&self.path).ok()?;
        let saved: SavedTimerState = match serde_json::from_str(&content) {
            Ok(s) => s,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "unreadable timer cache slot, treating as absent");
                return None;
            }
        };
        if saved.schema != CACHE_SCHEMA_VERSION {
            warn!(
                found = saved.schema,
                expected = CACHE_SCHEMA_VERSION,
                "timer cache schema mismatch, treating as absent"
            );
            return None;
        }
        Some(saved)
    }

    /// Overwrite the slot synchronously.
    pub fn write(&self, state: &SavedTimerState) -> Result<(), CacheError> {
        let data = serde_json::to_string_pretty(state)?;
        std::fs::write(&self.path, data).map_err(|source| CacheError::WriteFailed {
            path: self.path.clone(),
            source,
        })
    }

    /// Delete the slot. Clearing an already-empty slot is fine.
    pub fn clear(&self) -> Result<(), CacheError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(CacheError::ClearFailed {
                path: self.path.clone(),
                source,
            }),
        }
    }
}
