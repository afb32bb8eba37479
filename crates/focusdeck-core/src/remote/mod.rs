//! Remote task collaborator interface.
//!
//! The remote store is the system of record for task data. The engine
//! treats it as last-writer-wins: one user, one active timer, strictly
//! sequential transitions within a client.

pub mod http;

pub use http::HttpTaskRemote;

use chrono::NaiveDate;

use crate::error::RemoteError;
use crate::model::{HandoffTarget, ItemStatus, Session, TimerState, WorkItemSnapshot};

/// Ownership change carried by a hand-off patch. Both fields are written
/// explicitly so the remote store clears whichever side is `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnerChange {
    pub assignee_id: Option<String>,
    pub agent_id: Option<String>,
}

/// One timer-state write to the remote store.
///
/// Timer fields are always present; the optional fields are included only
/// by the terminal transitions that change them.
#[derive(Debug, Clone, PartialEq)]
pub struct TimerPatch {
    pub timer_state: TimerState,
    /// `None` writes an explicit null (no open session).
    pub current_session_start_ms: Option<u64>,
    pub sessions: Vec<Session>,
    pub total_session_count: u32,
    pub total_time_spent_ms: u64,
    pub status: Option<ItemStatus>,
    pub owner: Option<OwnerChange>,
    pub due_date: Option<NaiveDate>,
    /// Write an explicit null queue position (item leaves the queue).
    pub clear_queue_position: bool,
}

impl TimerPatch {
    pub fn new(
        timer_state: TimerState,
        current_session_start_ms: Option<u64>,
        sessions: Vec<Session>,
        total_session_count: u32,
        total_time_spent_ms: u64,
    ) -> Self {
        Self {
            timer_state,
            current_session_start_ms,
            sessions,
            total_session_count,
            total_time_spent_ms,
            status: None,
            owner: None,
            due_date: None,
            clear_queue_position: false,
        }
    }

    pub fn with_status(mut self, status: ItemStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_owner(mut self, owner: OwnerChange) -> Self {
        self.owner = Some(owner);
        self
    }

    pub fn with_due_date(mut self, due: NaiveDate) -> Self {
        self.due_date = Some(due);
        self
    }

    pub fn clearing_queue_position(mut self) -> Self {
        self.clear_queue_position = true;
        self
    }
}

/// The remote task collaborator. Implemented by the HTTP client and by
/// in-memory doubles in tests.
pub trait TaskRemote: Send + Sync {
    /// Fetch one item by id.
    fn fetch_item(&self, id: &str) -> Result<WorkItemSnapshot, RemoteError>;

    /// Write timer state (and any terminal-transition fields) for an item.
    fn update_item(&self, id: &str, patch: &TimerPatch) -> Result<(), RemoteError>;

    /// List hand-off targets. Fetched once per engine.
    fn fetch_roster(&self) -> Result<Vec<HandoffTarget>, RemoteError>;
}
