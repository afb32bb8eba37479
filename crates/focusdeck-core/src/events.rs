use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::model::TimerState;

/// Every engine state change produces an Event.
/// The CLI prints them; an embedding GUI would subscribe to them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    /// An item became the active queue slot and its timer was seeded.
    ItemActivated {
        item_id: String,
        state: TimerState,
        session_counter: u32,
        /// True when the timer was restored mid-session and resumed ticking.
        resumed_running: bool,
        at: DateTime<Utc>,
    },
    SessionStarted {
        item_id: String,
        session_num: u32,
        at: DateTime<Utc>,
    },
    SessionPaused {
        item_id: String,
        session_num: u32,
        duration_ms: u64,
        at: DateTime<Utc>,
    },
    ItemFinished {
        item_id: String,
        total_session_count: u32,
        total_time_spent_ms: u64,
        at: DateTime<Utc>,
    },
    ItemHandedOff {
        item_id: String,
        target_id: String,
        to_agent: bool,
        at: DateTime<Utc>,
    },
    ItemDeferred {
        item_id: String,
        due_date: NaiveDate,
        at: DateTime<Utc>,
    },
    TimerReset {
        item_id: String,
        at: DateTime<Utc>,
    },
    /// Display-only snapshot produced by `tick()`. Carries no side effects.
    StateSnapshot {
        item_id: String,
        state: TimerState,
        session_counter: u32,
        elapsed_ms: u64,
        at: DateTime<Utc>,
    },
}
