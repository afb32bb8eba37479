//! Domain types shared by the timer, queue, cache, and remote layers.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One contiguous timed interval of work on an item.
///
/// A session is open while `ended_at_ms` is `None`. At most one open
/// session exists per item; `duration_ms` is set exactly once, when the
/// session closes, and is never mutated afterward.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// 1-based sequence number, strictly increasing within one episode.
    pub num: u32,
    /// Wall-clock start mark (epoch milliseconds).
    pub started_at_ms: u64,
    /// Wall-clock end mark; `None` while the session is open.
    pub ended_at_ms: Option<u64>,
    /// Set once at close; `ended_at_ms - started_at_ms`.
    pub duration_ms: Option<u64>,
}

impl Session {
    /// Open a new session at `now_ms`.
    pub fn open(num: u32, now_ms: u64) -> Self {
        Self {
            num,
            started_at_ms: now_ms,
            ended_at_ms: None,
            duration_ms: None,
        }
    }

    pub fn is_open(&self) -> bool {
        self.ended_at_ms.is_none()
    }

    /// Close the session at `now_ms`, fixing its duration.
    pub fn close(&mut self, now_ms: u64) {
        let dur = now_ms.saturating_sub(self.started_at_ms);
        self.ended_at_ms = Some(now_ms);
        self.duration_ms = Some(dur);
    }
}

/// Sum of closed durations; the open session (if any) contributes nothing.
pub fn closed_total_ms(sessions: &[Session]) -> u64 {
    sessions.iter().filter_map(|s| s.duration_ms).sum()
}

/// Whether a session is currently open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerState {
    Stopped,
    Running,
    Paused,
}

impl Default for TimerState {
    fn default() -> Self {
        TimerState::Stopped
    }
}

/// Work item status as the remote store tracks it.
///
/// There is no persisted "done timer" state -- completion removes the item
/// from the queue entirely.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemStatus {
    Todo,
    InProgress,
    Done,
}

/// The queue's view of one task, as persisted remotely.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkItemSnapshot {
    pub id: String,
    pub title: String,
    pub priority: i32,
    pub status: ItemStatus,
    #[serde(default)]
    pub sessions: Vec<Session>,
    #[serde(default)]
    pub total_session_count: u32,
    #[serde(default)]
    pub total_time_spent_ms: u64,
    #[serde(default)]
    pub timer_state: TimerState,
    /// Start mark of the open session, if the remote copy saw one.
    #[serde(default)]
    pub current_session_start_ms: Option<u64>,
    /// Human owner; mutually exclusive with `agent_id`.
    #[serde(default)]
    pub assignee_id: Option<String>,
    /// Automated-agent owner; mutually exclusive with `assignee_id`.
    #[serde(default)]
    pub agent_id: Option<String>,
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
    /// Rank in the bounded active queue; `None` when not queued.
    #[serde(default)]
    pub queue_position: Option<u32>,
}

/// A hand-off target from the roster collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HandoffTarget {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub is_automated_agent: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_open_close() {
        let mut s = Session::open(1, 1_000);
        assert!(s.is_open());
        s.close(6_000);
        assert!(!s.is_open());
        assert_eq!(s.ended_at_ms, Some(6_000));
        assert_eq!(s.duration_ms, Some(5_000));
    }

    #[test]
    fn closed_total_excludes_open_session() {
        let mut a = Session::open(1, 0);
        a.close(5_000);
        let b = Session::open(2, 6_000);
        assert_eq!(closed_total_ms(&[a, b]), 5_000);
    }

    #[test]
    fn snapshot_deserializes_with_minimal_fields() {
        let json = serde_json::json!({
            "id": "item-1",
            "title": "Write report",
            "priority": 2,
            "status": "todo"
        });
        let item: WorkItemSnapshot = serde_json::from_value(json).unwrap();
        assert_eq!(item.timer_state, TimerState::Stopped);
        assert!(item.sessions.is_empty());
        assert!(item.queue_position.is_none());
    }
}
