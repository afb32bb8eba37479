//! Stopwatch state machine for one work item.
//!
//! The stopwatch is a wall-clock-based state machine. It does not use
//! internal threads - the caller is responsible for calling `elapsed_ms()`
//! periodically for display. Elapsed time is always recomputed from
//! timestamps, never accumulated by counting ticks, so any number of ticks
//! can be dropped or delayed without corrupting the value.
//!
//! ## State Transitions
//!
//! ```text
//! Stopped -> Running <-> Paused
//!    ^          |            |
//!    +--------- wipe() ------+
//! ```
//!
//! Every command takes an explicit `now_ms` so callers and tests control
//! the clock; `now_ms()` provides the wall clock.

use serde::{Deserialize, Serialize};

use crate::model::{closed_total_ms, Session, TimerState};

/// Finalized view of the session history with any open session closed.
///
/// Built by `settle()` for terminal transitions: the aggregates go into
/// the remote patch before the in-memory state is committed, so a failed
/// strict write leaves the stopwatch untouched.
#[derive(Debug, Clone)]
pub struct Settled {
    pub sessions: Vec<Session>,
    pub total_session_count: u32,
    pub total_time_spent_ms: u64,
}

/// Per-item stopwatch.
///
/// Owns the session list and the open-session start mark as plain owned
/// fields. The start mark lives here, not in any view layer, so a display
/// refresh can never reset an in-flight timestamp.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Stopwatch {
    state: TimerState,
    sessions: Vec<Session>,
    /// Start mark of the open session (epoch ms). Set iff `state` is Running.
    session_start_ms: Option<u64>,
}

impl Stopwatch {
    /// Fresh stopwatch: Stopped, no sessions.
    pub fn new() -> Self {
        Self {
            state: TimerState::Stopped,
            sessions: Vec::new(),
            session_start_ms: None,
        }
    }

    /// Rebuild a stopwatch from persisted fields (cache or remote).
    ///
    /// A claimed Running state without a start mark is contradictory; it is
    /// normalized to Paused over the closed sessions rather than trusted.
    pub fn from_parts(
        state: TimerState,
        mut sessions: Vec<Session>,
        session_start_ms: Option<u64>,
    ) -> Self {
        match (state, session_start_ms) {
            (TimerState::Running, Some(start)) => {
                // The last session must be open and agree with the mark.
                if !sessions.last().is_some_and(|s| s.is_open()) {
                    let num = sessions.len() as u32 + 1;
                    sessions.push(Session::open(num, start));
                }
                Self {
                    state: TimerState::Running,
                    sessions,
                    session_start_ms: Some(start),
                }
            }
            (TimerState::Running, None) => Self {
                state: if sessions.is_empty() {
                    TimerState::Stopped
                } else {
                    TimerState::Paused
                },
                sessions,
                session_start_ms: None,
            },
            (state, _) => {
                // Stopped/Paused never carry an open session.
                if let Some(last) = sessions.last_mut() {
                    if last.is_open() {
                        let at = last.started_at_ms;
                        last.close(at);
                    }
                }
                Self {
                    state,
                    sessions,
                    session_start_ms: None,
                }
            }
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> TimerState {
        self.state
    }

    pub fn sessions(&self) -> &[Session] {
        &self.sessions
    }

    pub fn session_start_ms(&self) -> Option<u64> {
        self.session_start_ms
    }

    /// Displayed session counter: the open session's number while Running,
    /// otherwise `max(sessions.len(), 1)`.
    pub fn session_counter(&self) -> u32 {
        match self.sessions.last() {
            Some(s) => s.num,
            None => 1,
        }
    }

    /// Elapsed time at `now_ms`: closed durations plus, if Running, the
    /// open interval. Recomputed from timestamps on every call.
    pub fn elapsed_ms(&self, now_ms: u64) -> u64 {
        let closed = closed_total_ms(&self.sessions);
        match (self.state, self.session_start_ms) {
            (TimerState::Running, Some(start)) => closed + now_ms.saturating_sub(start),
            _ => closed,
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Open a new session. Allowed from Stopped or Paused.
    ///
    /// The next session number is `sessions.len() + 1`: 1 for a fresh
    /// start, previous count + 1 when resuming from Paused, and the same
    /// rule after a recovered Stopped state with history.
    pub fn start(&mut self, now_ms: u64) -> Option<u32> {
        match self.state {
            TimerState::Stopped | TimerState::Paused => {
                let num = self.sessions.len() as u32 + 1;
                self.sessions.push(Session::open(num, now_ms));
                self.session_start_ms = Some(now_ms);
                self.state = TimerState::Running;
                Some(num)
            }
            TimerState::Running => None, // Already running.
        }
    }

    /// Close the open session. Allowed only from Running.
    /// Returns the closed session's number and duration.
    pub fn pause(&mut self, now_ms: u64) -> Option<(u32, u64)> {
        if self.state != TimerState::Running {
            return None;
        }
        let last = self.sessions.last_mut()?;
        last.close(now_ms);
        let closed = (last.num, last.duration_ms.unwrap_or(0));
        self.session_start_ms = None;
        self.state = TimerState::Paused;
        Some(closed)
    }

    /// Non-mutating finalization: the session list with any open session
    /// closed at `now_ms`, plus the aggregates the remote store wants.
    pub fn settle(&self, now_ms: u64) -> Settled {
        let mut sessions = self.sessions.clone();
        if let Some(last) = sessions.last_mut() {
            if last.is_open() {
                last.close(now_ms);
            }
        }
        let total = closed_total_ms(&sessions);
        Settled {
            total_session_count: sessions.len() as u32,
            total_time_spent_ms: total,
            sessions,
        }
    }

    /// Commit a settled view as the final state (terminal transitions).
    pub fn commit(&mut self, settled: &Settled) {
        self.sessions = settled.sessions.clone();
        self.session_start_ms = None;
        self.state = TimerState::Stopped;
    }

    /// Discard all sessions and return to the initial state.
    pub fn wipe(&mut self) {
        self.sessions.clear();
        self.session_start_ms = None;
        self.state = TimerState::Stopped;
    }
}

impl Default for Stopwatch {
    fn default() -> Self {
        Self::new()
    }
}

/// Current wall clock, epoch milliseconds.
pub fn now_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_pause_start_numbers_sessions() {
        let mut sw = Stopwatch::new();
        assert_eq!(sw.start(0), Some(1));
        assert_eq!(sw.state(), TimerState::Running);

        assert_eq!(sw.pause(5_000), Some((1, 5_000)));
        assert_eq!(sw.state(), TimerState::Paused);

        // Resuming from Paused: previousCount + 1.
        assert_eq!(sw.start(6_000), Some(2));
        assert_eq!(sw.sessions().len(), 2);
        assert!(sw.sessions()[1].is_open());
    }

    #[test]
    fn start_while_running_is_rejected() {
        let mut sw = Stopwatch::new();
        sw.start(0);
        assert_eq!(sw.start(100), None);
        assert_eq!(sw.sessions().len(), 1);
    }

    #[test]
    fn pause_requires_running() {
        let mut sw = Stopwatch::new();
        assert_eq!(sw.pause(0), None);
        sw.start(0);
        sw.pause(1_000);
        assert_eq!(sw.pause(2_000), None);
    }

    #[test]
    fn elapsed_recomputes_from_timestamps() {
        let mut sw = Stopwatch::new();
        sw.start(0);
        // Arbitrarily large tick gap: still exact.
        assert_eq!(sw.elapsed_ms(3_600_000), 3_600_000);
        sw.pause(3_600_000);
        assert_eq!(sw.elapsed_ms(9_999_999), 3_600_000);
        sw.start(4_000_000);
        assert_eq!(sw.elapsed_ms(4_000_500), 3_600_500);
    }

    #[test]
    fn settle_closes_open_session_without_mutation() {
        let mut sw = Stopwatch::new();
        sw.start(0);
        sw.pause(5_000);
        sw.start(6_000);

        let settled = sw.settle(9_000);
        assert_eq!(settled.total_session_count, 2);
        assert_eq!(settled.total_time_spent_ms, 8_000);
        assert!(settled.sessions.iter().all(|s| !s.is_open()));

        // Original still Running with an open session.
        assert_eq!(sw.state(), TimerState::Running);
        assert!(sw.sessions().last().unwrap().is_open());
    }

    #[test]
    fn commit_applies_settled_view() {
        let mut sw = Stopwatch::new();
        sw.start(0);
        let settled = sw.settle(2_000);
        sw.commit(&settled);
        assert_eq!(sw.state(), TimerState::Stopped);
        assert_eq!(sw.elapsed_ms(10_000), 2_000);
        assert!(sw.sessions().iter().all(|s| !s.is_open()));
    }

    #[test]
    fn wipe_returns_to_initial_state() {
        let mut sw = Stopwatch::new();
        sw.start(0);
        sw.pause(1_000);
        sw.wipe();
        assert_eq!(sw.state(), TimerState::Stopped);
        assert!(sw.sessions().is_empty());
        assert_eq!(sw.session_counter(), 1);
        assert_eq!(sw.elapsed_ms(5_000), 0);
    }

    #[test]
    fn from_parts_running_without_mark_degrades() {
        let mut closed = Session::open(1, 0);
        closed.close(1_000);
        let sw = Stopwatch::from_parts(TimerState::Running, vec![closed], None);
        assert_eq!(sw.state(), TimerState::Paused);
        assert_eq!(sw.elapsed_ms(9_000), 1_000);

        let sw = Stopwatch::from_parts(TimerState::Running, vec![], None);
        assert_eq!(sw.state(), TimerState::Stopped);
    }

    #[test]
    fn from_parts_running_resumes_from_stored_mark() {
        let mut closed = Session::open(1, 0);
        closed.close(1_000);
        let open = Session::open(2, 2_000);
        let sw = Stopwatch::from_parts(TimerState::Running, vec![closed, open], Some(2_000));
        assert_eq!(sw.state(), TimerState::Running);
        // Continuously open since the stored mark, across restarts.
        assert_eq!(sw.elapsed_ms(10_000), 1_000 + 8_000);
        assert_eq!(sw.session_counter(), 2);
    }

    #[test]
    fn session_numbers_strictly_increase() {
        let mut sw = Stopwatch::new();
        for i in 1..=5u32 {
            assert_eq!(sw.start(i as u64 * 1_000), Some(i));
            sw.pause(i as u64 * 1_000 + 500);
        }
        let nums: Vec<u32> = sw.sessions().iter().map(|s| s.num).collect();
        assert_eq!(nums, vec![1, 2, 3, 4, 5]);
    }
}
