//! Timer restore on item activation.
//!
//! Two persistence tiers can hold a timer snapshot: the single-slot local
//! cache (written synchronously on every transition) and the remote store
//! (written on transition boundaries and periodically while running). The
//! local slot is fresher -- it reflects activity that may never have
//! reached the remote store -- so it wins whenever it belongs to the item
//! being activated. The remote snapshot is the fallback of record.

use tracing::debug;

use crate::model::WorkItemSnapshot;
use crate::storage::cache::SavedTimerState;
use crate::timer::stopwatch::Stopwatch;

/// Which persistence tier seeded the stopwatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestoreSource {
    LocalCache,
    Remote,
    Fresh,
}

/// Seed a stopwatch for `item`, preferring a matching local cache entry.
///
/// A cache entry for a different item is ignored, not an error: the slot
/// holds whichever item was last active, which may not be this one.
pub fn restore(
    item: &WorkItemSnapshot,
    cached: Option<SavedTimerState>,
) -> (Stopwatch, RestoreSource) {
    if let Some(saved) = cached {
        if saved.item_id == item.id {
            debug!(item_id = %item.id, state = ?saved.timer_state, "restoring timer from local cache");
            let sw = Stopwatch::from_parts(saved.timer_state, saved.sessions, saved.session_start_ms);
            return (sw, RestoreSource::LocalCache);
        }
        debug!(
            item_id = %item.id,
            cached_item = %saved.item_id,
            "local cache belongs to another item; falling back to remote snapshot"
        );
    }

    if !item.sessions.is_empty() || item.current_session_start_ms.is_some() {
        let sw = Stopwatch::from_parts(
            item.timer_state,
            item.sessions.clone(),
            item.current_session_start_ms,
        );
        return (sw, RestoreSource::Remote);
    }

    (Stopwatch::new(), RestoreSource::Fresh)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ItemStatus, Session, TimerState};
    use crate::storage::cache::{SavedTimerState, CACHE_SCHEMA_VERSION};

    fn item(id: &str) -> WorkItemSnapshot {
        WorkItemSnapshot {
            id: id.to_string(),
            title: "t".to_string(),
            priority: 1,
            status: ItemStatus::InProgress,
            sessions: Vec::new(),
            total_session_count: 0,
            total_time_spent_ms: 0,
            timer_state: TimerState::Stopped,
            current_session_start_ms: None,
            assignee_id: None,
            agent_id: None,
            due_date: None,
            queue_position: Some(0),
        }
    }

    fn saved(item_id: &str, state: TimerState, sessions: Vec<Session>, start: Option<u64>) -> SavedTimerState {
        SavedTimerState {
            schema: CACHE_SCHEMA_VERSION,
            item_id: item_id.to_string(),
            timer_state: state,
            session_start_ms: start,
            sessions,
            saved_at_ms: 99_000,
        }
    }

    #[test]
    fn matching_cache_wins_over_remote() {
        let mut it = item("a");
        it.timer_state = TimerState::Paused;
        let mut remote_session = Session::open(1, 0);
        remote_session.close(1_000);
        it.sessions = vec![remote_session];

        let mut s1 = Session::open(1, 0);
        s1.close(2_000);
        let cached = saved("a", TimerState::Paused, vec![s1], None);

        let (sw, source) = restore(&it, Some(cached));
        assert_eq!(source, RestoreSource::LocalCache);
        // Cache had 2000ms, remote only 1000ms: local is fresher.
        assert_eq!(sw.elapsed_ms(10_000), 2_000);
    }

    #[test]
    fn cached_running_resumes_from_stored_mark() {
        let it = item("a");
        let open = Session::open(1, 5_000);
        let cached = saved("a", TimerState::Running, vec![open], Some(5_000));

        let (sw, source) = restore(&it, Some(cached));
        assert_eq!(source, RestoreSource::LocalCache);
        assert_eq!(sw.state(), TimerState::Running);
        // Treated as continuously open since 5000, across a full restart.
        assert_eq!(sw.elapsed_ms(65_000), 60_000);
    }

    #[test]
    fn foreign_cache_entry_falls_through_to_remote() {
        let mut it = item("a");
        it.timer_state = TimerState::Running;
        it.sessions = vec![Session::open(1, 3_000)];
        it.current_session_start_ms = Some(3_000);

        let cached = saved("other", TimerState::Paused, vec![], None);
        let (sw, source) = restore(&it, Some(cached));
        assert_eq!(source, RestoreSource::Remote);
        assert_eq!(sw.state(), TimerState::Running);
        assert_eq!(sw.elapsed_ms(4_000), 1_000);
    }

    #[test]
    fn no_data_yields_fresh_stopped() {
        let it = item("a");
        let (sw, source) = restore(&it, None);
        assert_eq!(source, RestoreSource::Fresh);
        assert_eq!(sw.state(), TimerState::Stopped);
        assert!(sw.sessions().is_empty());
        assert_eq!(sw.session_counter(), 1);
    }

    #[test]
    fn counter_derived_from_session_history() {
        let it = item("a");
        let mut s1 = Session::open(1, 0);
        s1.close(1_000);
        let mut s2 = Session::open(2, 2_000);
        s2.close(3_000);
        let cached = saved("a", TimerState::Paused, vec![s1, s2], None);

        let (sw, _) = restore(&it, Some(cached));
        assert_eq!(sw.session_counter(), 2);
        // Next start continues the numbering.
        let mut sw = sw;
        assert_eq!(sw.start(4_000), Some(3));
    }
}
