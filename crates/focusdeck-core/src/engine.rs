//! Engine orchestration: transition actions over the active queue item.
//!
//! Write order per transition:
//! - non-terminal (start/pause): mutate the stopwatch, synchronous local
//!   cache write, then a lossy remote push.
//! - finish/reset: settle or wipe, lossy remote push, clear the cache,
//!   then (finish only) advance the queue.
//! - hand-off/defer: build the settled patch first and perform the STRICT
//!   remote write before touching any local state; on failure nothing is
//!   applied and the queue does not advance.
//!
//! The single open-session slot is owned by whichever item is active in
//! the queue; no other component writes it.

use std::sync::Arc;

use chrono::{Local, NaiveDate, Utc};
use tracing::warn;

use crate::error::{EngineError, Result};
use crate::events::Event;
use crate::model::{HandoffTarget, ItemStatus, TimerState};
use crate::queue::FocusQueue;
use crate::remote::{OwnerChange, TaskRemote, TimerPatch};
use crate::storage::cache::{SavedTimerState, TimerCache, CACHE_SCHEMA_VERSION};
use crate::sync::SyncPolicy;
use crate::timer::restore::restore;
use crate::timer::{now_ms, Stopwatch};

/// Follow-up schedule for a deferred item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FollowUp {
    /// `today + d` days in the local calendar (d is 1, 3, or 7 in the UI).
    InDays(u32),
    /// An explicit date, used verbatim.
    On(NaiveDate),
}

impl FollowUp {
    fn due_date(self) -> NaiveDate {
        match self {
            FollowUp::InDays(d) => Local::now().date_naive() + chrono::Days::new(u64::from(d)),
            FollowUp::On(date) => date,
        }
    }
}

/// Callbacks into the outer view after terminal transitions.
/// All of them are cosmetic or refresh triggers; none may fail the engine.
pub trait QueueObserver: Send + Sync {
    fn on_item_completed(&self, _item_id: &str) {}
    fn on_refresh(&self) {}
    /// Celebratory side-effect on finish/hand-off/defer (never pause/reset).
    fn on_celebrate(&self) {}
}

pub struct FocusEngine {
    queue: FocusQueue,
    timer: Stopwatch,
    cache: TimerCache,
    sync: SyncPolicy,
    roster: Option<Vec<HandoffTarget>>,
    observer: Option<Box<dyn QueueObserver>>,
}

impl FocusEngine {
    pub fn new(
        queue: FocusQueue,
        remote: Arc<dyn TaskRemote>,
        cache: TimerCache,
        backup_interval_ms: u64,
    ) -> Self {
        Self {
            queue,
            timer: Stopwatch::new(),
            cache,
            sync: SyncPolicy::new(remote, backup_interval_ms),
            roster: None,
            observer: None,
        }
    }

    pub fn with_observer(mut self, observer: Box<dyn QueueObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn queue(&self) -> &FocusQueue {
        &self.queue
    }

    pub fn queue_mut(&mut self) -> &mut FocusQueue {
        &mut self.queue
    }

    pub fn timer(&self) -> &Stopwatch {
        &self.timer
    }

    pub fn state(&self) -> TimerState {
        self.timer.state()
    }

    fn active_id(&self) -> Result<String> {
        self.queue
            .active()
            .map(|item| item.id.clone())
            .ok_or(EngineError::QueueEmpty)
    }

    // ── Activation & reconciliation ──────────────────────────────────

    /// Seed the timer for the active queue item, cache-first.
    pub fn activate(&mut self) -> Result<Event> {
        let item = self.queue.active().ok_or(EngineError::QueueEmpty)?;
        let (timer, _source) = restore(item, self.cache.read());
        let resumed_running = timer.state() == TimerState::Running;
        let event = Event::ItemActivated {
            item_id: item.id.clone(),
            state: timer.state(),
            session_counter: timer.session_counter(),
            resumed_running,
            at: Utc::now(),
        };
        self.timer = timer;
        Ok(event)
    }

    /// Refetch the active item's remote snapshot before activation.
    pub fn refresh_active_from_remote(&mut self) -> Result<()> {
        let id = self.active_id()?;
        let item = self.sync.remote().fetch_item(&id)?;
        self.queue.replace_active(item);
        Ok(())
    }

    // ── Non-terminal transitions ─────────────────────────────────────

    pub fn start(&mut self) -> Result<Event> {
        self.start_at(now_ms())
    }

    pub fn start_at(&mut self, now: u64) -> Result<Event> {
        let item_id = self.active_id()?;
        let num = self
            .timer
            .start(now)
            .ok_or(EngineError::InvalidTransition {
                from: self.timer.state(),
                action: "start",
            })?;
        self.write_cache(now)?;
        self.sync.push_lossy(&item_id, &self.live_patch());
        self.sync.note_backup(now);
        Ok(Event::SessionStarted {
            item_id,
            session_num: num,
            at: Utc::now(),
        })
    }

    pub fn pause(&mut self) -> Result<Event> {
        self.pause_at(now_ms())
    }

    pub fn pause_at(&mut self, now: u64) -> Result<Event> {
        let item_id = self.active_id()?;
        let (num, duration_ms) = self
            .timer
            .pause(now)
            .ok_or(EngineError::InvalidTransition {
                from: self.timer.state(),
                action: "pause",
            })?;
        self.write_cache(now)?;
        self.sync.push_lossy(&item_id, &self.live_patch());
        Ok(Event::SessionPaused {
            item_id,
            session_num: num,
            duration_ms,
            at: Utc::now(),
        })
    }

    /// Display-only snapshot. Recomputes elapsed time from timestamps, so
    /// dropped or delayed ticks never corrupt the value.
    pub fn tick(&self, now: u64) -> Option<Event> {
        let item = self.queue.active()?;
        Some(Event::StateSnapshot {
            item_id: item.id.clone(),
            state: self.timer.state(),
            session_counter: self.timer.session_counter(),
            elapsed_ms: self.timer.elapsed_ms(now),
            at: Utc::now(),
        })
    }

    /// Crash-recovery safety net: push the live state while Running, at
    /// most once per backup interval.
    pub fn backup_if_due(&mut self, now: u64) {
        if self.timer.state() != TimerState::Running || !self.sync.backup_due(now) {
            return;
        }
        if let Ok(item_id) = self.active_id() {
            self.sync.push_lossy(&item_id, &self.live_patch());
            self.sync.note_backup(now);
        }
    }

    // ── Terminal transitions ─────────────────────────────────────────

    pub fn finish(&mut self) -> Result<Event> {
        self.finish_at(now_ms())
    }

    /// Close any open session, write the final snapshot, mark the item
    /// done, and advance the queue. The remote write is lossy: the local
    /// cache was the durable copy and the item leaves the queue either way.
    pub fn finish_at(&mut self, now: u64) -> Result<Event> {
        let item_id = self.active_id()?;
        self.require_session_state("finish")?;

        let settled = self.timer.settle(now);
        let patch = TimerPatch::new(
            TimerState::Stopped,
            None,
            settled.sessions.clone(),
            settled.total_session_count,
            settled.total_time_spent_ms,
        )
        .with_status(ItemStatus::Done)
        .clearing_queue_position();
        self.sync.push_lossy(&item_id, &patch);

        self.timer.commit(&settled);
        self.clear_cache();
        if let Some(observer) = &self.observer {
            observer.on_item_completed(&item_id);
            observer.on_celebrate();
        }
        self.advance_queue()?;

        Ok(Event::ItemFinished {
            item_id,
            total_session_count: settled.total_session_count,
            total_time_spent_ms: settled.total_time_spent_ms,
            at: Utc::now(),
        })
    }

    pub fn hand_off(&mut self, target_id: &str) -> Result<Event> {
        self.hand_off_at(now_ms(), target_id)
    }

    /// Reassign the active item and remove it from the queue.
    ///
    /// Strict: the remote update runs before any local mutation. On
    /// failure, ownership, sessions, cache, and queue position are all
    /// left exactly as they were.
    pub fn hand_off_at(&mut self, now: u64, target_id: &str) -> Result<Event> {
        let item_id = self.active_id()?;
        self.require_session_state("hand off")?;
        let target = self.resolve_target(target_id)?;

        let owner = if target.is_automated_agent {
            OwnerChange {
                assignee_id: None,
                agent_id: Some(target.id.clone()),
            }
        } else {
            OwnerChange {
                assignee_id: Some(target.id.clone()),
                agent_id: None,
            }
        };

        let settled = self.timer.settle(now);
        let patch = TimerPatch::new(
            TimerState::Stopped,
            None,
            settled.sessions.clone(),
            settled.total_session_count,
            settled.total_time_spent_ms,
        )
        .with_status(ItemStatus::Todo)
        .with_owner(owner)
        .clearing_queue_position();
        self.sync.push_strict(&item_id, &patch)?;

        self.timer.commit(&settled);
        self.clear_cache();
        if let Some(observer) = &self.observer {
            observer.on_item_completed(&item_id);
            observer.on_celebrate();
        }
        self.advance_queue()?;

        Ok(Event::ItemHandedOff {
            item_id,
            target_id: target.id,
            to_agent: target.is_automated_agent,
            at: Utc::now(),
        })
    }

    pub fn defer(&mut self, follow_up: FollowUp) -> Result<Event> {
        self.defer_at(now_ms(), follow_up)
    }

    /// Reschedule the active item to a follow-up date, keeping its owner,
    /// and remove it from the queue. Strict like `hand_off_at`.
    pub fn defer_at(&mut self, now: u64, follow_up: FollowUp) -> Result<Event> {
        let item_id = self.active_id()?;
        self.require_session_state("defer")?;
        let due_date = follow_up.due_date();

        let settled = self.timer.settle(now);
        let patch = TimerPatch::new(
            TimerState::Stopped,
            None,
            settled.sessions.clone(),
            settled.total_session_count,
            settled.total_time_spent_ms,
        )
        .with_status(ItemStatus::InProgress)
        .with_due_date(due_date)
        .clearing_queue_position();
        self.sync.push_strict(&item_id, &patch)?;

        self.timer.commit(&settled);
        self.clear_cache();
        if let Some(observer) = &self.observer {
            observer.on_item_completed(&item_id);
            observer.on_celebrate();
        }
        self.advance_queue()?;

        Ok(Event::ItemDeferred {
            item_id,
            due_date,
            at: Utc::now(),
        })
    }

    /// Discard all sessions and return the item to a clean Stopped state.
    /// Allowed from any state; the queue does not advance.
    pub fn reset(&mut self) -> Result<Event> {
        let item_id = self.active_id()?;
        self.timer.wipe();
        self.clear_cache();
        let patch = TimerPatch::new(TimerState::Stopped, None, Vec::new(), 0, 0);
        self.sync.push_lossy(&item_id, &patch);
        Ok(Event::TimerReset {
            item_id,
            at: Utc::now(),
        })
    }

    // ── Shutdown ─────────────────────────────────────────────────────

    /// Best-effort flush when the host signals imminent termination.
    ///
    /// Targets only the local cache; the remote copy may stay stale for up
    /// to one backup interval after an unclean close.
    pub fn shutdown_flush(&self) {
        if self.queue.active().is_none() {
            return;
        }
        if let Err(e) = self.write_cache(now_ms()) {
            warn!(error = %e, "shutdown cache flush failed");
        }
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn require_session_state(&self, action: &'static str) -> Result<()> {
        match self.timer.state() {
            TimerState::Running | TimerState::Paused => Ok(()),
            TimerState::Stopped => Err(EngineError::InvalidTransition {
                from: TimerState::Stopped,
                action,
            }),
        }
    }

    /// Patch mirroring the live stopwatch (non-terminal writes, backups).
    fn live_patch(&self) -> TimerPatch {
        let sessions = self.timer.sessions().to_vec();
        let closed_count = sessions.iter().filter(|s| !s.is_open()).count() as u32;
        let closed_total = crate::model::closed_total_ms(&sessions);
        TimerPatch::new(
            self.timer.state(),
            self.timer.session_start_ms(),
            sessions,
            closed_count,
            closed_total,
        )
    }

    fn write_cache(&self, now: u64) -> Result<()> {
        let item_id = self.active_id()?;
        let saved = SavedTimerState {
            schema: CACHE_SCHEMA_VERSION,
            item_id,
            timer_state: self.timer.state(),
            session_start_ms: self.timer.session_start_ms(),
            sessions: self.timer.sessions().to_vec(),
            saved_at_ms: now,
        };
        self.cache.write(&saved)?;
        Ok(())
    }

    fn clear_cache(&self) {
        if let Err(e) = self.cache.clear() {
            warn!(error = %e, "failed to clear timer cache slot");
        }
    }

    fn resolve_target(&mut self, target_id: &str) -> Result<HandoffTarget> {
        if self.roster.is_none() {
            self.roster = Some(self.sync.remote().fetch_roster()?);
        }
        self.roster
            .as_ref()
            .and_then(|roster| roster.iter().find(|t| t.id == target_id))
            .cloned()
            .ok_or_else(|| EngineError::UnknownTarget(target_id.to_string()))
    }

    /// After a terminal transition: next item (if any) becomes active and
    /// its timer is reconciled. The cache slot was just cleared, so the
    /// next item seeds from its remote snapshot.
    fn advance_queue(&mut self) -> Result<()> {
        let has_next = self.queue.advance().is_some();
        if has_next {
            self.activate()?;
        } else {
            self.timer = Stopwatch::new();
        }
        if let Some(observer) = &self.observer {
            observer.on_refresh();
        }
        Ok(())
    }
}
