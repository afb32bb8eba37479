//! End-to-end recovery: a client process that starts a session, flushes,
//! and dies must resume with the session still open from its original
//! start mark -- across the full engine stack, not just the stopwatch.

use std::sync::{Arc, Mutex};

use focusdeck_core::{
    EngineError, FocusEngine, FocusQueue, HandoffTarget, ItemStatus, RemoteError, TaskRemote,
    TimerCache, TimerPatch, TimerState, WorkItemSnapshot,
};
use tempfile::TempDir;

fn item(id: &str) -> WorkItemSnapshot {
    WorkItemSnapshot {
        id: id.to_string(),
        title: format!("Task {id}"),
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
        queue_position: None,
    }
}

/// Remote double: stores items, records patches, never fails.
#[derive(Default)]
struct RecordingRemote {
    patches: Mutex<Vec<(String, TimerPatch)>>,
}

impl TaskRemote for RecordingRemote {
    fn fetch_item(&self, id: &str) -> Result<WorkItemSnapshot, RemoteError> {
        Ok(item(id))
    }

    fn update_item(&self, id: &str, patch: &TimerPatch) -> Result<(), RemoteError> {
        self.patches
            .lock()
            .unwrap()
            .push((id.to_string(), patch.clone()));
        Ok(())
    }

    fn fetch_roster(&self) -> Result<Vec<HandoffTarget>, RemoteError> {
        Ok(Vec::new())
    }
}

fn build_engine(dir: &TempDir, remote: Arc<RecordingRemote>) -> FocusEngine {
    let mut queue = FocusQueue::new(5);
    queue.push(item("a"));
    queue.push(item("b"));
    let cache = TimerCache::open_at(dir.path().join("slot.json"));
    FocusEngine::new(queue, remote, cache, 30_000)
}

#[test]
fn running_session_survives_process_restart() {
    let dir = TempDir::new().unwrap();
    let remote = Arc::new(RecordingRemote::default());

    // First process: start at t=10s, flush, die.
    {
        let mut engine = build_engine(&dir, remote.clone());
        engine.activate().unwrap();
        engine.start_at(10_000).unwrap();
        engine.shutdown_flush();
    }

    // Second process over the same cache slot.
    let mut engine = build_engine(&dir, remote.clone());
    engine.activate().unwrap();

    // The session is treated as continuously open since t=10s.
    assert_eq!(engine.state(), TimerState::Running);
    assert_eq!(engine.timer().elapsed_ms(70_000), 60_000);
    assert_eq!(engine.timer().session_counter(), 1);

    // A later finish counts the whole interval exactly once.
    engine.finish_at(70_000).unwrap();
    let patches = remote.patches.lock().unwrap();
    let (_, final_patch) = patches.last().unwrap();
    assert_eq!(final_patch.total_session_count, 1);
    assert_eq!(final_patch.total_time_spent_ms, 60_000);
}

#[test]
fn paused_session_survives_process_restart() {
    let dir = TempDir::new().unwrap();
    let remote = Arc::new(RecordingRemote::default());

    {
        let mut engine = build_engine(&dir, remote.clone());
        engine.activate().unwrap();
        engine.start_at(0).unwrap();
        engine.pause_at(5_000).unwrap();
        // pause() wrote the cache synchronously; no explicit flush needed.
    }

    let mut engine = build_engine(&dir, remote);
    engine.activate().unwrap();
    assert_eq!(engine.state(), TimerState::Paused);
    assert_eq!(engine.timer().elapsed_ms(99_999), 5_000);

    // Resuming opens session 2, never reusing a number.
    engine.start_at(8_000).unwrap();
    assert_eq!(engine.timer().sessions().last().unwrap().num, 2);
}

#[test]
fn cache_is_ignored_after_queue_advances_past_its_item() {
    let dir = TempDir::new().unwrap();
    let remote = Arc::new(RecordingRemote::default());

    let mut engine = build_engine(&dir, remote.clone());
    engine.activate().unwrap();
    engine.start_at(0).unwrap();
    engine.finish_at(4_000).unwrap();

    // "b" is now active with a clean timer; the old slot is gone, so a
    // restart must not resurrect "a"'s sessions onto "b".
    drop(engine);
    let mut engine = build_engine(&dir, remote);
    engine.queue_mut().advance(); // mirror the persisted advance past "a"
    engine.activate().unwrap();
    assert_eq!(engine.queue().active().unwrap().id, "b");
    assert_eq!(engine.state(), TimerState::Stopped);
    assert!(engine.timer().sessions().is_empty());
}

#[test]
fn transitions_on_empty_queue_fail_cleanly() {
    let dir = TempDir::new().unwrap();
    let remote = Arc::new(RecordingRemote::default());
    let cache = TimerCache::open_at(dir.path().join("slot.json"));
    let mut engine = FocusEngine::new(FocusQueue::new(5), remote, cache, 30_000);

    assert!(matches!(engine.activate(), Err(EngineError::QueueEmpty)));
    assert!(matches!(engine.start_at(0), Err(EngineError::QueueEmpty)));
    assert!(engine.tick(1_000).is_none());
}
