//! Remote sync policy.
//!
//! Every transition pushes timer state to the remote store immediately.
//! Non-strict pushes are fire-and-forget from the state machine's
//! perspective: a failure is logged and swallowed, the in-memory state is
//! not rolled back, and the next backup cycle or explicit transition
//! retries the write. Hand-off and defer use the strict path and surface
//! failures so the transition is not applied at all.
//!
//! While Running, a periodic backup write bounds the worst-case remote
//! staleness after an unclean close to one backup interval. The shutdown
//! flush targets only the local cache; network calls at that point are
//! unreliable and are not relied upon.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::Duration;

use tracing::warn;

use crate::engine::FocusEngine;
use crate::error::RemoteError;
use crate::remote::{TaskRemote, TimerPatch};
use crate::timer::now_ms;

pub struct SyncPolicy {
    remote: Arc<dyn TaskRemote>,
    backup_interval_ms: u64,
    last_backup_ms: u64,
}

impl SyncPolicy {
    pub fn new(remote: Arc<dyn TaskRemote>, backup_interval_ms: u64) -> Self {
        Self {
            remote,
            backup_interval_ms,
            last_backup_ms: 0,
        }
    }

    pub fn remote(&self) -> &Arc<dyn TaskRemote> {
        &self.remote
    }

    /// Transition-boundary write: failures are logged and swallowed.
    pub fn push_lossy(&self, item_id: &str, patch: &TimerPatch) {
        if let Err(e) = self.remote.update_item(item_id, patch) {
            warn!(item_id, error = %e, "remote timer write failed; local cache remains authoritative");
        }
    }

    /// Strict write for transitions that must not partially apply.
    pub fn push_strict(&self, item_id: &str, patch: &TimerPatch) -> Result<(), RemoteError> {
        self.remote.update_item(item_id, patch)
    }

    pub fn backup_due(&self, now_ms: u64) -> bool {
        now_ms.saturating_sub(self.last_backup_ms) >= self.backup_interval_ms
    }

    pub fn note_backup(&mut self, now_ms: u64) {
        self.last_backup_ms = now_ms;
    }
}

/// Handle to the periodic backup thread. Stopping (or dropping) the handle
/// cancels the loop, so a stale cycle can never outlive the engine host.
pub struct BackupHandle {
    stop: Arc<AtomicBool>,
    thread: Option<JoinHandle<()>>,
}

impl BackupHandle {
    pub fn stop(mut self) {
        self.signal_and_join();
    }

    fn signal_and_join(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(handle) = self.thread.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for BackupHandle {
    fn drop(&mut self) {
        self.signal_and_join();
    }
}

/// Spawn the backup loop over a shared engine.
///
/// Each cycle locks the engine and asks it to push a backup if a session
/// is running and the interval has elapsed. The state is read fresh under
/// the lock, so the loop never writes a snapshot older than the one a
/// concurrent transition just produced.
pub fn spawn_backup(engine: Arc<Mutex<FocusEngine>>, poll_every: Duration) -> BackupHandle {
    let stop = Arc::new(AtomicBool::new(false));
    let stop_flag = Arc::clone(&stop);
    let thread = std::thread::spawn(move || {
        while !stop_flag.load(Ordering::Relaxed) {
            std::thread::sleep(poll_every);
            if stop_flag.load(Ordering::Relaxed) {
                break;
            }
            if let Ok(mut engine) = engine.lock() {
                engine.backup_if_due(now_ms());
            }
        }
    });
    BackupHandle {
        stop,
        thread: Some(thread),
    }
}
