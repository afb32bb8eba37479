//! # Focusdeck Core Library
//!
//! Core engine for the Focusdeck focus-session timer: walk a ranked queue
//! of work items one at a time, run a stopwatch-style session timer per
//! item, and survive the client being closed, refreshed, or backgrounded
//! without losing or double-counting elapsed time.
//!
//! ## Architecture
//!
//! - **Stopwatch**: wall-clock-based timer state machine; elapsed time is
//!   recomputed from timestamps, never accumulated by counting ticks
//! - **Restore**: cache-first reconciliation when an item is activated
//! - **Storage**: single-slot JSON timer cache plus TOML configuration
//! - **Remote**: HTTP client for the remote task store (system of record)
//! - **Sync**: immediate writes on transitions, periodic backup while
//!   running, best-effort local flush on shutdown
//! - **Engine**: transition actions (finish / hand-off / defer / reset)
//!   and the bounded active queue
//!
//! ## Key Components
//!
//! - [`FocusEngine`]: transition orchestration over the active item
//! - [`Stopwatch`]: per-item timer state machine
//! - [`TimerCache`]: crash/close recovery slot
//! - [`TaskRemote`]: remote collaborator trait

pub mod engine;
pub mod error;
pub mod events;
pub mod model;
pub mod queue;
pub mod remote;
pub mod storage;
pub mod sync;
pub mod timer;

pub use engine::{FocusEngine, FollowUp, QueueObserver};
pub use error::{CacheError, ConfigError, EngineError, RemoteError};
pub use events::Event;
pub use model::{HandoffTarget, ItemStatus, Session, TimerState, WorkItemSnapshot};
pub use queue::FocusQueue;
pub use remote::{HttpTaskRemote, OwnerChange, TaskRemote, TimerPatch};
pub use storage::{Config, SavedTimerState, TimerCache};
pub use sync::{spawn_backup, BackupHandle, SyncPolicy};
pub use timer::{now_ms, Stopwatch};
