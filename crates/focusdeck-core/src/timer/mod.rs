//! Timer state machine and restore logic.

pub mod restore;
pub mod stopwatch;

pub use restore::{restore, RestoreSource};
pub use stopwatch::{now_ms, Settled, Stopwatch};
