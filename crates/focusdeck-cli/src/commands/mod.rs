pub mod queue;
pub mod timer;
