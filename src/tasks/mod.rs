//! Background Tasks Module
//!
//! Periodic maintenance that runs for the lifetime of the runtime.

mod cleanup;

pub use cleanup::spawn_cleanup_task;
