//! Background Tasks Module
//!
//! Tasks that run periodically for the lifetime of the process.

mod sweeper;

pub use sweeper::spawn_sweep_task;
