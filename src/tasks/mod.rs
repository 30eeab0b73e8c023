//! Background Tasks Module
//!
//! Periodic maintenance work for the caches.

mod sweep;

pub use sweep::spawn_sweep_task;
