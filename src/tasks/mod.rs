//! Background Tasks Module
//!
//! Contains background tasks that run periodically while the app is up.
//!
//! # Tasks
//! - Cache sweep: removes expired entries and enforces the item cap

mod sweep;

pub use sweep::spawn_sweep_task;
