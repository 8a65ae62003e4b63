// src/watch/mod.rs

//! File watching and change classification.
//!
//! This module is responsible for:
//! - Compiling watch / ignore glob patterns.
//! - Wiring up a cross-platform filesystem watcher (`notify`).
//! - Classifying changes as content or structural.
//!
//! It does **not** know about prepared runs or the scheduler's state; it
//! only turns filesystem changes into [`crate::engine::RuntimeEvent`]s.

pub mod event_handler;
pub mod patterns;
pub mod watcher;

pub use event_handler::{classify, process_event};
pub use patterns::{WatchDefaults, WatchProfile, DEFAULT_IGNORE, DEFAULT_WATCH};
pub use watcher::{spawn_watcher, WatcherHandle};
