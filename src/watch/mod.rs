// src/watch/mod.rs

//! File watching and change detection.
//!
//! This module is responsible for:
//! - Deciding which paths are excluded from watching (`exclude.rs`).
//! - Tracking which directories carry an active watch, and discovering new
//!   subdirectories at runtime with an explicit-stack rescan (`registry.rs`).
//! - Wiring up a cross-platform filesystem watcher (`notify`) and pumping
//!   its events into the supervisor (`watcher.rs`).
//!
//! It does **not** know about the managed server process or restart
//! scheduling; it only turns filesystem changes into supervisor events.

pub mod exclude;
pub mod registry;
pub mod watcher;

pub use exclude::{DEFAULT_EXCLUDED_DIRS, PathFilter};
pub use registry::{WatchRegistry, WatchSink};
pub use watcher::{WatcherHandle, spawn_watcher};
