// src/exec/mod.rs

//! Managed server process lifecycle.
//!
//! A single child process at a time: spawned through the platform shell
//! with inherited stdio, stopped gracefully with a forced-kill fallback,
//! and observed for unexpected exits by the supervisor.

pub mod server;

pub use server::{GRACE_PERIOD, ServerCommand, ServerProcess};
