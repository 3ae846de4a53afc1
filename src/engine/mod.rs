// src/engine/mod.rs

//! Supervisor coordination: state machine, restart debouncing, and the main
//! event loop.

pub mod debounce;
pub mod runtime;
pub mod state;

pub use debounce::{DEBOUNCE_WINDOW, Debouncer};
pub use runtime::{SHUTDOWN_TIMEOUT, Supervisor, SupervisorEvent};
pub use state::SupervisorState;
