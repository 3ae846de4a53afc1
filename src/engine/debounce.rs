// src/engine/debounce.rs

use std::path::PathBuf;
use std::time::Duration;

use tokio::time::Instant;

/// Quiet interval after the last change event before a restart fires.
pub const DEBOUNCE_WINDOW: Duration = Duration::from_millis(200);

/// Coalesces bursts of change events into a single restart request.
///
/// At most one entry is pending at a time: every [`Debouncer::schedule`]
/// replaces the deadline and the trigger path (last-writer-wins on the
/// path, but any pending change within the window still yields exactly one
/// restart). The supervisor loop sleeps until [`Debouncer::deadline`] and
/// then [`Debouncer::take`]s the path.
#[derive(Debug)]
pub struct Debouncer {
    window: Duration,
    pending: Option<Pending>,
}

#[derive(Debug)]
struct Pending {
    deadline: Instant,
    path: PathBuf,
}

impl Debouncer {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            pending: None,
        }
    }

    /// Record a change, restarting the quiet interval.
    pub fn schedule(&mut self, path: PathBuf) {
        self.pending = Some(Pending {
            deadline: Instant::now() + self.window,
            path,
        });
    }

    /// Deadline of the pending entry, if any.
    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|p| p.deadline)
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Consume the pending entry, returning its trigger path.
    pub fn take(&mut self) -> Option<PathBuf> {
        self.pending.take().map(|p| p.path)
    }

    /// Drop a pending entry whose deadline has already passed.
    ///
    /// Called when a restart cycle completes: a change whose quiet interval
    /// elapsed *during* the cycle is already covered by it, while one still
    /// inside its interval is kept and fires normally afterwards.
    pub fn discard_expired(&mut self, now: Instant) {
        if let Some(pending) = &self.pending {
            if pending.deadline <= now {
                self.pending = None;
            }
        }
    }
}
