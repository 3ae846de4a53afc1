// src/engine/state.rs

/// Supervisor lifecycle state.
///
/// Exactly one stop-then-start cycle may be in flight at a time, and once
/// shutdown begins nothing restarts again. Restart requests funnel through
/// [`SupervisorState::on_restart_requested`], so a crash-triggered restart
/// and a file-triggered restart can never overlap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SupervisorState {
    /// No restart in flight; the server is running (or starting up).
    Idle,
    /// A stop-then-start cycle is executing; further requests are dropped.
    Restarting,
    /// Terminal. Entered on SIGINT/SIGTERM; never left.
    ShuttingDown,
}

impl SupervisorState {
    /// Transition for a restart request.
    ///
    /// Returns the next state and whether the caller should actually run
    /// the stop-then-start cycle.
    pub fn on_restart_requested(self) -> (SupervisorState, bool) {
        match self {
            SupervisorState::Idle => (SupervisorState::Restarting, true),
            SupervisorState::Restarting => (SupervisorState::Restarting, false),
            SupervisorState::ShuttingDown => (SupervisorState::ShuttingDown, false),
        }
    }

    /// Transition for a completed stop-then-start cycle.
    pub fn on_restart_finished(self) -> SupervisorState {
        match self {
            SupervisorState::Restarting => SupervisorState::Idle,
            other => other,
        }
    }

    /// Transition for a termination signal. Absorbing from every state.
    pub fn on_shutdown_requested(self) -> SupervisorState {
        SupervisorState::ShuttingDown
    }

    pub fn is_shutting_down(self) -> bool {
        matches!(self, SupervisorState::ShuttingDown)
    }
}
