// src/engine/runtime.rs

use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitStatus;
use std::time::Duration;

use anyhow::Result;
use tokio::sync::mpsc;
use tokio::time::{Instant, sleep_until, timeout};
use tracing::{debug, info, warn};

use crate::engine::debounce::Debouncer;
use crate::engine::state::SupervisorState;
use crate::exec::ServerProcess;
use crate::watch::WatcherHandle;

/// Hard ceiling for orderly shutdown; past this the supervisor exits
/// regardless of the child's state (`kill_on_drop` reaps any straggler).
pub const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(2);

/// Events sent into the supervisor from the watcher pump and the signal
/// listener.
///
/// The child's exit is *not* an event here: the supervisor selects on the
/// process handle directly, so a stop it issued itself can never be
/// mistaken for a crash.
#[derive(Debug, Clone)]
pub enum SupervisorEvent {
    /// A non-excluded path changed; debounce and restart.
    ChangeDetected { path: PathBuf },
    /// The watcher backend reported a runtime error.
    WatchError { message: String },
    /// SIGINT or SIGTERM arrived (both behave identically).
    ShutdownRequested,
}

/// Result of waiting out a graceful stop inside a restart cycle.
enum StopWait {
    Stopped,
    Interrupted,
}

/// The coordinator: wires the watcher, the debouncer, and the process
/// controller together.
///
/// Single-task event loop; the watch registry and the process handle are
/// only ever touched from here, so the gating state machine is the whole
/// concurrency story.
pub struct Supervisor {
    root: PathBuf,
    state: SupervisorState,
    debouncer: Debouncer,
    server: ServerProcess,
    events_rx: mpsc::Receiver<SupervisorEvent>,
    /// Dropped on shutdown, which closes every directory watch.
    watcher: Option<WatcherHandle>,
}

impl Supervisor {
    pub fn new(
        root: PathBuf,
        server: ServerProcess,
        debouncer: Debouncer,
        events_rx: mpsc::Receiver<SupervisorEvent>,
        watcher: Option<WatcherHandle>,
    ) -> Self {
        Self {
            root,
            state: SupervisorState::Idle,
            debouncer,
            server,
            events_rx,
            watcher,
        }
    }

    /// Start the server and run the event loop until shutdown.
    pub async fn run(mut self) -> Result<()> {
        self.server.start()?;

        loop {
            let deadline = self.debouncer.deadline();

            let keep_running = tokio::select! {
                maybe = self.events_rx.recv() => match maybe {
                    Some(SupervisorEvent::ChangeDetected { path }) => {
                        debug!(path = ?path, "change event queued for debounce");
                        self.debouncer.schedule(path);
                        true
                    }
                    Some(SupervisorEvent::WatchError { message }) => {
                        if !self.state.is_shutting_down() {
                            warn!("watcher error: {message}");
                        }
                        true
                    }
                    Some(SupervisorEvent::ShutdownRequested) | None => {
                        self.shutdown().await;
                        false
                    }
                },

                _ = wait_for_deadline(deadline) => {
                    match self.debouncer.take() {
                        Some(path) => self.restart(Some(path)).await?,
                        None => true,
                    }
                }

                status = self.server.wait() => {
                    let reason = describe_exit(status);
                    self.server.reap();
                    info!("server exited unexpectedly ({reason}), restarting...");
                    self.restart(None).await?
                }
            };

            if !keep_running {
                return Ok(());
            }
        }
    }

    /// One stop-then-start cycle. Returns `keep_running`.
    ///
    /// `trigger` is the changed path for file-triggered restarts and `None`
    /// for crash-triggered ones. Start is only ever reached after the stop
    /// of the same cycle has completed. Restart requests arriving during
    /// the cycle are discarded; a termination signal interrupts the cycle
    /// and goes straight to shutdown, so the hard shutdown ceiling never
    /// waits behind the stop grace period.
    async fn restart(&mut self, trigger: Option<PathBuf>) -> Result<bool> {
        if let Some(path) = &trigger {
            info!(
                "change detected in {}, reloading...",
                display_relative(&self.root, path)
            );
        }

        let (next, proceed) = self.state.on_restart_requested();
        self.state = next;
        if !proceed {
            debug!("restart request dropped (cycle already in flight or shutting down)");
            return Ok(true);
        }

        match self.stop_watching_for_shutdown().await {
            StopWait::Interrupted => {
                // Dropping the stop future released the child handle;
                // `kill_on_drop` reaps it.
                self.shutdown().await;
                return Ok(false);
            }
            StopWait::Stopped => {}
        }

        self.server.start()?;

        // A change whose quiet interval elapsed during this cycle is
        // already covered by it.
        self.debouncer.discard_expired(Instant::now());
        self.state = self.state.on_restart_finished();
        Ok(true)
    }

    /// Await the graceful stop, still listening for a termination signal.
    ///
    /// Change events arriving here are dropped, not queued: the restart in
    /// flight already covers them.
    async fn stop_watching_for_shutdown(&mut self) -> StopWait {
        let stop = self.server.stop();
        tokio::pin!(stop);

        loop {
            tokio::select! {
                _ = &mut stop => return StopWait::Stopped,
                maybe = self.events_rx.recv() => match maybe {
                    Some(SupervisorEvent::ShutdownRequested) | None => {
                        return StopWait::Interrupted;
                    }
                    Some(SupervisorEvent::ChangeDetected { path }) => {
                        debug!(path = ?path, "change discarded during in-flight restart");
                    }
                    Some(SupervisorEvent::WatchError { message }) => {
                        warn!("watcher error: {message}");
                    }
                }
            }
        }
    }

    async fn shutdown(&mut self) {
        self.state = self.state.on_shutdown_requested();
        info!("shutting down...");

        drop(self.watcher.take());

        if timeout(SHUTDOWN_TIMEOUT, self.server.stop()).await.is_err() {
            warn!(
                timeout = ?SHUTDOWN_TIMEOUT,
                "server still stopping at the shutdown deadline; exiting anyway"
            );
        }
    }
}

async fn wait_for_deadline(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

/// Human-readable exit reason: `code N`, `signal N`, or a wait error.
fn describe_exit(status: io::Result<ExitStatus>) -> String {
    match status {
        Ok(status) => {
            #[cfg(unix)]
            {
                use std::os::unix::process::ExitStatusExt;
                if let Some(sig) = status.signal() {
                    return format!("signal {sig}");
                }
            }
            match status.code() {
                Some(code) => format!("code {code}"),
                None => "unknown".to_string(),
            }
        }
        Err(err) => format!("wait failed: {err}"),
    }
}

/// Render `path` relative to `root` for logging; the root itself is `.`.
fn display_relative(root: &Path, path: &Path) -> String {
    let rel = path.strip_prefix(root).unwrap_or(path);
    if rel.as_os_str().is_empty() {
        ".".to_string()
    } else {
        rel.display().to_string()
    }
}
