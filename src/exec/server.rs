// src/exec/server.rs

use std::io;
use std::process::{ExitStatus, Stdio};
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::process::{Child, Command};
use tokio::time::timeout;
use tracing::{debug, info, warn};

/// How long a stopped server gets to exit voluntarily before SIGKILL.
pub const GRACE_PERIOD: Duration = Duration::from_secs(5);

/// The command line for the managed server process.
///
/// Run through the platform shell (`sh -c` on unix, `cmd /C` on windows),
/// so config and CLI can pass a single string like
/// `"python3 -m http.server 8080"`.
#[derive(Debug, Clone)]
pub struct ServerCommand {
    line: String,
}

impl ServerCommand {
    pub fn new(line: impl Into<String>) -> Self {
        Self { line: line.into() }
    }

    pub fn line(&self) -> &str {
        &self.line
    }
}

/// Owns the lifecycle of the single managed server process.
///
/// The handle is `None` between stop completion and the next start. Only
/// the supervisor loop calls into this type, so there is never more than
/// one stop sequence outstanding per process instance.
#[derive(Debug)]
pub struct ServerProcess {
    command: ServerCommand,
    grace_period: Duration,
    child: Option<Child>,
}

impl ServerProcess {
    pub fn new(command: ServerCommand, grace_period: Duration) -> Self {
        Self {
            command,
            grace_period,
            child: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.child.is_some()
    }

    /// Spawn the server process with inherited stdio.
    ///
    /// `kill_on_drop` backstops shutdown: if the supervisor exits with the
    /// child still alive (hard shutdown timeout), the runtime reaps it.
    pub fn start(&mut self) -> Result<()> {
        let mut cmd = shell_command(self.command.line());
        cmd.stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .kill_on_drop(true);

        let child = cmd
            .spawn()
            .with_context(|| format!("spawning server process `{}`", self.command.line()))?;

        info!(pid = child.id(), "server started");
        self.child = Some(child);
        Ok(())
    }

    /// Resolve with the child's exit status.
    ///
    /// Pends forever while no child exists, which makes this directly
    /// usable as the supervisor's crash-detection select arm. The caller
    /// must [`ServerProcess::reap`] after an unexpected exit.
    pub async fn wait(&mut self) -> io::Result<ExitStatus> {
        match self.child.as_mut() {
            Some(child) => child.wait().await,
            None => std::future::pending().await,
        }
    }

    /// Forget the child handle after it exited on its own.
    pub fn reap(&mut self) {
        self.child = None;
    }

    /// Stop the current process, if any.
    ///
    /// Sends a graceful termination request and waits up to the grace
    /// period for the process to exit; past that, escalates to a forced
    /// kill exactly once. Returns immediately when nothing is running.
    pub async fn stop(&mut self) {
        let Some(mut child) = self.child.take() else {
            return;
        };

        request_exit(&mut child);

        match timeout(self.grace_period, child.wait()).await {
            Ok(Ok(status)) => debug!(?status, "server stopped"),
            Ok(Err(err)) => warn!(error = %err, "waiting for server exit failed"),
            Err(_) => {
                warn!(
                    grace_period = ?self.grace_period,
                    "server did not exit within the grace period; killing"
                );
                if let Err(err) = child.kill().await {
                    warn!(error = %err, "failed to kill server process");
                }
            }
        }
    }
}

/// Build a shell command appropriate for the platform.
fn shell_command(line: &str) -> Command {
    if cfg!(windows) {
        let mut c = Command::new("cmd");
        c.arg("/C").arg(line);
        c
    } else {
        let mut c = Command::new("sh");
        c.arg("-c").arg(line);
        c
    }
}

/// Ask the child to exit gracefully.
#[cfg(unix)]
fn request_exit(child: &mut Child) {
    use nix::sys::signal::{Signal, kill};
    use nix::unistd::Pid;

    // `id()` is None once the child has been reaped; nothing to signal.
    if let Some(pid) = child.id() {
        if let Err(err) = kill(Pid::from_raw(pid as i32), Signal::SIGTERM) {
            warn!(pid, error = %err, "failed to send SIGTERM to server process");
        }
    }
}

/// Windows has no SIGTERM equivalent for arbitrary console children; go
/// straight to termination and let the grace-period wait reap it.
#[cfg(not(unix))]
fn request_exit(child: &mut Child) {
    if let Err(err) = child.start_kill() {
        warn!(error = %err, "failed to terminate server process");
    }
}
