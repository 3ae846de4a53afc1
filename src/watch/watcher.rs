// src/watch/watcher.rs

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};
use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::engine::SupervisorEvent;
use crate::watch::exclude::PathFilter;
use crate::watch::registry::{WatchRegistry, WatchSink};

/// Handle for the filesystem watcher.
///
/// The underlying `RecommendedWatcher` and its registry live inside the
/// pump task; dropping this handle aborts the task, which closes every
/// directory watch at once.
pub struct WatcherHandle {
    task: JoinHandle<()>,
}

impl std::fmt::Debug for WatcherHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WatcherHandle").finish()
    }
}

impl Drop for WatcherHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

impl WatchSink for RecommendedWatcher {
    fn watch_dir(&mut self, dir: &Path) -> Result<()> {
        Watcher::watch(self, dir, RecursiveMode::NonRecursive)
            .with_context(|| format!("installing watch on {:?}", dir))
    }
}

/// Spawn a filesystem watcher over the tree rooted at `root`.
///
/// Every non-excluded directory gets its own non-recursive watch so the
/// registry can discover (and start watching) directories created later.
/// Change notifications are forwarded to the supervisor as
/// [`SupervisorEvent::ChangeDetected`]; watcher runtime errors as
/// [`SupervisorEvent::WatchError`].
pub fn spawn_watcher(
    root: PathBuf,
    filter: PathFilter,
    events_tx: mpsc::Sender<SupervisorEvent>,
) -> Result<WatcherHandle> {
    // Channel from the blocking notify callback into the async world.
    let (raw_tx, mut raw_rx) = mpsc::unbounded_channel::<notify::Result<Event>>();

    let mut watcher = RecommendedWatcher::new(
        move |res: notify::Result<Event>| {
            // Receiver gone means we are shutting down; nothing to report.
            let _ = raw_tx.send(res);
        },
        Config::default(),
    )
    .context("creating filesystem watcher")?;

    let mut registry = WatchRegistry::new(filter);
    registry.rescan(&root, &mut watcher);

    info!(root = ?root, directories = registry.len(), "file watcher started");

    let task = tokio::spawn(async move {
        while let Some(res) = raw_rx.recv().await {
            match res {
                Ok(event) => {
                    if handle_event(&root, &mut registry, &mut watcher, event, &events_tx)
                        .await
                        .is_err()
                    {
                        // Supervisor channel closed; stop pumping.
                        return;
                    }
                }
                Err(err) => {
                    let forwarded = events_tx
                        .send(SupervisorEvent::WatchError {
                            message: err.to_string(),
                        })
                        .await;
                    if forwarded.is_err() {
                        return;
                    }
                }
            }
        }

        debug!("file watcher loop ended");
    });

    Ok(WatcherHandle { task })
}

/// Process one notify event: drop access noise, rescan under changed
/// directories, and signal a debounced restart for each surviving path.
///
/// Returns `Err` only when the supervisor side of the channel is gone.
async fn handle_event(
    root: &Path,
    registry: &mut WatchRegistry,
    watcher: &mut RecommendedWatcher,
    event: Event,
    events_tx: &mpsc::Sender<SupervisorEvent>,
) -> Result<(), ()> {
    // Reads must not restart the server.
    if matches!(event.kind, EventKind::Access(_)) {
        return Ok(());
    }

    debug!(?event, "notify event");

    if event.paths.is_empty() {
        // The platform did not say which entry changed (e.g. a bulk
        // rename). Treat the root as the trigger and rescan under it for
        // entries that appeared or disappeared without being named.
        registry.rescan(root, watcher);
        return send_change(events_tx, root.to_path_buf()).await;
    }

    for path in event.paths {
        if registry.filter().is_excluded(&path) {
            continue;
        }

        let is_dir = fs::metadata(&path).map(|m| m.is_dir()).unwrap_or(false);
        if is_dir {
            // A directory changed: register any subdirectories that are
            // new since the last scan.
            registry.rescan(&path, watcher);
        }

        send_change(events_tx, path).await?;
    }

    Ok(())
}

async fn send_change(
    events_tx: &mpsc::Sender<SupervisorEvent>,
    path: PathBuf,
) -> Result<(), ()> {
    events_tx
        .send(SupervisorEvent::ChangeDetected { path })
        .await
        .map_err(|_| ())
}
