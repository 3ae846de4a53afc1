// src/watch/registry.rs

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Result;
use tracing::{debug, warn};

use crate::watch::exclude::PathFilter;

/// Backend that actually installs a watch on a single directory.
///
/// In production this is the `notify` watcher (see `watcher.rs`); tests use
/// a recording implementation so traversal and idempotence can be checked
/// without a live filesystem-notification backend.
pub trait WatchSink {
    fn watch_dir(&mut self, dir: &Path) -> Result<()>;
}

/// Tracks which directories carry an active watch.
///
/// Invariant: at most one registry entry per directory path. Entries are
/// added during the initial scan and whenever a rescan discovers a new
/// subdirectory; they are all torn down together when the watcher handle is
/// dropped at shutdown.
#[derive(Debug)]
pub struct WatchRegistry {
    filter: PathFilter,
    watched: HashSet<PathBuf>,
}

impl WatchRegistry {
    pub fn new(filter: PathFilter) -> Self {
        Self {
            filter,
            watched: HashSet::new(),
        }
    }

    /// The path filter this registry applies.
    pub fn filter(&self) -> &PathFilter {
        &self.filter
    }

    /// Number of directories currently watched.
    pub fn len(&self) -> usize {
        self.watched.len()
    }

    pub fn is_empty(&self) -> bool {
        self.watched.is_empty()
    }

    pub fn is_watched(&self, dir: &Path) -> bool {
        self.watched.contains(dir)
    }

    /// Install a watch on `dir` unless it is excluded or already watched.
    ///
    /// Setup failures (unreadable or vanished directories) are logged and
    /// the directory is simply left unregistered; the rest of the tree is
    /// unaffected.
    pub fn ensure_watched(&mut self, dir: &Path, sink: &mut dyn WatchSink) {
        if self.watched.contains(dir) || self.filter.is_excluded(dir) {
            return;
        }

        match sink.watch_dir(dir) {
            Ok(()) => {
                debug!(path = ?dir, "watching directory");
                self.watched.insert(dir.to_path_buf());
            }
            Err(err) => {
                warn!(path = ?dir, error = %err, "failed to watch directory");
            }
        }
    }

    /// Depth-first traversal from `start` using an explicit work stack.
    ///
    /// For each popped directory: skip it if excluded, otherwise ensure it
    /// is watched and push its direct non-excluded subdirectories. This is
    /// how newly created directory trees get picked up without restarting
    /// the whole watcher. Unreadable directories are skipped silently.
    pub fn rescan(&mut self, start: &Path, sink: &mut dyn WatchSink) {
        let mut stack = vec![start.to_path_buf()];

        while let Some(current) = stack.pop() {
            if self.filter.is_excluded(&current) {
                continue;
            }

            self.ensure_watched(&current, sink);

            let entries = match fs::read_dir(&current) {
                Ok(entries) => entries,
                Err(_) => continue,
            };

            for entry in entries.flatten() {
                let is_dir = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);
                if !is_dir {
                    continue;
                }
                let child = entry.path();
                if !self.filter.is_excluded(&child) {
                    stack.push(child);
                }
            }
        }
    }
}
