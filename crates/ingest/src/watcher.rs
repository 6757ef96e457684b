use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::{Duration, SystemTime};

use log::{debug, info, warn};
use notify::event::ModifyKind;
use notify::{
    Config as NotifyConfig, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher as _,
};
use tokio::sync::watch;
use tokio::time::{self, MissedTickBehavior};

use crate::scanner::logical_path;
use crate::{IndexerManager, PathFilter, Record, Result};

/// Debouncing coalescer over low-level filesystem notifications.
///
/// Write events land in a pending set; a path is only flushed downstream once
/// it has been quiescent for the quiet period, so arbitrarily many writes to
/// one file collapse into a single record.
///
/// Subscriptions cover every non-hidden directory present at startup.
/// Directories created afterwards are not picked up; periodic rescans cover
/// the gap.
pub struct Watcher {
    _watcher: RecommendedWatcher,
}

impl Watcher {
    /// Subscribe to the tree under `root` and start the sweep loop. Any
    /// subscription failure is fatal: a silently unwatched subtree would
    /// just go stale.
    pub fn start(
        root: &Path,
        filter: Arc<PathFilter>,
        manager: Arc<IndexerManager>,
        quiet: Duration,
        shutdown: watch::Receiver<bool>,
    ) -> Result<Self> {
        let root = root.to_path_buf();
        let pending = Arc::new(PendingSet::default());

        let listener_pending = Arc::clone(&pending);
        let mut fs_watcher = RecommendedWatcher::new(
            move |result: notify::Result<Event>| match result {
                Ok(event) if is_write_event(&event.kind) => {
                    for path in event.paths {
                        // Directories emit write events too; only files pend.
                        match fs::metadata(&path) {
                            Ok(meta) if meta.is_file() => listener_pending.insert(path),
                            _ => {}
                        }
                    }
                }
                Ok(_) => {}
                Err(err) => warn!("watch error: {err}"),
            },
            NotifyConfig::default(),
        )?;

        let dirs = watchable_dirs(&root);
        for dir in &dirs {
            fs_watcher.watch(dir, RecursiveMode::NonRecursive)?;
        }
        info!("watching {} directories under {}", dirs.len(), root.display());

        spawn_sweep_loop(root, pending, filter, manager, quiet, shutdown);

        Ok(Self {
            _watcher: fs_watcher,
        })
    }
}

fn spawn_sweep_loop(
    root: PathBuf,
    pending: Arc<PendingSet>,
    filter: Arc<PathFilter>,
    manager: Arc<IndexerManager>,
    quiet: Duration,
    mut shutdown: watch::Receiver<bool>,
) {
    let period = if quiet.is_zero() {
        Duration::from_millis(1)
    } else {
        quiet
    };

    tokio::spawn(async move {
        let mut ticker = time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick of a tokio interval completes immediately.
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    // Ready paths are flushed outside the pending lock, so
                    // backpressure on feed never blocks the event listener.
                    for path in pending.sweep(quiet) {
                        flush(&root, &filter, &manager, &path).await;
                    }
                }
                _ = shutdown.changed() => break,
            }
        }
        debug!("watcher sweep loop stopped");
    });
}

/// Send one quiescent path through the same acceptance path as the scanner.
async fn flush(root: &Path, filter: &PathFilter, manager: &IndexerManager, path: &Path) {
    let Ok(meta) = fs::metadata(path) else {
        return;
    };
    if meta.is_dir() {
        return;
    }
    let Some(logical) = logical_path(root, path) else {
        return;
    };
    if !filter.accept(&logical) {
        return;
    }
    let modified = meta.modified().unwrap_or_else(|_| SystemTime::now());
    manager.feed(Record::new(logical, path, modified)).await;
}

fn is_write_event(kind: &EventKind) -> bool {
    matches!(
        kind,
        EventKind::Modify(ModifyKind::Data(_)) | EventKind::Modify(ModifyKind::Any)
    )
}

/// The root plus every non-hidden directory below it.
fn watchable_dirs(root: &Path) -> Vec<PathBuf> {
    walkdir::WalkDir::new(root)
        .into_iter()
        .filter_entry(|entry| {
            entry.depth() == 0 || !entry.file_name().to_string_lossy().starts_with('.')
        })
        .filter_map(|result| result.ok())
        .filter(|entry| entry.file_type().is_dir())
        .map(walkdir::DirEntry::into_path)
        .collect()
}

/// The coalescing map of paths awaiting their quiet period, guarded by one
/// lock and owned entirely by the watcher.
#[derive(Default)]
pub(crate) struct PendingSet {
    paths: Mutex<HashSet<PathBuf>>,
}

impl PendingSet {
    pub(crate) fn insert(&self, path: PathBuf) {
        self.lock().insert(path);
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.lock().len()
    }

    /// Partition the set: paths whose stat fails are dropped silently, paths
    /// modified within the quiet period stay pending ("hot"), and the rest
    /// are removed and returned for flushing.
    pub(crate) fn sweep(&self, quiet: Duration) -> Vec<PathBuf> {
        let mut ready = Vec::new();
        self.lock().retain(|path| match fs::metadata(path) {
            Err(_) => false,
            Ok(meta) => {
                if is_hot(&meta, quiet) {
                    true
                } else {
                    ready.push(path.clone());
                    false
                }
            }
        });
        ready
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashSet<PathBuf>> {
        match self.paths.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

fn is_hot(meta: &fs::Metadata, quiet: Duration) -> bool {
    match meta.modified().map(|modified| modified.elapsed()) {
        Ok(Ok(elapsed)) => elapsed < quiet,
        // A modification time in the future counts as still being written.
        Ok(Err(_)) => true,
        Err(_) => false,
    }
}
