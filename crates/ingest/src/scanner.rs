use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use log::{info, warn};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use walkdir::{DirEntry, WalkDir};

use crate::{IndexerManager, PathFilter, Record};

/// Directory walker feeding candidate records into the worker pool.
///
/// Runs once at startup and, when a rescan interval is configured, again on
/// that period for the lifetime of the service, catching anything the
/// watcher missed.
pub struct Scanner {
    root: PathBuf,
    filter: Arc<PathFilter>,
    manager: Arc<IndexerManager>,
}

impl Scanner {
    pub fn new(root: PathBuf, filter: Arc<PathFilter>, manager: Arc<IndexerManager>) -> Self {
        Self {
            root,
            filter,
            manager,
        }
    }

    /// One full depth-first pass over the tree.
    pub async fn scan(&self) {
        let mut fed = 0usize;
        for (path, modified) in walk_candidates(&self.root) {
            let Some(logical) = logical_path(&self.root, &path) else {
                continue;
            };
            if !self.filter.accept(&logical) {
                continue;
            }
            self.manager.feed(Record::new(logical, path, modified)).await;
            fed += 1;
        }
        info!("scan of {} fed {fed} candidates", self.root.display());
    }

    /// Initial scan plus the optional periodic rescan loop. The shutdown
    /// channel is polled between cycles; a scan in progress is not
    /// interrupted.
    pub fn spawn(
        self,
        rescan: Option<Duration>,
        mut shutdown: watch::Receiver<bool>,
    ) -> JoinHandle<()> {
        tokio::spawn(async move {
            self.scan().await;

            let Some(period) = rescan else {
                return;
            };
            let mut ticker = time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick of a tokio interval completes immediately.
            ticker.tick().await;

            loop {
                tokio::select! {
                    _ = ticker.tick() => self.scan().await,
                    _ = shutdown.changed() => break,
                }
            }
        })
    }
}

/// Regular files under `root`, skipping every entry whose name starts with a
/// dot. For directories that prunes the whole subtree.
pub(crate) fn walk_candidates(root: &Path) -> Vec<(PathBuf, SystemTime)> {
    let mut out = Vec::new();
    let walker = WalkDir::new(root)
        .into_iter()
        .filter_entry(|entry| entry.depth() == 0 || !is_hidden(entry));

    for result in walker {
        let entry = match result {
            Ok(entry) => entry,
            Err(err) => {
                warn!("scan skipping entry: {err}");
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        let modified = entry
            .metadata()
            .ok()
            .and_then(|meta| meta.modified().ok())
            .unwrap_or(SystemTime::UNIX_EPOCH);
        out.push((entry.into_path(), modified));
    }
    out
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.file_name().to_string_lossy().starts_with('.')
}

/// Map a filesystem path to its logical URL-style key: relative to the root,
/// slash-separated with a leading `/`, and with any `?` query / `#` fragment
/// carried by the name reassembled in canonical order.
pub(crate) fn logical_path(root: &Path, file: &Path) -> Option<String> {
    let relative = file.strip_prefix(root).ok()?;
    let mut raw = String::from("/");
    for (i, component) in relative.components().enumerate() {
        if i > 0 {
            raw.push('/');
        }
        raw.push_str(&component.as_os_str().to_string_lossy());
    }

    let (rest, fragment) = match raw.split_once('#') {
        Some((rest, fragment)) => (rest.to_string(), Some(fragment.to_string())),
        None => (raw, None),
    };
    let (path, query) = match rest.split_once('?') {
        Some((path, query)) => (path.to_string(), Some(query.to_string())),
        None => (rest, None),
    };

    let mut out = path;
    if let Some(query) = query {
        out.push('?');
        out.push_str(&query);
    }
    if let Some(fragment) = fragment {
        out.push('#');
        out.push_str(&fragment);
    }
    Some(out)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    use super::*;

    #[test]
    fn walk_skips_hidden_files_and_subtrees() {
        let temp = tempdir().unwrap();
        fs::write(temp.path().join("a.txt"), "a").unwrap();
        fs::write(temp.path().join(".hidden.txt"), "x").unwrap();

        let sub = temp.path().join("sub");
        fs::create_dir(&sub).unwrap();
        fs::write(sub.join("b.txt"), "b").unwrap();

        let hidden_dir = temp.path().join(".git");
        fs::create_dir(&hidden_dir).unwrap();
        fs::write(hidden_dir.join("config"), "x").unwrap();

        let mut names: Vec<String> = walk_candidates(temp.path())
            .into_iter()
            .filter_map(|(path, _)| logical_path(temp.path(), &path))
            .collect();
        names.sort();

        assert_eq!(names, vec!["/a.txt".to_string(), "/sub/b.txt".to_string()]);
    }

    #[test]
    fn walk_includes_files_under_dotted_root() {
        // Only entry names below the root count as hidden, not the root itself.
        let temp = tempdir().unwrap();
        let root = temp.path().join(".site");
        fs::create_dir(&root).unwrap();
        fs::write(root.join("a.txt"), "a").unwrap();

        assert_eq!(walk_candidates(&root).len(), 1);
    }

    #[test]
    fn logical_path_is_rooted_and_slash_separated() {
        let root = Path::new("/srv/site");
        assert_eq!(
            logical_path(root, Path::new("/srv/site/docs/intro.html")).as_deref(),
            Some("/docs/intro.html")
        );
        assert_eq!(
            logical_path(root, Path::new("/elsewhere/x.txt")),
            None
        );
    }

    #[test]
    fn logical_path_preserves_query_and_fragment() {
        let root = Path::new("/srv/site");
        assert_eq!(
            logical_path(root, Path::new("/srv/site/page.html?v=1#top")).as_deref(),
            Some("/page.html?v=1#top")
        );
        assert_eq!(
            logical_path(root, Path::new("/srv/site/page.html#top")).as_deref(),
            Some("/page.html#top")
        );
    }
}
