use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

/// Configuration consumed by [`crate::IngestService`].
///
/// Loading and CLI surface live elsewhere; this struct only carries the
/// validated knobs the pipeline needs.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct IngestConfig {
    /// Directory tree to ingest.
    pub root: PathBuf,

    /// Include patterns (regular expressions over logical paths). When empty
    /// every path is eligible, subject to excludes.
    pub include: Vec<String>,

    /// Exclude patterns. An exclude match always wins over any include.
    pub exclude: Vec<String>,

    /// Worker count and queue capacity. `0` means `max(1, cores / 2)`.
    pub workers: usize,

    /// Documents with bodies larger than this are dropped.
    pub max_file_size: usize,

    /// Full rescan period in seconds. `0` disables periodic rescans; the
    /// startup scan always runs.
    pub rescan_interval_secs: u64,

    /// Watcher quiet period in seconds: a changed file is only flushed after
    /// it has seen no further writes for this long.
    pub quiet_period_secs: u64,

    /// Whether to start the filesystem watcher.
    pub watch: bool,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            include: Vec::new(),
            exclude: Vec::new(),
            workers: 0,
            max_file_size: 50 * 1024 * 1024,
            rescan_interval_secs: 0,
            quiet_period_secs: 30,
            watch: true,
        }
    }
}

impl IngestConfig {
    pub fn workers(&self) -> usize {
        if self.workers > 0 {
            return self.workers;
        }
        let cores = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(2);
        (cores / 2).max(1)
    }

    /// Include patterns with the default catch-all applied.
    pub fn include_patterns(&self) -> Vec<String> {
        if self.include.is_empty() {
            vec!["^/".to_string()]
        } else {
            self.include.clone()
        }
    }

    pub fn rescan_interval(&self) -> Option<Duration> {
        (self.rescan_interval_secs > 0).then(|| Duration::from_secs(self.rescan_interval_secs))
    }

    pub fn quiet_period(&self) -> Duration {
        Duration::from_secs(self.quiet_period_secs)
    }
}
