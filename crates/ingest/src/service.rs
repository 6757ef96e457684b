use std::sync::Arc;

use sift_engine::SearchEngine;
use tokio::sync::watch;

use crate::{
    IndexerManager, IngestConfig, IngestError, PathFilter, Pipeline, Record, Result, Scanner,
    Watcher,
};

/// Wires the whole ingestion pipeline together: validates the configuration,
/// starts the worker pool, kicks off the startup scan (plus periodic rescans)
/// and, when enabled, the filesystem watcher.
///
/// Setup failures here are fatal; once `start` returns `Ok` the service only
/// ever drops individual records, never errors.
pub struct IngestService {
    manager: Arc<IndexerManager>,
    shutdown: watch::Sender<bool>,
    _watcher: Option<Watcher>,
}

impl IngestService {
    /// Must be called from within a tokio runtime.
    pub fn start(config: &IngestConfig, engine: Arc<dyn SearchEngine>) -> Result<Self> {
        let root = config
            .root
            .canonicalize()
            .map_err(|err| IngestError::InvalidRoot(format!("{}: {err}", config.root.display())))?;
        if !root.is_dir() {
            return Err(IngestError::InvalidRoot(format!(
                "{}: not a directory",
                root.display()
            )));
        }

        let filter = Arc::new(PathFilter::new(
            &config.exclude,
            &config.include_patterns(),
        )?);

        let pipeline = Pipeline::new(engine, Arc::clone(&filter), config.max_file_size);
        let manager = Arc::new(IndexerManager::start(pipeline, config.workers()));

        let (shutdown, shutdown_rx) = watch::channel(false);

        let watcher = if config.watch {
            Some(Watcher::start(
                &root,
                Arc::clone(&filter),
                Arc::clone(&manager),
                config.quiet_period(),
                shutdown_rx.clone(),
            )?)
        } else {
            None
        };

        Scanner::new(root, filter, Arc::clone(&manager))
            .spawn(config.rescan_interval(), shutdown_rx);

        Ok(Self {
            manager,
            shutdown,
            _watcher: watcher,
        })
    }

    /// Hand a record straight to the worker pool, subject to the same
    /// backpressure as the scanner and watcher.
    pub async fn feed(&self, record: Record) {
        self.manager.feed(record).await;
    }

    /// Cooperative shutdown: scan and sweep loops stop at their next check;
    /// a record being processed is never interrupted mid-stage.
    pub fn shutdown(&self) {
        let _ = self.shutdown.send(true);
    }
}

impl Drop for IngestService {
    fn drop(&mut self) {
        let _ = self.shutdown.send(true);
    }
}
