#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use sift_engine::{Document, MemoryEngine, Result, SearchEngine, SearchHit, StoredDocument};
use tokio::time::{sleep, Instant};

/// Memory-backed engine that counts `index` calls, so tests can assert how
/// often the pipeline actually handed off.
#[derive(Default)]
pub struct CountingEngine {
    inner: MemoryEngine,
    index_calls: AtomicUsize,
}

impl CountingEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn index_calls(&self) -> usize {
        self.index_calls.load(Ordering::SeqCst)
    }

    pub async fn len(&self) -> usize {
        self.inner.len().await
    }
}

#[async_trait::async_trait]
impl SearchEngine for CountingEngine {
    async fn load(&self, path: &str) -> Result<Option<StoredDocument>> {
        self.inner.load(path).await
    }

    async fn index(&self, doc: Document) -> Result<()> {
        self.index_calls.fetch_add(1, Ordering::SeqCst);
        self.inner.index(doc).await
    }

    async fn search(&self, query: &str, offset: usize, limit: usize) -> Result<Vec<SearchHit>> {
        self.inner.search(query, offset, limit).await
    }
}

/// Poll `cond` until it holds or the timeout elapses.
pub async fn eventually<F, Fut>(timeout: Duration, mut cond: F) -> bool
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = bool>,
{
    let deadline = Instant::now() + timeout;
    loop {
        if cond().await {
            return true;
        }
        if Instant::now() >= deadline {
            return false;
        }
        sleep(Duration::from_millis(25)).await;
    }
}
