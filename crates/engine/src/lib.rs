//! # Sift Engine
//!
//! The search-engine seam consumed by the ingestion pipeline.
//!
//! The pipeline never talks to a concrete index. It hands finished
//! [`Document`]s to a [`SearchEngine`], asks it for the previously persisted
//! version of a path when deciding staleness, and leaves storage,
//! tokenization and ranking entirely to the implementation.
//!
//! ```text
//! ingestion pipeline
//!     │
//!     ├──> load(path)  ─> Option<StoredDocument>   (staleness check)
//!     ├──> index(doc)  ─> upsert keyed by path
//!     └──> search(q)   ─> ranked hits with highlighted fragments
//! ```
//!
//! [`MemoryEngine`] is a reference implementation backed by a hash map,
//! suitable for tests and small corpora.

mod error;
mod memory;

use std::time::SystemTime;

use async_trait::async_trait;

pub use error::{EngineError, Result};
pub use memory::MemoryEngine;

/// A finished document handed off by the pipeline.
///
/// `path` is the logical URL-style key and the identity of the document;
/// indexing the same path twice replaces the earlier version.
#[derive(Debug, Clone)]
pub struct Document {
    pub path: String,
    pub title: String,
    pub body: Vec<u8>,
    pub mimetype: Option<String>,
    /// When the source was observed to change.
    pub modified: SystemTime,
    /// Stamped by the pipeline immediately before hand-off.
    pub indexed: SystemTime,
}

/// The persisted view of a document, hydrated for staleness checks.
#[derive(Debug, Clone)]
pub struct StoredDocument {
    pub title: String,
    pub body: Vec<u8>,
    pub modified: SystemTime,
    pub indexed: SystemTime,
}

/// One ranked search result.
#[derive(Debug, Clone)]
pub struct SearchHit {
    pub path: String,
    pub title: String,
    /// Body excerpts around the matched terms, with `<mark>` highlighting.
    pub fragments: Vec<String>,
}

/// Contract between the ingestion pipeline and a search backend.
///
/// Implementations must tolerate concurrent `index` calls from multiple
/// workers; the pipeline provides no external ordering for distinct paths.
#[async_trait]
pub trait SearchEngine: Send + Sync {
    /// Hydrate the persisted version of `path`, if one exists.
    async fn load(&self, path: &str) -> Result<Option<StoredDocument>>;

    /// Persist or replace the document keyed by `doc.path`.
    async fn index(&self, doc: Document) -> Result<()>;

    /// Ranked full-text lookup over the persisted corpus.
    async fn search(&self, query: &str, offset: usize, limit: usize) -> Result<Vec<SearchHit>>;
}
