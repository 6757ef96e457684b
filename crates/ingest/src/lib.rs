//! # Sift Ingest
//!
//! Filesystem ingestion pipeline for an external search engine.
//!
//! ## Pipeline
//!
//! ```text
//! Directory tree                Change notifications
//!     │                              │
//!     ├──> Scanner                   ├──> Watcher (quiet-period debounce)
//!     │      └─> Records             │      └─> Records
//!     │                              │
//!     └──────────────┬───────────────┘
//!                    │ feed (bounded queue, blocking = backpressure)
//!                    ▼
//!            IndexerManager (W workers)
//!              path filter → staleness → classify → size guard → process
//!                    │
//!                    └──> SearchEngine::index
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use sift_engine::MemoryEngine;
//! use sift_ingest::{IngestConfig, IngestService};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = IngestConfig {
//!         root: "/srv/site".into(),
//!         ..IngestConfig::default()
//!     };
//!     let engine = Arc::new(MemoryEngine::new());
//!     let service = IngestService::start(&config, engine.clone())?;
//!
//!     // ... serve queries against `engine` ...
//!     service.shutdown();
//!     Ok(())
//! }
//! ```

mod classify;
mod config;
mod error;
mod filter;
mod manager;
mod pipeline;
mod process;
mod record;
mod scanner;
mod service;
mod watcher;

pub use classify::{is_textual, resolve as resolve_mimetype};
pub use config::IngestConfig;
pub use error::{IngestError, Result};
pub use filter::PathFilter;
pub use manager::IndexerManager;
pub use pipeline::{DropReason, IndexOutcome, Pipeline};
pub use process::{extract_title, sanitize};
pub use record::Record;
pub use scanner::Scanner;
pub use service::IngestService;
pub use watcher::Watcher;
