use std::fs::File;
use std::io;
use std::sync::Arc;
use std::time::SystemTime;

use log::{debug, warn};
use sift_engine::SearchEngine;

use crate::{classify, process, PathFilter, Record};

/// Why a record was rejected. Every drop is terminal and silent; a path is
/// only reconsidered if a later scan or write event rediscovers it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    /// The record arrived already marked ignored.
    AlreadyIgnored,
    /// The path filter rejected the logical path.
    PathRejected,
    /// The engine already holds a version indexed after this change.
    Stale,
    /// No textual ancestor in the MIME chain; content never read.
    Binary,
    /// The file could not be opened or read.
    Unreadable,
    /// The body exceeds the configured maximum size.
    Oversize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexOutcome {
    Indexed,
    Dropped(DropReason),
}

/// The ordered, short-circuiting eligibility and transformation stages
/// applied to each record before hand-off.
pub struct Pipeline {
    engine: Arc<dyn SearchEngine>,
    filter: Arc<PathFilter>,
    max_file_size: usize,
}

impl Pipeline {
    pub fn new(engine: Arc<dyn SearchEngine>, filter: Arc<PathFilter>, max_file_size: usize) -> Self {
        Self {
            engine,
            filter,
            max_file_size,
        }
    }

    /// Run one record through every stage. The first failing stage marks the
    /// record ignored and reports why; later stages never run.
    pub async fn process(&self, mut record: Record) -> IndexOutcome {
        if record.is_ignored() {
            return IndexOutcome::Dropped(DropReason::AlreadyIgnored);
        }

        if !self.filter.accept(record.path()) {
            record.ignore();
            return IndexOutcome::Dropped(DropReason::PathRejected);
        }

        // Best-effort staleness guard: two workers racing on the same path
        // can each pass this check; later rescans converge.
        match self.engine.load(record.path()).await {
            Ok(Some(stored)) => {
                record.mark_loaded();
                if stored.indexed > record.modified() {
                    debug!(
                        "ignored {}: indexed {:?} > modified {:?}",
                        record.path(),
                        stored.indexed,
                        record.modified()
                    );
                    record.ignore();
                    return IndexOutcome::Dropped(DropReason::Stale);
                }
            }
            Ok(None) => {}
            Err(err) => warn!("load failed for {}: {err}", record.path()),
        }

        if record.body().is_empty() {
            let Some(mime) = classify::resolve(record.mimetype(), record.full_path()) else {
                record.ignore();
                return IndexOutcome::Dropped(DropReason::Binary);
            };
            if !classify::is_textual(&mime) {
                record.ignore();
                return IndexOutcome::Dropped(DropReason::Binary);
            }
            record.set_mimetype(mime);

            if let Err(err) = read_body(&mut record) {
                debug!("unreadable {}: {err}", record.full_path().display());
                record.ignore();
                return IndexOutcome::Dropped(DropReason::Unreadable);
            }
        }

        if record.body().len() > self.max_file_size {
            record.ignore();
            return IndexOutcome::Dropped(DropReason::Oversize);
        }

        if is_html(&record) {
            let body = String::from_utf8_lossy(record.body()).into_owned();
            let title = process::extract_title(&body)
                .unwrap_or_else(|| record.base_name().to_string());
            record.set_title(title);

            let stripped = process::sanitize(record.body());
            debug!(
                "sanitized {}/{} bytes: {}",
                stripped.len(),
                record.body().len(),
                record.path()
            );
            record.set_body(stripped);
        } else {
            record.set_title(record.base_name().to_string());
        }

        record.stamp_indexed(SystemTime::now());
        let path = record.path().to_string();
        if let Err(err) = self.engine.index(record.into_document()).await {
            warn!("index failed for {path}: {err}");
        }
        IndexOutcome::Indexed
    }
}

/// Stream the file at `full_path` into the record body.
fn read_body(record: &mut Record) -> io::Result<()> {
    let mut file = File::open(record.full_path())?;
    io::copy(&mut file, record)?;
    Ok(())
}

fn is_html(record: &Record) -> bool {
    record
        .mimetype()
        .and_then(|m| m.split(';').next())
        .map(str::trim)
        .is_some_and(|essence| essence.eq_ignore_ascii_case("text/html"))
}
