use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use sift_engine::Document;

/// One in-flight document, created fresh per discovery event.
///
/// A record is built by the scanner or the watcher, consumed by exactly one
/// worker and then dropped; persistence of the finished document is the
/// search engine's job.
#[derive(Debug)]
pub struct Record {
    path: String,
    full_path: PathBuf,
    title: String,
    body: Vec<u8>,
    mimetype: Option<String>,
    modified: SystemTime,
    indexed: Option<SystemTime>,
    ignored: bool,
    loaded: bool,
}

impl Record {
    pub fn new(path: impl Into<String>, full_path: impl Into<PathBuf>, modified: SystemTime) -> Self {
        Self {
            path: path.into(),
            full_path: full_path.into(),
            title: String::new(),
            body: Vec::new(),
            mimetype: None,
            modified,
            indexed: None,
            ignored: false,
            loaded: false,
        }
    }

    /// Logical URL-style key, unique per document.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Filesystem location used only for content acquisition.
    pub fn full_path(&self) -> &Path {
        &self.full_path
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    pub fn set_body(&mut self, body: Vec<u8>) {
        self.body = body;
    }

    pub fn mimetype(&self) -> Option<&str> {
        self.mimetype.as_deref()
    }

    pub fn set_mimetype(&mut self, mimetype: impl Into<String>) {
        self.mimetype = Some(mimetype.into());
    }

    pub fn modified(&self) -> SystemTime {
        self.modified
    }

    pub fn indexed(&self) -> Option<SystemTime> {
        self.indexed
    }

    /// Stamp the hand-off time. Must happen immediately before the engine
    /// call, never after, so a crash mid hand-off cannot leave a path falsely
    /// marked as indexed.
    pub fn stamp_indexed(&mut self, at: SystemTime) {
        self.indexed = Some(at);
    }

    /// Terminal exclusion. Monotonic: there is no way to clear it.
    pub fn ignore(&mut self) {
        self.ignored = true;
    }

    pub fn is_ignored(&self) -> bool {
        self.ignored
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn mark_loaded(&mut self) {
        self.loaded = true;
    }

    /// Last segment of the logical path, the default title.
    pub fn base_name(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or(&self.path)
    }

    /// Consume the record into the engine hand-off shape. The body buffer is
    /// moved, not copied, so it is released as soon as the engine is done.
    pub fn into_document(self) -> Document {
        Document {
            path: self.path,
            title: self.title,
            body: self.body,
            mimetype: self.mimetype,
            modified: self.modified,
            indexed: self.indexed.unwrap_or(SystemTime::UNIX_EPOCH),
        }
    }
}

/// Body content is streamed in; file reads append directly.
impl io::Write for Record {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.body.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn ignore_is_monotonic() {
        let mut record = Record::new("/a.txt", "/site/a.txt", SystemTime::now());
        assert!(!record.is_ignored());
        record.ignore();
        record.ignore();
        assert!(record.is_ignored());
    }

    #[test]
    fn body_is_streaming_appendable() {
        let mut record = Record::new("/a.txt", "/site/a.txt", SystemTime::now());
        record.write_all(b"hello ").unwrap();
        record.write_all(b"world").unwrap();
        assert_eq!(record.body(), b"hello world");
    }

    #[test]
    fn base_name_takes_last_segment() {
        let record = Record::new("/docs/guide/intro.html", "/x", SystemTime::now());
        assert_eq!(record.base_name(), "intro.html");

        let record = Record::new("/a.txt", "/x", SystemTime::now());
        assert_eq!(record.base_name(), "a.txt");
    }

    #[test]
    fn into_document_moves_fields() {
        let mut record = Record::new("/a.txt", "/site/a.txt", SystemTime::now());
        record.set_title("a");
        record.set_body(b"body".to_vec());
        record.set_mimetype("text/plain");
        let stamp = SystemTime::now();
        record.stamp_indexed(stamp);

        let doc = record.into_document();
        assert_eq!(doc.path, "/a.txt");
        assert_eq!(doc.title, "a");
        assert_eq!(doc.body, b"body");
        assert_eq!(doc.mimetype.as_deref(), Some("text/plain"));
        assert_eq!(doc.indexed, stamp);
    }
}
