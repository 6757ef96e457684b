use std::fs::File;
use std::io::Read;
use std::path::Path;

use mime_guess::mime::Mime;

/// The generic textual type every indexable document must descend from.
pub const TEXT_PLAIN: &str = "text/plain";

/// Bytes of leading content consulted when sniffing.
const SNIFF_LEN: usize = 3072;

/// Non-`text/*` types that still carry readable text, rooted at their
/// parents the way a full MIME hierarchy would chain them.
const TYPE_PARENTS: &[(&str, &str)] = &[
    ("application/json", TEXT_PLAIN),
    ("application/xml", TEXT_PLAIN),
    ("application/javascript", TEXT_PLAIN),
    ("application/x-javascript", TEXT_PLAIN),
    ("application/ecmascript", TEXT_PLAIN),
    ("application/x-sh", TEXT_PLAIN),
    ("application/x-yaml", TEXT_PLAIN),
    ("application/yaml", TEXT_PLAIN),
    ("application/toml", TEXT_PLAIN),
    ("application/xhtml+xml", "application/xml"),
    ("application/rss+xml", "application/xml"),
    ("application/atom+xml", "application/xml"),
    ("image/svg+xml", "application/xml"),
];

/// Determine the MIME essence for a record, preferring an explicit hint over
/// anything derived from the file itself. Resolution order: hint, file
/// extension, leading-content sniff. `None` means the content could not be
/// identified and must be treated as binary.
pub fn resolve(hint: Option<&str>, full_path: &Path) -> Option<String> {
    if let Some(essence) = hint.and_then(from_hint) {
        return Some(essence);
    }
    if let Some(mime) = mime_guess::from_path(full_path).first() {
        return Some(essence_of(&mime));
    }
    sniff_file(full_path)
}

/// Walk the ancestor chain of `mime` looking for the generic textual type.
/// Types with no textual ancestor are binary and never indexed.
pub fn is_textual(mime: &str) -> bool {
    let mut current = Some(mime);
    while let Some(essence) = current {
        if essence == TEXT_PLAIN {
            return true;
        }
        current = parent_of(essence);
    }
    false
}

fn parent_of(essence: &str) -> Option<&str> {
    if essence.starts_with("text/") && essence != TEXT_PLAIN {
        return Some(TEXT_PLAIN);
    }
    TYPE_PARENTS
        .iter()
        .find(|(child, _)| *child == essence)
        .map(|(_, parent)| *parent)
}

fn from_hint(hint: &str) -> Option<String> {
    let bare = hint.split(';').next()?.trim();
    bare.parse::<Mime>().ok().map(|mime| essence_of(&mime))
}

fn essence_of(mime: &Mime) -> String {
    mime.essence_str().to_ascii_lowercase()
}

fn sniff_file(path: &Path) -> Option<String> {
    let mut file = File::open(path).ok()?;
    let mut header = vec![0u8; SNIFF_LEN];
    let n = file.read(&mut header).ok()?;
    header.truncate(n);
    Some(sniff(&header).to_string())
}

/// Identify content by magic numbers, falling back to a UTF-8 validity check.
fn sniff(header: &[u8]) -> &'static str {
    const MAGIC: &[(&[u8], &str)] = &[
        (b"\x89PNG\r\n\x1a\n", "image/png"),
        (b"\xff\xd8\xff", "image/jpeg"),
        (b"GIF87a", "image/gif"),
        (b"GIF89a", "image/gif"),
        (b"%PDF-", "application/pdf"),
        (b"\x1f\x8b", "application/gzip"),
        (b"PK\x03\x04", "application/zip"),
        (b"\x7fELF", "application/octet-stream"),
    ];

    for (magic, mime) in MAGIC {
        if header.starts_with(magic) {
            return mime;
        }
    }

    if looks_like_html(header) {
        return "text/html";
    }

    if is_plausible_text(header) {
        TEXT_PLAIN
    } else {
        "application/octet-stream"
    }
}

fn looks_like_html(header: &[u8]) -> bool {
    let head: Vec<u8> = header
        .iter()
        .skip_while(|b| b.is_ascii_whitespace())
        .take(32)
        .map(u8::to_ascii_lowercase)
        .collect();
    head.starts_with(b"<!doctype html") || head.starts_with(b"<html")
}

fn is_plausible_text(header: &[u8]) -> bool {
    if header.contains(&0) {
        return false;
    }
    match std::str::from_utf8(header) {
        Ok(_) => true,
        // The sniff window may cut a multi-byte sequence at the very end.
        Err(e) => e.error_len().is_none() && header.len() - e.valid_up_to() < 4,
    }
}
