use std::collections::HashMap;

use tokio::sync::RwLock;

use crate::{Document, Result, SearchEngine, SearchHit, StoredDocument};

const FRAGMENT_CONTEXT: usize = 60;
const MAX_FRAGMENTS: usize = 3;

/// In-memory [`SearchEngine`] keyed by logical path.
///
/// Ranking is naive occurrence counting over title and body; fragments wrap
/// the matched term in `<mark>` tags. Good enough for tests and small sites.
#[derive(Default)]
pub struct MemoryEngine {
    docs: RwLock<HashMap<String, StoredDocument>>,
}

impl MemoryEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of persisted documents.
    pub async fn len(&self) -> usize {
        self.docs.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.docs.read().await.is_empty()
    }
}

#[async_trait::async_trait]
impl SearchEngine for MemoryEngine {
    async fn load(&self, path: &str) -> Result<Option<StoredDocument>> {
        Ok(self.docs.read().await.get(path).cloned())
    }

    async fn index(&self, doc: Document) -> Result<()> {
        let stored = StoredDocument {
            title: doc.title,
            body: doc.body,
            modified: doc.modified,
            indexed: doc.indexed,
        };
        self.docs.write().await.insert(doc.path, stored);
        Ok(())
    }

    async fn search(&self, query: &str, offset: usize, limit: usize) -> Result<Vec<SearchHit>> {
        let needle = query.trim().to_ascii_lowercase();
        if needle.is_empty() {
            return Ok(Vec::new());
        }

        let docs = self.docs.read().await;
        let mut scored: Vec<(usize, SearchHit)> = Vec::new();

        for (path, doc) in docs.iter() {
            let body = String::from_utf8_lossy(&doc.body);
            let title_hits = count_occurrences(&doc.title, &needle);
            let body_hits = count_occurrences(&body, &needle);
            if title_hits == 0 && body_hits == 0 {
                continue;
            }
            // Title matches weigh heavier than body matches.
            let score = title_hits * 10 + body_hits;
            scored.push((
                score,
                SearchHit {
                    path: path.clone(),
                    title: doc.title.clone(),
                    fragments: highlight_fragments(&body, &needle),
                },
            ));
        }

        scored.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.path.cmp(&b.1.path)));
        Ok(scored
            .into_iter()
            .skip(offset)
            .take(limit)
            .map(|(_, hit)| hit)
            .collect())
    }
}

fn count_occurrences(haystack: &str, needle: &str) -> usize {
    if needle.is_empty() {
        return 0;
    }
    haystack.to_ascii_lowercase().matches(needle).count()
}

fn highlight_fragments(body: &str, needle: &str) -> Vec<String> {
    let lowered = body.to_ascii_lowercase();
    let mut fragments = Vec::new();
    let mut at = 0;

    while fragments.len() < MAX_FRAGMENTS {
        let Some(rel) = lowered[at..].find(needle) else {
            break;
        };
        let hit = at + rel;
        let hit_end = hit + needle.len();

        let start = floor_char_boundary(body, hit.saturating_sub(FRAGMENT_CONTEXT));
        let end = ceil_char_boundary(body, (hit_end + FRAGMENT_CONTEXT).min(body.len()));

        fragments.push(format!(
            "{}<mark>{}</mark>{}",
            &body[start..hit],
            &body[hit..hit_end],
            &body[hit_end..end]
        ));
        at = hit_end;
    }

    fragments
}

fn floor_char_boundary(s: &str, mut i: usize) -> usize {
    while i > 0 && !s.is_char_boundary(i) {
        i -= 1;
    }
    i
}

fn ceil_char_boundary(s: &str, mut i: usize) -> usize {
    while i < s.len() && !s.is_char_boundary(i) {
        i += 1;
    }
    i
}
