use std::collections::HashSet;

use scraper::{Html, Selector};

/// Text content of the first `<title>` element, if the document has one with
/// non-empty text.
pub fn extract_title(html: &str) -> Option<String> {
    let document = Html::parse_document(html);
    let selector = Selector::parse("title").ok()?;
    let element = document.select(&selector).next()?;
    let title = element.text().collect::<String>().trim().to_string();
    (!title.is_empty()).then_some(title)
}

/// Strip HTML down to plain text under one strict policy: no tags survive,
/// and script/style content is removed outright rather than unwrapped.
pub fn sanitize(html: &[u8]) -> Vec<u8> {
    let source = String::from_utf8_lossy(html);
    ammonia::Builder::new()
        .tags(HashSet::new())
        .clean(&source)
        .to_string()
        .into_bytes()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn extracts_first_title_text() {
        let html = "<html><head><title>Hello</title></head><body>...</body></html>";
        assert_eq!(extract_title(html).as_deref(), Some("Hello"));
    }

    #[test]
    fn missing_or_empty_title_yields_none() {
        assert_eq!(extract_title("<html><body>no title</body></html>"), None);
        assert_eq!(extract_title("<html><title>  </title></html>"), None);
    }

    #[test]
    fn title_text_is_trimmed_and_joined() {
        let html = "<title>\n  Docs &amp; Guides\n</title>";
        assert_eq!(extract_title(html).as_deref(), Some("Docs & Guides"));
    }

    #[test]
    fn sanitize_removes_all_markup() {
        let out = sanitize(b"<p>Hello <b>world</b></p>");
        let text = String::from_utf8(out).unwrap();
        assert!(!text.contains('<'));
        assert!(text.contains("Hello"));
        assert!(text.contains("world"));
    }

    #[test]
    fn sanitize_drops_script_content_entirely() {
        let out = sanitize(b"<title>Docs</title><script>evil()</script><p>ok</p>");
        let text = String::from_utf8(out).unwrap();
        assert!(!text.contains("evil"));
        assert!(text.contains("ok"));
    }

    #[test]
    fn sanitize_drops_style_content() {
        let out = sanitize(b"<style>body { color: red }</style>visible");
        let text = String::from_utf8(out).unwrap();
        assert!(!text.contains("color"));
        assert!(text.contains("visible"));
    }
}
