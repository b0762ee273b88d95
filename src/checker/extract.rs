// src/checker/extract.rs
// =============================================================================
// This module finds the references (links) inside a scanned file.
//
// Two regimes, chosen by the file suffix:
// - Markdown (.md): `[text](target)` link targets. Targets without a scheme
//   are local paths, `(https://...)` targets are remote URLs.
// - Anything else: only URLs that sit after a `#` comment marker on the same
//   line. Code is full of URL-looking strings; comments are what people read.
//
// These are regular expressions, not a Markdown parser. Exotic URLs (ports,
// IPv6 hosts, unicode) are simply not matched.
// =============================================================================

use regex::Regex;
use std::sync::LazyLock;

use super::reference::{Reference, ScanTarget};

// Characters allowed in a path or in the path/query part of a URL
const SAFE_CHARS: &str = r"[=a-zA-Z0-9_/?&%+#.\-]";

// Scheme, then a 3-63 character host label that starts and ends alphanumeric,
// then a dot and the rest of the URL
fn url_pattern() -> String {
    format!(
        r"https?://[a-zA-Z0-9][a-zA-Z0-9-]{{1,61}}[a-zA-Z0-9]\.{}+",
        SAFE_CHARS
    )
}

static MARKDOWN_URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&format!(r"\(({})\)", url_pattern())).expect("valid regex"));

static MARKDOWN_LOCAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&format!(r"\]\(({}+)\)", SAFE_CHARS)).expect("valid regex"));

// `.` does not cross newlines, so the URL must be on the comment's line
static COMMENTED_URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&format!(r"#.*(?P<url>{})", url_pattern())).expect("valid regex"));

/// Extracts every reference from the content of `target`.
///
/// For markdown files local references come first, then remote ones, each in
/// document order.
pub fn extract_references(target: &ScanTarget, content: &str) -> Vec<Reference> {
    if target.is_markdown() {
        let mut references: Vec<Reference> = extract_local_links(content)
            .into_iter()
            .map(|text| Reference::local(text, target))
            .collect();
        references.extend(
            extract_markdown_urls(content)
                .into_iter()
                .map(|url| Reference::remote(url, target)),
        );
        references
    } else {
        extract_commented_urls(content)
            .into_iter()
            .map(|url| Reference::remote(url, target))
            .collect()
    }
}

/// Local link targets of a markdown document, e.g. `docs/setup.md` or `#usage`
pub fn extract_local_links(markdown: &str) -> Vec<String> {
    MARKDOWN_LOCAL
        .captures_iter(markdown)
        .map(|caps| caps[1].to_string())
        .collect()
}

/// Remote URLs of a markdown document, with the surrounding `(` `)` removed
pub fn extract_markdown_urls(markdown: &str) -> Vec<String> {
    MARKDOWN_URL
        .captures_iter(markdown)
        .map(|caps| strip_delimiters(&caps[0]).to_string())
        .collect()
}

/// URLs that appear after a `#` on the same line
pub fn extract_commented_urls(text: &str) -> Vec<String> {
    COMMENTED_URL
        .captures_iter(text)
        .map(|caps| caps["url"].to_string())
        .collect()
}

// `(https://example.com)` -> `https://example.com`
fn strip_delimiters(matched: &str) -> &str {
    matched.trim_start_matches('(').trim_end_matches(')')
}
