//! Source URL extraction for rendered answers

use regex::Regex;
use std::collections::HashSet;
use std::sync::OnceLock;

/// Default number of sources shown under an answer
pub const MAX_CITATIONS: usize = 5;

/// Characters stripped from the end of a matched URL
const TRAILING: &[char] = &[')', '.', ',', ']', '}', '>', '"', '\''];

fn url_regex() -> &'static Regex {
    static URL_RE: OnceLock<Regex> = OnceLock::new();
    URL_RE.get_or_init(|| Regex::new(r"https?://\S+").expect("URL pattern is valid"))
}

/// Extract up to [`MAX_CITATIONS`] distinct URLs in first-seen order
pub fn extract_urls(text: &str) -> Vec<String> {
    extract_urls_with_limit(text, MAX_CITATIONS)
}

/// Extract up to `limit` distinct URLs in first-seen order
pub fn extract_urls_with_limit(text: &str, limit: usize) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut urls = Vec::new();

    for m in url_regex().find_iter(text) {
        if urls.len() == limit {
            break;
        }
        let url = m.as_str().trim_end_matches(TRAILING);
        if url.is_empty() || !seen.insert(url) {
            continue;
        }
        urls.push(url.to_string());
    }

    urls
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parenthesized_duplicate() {
        assert_eq!(
            extract_urls("see (https://a.com/x) and https://a.com/x again"),
            vec!["https://a.com/x"]
        );
    }

    #[test]
    fn test_empty_input() {
        assert!(extract_urls("").is_empty());
        assert!(extract_urls("no links here").is_empty());
    }

    #[test]
    fn test_strips_trailing_punctuation() {
        assert_eq!(
            extract_urls("Sources: <https://b.org/page>, \"http://c.net/q?x=1\"."),
            vec!["https://b.org/page", "http://c.net/q?x=1"]
        );
    }

    #[test]
    fn test_keeps_first_seen_order_and_caps() {
        let text = (1..=8)
            .map(|i| format!("https://site{}.com", i))
            .collect::<Vec<_>>()
            .join(" ");
        let urls = extract_urls(&text);
        assert_eq!(urls.len(), 5);
        assert_eq!(urls[0], "https://site1.com");
        assert_eq!(urls[4], "https://site5.com");

        assert_eq!(extract_urls_with_limit(&text, 2).len(), 2);
    }

    #[test]
    fn test_markdown_link() {
        assert_eq!(
            extract_urls("[docs](https://docs.rs/regex)."),
            vec!["https://docs.rs/regex"]
        );
    }
}
