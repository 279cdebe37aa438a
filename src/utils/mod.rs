//! Utility functions and helpers.

pub mod bill;
pub mod http;

use url::Url;

/// Whether a string is an absolute `http`/`https` URL.
pub fn is_http_url(candidate: &str) -> bool {
    Url::parse(candidate)
        .map(|u| matches!(u.scheme(), "http" | "https") && u.host_str().is_some())
        .unwrap_or(false)
}

/// Collapse runs of whitespace into single spaces and trim the ends.
pub fn normalize_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_http_url() {
        assert!(is_http_url("https://www.congress.gov/rss"));
        assert!(is_http_url("http://localhost:8080/feed.xml"));
        assert!(!is_http_url("urn:uuid:1234"));
        assert!(!is_http_url("ftp://example.com/feed"));
        assert!(!is_http_url("/relative/path"));
        assert!(!is_http_url("119-hr-1234"));
    }

    #[test]
    fn test_normalize_whitespace() {
        assert_eq!(
            normalize_whitespace("  H.R. 1234\n\t - Clean   Water "),
            "H.R. 1234 - Clean Water"
        );
    }
}
