//! URL handling module for Ripple-Sitemap
//!
//! This module provides URL normalization and host extraction, used to compare
//! canonical links against page URLs and to keep the crawl on a single host.

mod normalize;

use url::Url;

// Re-export main functions
pub use normalize::{normalize_url, strip_querystring};

/// Returns the lowercase host of a URL, if it has one
pub fn extract_domain(url: &Url) -> Option<String> {
    url.host_str().map(|h| h.to_lowercase())
}

/// Checks whether two URLs point at the same host and explicit port
///
/// The scheme is ignored so that http and https variants of a site match.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use ripple_sitemap::url::same_host;
///
/// let a = Url::parse("https://example.com/a").unwrap();
/// let b = Url::parse("http://EXAMPLE.com/b").unwrap();
/// assert!(same_host(&a, &b));
/// ```
pub fn same_host(a: &Url, b: &Url) -> bool {
    match (extract_domain(a), extract_domain(b)) {
        (Some(host_a), Some(host_b)) => host_a == host_b && a.port() == b.port(),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_host_different_path() {
        let a = Url::parse("https://example.com/a").unwrap();
        let b = Url::parse("https://example.com/b?x=1").unwrap();
        assert!(same_host(&a, &b));
    }

    #[test]
    fn test_different_host() {
        let a = Url::parse("https://example.com/").unwrap();
        let b = Url::parse("https://blog.example.com/").unwrap();
        assert!(!same_host(&a, &b));
    }

    #[test]
    fn test_different_explicit_port() {
        let a = Url::parse("http://127.0.0.1:8080/").unwrap();
        let b = Url::parse("http://127.0.0.1:9090/").unwrap();
        assert!(!same_host(&a, &b));
    }
}
