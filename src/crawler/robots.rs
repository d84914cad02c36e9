//! Robots.txt rules
//!
//! robots.txt is fetched once per crawl from the start URL's origin and
//! matched with the robotstxt crate.

use reqwest::Client;
use robotstxt::DefaultMatcher;
use url::Url;

/// Robots.txt rules for the crawled host
#[derive(Debug, Clone, Default)]
pub struct RobotsRules {
    /// Raw robots.txt content (empty means allow all)
    content: String,
}

impl RobotsRules {
    /// Creates rules from raw robots.txt content
    pub fn from_content(content: &str) -> Self {
        Self {
            content: content.to_string(),
        }
    }

    /// Creates rules that allow everything
    ///
    /// Used when robots.txt is ignored, missing or cannot be fetched.
    pub fn allow_all() -> Self {
        Self::default()
    }

    /// Fetches `/robots.txt` from the origin of `site_url`
    ///
    /// Any failure (network error, non-success status) yields
    /// [`allow_all`](Self::allow_all).
    pub async fn fetch(client: &Client, site_url: &Url) -> Self {
        let robots_url = match site_url.join("/robots.txt") {
            Ok(url) => url,
            Err(_) => return Self::allow_all(),
        };

        tracing::debug!("Fetching {}", robots_url);
        let response = match client.get(robots_url.clone()).send().await {
            Ok(response) if response.status().is_success() => response,
            Ok(response) => {
                tracing::debug!(
                    "No robots.txt at {} (HTTP {}), allowing all",
                    robots_url,
                    response.status().as_u16()
                );
                return Self::allow_all();
            }
            Err(e) => {
                tracing::warn!("Failed to fetch {}: {}, allowing all", robots_url, e);
                return Self::allow_all();
            }
        };

        match response.text().await {
            Ok(content) => Self::from_content(&content),
            Err(e) => {
                tracing::warn!("Failed to read {}: {}, allowing all", robots_url, e);
                Self::allow_all()
            }
        }
    }

    /// Checks if `url` may be fetched by `user_agent`
    ///
    /// Only the product token of `user_agent` (the part before `/`) is
    /// matched against `User-agent` groups.
    pub fn is_allowed(&self, url: &str, user_agent: &str) -> bool {
        if self.content.trim().is_empty() {
            return true;
        }

        let mut matcher = DefaultMatcher::default();
        matcher.one_agent_allowed_by_robots(&self.content, product_token(user_agent), url)
    }
}

/// Returns the product token of a user agent string
fn product_token(user_agent: &str) -> &str {
    user_agent
        .split(|c: char| c == '/' || c.is_whitespace())
        .next()
        .unwrap_or(user_agent)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allow_all() {
        let robots = RobotsRules::allow_all();
        assert!(robots.is_allowed("https://example.com/any/path", "TestBot"));
        assert!(robots.is_allowed("https://example.com/admin", "TestBot"));
    }

    #[test]
    fn test_disallow_all() {
        let robots = RobotsRules::from_content("User-agent: *\nDisallow: /");
        assert!(!robots.is_allowed("https://example.com/", "TestBot"));
        assert!(!robots.is_allowed("https://example.com/page", "TestBot"));
    }

    #[test]
    fn test_disallow_specific() {
        let robots = RobotsRules::from_content("User-agent: *\nDisallow: /admin");
        assert!(robots.is_allowed("https://example.com/", "TestBot"));
        assert!(robots.is_allowed("https://example.com/page", "TestBot"));
        assert!(!robots.is_allowed("https://example.com/admin", "TestBot"));
        assert!(!robots.is_allowed("https://example.com/admin/users", "TestBot"));
    }

    #[test]
    fn test_allow_overrides_disallow() {
        let robots =
            RobotsRules::from_content("User-agent: *\nDisallow: /private\nAllow: /private/public");
        assert!(!robots.is_allowed("https://example.com/private", "TestBot"));
        assert!(robots.is_allowed("https://example.com/private/public", "TestBot"));
    }

    #[test]
    fn test_specific_user_agent_with_version() {
        let robots =
            RobotsRules::from_content("User-agent: RippleSitemap\nDisallow: /\n\nUser-agent: *\nAllow: /");
        assert!(!robots.is_allowed("https://example.com/page", "RippleSitemap/1.0.0"));
        assert!(robots.is_allowed("https://example.com/page", "OtherBot/2.0"));
    }

    #[test]
    fn test_empty_content() {
        let robots = RobotsRules::from_content("");
        assert!(robots.is_allowed("https://example.com/any/path", "TestBot"));
    }

    #[test]
    fn test_product_token() {
        assert_eq!(product_token("RippleSitemap/1.0.0"), "RippleSitemap");
        assert_eq!(product_token("Mozilla/5.0 (X11)"), "Mozilla");
        assert_eq!(product_token("TestBot"), "TestBot");
    }
}
