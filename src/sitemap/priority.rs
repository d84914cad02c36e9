use crate::config::PriorityEntry;
use crate::ConfigError;
use regex::Regex;

/// Lowest priority produced by the depth fallback
const MIN_FALLBACK_PRIORITY: f64 = 0.1;

/// A compiled URL pattern with the priority it assigns
#[derive(Debug, Clone)]
pub struct PriorityRule {
    pub pattern: Regex,
    pub priority: f64,
}

/// Ordered priority rules; the first matching pattern wins
#[derive(Debug, Clone, Default)]
pub struct PriorityMap {
    rules: Vec<PriorityRule>,
}

impl PriorityMap {
    /// Compiles configured priority entries, keeping their order
    ///
    /// # Returns
    ///
    /// * `Ok(PriorityMap)` - Every pattern compiled
    /// * `Err(ConfigError)` - A pattern is not a valid regular expression
    pub fn from_entries(entries: &[PriorityEntry]) -> Result<Self, ConfigError> {
        let rules = entries
            .iter()
            .map(|entry| {
                let pattern = Regex::new(&entry.pattern).map_err(|e| {
                    ConfigError::InvalidPattern(format!("'{}': {}", entry.pattern, e))
                })?;
                Ok(PriorityRule {
                    pattern,
                    priority: entry.priority,
                })
            })
            .collect::<Result<Vec<_>, ConfigError>>()?;

        Ok(Self { rules })
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Resolves the priority of `url` found at `depth`
    pub fn resolve(&self, url: &str, depth: u32) -> f64 {
        resolve_priority(url, depth, self)
    }
}

/// Maps a URL and its crawl depth to a sitemap priority
///
/// The first rule whose pattern matches `url` decides. Without a match the
/// priority decays with depth as `1 / (depth + 1)`, clamped to `[0.1, 1.0]`.
///
/// # Examples
///
/// ```
/// use ripple_sitemap::sitemap::{resolve_priority, PriorityMap};
///
/// let map = PriorityMap::default();
/// assert_eq!(resolve_priority("https://example.com/", 0, &map), 1.0);
/// assert_eq!(resolve_priority("https://example.com/a", 1, &map), 0.5);
/// ```
pub fn resolve_priority(url: &str, depth: u32, priority_map: &PriorityMap) -> f64 {
    priority_map
        .rules
        .iter()
        .find(|rule| rule.pattern.is_match(url))
        .map(|rule| rule.priority)
        .unwrap_or_else(|| (1.0 / (f64::from(depth) + 1.0)).clamp(MIN_FALLBACK_PRIORITY, 1.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(entries: &[(&str, f64)]) -> PriorityMap {
        let entries: Vec<PriorityEntry> = entries
            .iter()
            .map(|(pattern, priority)| PriorityEntry {
                pattern: pattern.to_string(),
                priority: *priority,
            })
            .collect();
        PriorityMap::from_entries(&entries).unwrap()
    }

    #[test]
    fn test_depth_fallback() {
        let empty = PriorityMap::default();
        assert_eq!(resolve_priority("http://foo.bar/", 0, &empty), 1.0);
        assert_eq!(resolve_priority("http://foo.bar/a", 1, &empty), 0.5);
        assert_eq!(resolve_priority("http://foo.bar/a/b", 3, &empty), 0.25);
    }

    #[test]
    fn test_depth_fallback_clamped() {
        let empty = PriorityMap::default();
        assert_eq!(resolve_priority("http://foo.bar/deep", 9, &empty), 0.1);
        assert_eq!(resolve_priority("http://foo.bar/deeper", 500, &empty), 0.1);
    }

    #[test]
    fn test_fallback_is_monotonic() {
        let empty = PriorityMap::default();
        let mut previous = f64::MAX;
        for depth in 0..20 {
            let priority = resolve_priority("http://foo.bar/", depth, &empty);
            assert!(priority <= previous);
            assert!((0.1..=1.0).contains(&priority));
            previous = priority;
        }
    }

    #[test]
    fn test_first_match_wins() {
        let rules = map(&[("/blog/", 0.9), ("/blog/archive/", 0.2)]);
        assert_eq!(rules.resolve("http://foo.bar/blog/archive/2020", 4), 0.9);
    }

    #[test]
    fn test_declaration_order_matters() {
        let rules = map(&[("/blog/archive/", 0.2), ("/blog/", 0.9)]);
        assert_eq!(rules.resolve("http://foo.bar/blog/archive/2020", 4), 0.2);
        assert_eq!(rules.resolve("http://foo.bar/blog/post", 4), 0.9);
    }

    #[test]
    fn test_no_match_falls_back_to_depth() {
        let rules = map(&[(r"\.pdf$", 0.1)]);
        assert_eq!(rules.resolve("http://foo.bar/about", 1), 0.5);
    }

    #[test]
    fn test_invalid_pattern_rejected() {
        let entries = vec![PriorityEntry {
            pattern: "(unclosed".to_string(),
            priority: 0.5,
        }];
        assert!(matches!(
            PriorityMap::from_entries(&entries).unwrap_err(),
            ConfigError::InvalidPattern(_)
        ));
    }
}
