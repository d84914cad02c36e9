use serde::Deserialize;

/// Default cap on `<url>` entries per sitemap file (the protocol maximum)
pub const DEFAULT_MAX_ENTRIES_PER_FILE: usize = 50_000;

/// Main configuration structure for Ripple-Sitemap
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub site: SiteConfig,
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(default)]
    pub sitemap: SitemapConfig,
}

impl Config {
    /// Creates a configuration for `url` with every other setting at its default
    pub fn for_site(url: &str) -> Self {
        Self {
            site: SiteConfig {
                url: url.to_string(),
            },
            crawler: CrawlerConfig::default(),
            sitemap: SitemapConfig::default(),
        }
    }
}

/// The site the sitemap describes
#[derive(Debug, Clone, Deserialize)]
pub struct SiteConfig {
    /// Start URL of the crawl; its origin prefixes every sitemap-index location
    pub url: String,
}

/// Settings for the crawler that feeds pages into the sitemap pipeline
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct CrawlerConfig {
    /// Maximum depth to crawl from the start URL (0 = unlimited)
    pub max_depth: u32,

    /// User agent sent with every request
    pub user_agent: String,

    /// Whether robots.txt rules are honored
    pub respect_robots_txt: bool,

    /// Per-request timeout (milliseconds)
    pub timeout_ms: u64,

    /// Whether query strings are removed from discovered URLs
    pub strip_querystring: bool,

    /// Whether TLS certificate errors are tolerated by the HTTP client
    pub accept_invalid_certs: bool,

    /// Maximum number of pages to fetch (0 = unlimited)
    pub max_pages: u64,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_depth: 0,
            user_agent: format!("RippleSitemap/{}", env!("CARGO_PKG_VERSION")),
            respect_robots_txt: true,
            timeout_ms: 30_000,
            strip_querystring: true,
            accept_invalid_certs: true,
            max_pages: 0,
        }
    }
}

/// Sitemap output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct SitemapConfig {
    /// Maximum number of entries written to a single sitemap file
    pub max_entries_per_file: usize,

    /// Whether last-modified metadata is extracted and written
    pub last_mod: bool,

    /// Date pattern used to format extracted last-modified values
    pub last_mod_format: String,

    /// Change frequency hint written for every entry (empty = omitted)
    pub change_freq: String,

    /// Ordered URL pattern to priority rules; the first match wins
    pub priority: Vec<PriorityEntry>,

    /// Whether AMP pages are left out of the sitemap
    pub ignore_amp: bool,

    /// Whether pages canonicalized to a different URL are left out
    pub ignore_canonicalized: bool,

    /// Destination path of the sitemap ("none" or empty disables output)
    pub destination: String,

    /// Directory for temporary sitemap parts (empty = system temp dir)
    pub temp_dir: String,
}

impl Default for SitemapConfig {
    fn default() -> Self {
        Self {
            max_entries_per_file: DEFAULT_MAX_ENTRIES_PER_FILE,
            last_mod: false,
            last_mod_format: "YYYY-MM-DD".to_string(),
            change_freq: String::new(),
            priority: Vec::new(),
            ignore_amp: true,
            ignore_canonicalized: true,
            destination: "sitemap.xml".to_string(),
            temp_dir: String::new(),
        }
    }
}

/// A single URL pattern to priority rule
#[derive(Debug, Clone, Deserialize)]
pub struct PriorityEntry {
    /// Regular expression matched against the page URL
    pub pattern: String,

    /// Priority assigned to matching URLs, in `[0, 1]`
    pub priority: f64,
}
