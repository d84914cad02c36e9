//! Ripple-Sitemap: sitemap generation from crawl results
//!
//! This crate turns a stream of crawled pages into one or more sitemap files,
//! stitching them together with a sitemap index when the entry count exceeds
//! the per-file cap. The pipeline runs in four steps:
//!
//! 1. [`page::PageClassifier`] decides whether a page belongs in the sitemap
//! 2. [`sitemap::SitemapRotator`] batches accepted entries into capacity-bounded files
//! 3. [`sitemap::build_sitemap_index`] references every part from a single index
//! 4. [`sitemap::promote`] moves the temporary output to the destination path
//!
//! The [`crawler`] module is a thin collaborator that feeds pages into
//! [`generator::SitemapGenerator`], which drives the steps above.

pub mod config;
pub mod crawler;
pub mod events;
pub mod generator;
pub mod page;
pub mod sitemap;
pub mod url;

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for Ripple-Sitemap operations
#[derive(Debug, Error)]
pub enum SitemapError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("URL error: {0}")]
    UrlError(#[from] UrlError),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("IO error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Site unreachable: {url}: {reason}")]
    SiteUnreachable { url: String, reason: String },

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Promotion failed: {0}")]
    Promotion(#[from] sitemap::PromotionError),
}

impl SitemapError {
    /// Wraps an I/O error with the path it occurred on
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid priority pattern: {0}")]
    InvalidPattern(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing domain in URL")]
    MissingDomain,

    #[error("URL is not on the crawled site: {0}")]
    OffSite(String),
}

/// Result type alias for Ripple-Sitemap operations
pub type Result<T> = std::result::Result<T, SitemapError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::{Config, SitemapOptions};
pub use events::{Notifier, SitemapEvent};
pub use generator::SitemapGenerator;
pub use page::{ClassificationResult, CrawledPage, PageClassifier};
pub use sitemap::{ChangeFreq, PromotionOutcome, SitemapEntry, SitemapRotator};
pub use crate::url::normalize_url;
