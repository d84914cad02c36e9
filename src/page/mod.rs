//! Crawled pages and their classification
//!
//! This module handles:
//! - The per-page payload handed over by the crawler
//! - Deciding whether a page belongs in the sitemap
//! - Resolving and formatting last-modified metadata

mod classifier;
mod lastmod;

pub use classifier::{ClassifierOptions, PageClassifier};
pub use lastmod::{parse_last_modified, DatePattern};

use std::collections::HashMap;
use std::fmt;

/// One fetched page, as produced by the crawler
#[derive(Debug, Clone, Default)]
pub struct CrawledPage {
    /// The page URL
    pub url: String,

    /// Distance from the start URL (the start page has depth 0)
    pub depth: u32,

    /// Response headers, keyed by header name
    pub response_headers: HashMap<String, String>,

    /// Raw markup body
    pub body: String,
}

impl CrawledPage {
    /// Looks up a response header by name, ignoring ASCII case
    pub fn header(&self, name: &str) -> Option<&str> {
        self.response_headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// Why a page was left out of the sitemap
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExclusionReason {
    /// A `<meta>` tag carries a `noindex` directive
    NoIndex,

    /// The root `<html>` tag carries an AMP marker
    Amp,

    /// The canonical link targets a different URL
    Canonicalized { canonical: String },
}

impl fmt::Display for ExclusionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoIndex => write!(f, "noindex"),
            Self::Amp => write!(f, "amp page"),
            Self::Canonicalized { canonical } => write!(f, "canonicalized to {}", canonical),
        }
    }
}

/// Outcome of classifying one page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassificationResult {
    /// Whether the page goes into the sitemap
    pub accepted: bool,

    /// The page URL
    pub url: String,

    /// Last-modified value as found in the markup or headers
    pub last_modified_raw: Option<String>,

    /// Last-modified value formatted with the configured pattern
    pub last_modified_formatted: Option<String>,

    /// The rule that excluded the page, when not accepted
    pub exclusion: Option<ExclusionReason>,
}

impl ClassificationResult {
    pub(crate) fn accepted(url: &str) -> Self {
        Self {
            accepted: true,
            url: url.to_string(),
            last_modified_raw: None,
            last_modified_formatted: None,
            exclusion: None,
        }
    }

    pub(crate) fn excluded(url: &str, reason: ExclusionReason) -> Self {
        Self {
            accepted: false,
            url: url.to_string(),
            last_modified_raw: None,
            last_modified_formatted: None,
            exclusion: Some(reason),
        }
    }
}
