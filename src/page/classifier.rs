//! Page classification
//!
//! Decides whether a fetched page belongs in the sitemap by looking for a
//! handful of markup patterns. Only targeted pattern extraction is done here;
//! no DOM is built.
//!
//! Exclusion rules are evaluated in order and the first match wins:
//!
//! 1. a `noindex` directive in any `<meta>` tag
//! 2. an AMP marker on the root `<html>` tag (when AMP pages are ignored)
//! 3. a canonical link pointing somewhere else (when canonicalized pages are ignored)

use crate::config::SitemapOptions;
use crate::events::Notifier;
use crate::page::lastmod::{parse_last_modified, DatePattern};
use crate::page::{ClassificationResult, CrawledPage, ExclusionReason};
use crate::url::normalize_url;
use crate::ConfigError;
use regex::Regex;
use url::Url;

/// Options that influence classification
#[derive(Debug, Clone, Default)]
pub struct ClassifierOptions {
    /// Exclude pages whose `<html>` tag carries an AMP marker
    pub ignore_amp: bool,

    /// Exclude pages whose canonical link targets a different URL
    pub ignore_canonicalized: bool,

    /// Resolve last-modified metadata for accepted pages
    pub last_mod: bool,

    /// Pattern used to format resolved last-modified values
    pub last_mod_format: DatePattern,
}

impl From<&SitemapOptions> for ClassifierOptions {
    fn from(options: &SitemapOptions) -> Self {
        Self {
            ignore_amp: options.ignore_amp,
            ignore_canonicalized: options.ignore_canonicalized,
            last_mod: options.last_mod,
            last_mod_format: options.last_mod_format.clone(),
        }
    }
}

/// Compiled markup patterns
#[derive(Debug, Clone)]
struct MarkupPatterns {
    noindex_meta: Regex,
    html_tag: Regex,
    attribute: Regex,
    canonical_link: Regex,
    href_attr: Regex,
    modified_time_meta: Regex,
    content_attr: Regex,
}

impl MarkupPatterns {
    fn compile() -> Result<Self, regex::Error> {
        Ok(Self {
            noindex_meta: Regex::new(r"(?is)<meta\b[^>]*\bnoindex\b[^>]*>")?,
            html_tag: Regex::new(r#"(?is)<html\b((?:"[^"]*"|'[^']*'|[^"'>])*)>"#)?,
            attribute: Regex::new(
                r#"(?s)([^\s=/>"']+)(?:\s*=\s*(?:"[^"]*"|'[^']*'|[^\s>]*))?"#,
            )?,
            canonical_link: Regex::new(
                r#"(?is)<link\b[^>]*\brel\s*=\s*["']?canonical["']?[^>]*>"#,
            )?,
            href_attr: Regex::new(r#"(?is)(?:^|\s)href\s*=\s*["']([^"']*)["']"#)?,
            modified_time_meta: Regex::new(
                r#"(?is)<meta\b[^>]*\bproperty\s*=\s*["']article:modified_time["'][^>]*>"#,
            )?,
            content_attr: Regex::new(r#"(?is)(?:^|\s)content\s*=\s*["']([^"']*)["']"#)?,
        })
    }
}

/// Decides inclusion of crawled pages and resolves their last-modified date
///
/// Every classification emits exactly one notification: `ignore` for excluded
/// pages, `add` for accepted ones. Unparseable dates additionally emit a
/// `warning` and never cause a page to be excluded.
#[derive(Debug, Clone)]
pub struct PageClassifier {
    options: ClassifierOptions,
    patterns: MarkupPatterns,
    notifier: Notifier,
}

impl PageClassifier {
    /// Creates a classifier
    ///
    /// # Returns
    ///
    /// * `Ok(PageClassifier)` - Ready to classify pages
    /// * `Err(ConfigError)` - A markup pattern failed to compile
    pub fn new(options: ClassifierOptions, notifier: Notifier) -> Result<Self, ConfigError> {
        let patterns =
            MarkupPatterns::compile().map_err(|e| ConfigError::InvalidPattern(e.to_string()))?;

        Ok(Self {
            options,
            patterns,
            notifier,
        })
    }

    /// Classifies one crawled page
    pub fn classify(&self, page: &CrawledPage) -> ClassificationResult {
        if let Some(reason) = self.exclusion_reason(page) {
            tracing::debug!("Ignoring {} ({})", page.url, reason);
            self.notifier.ignore(&page.url);
            return ClassificationResult::excluded(&page.url, reason);
        }

        self.notifier.add(&page.url);

        let mut result = ClassificationResult::accepted(&page.url);
        if !self.options.last_mod {
            return result;
        }

        result.last_modified_raw = self.last_modified_raw(page);

        if let Some(raw) = &result.last_modified_raw {
            match parse_last_modified(raw) {
                Some(value) => {
                    result.last_modified_formatted =
                        Some(self.options.last_mod_format.format(&value));
                }
                None => {
                    tracing::warn!("Unparseable last-modified value '{}' on {}", raw, page.url);
                    self.notifier.warning(
                        &page.url,
                        format!("Unparseable last-modified value '{}'", raw),
                    );
                }
            }
        }

        tracing::debug!("Adding {}", page.url);
        result
    }

    /// Returns the first exclusion rule that matches, if any
    fn exclusion_reason(&self, page: &CrawledPage) -> Option<ExclusionReason> {
        if self.patterns.noindex_meta.is_match(&page.body) {
            return Some(ExclusionReason::NoIndex);
        }

        if self.options.ignore_amp && self.is_amp(&page.body) {
            return Some(ExclusionReason::Amp);
        }

        if self.options.ignore_canonicalized {
            if let Some(canonical) = self.canonical_href(&page.body) {
                if !canonical.is_empty() && !same_target(&page.url, &canonical) {
                    return Some(ExclusionReason::Canonicalized { canonical });
                }
            }
        }

        None
    }

    /// Checks the attribute names of the `<html>` tag for an AMP marker
    fn is_amp(&self, body: &str) -> bool {
        let Some(tag) = self.patterns.html_tag.captures(body) else {
            return false;
        };

        self.patterns
            .attribute
            .captures_iter(&tag[1])
            .any(|attr| attr[1].eq_ignore_ascii_case("amp") || &attr[1] == "⚡")
    }

    /// Extracts the href of the first canonical link tag
    fn canonical_href(&self, body: &str) -> Option<String> {
        let tag = self.patterns.canonical_link.find(body)?;
        self.patterns
            .href_attr
            .captures(tag.as_str())
            .map(|caps| caps[1].trim().to_string())
    }

    /// Prefers the `article:modified_time` meta tag over the response header
    fn last_modified_raw(&self, page: &CrawledPage) -> Option<String> {
        let from_meta = self
            .patterns
            .modified_time_meta
            .find(&page.body)
            .and_then(|tag| self.patterns.content_attr.captures(tag.as_str()))
            .map(|caps| caps[1].trim().to_string())
            .filter(|value| !value.is_empty());

        from_meta.or_else(|| {
            page.header("last-modified")
                .map(str::trim)
                .filter(|value| !value.is_empty())
                .map(str::to_string)
        })
    }
}

/// Compares a page URL with its canonical target after normalization
///
/// Relative canonical links are resolved against the page URL. When either
/// side cannot be normalized the raw strings are compared.
fn same_target(page_url: &str, canonical: &str) -> bool {
    let resolved = Url::parse(page_url)
        .and_then(|base| base.join(canonical))
        .map(|url| url.to_string())
        .unwrap_or_else(|_| canonical.to_string());

    match (normalize_url(page_url), normalize_url(&resolved)) {
        (Ok(a), Ok(b)) => a == b,
        _ => page_url == canonical,
    }
}
