//! Resolved runtime options
//!
//! The raw TOML configuration is resolved once, before any crawl activity,
//! into strongly typed options: compiled priority patterns, a parsed change
//! frequency, a translated date pattern and the output destination.

use crate::config::types::Config;
use crate::config::validation::validate;
use crate::page::DatePattern;
use crate::sitemap::{ChangeFreq, Destination, PriorityMap};
use crate::ConfigError;
use std::path::PathBuf;
use url::Url;

/// Options consumed by the sitemap assembly pipeline
#[derive(Debug, Clone)]
pub struct SitemapOptions {
    /// Site the sitemap describes
    pub site_url: Url,

    /// Capacity of each sitemap file
    pub max_entries_per_file: usize,

    /// Whether last-modified metadata is extracted and written
    pub last_mod: bool,

    /// Pattern used to format last-modified values
    pub last_mod_format: DatePattern,

    /// Change frequency written for every entry
    pub change_freq: Option<ChangeFreq>,

    /// URL pattern to priority rules
    pub priority_map: PriorityMap,

    /// Whether AMP pages are excluded
    pub ignore_amp: bool,

    /// Whether pages canonicalized elsewhere are excluded
    pub ignore_canonicalized: bool,

    /// Where the finished sitemap is promoted to
    pub destination: Destination,

    /// Directory holding temporary sitemap parts
    pub temp_dir: PathBuf,
}

impl SitemapOptions {
    /// Validates `config` and resolves it into pipeline options
    ///
    /// # Returns
    ///
    /// * `Ok(SitemapOptions)` - Fully resolved options
    /// * `Err(ConfigError)` - The configuration is invalid
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        validate(config)?;

        let site_url = Url::parse(&config.site.url)
            .map_err(|e| ConfigError::InvalidUrl(format!("{}: {}", config.site.url, e)))?;

        let sitemap = &config.sitemap;

        let change_freq = if sitemap.change_freq.trim().is_empty() {
            None
        } else {
            Some(sitemap.change_freq.parse::<ChangeFreq>()?)
        };

        let destination = Destination::parse(&sitemap.destination);
        if let Destination::Path(path) = &destination {
            if path.file_name().is_none() {
                return Err(ConfigError::Validation(format!(
                    "destination '{}' must name a file",
                    path.display()
                )));
            }
        }

        let temp_dir = if sitemap.temp_dir.trim().is_empty() {
            std::env::temp_dir()
        } else {
            PathBuf::from(&sitemap.temp_dir)
        };

        Ok(Self {
            site_url,
            max_entries_per_file: sitemap.max_entries_per_file,
            last_mod: sitemap.last_mod,
            last_mod_format: DatePattern::parse(&sitemap.last_mod_format)?,
            change_freq,
            priority_map: PriorityMap::from_entries(&sitemap.priority)?,
            ignore_amp: sitemap.ignore_amp,
            ignore_canonicalized: sitemap.ignore_canonicalized,
            destination,
            temp_dir,
        })
    }
}
