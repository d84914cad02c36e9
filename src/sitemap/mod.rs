//! Sitemap assembly
//!
//! This module handles:
//! - Resolving entry priorities from URL patterns and crawl depth
//! - Streaming entries into capacity-bounded sitemap files
//! - Rotating to a new file when the active one is full
//! - Building the sitemap index that references every part
//! - Promoting temporary files to their final location

mod finalizer;
mod index;
mod priority;
mod rotator;
mod writer;

pub use finalizer::{
    promote, Destination, Promotion, PromotionError, PromotionFailure, PromotionOutcome,
    PromotionStep,
};
pub use index::{build_sitemap_index, part_filename, part_path};
pub use priority::{resolve_priority, PriorityMap, PriorityRule};
pub use rotator::SitemapRotator;
pub use writer::{SealedFile, SitemapFileWriter};

use crate::ConfigError;
use chrono::NaiveDate;
use std::fmt;
use std::str::FromStr;

/// Namespace of the sitemaps protocol
pub const SITEMAP_NAMESPACE: &str = "http://www.sitemaps.org/schemas/sitemap/0.9";

/// How often a page is expected to change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeFreq {
    Always,
    Hourly,
    Daily,
    Weekly,
    Monthly,
    Yearly,
    Never,
}

impl ChangeFreq {
    /// Returns the protocol value written into `<changefreq>`
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Always => "always",
            Self::Hourly => "hourly",
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
            Self::Yearly => "yearly",
            Self::Never => "never",
        }
    }
}

impl FromStr for ChangeFreq {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "always" => Ok(Self::Always),
            "hourly" => Ok(Self::Hourly),
            "daily" => Ok(Self::Daily),
            "weekly" => Ok(Self::Weekly),
            "monthly" => Ok(Self::Monthly),
            "yearly" => Ok(Self::Yearly),
            "never" => Ok(Self::Never),
            other => Err(ConfigError::Validation(format!(
                "change_freq must be one of always, hourly, daily, weekly, monthly, yearly, never; got '{}'",
                other
            ))),
        }
    }
}

impl fmt::Display for ChangeFreq {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One `<url>` element of a sitemap
#[derive(Debug, Clone, PartialEq)]
pub struct SitemapEntry {
    /// Page location
    pub url: String,

    /// Crawl priority in `[0, 1]`
    pub priority: f64,

    /// Expected change frequency
    pub change_frequency: Option<ChangeFreq>,

    /// Date of last modification
    pub last_modified: Option<NaiveDate>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_change_freq_roundtrip() {
        for freq in [
            ChangeFreq::Always,
            ChangeFreq::Hourly,
            ChangeFreq::Daily,
            ChangeFreq::Weekly,
            ChangeFreq::Monthly,
            ChangeFreq::Yearly,
            ChangeFreq::Never,
        ] {
            assert_eq!(freq.as_str().parse::<ChangeFreq>().unwrap(), freq);
        }
    }

    #[test]
    fn test_change_freq_case_insensitive() {
        assert_eq!("Daily".parse::<ChangeFreq>().unwrap(), ChangeFreq::Daily);
        assert_eq!(" WEEKLY ".parse::<ChangeFreq>().unwrap(), ChangeFreq::Weekly);
    }

    #[test]
    fn test_change_freq_invalid() {
        assert!(matches!(
            "sometimes".parse::<ChangeFreq>().unwrap_err(),
            ConfigError::Validation(_)
        ));
    }
}
