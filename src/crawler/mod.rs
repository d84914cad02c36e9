//! Crawler module feeding pages into the sitemap generator
//!
//! This module contains the crawling side of the tool, including:
//! - HTTP fetching with a scoped client configuration
//! - HTML link extraction
//! - Robots.txt handling
//! - Breadth-first, depth-limited crawl coordination on a single host

mod coordinator;
mod fetcher;
mod frontier;
mod parser;
mod robots;

pub use coordinator::{CrawlHandle, CrawlStats, Crawler};
pub use fetcher::{build_http_client, error_code, fetch_page, FetchResult};
pub use frontier::{Frontier, QueuedUrl};
pub use parser::extract_links;
pub use robots::RobotsRules;

use crate::config::Config;
use crate::events::Notifier;
use crate::generator::SitemapGenerator;
use crate::sitemap::PromotionOutcome;
use crate::Result;

/// Crawls the configured site and writes its sitemap
///
/// This is the main entry point. It will:
/// 1. Validate the configuration and build the generator
/// 2. Crawl the site, classifying every fetched page
/// 3. Seal and promote the sitemap files
///
/// When the crawl fails, nothing is promoted. The sealed temporaries are
/// logged and left in place, and `done` is still emitted.
///
/// # Arguments
///
/// * `config` - The configuration
/// * `notifier` - Receives add, ignore, warning, error and done events
///
/// # Returns
///
/// * `Ok(PromotionOutcome)` - Where the sitemap was written
/// * `Err(SitemapError)` - Configuration, crawl or promotion failed
pub async fn generate_sitemap(config: &Config, notifier: Notifier) -> Result<PromotionOutcome> {
    let mut generator = SitemapGenerator::from_config(config, notifier.clone())?;
    let crawler = Crawler::new(config, notifier)?;

    if let Err(e) = crawler.run(&mut generator).await {
        generator.abandon(&e);
        return Err(e);
    }
    generator.complete()
}
