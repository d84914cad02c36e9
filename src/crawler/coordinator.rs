//! Crawler coordinator - main crawl orchestration logic
//!
//! This module contains the crawl loop that feeds the sitemap generator:
//! - Seeding the frontier with the site URL and any URLs queued by the caller
//! - Checking robots.txt before each fetch
//! - Fetching pages and reporting failures
//! - Extracting, normalizing and queuing same-host links
//! - Handing each fetched page to the generator, in fetch order

use crate::config::{Config, CrawlerConfig};
use crate::crawler::fetcher::{build_http_client, error_code, fetch_page, FetchResult};
use crate::crawler::frontier::{Frontier, QueuedUrl};
use crate::crawler::parser::extract_links;
use crate::crawler::robots::RobotsRules;
use crate::events::Notifier;
use crate::generator::SitemapGenerator;
use crate::page::CrawledPage;
use crate::url::{normalize_url, same_host, strip_querystring};
use crate::{Result, SitemapError, UrlError, UrlResult};
use reqwest::Client;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Instant;
use url::Url;

/// Summary of a finished crawl
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CrawlStats {
    /// Pages fetched successfully and handed to the generator
    pub pages_fetched: u64,

    /// Fetches that ended in an error notification
    pub pages_failed: u64,

    /// URLs skipped because robots.txt disallows them
    pub pages_disallowed: u64,

    /// Whether the crawl ended before the frontier was exhausted
    pub stopped_early: bool,
}

/// Controls a crawl from another task
///
/// A handle can stop the crawl and queue extra URLs that no page links to.
#[derive(Debug, Clone)]
pub struct CrawlHandle {
    stop: Arc<AtomicBool>,
    queued: Arc<Mutex<Vec<Url>>>,
    start_url: Url,
    strip_querystring: bool,
}

impl CrawlHandle {
    /// Requests the crawl to stop before its next fetch
    pub fn stop(&self) {
        self.stop.store(true, Ordering::SeqCst);
    }

    pub fn is_stopped(&self) -> bool {
        self.stop.load(Ordering::SeqCst)
    }

    /// Queues `url` for fetching at depth 0
    ///
    /// The URL is picked up before the crawler's next fetch. URLs queued
    /// before [`Crawler::run`] are fetched right after the start URL.
    ///
    /// # Returns
    ///
    /// * `Ok(())` - The URL was queued (already crawled URLs are skipped later)
    /// * `Err(UrlError)` - The URL is invalid or not on the crawled host
    pub fn queue_url(&self, url: &str) -> UrlResult<()> {
        let mut url = normalize_url(url)?;
        if self.strip_querystring {
            strip_querystring(&mut url);
        }
        if !same_host(&url, &self.start_url) {
            return Err(UrlError::OffSite(url.to_string()));
        }

        lock_queue(&self.queued).push(url);
        Ok(())
    }

    /// Takes every URL queued since the last call
    fn take_queued(&self) -> Vec<Url> {
        std::mem::take(&mut *lock_queue(&self.queued))
    }
}

/// Locks the queued URL list; a poisoned list is still usable
fn lock_queue(queued: &Mutex<Vec<Url>>) -> std::sync::MutexGuard<'_, Vec<Url>> {
    match queued.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

/// Single-host breadth-first crawler
pub struct Crawler {
    config: CrawlerConfig,
    start_url: Url,
    client: Client,
    notifier: Notifier,
    handle: CrawlHandle,
}

impl Crawler {
    /// Creates a crawler for the site in `config`
    ///
    /// # Returns
    ///
    /// * `Ok(Crawler)` - Ready to run
    /// * `Err(SitemapError)` - The site URL is invalid or the HTTP client failed to build
    pub fn new(config: &Config, notifier: Notifier) -> Result<Self> {
        let start_url = normalize_url(&config.site.url)?;
        let client = build_http_client(&config.crawler)?;

        let handle = CrawlHandle {
            stop: Arc::new(AtomicBool::new(false)),
            queued: Arc::new(Mutex::new(Vec::new())),
            start_url: start_url.clone(),
            strip_querystring: config.crawler.strip_querystring,
        };

        Ok(Self {
            config: config.crawler.clone(),
            start_url,
            client,
            notifier,
            handle,
        })
    }

    /// Returns a handle that can stop this crawl or queue more URLs
    pub fn handle(&self) -> CrawlHandle {
        self.handle.clone()
    }

    /// Queues an extra URL at depth 0; see [`CrawlHandle::queue_url`]
    pub fn queue_url(&self, url: &str) -> UrlResult<()> {
        self.handle.queue_url(url)
    }

    pub fn start_url(&self) -> &Url {
        &self.start_url
    }

    /// Runs the crawl, handing every fetched page to `generator`
    ///
    /// The generator is not completed here; callers complete it afterwards,
    /// also after an early stop.
    ///
    /// # Returns
    ///
    /// * `Ok(CrawlStats)` - The crawl ended (frontier exhausted, page cap or stop)
    /// * `Err(SitemapError)` - The site could not be reached, or the generator failed
    pub async fn run(&self, generator: &mut SitemapGenerator) -> Result<CrawlStats> {
        tracing::info!("Starting crawl of {}", self.start_url);

        let robots = if self.config.respect_robots_txt {
            RobotsRules::fetch(&self.client, &self.start_url).await
        } else {
            RobotsRules::allow_all()
        };

        let mut frontier = Frontier::new(self.config.max_depth);
        frontier.push(self.start_url.clone(), 0);

        let mut stats = CrawlStats::default();
        let start_time = Instant::now();

        loop {
            for url in self.handle.take_queued() {
                if frontier.push(url.clone(), 0) {
                    tracing::debug!("Queued {}", url);
                }
            }

            let Some(queued) = frontier.pop() else {
                break;
            };

            if self.handle.is_stopped() {
                tracing::info!("Crawl stopped with {} URLs still queued", frontier.len() + 1);
                stats.stopped_early = true;
                break;
            }

            if self.config.max_pages > 0 && stats.pages_fetched >= self.config.max_pages {
                tracing::info!("Page limit of {} reached", self.config.max_pages);
                stats.stopped_early = true;
                break;
            }

            if !robots.is_allowed(queued.url.as_str(), &self.config.user_agent) {
                tracing::debug!("URL {} disallowed by robots.txt", queued.url);
                self.notifier.ignore(queued.url.as_str());
                stats.pages_disallowed += 1;
                continue;
            }

            self.process_url(&queued, &mut frontier, generator, &mut stats)
                .await?;

            let processed = stats.pages_fetched + stats.pages_failed;
            if processed > 0 && processed % 10 == 0 {
                let rate = processed as f64 / start_time.elapsed().as_secs_f64().max(f64::EPSILON);
                tracing::info!(
                    "Progress: {} pages fetched, {} in frontier, {:.2} pages/sec",
                    stats.pages_fetched,
                    frontier.len(),
                    rate
                );
            }
        }

        tracing::info!(
            "Crawl finished: {} fetched, {} failed, {} disallowed in {:?}",
            stats.pages_fetched,
            stats.pages_failed,
            stats.pages_disallowed,
            start_time.elapsed()
        );

        Ok(stats)
    }

    /// Fetches one URL, queues its links and hands the page to the generator
    async fn process_url(
        &self,
        queued: &QueuedUrl,
        frontier: &mut Frontier,
        generator: &mut SitemapGenerator,
        stats: &mut CrawlStats,
    ) -> Result<()> {
        let url_str = queued.url.as_str();
        tracing::debug!("Fetching {} (depth {})", url_str, queued.depth);

        match fetch_page(&self.client, &queued.url).await {
            FetchResult::Success {
                final_url,
                headers,
                body,
                ..
            } => {
                let page_url = match self.resolve_final_url(queued, final_url, frontier) {
                    Some(url) => url,
                    None => return Ok(()),
                };

                stats.pages_fetched += 1;

                for link in extract_links(&body, &page_url) {
                    self.enqueue(frontier, &link, queued.depth + 1);
                }

                let page = CrawledPage {
                    url: page_url.to_string(),
                    depth: queued.depth,
                    response_headers: headers,
                    body,
                };
                generator.handle_page(&page)?;
            }

            FetchResult::ContentMismatch { content_type } => {
                tracing::debug!("Skipping {} (content type {})", url_str, content_type);
            }

            FetchResult::NetworkError { error, connect }
                if connect && queued.depth == 0 && stats.pages_fetched == 0 =>
            {
                return Err(SitemapError::SiteUnreachable {
                    url: url_str.to_string(),
                    reason: error,
                });
            }

            failure => {
                stats.pages_failed += 1;
                let code = error_code(&failure).unwrap_or(400);
                match failure {
                    FetchResult::NetworkError { error, .. } => {
                        tracing::warn!("Failed to fetch {}: {}", url_str, error);
                        self.notifier.error_with_message(code, error, url_str);
                    }
                    _ => {
                        tracing::debug!("Fetch of {} failed with {}", url_str, code);
                        self.notifier.error(code, url_str);
                    }
                }
            }
        }

        Ok(())
    }

    /// Maps the URL a response came from back into the crawl
    ///
    /// Returns None when a redirect left the host or landed on a URL that was
    /// already crawled.
    fn resolve_final_url(
        &self,
        queued: &QueuedUrl,
        final_url: Url,
        frontier: &mut Frontier,
    ) -> Option<Url> {
        let final_url = match normalize_url(final_url.as_str()) {
            Ok(url) => url,
            Err(_) => return Some(queued.url.clone()),
        };

        if final_url == queued.url {
            return Some(final_url);
        }

        if !same_host(&final_url, &self.start_url) {
            tracing::debug!("{} redirected off-site to {}", queued.url, final_url);
            self.notifier.ignore(queued.url.as_str());
            return None;
        }

        if !frontier.mark_seen(&final_url) {
            tracing::debug!("{} redirected to already seen {}", queued.url, final_url);
            return None;
        }

        Some(final_url)
    }

    /// Normalizes a discovered link and queues it when it stays on the site
    fn enqueue(&self, frontier: &mut Frontier, link: &str, depth: u32) {
        let mut url = match normalize_url(link) {
            Ok(url) => url,
            Err(e) => {
                tracing::debug!("Failed to normalize URL {}: {}", link, e);
                return;
            }
        };

        if self.config.strip_querystring {
            strip_querystring(&mut url);
        }

        if !same_host(&url, &self.start_url) {
            return;
        }

        frontier.push(url, depth);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crawler_creation() {
        let config = Config::for_site("https://example.com/blog/../");
        let crawler = Crawler::new(&config, Notifier::disabled()).unwrap();
        assert_eq!(crawler.start_url().as_str(), "https://example.com/");
    }

    #[test]
    fn test_crawler_rejects_invalid_site() {
        let config = Config::for_site("ftp://example.com/");
        assert!(Crawler::new(&config, Notifier::disabled()).is_err());
    }

    #[test]
    fn test_handle_stops_crawler() {
        let config = Config::for_site("https://example.com/");
        let crawler = Crawler::new(&config, Notifier::disabled()).unwrap();
        let handle = crawler.handle();

        assert!(!handle.is_stopped());
        handle.stop();
        assert!(crawler.handle().is_stopped());
    }

    #[test]
    fn test_queue_url_validates_host() {
        let config = Config::for_site("https://example.com/");
        let crawler = Crawler::new(&config, Notifier::disabled()).unwrap();

        crawler.queue_url("https://example.com/orphan?b=1#x").unwrap();
        crawler.handle().queue_url("https://EXAMPLE.com/other").unwrap();
        assert!(matches!(
            crawler.queue_url("https://other.com/page"),
            Err(UrlError::OffSite(_))
        ));
        assert!(crawler.queue_url("ftp://example.com/").is_err());

        let queued: Vec<String> = crawler
            .handle
            .take_queued()
            .iter()
            .map(|url| url.to_string())
            .collect();
        assert_eq!(
            queued,
            vec!["https://example.com/orphan", "https://example.com/other"]
        );
        assert!(crawler.handle.take_queued().is_empty());
    }

    #[test]
    fn test_enqueue_filters_links() {
        let config = Config::for_site("https://example.com/");
        let crawler = Crawler::new(&config, Notifier::disabled()).unwrap();
        let mut frontier = Frontier::new(0);

        crawler.enqueue(&mut frontier, "https://example.com/a?b=2#top", 1);
        crawler.enqueue(&mut frontier, "https://example.com/a?c=3", 1);
        crawler.enqueue(&mut frontier, "https://other.com/a", 1);
        crawler.enqueue(&mut frontier, "not a url", 1);

        assert_eq!(frontier.len(), 1);
        assert_eq!(frontier.pop().unwrap().url.as_str(), "https://example.com/a");
    }

    #[test]
    fn test_enqueue_keeps_querystring_when_configured() {
        let mut config = Config::for_site("https://example.com/");
        config.crawler.strip_querystring = false;
        let crawler = Crawler::new(&config, Notifier::disabled()).unwrap();
        let mut frontier = Frontier::new(0);

        crawler.enqueue(&mut frontier, "https://example.com/a?b=2", 1);
        crawler.enqueue(&mut frontier, "https://example.com/a?c=3", 1);

        assert_eq!(frontier.len(), 2);
    }
}
