//! Sitemap generation pipeline
//!
//! [`SitemapGenerator`] consumes crawled pages one at a time, in arrival
//! order, and drives them through classification, rotation and promotion:
//!
//! 1. [`SitemapGenerator::handle_page`] classifies a page and hands accepted
//!    pages to the rotator
//! 2. [`SitemapGenerator::complete`] seals the last file, promotes every
//!    sealed file to the destination and emits `done`
//!
//! A crawl stopped before the frontier is exhausted can still be completed;
//! the sitemap then covers the pages seen so far.

use crate::config::{Config, SitemapOptions};
use crate::events::Notifier;
use crate::page::{ClassificationResult, ClassifierOptions, CrawledPage, PageClassifier};
use crate::sitemap::{promote, PromotionOutcome, SitemapRotator};
use crate::{Result, SitemapError};
use std::path::PathBuf;

/// Counters kept while pages are consumed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GeneratorStats {
    pub pages_seen: usize,
    pub pages_accepted: usize,
    pub pages_ignored: usize,
}

/// Drives crawled pages through the sitemap assembly pipeline
#[derive(Debug)]
pub struct SitemapGenerator {
    options: SitemapOptions,
    classifier: PageClassifier,
    rotator: SitemapRotator,
    notifier: Notifier,
    stats: GeneratorStats,
}

impl SitemapGenerator {
    /// Creates a generator from resolved options
    ///
    /// # Returns
    ///
    /// * `Ok(SitemapGenerator)` - Ready to consume pages
    /// * `Err(SitemapError)` - The options are unusable
    pub fn new(options: SitemapOptions, notifier: Notifier) -> Result<Self> {
        let classifier = PageClassifier::new(ClassifierOptions::from(&options), notifier.clone())?;
        let rotator = SitemapRotator::from_options(&options)?;

        tracing::debug!(
            "Sitemap generator ready: destination {}, {} entries per file, {} priority rule(s)",
            options.destination,
            options.max_entries_per_file,
            options.priority_map.len()
        );

        Ok(Self {
            options,
            classifier,
            rotator,
            notifier,
            stats: GeneratorStats::default(),
        })
    }

    /// Validates `config` and creates a generator from it
    ///
    /// Configuration errors surface here, before any page is fetched.
    pub fn from_config(config: &Config, notifier: Notifier) -> Result<Self> {
        let options = SitemapOptions::from_config(config)?;
        Self::new(options, notifier)
    }

    /// Classifies one page and records it when accepted
    ///
    /// With output disabled, accepted pages are still reported but not written.
    pub fn handle_page(&mut self, page: &CrawledPage) -> Result<ClassificationResult> {
        let result = self.classifier.classify(page);
        self.stats.pages_seen += 1;

        if !result.accepted {
            self.stats.pages_ignored += 1;
            return Ok(result);
        }

        self.stats.pages_accepted += 1;
        if !self.options.destination.is_disabled() {
            self.rotator.add_entry(
                &result.url,
                page.depth,
                result.last_modified_raw.as_deref(),
            )?;
        }

        Ok(result)
    }

    /// Seals the sitemap, promotes it and emits `done`
    ///
    /// `done` is emitted even when promotion fails, after the failure has been
    /// logged.
    pub fn complete(mut self) -> Result<PromotionOutcome> {
        let result = self.finish_and_promote();

        match &result {
            Ok(outcome) => tracing::info!(
                "Sitemap complete: {} ({} of {} pages accepted)",
                outcome,
                self.stats.pages_accepted,
                self.stats.pages_seen
            ),
            Err(e) => tracing::error!("Sitemap promotion failed: {}", e),
        }

        self.notifier.done();
        result
    }

    /// Ends the pipeline after the crawl failed, without promoting anything
    ///
    /// The open file is sealed and every temporary is left in place for
    /// external cleanup. Their paths are logged and returned. `done` is
    /// emitted so observers see the pipeline end.
    pub fn abandon(mut self, cause: &SitemapError) -> Vec<PathBuf> {
        if let Err(e) = self.rotator.finish() {
            tracing::warn!("Failed to seal the open sitemap file: {}", e);
        }

        let temporaries: Vec<PathBuf> = self
            .rotator
            .sealed_files()
            .iter()
            .map(|file| file.path.clone())
            .collect();

        tracing::error!(
            "Sitemap abandoned after {} pages: {}; {} temporary file(s) left behind",
            self.stats.pages_seen,
            cause,
            temporaries.len()
        );
        for path in &temporaries {
            tracing::warn!("Left temporary sitemap file {}", path.display());
        }

        self.notifier.done();
        temporaries
    }

    pub fn options(&self) -> &SitemapOptions {
        &self.options
    }

    pub fn stats(&self) -> GeneratorStats {
        self.stats
    }

    fn finish_and_promote(&mut self) -> Result<PromotionOutcome> {
        self.rotator.finish()?;
        let sealed = self.rotator.paths()?;

        let outcome = promote(&sealed, &self.options.destination, &self.options.site_url)?;
        Ok(outcome)
    }
}
