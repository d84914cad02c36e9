//! Breadth-first crawl frontier
//!
//! This module handles:
//! - FIFO ordering of URLs to crawl, so shallower pages are fetched first
//! - Deduplication of every URL ever queued
//! - The depth limit

use std::collections::{HashSet, VecDeque};
use url::Url;

/// A URL queued for fetching
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueuedUrl {
    /// The URL to fetch
    pub url: Url,

    /// Distance from the start URL
    pub depth: u32,
}

/// Queue of URLs waiting to be fetched
#[derive(Debug)]
pub struct Frontier {
    queue: VecDeque<QueuedUrl>,
    seen: HashSet<String>,

    /// Deepest depth that is still queued (0 = unlimited)
    max_depth: u32,
}

impl Frontier {
    pub fn new(max_depth: u32) -> Self {
        Self {
            queue: VecDeque::new(),
            seen: HashSet::new(),
            max_depth,
        }
    }

    /// Queues `url` unless it was seen before or lies beyond the depth limit
    ///
    /// # Returns
    ///
    /// * `true` - The URL was queued
    /// * `false` - The URL was skipped
    pub fn push(&mut self, url: Url, depth: u32) -> bool {
        if self.max_depth > 0 && depth > self.max_depth {
            return false;
        }
        if !self.mark_seen(&url) {
            return false;
        }

        self.queue.push_back(QueuedUrl { url, depth });
        true
    }

    /// Next URL to fetch, shallowest first
    pub fn pop(&mut self) -> Option<QueuedUrl> {
        self.queue.pop_front()
    }

    /// Records `url` as seen without queuing it
    ///
    /// Returns false if it had already been seen.
    pub fn mark_seen(&mut self, url: &Url) -> bool {
        self.seen.insert(url.as_str().to_string())
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Number of distinct URLs seen so far
    pub fn seen_count(&self) -> usize {
        self.seen.len()
    }
}
