//! Configuration module for Ripple-Sitemap
//!
//! This module handles loading, parsing, and validating TOML configuration files,
//! and resolving them into the options used by the sitemap pipeline.
//!
//! # Example
//!
//! ```no_run
//! use ripple_sitemap::config::{load_config, SitemapOptions};
//! use std::path::Path;
//!
//! let config = load_config(Path::new("sitemap.toml")).unwrap();
//! let options = SitemapOptions::from_config(&config).unwrap();
//! println!("Entries per file: {}", options.max_entries_per_file);
//! ```

mod options;
mod parser;
mod types;
mod validation;

// Re-export types
pub use options::SitemapOptions;
pub use types::{
    Config, CrawlerConfig, PriorityEntry, SiteConfig, SitemapConfig, DEFAULT_MAX_ENTRIES_PER_FILE,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
