use crate::config::types::{
    Config, CrawlerConfig, PriorityEntry, SitemapConfig, DEFAULT_MAX_ENTRIES_PER_FILE,
};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_site_url(&config.site.url)?;
    validate_crawler_config(&config.crawler)?;
    validate_sitemap_config(&config.sitemap)?;
    Ok(())
}

/// Validates the start URL
fn validate_site_url(url: &str) -> Result<(), ConfigError> {
    if url.is_empty() {
        return Err(ConfigError::InvalidUrl("site url cannot be empty".to_string()));
    }

    let parsed = Url::parse(url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid site url '{}': {}", url, e)))?;

    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "Site url '{}' must use HTTP or HTTPS",
            url
        )));
    }

    if parsed.host_str().is_none() {
        return Err(ConfigError::InvalidUrl(format!(
            "Site url '{}' has no host",
            url
        )));
    }

    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user_agent cannot be empty".to_string(),
        ));
    }

    if config.timeout_ms < 100 {
        return Err(ConfigError::Validation(format!(
            "timeout_ms must be >= 100ms, got {}ms",
            config.timeout_ms
        )));
    }

    Ok(())
}

/// Validates sitemap configuration
fn validate_sitemap_config(config: &SitemapConfig) -> Result<(), ConfigError> {
    if config.max_entries_per_file < 1 || config.max_entries_per_file > DEFAULT_MAX_ENTRIES_PER_FILE
    {
        return Err(ConfigError::Validation(format!(
            "max_entries_per_file must be between 1 and {}, got {}",
            DEFAULT_MAX_ENTRIES_PER_FILE, config.max_entries_per_file
        )));
    }

    if config.last_mod_format.trim().is_empty() {
        return Err(ConfigError::Validation(
            "last_mod_format cannot be empty".to_string(),
        ));
    }

    validate_priority_entries(&config.priority)?;

    Ok(())
}

/// Validates priority values; patterns are compiled during option resolution
fn validate_priority_entries(entries: &[PriorityEntry]) -> Result<(), ConfigError> {
    for entry in entries {
        if entry.pattern.is_empty() {
            return Err(ConfigError::InvalidPattern(
                "Priority pattern cannot be empty".to_string(),
            ));
        }

        if !(0.0..=1.0).contains(&entry.priority) {
            return Err(ConfigError::Validation(format!(
                "Priority for pattern '{}' must be between 0 and 1, got {}",
                entry.pattern, entry.priority
            )));
        }
    }

    Ok(())
}
