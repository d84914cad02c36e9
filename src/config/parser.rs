//! Loading of the TOML configuration file
//!
//! The file is read once; its content is both parsed and hashed so the logged
//! hash always matches the settings that produced the sitemap.

use crate::config::types::Config;
use crate::config::validation::validate;
use crate::ConfigError;
use sha2::{Digest, Sha256};
use std::path::Path;

/// Parses and validates configuration text
///
/// Only structural checks happen here. Patterns, the change frequency and the
/// destination are resolved later by [`SitemapOptions::from_config`].
///
/// [`SitemapOptions::from_config`]: crate::config::SitemapOptions::from_config
pub fn parse_config(content: &str) -> Result<Config, ConfigError> {
    let config: Config = toml::from_str(content)?;
    validate(&config)?;
    Ok(config)
}

/// Loads the sitemap configuration from `path`
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use ripple_sitemap::config::load_config;
///
/// let config = load_config(Path::new("sitemap.toml")).unwrap();
/// println!("Site: {}", config.site.url);
/// ```
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    parse_config(&std::fs::read_to_string(path)?)
}

/// Hex-encoded SHA-256 of the configuration file at `path`
pub fn compute_config_hash(path: &Path) -> Result<String, ConfigError> {
    Ok(hash_content(&std::fs::read_to_string(path)?))
}

/// Loads the configuration and the hash of the exact text it was parsed from
pub fn load_config_with_hash(path: &Path) -> Result<(Config, String), ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let config = parse_config(&content)?;
    Ok((config, hash_content(&content)))
}

fn hash_content(content: &str) -> String {
    hex::encode(Sha256::digest(content.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_temp_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_load_valid_config() {
        let config_content = r#"
[site]
url = "https://example.com"

[crawler]
max-depth = 3
user-agent = "TestBot/1.0"
respect-robots-txt = false

[sitemap]
max-entries-per-file = 1000
last-mod = true
last-mod-format = "YYYY-MM-DD"
change-freq = "daily"
destination = "./out/sitemap.xml"

[[sitemap.priority]]
pattern = "^https://example\\.com/blog/"
priority = 0.8

[[sitemap.priority]]
pattern = "/archive/"
priority = 0.2
"#;

        let file = create_temp_config(config_content);
        let config = load_config(file.path()).unwrap();

        assert_eq!(config.site.url, "https://example.com");
        assert_eq!(config.crawler.max_depth, 3);
        assert!(!config.crawler.respect_robots_txt);
        assert_eq!(config.sitemap.max_entries_per_file, 1000);
        assert!(config.sitemap.last_mod);
        assert_eq!(config.sitemap.change_freq, "daily");
        assert_eq!(config.sitemap.priority.len(), 2);
        assert_eq!(config.sitemap.priority[0].pattern, "^https://example\\.com/blog/");
    }

    #[test]
    fn test_load_minimal_config_uses_defaults() {
        let file = create_temp_config("[site]\nurl = \"http://foo.bar\"\n");
        let config = load_config(file.path()).unwrap();

        assert_eq!(config.crawler.max_depth, 0);
        assert!(config.crawler.respect_robots_txt);
        assert_eq!(config.sitemap.max_entries_per_file, 50_000);
        assert_eq!(config.sitemap.last_mod_format, "YYYY-MM-DD");
        assert!(config.sitemap.ignore_amp);
        assert!(config.sitemap.ignore_canonicalized);
        assert_eq!(config.sitemap.destination, "sitemap.xml");
    }

    #[test]
    fn test_load_config_with_invalid_path() {
        let result = load_config(Path::new("/nonexistent/config.toml"));
        assert!(result.is_err());
    }

    #[test]
    fn test_load_config_with_invalid_toml() {
        let config_content = "this is not valid TOML {{{";
        let file = create_temp_config(config_content);
        let result = load_config(file.path());
        assert!(result.is_err());
    }

    #[test]
    fn test_load_config_with_validation_error() {
        let config_content = r#"
[site]
url = "https://example.com"

[sitemap]
max-entries-per-file = 0
"#;

        let file = create_temp_config(config_content);
        let result = load_config(file.path());
        assert!(result.is_err());
        assert!(matches!(result.unwrap_err(), ConfigError::Validation(_)));
    }

    #[test]
    fn test_compute_config_hash() {
        let config_content = "test content";
        let file = create_temp_config(config_content);

        let hash1 = compute_config_hash(file.path()).unwrap();
        let hash2 = compute_config_hash(file.path()).unwrap();

        // Same content should produce same hash
        assert_eq!(hash1, hash2);
        assert_eq!(hash1.len(), 64); // SHA-256 produces 64 hex characters
    }

    #[test]
    fn test_load_with_hash_matches_file_hash() {
        let file = create_temp_config("[site]\nurl = \"http://foo.bar\"\n");
        let (config, hash) = load_config_with_hash(file.path()).unwrap();

        assert_eq!(config.site.url, "http://foo.bar");
        assert_eq!(hash, compute_config_hash(file.path()).unwrap());
    }

    #[test]
    fn test_parse_config_from_text() {
        let content = "[site]\nurl = \"http://foo.bar\"\n[crawler]\nmax-pages = 5\n";
        let config = parse_config(content).unwrap();
        assert_eq!(config.crawler.max_pages, 5);

        assert!(matches!(
            parse_config("[site]\nurl = \"ftp://foo.bar\"\n"),
            Err(ConfigError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_different_content_different_hash() {
        let file1 = create_temp_config("content 1");
        let file2 = create_temp_config("content 2");

        let hash1 = compute_config_hash(file1.path()).unwrap();
        let hash2 = compute_config_hash(file2.path()).unwrap();

        assert_ne!(hash1, hash2);
    }
}
