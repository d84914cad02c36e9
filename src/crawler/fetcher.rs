//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building the HTTP client from crawler settings
//! - GET requests with redirects followed by the client
//! - Classifying responses into pages, skips and errors

use crate::config::CrawlerConfig;
use reqwest::{header::CONTENT_TYPE, redirect::Policy, Client, StatusCode};
use std::collections::HashMap;
use std::time::Duration;
use url::Url;

/// Longest redirect chain followed for a single request
const MAX_REDIRECTS: usize = 10;

/// Result of a fetch operation
#[derive(Debug)]
pub enum FetchResult {
    /// Successfully fetched an HTML page
    Success {
        /// Final URL after redirects
        final_url: Url,
        /// HTTP status code
        status_code: u16,
        /// Response headers (last value wins for repeated names)
        headers: HashMap<String, String>,
        /// Page body content
        body: String,
    },

    /// Page is not HTML (Content-Type mismatch)
    ContentMismatch {
        /// The actual Content-Type received
        content_type: String,
    },

    /// The server answered with a non-success status
    HttpError {
        /// The HTTP status code
        status_code: u16,
    },

    /// The request did not complete within the configured timeout
    Timeout,

    /// Network error (DNS failure, connection refused, TLS, redirect loop)
    NetworkError {
        /// Error description
        error: String,
        /// Whether the connection could not be established at all
        connect: bool,
    },
}

/// Builds an HTTP client with proper configuration
///
/// Certificate checking is relaxed only on this client when
/// `accept_invalid_certs` is set; nothing outside the crawler is affected.
///
/// # Arguments
///
/// * `config` - The crawler configuration
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
///
/// # Example
///
/// ```no_run
/// use ripple_sitemap::config::CrawlerConfig;
/// use ripple_sitemap::crawler::build_http_client;
///
/// let client = build_http_client(&CrawlerConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &CrawlerConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.as_str())
        .timeout(Duration::from_millis(config.timeout_ms))
        .redirect(Policy::limited(MAX_REDIRECTS))
        .danger_accept_invalid_certs(config.accept_invalid_certs)
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches a URL and classifies the response
///
/// | Condition | Result |
/// |-----------|--------|
/// | 2xx with an HTML Content-Type | `Success` |
/// | 2xx with another Content-Type | `ContentMismatch` |
/// | Any other status | `HttpError` |
/// | Timeout | `Timeout` |
/// | DNS, connection, TLS or redirect failure | `NetworkError` |
pub async fn fetch_page(client: &Client, url: &Url) -> FetchResult {
    let response = match client.get(url.clone()).send().await {
        Ok(response) => response,
        Err(e) => return classify_error(e),
    };

    let status = response.status();
    if !status.is_success() {
        return FetchResult::HttpError {
            status_code: status.as_u16(),
        };
    }

    let final_url = response.url().clone();
    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();

    if !is_html(&content_type) {
        return FetchResult::ContentMismatch { content_type };
    }

    let headers: HashMap<String, String> = response
        .headers()
        .iter()
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|value| (name.as_str().to_string(), value.to_string()))
        })
        .collect();

    match response.text().await {
        Ok(body) => FetchResult::Success {
            final_url,
            status_code: status.as_u16(),
            headers,
            body,
        },
        Err(e) => classify_error(e),
    }
}

fn classify_error(e: reqwest::Error) -> FetchResult {
    if e.is_timeout() {
        FetchResult::Timeout
    } else {
        FetchResult::NetworkError {
            error: e.to_string(),
            connect: e.is_connect(),
        }
    }
}

fn is_html(content_type: &str) -> bool {
    let mime = content_type
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_ascii_lowercase();
    mime == "text/html" || mime == "application/xhtml+xml"
}

/// Status code reported for a failed fetch
///
/// Timeouts map to 408; network failures without a status map to 400.
pub fn error_code(result: &FetchResult) -> Option<u16> {
    match result {
        FetchResult::HttpError { status_code } => Some(*status_code),
        FetchResult::Timeout => Some(StatusCode::REQUEST_TIMEOUT.as_u16()),
        FetchResult::NetworkError { .. } => Some(StatusCode::BAD_REQUEST.as_u16()),
        FetchResult::Success { .. } | FetchResult::ContentMismatch { .. } => None,
    }
}
