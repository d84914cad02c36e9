//! Last-modified date parsing and formatting
//!
//! Raw values come from `article:modified_time` meta tags (usually RFC 3339)
//! or from the `Last-Modified` response header (RFC 2822 HTTP-date). Values
//! are formatted in their own offset so the result never depends on the
//! local timezone of the machine generating the sitemap.

use crate::ConfigError;
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime};

/// Supported pattern tokens and their chrono equivalents, longest first
const TOKENS: &[(&str, &str)] = &[
    ("YYYY", "%Y"),
    ("YY", "%y"),
    ("MM", "%m"),
    ("DD", "%d"),
    ("HH", "%H"),
    ("mm", "%M"),
    ("ss", "%S"),
    ("M", "%-m"),
    ("D", "%-d"),
];

/// A date pattern such as `YYYY-MM-DD`, translated to a chrono format string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatePattern {
    pattern: String,
    format: String,
}

impl DatePattern {
    /// Translates a token pattern into a chrono format string
    ///
    /// Recognized tokens are `YYYY`, `YY`, `MM`, `M`, `DD`, `D`, `HH`, `mm`
    /// and `ss`; every other character is copied literally.
    ///
    /// # Returns
    ///
    /// * `Ok(DatePattern)` - The translated pattern
    /// * `Err(ConfigError)` - The pattern is empty or contains no token
    pub fn parse(pattern: &str) -> Result<Self, ConfigError> {
        let mut format = String::with_capacity(pattern.len() * 2);
        let mut rest = pattern;
        let mut token_count = 0;

        'outer: while let Some(c) = rest.chars().next() {
            for (token, spec) in TOKENS {
                if let Some(after) = rest.strip_prefix(token) {
                    format.push_str(spec);
                    rest = after;
                    token_count += 1;
                    continue 'outer;
                }
            }

            if c == '%' {
                format.push_str("%%");
            } else {
                format.push(c);
            }
            rest = &rest[c.len_utf8()..];
        }

        if token_count == 0 {
            return Err(ConfigError::Validation(format!(
                "last_mod_format '{}' contains no date token",
                pattern
            )));
        }

        Ok(Self {
            pattern: pattern.to_string(),
            format,
        })
    }

    /// The pattern as written in the configuration
    pub fn as_str(&self) -> &str {
        &self.pattern
    }

    /// Formats a date-time with this pattern
    pub fn format(&self, value: &DateTime<FixedOffset>) -> String {
        value.format(&self.format).to_string()
    }
}

impl Default for DatePattern {
    fn default() -> Self {
        Self {
            pattern: "YYYY-MM-DD".to_string(),
            format: "%Y-%m-%d".to_string(),
        }
    }
}

/// Parses a raw last-modified value
///
/// Accepted forms, tried in order: RFC 3339, RFC 2822, `YYYY-MM-DDTHH:MM:SS`
/// (UTC assumed) and `YYYY-MM-DD`.
///
/// # Returns
///
/// * `Some(DateTime)` - The parsed instant, in its original offset
/// * `None` - The value is not a recognizable date
pub fn parse_last_modified(raw: &str) -> Option<DateTime<FixedOffset>> {
    let raw = raw.trim();

    if let Ok(value) = DateTime::parse_from_rfc3339(raw) {
        return Some(value);
    }

    if let Ok(value) = DateTime::parse_from_rfc2822(raw) {
        return Some(value);
    }

    if let Ok(value) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S") {
        return Some(value.and_utc().fixed_offset());
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|value| value.and_utc().fixed_offset())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_rfc3339() {
        let value = parse_last_modified("2021-09-21T15:42:48+00:00").unwrap();
        assert_eq!(value.date_naive(), NaiveDate::from_ymd_opt(2021, 9, 21).unwrap());
    }

    #[test]
    fn test_parse_http_date() {
        let value = parse_last_modified("Thu, 05 Jan 2023 22:12:59 GMT").unwrap();
        assert_eq!(value.date_naive(), NaiveDate::from_ymd_opt(2023, 1, 5).unwrap());
    }

    #[test]
    fn test_parse_plain_date() {
        let value = parse_last_modified("2020-02-29").unwrap();
        assert_eq!(value.date_naive(), NaiveDate::from_ymd_opt(2020, 2, 29).unwrap());
    }

    #[test]
    fn test_parse_naive_datetime() {
        let value = parse_last_modified("2022-12-31T23:59:59").unwrap();
        assert_eq!(value.date_naive(), NaiveDate::from_ymd_opt(2022, 12, 31).unwrap());
    }

    #[test]
    fn test_parse_garbage() {
        assert!(parse_last_modified("yesterday-ish").is_none());
        assert!(parse_last_modified("").is_none());
    }

    #[test]
    fn test_offset_is_preserved() {
        // Late evening in UTC-5 is already the next day in UTC
        let value = parse_last_modified("2021-09-21T23:30:00-05:00").unwrap();
        let pattern = DatePattern::parse("YYYY-MM-DD").unwrap();
        assert_eq!(pattern.format(&value), "2021-09-21");
    }

    #[test]
    fn test_pattern_translation() {
        let value = parse_last_modified("2021-09-04T05:06:07+00:00").unwrap();

        let pattern = DatePattern::parse("YYYY-MM-DD HH:mm:ss").unwrap();
        assert_eq!(pattern.format(&value), "2021-09-04 05:06:07");

        let pattern = DatePattern::parse("D/M/YY").unwrap();
        assert_eq!(pattern.format(&value), "4/9/21");
    }

    #[test]
    fn test_literal_percent_is_escaped() {
        let value = parse_last_modified("2021-09-21").unwrap();
        let pattern = DatePattern::parse("YYYY%").unwrap();
        assert_eq!(pattern.format(&value), "2021%");
    }

    #[test]
    fn test_pattern_without_tokens_rejected() {
        assert!(DatePattern::parse("").is_err());
        assert!(DatePattern::parse("today").is_err());
    }

    #[test]
    fn test_default_pattern() {
        assert_eq!(DatePattern::default(), DatePattern::parse("YYYY-MM-DD").unwrap());
    }
}
