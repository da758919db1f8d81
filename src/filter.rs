use regex::Regex;
use serde::{Deserialize, Serialize};
use url::Url;

/// Configuration for URL validation before dispatch
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UrlFilterConfig {
    /// Schemes a URL may use (compared case-insensitively)
    #[serde(default = "default_allowed_schemes")]
    pub allowed_schemes: Vec<String>,

    /// Regex patterns for URLs to reject even when well-formed
    #[serde(default)]
    pub exclude_patterns: Vec<String>,
}

fn default_allowed_schemes() -> Vec<String> {
    vec!["http".to_string(), "https".to_string()]
}

impl Default for UrlFilterConfig {
    fn default() -> Self {
        Self {
            allowed_schemes: default_allowed_schemes(),
            exclude_patterns: Vec::new(),
        }
    }
}

/// A URL that failed validation and was never fetched
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvalidUrl {
    /// The input line as given
    pub url: String,
    /// Why it was rejected
    pub reason: String,
}

impl InvalidUrl {
    fn new(url: &str, reason: impl Into<String>) -> Self {
        Self {
            url: url.to_string(),
            reason: reason.into(),
        }
    }
}

/// URL filter that decides which input lines are dispatched to a fetcher
#[derive(Debug)]
pub struct UrlFilter {
    config: UrlFilterConfig,
    exclude_regexes: Vec<Regex>,
}

impl Default for UrlFilter {
    fn default() -> Self {
        Self {
            config: UrlFilterConfig::default(),
            exclude_regexes: Vec::new(),
        }
    }
}

impl UrlFilter {
    /// Create a new URL filter from configuration
    pub fn new(config: UrlFilterConfig) -> Result<Self, regex::Error> {
        let mut exclude_regexes = Vec::with_capacity(config.exclude_patterns.len());
        for pattern in &config.exclude_patterns {
            exclude_regexes.push(Regex::new(pattern)?);
        }

        Ok(Self {
            config,
            exclude_regexes,
        })
    }

    /// Validate a single input line.
    ///
    /// A URL must parse, use an allowed scheme, carry a host and not match any
    /// exclude pattern.
    pub fn validate(&self, raw: &str) -> Result<Url, InvalidUrl> {
        let url = Url::parse(raw).map_err(|e| InvalidUrl::new(raw, format!("not a URL: {e}")))?;

        let scheme_allowed = self
            .config
            .allowed_schemes
            .iter()
            .any(|s| s.eq_ignore_ascii_case(url.scheme()));
        if !scheme_allowed {
            return Err(InvalidUrl::new(
                raw,
                format!("unsupported scheme: {}", url.scheme()),
            ));
        }

        match url.host_str() {
            Some(host) if !host.is_empty() => {}
            _ => return Err(InvalidUrl::new(raw, "missing host")),
        }

        let url_str = url.as_str();
        if let Some(regex) = self.exclude_regexes.iter().find(|r| r.is_match(url_str)) {
            return Err(InvalidUrl::new(
                raw,
                format!("excluded by pattern: {}", regex.as_str()),
            ));
        }

        Ok(url)
    }

    /// Split input lines into dispatchable URLs and rejected ones, preserving order
    pub fn partition<'a, I>(&self, urls: I) -> (Vec<(String, Url)>, Vec<InvalidUrl>)
    where
        I: IntoIterator<Item = &'a String>,
    {
        let mut valid = Vec::new();
        let mut invalid = Vec::new();

        for raw in urls {
            match self.validate(raw) {
                Ok(url) => valid.push((raw.clone(), url)),
                Err(rejected) => {
                    ::log::warn!("Skipping invalid URL {}: {}", rejected.url, rejected.reason);
                    invalid.push(rejected);
                }
            }
        }

        (valid, invalid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter() {
        let filter = UrlFilter::default();

        assert!(filter.validate("https://example.com/page").is_ok());
        assert!(filter.validate("http://example.com").is_ok());
        assert!(filter.validate("HTTPS://EXAMPLE.COM/Shop").is_ok());
    }

    #[test]
    fn test_not_a_url() {
        let filter = UrlFilter::default();

        let err = filter.validate("not a url").unwrap_err();
        assert_eq!(err.url, "not a url");
        assert!(err.reason.starts_with("not a URL"));
    }

    #[test]
    fn test_hash_line_is_reported() {
        let filter = UrlFilter::default();
        let input = vec!["#promo".to_string(), "https://example.com/".to_string()];

        let (valid, invalid) = filter.partition(&input);
        assert_eq!(valid.len(), 1);
        assert_eq!(invalid.len(), 1);
        assert_eq!(invalid[0].url, "#promo");
        assert!(invalid[0].reason.starts_with("not a URL"));
    }

    #[test]
    fn test_scheme_restriction() {
        let filter = UrlFilter::default();

        let err = filter.validate("ftp://example.com/file").unwrap_err();
        assert_eq!(err.reason, "unsupported scheme: ftp");

        let err = filter.validate("mailto:someone@example.com").unwrap_err();
        assert_eq!(err.reason, "unsupported scheme: mailto");
    }

    #[test]
    fn test_missing_host() {
        let config = UrlFilterConfig {
            allowed_schemes: vec!["file".to_string()],
            exclude_patterns: vec![],
        };
        let filter = UrlFilter::new(config).unwrap();

        let err = filter.validate("file:///etc/hosts").unwrap_err();
        assert_eq!(err.reason, "missing host");
    }

    #[test]
    fn test_exclude_patterns() {
        let config = UrlFilterConfig {
            exclude_patterns: vec![r"\.(jpg|png|pdf)$".to_string()],
            ..UrlFilterConfig::default()
        };
        let filter = UrlFilter::new(config).unwrap();

        assert!(filter.validate("https://example.com/catalog").is_ok());
        let err = filter.validate("https://example.com/banner.png").unwrap_err();
        assert!(err.reason.starts_with("excluded by pattern"));
    }

    #[test]
    fn test_invalid_pattern_is_rejected() {
        let config = UrlFilterConfig {
            exclude_patterns: vec!["(".to_string()],
            ..UrlFilterConfig::default()
        };
        assert!(UrlFilter::new(config).is_err());
    }

    #[test]
    fn test_partition_preserves_order() {
        let filter = UrlFilter::default();
        let input = vec![
            "https://a.example/".to_string(),
            "not a url".to_string(),
            "https://b.example/".to_string(),
        ];

        let (valid, invalid) = filter.partition(&input);
        let valid: Vec<_> = valid.into_iter().map(|(raw, _)| raw).collect();
        assert_eq!(valid, vec!["https://a.example/", "https://b.example/"]);
        assert_eq!(invalid.len(), 1);
        assert_eq!(invalid[0].url, "not a url");
    }
}
