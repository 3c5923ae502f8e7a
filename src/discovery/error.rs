//! Error types for discovery providers.
//!
//! Ordinary absence ("not open access", "unknown DOI") is never an error; it
//! is returned as `Ok(None)`. These variants mean "could not determine right
//! now" or "called incorrectly".

use thiserror::Error;

use crate::idconv::IdConvError;

/// Errors that can occur while asking a provider for open-access locations.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    /// A required credential or parameter was missing; no request was sent.
    #[error("{provider} is not configured: {message}\n  Suggestion: {suggestion}")]
    Configuration {
        /// Provider name.
        provider: &'static str,
        /// What is missing.
        message: String,
        /// How to fix it.
        suggestion: &'static str,
    },

    /// The provider answered HTTP 429.
    #[error("[RATE LIMITED] {provider} rate limit exceeded (HTTP 429){}", retry_after_suffix(.retry_after.as_deref()))]
    RateLimited {
        /// Provider name.
        provider: &'static str,
        /// Raw `Retry-After` header value, if the provider sent one.
        retry_after: Option<String>,
    },

    /// Non-2xx status other than 404 and 429.
    #[error("{provider} returned HTTP {status} for {url}")]
    HttpStatus {
        /// Provider name.
        provider: &'static str,
        /// Request URL (never includes credentials).
        url: String,
        /// The HTTP status code.
        status: u16,
    },

    /// Network-level failure (DNS, connection reset, timeout).
    #[error("network error querying {provider}: {source}")]
    Network {
        /// Provider name.
        provider: &'static str,
        /// The underlying transport error.
        #[source]
        source: reqwest::Error,
    },

    /// The response body was not the expected JSON document.
    #[error("{provider} response could not be decoded: {message}")]
    Decode {
        /// Provider name.
        provider: &'static str,
        /// Decoder message.
        message: String,
    },

    /// The embedded identifier lookup failed (PMC via PMID).
    #[error("identifier lookup failed: {0}")]
    IdConversion(#[from] IdConvError),

    /// HTTP client construction failed.
    #[error("{provider} HTTP client could not be built: {source}")]
    ClientBuild {
        /// Provider name.
        provider: &'static str,
        /// The underlying builder error.
        #[source]
        source: reqwest::Error,
    },
}

fn retry_after_suffix(retry_after: Option<&str>) -> String {
    retry_after.map_or_else(String::new, |value| format!(", retry after {value}"))
}

impl DiscoveryError {
    /// Creates a configuration error.
    pub fn configuration(
        provider: &'static str,
        message: impl Into<String>,
        suggestion: &'static str,
    ) -> Self {
        Self::Configuration {
            provider,
            message: message.into(),
            suggestion,
        }
    }

    /// Creates a rate-limit error.
    pub fn rate_limited(provider: &'static str, retry_after: Option<String>) -> Self {
        Self::RateLimited {
            provider,
            retry_after,
        }
    }

    /// Creates an HTTP status error.
    pub fn http_status(provider: &'static str, url: impl Into<String>, status: u16) -> Self {
        Self::HttpStatus {
            provider,
            url: url.into(),
            status,
        }
    }

    /// Creates a network error.
    pub fn network(provider: &'static str, source: reqwest::Error) -> Self {
        Self::Network { provider, source }
    }

    /// Creates a decode error.
    pub fn decode(provider: &'static str, message: impl Into<String>) -> Self {
        Self::Decode {
            provider,
            message: message.into(),
        }
    }

    /// True for [`DiscoveryError::RateLimited`].
    #[must_use]
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, Self::RateLimited { .. })
    }

    /// True for [`DiscoveryError::Configuration`].
    #[must_use]
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_limited_message_is_labeled() {
        let err = DiscoveryError::rate_limited("core", None);
        let msg = err.to_string();
        assert!(msg.starts_with("[RATE LIMITED]"), "Expected label in: {msg}");
        assert!(msg.contains("core"));
        assert!(msg.contains("429"));
        assert!(err.is_rate_limited());
        assert!(!err.is_configuration());
    }

    #[test]
    fn test_rate_limited_message_includes_retry_after() {
        let err = DiscoveryError::rate_limited("core", Some("30".to_string()));
        assert!(err.to_string().ends_with("retry after 30"));
    }

    #[test]
    fn test_configuration_message_has_suggestion() {
        let err = DiscoveryError::configuration(
            "unpaywall",
            "contact email is required",
            "Pass a contact email in DiscoveryOptions",
        );
        let msg = err.to_string();
        assert!(msg.contains("unpaywall is not configured"));
        assert!(msg.contains("Suggestion"));
        assert!(err.is_configuration());
    }

    #[test]
    fn test_http_status_message() {
        let err = DiscoveryError::http_status("unpaywall", "https://api.unpaywall.org/v2/x", 500);
        assert!(err.to_string().contains("HTTP 500"));
        assert!(!err.is_rate_limited());
    }

    #[test]
    fn test_id_conversion_error_wraps() {
        let err: DiscoveryError = IdConvError::http_status("123", 502).into();
        assert!(err.to_string().contains("identifier lookup failed"));
        assert!(err.to_string().contains("502"));
    }
}
