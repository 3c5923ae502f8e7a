//! Helpers shared by the HTTP-backed providers.

use std::sync::LazyLock;

use regex::Regex;
use reqwest::StatusCode;
use reqwest::header::RETRY_AFTER;
use serde::de::DeserializeOwned;

use super::DiscoveryError;

static PMC_ARTICLE_URL_RE: LazyLock<Regex> =
    LazyLock::new(|| compile_static_regex(r"(?i)/pmc/articles/(PMC\d+)"));

/// Compiles a hard-coded pattern; patterns are covered by unit tests.
pub(crate) fn compile_static_regex(pattern: &str) -> Regex {
    Regex::new(pattern).unwrap_or_else(|e| panic!("invalid static regex '{pattern}': {e}"))
}

/// Strips an optional case-insensitive `PMC` prefix, returning the digits.
///
/// Returns `None` when the remainder is empty or not purely numeric.
#[must_use]
pub(crate) fn normalize_pmcid_digits(pmcid: &str) -> Option<&str> {
    let trimmed = pmcid.trim();
    let digits = match trimmed.get(..3) {
        Some(prefix) if prefix.eq_ignore_ascii_case("pmc") => &trimmed[3..],
        _ => trimmed,
    };
    if !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit()) {
        Some(digits)
    } else {
        None
    }
}

/// Finds the first PMCID embedded in a PMC article URL (`/pmc/articles/PMC123…`).
#[must_use]
pub(crate) fn extract_pmcid_from_url(url: &str) -> Option<String> {
    PMC_ARTICLE_URL_RE
        .captures(url)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_ascii_uppercase())
}

/// Outcome of mapping a provider response status.
pub(crate) enum StatusOutcome {
    /// 2xx: continue reading the body.
    Success,
    /// 404: the provider has no record.
    NotFound,
}

/// Applies the shared provider status policy.
///
/// # Errors
///
/// 429 becomes [`DiscoveryError::RateLimited`]; any other non-2xx except 404
/// becomes [`DiscoveryError::HttpStatus`].
pub(crate) fn check_status(
    provider: &'static str,
    url: &str,
    response: &reqwest::Response,
) -> Result<StatusOutcome, DiscoveryError> {
    let status = response.status();
    if status.is_success() {
        return Ok(StatusOutcome::Success);
    }
    if status == StatusCode::NOT_FOUND {
        return Ok(StatusOutcome::NotFound);
    }
    if status == StatusCode::TOO_MANY_REQUESTS {
        let retry_after = response
            .headers()
            .get(RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .map(ToString::to_string);
        return Err(DiscoveryError::rate_limited(provider, retry_after));
    }
    Err(DiscoveryError::http_status(provider, url, status.as_u16()))
}

/// Reads and decodes a JSON body.
///
/// # Errors
///
/// Transport failures while reading become [`DiscoveryError::Network`];
/// malformed JSON becomes [`DiscoveryError::Decode`].
pub(crate) async fn read_json<T: DeserializeOwned>(
    provider: &'static str,
    response: reqwest::Response,
) -> Result<T, DiscoveryError> {
    let body = response
        .bytes()
        .await
        .map_err(|e| DiscoveryError::network(provider, e))?;
    serde_json::from_slice(&body).map_err(|e| DiscoveryError::decode(provider, e.to_string()))
}
