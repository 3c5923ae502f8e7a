//! DOI ⇄ PMID ⇄ PMCID cross-resolution via the NCBI ID Converter.
//!
//! The [`IdResolver`] calls `idconv/v1.0` with every requested identifier
//! joined into one `ids=` parameter, so a batch of N identifiers costs a single
//! request. Per-record error markers are treated as "unresolvable" for that
//! record only; the rest of the batch still resolves.
//!
//! # Example
//!
//! ```no_run
//! use fulltext_core::HttpSettings;
//! use fulltext_core::idconv::IdResolver;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let resolver = IdResolver::new(HttpSettings::discovery())?;
//! if let Some(ids) = resolver.resolve_one("10.1093/nar/gks1195").await? {
//!     println!("PMCID: {:?}", ids.pmcid());
//! }
//! # Ok(())
//! # }
//! ```

mod error;

pub use error::IdConvError;

use std::collections::HashMap;

use reqwest::Client;
use reqwest::StatusCode;
use serde::{Deserialize, Deserializer};
use tracing::{debug, instrument};
use url::Url;

use crate::http_client::{ClientRole, HttpSettings, build_http_client};
use crate::model::IdConversionResult;

/// Default NCBI ID Converter endpoint.
const DEFAULT_BASE_URL: &str = "https://www.ncbi.nlm.nih.gov/pmc/utils/idconv/v1.0/";

/// `tool` parameter this crate identifies itself with to NCBI.
pub const NCBI_TOOL: &str = "fulltext";

// ==================== ID Converter Response Types ====================

#[derive(Debug, Deserialize)]
struct IdConvResponse {
    #[serde(default)]
    records: Vec<IdConvRecord>,
}

#[derive(Debug, Deserialize)]
struct IdConvRecord {
    #[serde(default, deserialize_with = "string_or_number")]
    pmcid: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pmid: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    doi: Option<String>,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    errmsg: Option<String>,
}

impl IdConvRecord {
    fn is_error(&self) -> bool {
        self.errmsg.is_some()
            || self
                .status
                .as_deref()
                .is_some_and(|status| status.eq_ignore_ascii_case("error"))
    }

    fn into_result(self) -> Option<IdConversionResult> {
        if self.is_error() {
            return None;
        }
        IdConversionResult::new(self.pmcid, self.pmid, self.doi)
    }
}

/// NCBI returns `pmid` as a JSON number and everything else as strings.
fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) => Some(s),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

// ==================== IdResolver ====================

/// Client for the NCBI ID Converter service.
#[derive(Clone)]
pub struct IdResolver {
    client: Client,
    base_url: String,
    tool: Option<String>,
    email: Option<String>,
}

impl IdResolver {
    /// Creates a resolver against the public NCBI endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`IdConvError::ClientBuild`] when HTTP client construction fails.
    pub fn new(settings: HttpSettings) -> Result<Self, IdConvError> {
        Self::with_base_url(DEFAULT_BASE_URL, settings)
    }

    /// Creates a resolver against a custom endpoint (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`IdConvError::ClientBuild`] when HTTP client construction fails.
    pub fn with_base_url(
        base_url: impl Into<String>,
        settings: HttpSettings,
    ) -> Result<Self, IdConvError> {
        let client = build_http_client(
            "idconv",
            ClientRole::Discovery,
            settings,
        )
        .map_err(|source| IdConvError::ClientBuild { source })?;
        Ok(Self {
            client,
            base_url: base_url.into(),
            tool: None,
            email: None,
        })
    }

    /// Sets the `tool`/`email` parameters NCBI asks API users to send.
    #[must_use]
    pub fn with_identity(mut self, tool: Option<String>, email: Option<String>) -> Self {
        self.tool = tool.filter(|v| !v.trim().is_empty());
        self.email = email.filter(|v| !v.trim().is_empty());
        self
    }

    /// Resolves a single identifier.
    ///
    /// Returns `Ok(None)` when the identifier is blank, unknown to the service,
    /// or reported with a per-record error.
    ///
    /// # Errors
    ///
    /// Returns [`IdConvError`] on transport failure or a non-2xx status other than 404.
    #[instrument(skip(self), fields(resolver = "idconv"))]
    pub async fn resolve_one(&self, id: &str) -> Result<Option<IdConversionResult>, IdConvError> {
        let id = id.trim();
        if id.is_empty() {
            return Ok(None);
        }
        let records = self.fetch_records(&[id.to_string()]).await?;
        Ok(records.into_iter().find_map(IdConvRecord::into_result))
    }

    /// Resolves many identifiers with a single request.
    ///
    /// Each resolved record is keyed by the requested identifier it matches,
    /// checking the record's DOI, then PMID, then PMCID. Records with a
    /// per-record error or no identifiers at all are omitted.
    ///
    /// # Errors
    ///
    /// Returns [`IdConvError`] on transport failure or a non-2xx status other than 404.
    #[instrument(skip(self, ids), fields(resolver = "idconv", count = ids.len()))]
    pub async fn resolve_batch<S: AsRef<str>>(
        &self,
        ids: &[S],
    ) -> Result<HashMap<String, IdConversionResult>, IdConvError> {
        let requested: Vec<String> = ids
            .iter()
            .map(|id| id.as_ref().trim().to_string())
            .filter(|id| !id.is_empty())
            .collect();
        if requested.is_empty() {
            return Ok(HashMap::new());
        }

        let records = self.fetch_records(&requested).await?;
        let mut resolved = HashMap::new();
        for record in records {
            let Some(result) = record.into_result() else {
                continue;
            };
            if let Some(key) = batch_key(&result, &requested) {
                resolved.insert(key, result);
            }
        }
        debug!(
            requested = requested.len(),
            resolved = resolved.len(),
            "batch conversion complete"
        );
        Ok(resolved)
    }

    async fn fetch_records(&self, ids: &[String]) -> Result<Vec<IdConvRecord>, IdConvError> {
        let joined = ids.join(",");
        let url = self.request_url(&joined)?;

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| IdConvError::network(joined.clone(), e))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            debug!(ids = %joined, "ID converter returned 404; treating as not found");
            return Ok(Vec::new());
        }
        if !status.is_success() {
            return Err(IdConvError::http_status(joined, status.as_u16()));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| IdConvError::network(joined.clone(), e))?;
        let parsed: IdConvResponse = serde_json::from_slice(&body)
            .map_err(|e| IdConvError::decode(joined.clone(), e.to_string()))?;
        Ok(parsed.records)
    }

    fn request_url(&self, joined_ids: &str) -> Result<Url, IdConvError> {
        let mut url = Url::parse(&self.base_url).map_err(|_| IdConvError::InvalidEndpoint {
            url: self.base_url.clone(),
        })?;
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("ids", joined_ids);
            query.append_pair("format", "json");
            if let Some(tool) = &self.tool {
                query.append_pair("tool", tool);
            }
            if let Some(email) = &self.email {
                query.append_pair("email", email);
            }
        }
        Ok(url)
    }
}

impl std::fmt::Debug for IdResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdResolver")
            .field("base_url", &self.base_url)
            .field("tool", &self.tool)
            .finish_non_exhaustive()
    }
}

/// Picks the batch key for a record: DOI, then PMID, then PMCID.
///
/// A value matching one of the requested identifiers wins; otherwise the first
/// present value in precedence order is used.
fn batch_key(result: &IdConversionResult, requested: &[String]) -> Option<String> {
    let present: Vec<&str> = [result.doi(), result.pmid(), result.pmcid()]
        .into_iter()
        .flatten()
        .collect();
    present
        .iter()
        .copied()
        .find(|value| requested.iter().any(|r| r.eq_ignore_ascii_case(value)))
        .or_else(|| present.first().copied())
        .map(ToString::to_string)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn result(pmcid: Option<&str>, pmid: Option<&str>, doi: Option<&str>) -> IdConversionResult {
        IdConversionResult::new(
            pmcid.map(String::from),
            pmid.map(String::from),
            doi.map(String::from),
        )
        .unwrap()
    }

    #[test]
    fn test_record_decodes_numeric_pmid() {
        let json = r#"{"records":[{"pmcid":"PMC3531190","pmid":23193287,"doi":"10.1093/nar/gks1195","requested-id":"23193287"}]}"#;
        let parsed: IdConvResponse = serde_json::from_str(json).unwrap();
        let converted = parsed.records.into_iter().next().unwrap().into_result().unwrap();
        assert_eq!(converted.pmid(), Some("23193287"));
        assert_eq!(converted.pmcid(), Some("PMC3531190"));
    }

    #[test]
    fn test_error_record_is_absent() {
        let json = r#"{"records":[{"requested-id":"10.1/nope","status":"error","errmsg":"invalid article id"}]}"#;
        let parsed: IdConvResponse = serde_json::from_str(json).unwrap();
        assert!(parsed.records.into_iter().next().unwrap().into_result().is_none());
    }

    #[test]
    fn test_batch_key_prefers_doi_then_pmid_then_pmcid() {
        let full = result(Some("PMC1"), Some("11"), Some("10.1/x"));
        assert_eq!(batch_key(&full, &[]).unwrap(), "10.1/x");

        let no_doi = result(Some("PMC1"), Some("11"), None);
        assert_eq!(batch_key(&no_doi, &[]).unwrap(), "11");

        let only_pmcid = result(Some("PMC1"), None, None);
        assert_eq!(batch_key(&only_pmcid, &[]).unwrap(), "PMC1");
    }

    #[test]
    fn test_batch_key_matches_requested_identifier() {
        let full = result(Some("PMC1"), Some("11"), Some("10.1/X"));
        let requested = vec!["11".to_string()];
        assert_eq!(batch_key(&full, &requested).unwrap(), "11");

        let requested = vec!["10.1/x".to_string()];
        assert_eq!(batch_key(&full, &requested).unwrap(), "10.1/X");
    }

    #[test]
    fn test_request_url_joins_ids_and_identity() {
        let resolver = IdResolver::with_base_url("https://example.org/idconv/", HttpSettings::default())
            .unwrap()
            .with_identity(Some("fulltext".into()), Some("me@example.org".into()));
        let url = resolver.request_url("10.1/a,123").unwrap();
        let pairs: HashMap<String, String> = url.query_pairs().into_owned().collect();
        assert_eq!(pairs["ids"], "10.1/a,123");
        assert_eq!(pairs["format"], "json");
        assert_eq!(pairs["tool"], "fulltext");
        assert_eq!(pairs["email"], "me@example.org");
    }

    #[test]
    fn test_invalid_endpoint() {
        let resolver = IdResolver::with_base_url("not a url", HttpSettings::default()).unwrap();
        assert!(matches!(
            resolver.request_url("1"),
            Err(IdConvError::InvalidEndpoint { .. })
        ));
    }
}
