//! CORE provider - secondary aggregator of repository-hosted full text.
//!
//! Uses the CORE v3 search API with a bearer API key. CORE is optional: without
//! a key the provider quietly reports nothing and makes no request.

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::AUTHORIZATION;
use serde::Deserialize;
use tracing::{debug, instrument};
use url::Url;

use crate::http_client::{ClientRole, HttpSettings, build_http_client};
use crate::model::{ArticleIds, LocationSource, ManuscriptVersion, OaLocation, UrlType};

use super::utils::{StatusOutcome, check_status, read_json};
use super::{DiscoveryError, DiscoveryOptions, DiscoveryProvider};

const PROVIDER: &str = "core";

/// Default CORE API base URL.
const DEFAULT_BASE_URL: &str = "https://api.core.ac.uk";

// ==================== CORE API Response Types ====================

#[derive(Debug, Deserialize)]
struct CoreSearchResponse {
    #[serde(default)]
    results: Vec<CoreWork>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CoreWork {
    #[serde(default)]
    download_url: Option<String>,
    #[serde(default)]
    source_fulltext_urls: Option<Vec<String>>,
}

impl CoreWork {
    /// CORE's own download URL wins; otherwise the first repository URL.
    fn to_location(&self) -> Option<OaLocation> {
        let hosted = self.download_url.as_deref().and_then(|url| {
            OaLocation::new(LocationSource::Core, url, UrlType::Pdf, ManuscriptVersion::Accepted)
        });
        hosted.or_else(|| {
            self.source_fulltext_urls
                .as_deref()
                .and_then(<[String]>::first)
                .and_then(|url| {
                    OaLocation::new(
                        LocationSource::Core,
                        url,
                        UrlType::Repository,
                        ManuscriptVersion::Accepted,
                    )
                })
        })
    }
}

// ==================== CoreProvider ====================

/// Looks up repository copies of a DOI through the CORE search API.
#[derive(Clone)]
pub struct CoreProvider {
    client: Client,
    base_url: String,
}

impl CoreProvider {
    /// Creates a provider against the public CORE API.
    ///
    /// # Errors
    ///
    /// Returns [`DiscoveryError::ClientBuild`] when HTTP client construction fails.
    pub fn new(settings: HttpSettings) -> Result<Self, DiscoveryError> {
        Self::with_base_url(DEFAULT_BASE_URL, settings)
    }

    /// Creates a provider against a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`DiscoveryError::ClientBuild`] when HTTP client construction fails.
    pub fn with_base_url(
        base_url: impl Into<String>,
        settings: HttpSettings,
    ) -> Result<Self, DiscoveryError> {
        let client = build_http_client(
            PROVIDER,
            ClientRole::Discovery,
            settings,
        )
        .map_err(|source| DiscoveryError::ClientBuild {
            provider: PROVIDER,
            source,
        })?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn search_url(&self, doi: &str) -> Result<Url, DiscoveryError> {
        let endpoint = format!("{}/v3/search/works", self.base_url);
        let mut url = Url::parse(&endpoint)
            .map_err(|e| DiscoveryError::decode(PROVIDER, format!("invalid endpoint '{endpoint}': {e}")))?;
        url.query_pairs_mut()
            .append_pair("q", &format!("doi:\"{doi}\""))
            .append_pair("limit", "1");
        Ok(url)
    }
}

impl std::fmt::Debug for CoreProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CoreProvider")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl DiscoveryProvider for CoreProvider {
    fn source(&self) -> LocationSource {
        LocationSource::Core
    }

    fn name(&self) -> &'static str {
        PROVIDER
    }

    #[instrument(skip(self, ids, options), fields(provider = PROVIDER, doi = ?ids.doi()))]
    async fn check(
        &self,
        ids: &ArticleIds,
        options: &DiscoveryOptions,
    ) -> Result<Option<Vec<OaLocation>>, DiscoveryError> {
        let Some(doi) = ids.doi() else {
            return Ok(None);
        };
        let Some(api_key) = options.core_api_key() else {
            debug!("No CORE API key configured; skipping");
            return Ok(None);
        };

        let url = self.search_url(doi)?;
        debug!(api_url = %url, "Calling CORE API");

        let response = self
            .client
            .get(url.clone())
            .header(AUTHORIZATION, format!("Bearer {api_key}"))
            .send()
            .await
            .map_err(|e| DiscoveryError::network(PROVIDER, e))?;

        match check_status(PROVIDER, url.as_str(), &response)? {
            StatusOutcome::NotFound => Ok(None),
            StatusOutcome::Success => {
                let body: CoreSearchResponse = read_json(PROVIDER, response).await?;
                let location = body.results.first().and_then(CoreWork::to_location);
                if location.is_none() {
                    debug!(doi, "CORE has no full text for DOI");
                }
                Ok(location.map(|location| vec![location]))
            }
        }
    }
}
