//! Unpaywall provider - the primary open-access aggregator.
//!
//! Queries `https://api.unpaywall.org/v2/{doi}?email=…` and maps every entry of
//! `oa_locations` into an [`OaLocation`]. Unpaywall requires a contact email on
//! every request; without one the provider fails before touching the network.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::http_client::{ClientRole, HttpSettings, build_http_client};
use crate::model::{
    ArticleIds, LocationSource, ManuscriptVersion, OaLocation, UrlType, non_empty,
};

use super::utils::{StatusOutcome, check_status, extract_pmcid_from_url, read_json};
use super::{DiscoveryError, DiscoveryOptions, DiscoveryProvider};

const PROVIDER: &str = "unpaywall";

/// Default Unpaywall API base URL.
const DEFAULT_BASE_URL: &str = "https://api.unpaywall.org";

// ==================== Unpaywall API Response Types ====================

#[derive(Debug, Deserialize)]
struct UnpaywallResponse {
    #[serde(default)]
    oa_locations: Option<Vec<UnpaywallLocation>>,
}

#[derive(Debug, Deserialize)]
struct UnpaywallLocation {
    #[serde(default)]
    url_for_pdf: Option<String>,
    #[serde(default)]
    url_for_landing_page: Option<String>,
    #[serde(default)]
    version: Option<String>,
    #[serde(default)]
    license: Option<String>,
}

impl UnpaywallLocation {
    fn to_location(&self) -> Option<OaLocation> {
        let version = map_version(self.version.as_deref());
        let pdf = self
            .url_for_pdf
            .as_deref()
            .and_then(|url| OaLocation::new(LocationSource::Unpaywall, url, UrlType::Pdf, version));
        pdf.or_else(|| {
            self.url_for_landing_page.as_deref().and_then(|url| {
                OaLocation::new(LocationSource::Unpaywall, url, UrlType::Html, version)
            })
        })
        .map(|location| location.with_license(self.license.as_deref()))
    }
}

/// Maps Unpaywall's version vocabulary; anything unrecognized is the version of record.
fn map_version(raw: Option<&str>) -> ManuscriptVersion {
    match raw {
        Some("acceptedVersion") => ManuscriptVersion::Accepted,
        Some("submittedVersion") => ManuscriptVersion::Submitted,
        _ => ManuscriptVersion::Published,
    }
}

/// Locations plus any PMCID Unpaywall revealed through a PMC article URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnpaywallDetails {
    /// Every open-access location Unpaywall reported (never empty).
    pub locations: Vec<OaLocation>,
    /// `PMC`-prefixed identifier found in one of the location URLs.
    pub pmcid: Option<String>,
}

// ==================== UnpaywallProvider ====================

/// Looks up open-access copies of a DOI through Unpaywall.
#[derive(Clone)]
pub struct UnpaywallProvider {
    client: Client,
    base_url: String,
}

impl UnpaywallProvider {
    /// Creates a provider against the public Unpaywall API.
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

    /// Like [`DiscoveryProvider::check`], additionally reporting a PMCID
    /// embedded in any returned URL.
    ///
    /// # Errors
    ///
    /// Same as [`DiscoveryProvider::check`].
    #[instrument(skip(self, ids, options), fields(provider = PROVIDER, doi = ?ids.doi()))]
    pub async fn check_detailed(
        &self,
        ids: &ArticleIds,
        options: &DiscoveryOptions,
    ) -> Result<Option<UnpaywallDetails>, DiscoveryError> {
        let Some(doi) = ids.doi() else {
            return Ok(None);
        };
        let Some(email) = options.email() else {
            return Err(DiscoveryError::configuration(
                PROVIDER,
                "a contact email is required for every Unpaywall request",
                "Set contact_email in the config file or pass --email",
            ));
        };

        let Some(response) = self.fetch(doi, email).await? else {
            return Ok(None);
        };

        let locations: Vec<OaLocation> = response
            .oa_locations
            .unwrap_or_default()
            .iter()
            .filter_map(UnpaywallLocation::to_location)
            .collect();
        let Some(locations) = non_empty(locations) else {
            debug!(doi, "Unpaywall reports no open-access locations");
            return Ok(None);
        };

        let pmcid = locations
            .iter()
            .find_map(|location| extract_pmcid_from_url(location.url()));
        debug!(doi, count = locations.len(), pmcid = ?pmcid, "Unpaywall locations found");
        Ok(Some(UnpaywallDetails { locations, pmcid }))
    }

    async fn fetch(
        &self,
        doi: &str,
        email: &str,
    ) -> Result<Option<UnpaywallResponse>, DiscoveryError> {
        let url = format!(
            "{}/v2/{}?email={}",
            self.base_url,
            urlencoding::encode(doi),
            urlencoding::encode(email)
        );
        debug!(doi, "Calling Unpaywall API");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| DiscoveryError::network(PROVIDER, e))?;

        // The email is a query parameter; keep it out of error messages.
        let display_url = format!("{}/v2/{doi}", self.base_url);
        match check_status(PROVIDER, &display_url, &response)? {
            StatusOutcome::NotFound => {
                debug!(doi, "DOI not known to Unpaywall");
                Ok(None)
            }
            StatusOutcome::Success => read_json(PROVIDER, response).await.map(Some),
        }
    }
}

impl std::fmt::Debug for UnpaywallProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UnpaywallProvider")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl DiscoveryProvider for UnpaywallProvider {
    fn source(&self) -> LocationSource {
        LocationSource::Unpaywall
    }

    fn name(&self) -> &'static str {
        PROVIDER
    }

    async fn check(
        &self,
        ids: &ArticleIds,
        options: &DiscoveryOptions,
    ) -> Result<Option<Vec<OaLocation>>, DiscoveryError> {
        Ok(self
            .check_detailed(ids, options)
            .await?
            .map(|details| details.locations))
    }
}
