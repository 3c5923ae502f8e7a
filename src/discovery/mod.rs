//! Open-access location discovery.
//!
//! Each provider answers one question: "where can the full text of this
//! article be fetched?" Providers are independent; callers typically run all
//! of them and merge the results.
//!
//! # Architecture
//!
//! - [`DiscoveryProvider`] - Async trait every provider implements
//! - [`DiscoveryOptions`] - Explicit credentials (contact email, CORE key)
//! - [`ArxivProvider`] - Derives the arXiv PDF URL; no network
//! - [`PmcProvider`] - Derives PMC PDF/XML URLs, resolving PMIDs when needed
//! - [`UnpaywallProvider`] - Queries the Unpaywall OA aggregator by DOI
//! - [`CoreProvider`] - Queries the CORE repository aggregator by DOI
//!
//! # Example
//!
//! ```no_run
//! use fulltext_core::discovery::{DiscoveryOptions, build_default_providers};
//! use fulltext_core::ArticleIds;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let ids = ArticleIds::new().with_doi("10.1093/nar/gks1195");
//! let options = DiscoveryOptions::new().with_email("me@example.org");
//! for provider in build_default_providers() {
//!     if let Some(locations) = provider.check(&ids, &options).await? {
//!         println!("{}: {} location(s)", provider.name(), locations.len());
//!     }
//! }
//! # Ok(())
//! # }
//! ```

mod arxiv;
mod core_api;
mod error;
mod pmc;
mod unpaywall;
mod utils;

pub use arxiv::{ArxivProvider, check_arxiv};
pub use core_api::CoreProvider;
pub use error::DiscoveryError;
pub use pmc::{PmcProvider, PmcUrls, get_pmc_urls};
pub use unpaywall::{UnpaywallDetails, UnpaywallProvider};

pub(crate) use arxiv::normalize_arxiv_id;
pub(crate) use pmc::{EFETCH_BASE_URL, efetch_xml_url};
pub(crate) use utils::normalize_pmcid_digits;

use async_trait::async_trait;
use tracing::warn;

use crate::http_client::HttpSettings;
use crate::idconv::{IdResolver, NCBI_TOOL};
use crate::model::{ArticleIds, LocationSource, OaLocation};

/// Credentials and contact details passed to providers on every call.
///
/// Nothing is read from the environment; callers decide where values come from.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct DiscoveryOptions {
    /// Contact email (required by Unpaywall, sent to NCBI as courtesy).
    pub email: Option<String>,
    /// CORE API key; CORE is skipped without it.
    pub core_api_key: Option<String>,
}

impl DiscoveryOptions {
    /// Creates empty options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the contact email.
    #[must_use]
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Sets the CORE API key.
    #[must_use]
    pub fn with_core_api_key(mut self, key: impl Into<String>) -> Self {
        self.core_api_key = Some(key.into());
        self
    }

    /// Trimmed contact email, `None` when absent or blank.
    #[must_use]
    pub fn email(&self) -> Option<&str> {
        self.email.as_deref().map(str::trim).filter(|v| !v.is_empty())
    }

    /// Trimmed CORE API key, `None` when absent or blank.
    #[must_use]
    pub fn core_api_key(&self) -> Option<&str> {
        self.core_api_key
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty())
    }
}

impl std::fmt::Debug for DiscoveryOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiscoveryOptions")
            .field("email", &self.email)
            .field(
                "core_api_key",
                &self.core_api_key.as_ref().map(|_| "<redacted>"),
            )
            .finish()
    }
}

/// A source of open-access locations.
///
/// Implementations must be `Send + Sync` so a provider list can be shared
/// across tasks.
#[async_trait]
pub trait DiscoveryProvider: Send + Sync {
    /// Which [`LocationSource`] this provider reports.
    fn source(&self) -> LocationSource;

    /// Human-readable provider name for logging.
    fn name(&self) -> &'static str;

    /// Looks up open-access locations for the given identifiers.
    ///
    /// Returns `Ok(None)` when the provider has nothing (missing identifier,
    /// unknown record, not open access). `Ok(Some(v))` always has at least one
    /// location.
    ///
    /// # Errors
    ///
    /// Returns [`DiscoveryError`] when the provider could not be asked
    /// (configuration, rate limit, transport, unexpected status).
    async fn check(
        &self,
        ids: &ArticleIds,
        options: &DiscoveryOptions,
    ) -> Result<Option<Vec<OaLocation>>, DiscoveryError>;
}

/// Builds the provider list used by the CLI.
///
/// Order is deterministic: network-free providers first, then aggregators.
#[must_use]
pub fn build_default_providers() -> Vec<Box<dyn DiscoveryProvider>> {
    build_providers_with(HttpSettings::discovery(), None)
}

/// Builds the default provider list with explicit HTTP settings.
///
/// `ncbi_email` is sent with [`NCBI_TOOL`] on every ID Converter request the
/// PMC provider makes.
#[must_use]
pub fn build_providers_with(
    settings: HttpSettings,
    ncbi_email: Option<String>,
) -> Vec<Box<dyn DiscoveryProvider>> {
    let mut providers: Vec<Box<dyn DiscoveryProvider>> = vec![Box::new(ArxivProvider::new())];

    match IdResolver::new(settings) {
        Ok(resolver) => providers.push(Box::new(PmcProvider::with_resolver(
            resolver.with_identity(Some(NCBI_TOOL.to_string()), ncbi_email),
        ))),
        Err(error) => warn!(
            error = %error,
            "PMC provider unavailable; continuing with remaining providers"
        ),
    }

    match UnpaywallProvider::new(settings) {
        Ok(provider) => providers.push(Box::new(provider)),
        Err(error) => warn!(
            error = %error,
            "Unpaywall provider unavailable; continuing with remaining providers"
        ),
    }

    match CoreProvider::new(settings) {
        Ok(provider) => providers.push(Box::new(provider)),
        Err(error) => warn!(
            error = %error,
            "CORE provider unavailable; continuing with remaining providers"
        ),
    }

    providers
}
