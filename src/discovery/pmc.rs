//! PubMed Central provider.
//!
//! PMC URLs are a pure function of the PMCID. When only a PMID is known the
//! provider first asks the NCBI ID Converter for the matching PMCID.

use async_trait::async_trait;
use tracing::{debug, instrument};

use crate::http_client::HttpSettings;
use crate::idconv::IdResolver;
use crate::model::{
    ArticleIds, LocationSource, ManuscriptVersion, OaLocation, UrlType, non_empty,
};

use super::utils::normalize_pmcid_digits;
use super::{DiscoveryError, DiscoveryOptions, DiscoveryProvider};

const PMC_ARTICLES_BASE_URL: &str = "https://www.ncbi.nlm.nih.gov/pmc/articles";
pub(crate) const EFETCH_BASE_URL: &str =
    "https://eutils.ncbi.nlm.nih.gov/entrez/eutils/efetch.fcgi";

/// The two full-text URLs PMC serves for every article.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PmcUrls {
    /// Canonical `PMC`-prefixed identifier.
    pub pmcid: String,
    /// Article PDF (`…/pmc/articles/PMC{n}/pdf/`).
    pub pdf: String,
    /// JATS XML via E-utilities `efetch`.
    pub xml: String,
}

impl PmcUrls {
    /// Converts the URLs into published-version locations, PDF first.
    #[must_use]
    pub fn to_locations(&self) -> Vec<OaLocation> {
        [(&self.pdf, UrlType::Pdf), (&self.xml, UrlType::Xml)]
            .into_iter()
            .filter_map(|(url, url_type)| {
                OaLocation::new(
                    LocationSource::Pmc,
                    url,
                    url_type,
                    ManuscriptVersion::Published,
                )
            })
            .collect()
    }
}

/// Builds the PMC PDF and XML URLs for a PMCID.
///
/// Accepts the identifier with or without the `PMC` prefix (any case).
/// Returns `None` when the remainder is not a number.
#[must_use]
pub fn get_pmc_urls(pmcid: &str) -> Option<PmcUrls> {
    let digits = normalize_pmcid_digits(pmcid)?;
    Some(PmcUrls {
        pmcid: format!("PMC{digits}"),
        pdf: format!("{PMC_ARTICLES_BASE_URL}/PMC{digits}/pdf/"),
        xml: efetch_xml_url(EFETCH_BASE_URL, digits),
    })
}

/// E-utilities `efetch` URL returning the JATS XML of a PMC article.
pub(crate) fn efetch_xml_url(base_url: &str, digits: &str) -> String {
    format!(
        "{}?db=pmc&id={digits}&rettype=xml",
        base_url.trim_end_matches('?')
    )
}

/// Finds PMC full text by PMCID, or by PMID through the ID Converter.
#[derive(Debug, Clone)]
pub struct PmcProvider {
    resolver: IdResolver,
}

impl PmcProvider {
    /// Creates a provider backed by the public ID Converter.
    ///
    /// # Errors
    ///
    /// Returns [`DiscoveryError::IdConversion`] when the HTTP client cannot be built.
    pub fn new(settings: HttpSettings) -> Result<Self, DiscoveryError> {
        Ok(Self::with_resolver(IdResolver::new(settings)?))
    }

    /// Creates a provider with a caller-supplied resolver (custom endpoint or identity).
    #[must_use]
    pub fn with_resolver(resolver: IdResolver) -> Self {
        Self { resolver }
    }
}

#[async_trait]
impl DiscoveryProvider for PmcProvider {
    fn source(&self) -> LocationSource {
        LocationSource::Pmc
    }

    fn name(&self) -> &'static str {
        "pmc"
    }

    #[instrument(skip(self, ids, _options), fields(provider = "pmc", pmcid = ?ids.pmcid(), pmid = ?ids.pmid()))]
    async fn check(
        &self,
        ids: &ArticleIds,
        _options: &DiscoveryOptions,
    ) -> Result<Option<Vec<OaLocation>>, DiscoveryError> {
        if let Some(pmcid) = ids.pmcid() {
            match get_pmc_urls(pmcid) {
                Some(urls) => return Ok(non_empty(urls.to_locations())),
                None => debug!(pmcid, "malformed PMCID; trying PMID instead"),
            }
        }

        let Some(pmid) = ids.pmid() else {
            return Ok(None);
        };

        let Some(converted) = self.resolver.resolve_one(pmid).await? else {
            debug!(pmid, "PMID has no ID Converter record");
            return Ok(None);
        };
        let Some(pmcid) = converted.pmcid() else {
            debug!(pmid, "PMID is not deposited in PMC");
            return Ok(None);
        };

        debug!(pmid, pmcid, "resolved PMID to PMCID");
        Ok(get_pmc_urls(pmcid).and_then(|urls| non_empty(urls.to_locations())))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_get_pmc_urls_prefix_insensitive() {
        assert_eq!(get_pmc_urls("1234567"), get_pmc_urls("PMC1234567"));
        assert_eq!(get_pmc_urls("pmc1234567"), get_pmc_urls("PMC1234567"));
    }

    #[test]
    fn test_get_pmc_urls_shape() {
        let urls = get_pmc_urls("PMC1234567").unwrap();
        assert_eq!(urls.pmcid, "PMC1234567");
        assert_eq!(
            urls.pdf,
            "https://www.ncbi.nlm.nih.gov/pmc/articles/PMC1234567/pdf/"
        );
        assert_eq!(
            urls.xml,
            "https://eutils.ncbi.nlm.nih.gov/entrez/eutils/efetch.fcgi?db=pmc&id=1234567&rettype=xml"
        );
    }

    #[test]
    fn test_get_pmc_urls_rejects_non_numeric() {
        assert!(get_pmc_urls("PMC").is_none());
        assert!(get_pmc_urls("PMCxyz").is_none());
        assert!(get_pmc_urls("").is_none());
    }

    #[test]
    fn test_to_locations_pdf_then_xml() {
        let locations = get_pmc_urls("42").unwrap().to_locations();
        assert_eq!(locations.len(), 2);
        assert_eq!(locations[0].url_type(), UrlType::Pdf);
        assert_eq!(locations[1].url_type(), UrlType::Xml);
        assert!(
            locations
                .iter()
                .all(|l| l.version() == ManuscriptVersion::Published && l.source() == LocationSource::Pmc)
        );
    }

    #[tokio::test]
    async fn test_check_with_pmcid_needs_no_network() {
        // Unroutable endpoint: any request would fail the test.
        let resolver =
            IdResolver::with_base_url("http://127.0.0.1:9/idconv/", HttpSettings::default()).unwrap();
        let provider = PmcProvider::with_resolver(resolver);
        let ids = ArticleIds::new().with_pmcid("PMC99");
        let found = provider
            .check(&ids, &DiscoveryOptions::default())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.len(), 2);
    }

    #[tokio::test]
    async fn test_check_malformed_pmcid_without_pmid_is_none() {
        let resolver =
            IdResolver::with_base_url("http://127.0.0.1:9/idconv/", HttpSettings::default()).unwrap();
        let provider = PmcProvider::with_resolver(resolver);
        let found = provider
            .check(&ArticleIds::new().with_pmcid("PMCabc"), &DiscoveryOptions::default())
            .await
            .unwrap();
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn test_check_without_ids_is_none() {
        let provider = PmcProvider::new(HttpSettings::default()).unwrap();
        let found = provider
            .check(&ArticleIds::new().with_doi("10.1/x"), &DiscoveryOptions::default())
            .await
            .unwrap();
        assert!(found.is_none());
    }
}
