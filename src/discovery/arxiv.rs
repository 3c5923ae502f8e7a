//! `arXiv` provider: every `arXiv` identifier has a predictable PDF URL.

use async_trait::async_trait;

use crate::model::{ArticleIds, LocationSource, ManuscriptVersion, OaLocation, UrlType};

use super::{DiscoveryError, DiscoveryOptions, DiscoveryProvider};

const ARXIV_PDF_BASE_URL: &str = "https://arxiv.org/pdf";

/// Derives the `arXiv` PDF location without any network access.
///
/// `arXiv` postings are preprints, so the location is always reported as
/// [`ManuscriptVersion::Submitted`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ArxivProvider;

impl ArxivProvider {
    /// Creates the provider.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl DiscoveryProvider for ArxivProvider {
    fn source(&self) -> LocationSource {
        LocationSource::Arxiv
    }

    fn name(&self) -> &'static str {
        "arxiv"
    }

    async fn check(
        &self,
        ids: &ArticleIds,
        _options: &DiscoveryOptions,
    ) -> Result<Option<Vec<OaLocation>>, DiscoveryError> {
        Ok(check_arxiv(ids.arxiv_id()))
    }
}

/// Returns the PDF location for an `arXiv` identifier.
///
/// A case-insensitive `arXiv:` prefix is stripped. Blank or absent identifiers
/// yield `None`.
#[must_use]
pub fn check_arxiv(arxiv_id: Option<&str>) -> Option<Vec<OaLocation>> {
    let id = normalize_arxiv_id(arxiv_id?)?;
    let url = format!("{ARXIV_PDF_BASE_URL}/{id}.pdf");
    OaLocation::new(
        LocationSource::Arxiv,
        &url,
        UrlType::Pdf,
        ManuscriptVersion::Submitted,
    )
    .map(|location| vec![location])
}

/// Strips whitespace and an optional `arXiv:` prefix.
pub(crate) fn normalize_arxiv_id(raw: &str) -> Option<&str> {
    let trimmed = raw.trim();
    let id = match trimmed.get(..6) {
        Some(prefix) if prefix.eq_ignore_ascii_case("arxiv:") => trimmed[6..].trim_start(),
        _ => trimmed,
    };
    if id.is_empty() { None } else { Some(id) }
}
