//! The normalized open-access location model shared by every provider.

use std::fmt;

use serde::{Deserialize, Serialize};
use url::Url;

/// Where a location was discovered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LocationSource {
    /// Unpaywall OA aggregator.
    Unpaywall,
    /// PubMed Central.
    Pmc,
    /// arXiv preprint server.
    Arxiv,
    /// CORE repository aggregator.
    Core,
    /// Publisher site.
    Publisher,
}

impl LocationSource {
    /// Returns the stable lowercase label.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Unpaywall => "unpaywall",
            Self::Pmc => "pmc",
            Self::Arxiv => "arxiv",
            Self::Core => "core",
            Self::Publisher => "publisher",
        }
    }
}

impl fmt::Display for LocationSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Content kind served at a location URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UrlType {
    /// Direct PDF file.
    Pdf,
    /// Structured XML (JATS).
    Xml,
    /// HTML page (rendering or landing page).
    Html,
    /// Repository record whose exact content kind is unknown.
    Repository,
}

impl UrlType {
    /// Returns the stable lowercase label.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Xml => "xml",
            Self::Html => "html",
            Self::Repository => "repository",
        }
    }
}

impl fmt::Display for UrlType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Manuscript version available at a location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ManuscriptVersion {
    /// Version of record.
    #[default]
    Published,
    /// Accepted author manuscript.
    Accepted,
    /// Submitted preprint.
    Submitted,
}

impl ManuscriptVersion {
    /// Returns the stable lowercase label.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Published => "published",
            Self::Accepted => "accepted",
            Self::Submitted => "submitted",
        }
    }
}

impl fmt::Display for ManuscriptVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One retrievable copy of an article's full text.
///
/// Only constructible through [`OaLocation::new`], which guarantees the URL is
/// a syntactically valid absolute URL. Deserialization goes through the same
/// check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "RawOaLocation")]
pub struct OaLocation {
    source: LocationSource,
    url: String,
    url_type: UrlType,
    version: ManuscriptVersion,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    license: Option<String>,
}

impl OaLocation {
    /// Creates a location, returning `None` when `url` is not an absolute URL with a host.
    #[must_use]
    pub fn new(
        source: LocationSource,
        url: &str,
        url_type: UrlType,
        version: ManuscriptVersion,
    ) -> Option<Self> {
        let url = url.trim();
        let parsed = Url::parse(url).ok()?;
        parsed.host_str()?;
        Some(Self {
            source,
            url: url.to_string(),
            url_type,
            version,
            license: None,
        })
    }

    /// Attaches a license identifier; blank values are ignored.
    #[must_use]
    pub fn with_license(mut self, license: Option<&str>) -> Self {
        self.license = license
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(ToString::to_string);
        self
    }

    /// Provider that discovered this location.
    #[must_use]
    pub fn source(&self) -> LocationSource {
        self.source
    }

    /// Absolute URL of the content.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Content kind at [`url`](Self::url).
    #[must_use]
    pub fn url_type(&self) -> UrlType {
        self.url_type
    }

    /// Manuscript version.
    #[must_use]
    pub fn version(&self) -> ManuscriptVersion {
        self.version
    }

    /// License identifier, when the provider supplied one.
    #[must_use]
    pub fn license(&self) -> Option<&str> {
        self.license.as_deref()
    }
}

/// Wire shape of [`OaLocation`] before URL validation.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawOaLocation {
    source: LocationSource,
    url: String,
    url_type: UrlType,
    #[serde(default)]
    version: ManuscriptVersion,
    #[serde(default)]
    license: Option<String>,
}

impl TryFrom<RawOaLocation> for OaLocation {
    type Error = String;

    fn try_from(raw: RawOaLocation) -> Result<Self, Self::Error> {
        Self::new(raw.source, &raw.url, raw.url_type, raw.version)
            .map(|location| location.with_license(raw.license.as_deref()))
            .ok_or_else(|| format!("invalid location URL '{}': expected an absolute URL", raw.url))
    }
}

/// Normalizes a provider result: empty lists become "not found".
#[must_use]
pub fn non_empty(locations: Vec<OaLocation>) -> Option<Vec<OaLocation>> {
    if locations.is_empty() {
        None
    } else {
        Some(locations)
    }
}
