//! Article identifier bundles and identifier cross-reference results.

use serde::{Deserialize, Serialize};

/// Identifiers a caller knows about an article.
///
/// Blank strings are treated as absent by every accessor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleIds {
    /// Digital Object Identifier.
    pub doi: Option<String>,
    /// PubMed ID.
    pub pmid: Option<String>,
    /// PubMed Central ID, with or without the `PMC` prefix.
    pub pmcid: Option<String>,
    /// arXiv identifier, optionally prefixed with `arXiv:`.
    pub arxiv_id: Option<String>,
}

impl ArticleIds {
    /// Creates an empty identifier bundle.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the DOI.
    #[must_use]
    pub fn with_doi(mut self, doi: impl Into<String>) -> Self {
        self.doi = Some(doi.into());
        self
    }

    /// Sets the PMID.
    #[must_use]
    pub fn with_pmid(mut self, pmid: impl Into<String>) -> Self {
        self.pmid = Some(pmid.into());
        self
    }

    /// Sets the PMCID.
    #[must_use]
    pub fn with_pmcid(mut self, pmcid: impl Into<String>) -> Self {
        self.pmcid = Some(pmcid.into());
        self
    }

    /// Sets the arXiv ID.
    #[must_use]
    pub fn with_arxiv_id(mut self, arxiv_id: impl Into<String>) -> Self {
        self.arxiv_id = Some(arxiv_id.into());
        self
    }

    /// Trimmed DOI, if present and non-blank.
    #[must_use]
    pub fn doi(&self) -> Option<&str> {
        present(self.doi.as_deref())
    }

    /// Trimmed PMID, if present and non-blank.
    #[must_use]
    pub fn pmid(&self) -> Option<&str> {
        present(self.pmid.as_deref())
    }

    /// Trimmed PMCID, if present and non-blank.
    #[must_use]
    pub fn pmcid(&self) -> Option<&str> {
        present(self.pmcid.as_deref())
    }

    /// Trimmed arXiv ID, if present and non-blank.
    #[must_use]
    pub fn arxiv_id(&self) -> Option<&str> {
        present(self.arxiv_id.as_deref())
    }

    /// True when no identifier is usable.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.doi().is_none()
            && self.pmid().is_none()
            && self.pmcid().is_none()
            && self.arxiv_id().is_none()
    }
}

fn present(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// A partial identifier cross-reference.
///
/// At least one field is always populated; "nothing resolved" is expressed as
/// `None` by the functions that return this type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawIdConversionResult")]
pub struct IdConversionResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pmcid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pmid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    doi: Option<String>,
}

impl IdConversionResult {
    /// Builds a result, returning `None` if every identifier is absent or blank.
    #[must_use]
    pub fn new(pmcid: Option<String>, pmid: Option<String>, doi: Option<String>) -> Option<Self> {
        let clean = |value: Option<String>| {
            value
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let result = Self {
            pmcid: clean(pmcid),
            pmid: clean(pmid),
            doi: clean(doi),
        };
        if result.pmcid.is_none() && result.pmid.is_none() && result.doi.is_none() {
            None
        } else {
            Some(result)
        }
    }

    /// PubMed Central ID (with `PMC` prefix as returned by NCBI).
    #[must_use]
    pub fn pmcid(&self) -> Option<&str> {
        self.pmcid.as_deref()
    }

    /// PubMed ID.
    #[must_use]
    pub fn pmid(&self) -> Option<&str> {
        self.pmid.as_deref()
    }

    /// DOI.
    #[must_use]
    pub fn doi(&self) -> Option<&str> {
        self.doi.as_deref()
    }
}

#[derive(Deserialize)]
struct RawIdConversionResult {
    #[serde(default)]
    pmcid: Option<String>,
    #[serde(default)]
    pmid: Option<String>,
    #[serde(default)]
    doi: Option<String>,
}

impl TryFrom<RawIdConversionResult> for IdConversionResult {
    type Error = &'static str;

    fn try_from(raw: RawIdConversionResult) -> Result<Self, Self::Error> {
        Self::new(raw.pmcid, raw.pmid, raw.doi)
            .ok_or("identifier cross-reference needs at least one of pmcid, pmid, doi")
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_article_ids_treat_blank_as_absent() {
        let ids = ArticleIds::new().with_doi("  ").with_pmid(" 123 ");
        assert_eq!(ids.doi(), None);
        assert_eq!(ids.pmid(), Some("123"));
        assert!(!ids.is_empty());
        assert!(ArticleIds::new().with_arxiv_id("").is_empty());
    }

    #[test]
    fn test_id_conversion_result_never_all_absent() {
        assert!(IdConversionResult::new(None, None, None).is_none());
        assert!(IdConversionResult::new(Some(" ".into()), None, Some(String::new())).is_none());

        let result = IdConversionResult::new(Some("PMC1".into()), None, None).unwrap();
        assert_eq!(result.pmcid(), Some("PMC1"));
        assert_eq!(result.pmid(), None);
    }

    #[test]
    fn test_id_conversion_result_deserialize_requires_an_identifier() {
        assert!(serde_json::from_str::<IdConversionResult>("{}").is_err());
        assert!(serde_json::from_str::<IdConversionResult>(r#"{"doi":"  "}"#).is_err());

        let result: IdConversionResult =
            serde_json::from_str(r#"{"pmid":"23193287","doi":"10.1093/nar/gks1195"}"#).unwrap();
        assert_eq!(result.pmid(), Some("23193287"));
        assert_eq!(result.pmcid(), None);
    }
}
