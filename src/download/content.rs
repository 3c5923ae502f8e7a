//! Expected content kinds and their `Content-Type` allowlists.

use std::fmt;

use serde::{Deserialize, Serialize};

/// What the caller expects a download to contain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    /// PDF documents (servers often label these `application/octet-stream`).
    #[default]
    Pdf,
    /// JATS or other XML.
    Xml,
    /// HTML renderings.
    Html,
}

impl ContentKind {
    /// Media types accepted for this kind, compared by essence.
    #[must_use]
    pub fn allowed_media_types(self) -> &'static [&'static str] {
        match self {
            Self::Pdf => &["application/pdf", "application/octet-stream"],
            Self::Xml => &["text/xml", "application/xml"],
            Self::Html => &["text/html"],
        }
    }

    /// Checks a raw `Content-Type` header value against the allowlist.
    ///
    /// Parameters (`; charset=…`) are ignored and comparison is
    /// case-insensitive. A missing header never matches.
    #[must_use]
    pub fn accepts(self, content_type: Option<&str>) -> bool {
        let Some(essence) = content_type.map(media_type_essence) else {
            return false;
        };
        self.allowed_media_types()
            .iter()
            .any(|allowed| allowed.eq_ignore_ascii_case(essence))
    }

    /// Returns the stable lowercase label.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Xml => "xml",
            Self::Html => "html",
        }
    }
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Strips parameters and whitespace from a media type.
fn media_type_essence(content_type: &str) -> &str {
    content_type
        .split(';')
        .next()
        .unwrap_or(content_type)
        .trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pdf_allowlist() {
        assert!(ContentKind::Pdf.accepts(Some("application/pdf")));
        assert!(ContentKind::Pdf.accepts(Some("application/octet-stream")));
        assert!(ContentKind::Pdf.accepts(Some("Application/PDF")));
        assert!(!ContentKind::Pdf.accepts(Some("text/html")));
    }

    #[test]
    fn test_xml_allowlist() {
        assert!(ContentKind::Xml.accepts(Some("text/xml; charset=UTF-8")));
        assert!(ContentKind::Xml.accepts(Some("application/xml")));
        assert!(!ContentKind::Xml.accepts(Some("application/pdf")));
    }

    #[test]
    fn test_html_is_exactly_text_html() {
        assert!(ContentKind::Html.accepts(Some("text/html")));
        assert!(ContentKind::Html.accepts(Some("text/html;charset=utf-8")));
        assert!(!ContentKind::Html.accepts(Some("application/xhtml+xml")));
        assert!(!ContentKind::Html.accepts(Some("text/htmlx")));
    }

    #[test]
    fn test_missing_or_empty_header_is_rejected() {
        for kind in [ContentKind::Pdf, ContentKind::Xml, ContentKind::Html] {
            assert!(!kind.accepts(None));
            assert!(!kind.accepts(Some("")));
        }
    }
}
