//! Storage-boundary shapes read and written by callers persisting `meta.json`.
//!
//! The core never touches the file itself; it only produces these values so a
//! storage layer can stay decoupled from provider internals.

use serde::{Deserialize, Serialize};

use super::location::{LocationSource, OaLocation, UrlType};

/// Open-access status derived from a discovery sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OaStatus {
    /// At least one location was discovered.
    Open,
    /// Providers were checked and none reported a location.
    Closed,
    /// Nothing has been checked yet.
    #[default]
    Unknown,
}

/// A file a caller stored after a successful download.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileInfo {
    /// File name relative to the article directory.
    pub filename: String,
    /// Content kind of the stored file.
    pub url_type: UrlType,
    /// Exact size in bytes.
    pub size: u64,
    /// Provider whose location was downloaded.
    pub source: LocationSource,
    /// URL the bytes came from.
    pub url: String,
}

impl FileInfo {
    /// Describes a downloaded location.
    #[must_use]
    pub fn from_location(location: &OaLocation, filename: impl Into<String>, size: u64) -> Self {
        Self {
            filename: filename.into(),
            url_type: location.url_type(),
            size,
            source: location.source(),
            url: location.url().to_string(),
        }
    }
}

/// Full-text section of an article's `meta.json`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FulltextMeta {
    /// Derived open-access status.
    pub oa_status: OaStatus,
    /// Every location reported by the providers, in sweep order.
    #[serde(default)]
    pub locations: Vec<OaLocation>,
    /// Files retrieved so far.
    #[serde(default)]
    pub files: Vec<FileInfo>,
    /// Providers that answered (found or not found).
    #[serde(default)]
    pub checked_sources: Vec<LocationSource>,
}

impl FulltextMeta {
    /// Builds metadata from a completed sweep.
    #[must_use]
    pub fn from_locations(locations: Vec<OaLocation>, checked: &[LocationSource]) -> Self {
        let mut meta = Self {
            locations,
            ..Self::default()
        };
        for source in checked {
            meta.record_checked(*source);
        }
        meta.refresh_status();
        meta
    }

    /// Marks a provider as checked. Idempotent.
    pub fn record_checked(&mut self, source: LocationSource) {
        if !self.checked_sources.contains(&source) {
            self.checked_sources.push(source);
        }
        self.refresh_status();
    }

    /// Records a downloaded file, replacing an earlier entry with the same file name.
    pub fn record_file(&mut self, file: FileInfo) {
        self.files.retain(|existing| existing.filename != file.filename);
        self.files.push(file);
    }

    fn refresh_status(&mut self) {
        self.oa_status = if !self.locations.is_empty() {
            OaStatus::Open
        } else if self.checked_sources.is_empty() {
            OaStatus::Unknown
        } else {
            OaStatus::Closed
        };
    }
}
