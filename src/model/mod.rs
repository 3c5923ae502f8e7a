//! Data model shared by providers, the ID resolver and callers.
//!
//! - [`OaLocation`] - one retrievable copy of an article's full text
//! - [`ArticleIds`] - identifiers a caller supplies to providers
//! - [`IdConversionResult`] - a partial DOI/PMID/PMCID cross-reference
//! - [`DownloadResult`] - the uniform download outcome
//! - [`FileInfo`] / [`FulltextMeta`] - storage-boundary shapes for `meta.json`

mod ids;
mod location;
mod meta;
mod result;

pub use ids::{ArticleIds, IdConversionResult};
pub use location::{LocationSource, ManuscriptVersion, OaLocation, UrlType, non_empty};
pub use meta::{FileInfo, FulltextMeta, OaStatus};
pub use result::DownloadResult;
