//! Full-text discovery and retrieval for scholarly articles.
//!
//! Given an article's identifiers (DOI, PMID, PMCID, arXiv ID), this library
//! asks several open-access sources where the full text lives, normalizes
//! their answers into one [`OaLocation`] model, cross-resolves identifiers and
//! downloads the chosen file with bounded retries.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//! - [`model`] - Shared data model (`OaLocation`, `ArticleIds`, `DownloadResult`, ...)
//! - [`idconv`] - DOI ⇄ PMID ⇄ PMCID resolution via the NCBI ID Converter
//! - [`discovery`] - Open-access providers (arXiv, PMC, Unpaywall, CORE)
//! - [`download`] - Retrying download engine with content-type validation
//! - [`citekey`] - Deterministic citation-key generation
//!
//! Nothing here reads environment variables or config files; credentials and
//! timeouts are passed explicitly.

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod citekey;
pub mod discovery;
pub mod download;
mod http_client;
pub mod idconv;
pub mod model;

#[cfg(test)]
pub(crate) mod test_support;

// Re-export commonly used types
pub use citekey::{generate_key, suffix_for};
pub use discovery::{
    ArxivProvider, CoreProvider, DiscoveryError, DiscoveryOptions, DiscoveryProvider,
    PmcProvider, UnpaywallProvider, build_default_providers, build_providers_with, check_arxiv,
    get_pmc_urls,
};
pub use download::{ContentKind, DownloadError, DownloadOptions, Downloader};
pub use http_client::HttpSettings;
pub use idconv::{IdConvError, IdResolver};
pub use model::{
    ArticleIds, DownloadResult, FileInfo, FulltextMeta, IdConversionResult, LocationSource,
    ManuscriptVersion, OaLocation, OaStatus, UrlType,
};
