//! The retrying download engine.
//!
//! One retry loop serves three call sites that differ only in how the URL is
//! built and which `Content-Type` values are acceptable:
//! [`Downloader::download`] (PDF), [`Downloader::download_pmc_xml`] and
//! [`Downloader::download_arxiv_html`].

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest::Client;
use reqwest::header::{CONTENT_TYPE, RETRY_AFTER};
use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::{debug, info, instrument, warn};
use url::Url;

use crate::discovery::{
    EFETCH_BASE_URL, efetch_xml_url, normalize_arxiv_id, normalize_pmcid_digits,
};
use crate::http_client::{ClientRole, HttpSettings, build_http_client};
use crate::model::DownloadResult;

use super::retry::{DEFAULT_MAX_ATTEMPTS, DEFAULT_RETRY_DELAY};
use super::{ContentKind, DownloadError, RetryDecision, RetryPolicy, classify_error};

/// Default arXiv HTML rendering base URL.
const ARXIV_HTML_BASE_URL: &str = "https://arxiv.org/html";

// ==================== Sleeper ====================

/// Waits between attempts.
///
/// The engine never calls `tokio::time::sleep` directly so tests can record
/// backoff delays without waiting for them.
#[async_trait]
pub trait Sleeper: Send + Sync {
    /// Suspends the current task for `duration`.
    async fn sleep(&self, duration: Duration);
}

/// [`Sleeper`] backed by the tokio timer.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

// ==================== Options ====================

/// Per-call retry settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DownloadOptions {
    /// Maximum number of attempts, including the first (values below 1 act as 1).
    pub retries: u32,
    /// Backoff base; the wait after attempt `n` is `retry_delay × n`.
    pub retry_delay: Duration,
}

impl Default for DownloadOptions {
    fn default() -> Self {
        Self {
            retries: DEFAULT_MAX_ATTEMPTS,
            retry_delay: DEFAULT_RETRY_DELAY,
        }
    }
}

impl DownloadOptions {
    fn policy(self) -> RetryPolicy {
        RetryPolicy::new(self.retries, self.retry_delay)
    }
}

// ==================== Downloader ====================

/// Fetches full-text files to disk with bounded retries.
///
/// Every public operation returns a [`DownloadResult`]; failures are never
/// surfaced as `Err`.
#[derive(Clone)]
pub struct Downloader {
    client: Client,
    sleeper: Arc<dyn Sleeper>,
    pmc_xml_base_url: String,
    arxiv_html_base_url: String,
}

impl Downloader {
    /// Creates a downloader with the fixed download user agent.
    ///
    /// # Errors
    ///
    /// Returns [`DownloadError::ClientBuild`] when HTTP client construction fails.
    pub fn new(settings: HttpSettings) -> Result<Self, DownloadError> {
        let client = build_http_client(
            "download",
            ClientRole::Download,
            settings,
        )
        .map_err(|source| DownloadError::ClientBuild { source })?;
        Ok(Self {
            client,
            sleeper: Arc::new(TokioSleeper),
            pmc_xml_base_url: EFETCH_BASE_URL.to_string(),
            arxiv_html_base_url: ARXIV_HTML_BASE_URL.to_string(),
        })
    }

    /// Replaces the backoff sleeper.
    #[must_use]
    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    /// Overrides the E-utilities `efetch` endpoint and the arXiv HTML base (for tests).
    #[must_use]
    pub fn with_base_urls(
        mut self,
        pmc_xml_base_url: impl Into<String>,
        arxiv_html_base_url: impl Into<String>,
    ) -> Self {
        self.pmc_xml_base_url = pmc_xml_base_url.into();
        self.arxiv_html_base_url = arxiv_html_base_url
            .into()
            .trim_end_matches('/')
            .to_string();
        self
    }

    /// Downloads a PDF (or generic binary) to `dest`.
    #[instrument(skip(self, dest, options), fields(dest = %dest.display()))]
    pub async fn download(
        &self,
        url: &str,
        dest: &Path,
        options: &DownloadOptions,
    ) -> DownloadResult {
        match self.fetch_with_retry(url, dest, ContentKind::Pdf, options).await {
            Ok(size) => DownloadResult::succeeded(size),
            Err(error) => {
                warn!(url, error = %error, "download failed");
                DownloadResult::failed(error.to_string())
            }
        }
    }

    /// Downloads the JATS XML of a PMC article via E-utilities `efetch`.
    ///
    /// `pmcid` may carry the `PMC` prefix or not.
    #[instrument(skip(self, dest, options), fields(dest = %dest.display()))]
    pub async fn download_pmc_xml(
        &self,
        pmcid: &str,
        dest: &Path,
        options: &DownloadOptions,
    ) -> DownloadResult {
        let Some(digits) = normalize_pmcid_digits(pmcid) else {
            return DownloadResult::failed(format!("invalid PMCID: '{pmcid}'"));
        };
        let url = efetch_xml_url(&self.pmc_xml_base_url, digits);

        match self.fetch_with_retry(&url, dest, ContentKind::Xml, options).await {
            Ok(size) => DownloadResult::succeeded(size),
            Err(error) => {
                warn!(pmcid, error = %error, "PMC XML download failed");
                DownloadResult::failed(error.to_string())
            }
        }
    }

    /// Downloads the arXiv HTML rendering of a paper.
    ///
    /// Many papers have no HTML rendering; a 404 is reported as a plain
    /// "not available" failure and only logged at debug level.
    #[instrument(skip(self, dest, options), fields(dest = %dest.display()))]
    pub async fn download_arxiv_html(
        &self,
        arxiv_id: &str,
        dest: &Path,
        options: &DownloadOptions,
    ) -> DownloadResult {
        let Some(id) = normalize_arxiv_id(arxiv_id) else {
            return DownloadResult::failed(format!("invalid arXiv ID: '{arxiv_id}'"));
        };
        let url = format!("{}/{id}", self.arxiv_html_base_url);

        match self.fetch_with_retry(&url, dest, ContentKind::Html, options).await {
            Ok(size) => DownloadResult::succeeded(size),
            Err(error) if error.status() == Some(404) => {
                debug!(arxiv_id = id, "no HTML rendering on arXiv");
                DownloadResult::failed(format!("HTML rendering not available for arXiv:{id}"))
            }
            Err(error) => {
                warn!(arxiv_id = id, error = %error, "arXiv HTML download failed");
                DownloadResult::failed(error.to_string())
            }
        }
    }

    /// Runs attempts until one succeeds or the policy gives up, returning the
    /// last error.
    async fn fetch_with_retry(
        &self,
        url: &str,
        dest: &Path,
        kind: ContentKind,
        options: &DownloadOptions,
    ) -> Result<u64, DownloadError> {
        let policy = options.policy();
        let mut attempt = 0u32;

        loop {
            attempt += 1;
            debug!(url, attempt, "attempting download");

            match self.attempt(url, dest, kind).await {
                Ok(size) => return Ok(size),
                Err(e) => match policy.should_retry(classify_error(&e), attempt) {
                    RetryDecision::Retry {
                        delay,
                        attempt: next_attempt,
                    } => {
                        info!(
                            url,
                            attempt = next_attempt,
                            max_attempts = policy.max_attempts(),
                            delay_ms = delay.as_millis(),
                            error = %e,
                            "retrying download"
                        );
                        self.sleeper.sleep(delay).await;
                    }
                    RetryDecision::DoNotRetry { reason } => {
                        debug!(url, %reason, "not retrying download");
                        return Err(e);
                    }
                },
            }
        }
    }

    /// One request: status check, content-type check, stream to `dest`.
    async fn attempt(
        &self,
        url: &str,
        dest: &Path,
        kind: ContentKind,
    ) -> Result<u64, DownloadError> {
        let parsed = Url::parse(url).map_err(|_| DownloadError::invalid_url(url))?;

        let response = self
            .client
            .get(parsed)
            .send()
            .await
            .map_err(|e| DownloadError::from_transport(url, e))?;

        let status = response.status();
        if !status.is_success() {
            let retry_after = response
                .headers()
                .get(RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .map(ToString::to_string);
            return Err(DownloadError::http_status_with_retry_after(
                url,
                status.as_u16(),
                retry_after,
            ));
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(ToString::to_string);
        if !kind.accepts(content_type.as_deref()) {
            return Err(DownloadError::content_type(url, kind, content_type));
        }

        if let Some(parent) = dest.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| DownloadError::io(parent, e))?;
        }

        let mut file = File::create(dest)
            .await
            .map_err(|e| DownloadError::io(dest, e))?;

        let stream_result = stream_to_file(&mut file, response, url, dest).await;
        if stream_result.is_err() {
            debug!(path = %dest.display(), "cleaning up partial file after error");
            drop(file);
            let _ = tokio::fs::remove_file(dest).await;
        }
        let bytes_written = stream_result?;

        info!(path = %dest.display(), bytes = bytes_written, "download complete");
        Ok(bytes_written)
    }
}

impl std::fmt::Debug for Downloader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Downloader")
            .field("pmc_xml_base_url", &self.pmc_xml_base_url)
            .field("arxiv_html_base_url", &self.arxiv_html_base_url)
            .finish_non_exhaustive()
    }
}

/// Streams response body to file, returning bytes written.
///
/// Kept separate so the caller can clean up on error.
async fn stream_to_file(
    file: &mut File,
    response: reqwest::Response,
    url: &str,
    file_path: &Path,
) -> Result<u64, DownloadError> {
    let mut writer = BufWriter::new(file);
    let mut stream = response.bytes_stream();
    let mut bytes_written: u64 = 0;

    while let Some(chunk_result) = stream.next().await {
        let chunk = chunk_result.map_err(|e| DownloadError::from_transport(url, e))?;

        writer
            .write_all(&chunk)
            .await
            .map_err(|e| DownloadError::io(file_path, e))?;

        bytes_written += chunk.len() as u64;
    }

    writer
        .flush()
        .await
        .map_err(|e| DownloadError::io(file_path, e))?;

    Ok(bytes_written)
}
