//! Retrying HTTP download engine for full-text files.
//!
//! # Features
//!
//! - Streaming downloads (memory-efficient for large PDFs)
//! - Bounded retries with linear backoff and a pluggable [`Sleeper`]
//! - Fixed non-retryable status set; everything else non-2xx is retried
//! - `Content-Type` validation per [`ContentKind`], never retried on mismatch
//! - Parent directories created on demand; partial files removed on stream failure
//!
//! # Example
//!
//! ```no_run
//! use fulltext_core::HttpSettings;
//! use fulltext_core::download::{DownloadOptions, Downloader};
//! use std::path::Path;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let downloader = Downloader::new(HttpSettings::download())?;
//! let result = downloader
//!     .download(
//!         "https://arxiv.org/pdf/2401.12345.pdf",
//!         Path::new("./papers/smith2024/paper.pdf"),
//!         &DownloadOptions::default(),
//!     )
//!     .await;
//! if let Some(size) = result.size() {
//!     println!("Downloaded {size} bytes");
//! }
//! # Ok(())
//! # }
//! ```

mod content;
mod engine;
mod error;
mod retry;

pub use content::ContentKind;
pub use engine::{DownloadOptions, Downloader, Sleeper, TokioSleeper};
pub use error::DownloadError;
pub use retry::{
    DEFAULT_MAX_ATTEMPTS, DEFAULT_RETRY_DELAY, FailureType, NON_RETRYABLE_STATUSES,
    RetryDecision, RetryPolicy, classify_error,
};
