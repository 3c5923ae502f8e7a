//! The uniform outcome of every download operation.

use serde::Serialize;

/// Outcome of a download: either a byte count or an error message, never both.
///
/// The fields are private so the "size iff success, error iff failure"
/// pairing cannot be broken by a caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DownloadResult {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    size: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl DownloadResult {
    /// A successful download of `size` bytes.
    #[must_use]
    pub fn succeeded(size: u64) -> Self {
        Self {
            success: true,
            size: Some(size),
            error: None,
        }
    }

    /// A failed download.
    #[must_use]
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            size: None,
            error: Some(error.into()),
        }
    }

    /// Whether the file was written.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.success
    }

    /// Exact number of bytes written; `Some` iff [`is_success`](Self::is_success).
    #[must_use]
    pub fn size(&self) -> Option<u64> {
        self.size
    }

    /// Error message of the last attempt; `Some` iff the download failed.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}
