//! Error types for identifier conversion.

use thiserror::Error;

/// Errors surfaced by the NCBI ID Converter client.
///
/// "Not found" is never an error: unresolvable identifiers come back as
/// `None` or are omitted from batch results.
#[derive(Debug, Error)]
pub enum IdConvError {
    /// Network-level failure (DNS, connection reset, timeout).
    #[error("network error converting ids '{ids}': {source}")]
    Network {
        /// The comma-joined identifiers requested.
        ids: String,
        /// The underlying transport error.
        #[source]
        source: reqwest::Error,
    },

    /// Non-2xx status other than 404.
    #[error("ID converter returned HTTP {status} for ids '{ids}'")]
    HttpStatus {
        /// The comma-joined identifiers requested.
        ids: String,
        /// The HTTP status code.
        status: u16,
    },

    /// The response body was not the expected JSON document.
    #[error("ID converter response for ids '{ids}' could not be decoded: {message}")]
    Decode {
        /// The comma-joined identifiers requested.
        ids: String,
        /// Decoder message.
        message: String,
    },

    /// The base URL could not be turned into a request URL.
    #[error("invalid ID converter endpoint '{url}'")]
    InvalidEndpoint {
        /// The configured base URL.
        url: String,
    },

    /// HTTP client construction failed.
    #[error("ID converter HTTP client could not be built: {source}")]
    ClientBuild {
        /// The underlying builder error.
        #[source]
        source: reqwest::Error,
    },
}

impl IdConvError {
    /// Creates a network error.
    pub fn network(ids: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Network {
            ids: ids.into(),
            source,
        }
    }

    /// Creates an HTTP status error.
    pub fn http_status(ids: impl Into<String>, status: u16) -> Self {
        Self::HttpStatus {
            ids: ids.into(),
            status,
        }
    }

    /// Creates a decode error.
    pub fn decode(ids: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Decode {
            ids: ids.into(),
            message: message.into(),
        }
    }

    /// Returns the HTTP status carried by this error, if any.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::HttpStatus { status, .. } => Some(*status),
            _ => None,
        }
    }
}
