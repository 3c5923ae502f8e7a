//! Shared HTTP client construction policy.
//!
//! Discovery providers, the ID resolver and the download engine all build
//! their `reqwest` clients here so timeouts, user agent and compression stay
//! consistent across components.
//!
//! Every client identifies the tool with a versioned User-Agent carrying the
//! project URL (RFC 9308). The provider name never appears in the header.

use std::time::Duration;

use reqwest::Client;
use tracing::debug;

/// Project URL advertised in every User-Agent.
const PROJECT_UA_URL: &str = "https://github.com/fierce/fulltext";

/// Default connect timeout for discovery and ID-conversion requests.
pub const DISCOVERY_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Default overall timeout for discovery and ID-conversion requests.
pub const DISCOVERY_READ_TIMEOUT_SECS: u64 = 30;

/// Default connect timeout for file downloads.
pub const DOWNLOAD_CONNECT_TIMEOUT_SECS: u64 = 30;

/// Default overall timeout for file downloads (5 minutes for large PDFs).
pub const DOWNLOAD_READ_TIMEOUT_SECS: u64 = 300;

/// Timeout settings applied when building an HTTP client.
///
/// Passed explicitly to every constructor; the library never reads these from
/// the environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HttpSettings {
    /// TCP/TLS connect timeout.
    pub connect_timeout: Duration,
    /// Overall request timeout, including reading the body.
    pub read_timeout: Duration,
}

impl HttpSettings {
    /// Settings tuned for small JSON API calls.
    #[must_use]
    pub fn discovery() -> Self {
        Self {
            connect_timeout: Duration::from_secs(DISCOVERY_CONNECT_TIMEOUT_SECS),
            read_timeout: Duration::from_secs(DISCOVERY_READ_TIMEOUT_SECS),
        }
    }

    /// Settings tuned for streaming file bodies.
    #[must_use]
    pub fn download() -> Self {
        Self {
            connect_timeout: Duration::from_secs(DOWNLOAD_CONNECT_TIMEOUT_SECS),
            read_timeout: Duration::from_secs(DOWNLOAD_READ_TIMEOUT_SECS),
        }
    }

    /// Overrides both timeouts, keeping whichever argument is `None` at its current value.
    #[must_use]
    pub fn with_timeouts(mut self, connect_secs: Option<u64>, read_secs: Option<u64>) -> Self {
        if let Some(secs) = connect_secs {
            self.connect_timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = read_secs {
            self.read_timeout = Duration::from_secs(secs);
        }
        self
    }
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self::discovery()
    }
}

/// Which kind of traffic a client carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ClientRole {
    /// Provider APIs and the ID Converter.
    Discovery,
    /// Full-text file downloads.
    Download,
}

impl ClientRole {
    #[must_use]
    pub(crate) fn user_agent(self) -> String {
        let version = env!("CARGO_PKG_VERSION");
        match self {
            Self::Discovery => format!("fulltext/{version} (research-tool; +{PROJECT_UA_URL})"),
            Self::Download => {
                format!("fulltext/{version} (academic-research-tool; +{PROJECT_UA_URL})")
            }
        }
    }
}

/// Builds a client using the shared project policy.
///
/// `component` is only used for logging, never in the User-Agent header.
///
/// # Errors
///
/// Returns the underlying [`reqwest::Error`] when the TLS backend or builder
/// configuration cannot be initialized.
pub(crate) fn build_http_client(
    component: &str,
    role: ClientRole,
    settings: HttpSettings,
) -> Result<Client, reqwest::Error> {
    debug!(
        component,
        ?role,
        connect_ms = settings.connect_timeout.as_millis(),
        read_ms = settings.read_timeout.as_millis(),
        "building HTTP client"
    );
    Client::builder()
        .connect_timeout(settings.connect_timeout)
        .timeout(settings.read_timeout)
        .user_agent(role.user_agent())
        .gzip(true)
        .build()
}
