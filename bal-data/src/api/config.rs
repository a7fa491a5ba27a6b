//! Configuration of [`HttpDataAccess`](super::HttpDataAccess).

use std::time::Duration;

/// Default user agent for API requests.
pub const DEFAULT_USER_AGENT: &str = "bal-editor/0.1";

/// Default base URL of the address-database API.
pub const DEFAULT_BASE_URL: &str = "https://api-bal.adresse.data.gouv.fr/v1";

/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Configuration for [`HttpDataAccess`](super::HttpDataAccess).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpDataAccessConfig {
    /// Base URL of the API, without trailing path segments such as
    /// `/bases-locales`.
    pub base_url: String,
    /// Request timeout duration.
    pub timeout: Duration,
    /// User agent string for requests.
    pub user_agent: String,
    /// Endpoint listing the published local address bases as `[{"_id": ..}]`.
    ///
    /// The address database does not flag publication itself; without this
    /// endpoint every base locale reads as unpublished.
    pub published_bases_url: Option<String>,
}

impl Default for HttpDataAccessConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_owned(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: DEFAULT_USER_AGENT.to_owned(),
            published_bases_url: None,
        }
    }
}

impl HttpDataAccessConfig {
    /// Create a new configuration with the given base URL.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    /// Set the request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the user agent string.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Set the endpoint listing published base locales.
    #[must_use]
    pub fn with_published_bases_url(mut self, url: impl Into<String>) -> Self {
        self.published_bases_url = Some(url.into());
        self
    }
}
