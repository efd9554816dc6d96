//! Client configuration.

use std::time::Duration;

use etuition_core::ApiUrl;

/// Default transport timeout for a single request.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Settings fixed when a client is built.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Origin (and optional path prefix) every request resolves against.
    pub base_url: ApiUrl,
    /// Transport timeout; an expired request is a network error.
    pub timeout: Duration,
    /// `User-Agent` header value.
    pub user_agent: String,
}

impl ClientConfig {
    /// Configuration with default timeout and user agent.
    pub fn new(base_url: ApiUrl) -> Self {
        Self {
            base_url,
            timeout: DEFAULT_TIMEOUT,
            user_agent: concat!("etuition/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}
