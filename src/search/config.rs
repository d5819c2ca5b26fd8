//! Search provider configuration.

use std::time::Duration;

use crate::error::ConfigError;

/// Default SerpAPI endpoint.
pub const DEFAULT_BASE_URL: &str = "https://serpapi.com";
/// Default number of results in a digest.
const DEFAULT_NUM_RESULTS: usize = 3;
/// Upper bound on results in a digest.
const MAX_NUM_RESULTS: usize = 20;
/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Configuration for the search adapter.
#[derive(Clone)]
pub struct SearchConfig {
    /// Provider API key.
    pub api_key: String,
    /// Base URL (overridable for proxies and tests).
    pub base_url: String,
    /// Search engine parameter passed to the provider.
    pub engine: String,
    /// Number of results included in a digest.
    pub num_results: usize,
    /// Request timeout.
    pub timeout: Duration,
}

impl SearchConfig {
    /// Creates a new builder.
    #[must_use]
    pub fn builder() -> SearchConfigBuilder {
        SearchConfigBuilder::default()
    }
}

impl std::fmt::Debug for SearchConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchConfig")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("engine", &self.engine)
            .field("num_results", &self.num_results)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Builder for [`SearchConfig`].
#[derive(Debug, Clone, Default)]
pub struct SearchConfigBuilder {
    api_key: Option<String>,
    base_url: Option<String>,
    engine: Option<String>,
    num_results: Option<usize>,
    timeout: Option<Duration>,
}

impl SearchConfigBuilder {
    /// Populates unset fields from environment variables.
    #[must_use]
    pub fn from_env(mut self) -> Self {
        if self.api_key.is_none() {
            self.api_key = std::env::var("SERPAPI_API_KEY").ok();
        }
        if self.base_url.is_none() {
            self.base_url = std::env::var("SERPAPI_BASE_URL").ok();
        }
        if self.engine.is_none() {
            self.engine = std::env::var("RA_SEARCH_ENGINE").ok();
        }
        if self.num_results.is_none() {
            self.num_results = std::env::var("RA_SEARCH_RESULTS")
                .ok()
                .and_then(|v| v.parse().ok());
        }
        self
    }

    /// Sets the API key.
    #[must_use]
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Sets the base URL.
    #[must_use]
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Sets the engine parameter.
    #[must_use]
    pub fn engine(mut self, engine: impl Into<String>) -> Self {
        self.engine = Some(engine.into());
        self
    }

    /// Sets the number of results in a digest.
    #[must_use]
    pub const fn num_results(mut self, n: usize) -> Self {
        self.num_results = Some(n);
        self
    }

    /// Sets the request timeout.
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Builds the [`SearchConfig`].
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingCredential`] if no API key was set and
    /// [`ConfigError::InvalidValue`] for a zero or oversized result count.
    pub fn build(self) -> Result<SearchConfig, ConfigError> {
        let api_key = self
            .api_key
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingCredential {
                key: "search-provider.api_key".to_string(),
                env_var: "SERPAPI_API_KEY".to_string(),
            })?;

        let num_results = self.num_results.unwrap_or(DEFAULT_NUM_RESULTS);
        if num_results == 0 || num_results > MAX_NUM_RESULTS {
            return Err(ConfigError::InvalidValue {
                name: "num_results".to_string(),
                value: num_results.to_string(),
            });
        }

        Ok(SearchConfig {
            api_key,
            base_url: self
                .base_url
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            engine: self.engine.unwrap_or_else(|| "google".to_string()),
            num_results,
            timeout: self
                .timeout
                .unwrap_or(Duration::from_secs(DEFAULT_TIMEOUT_SECS)),
        })
    }
}
