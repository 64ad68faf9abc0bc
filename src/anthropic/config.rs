//! Connection settings for [`AnthropicClient`](super::AnthropicClient).

use crate::config::{Config, DEFAULT_BASE_URL, DEFAULT_MODEL};

/// Per-call HTTP timeout when none is configured.
pub const DEFAULT_TIMEOUT_MS: u64 = 60_000;
/// Retries after the first attempt.
pub const DEFAULT_MAX_RETRIES: u32 = 1;
/// Delay before the first retry; doubled for each later one.
pub const DEFAULT_RETRY_DELAY_MS: u64 = 1_000;

/// Endpoint, model and retry policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// API root without a trailing slash, e.g. `https://api.anthropic.com/v1`.
    pub base_url: String,
    /// Model sent with every request.
    pub model: String,
    /// Per-call HTTP timeout.
    pub timeout_ms: u64,
    /// Retries after the first attempt.
    pub max_retries: u32,
    /// Backoff base.
    pub retry_delay_ms: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            max_retries: DEFAULT_MAX_RETRIES,
            retry_delay_ms: DEFAULT_RETRY_DELAY_MS,
        }
    }
}

impl ClientConfig {
    /// Point at another endpoint; a trailing slash is dropped.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl AsRef<str>) -> Self {
        self.base_url = base_url.as_ref().trim_end_matches('/').to_string();
        self
    }

    /// Use another model.
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set the per-call timeout.
    #[must_use]
    pub const fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Set the retry budget.
    #[must_use]
    pub const fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Set the backoff base.
    #[must_use]
    pub const fn with_retry_delay_ms(mut self, retry_delay_ms: u64) -> Self {
        self.retry_delay_ms = retry_delay_ms;
        self
    }
}

impl From<&Config> for ClientConfig {
    fn from(config: &Config) -> Self {
        Self::default()
            .with_base_url(&config.base_url)
            .with_model(&config.model)
            .with_timeout_ms(config.request_timeout_ms)
            .with_max_retries(config.max_retries)
    }
}
