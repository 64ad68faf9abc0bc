//! Service configuration, read once from the environment at startup.
//!
//! Secrets (the Anthropic key and the optional bearer token) are held in
//! [`SecretString`] so they never show up in `Debug` output or logs.
//!
//! ```
//! use narrative_deconstruct::config::{Config, SecretString};
//!
//! let config = Config {
//!     api_key: Some(SecretString::new("sk-ant-example-key")),
//!     ..Config::default()
//! };
//! assert!(!format!("{config:?}").contains("sk-ant-example-key"));
//! assert_eq!(config.listen_addr(), "0.0.0.0:8000");
//! ```

mod secret;
mod validation;

pub use secret::SecretString;
pub use validation::{
    validate_config, MAX_OUTPUT_TOKENS, MAX_RETRIES, MAX_TIMEOUT_MS, MIN_OUTPUT_TOKENS,
    MIN_TIMEOUT_MS,
};

use std::str::FromStr;

use crate::error::ConfigError;

/// Default listen host.
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Default listen port.
pub const DEFAULT_PORT: u16 = 8000;

/// Default log level.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Default per-facet request timeout in milliseconds.
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 60_000;

/// Default maximum retry attempts before a facet falls back.
pub const DEFAULT_MAX_RETRIES: u32 = 1;

/// Default per-facet output token cap.
pub const DEFAULT_MAX_OUTPUT_TOKENS: u32 = 4096;

/// Default Anthropic model.
pub const DEFAULT_MODEL: &str = "claude-sonnet-4-20250514";

/// Default Anthropic API base URL.
pub const DEFAULT_BASE_URL: &str = "https://api.anthropic.com/v1";

/// How the three facet requests are issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExecutionStrategy {
    /// All facets in flight at once, joined when every one has settled.
    #[default]
    Concurrent,
    /// One facet at a time, in field order.
    Sequential,
}

impl FromStr for ExecutionStrategy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "concurrent" | "parallel" => Ok(Self::Concurrent),
            "sequential" => Ok(Self::Sequential),
            other => Err(ConfigError::InvalidValue {
                var: "EXECUTION_MODE".into(),
                reason: format!("must be concurrent or sequential, got {other}"),
            }),
        }
    }
}

/// Which canned result the demo mode serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DemoFixture {
    /// Fixed, hand-authored content independent of the input.
    #[default]
    Rich,
    /// Up to three sentences derived from the input text.
    Simple,
}

impl FromStr for DemoFixture {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "rich" => Ok(Self::Rich),
            "simple" => Ok(Self::Simple),
            other => Err(ConfigError::InvalidValue {
                var: "DEMO_FIXTURE".into(),
                reason: format!("must be rich or simple, got {other}"),
            }),
        }
    }
}

/// Everything the service reads from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Anthropic API key. Required unless `use_dummy_data` is set.
    pub api_key: Option<SecretString>,
    /// Model sent with every facet call.
    pub model: String,
    /// Anthropic API base URL.
    pub base_url: String,
    /// Serve demonstration data instead of calling the model.
    pub use_dummy_data: bool,
    /// Demo fixture variant.
    pub demo_fixture: DemoFixture,
    /// Bearer token required on the analysis API, if set.
    pub access_token: Option<SecretString>,
    /// Listen host.
    pub host: String,
    /// Listen port.
    pub port: u16,
    /// `EnvFilter` directive for the subscriber.
    pub log_level: String,
    /// Per-facet request timeout in milliseconds.
    pub request_timeout_ms: u64,
    /// Maximum retry attempts per facet call.
    pub max_retries: u32,
    /// Output token cap per facet call.
    pub max_output_tokens: u32,
    /// Facet execution strategy.
    pub execution: ExecutionStrategy,
    /// Request tool-use structured output rather than raw text.
    pub structured_output: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            use_dummy_data: false,
            demo_fixture: DemoFixture::Rich,
            access_token: None,
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            request_timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS,
            max_retries: DEFAULT_MAX_RETRIES,
            max_output_tokens: DEFAULT_MAX_OUTPUT_TOKENS,
            execution: ExecutionStrategy::Concurrent,
            structured_output: true,
        }
    }
}

impl Config {
    /// Read the environment, after merging a `.env` file if one exists.
    ///
    /// | Variable | Default |
    /// |---|---|
    /// | `ANTHROPIC_API_KEY` | required unless `USE_DUMMY_DATA` |
    /// | `ANTHROPIC_MODEL` | [`DEFAULT_MODEL`] |
    /// | `ANTHROPIC_BASE_URL` | [`DEFAULT_BASE_URL`] |
    /// | `USE_DUMMY_DATA` | `false` |
    /// | `DEMO_FIXTURE` | `rich` |
    /// | `ACCESS_TOKEN` | unset, API open |
    /// | `HOST`, `PORT` | `0.0.0.0`, `8000` |
    /// | `LOG_LEVEL` | `info` |
    /// | `REQUEST_TIMEOUT_MS` | `60000` |
    /// | `MAX_RETRIES` | `1` |
    /// | `MAX_OUTPUT_TOKENS` | `4096` |
    /// | `EXECUTION_MODE` | `concurrent` |
    /// | `STRUCTURED_OUTPUT` | `true` |
    ///
    /// # Errors
    ///
    /// [`ConfigError`] when the key is missing in live mode, a value does not
    /// parse, or [`validate_config`] rejects the result.
    pub fn from_env() -> Result<Self, ConfigError> {
        // .env is optional
        let _ = dotenvy::dotenv();

        let use_dummy_data = parse_env_bool("USE_DUMMY_DATA", false)?;
        let api_key = std::env::var("ANTHROPIC_API_KEY").ok().map(SecretString::new);
        if api_key.is_none() && !use_dummy_data {
            return Err(ConfigError::MissingRequired {
                var: "ANTHROPIC_API_KEY".into(),
            });
        }

        let config = Self {
            api_key,
            model: env_or("ANTHROPIC_MODEL", DEFAULT_MODEL),
            base_url: env_or("ANTHROPIC_BASE_URL", DEFAULT_BASE_URL),
            use_dummy_data,
            demo_fixture: std::env::var("DEMO_FIXTURE")
                .map_or(Ok(DemoFixture::default()), |raw| raw.parse())?,
            access_token: std::env::var("ACCESS_TOKEN")
                .ok()
                .filter(|token| !token.trim().is_empty())
                .map(SecretString::new),
            host: env_or("HOST", DEFAULT_HOST),
            port: parse_env("PORT", DEFAULT_PORT, "a port number")?,
            log_level: env_or("LOG_LEVEL", DEFAULT_LOG_LEVEL),
            request_timeout_ms: parse_env(
                "REQUEST_TIMEOUT_MS",
                DEFAULT_REQUEST_TIMEOUT_MS,
                "a duration in milliseconds",
            )?,
            max_retries: parse_env("MAX_RETRIES", DEFAULT_MAX_RETRIES, "a retry count")?,
            max_output_tokens: parse_env(
                "MAX_OUTPUT_TOKENS",
                DEFAULT_MAX_OUTPUT_TOKENS,
                "a token count",
            )?,
            execution: std::env::var("EXECUTION_MODE")
                .map_or(Ok(ExecutionStrategy::default()), |raw| raw.parse())?,
            structured_output: parse_env_bool("STRUCTURED_OUTPUT", true)?,
        };

        validate_config(&config)?;
        Ok(config)
    }

    /// The `host:port` pair the server binds.
    #[must_use]
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Read `name`, or `default` when unset.
fn env_or(name: &str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.to_string())
}

/// Parse `name` with [`FromStr`], or `default` when unset.
///
/// `expected` describes a valid value in the error.
fn parse_env<T: FromStr>(name: &str, default: T, expected: &str) -> Result<T, ConfigError> {
    match std::env::var(name) {
        Err(_) => Ok(default),
        Ok(raw) => raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
            var: name.into(),
            reason: format!("must be {expected}, got {raw:?}"),
        }),
    }
}

/// Parse a boolean flag: `true/false`, `1/0`, `yes/no` or `on/off`.
fn parse_env_bool(name: &str, default: bool) -> Result<bool, ConfigError> {
    let Ok(raw) = std::env::var(name) else {
        return Ok(default);
    };
    match raw.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            var: name.into(),
            reason: format!("must be a boolean, got {raw:?}"),
        }),
    }
}
