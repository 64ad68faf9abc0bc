//! Range checks applied after the environment has been read.

use std::fmt::Display;
use std::ops::RangeInclusive;

use super::Config;
use crate::error::ConfigError;

/// Minimum allowed timeout in milliseconds (1 second).
pub const MIN_TIMEOUT_MS: u64 = 1000;

/// Maximum allowed timeout in milliseconds (5 minutes).
pub const MAX_TIMEOUT_MS: u64 = 300_000;

/// Maximum allowed retry count.
pub const MAX_RETRIES: u32 = 10;

/// Smallest per-facet output budget that fits a useful answer.
pub const MIN_OUTPUT_TOKENS: u32 = 256;

/// Largest per-facet output budget accepted.
pub const MAX_OUTPUT_TOKENS: u32 = 32_768;

/// Validate configuration values.
///
/// # Errors
///
/// - [`ConfigError::MissingRequired`] when live mode has no API key
/// - [`ConfigError::InvalidValue`] for an empty key or model, or a
///   timeout, retry count or token budget outside its range
#[must_use = "validation result should be checked"]
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    match &config.api_key {
        Some(key) if key.is_empty() => return Err(invalid("ANTHROPIC_API_KEY", "must not be empty")),
        None if !config.use_dummy_data => {
            return Err(ConfigError::MissingRequired {
                var: "ANTHROPIC_API_KEY".into(),
            })
        }
        _ => {}
    }

    if config.model.trim().is_empty() {
        return Err(invalid("ANTHROPIC_MODEL", "must not be empty"));
    }

    in_range(
        "REQUEST_TIMEOUT_MS",
        config.request_timeout_ms,
        MIN_TIMEOUT_MS..=MAX_TIMEOUT_MS,
    )?;
    in_range("MAX_RETRIES", config.max_retries, 0..=MAX_RETRIES)?;
    in_range(
        "MAX_OUTPUT_TOKENS",
        config.max_output_tokens,
        MIN_OUTPUT_TOKENS..=MAX_OUTPUT_TOKENS,
    )
}

fn in_range<T>(var: &str, value: T, range: RangeInclusive<T>) -> Result<(), ConfigError>
where
    T: PartialOrd + Display,
{
    if range.contains(&value) {
        Ok(())
    } else {
        Err(invalid(
            var,
            &format!(
                "must be between {} and {}, got {value}",
                range.start(),
                range.end()
            ),
        ))
    }
}

fn invalid(var: &str, reason: &str) -> ConfigError {
    ConfigError::InvalidValue {
        var: var.into(),
        reason: reason.into(),
    }
}
