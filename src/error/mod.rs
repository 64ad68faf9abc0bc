//! Error types.
//!
//! - [`AnthropicError`]: one failed Messages API call
//! - [`AnalysisError`]: a failed pipeline stage
//! - [`ConfigError`]: bad or missing environment
//! - [`ServerError`]: listener and serve failures
//! - [`AppError`]: anything that can stop the process
//!
//! Only [`AnalysisError::EmptyInput`] and [`AnalysisError::InputTooLarge`]
//! ever reach an API caller. Every other analysis failure is absorbed by a
//! fallback inside the pipeline.

use thiserror::Error;

/// Errors that end the process.
#[derive(Debug, Error)]
pub enum AppError {
    /// See [`AnthropicError`].
    #[error("Anthropic API error: {0}")]
    Anthropic(#[from] AnthropicError),

    /// See [`AnalysisError`].
    #[error("Analysis error: {0}")]
    Analysis(#[from] AnalysisError),

    /// See [`ConfigError`].
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// See [`ServerError`].
    #[error("Server error: {0}")]
    Server(#[from] ServerError),
}

/// A failed Messages API call.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AnthropicError {
    /// 401 from the API.
    #[error("Authentication failed: invalid API key")]
    AuthenticationFailed,

    /// 429 from the API.
    #[error("Rate limited: retry after {retry_after_seconds}s")]
    RateLimited {
        /// Value of `retry-after`, or a default.
        retry_after_seconds: u64,
    },

    /// 529 from the API.
    #[error("Model overloaded: {model}")]
    ModelOverloaded {
        /// Model named in the request.
        model: String,
    },

    /// No response within the client timeout.
    #[error("Request timeout after {timeout_ms}ms")]
    Timeout {
        /// Configured client timeout.
        timeout_ms: u64,
    },

    /// Rejected before sending, or a 400 from the API.
    #[error("Invalid request: {message}")]
    InvalidRequest {
        /// What was wrong.
        message: String,
    },

    /// Connection-level failure.
    #[error("Network error: {message}")]
    Network {
        /// Transport error text.
        message: String,
    },

    /// Any other status, or a body that could not be used.
    #[error("Unexpected response: {message}")]
    UnexpectedResponse {
        /// Status and body summary.
        message: String,
    },
}

impl AnthropicError {
    /// Whether a later attempt could succeed.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::RateLimited { .. }
                | Self::ModelOverloaded { .. }
                | Self::Timeout { .. }
                | Self::Network { .. }
        )
    }
}

/// A failed pipeline stage.
///
/// The caller of the stage decides whether to substitute a fallback.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AnalysisError {
    /// The submitted text is empty or whitespace only.
    #[error("Text input cannot be empty")]
    EmptyInput,

    /// The submitted text exceeds what one facet call can carry.
    #[error("Text input too large: {length} bytes exceeds the {max} byte limit")]
    InputTooLarge {
        /// Input size in bytes.
        length: usize,
        /// Largest accepted size in bytes.
        max: usize,
    },

    /// JSON decoding failed, including after the repair pass.
    #[error("JSON parsing failed: {message}")]
    JsonParseFailed {
        /// Decoder error text.
        message: String,
    },

    /// A value does not satisfy its facet contract.
    #[error("Schema violation in {facet}.{field}: {reason}")]
    SchemaViolation {
        /// Facet whose contract was violated.
        facet: String,
        /// Offending field.
        field: String,
        /// Why the value is invalid.
        reason: String,
    },

    /// The generative backend could not be reached or failed.
    #[error("API unavailable: {message}")]
    ApiUnavailable {
        /// Backend error text.
        message: String,
    },

    /// A facet call exceeded its time budget.
    #[error("{facet} analysis timed out after {elapsed_ms}ms")]
    Timeout {
        /// Facet that timed out.
        facet: String,
        /// Time budget in milliseconds.
        elapsed_ms: u64,
    },

    /// Every facet call failed, so there is nothing to merge.
    #[error("All analysis requests failed: {message}")]
    AllFacetsFailed {
        /// Failure reported by the first facet.
        message: String,
    },

    /// Merging the facets produced an inconsistent result.
    #[error("Synthesis failed: {message}")]
    Synthesis {
        /// The inconsistency.
        message: String,
    },
}

/// Bad or missing environment.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A required variable is unset.
    #[error("Missing required: {var}")]
    MissingRequired {
        /// Variable name.
        var: String,
    },

    /// A variable is set to something unusable.
    #[error("Invalid value for {var}: {reason}")]
    InvalidValue {
        /// Variable name.
        var: String,
        /// What a valid value looks like.
        reason: String,
    },
}

/// Listener and serve failures.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ServerError {
    /// Could not bind the listen address.
    #[error("Failed to bind {addr}: {message}")]
    Bind {
        /// Requested address.
        addr: String,
        /// OS error text.
        message: String,
    },

    /// The server stopped with an error.
    #[error("Server failed: {message}")]
    Serve {
        /// Error text.
        message: String,
    },
}
