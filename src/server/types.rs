//! Server types and shared state.
//!
//! This module defines the application state shared by every handler, the
//! analysis backend it dispatches to, and the JSON bodies of the API.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::anthropic::{AnthropicClient, ClientConfig};
use crate::config::{Config, DemoFixture, SecretString};
use crate::demo::fixture_result;
use crate::error::{AnalysisError, AppError, ConfigError};
use crate::schema::AnalysisResult;
use crate::synthesis::{validate_input, DeconstructionPipeline};
use crate::traits::GenerativeClientTrait;

/// Message reported by the health endpoint.
pub const HEALTH_MESSAGE: &str =
    "Narrative Deconstruction Toolkit API V6 - Synthesis Engine is running";

/// Pipeline over a type-erased generative client.
pub type LivePipeline = DeconstructionPipeline<Arc<dyn GenerativeClientTrait>>;

/// Where analysis results come from.
///
/// Chosen once at startup and never switched while serving.
pub enum AnalysisService {
    /// Run the full pipeline against the model.
    Live(LivePipeline),
    /// Serve a demonstration fixture.
    Demo(DemoFixture),
}

impl AnalysisService {
    /// Build the service described by `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if live mode is requested without an API key or the
    /// HTTP client cannot be created.
    pub fn from_config(config: &Config) -> Result<Self, AppError> {
        if config.use_dummy_data {
            return Ok(Self::Demo(config.demo_fixture));
        }

        let api_key = config.api_key.clone().ok_or_else(|| ConfigError::MissingRequired {
            var: "ANTHROPIC_API_KEY".into(),
        })?;
        let client = AnthropicClient::new(api_key, ClientConfig::from(config))?;
        let client: Arc<dyn GenerativeClientTrait> = Arc::new(client);

        Ok(Self::Live(DeconstructionPipeline::from_config(client, config)))
    }

    /// Short name of the active mode, for logs.
    #[must_use]
    pub const fn mode(&self) -> &'static str {
        match self {
            Self::Live(_) => "live",
            Self::Demo(DemoFixture::Rich) => "demo-rich",
            Self::Demo(DemoFixture::Simple) => "demo-simple",
        }
    }

    /// Analyse `text` with the active backend.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::EmptyInput`] for empty or whitespace text and
    /// [`AnalysisError::InputTooLarge`] for oversized text.
    pub async fn synthesize(&self, text: &str) -> Result<AnalysisResult, AnalysisError> {
        match self {
            Self::Live(pipeline) => pipeline.synthesize(text).await,
            Self::Demo(fixture) => {
                validate_input(text)?;
                Ok(fixture_result(*fixture, text))
            }
        }
    }
}

impl std::fmt::Debug for AnalysisService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Live(pipeline) => f
                .debug_tuple("Live")
                .field(pipeline.settings())
                .finish(),
            Self::Demo(fixture) => f.debug_tuple("Demo").field(fixture).finish(),
        }
    }
}

/// Shared application state for all handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Analysis backend.
    pub service: Arc<AnalysisService>,
    /// Bearer token required on the analysis routes, if any.
    pub access_token: Option<SecretString>,
}

impl AppState {
    /// Creates a new application state.
    #[must_use]
    pub fn new(service: AnalysisService, access_token: Option<SecretString>) -> Self {
        Self {
            service: Arc::new(service),
            access_token,
        }
    }

    /// Creates the state described by `config`.
    ///
    /// # Errors
    ///
    /// See [`AnalysisService::from_config`].
    pub fn from_config(config: &Config) -> Result<Self, AppError> {
        Ok(Self::new(
            AnalysisService::from_config(config)?,
            config.access_token.clone(),
        ))
    }
}

/// Body of `POST /api/v1/synthesize`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SynthesisRequest {
    /// Text to deconstruct.
    pub text: String,
}

/// Body of `GET /api/health`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HealthResponse {
    /// Always `healthy` while the process serves requests.
    pub status: String,
    /// Human-readable service banner.
    pub message: String,
}

impl HealthResponse {
    /// The healthy response.
    #[must_use]
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            message: HEALTH_MESSAGE.to_string(),
        }
    }
}

/// Error body returned with non-2xx statuses.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorDetail {
    /// What went wrong.
    pub detail: String,
}
