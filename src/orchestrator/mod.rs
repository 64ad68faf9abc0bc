//! Facet request fan-out.
//!
//! Issues one generation request per [`Facet`] for the same input text and
//! collects every outcome, success or failure, into a [`FacetBatch`]. A
//! failing or slow facet never prevents the others from completing: each
//! call runs under its own time budget and its error is captured rather
//! than propagated.

use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::config::{Config, ExecutionStrategy};
use crate::error::AnalysisError;
use crate::prompts::get_prompt_for_facet;
use crate::repair::FacetResponse;
use crate::schema::Facet;
use crate::traits::{GenerateRequest, GenerativeClientTrait, OutputSchema, RawOutput};

/// Per-call settings shared by every facet request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrchestratorSettings {
    /// Concurrent or sequential dispatch.
    pub strategy: ExecutionStrategy,
    /// Time budget for one facet call, retries included.
    pub facet_timeout: Duration,
    /// Output token cap per call.
    pub max_output_tokens: u32,
    /// Ask for forced structured output rather than free text.
    pub structured_output: bool,
}

impl Default for OrchestratorSettings {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

impl From<&Config> for OrchestratorSettings {
    fn from(config: &Config) -> Self {
        let attempts = u64::from(config.max_retries) + 1;
        Self {
            strategy: config.execution,
            facet_timeout: Duration::from_millis(config.request_timeout_ms.saturating_mul(attempts)),
            max_output_tokens: config.max_output_tokens,
            structured_output: config.structured_output,
        }
    }
}

/// Outcomes of the three facet calls for one input.
#[derive(Debug, Clone, PartialEq)]
pub struct FacetBatch {
    /// Foundational assumptions outcome.
    pub assumptions: FacetResponse,
    /// Sentence analysis outcome.
    pub sentences: FacetResponse,
    /// Omissions outcome.
    pub omissions: FacetResponse,
}

impl FacetBatch {
    /// Returns true if every facet call failed.
    #[must_use]
    pub const fn all_failed(&self) -> bool {
        self.assumptions.is_failed() && self.sentences.is_failed() && self.omissions.is_failed()
    }

    /// The first failure in facet order.
    #[must_use]
    pub fn first_error(&self) -> Option<&AnalysisError> {
        self.assumptions
            .error()
            .or_else(|| self.sentences.error())
            .or_else(|| self.omissions.error())
    }

    /// Number of failed facet calls.
    #[must_use]
    pub fn failure_count(&self) -> usize {
        [&self.assumptions, &self.sentences, &self.omissions]
            .iter()
            .filter(|response| response.is_failed())
            .count()
    }
}

/// Dispatches facet requests to a generative client.
#[derive(Debug)]
pub struct FacetOrchestrator<C> {
    client: C,
    settings: OrchestratorSettings,
}

impl<C: GenerativeClientTrait> FacetOrchestrator<C> {
    /// Create a new orchestrator.
    #[must_use]
    pub const fn new(client: C, settings: OrchestratorSettings) -> Self {
        Self { client, settings }
    }

    /// Get the orchestrator settings.
    #[must_use]
    pub const fn settings(&self) -> &OrchestratorSettings {
        &self.settings
    }

    /// Run all three facets against `text`.
    pub async fn dispatch(&self, text: &str) -> FacetBatch {
        let start = Instant::now();

        let batch = match self.settings.strategy {
            ExecutionStrategy::Concurrent => {
                let (assumptions, sentences, omissions) = tokio::join!(
                    self.request(Facet::Assumptions, text),
                    self.request(Facet::Sentences, text),
                    self.request(Facet::Omissions, text),
                );
                FacetBatch {
                    assumptions,
                    sentences,
                    omissions,
                }
            }
            ExecutionStrategy::Sequential => FacetBatch {
                assumptions: self.request(Facet::Assumptions, text).await,
                sentences: self.request(Facet::Sentences, text).await,
                omissions: self.request(Facet::Omissions, text).await,
            },
        };

        info!(
            strategy = ?self.settings.strategy,
            failures = batch.failure_count(),
            elapsed_ms = elapsed_ms(start),
            "Facet dispatch complete"
        );

        batch
    }

    /// Build the generation request for one facet.
    #[must_use]
    pub fn build_request(&self, facet: Facet, text: &str) -> GenerateRequest {
        let request = GenerateRequest::new(
            get_prompt_for_facet(facet),
            text,
            self.settings.max_output_tokens,
        );

        if self.settings.structured_output {
            request.with_output_schema(OutputSchema::new(
                facet.tool_name(),
                facet.description(),
                facet.json_schema(),
            ))
        } else {
            request
        }
    }

    async fn request(&self, facet: Facet, text: &str) -> FacetResponse {
        let request = self.build_request(facet, text);
        let start = Instant::now();

        let outcome = tokio::time::timeout(self.settings.facet_timeout, self.client.generate(request))
            .await
            .unwrap_or_else(|_| {
                Err(AnalysisError::Timeout {
                    facet: facet.as_str().to_string(),
                    elapsed_ms: elapsed_ms(start),
                })
            });

        match outcome {
            Ok(RawOutput::Structured(value)) => {
                debug!(facet = %facet, elapsed_ms = elapsed_ms(start), "Facet returned structured output");
                FacetResponse::Structured(value)
            }
            Ok(RawOutput::Text(text)) => {
                debug!(facet = %facet, elapsed_ms = elapsed_ms(start), chars = text.len(), "Facet returned text");
                FacetResponse::Raw(text)
            }
            Err(err) => {
                warn!(facet = %facet, error = %err, elapsed_ms = elapsed_ms(start), "Facet call failed");
                FacetResponse::Failed(err)
            }
        }
    }
}

fn elapsed_ms(start: Instant) -> u64 {
    u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX)
}
