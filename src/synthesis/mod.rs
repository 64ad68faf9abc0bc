//! Result synthesis.
//!
//! [`DeconstructionPipeline`] is the single entry point for analysing a
//! text: it validates the input, fans the facets out through the
//! [`FacetOrchestrator`], repairs each facet independently and merges the
//! three into one [`AnalysisResult`].
//!
//! Only an empty or oversized input is reported to the caller. Any other
//! failure produces a well-formed result whose content describes the failure.

use tracing::{info, instrument, warn};

use crate::anthropic::MAX_CONTENT_LENGTH;
use crate::config::Config;
use crate::error::AnalysisError;
use crate::orchestrator::{FacetBatch, FacetOrchestrator, OrchestratorSettings};
use crate::repair::{repair_assumptions, repair_omissions, repair_sentences};
use crate::schema::{
    split_sentences, validate_result, AnalysisResult, Omission, SentenceAnalysis,
};
use crate::traits::GenerativeClientTrait;

/// Most sentences the whole-result fallback covers.
pub const FAILED_SENTENCE_CAP: usize = 3;

/// Perspective text of the whole-result fallback omission.
pub const FAILED_OMISSION: &str = "Analysis unavailable due to error";

/// Largest input accepted, in bytes. The text is sent as one message.
pub const MAX_INPUT_BYTES: usize = MAX_CONTENT_LENGTH;

/// End-to-end analysis of one text.
#[derive(Debug)]
pub struct DeconstructionPipeline<C> {
    orchestrator: FacetOrchestrator<C>,
}

impl<C: GenerativeClientTrait> DeconstructionPipeline<C> {
    /// Create a pipeline with explicit settings.
    #[must_use]
    pub const fn new(client: C, settings: OrchestratorSettings) -> Self {
        Self {
            orchestrator: FacetOrchestrator::new(client, settings),
        }
    }

    /// Create a pipeline configured from application config.
    #[must_use]
    pub fn from_config(client: C, config: &Config) -> Self {
        Self::new(client, OrchestratorSettings::from(config))
    }

    /// Get the orchestrator settings.
    #[must_use]
    pub const fn settings(&self) -> &OrchestratorSettings {
        self.orchestrator.settings()
    }

    /// Analyse `text`.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::EmptyInput`] if `text` is empty or
    /// whitespace only, and [`AnalysisError::InputTooLarge`] if it exceeds
    /// [`MAX_INPUT_BYTES`]. No other error escapes.
    #[instrument(skip_all, fields(chars = text.chars().count()))]
    pub async fn synthesize(&self, text: &str) -> Result<AnalysisResult, AnalysisError> {
        validate_input(text)?;

        let batch = self.orchestrator.dispatch(text).await;

        match merge(&batch, text) {
            Ok(result) => {
                info!(
                    assumptions = result.foundational_assumptions.len(),
                    sentences = result.sentence_analyses.len(),
                    omissions = result.omissions.as_ref().map_or(0, Vec::len),
                    "Synthesis complete"
                );
                Ok(result)
            }
            Err(err) => {
                warn!(error = %err, "Synthesis failed, returning error result");
                Ok(failed_result(text, &err.to_string()))
            }
        }
    }
}

/// Reject input no facet call could analyse.
///
/// # Errors
///
/// Returns [`AnalysisError::EmptyInput`] for empty or whitespace-only text
/// and [`AnalysisError::InputTooLarge`] above [`MAX_INPUT_BYTES`].
pub fn validate_input(text: &str) -> Result<(), AnalysisError> {
    if text.trim().is_empty() {
        return Err(AnalysisError::EmptyInput);
    }
    if text.len() > MAX_INPUT_BYTES {
        return Err(AnalysisError::InputTooLarge {
            length: text.len(),
            max: MAX_INPUT_BYTES,
        });
    }
    Ok(())
}

/// Merge three facet outcomes into one result.
///
/// Each facet is repaired independently, so one bad facet costs only its
/// own slot.
///
/// # Errors
///
/// Returns [`AnalysisError::AllFacetsFailed`] when no facet call succeeded,
/// and [`AnalysisError::Synthesis`] if the merged result is inconsistent.
pub fn merge(batch: &FacetBatch, text: &str) -> Result<AnalysisResult, AnalysisError> {
    if batch.all_failed() {
        return Err(AnalysisError::AllFacetsFailed {
            message: batch
                .first_error()
                .map_or_else(|| "unknown error".to_string(), ToString::to_string),
        });
    }

    checked(AnalysisResult::new(
        repair_assumptions(&batch.assumptions),
        repair_sentences(&batch.sentences, text),
        Some(repair_omissions(&batch.omissions)),
    ))
}

/// Pass a merged result through only if it satisfies every facet contract.
fn checked(result: AnalysisResult) -> Result<AnalysisResult, AnalysisError> {
    validate_result(&result).map_err(|err| AnalysisError::Synthesis {
        message: err.to_string(),
    })?;
    Ok(result)
}

/// The result returned when analysis as a whole failed.
///
/// Every field carries `message` so the caller can see what went wrong.
#[must_use]
pub fn failed_result(text: &str, message: &str) -> AnalysisResult {
    let justification = format!("Analysis failed: {message}");

    let mut sentences: Vec<SentenceAnalysis> = split_sentences(text, FAILED_SENTENCE_CAP)
        .into_iter()
        .map(|sentence| SentenceAnalysis::neutral(sentence, justification.clone()))
        .collect();
    if sentences.is_empty() {
        sentences.push(SentenceAnalysis::neutral(text.trim(), justification.clone()));
    }

    AnalysisResult::new(
        vec![justification],
        sentences,
        Some(vec![Omission::new(
            FAILED_OMISSION,
            format!("System error prevented analysis: {message}"),
        )]),
    )
}
