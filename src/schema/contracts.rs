//! Per-facet output contracts and validation.
//!
//! Each facet is requested as a JSON object holding one array under the
//! facet's wire key. The schemas below are what the generative capability is
//! told to produce; the `validate_*` functions are what the pipeline checks
//! before trusting a value.

use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::types::{AnalysisResult, Omission, SentenceAnalysis, MAX_BIAS_SCORE, MIN_BIAS_SCORE};
use crate::error::AnalysisError;

/// Upper bound on foundational assumptions kept per result.
pub const MAX_ASSUMPTIONS: usize = 6;

/// One independent analysis dimension of the input text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Facet {
    /// Unstated beliefs the argument relies on.
    Assumptions,
    /// Per-sentence bias scoring and tactic detection.
    Sentences,
    /// Missing perspectives and counterarguments.
    Omissions,
}

impl Facet {
    /// All facets in dispatch order.
    pub const ALL: [Self; 3] = [Self::Assumptions, Self::Sentences, Self::Omissions];

    /// Short lowercase name used in logs and errors.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Assumptions => "assumptions",
            Self::Sentences => "sentences",
            Self::Omissions => "omissions",
        }
    }

    /// Key the facet's array lives under in the final result.
    #[must_use]
    pub const fn wire_key(self) -> &'static str {
        match self {
            Self::Assumptions => "foundational_assumptions",
            Self::Sentences => "synthesized_text",
            Self::Omissions => "omissions",
        }
    }

    /// Other wrapper keys models are known to use for the same array.
    #[must_use]
    pub const fn key_aliases(self) -> &'static [&'static str] {
        match self {
            Self::Assumptions => &["assumptions", "assumptions_json", "items"],
            Self::Sentences => &[
                "sentence_analysis",
                "sentences",
                "analysis",
                "analysis_json",
                "items",
            ],
            Self::Omissions => &["omissions_json", "items"],
        }
    }

    /// Name of the tool the model is forced to call in structured mode.
    #[must_use]
    pub const fn tool_name(self) -> &'static str {
        match self {
            Self::Assumptions => "record_assumptions",
            Self::Sentences => "record_sentence_analysis",
            Self::Omissions => "record_omissions",
        }
    }

    /// Tool description shown to the model.
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::Assumptions => "Record the foundational assumptions underlying the text.",
            Self::Sentences => {
                "Record a bias score, justification and rhetorical tactics for each sentence."
            }
            Self::Omissions => "Record the significant perspectives missing from the text.",
        }
    }

    /// JSON Schema for the facet's output object.
    #[must_use]
    pub fn json_schema(self) -> Value {
        let schema = match self {
            Self::Assumptions => schemars::schema_for!(AssumptionsPayload),
            Self::Sentences => schemars::schema_for!(SentencesPayload),
            Self::Omissions => schemars::schema_for!(OmissionsPayload),
        };
        serde_json::to_value(schema).unwrap_or_default()
    }
}

impl fmt::Display for Facet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured output of the assumptions facet.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
pub struct AssumptionsPayload {
    /// Between three and six short assumption statements.
    pub foundational_assumptions: Vec<String>,
}

/// Structured output of the sentence facet.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
pub struct SentencesPayload {
    /// One entry per sentence in original order.
    pub synthesized_text: Vec<SentenceAnalysis>,
}

/// Structured output of the omissions facet.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
pub struct OmissionsPayload {
    /// Between two and four significant omissions.
    pub omissions: Vec<Omission>,
}

fn violation(facet: Facet, field: &str, reason: impl Into<String>) -> AnalysisError {
    AnalysisError::SchemaViolation {
        facet: facet.as_str().to_string(),
        field: field.to_string(),
        reason: reason.into(),
    }
}

/// Check an assumptions list.
///
/// # Errors
///
/// Returns [`AnalysisError::SchemaViolation`] if the list is empty, longer
/// than [`MAX_ASSUMPTIONS`], or holds a blank entry.
pub fn validate_assumptions(items: &[String]) -> Result<(), AnalysisError> {
    let facet = Facet::Assumptions;
    if items.is_empty() {
        return Err(violation(facet, facet.wire_key(), "must not be empty"));
    }
    if items.len() > MAX_ASSUMPTIONS {
        return Err(violation(
            facet,
            facet.wire_key(),
            format!("at most {MAX_ASSUMPTIONS} entries, got {}", items.len()),
        ));
    }
    if items.iter().any(|item| item.trim().is_empty()) {
        return Err(violation(facet, facet.wire_key(), "entries must not be blank"));
    }
    Ok(())
}

/// Check one sentence analysis.
///
/// # Errors
///
/// Returns [`AnalysisError::SchemaViolation`] for a blank sentence or
/// justification, an out-of-range score, or a tactic with a blank phrase.
pub fn validate_sentence(item: &SentenceAnalysis) -> Result<(), AnalysisError> {
    let facet = Facet::Sentences;
    if item.sentence.trim().is_empty() {
        return Err(violation(facet, "sentence", "must not be blank"));
    }
    if !item.bias_score.is_finite() || !(MIN_BIAS_SCORE..=MAX_BIAS_SCORE).contains(&item.bias_score)
    {
        return Err(violation(
            facet,
            "bias_score",
            format!(
                "must be between {MIN_BIAS_SCORE:.1} and {MAX_BIAS_SCORE:.1}, got {}",
                item.bias_score
            ),
        ));
    }
    if item.justification.trim().is_empty() {
        return Err(violation(facet, "justification", "must not be blank"));
    }
    if item.tactics.iter().any(|t| t.phrase.trim().is_empty()) {
        return Err(violation(facet, "tactics.phrase", "must not be blank"));
    }
    Ok(())
}

/// Check one omission.
///
/// # Errors
///
/// Returns [`AnalysisError::SchemaViolation`] if either field is blank.
pub fn validate_omission(item: &Omission) -> Result<(), AnalysisError> {
    let facet = Facet::Omissions;
    if item.omitted_perspective.trim().is_empty() {
        return Err(violation(facet, "omitted_perspective", "must not be blank"));
    }
    if item.potential_impact.trim().is_empty() {
        return Err(violation(facet, "potential_impact", "must not be blank"));
    }
    Ok(())
}

/// Check a merged result before it is returned to a caller.
///
/// # Errors
///
/// Returns the first [`AnalysisError::SchemaViolation`] found, including an
/// empty sentence list.
pub fn validate_result(result: &AnalysisResult) -> Result<(), AnalysisError> {
    validate_assumptions(&result.foundational_assumptions)?;
    if result.sentence_analyses.is_empty() {
        return Err(violation(
            Facet::Sentences,
            Facet::Sentences.wire_key(),
            "must not be empty",
        ));
    }
    result
        .sentence_analyses
        .iter()
        .try_for_each(validate_sentence)?;
    if let Some(omissions) = &result.omissions {
        omissions.iter().try_for_each(validate_omission)?;
    }
    Ok(())
}
