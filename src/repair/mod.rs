//! Structured-output repair.
//!
//! Turns whatever a facet call produced into a typed, contract-conforming
//! value. Every public `repair_*` function is total: when decoding, coercion
//! and validation all fail, the facet's static fallback is returned instead.
//!
//! # Example
//!
//! ```
//! use narrative_deconstruct::repair::{repair_assumptions, FacetResponse};
//!
//! let response = FacetResponse::Raw("```json\n[\"A\", \"B\"]\n```".to_string());
//! assert_eq!(repair_assumptions(&response), vec!["A", "B"]);
//! ```

mod coerce;
mod fallback;
mod json;

use serde_json::Value;
use tracing::{debug, warn};

use crate::error::AnalysisError;
use crate::schema::{Facet, Omission, SentenceAnalysis};

pub use fallback::{
    fallback_assumptions, fallback_omissions, fallback_sentences, FALLBACK_SENTENCE_CAP,
    FORMAT_ERROR, OMISSIONS_UNAVAILABLE_IMPACT, UNAVAILABLE, UNKNOWN_OMISSION, UNKNOWN_SENTENCE,
};
pub use json::{decode_lenient, decode_lenient_where, repair_json, strip_code_fences, truncate_for_preview};

/// Characters of raw output included in parse failure logs.
const LOG_SNIPPET_CHARS: usize = 200;

/// What one facet call produced.
#[derive(Debug, Clone, PartialEq)]
pub enum FacetResponse {
    /// A value already decoded by the client, e.g. forced tool input.
    Structured(Value),
    /// Free text that should contain JSON.
    Raw(String),
    /// The call itself failed.
    Failed(AnalysisError),
}

impl FacetResponse {
    /// Returns true if the call failed.
    #[must_use]
    pub const fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }

    /// The failure, if any.
    #[must_use]
    pub const fn error(&self) -> Option<&AnalysisError> {
        match self {
            Self::Failed(err) => Some(err),
            _ => None,
        }
    }
}

/// Decode and coerce an assumptions response.
///
/// # Errors
///
/// Returns the first decoding or contract error encountered.
pub fn parse_assumptions(response: &FacetResponse) -> Result<Vec<String>, AnalysisError> {
    coerce::assumptions(response_value(response, Facet::Assumptions)?)
}

/// Decode and coerce a sentence analysis response.
///
/// # Errors
///
/// Returns the first decoding or contract error encountered.
pub fn parse_sentences(response: &FacetResponse) -> Result<Vec<SentenceAnalysis>, AnalysisError> {
    coerce::sentences(response_value(response, Facet::Sentences)?)
}

/// Decode and coerce an omissions response.
///
/// # Errors
///
/// Returns the first decoding or contract error encountered.
pub fn parse_omissions(response: &FacetResponse) -> Result<Vec<Omission>, AnalysisError> {
    coerce::omissions(response_value(response, Facet::Omissions)?)
}

/// Repair an assumptions response, falling back on failure.
#[must_use]
pub fn repair_assumptions(response: &FacetResponse) -> Vec<String> {
    parse_assumptions(response).unwrap_or_else(|err| {
        log_fallback(Facet::Assumptions, &err);
        fallback_assumptions()
    })
}

/// Repair a sentence analysis response, falling back on failure.
///
/// `text` is the analysed input, split into sentences by the fallback.
#[must_use]
pub fn repair_sentences(response: &FacetResponse, text: &str) -> Vec<SentenceAnalysis> {
    parse_sentences(response).unwrap_or_else(|err| {
        log_fallback(Facet::Sentences, &err);
        fallback_sentences(text)
    })
}

/// Repair an omissions response, falling back on failure.
#[must_use]
pub fn repair_omissions(response: &FacetResponse) -> Vec<Omission> {
    parse_omissions(response).unwrap_or_else(|err| {
        log_fallback(Facet::Omissions, &err);
        fallback_omissions()
    })
}

fn response_value(response: &FacetResponse, facet: Facet) -> Result<Value, AnalysisError> {
    match response {
        FacetResponse::Structured(value) => Ok(value.clone()),
        FacetResponse::Raw(text) => {
            decode_lenient_where(text, |value| coerce::fits_shape(value, facet)).map_err(|err| {
                warn!(
                    facet = %facet,
                    error = %err,
                    snippet = %truncate_for_preview(text, LOG_SNIPPET_CHARS),
                    "Failed to decode facet output"
                );
                err
            })
        }
        FacetResponse::Failed(err) => Err(err.clone()),
    }
}

fn log_fallback(facet: Facet, err: &AnalysisError) {
    match err {
        // Call failures were already logged by the orchestrator.
        AnalysisError::ApiUnavailable { .. } | AnalysisError::Timeout { .. } => {
            debug!(facet = %facet, error = %err, "Using fallback after failed call");
        }
        _ => warn!(facet = %facet, error = %err, "Using fallback for unusable output"),
    }
}
