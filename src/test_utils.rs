//! Test utilities and mock factories.
//!
//! This module provides shared testing infrastructure:
//! - Mock generative clients keyed by facet
//! - Sample facet payloads
//! - Common test helpers
//!
//! Only compiled for tests (`#[cfg(test)]`).

#![allow(clippy::unwrap_used, clippy::expect_used)]

use serde_json::{json, Value};

use crate::error::AnalysisError;
use crate::prompts::get_prompt_for_facet;
use crate::schema::Facet;
use crate::traits::{GenerateRequest, MockGenerativeClientTrait, RawOutput};

/// Two-sentence input used across pipeline tests.
pub const SAMPLE_TEXT: &str =
    "Our revolutionary product will transform your life. Act now before it's too late.";

/// Identify which facet a request belongs to from its system prompt.
///
/// # Panics
///
/// Panics if the request was not built from a facet prompt.
#[must_use]
pub fn facet_of(request: &GenerateRequest) -> Facet {
    Facet::ALL
        .into_iter()
        .find(|facet| request.system_instructions == get_prompt_for_facet(*facet))
        .expect("request carries a facet prompt")
}

/// Create a mock client whose every call is answered by `respond`.
#[must_use]
pub fn mock_client_from_fn<F>(respond: F) -> MockGenerativeClientTrait
where
    F: FnMut(GenerateRequest) -> Result<RawOutput, AnalysisError> + Send + 'static,
{
    let mut mock = MockGenerativeClientTrait::new();
    mock.expect_generate().returning(respond);
    mock
}

/// Create a mock client that returns a fixed output per facet.
///
/// # Example
///
/// ```ignore
/// let mock = mock_client_with_facets(
///     RawOutput::Text("[\"A\"]".into()),
///     RawOutput::Structured(sample_sentences_json()),
///     RawOutput::Structured(sample_omissions_json()),
/// );
/// ```
#[must_use]
pub fn mock_client_with_facets(
    assumptions: RawOutput,
    sentences: RawOutput,
    omissions: RawOutput,
) -> MockGenerativeClientTrait {
    mock_client_from_fn(move |request| {
        Ok(match facet_of(&request) {
            Facet::Assumptions => assumptions.clone(),
            Facet::Sentences => sentences.clone(),
            Facet::Omissions => omissions.clone(),
        })
    })
}

/// Create a mock client that fails every call with `error`.
#[must_use]
pub fn mock_client_error(error: AnalysisError) -> MockGenerativeClientTrait {
    mock_client_from_fn(move |_| Err(error.clone()))
}

/// Structured assumptions output for [`SAMPLE_TEXT`].
#[must_use]
pub fn sample_assumptions_json() -> Value {
    json!({
        "foundational_assumptions": [
            "Consumers want their lives transformed by products",
            "Scarcity signals value"
        ]
    })
}

/// Structured sentence output for [`SAMPLE_TEXT`].
#[must_use]
pub fn sample_sentences_json() -> Value {
    json!({
        "synthesized_text": [
            {
                "sentence": "Our revolutionary product will transform your life.",
                "bias_score": 0.8,
                "justification": "Unqualified promotional claim",
                "tactics": [{
                    "phrase": "revolutionary",
                    "tactic": "Loaded Language",
                    "explanation": "Inflates novelty",
                    "type": "emotional"
                }]
            },
            {
                "sentence": "Act now before it's too late.",
                "bias_score": 0.6,
                "justification": "Manufactured urgency",
                "tactics": [{
                    "phrase": "before it's too late",
                    "tactic": "Sales Tactics",
                    "explanation": "Pressures a fast decision",
                    "type": "urgency"
                }]
            }
        ]
    })
}

/// Structured omissions output for [`SAMPLE_TEXT`].
#[must_use]
pub fn sample_omissions_json() -> Value {
    json!({
        "omissions": [
            {
                "omitted_perspective": "Evidence of the claimed transformation",
                "potential_impact": "Readers cannot verify the central claim"
            },
            {
                "omitted_perspective": "Cost and downsides",
                "potential_impact": "The decision is framed as risk free"
            }
        ]
    })
}

/// Mock client answering every facet with the sample payloads.
#[must_use]
pub fn mock_client_success() -> MockGenerativeClientTrait {
    mock_client_with_facets(
        RawOutput::Structured(sample_assumptions_json()),
        RawOutput::Structured(sample_sentences_json()),
        RawOutput::Structured(sample_omissions_json()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::GenerativeClientTrait;

    #[tokio::test]
    async fn test_mock_client_with_facets_routes_by_prompt() {
        let mock = mock_client_success();
        let request = GenerateRequest::new(get_prompt_for_facet(Facet::Omissions), "Text.", 512);
        let output = mock.generate(request).await.unwrap();
        assert_eq!(output, RawOutput::Structured(sample_omissions_json()));
    }

    #[tokio::test]
    async fn test_mock_client_error() {
        let mock = mock_client_error(AnalysisError::ApiUnavailable {
            message: "down".to_string(),
        });
        let request = GenerateRequest::new(get_prompt_for_facet(Facet::Assumptions), "Text.", 512);
        assert!(mock.generate(request).await.is_err());
    }

    #[test]
    fn test_facet_of() {
        let request = GenerateRequest::new(get_prompt_for_facet(Facet::Sentences), "Text.", 512);
        assert_eq!(facet_of(&request), Facet::Sentences);
    }
}
