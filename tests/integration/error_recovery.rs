//! Error recovery and edge case tests.
//!
//! Tests how the pipeline degrades when the generative client misbehaves.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]

use std::sync::atomic::Ordering;
use std::time::Duration;

use narrative_deconstruct::config::ExecutionStrategy;
use narrative_deconstruct::error::AnalysisError;
use narrative_deconstruct::repair::{fallback_assumptions, fallback_omissions, fallback_sentences};
use narrative_deconstruct::schema::{validate_result, Facet};
use narrative_deconstruct::synthesis::DeconstructionPipeline;
use narrative_deconstruct::traits::RawOutput;
use pretty_assertions::assert_eq;
use serde_json::json;

use super::{
    assumptions_json, omissions_json, sentences_json, settings, ScriptedClient, SAMPLE_TEXT,
};

fn pipeline(client: ScriptedClient) -> DeconstructionPipeline<ScriptedClient> {
    DeconstructionPipeline::new(
        client,
        settings(ExecutionStrategy::Concurrent, Duration::from_secs(2)),
    )
}

#[tokio::test]
async fn test_empty_input_makes_no_calls() {
    let client = ScriptedClient::healthy();
    let calls = client.calls();
    let pipeline = pipeline(client);

    assert_eq!(pipeline.synthesize("\n \t").await, Err(AnalysisError::EmptyInput));
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_healthy_run_calls_each_facet_once() {
    let client = ScriptedClient::healthy();
    let calls = client.calls();

    let result = pipeline(client).synthesize(SAMPLE_TEXT).await.unwrap();

    assert_eq!(calls.load(Ordering::SeqCst), 3);
    assert_eq!(result.sentence_analyses.len(), 2);
    assert_eq!(result.sentence_analyses[1].bias_score, -0.8);
    assert!(validate_result(&result).is_ok());
}

#[tokio::test]
async fn test_total_outage_returns_error_result() {
    let client = ScriptedClient::failing(&AnalysisError::ApiUnavailable {
        message: "Network error: connection refused".to_string(),
    });

    let result = pipeline(client).synthesize(SAMPLE_TEXT).await.unwrap();

    assert_eq!(result.foundational_assumptions.len(), 1);
    assert!(result.foundational_assumptions[0].starts_with("Analysis failed: "));
    assert!(result.foundational_assumptions[0].contains("connection refused"));
    assert_eq!(result.sentence_analyses.len(), 2);
    assert!(result.sentence_analyses.iter().all(|s| s.bias_score == 0.0));
    assert_eq!(
        result.omissions.unwrap()[0].omitted_perspective,
        "Analysis unavailable due to error"
    );
}

#[tokio::test]
async fn test_single_facet_failure_is_contained() {
    let client = ScriptedClient::new(
        Err(AnalysisError::ApiUnavailable {
            message: "overloaded".to_string(),
        }),
        Ok(RawOutput::Structured(sentences_json())),
        Ok(RawOutput::Structured(omissions_json())),
    );

    let result = pipeline(client).synthesize(SAMPLE_TEXT).await.unwrap();

    assert_eq!(result.foundational_assumptions, fallback_assumptions());
    assert_eq!(result.sentence_analyses[0].tactics[0].tactic_name, "False Dilemma");
    assert_eq!(result.omissions.unwrap().len(), 1);
}

#[tokio::test]
async fn test_slow_facet_times_out_alone() {
    let client = ScriptedClient::healthy().with_slow_facet(Facet::Omissions, Duration::from_secs(5));
    let pipeline = DeconstructionPipeline::new(
        client,
        settings(ExecutionStrategy::Concurrent, Duration::from_millis(100)),
    );

    let result = pipeline.synthesize(SAMPLE_TEXT).await.unwrap();

    assert_eq!(result.foundational_assumptions.len(), 2);
    assert_eq!(result.sentence_analyses.len(), 2);
    assert_eq!(result.omissions, Some(fallback_omissions()));
}

#[tokio::test]
async fn test_truncated_sentence_output_is_repaired() {
    let truncated = r#"{"synthesized_text": [{"sentence": "Our plan is the only sensible choice.", "bias_score": 0.7, "justification": "Frames alternatives", "tactics": []}, {"sentence": "Critics are simply uninf"#;
    let client = ScriptedClient::new(
        Ok(RawOutput::Structured(assumptions_json())),
        Ok(RawOutput::Text(truncated.to_string())),
        Ok(RawOutput::Structured(omissions_json())),
    );

    let result = pipeline(client).synthesize(SAMPLE_TEXT).await.unwrap();

    assert_eq!(result.sentence_analyses.len(), 2);
    assert_eq!(
        result.sentence_analyses[0].sentence,
        "Our plan is the only sensible choice."
    );
    assert_eq!(result.sentence_analyses[0].bias_score, 0.7);
    assert_eq!(result.sentence_analyses[1].sentence, "Critics are simply uninf");
    assert_eq!(result.sentence_analyses[1].bias_score, 0.0);
}

#[tokio::test]
async fn test_loose_shapes_are_coerced() {
    let client = ScriptedClient::new(
        Ok(RawOutput::Text(
            "Here you go:\n```json\n{\"assumptions\": [\"Only one plan works\"]}\n```".to_string(),
        )),
        Ok(RawOutput::Structured(json!({
            "synthesized_text": [{
                "text": "Critics are simply uninformed.",
                "score": "-1.7",
                "reason": "Dismissive",
                "tactics": [{"phrase": "SIMPLY UNINFORMED", "category": "dismissal"}]
            }]
        }))),
        Ok(RawOutput::Structured(json!({
            "perspective": "Critics' evidence",
            "impact": "One-sided picture"
        }))),
    );

    let result = pipeline(client).synthesize(SAMPLE_TEXT).await.unwrap();

    assert_eq!(result.foundational_assumptions, vec!["Only one plan works"]);

    let sentence = &result.sentence_analyses[0];
    assert_eq!(sentence.bias_score, -1.0);
    assert_eq!(sentence.justification, "Dismissive");
    assert_eq!(sentence.tactics[0].phrase, "simply uninformed");
    assert_eq!(sentence.tactics[0].tactic_name, "Unspecified Tactic");
    assert_eq!(sentence.tactics[0].category, "dismissal");

    let omissions = result.omissions.unwrap();
    assert_eq!(omissions[0].omitted_perspective, "Critics' evidence");
    assert_eq!(omissions[0].potential_impact, "One-sided picture");
}

#[tokio::test]
async fn test_garbage_everywhere_falls_back_per_facet() {
    let client = ScriptedClient::new(
        Ok(RawOutput::Text("I cannot help with that.".to_string())),
        Ok(RawOutput::Structured(json!({"synthesized_text": []}))),
        Ok(RawOutput::Text(String::new())),
    );

    let result = pipeline(client).synthesize(SAMPLE_TEXT).await.unwrap();

    assert_eq!(result.foundational_assumptions, fallback_assumptions());
    assert_eq!(result.sentence_analyses, fallback_sentences(SAMPLE_TEXT));
    assert_eq!(result.omissions, Some(fallback_omissions()));
    assert!(validate_result(&result).is_ok());
}

#[tokio::test]
async fn test_sequential_strategy_matches_concurrent() {
    let sequential = DeconstructionPipeline::new(
        ScriptedClient::healthy(),
        settings(ExecutionStrategy::Sequential, Duration::from_secs(2)),
    );

    let a = sequential.synthesize(SAMPLE_TEXT).await.unwrap();
    let b = pipeline(ScriptedClient::healthy())
        .synthesize(SAMPLE_TEXT)
        .await
        .unwrap();

    assert_eq!(a, b);
}
