//! End-to-end tests against a mock Anthropic Messages API.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]

use std::time::Duration;

use narrative_deconstruct::anthropic::{AnthropicClient, ClientConfig};
use narrative_deconstruct::config::ExecutionStrategy;
use narrative_deconstruct::orchestrator::OrchestratorSettings;
use narrative_deconstruct::prompts::get_prompt_for_facet;
use narrative_deconstruct::repair::fallback_omissions;
use narrative_deconstruct::schema::Facet;
use narrative_deconstruct::synthesis::DeconstructionPipeline;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::{assumptions_json, omissions_json, sentences_json, settings, SAMPLE_TEXT};

fn client(server: &MockServer) -> AnthropicClient {
    let config = ClientConfig::default()
        .with_base_url(server.uri())
        .with_max_retries(1)
        .with_retry_delay_ms(10)
        .with_timeout_ms(5_000);
    AnthropicClient::new("test-api-key", config).unwrap()
}

fn tool_body(facet: Facet, input: Value) -> Value {
    json!({
        "id": format!("msg_{}", facet.as_str()),
        "content": [{"type": "tool_use", "id": "tu_1", "name": facet.tool_name(), "input": input}],
        "model": "claude-sonnet-4-20250514",
        "usage": {"input_tokens": 120, "output_tokens": 80},
        "stop_reason": "tool_use"
    })
}

fn text_body(text: &str) -> Value {
    json!({
        "id": "msg_text",
        "content": [{"type": "text", "text": text}],
        "model": "claude-sonnet-4-20250514",
        "usage": {"input_tokens": 120, "output_tokens": 80},
        "stop_reason": "end_turn"
    })
}

async fn mount_tool_reply(server: &MockServer, facet: Facet, input: Value) {
    Mock::given(method("POST"))
        .and(path("/messages"))
        .and(body_partial_json(json!({
            "tool_choice": {"type": "tool", "name": facet.tool_name()}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(tool_body(facet, input)))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_structured_pipeline_end_to_end() {
    let server = MockServer::start().await;
    mount_tool_reply(&server, Facet::Assumptions, assumptions_json()).await;
    mount_tool_reply(&server, Facet::Sentences, sentences_json()).await;
    mount_tool_reply(&server, Facet::Omissions, omissions_json()).await;

    let pipeline = DeconstructionPipeline::new(
        client(&server),
        settings(ExecutionStrategy::Concurrent, Duration::from_secs(10)),
    );
    let result = pipeline.synthesize(SAMPLE_TEXT).await.unwrap();

    assert_eq!(
        result.foundational_assumptions,
        vec![
            "There is exactly one sensible choice",
            "Disagreement stems from ignorance"
        ]
    );
    assert_eq!(result.sentence_analyses.len(), 2);
    assert_eq!(result.sentence_analyses[0].tactics[0].phrase, "the only sensible choice");
    assert_eq!(result.omissions.unwrap().len(), 1);

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 3);
    for request in &requests {
        let body: Value = serde_json::from_slice(&request.body).unwrap();
        assert_eq!(body["temperature"], 0.0);
        assert_eq!(body["messages"][0]["role"], "user");
        assert_eq!(body["messages"][0]["content"], SAMPLE_TEXT);
        assert_eq!(body["tools"].as_array().unwrap().len(), 1);
    }
}

#[tokio::test]
async fn test_text_mode_decodes_fenced_json() {
    let server = MockServer::start().await;
    let replies = [
        (Facet::Assumptions, assumptions_json()),
        (Facet::Sentences, sentences_json()),
        (Facet::Omissions, omissions_json()),
    ];
    for (facet, payload) in replies {
        let text = format!("```json\n{payload}\n```");
        Mock::given(method("POST"))
            .and(path("/messages"))
            .and(body_partial_json(json!({"system": get_prompt_for_facet(facet)})))
            .respond_with(ResponseTemplate::new(200).set_body_json(text_body(&text)))
            .mount(&server)
            .await;
    }

    let pipeline = DeconstructionPipeline::new(
        client(&server),
        OrchestratorSettings {
            structured_output: false,
            ..settings(ExecutionStrategy::Concurrent, Duration::from_secs(10))
        },
    );
    let result = pipeline.synthesize(SAMPLE_TEXT).await.unwrap();

    assert_eq!(result.foundational_assumptions.len(), 2);
    assert_eq!(result.sentence_analyses[1].tactics[0].tactic_name, "Ad Hominem");

    let requests = server.received_requests().await.unwrap();
    assert!(requests.iter().all(|request| {
        let body: Value = serde_json::from_slice(&request.body).unwrap();
        body.get("tools").is_none() && body.get("tool_choice").is_none()
    }));
}

#[tokio::test]
async fn test_rate_limit_is_retried() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/messages"))
        .and(body_partial_json(json!({
            "tool_choice": {"type": "tool", "name": Facet::Assumptions.tool_name()}
        })))
        .respond_with(ResponseTemplate::new(429).insert_header("retry-after", "1"))
        .up_to_n_times(1)
        .with_priority(1)
        .mount(&server)
        .await;
    mount_tool_reply(&server, Facet::Assumptions, assumptions_json()).await;
    mount_tool_reply(&server, Facet::Sentences, sentences_json()).await;
    mount_tool_reply(&server, Facet::Omissions, omissions_json()).await;

    let pipeline = DeconstructionPipeline::new(
        client(&server),
        settings(ExecutionStrategy::Sequential, Duration::from_secs(10)),
    );
    let result = pipeline.synthesize(SAMPLE_TEXT).await.unwrap();

    assert_eq!(result.foundational_assumptions.len(), 2);
    assert_eq!(server.received_requests().await.unwrap().len(), 4);
}

#[tokio::test]
async fn test_server_errors_produce_error_result() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/messages"))
        .and(header("x-api-key", "test-api-key"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({
            "type": "error",
            "error": {"type": "api_error", "message": "Internal server error"}
        })))
        .mount(&server)
        .await;

    let pipeline = DeconstructionPipeline::new(
        client(&server),
        settings(ExecutionStrategy::Concurrent, Duration::from_secs(10)),
    );
    let result = pipeline.synthesize(SAMPLE_TEXT).await.unwrap();

    assert!(result.foundational_assumptions[0].starts_with("Analysis failed: "));
    assert!(result.foundational_assumptions[0].contains("Internal server error"));
    assert!(result.sentence_analyses.iter().all(|s| s.bias_score == 0.0));
}

#[tokio::test]
async fn test_missing_omissions_mock_falls_back() {
    let server = MockServer::start().await;
    mount_tool_reply(&server, Facet::Assumptions, assumptions_json()).await;
    mount_tool_reply(&server, Facet::Sentences, sentences_json()).await;

    let pipeline = DeconstructionPipeline::new(
        client(&server),
        settings(ExecutionStrategy::Concurrent, Duration::from_secs(10)),
    );
    let result = pipeline.synthesize(SAMPLE_TEXT).await.unwrap();

    assert_eq!(result.sentence_analyses.len(), 2);
    assert_eq!(result.omissions, Some(fallback_omissions()));
}
