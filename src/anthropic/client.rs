//! Anthropic Messages API client.
//!
//! One facet request becomes one `POST /messages` call. Transient failures
//! (rate limiting, overload, timeouts, connection errors) are retried with
//! exponential backoff; everything else fails fast so the pipeline can fall
//! back without burning its time budget.

#![allow(clippy::missing_errors_doc)]

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::header::HeaderMap;
use reqwest::{Client, StatusCode};
use tracing::{debug, error, warn};

use super::config::ClientConfig;
use super::types::{
    ApiMessage, ApiRequest, ApiResponse, ContentBlock, ErrorEnvelope, GenerationResponse,
    ToolDefinition, ToolUseResult,
};
use crate::config::SecretString;
use crate::error::{AnalysisError, AnthropicError};
use crate::traits::{GenerateRequest, GenerativeClientTrait, RawOutput};

/// Maximum number of messages per request.
pub const MAX_MESSAGES: usize = 50;
/// Maximum content length per message in bytes.
pub const MAX_CONTENT_LENGTH: usize = 50_000;

/// Anthropic API version header value.
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Seconds assumed when a 429 carries no usable `retry-after`.
const DEFAULT_RETRY_AFTER_SECS: u64 = 60;

/// Anthropic API client.
#[derive(Debug)]
pub struct AnthropicClient {
    http: Client,
    api_key: SecretString,
    config: ClientConfig,
}

impl AnthropicClient {
    /// Create a new Anthropic client.
    pub fn new(
        api_key: impl Into<SecretString>,
        config: ClientConfig,
    ) -> Result<Self, AnthropicError> {
        let http = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| AnthropicError::Network {
                message: format!("Failed to create HTTP client: {e}"),
            })?;

        Ok(Self {
            http,
            api_key: api_key.into(),
            config,
        })
    }

    /// Create a client with default configuration.
    pub fn with_api_key(api_key: impl Into<SecretString>) -> Result<Self, AnthropicError> {
        Self::new(api_key, ClientConfig::default())
    }

    /// Get the base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    /// Get the client configuration.
    #[must_use]
    pub const fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Send a Messages API request, retrying transient failures.
    pub async fn complete(
        &self,
        request: ApiRequest,
    ) -> Result<GenerationResponse, AnthropicError> {
        check_limits(&request)?;

        let mut attempt = 0;
        loop {
            match self.send_once(&request).await {
                Ok(response) => return Ok(response),
                Err(e) if e.is_retryable() && attempt < self.config.max_retries => {
                    attempt += 1;
                    let delay = backoff_delay(self.config.retry_delay_ms, attempt);
                    warn!(
                        error = %e,
                        attempt,
                        delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                        "Retrying Anthropic request"
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn send_once(&self, request: &ApiRequest) -> Result<GenerationResponse, AnthropicError> {
        let url = format!("{}/messages", self.config.base_url);
        let start = Instant::now();

        let response = self
            .http
            .post(&url)
            .header("x-api-key", self.api_key.expose())
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(request)
            .send()
            .await
            .map_err(|e| {
                error!(url = %url, elapsed_ms = elapsed_ms(start), error = %e, "Anthropic request failed");
                if e.is_timeout() {
                    AnthropicError::Timeout {
                        timeout_ms: self.config.timeout_ms,
                    }
                } else {
                    AnthropicError::Network {
                        message: e.to_string(),
                    }
                }
            })?;

        let status = response.status();
        debug!(status = %status, elapsed_ms = elapsed_ms(start), "Anthropic response received");

        if !status.is_success() {
            let headers = response.headers().clone();
            let body = response.text().await.unwrap_or_default();
            return Err(classify_status(status, &headers, &body, &request.model));
        }

        let body: ApiResponse =
            response
                .json()
                .await
                .map_err(|e| AnthropicError::UnexpectedResponse {
                    message: format!("Failed to parse response: {e}"),
                })?;

        collect_content(body)
    }

    /// Translate a facet request into a Messages API request.
    ///
    /// With an output schema the model is forced to call a tool whose input
    /// schema is the facet contract.
    fn to_api_request(&self, request: &GenerateRequest) -> ApiRequest {
        let api_request = ApiRequest::new(
            &self.config.model,
            request.max_output_tokens,
            vec![ApiMessage::user(&request.input_text)],
        )
        .with_system(&request.system_instructions)
        .with_temperature(f64::from(request.temperature));

        match &request.output_schema {
            Some(schema) => api_request.forcing_tool(ToolDefinition::new(
                &schema.name,
                &schema.description,
                schema.schema.clone(),
            )),
            None => api_request,
        }
    }
}

#[async_trait]
impl GenerativeClientTrait for AnthropicClient {
    async fn generate(&self, request: GenerateRequest) -> Result<RawOutput, AnalysisError> {
        let response = self
            .complete(self.to_api_request(&request))
            .await
            .map_err(|e| AnalysisError::ApiUnavailable {
                message: e.to_string(),
            })?;

        if response.is_truncated() {
            warn!(
                output_tokens = response.usage.output_tokens,
                schema = ?request.schema_name(),
                "Model output truncated at token limit"
            );
        }

        let structured = request
            .schema_name()
            .and_then(|name| response.tool_input(name))
            .cloned();

        Ok(structured.map_or(RawOutput::Text(response.raw_text), RawOutput::Structured))
    }
}

/// Reject requests the API would refuse for size.
fn check_limits(request: &ApiRequest) -> Result<(), AnthropicError> {
    if request.messages.len() > MAX_MESSAGES {
        return Err(AnthropicError::InvalidRequest {
            message: format!(
                "Too many messages: {} > {MAX_MESSAGES}",
                request.messages.len()
            ),
        });
    }

    if let Some(msg) = request
        .messages
        .iter()
        .find(|msg| msg.content.len() > MAX_CONTENT_LENGTH)
    {
        return Err(AnthropicError::InvalidRequest {
            message: format!(
                "Message too large: {} > {MAX_CONTENT_LENGTH}",
                msg.content.len()
            ),
        });
    }

    Ok(())
}

/// Delay before retry number `attempt` (1-based).
fn backoff_delay(base_ms: u64, attempt: u32) -> Duration {
    let factor = 1u64.checked_shl(attempt.saturating_sub(1)).unwrap_or(u64::MAX);
    Duration::from_millis(base_ms.saturating_mul(factor))
}

/// Map a non-2xx response to an error.
fn classify_status(
    status: StatusCode,
    headers: &HeaderMap,
    body: &str,
    model: &str,
) -> AnthropicError {
    match status.as_u16() {
        401 => AnthropicError::AuthenticationFailed,
        429 => AnthropicError::RateLimited {
            retry_after_seconds: headers
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(DEFAULT_RETRY_AFTER_SECS),
        },
        529 => AnthropicError::ModelOverloaded {
            model: model.to_string(),
        },
        400 => AnthropicError::InvalidRequest {
            message: error_detail(body),
        },
        _ => AnthropicError::UnexpectedResponse {
            message: format!("Status {status}: {}", error_detail(body)),
        },
    }
}

/// The API's own error message when the body carries one.
fn error_detail(body: &str) -> String {
    serde_json::from_str::<ErrorEnvelope>(body).map_or_else(
        |_| body.to_string(),
        |parsed| format!("{}: {}", parsed.error.kind, parsed.error.message),
    )
}

/// Split response content into text and tool calls.
fn collect_content(response: ApiResponse) -> Result<GenerationResponse, AnthropicError> {
    let mut texts = Vec::new();
    let mut tool_uses = Vec::new();

    for block in response.content {
        match block {
            ContentBlock::Text { text } => texts.push(text),
            ContentBlock::ToolUse { name, input } => tool_uses.push(ToolUseResult { name, input }),
            ContentBlock::Other => {}
        }
    }

    if texts.is_empty() && tool_uses.is_empty() {
        return Err(AnthropicError::UnexpectedResponse {
            message: "No content in response".to_string(),
        });
    }

    debug!(
        message_id = %response.id,
        model = %response.model,
        input_tokens = response.usage.input_tokens,
        output_tokens = response.usage.output_tokens,
        stop_reason = ?response.stop_reason,
        tool_calls = tool_uses.len(),
        "Anthropic response parsed"
    );

    Ok(GenerationResponse {
        raw_text: texts.join("\n"),
        tool_uses,
        usage: response.usage,
        stop_reason: response.stop_reason,
    })
}

fn elapsed_ms(start: Instant) -> u64 {
    u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::float_cmp
)]
mod tests {
    use super::*;
    use crate::traits::OutputSchema;
    use reqwest::header::HeaderValue;
    use serde_json::{json, Value};
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;
    use test_case::test_case;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer, max_retries: u32) -> AnthropicClient {
        let config = ClientConfig::default()
            .with_base_url(server.uri())
            .with_max_retries(max_retries)
            .with_retry_delay_ms(5)
            .with_timeout_ms(5_000);
        AnthropicClient::new("test-api-key", config).unwrap()
    }

    fn message(content: Vec<Value>, stop_reason: &str) -> Value {
        json!({
            "id": "msg_01",
            "content": content,
            "model": "claude-sonnet-4-20250514",
            "usage": {"input_tokens": 42, "output_tokens": 17},
            "stop_reason": stop_reason
        })
    }

    fn omissions_request() -> GenerateRequest {
        GenerateRequest::new("Find omissions.", "The plan is flawless.", 1024).with_output_schema(
            OutputSchema::new("record_omissions", "Record omissions.", json!({"type": "object"})),
        )
    }

    #[test]
    fn test_client_debug_redacts_key() {
        let client = AnthropicClient::with_api_key("sk-ant-secret").unwrap();
        assert_eq!(client.base_url(), "https://api.anthropic.com/v1");
        assert!(!format!("{client:?}").contains("sk-ant-secret"));
    }

    #[test_case(1, 100 ; "first retry")]
    #[test_case(2, 200 ; "second retry")]
    #[test_case(4, 800 ; "fourth retry")]
    fn test_backoff_delay(attempt: u32, expected_ms: u64) {
        assert_eq!(backoff_delay(100, attempt), Duration::from_millis(expected_ms));
    }

    #[test]
    fn test_backoff_delay_saturates() {
        assert_eq!(backoff_delay(u64::MAX, 3), Duration::from_millis(u64::MAX));
        assert_eq!(backoff_delay(10, 200), Duration::from_millis(u64::MAX));
    }

    #[test]
    fn test_check_limits() {
        let too_many: Vec<ApiMessage> = (0..=MAX_MESSAGES).map(|i| ApiMessage::user(format!("m{i}"))).collect();
        let err = check_limits(&ApiRequest::new("m", 10, too_many)).unwrap_err();
        assert!(err.to_string().contains("Too many messages"));

        let huge = ApiRequest::new("m", 10, vec![ApiMessage::user("x".repeat(MAX_CONTENT_LENGTH + 1))]);
        let err = check_limits(&huge).unwrap_err();
        assert!(err.to_string().contains("Message too large"));

        assert!(check_limits(&ApiRequest::new("m", 10, vec![ApiMessage::user("ok")])).is_ok());
    }

    #[test_case(401, "" => AnthropicError::AuthenticationFailed ; "unauthorized")]
    #[test_case(529, "" => AnthropicError::ModelOverloaded { model: "claude-x".into() } ; "overloaded")]
    #[test_case(429, "" => AnthropicError::RateLimited { retry_after_seconds: DEFAULT_RETRY_AFTER_SECS } ; "rate limited without header")]
    #[test_case(
        400,
        r#"{"type":"error","error":{"type":"invalid_request_error","message":"max_tokens: too large"}}"#
        => AnthropicError::InvalidRequest { message: "invalid_request_error: max_tokens: too large".into() }
        ; "bad request with error body"
    )]
    #[test_case(500, "boom" => AnthropicError::UnexpectedResponse { message: "Status 500 Internal Server Error: boom".into() } ; "server error")]
    fn test_classify_status(code: u16, body: &str) -> AnthropicError {
        classify_status(
            StatusCode::from_u16(code).unwrap(),
            &HeaderMap::new(),
            body,
            "claude-x",
        )
    }

    #[test]
    fn test_classify_status_reads_retry_after() {
        let mut headers = HeaderMap::new();
        headers.insert("retry-after", HeaderValue::from_static("30"));
        assert_eq!(
            classify_status(StatusCode::TOO_MANY_REQUESTS, &headers, "", "m"),
            AnthropicError::RateLimited {
                retry_after_seconds: 30
            }
        );
    }

    #[test]
    fn test_collect_content_joins_text_and_keeps_tools() {
        let response: ApiResponse = serde_json::from_value(message(
            vec![
                json!({"type": "text", "text": "first"}),
                json!({"type": "thinking", "thinking": "ignored"}),
                json!({"type": "text", "text": "second"}),
                json!({"type": "tool_use", "id": "tu_1", "name": "record_omissions", "input": {"omissions": []}}),
            ],
            "tool_use",
        ))
        .unwrap();

        let parsed = collect_content(response).unwrap();
        assert_eq!(parsed.raw_text, "first\nsecond");
        assert_eq!(parsed.tool_input("record_omissions"), Some(&json!({"omissions": []})));
    }

    #[test]
    fn test_collect_content_rejects_empty() {
        let response: ApiResponse = serde_json::from_value(message(vec![], "end_turn")).unwrap();
        assert!(matches!(
            collect_content(response),
            Err(AnthropicError::UnexpectedResponse { .. })
        ));
    }

    #[tokio::test]
    async fn test_generate_forces_tool_and_returns_structured() {
        let server = MockServer::start().await;
        let input = json!({"omissions": [{"omitted_perspective": "P", "potential_impact": "I"}]});

        Mock::given(method("POST"))
            .and(path("/messages"))
            .and(header("x-api-key", "test-api-key"))
            .and(header("anthropic-version", ANTHROPIC_VERSION))
            .and(body_partial_json(json!({
                "model": "claude-sonnet-4-20250514",
                "system": "Find omissions.",
                "temperature": 0.0,
                "tool_choice": {"type": "tool", "name": "record_omissions"}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(message(
                vec![json!({"type": "tool_use", "id": "tu_1", "name": "record_omissions", "input": input})],
                "tool_use",
            )))
            .expect(1)
            .mount(&server)
            .await;

        let output = client_for(&server, 0).generate(omissions_request()).await.unwrap();
        assert_eq!(output, RawOutput::Structured(input));
    }

    #[tokio::test]
    async fn test_generate_returns_text_when_tool_not_called() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/messages"))
            .respond_with(ResponseTemplate::new(200).set_body_json(message(
                vec![json!({"type": "text", "text": "[\"Text\"]"})],
                "end_turn",
            )))
            .mount(&server)
            .await;

        let output = client_for(&server, 0).generate(omissions_request()).await.unwrap();
        assert_eq!(output, RawOutput::Text("[\"Text\"]".to_string()));
    }

    #[tokio::test]
    async fn test_generate_without_schema_sends_no_tools() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/messages"))
            .respond_with(move |req: &wiremock::Request| {
                let body: Value = serde_json::from_slice(&req.body).unwrap();
                let text = if body.get("tools").is_none() { "plain" } else { "tools" };
                ResponseTemplate::new(200)
                    .set_body_json(message(vec![json!({"type": "text", "text": text})], "end_turn"))
            })
            .mount(&server)
            .await;

        let request = GenerateRequest::new("Analyse.", "Text.", 512);
        let output = client_for(&server, 0).generate(request).await.unwrap();
        assert_eq!(output, RawOutput::Text("plain".to_string()));
    }

    #[tokio::test]
    async fn test_transient_failure_is_retried() {
        let server = MockServer::start().await;
        let calls = Arc::new(AtomicU32::new(0));
        let counter = Arc::clone(&calls);

        Mock::given(method("POST"))
            .and(path("/messages"))
            .respond_with(move |_: &wiremock::Request| {
                if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                    ResponseTemplate::new(529)
                } else {
                    ResponseTemplate::new(200)
                        .set_body_json(message(vec![json!({"type": "text", "text": "ok"})], "end_turn"))
                }
            })
            .mount(&server)
            .await;

        let request = ApiRequest::new("claude-x", 100, vec![ApiMessage::user("Hi")]);
        let response = client_for(&server, 1).complete(request).await.unwrap();
        assert_eq!(response.raw_text, "ok");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_retries_are_bounded() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/messages"))
            .respond_with(ResponseTemplate::new(529))
            .expect(3)
            .mount(&server)
            .await;

        let request = ApiRequest::new("claude-x", 100, vec![ApiMessage::user("Hi")]);
        let err = client_for(&server, 2).complete(request).await.unwrap_err();
        assert!(matches!(err, AnthropicError::ModelOverloaded { .. }));
    }

    #[tokio::test]
    async fn test_auth_failure_is_not_retried() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/messages"))
            .respond_with(ResponseTemplate::new(401))
            .expect(1)
            .mount(&server)
            .await;

        let err = client_for(&server, 3).generate(omissions_request()).await.unwrap_err();
        assert_eq!(
            err,
            AnalysisError::ApiUnavailable {
                message: "Authentication failed: invalid API key".to_string()
            }
        );
    }
}
