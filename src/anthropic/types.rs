//! Wire types for the Messages API.
//!
//! Only the subset the facet calls need is modelled: a single user turn,
//! an optional system prompt and at most one forced tool.

#![allow(clippy::missing_const_for_fn)]
#![allow(clippy::derive_partial_eq_without_eq)]

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Body of `POST /messages`.
#[derive(Debug, Clone, Serialize)]
pub struct ApiRequest {
    /// Model identifier.
    pub model: String,
    /// Output token budget.
    pub max_tokens: u32,
    /// Conversation turns.
    pub messages: Vec<ApiMessage>,
    /// System prompt.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
    /// Sampling temperature.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    /// Tools offered to the model.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<ToolDefinition>,
    /// Tool the model must call.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_choice: Option<ToolChoice>,
}

impl ApiRequest {
    /// Request with no system prompt, temperature or tools.
    #[must_use]
    pub fn new(model: impl Into<String>, max_tokens: u32, messages: Vec<ApiMessage>) -> Self {
        Self {
            model: model.into(),
            max_tokens,
            messages,
            system: None,
            temperature: None,
            tools: Vec::new(),
            tool_choice: None,
        }
    }

    /// Set the system prompt.
    #[must_use]
    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    /// Set the sampling temperature.
    #[must_use]
    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Offer exactly one tool and require the model to call it.
    #[must_use]
    pub fn forcing_tool(mut self, tool: ToolDefinition) -> Self {
        self.tool_choice = Some(ToolChoice::Tool {
            name: tool.name.clone(),
        });
        self.tools = vec![tool];
        self
    }
}

/// Speaker of a message.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The caller.
    User,
    /// The model.
    Assistant,
}

/// One conversation turn with plain string content.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ApiMessage {
    /// Speaker.
    pub role: Role,
    /// Turn text.
    pub content: String,
}

impl ApiMessage {
    /// A user turn.
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// A tool whose input schema doubles as the output contract.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ToolDefinition {
    /// Tool name.
    pub name: String,
    /// What the tool records.
    pub description: String,
    /// JSON Schema the tool input must satisfy.
    pub input_schema: Value,
}

impl ToolDefinition {
    /// Create a tool definition.
    #[must_use]
    pub fn new(name: impl Into<String>, description: impl Into<String>, input_schema: Value) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            input_schema,
        }
    }
}

/// How the model may use the offered tools.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ToolChoice {
    /// Must call the named tool.
    Tool {
        /// Tool name.
        name: String,
    },
}

/// Body of a successful `POST /messages` response.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiResponse {
    /// Message id.
    pub id: String,
    /// Model that answered.
    pub model: String,
    /// Content blocks in order.
    pub content: Vec<ContentBlock>,
    /// Token usage.
    pub usage: ApiUsage,
    /// `end_turn`, `max_tokens`, `tool_use`, ...
    #[serde(default)]
    pub stop_reason: Option<String>,
}

/// A response content block.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    /// Free text.
    Text {
        /// The text.
        text: String,
    },
    /// A tool call; `input` is the structured answer.
    ToolUse {
        /// Tool name.
        name: String,
        /// Tool input.
        input: Value,
    },
    /// Thinking and other blocks the facets ignore.
    #[serde(other)]
    Other,
}

/// Token accounting.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
pub struct ApiUsage {
    /// Prompt tokens.
    pub input_tokens: u32,
    /// Generated tokens.
    pub output_tokens: u32,
}

/// A tool call extracted from a response.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolUseResult {
    /// Tool name.
    pub name: String,
    /// Tool input.
    pub input: Value,
}

/// A parsed response, flattened for the facet caller.
#[derive(Debug, Clone)]
pub struct GenerationResponse {
    /// Text blocks joined by newlines.
    pub raw_text: String,
    /// Tool calls in response order.
    pub tool_uses: Vec<ToolUseResult>,
    /// Token usage.
    pub usage: ApiUsage,
    /// Why generation stopped.
    pub stop_reason: Option<String>,
}

impl GenerationResponse {
    /// The model ran out of output budget.
    #[must_use]
    pub fn is_truncated(&self) -> bool {
        self.stop_reason.as_deref() == Some("max_tokens")
    }

    /// Input of the first call to `name`.
    #[must_use]
    pub fn tool_input(&self, name: &str) -> Option<&Value> {
        self.tool_uses
            .iter()
            .find_map(|call| (call.name == name).then_some(&call.input))
    }
}

/// Error body returned with non-2xx statuses.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorEnvelope {
    /// Error details.
    pub error: ErrorPayload,
}

/// The `error` object of an [`ErrorEnvelope`].
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorPayload {
    /// e.g. `invalid_request_error`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Human-readable message.
    pub message: String,
}
