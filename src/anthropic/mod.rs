//! Anthropic Messages API backend for the facet calls.
//!
//! When a [`GenerateRequest`](crate::traits::GenerateRequest) carries an
//! output schema, the schema is sent as the only tool and the model is
//! required to call it, so the tool input is the decoded answer.

mod client;
mod config;
mod types;

pub use client::{AnthropicClient, MAX_CONTENT_LENGTH, MAX_MESSAGES};
pub use config::{ClientConfig, DEFAULT_MAX_RETRIES, DEFAULT_RETRY_DELAY_MS, DEFAULT_TIMEOUT_MS};
pub use types::{
    ApiMessage, ApiRequest, ApiResponse, ApiUsage, ContentBlock, ErrorEnvelope, ErrorPayload,
    GenerationResponse, Role, ToolChoice, ToolDefinition, ToolUseResult,
};
