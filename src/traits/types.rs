//! Request and response types for the generative client seam.
//!
//! - [`GenerateRequest`]: instructions, input text and an optional schema
//! - [`OutputSchema`]: the structured output the model is asked to emit
//! - [`RawOutput`]: what came back, decoded or not

use serde_json::Value;

/// Temperature used for every analysis call.
pub const ANALYSIS_TEMPERATURE: f32 = 0.0;

/// A named JSON Schema the model must fill in.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputSchema {
    /// Identifier for the output, used as the tool name.
    pub name: String,
    /// Short description of what to record.
    pub description: String,
    /// JSON Schema of the output object.
    pub schema: Value,
}

impl OutputSchema {
    /// Create a new output schema.
    #[must_use]
    pub fn new(name: impl Into<String>, description: impl Into<String>, schema: Value) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            schema,
        }
    }
}

/// One generation request.
#[derive(Debug, Clone, PartialEq)]
// Cannot derive Eq: f32 temperature field does not implement Eq
#[allow(clippy::derive_partial_eq_without_eq)]
pub struct GenerateRequest {
    /// Task instructions sent as the system prompt.
    pub system_instructions: String,
    /// The text under analysis.
    pub input_text: String,
    /// Structured output contract; `None` asks for plain text.
    pub output_schema: Option<OutputSchema>,
    /// Output token budget.
    pub max_output_tokens: u32,
    /// Sampling temperature.
    pub temperature: f32,
}

impl GenerateRequest {
    /// Create a plain-text request with the analysis temperature.
    #[must_use]
    pub fn new(
        system_instructions: impl Into<String>,
        input_text: impl Into<String>,
        max_output_tokens: u32,
    ) -> Self {
        Self {
            system_instructions: system_instructions.into(),
            input_text: input_text.into(),
            output_schema: None,
            max_output_tokens,
            temperature: ANALYSIS_TEMPERATURE,
        }
    }

    /// Ask for output conforming to `schema`.
    #[must_use]
    pub fn with_output_schema(mut self, schema: OutputSchema) -> Self {
        self.output_schema = Some(schema);
        self
    }

    /// Override the sampling temperature.
    #[must_use]
    pub const fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Name of the requested output, if structured.
    #[must_use]
    pub fn schema_name(&self) -> Option<&str> {
        self.output_schema.as_ref().map(|s| s.name.as_str())
    }
}

/// What a generation call returned.
#[derive(Debug, Clone, PartialEq)]
pub enum RawOutput {
    /// Output already decoded into JSON.
    Structured(Value),
    /// Free text, possibly containing JSON.
    Text(String),
}
