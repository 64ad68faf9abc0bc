//! Integration tests for the narrative deconstruction service.
//!
//! These tests drive the public API end to end:
//! - Pipeline error recovery with a scripted generative client
//! - The HTTP API over a real socket
//! - The Anthropic wire protocol against a mock server

#![allow(clippy::unwrap_used, clippy::expect_used)]

mod anthropic_wire;
mod error_recovery;
mod http_api;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use narrative_deconstruct::config::ExecutionStrategy;
use narrative_deconstruct::error::AnalysisError;
use narrative_deconstruct::orchestrator::OrchestratorSettings;
use narrative_deconstruct::prompts::get_prompt_for_facet;
use narrative_deconstruct::schema::Facet;
use narrative_deconstruct::traits::{GenerateRequest, GenerativeClientTrait, RawOutput};
use serde_json::{json, Value};

pub const SAMPLE_TEXT: &str = "Our plan is the only sensible choice. Critics are simply uninformed.";

type Reply = Result<RawOutput, AnalysisError>;

/// A generative client that answers each facet with a fixed reply.
pub struct ScriptedClient {
    assumptions: Reply,
    sentences: Reply,
    omissions: Reply,
    slow_facet: Option<(Facet, Duration)>,
    calls: Arc<AtomicUsize>,
}

impl ScriptedClient {
    pub fn new(assumptions: Reply, sentences: Reply, omissions: Reply) -> Self {
        Self {
            assumptions,
            sentences,
            omissions,
            slow_facet: None,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Every facet answers with its well-formed sample payload.
    pub fn healthy() -> Self {
        Self::new(
            Ok(RawOutput::Structured(assumptions_json())),
            Ok(RawOutput::Structured(sentences_json())),
            Ok(RawOutput::Structured(omissions_json())),
        )
    }

    /// Every facet fails with `error`.
    pub fn failing(error: &AnalysisError) -> Self {
        Self::new(Err(error.clone()), Err(error.clone()), Err(error.clone()))
    }

    /// Delay the given facet's reply.
    pub fn with_slow_facet(mut self, facet: Facet, delay: Duration) -> Self {
        self.slow_facet = Some((facet, delay));
        self
    }

    /// Shared call counter.
    pub fn calls(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.calls)
    }
}

#[async_trait]
impl GenerativeClientTrait for ScriptedClient {
    async fn generate(&self, request: GenerateRequest) -> Result<RawOutput, AnalysisError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let facet = Facet::ALL
            .into_iter()
            .find(|facet| request.system_instructions == get_prompt_for_facet(*facet))
            .expect("request carries a facet prompt");

        if let Some((slow, delay)) = self.slow_facet {
            if slow == facet {
                tokio::time::sleep(delay).await;
            }
        }

        match facet {
            Facet::Assumptions => self.assumptions.clone(),
            Facet::Sentences => self.sentences.clone(),
            Facet::Omissions => self.omissions.clone(),
        }
    }
}

pub fn settings(strategy: ExecutionStrategy, facet_timeout: Duration) -> OrchestratorSettings {
    OrchestratorSettings {
        strategy,
        facet_timeout,
        max_output_tokens: 2048,
        structured_output: true,
    }
}

pub fn assumptions_json() -> Value {
    json!({
        "foundational_assumptions": [
            "There is exactly one sensible choice",
            "Disagreement stems from ignorance"
        ]
    })
}

pub fn sentences_json() -> Value {
    json!({
        "synthesized_text": [
            {
                "sentence": "Our plan is the only sensible choice.",
                "bias_score": 0.7,
                "justification": "Frames alternatives as unreasonable",
                "tactics": [{
                    "phrase": "the only sensible choice",
                    "tactic": "False Dilemma",
                    "explanation": "Excludes alternatives without argument",
                    "type": "framing"
                }]
            },
            {
                "sentence": "Critics are simply uninformed.",
                "bias_score": -0.8,
                "justification": "Dismisses opponents instead of their arguments",
                "tactics": [{
                    "phrase": "simply uninformed",
                    "tactic": "Ad Hominem",
                    "explanation": "Attacks the critics rather than the criticism",
                    "type": "dismissal"
                }]
            }
        ]
    })
}

pub fn omissions_json() -> Value {
    json!({
        "omissions": [{
            "omitted_perspective": "The critics' actual objections",
            "potential_impact": "Readers never get to weigh the counterarguments"
        }]
    })
}
