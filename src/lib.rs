//! Narrative Deconstruction Service
//!
//! Breaks a persuasive text down into the assumptions it rests on, a
//! per-sentence bias score with the rhetorical tactics each sentence uses,
//! and the perspectives it leaves out, using the Anthropic Claude API.
//!
//! # Features
//!
//! - Three independent analysis facets, run concurrently
//! - Forced tool-use structured output with lenient JSON repair
//! - Per-facet fallbacks so one bad answer never sinks a request
//! - Offline demonstration fixtures
//! - Small HTTP API with optional bearer-token gate
//!
//! # Quick Start
//!
//! ```bash
//! ANTHROPIC_API_KEY=sk-ant-xxx ./narrative-deconstruct
//! curl -X POST localhost:8000/api/v1/synthesize -d '{"text":"..."}' \
//!      -H 'content-type: application/json'
//! ```
//!
//! # Architecture
//!
//! ```text
//!              ┌──────────────┐  assumptions  ┌───────────────┐
//! POST text ──▶│ Orchestrator │── sentences ─▶│ Anthropic API │
//!              └──────┬───────┘  omissions    └───────────────┘
//!                     │ raw facet outputs
//!                     ▼
//!              ┌──────────────┐      ┌─────────────┐
//!              │    Repair    │─────▶│ Synthesizer │──▶ AnalysisResult
//!              └──────────────┘      └─────────────┘
//! ```

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod anthropic;
pub mod config;
pub mod demo;
pub mod error;
pub mod orchestrator;
pub mod prompts;
pub mod repair;
pub mod schema;
pub mod server;
pub mod synthesis;
pub mod traits;

#[cfg(test)]
mod test_utils;
