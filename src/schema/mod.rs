//! Result types and per-facet output contracts.

mod contracts;
mod types;

pub use contracts::{
    validate_assumptions, validate_omission, validate_result, validate_sentence,
    AssumptionsPayload, Facet, OmissionsPayload, SentencesPayload, MAX_ASSUMPTIONS,
};
pub use types::{
    clamp_bias_score, split_sentences, AnalysisResult, Omission, SentenceAnalysis, Tactic,
    MAX_BIAS_SCORE, MIN_BIAS_SCORE,
};
