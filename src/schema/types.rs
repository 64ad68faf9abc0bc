//! Analysis result types.
//!
//! Field names follow the wire shape served to callers: a tactic serializes
//! its name as `tactic` and its category as `type`, and the sentence list is
//! keyed `synthesized_text`.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Lowest allowed bias score.
pub const MIN_BIAS_SCORE: f64 = -1.0;

/// Highest allowed bias score.
pub const MAX_BIAS_SCORE: f64 = 1.0;

/// A rhetorical device found inside one sentence.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
pub struct Tactic {
    /// Phrase copied verbatim from the owning sentence.
    pub phrase: String,
    /// Name of the device, e.g. "Loaded Language".
    #[serde(rename = "tactic")]
    pub tactic_name: String,
    /// How the device works on the reader.
    pub explanation: String,
    /// Free-form category, e.g. "framing" or "emotional".
    #[serde(rename = "type")]
    pub category: String,
}

impl Tactic {
    /// Create a new tactic.
    #[must_use]
    pub fn new(
        phrase: impl Into<String>,
        tactic_name: impl Into<String>,
        explanation: impl Into<String>,
        category: impl Into<String>,
    ) -> Self {
        Self {
            phrase: phrase.into(),
            tactic_name: tactic_name.into(),
            explanation: explanation.into(),
            category: category.into(),
        }
    }
}

/// Bias evaluation of a single sentence.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
pub struct SentenceAnalysis {
    /// The sentence text.
    pub sentence: String,
    /// Slant from -1.0 (critical) through 0.0 (neutral) to 1.0 (promotional).
    #[schemars(range(min = -1.0, max = 1.0))]
    pub bias_score: f64,
    /// Why the score was given.
    pub justification: String,
    /// Tactics in detection order.
    pub tactics: Vec<Tactic>,
}

impl SentenceAnalysis {
    /// Create a sentence analysis, clamping the score into range.
    ///
    /// Non-finite scores are treated as neutral.
    #[must_use]
    pub fn new(
        sentence: impl Into<String>,
        bias_score: f64,
        justification: impl Into<String>,
        tactics: Vec<Tactic>,
    ) -> Self {
        Self {
            sentence: sentence.into(),
            bias_score: clamp_bias_score(bias_score),
            justification: justification.into(),
            tactics,
        }
    }

    /// A neutral entry with no tactics, used by every fallback path.
    #[must_use]
    pub fn neutral(sentence: impl Into<String>, justification: impl Into<String>) -> Self {
        Self::new(sentence, 0.0, justification, Vec::new())
    }

    /// Align tactic phrases with the sentence text.
    ///
    /// Phrases already present verbatim are left alone. A phrase that only
    /// matches ignoring case is replaced by the exact slice of the sentence.
    /// Phrases with no match at all are kept unverified.
    #[must_use]
    pub fn with_verified_phrases(mut self) -> Self {
        for tactic in &mut self.tactics {
            if self.sentence.contains(&tactic.phrase) {
                continue;
            }
            if let Some(exact) = find_ignoring_case(&self.sentence, &tactic.phrase) {
                tracing::debug!(
                    phrase = %tactic.phrase,
                    corrected = %exact,
                    "Corrected tactic phrase casing"
                );
                tactic.phrase = exact.to_string();
            } else {
                tracing::debug!(
                    phrase = %tactic.phrase,
                    sentence = %self.sentence,
                    "Tactic phrase not found in sentence"
                );
            }
        }
        self
    }
}

/// A perspective, piece of evidence or counterargument the text leaves out.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
pub struct Omission {
    /// What is missing.
    pub omitted_perspective: String,
    /// How its absence shapes the reader's understanding.
    pub potential_impact: String,
}

impl Omission {
    /// Create a new omission.
    #[must_use]
    pub fn new(omitted_perspective: impl Into<String>, potential_impact: impl Into<String>) -> Self {
        Self {
            omitted_perspective: omitted_perspective.into(),
            potential_impact: potential_impact.into(),
        }
    }
}

/// The complete deconstruction of one input text.
///
/// `omissions` distinguishes "not analysed" (`None`, serialized as `null`)
/// from "analysed, nothing found" (an empty list).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
pub struct AnalysisResult {
    /// Unstated beliefs the text relies on.
    pub foundational_assumptions: Vec<String>,
    /// Per-sentence breakdown in original order.
    #[serde(rename = "synthesized_text")]
    pub sentence_analyses: Vec<SentenceAnalysis>,
    /// Significant omissions.
    #[serde(default)]
    pub omissions: Option<Vec<Omission>>,
}

impl AnalysisResult {
    /// Create a new analysis result.
    #[must_use]
    pub const fn new(
        foundational_assumptions: Vec<String>,
        sentence_analyses: Vec<SentenceAnalysis>,
        omissions: Option<Vec<Omission>>,
    ) -> Self {
        Self {
            foundational_assumptions,
            sentence_analyses,
            omissions,
        }
    }

    /// JSON Schema of the serialized result.
    #[must_use]
    pub fn json_schema() -> serde_json::Value {
        serde_json::to_value(schemars::schema_for!(Self)).unwrap_or_default()
    }
}

/// Clamp a score into `[-1.0, 1.0]`, mapping NaN and infinities to 0.0.
#[must_use]
pub fn clamp_bias_score(score: f64) -> f64 {
    if score.is_finite() {
        score.clamp(MIN_BIAS_SCORE, MAX_BIAS_SCORE)
    } else {
        0.0
    }
}

/// Split text on periods into at most `cap` sentences.
///
/// Fragments are trimmed, empty ones dropped, and each gets its period back.
///
/// # Examples
///
/// ```
/// use narrative_deconstruct::schema::split_sentences;
///
/// let sentences = split_sentences("The sky is blue. It is a nice day.", 5);
/// assert_eq!(sentences, vec!["The sky is blue.", "It is a nice day."]);
/// ```
#[must_use]
pub fn split_sentences(text: &str, cap: usize) -> Vec<String> {
    text.split('.')
        .map(str::trim)
        .filter(|fragment| !fragment.is_empty())
        .take(cap)
        .map(|fragment| format!("{fragment}."))
        .collect()
}

/// Find `needle` in `haystack` ignoring case, returning the haystack slice.
///
/// Only attempted when lowercasing preserves byte lengths, so offsets in the
/// lowered strings are valid in the originals.
fn find_ignoring_case<'a>(haystack: &'a str, needle: &str) -> Option<&'a str> {
    if needle.trim().is_empty() {
        return None;
    }
    let lower_haystack = haystack.to_lowercase();
    let lower_needle = needle.to_lowercase();
    if lower_haystack.len() != haystack.len() || lower_needle.len() != needle.len() {
        return None;
    }
    let start = lower_haystack.find(&lower_needle)?;
    haystack.get(start..start + needle.len())
}
