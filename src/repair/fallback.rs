//! Static substitutes used when a facet yields nothing usable.

use crate::schema::{split_sentences, Omission, SentenceAnalysis};

/// Placeholder text for a facet that could not be analysed.
pub const UNAVAILABLE: &str = "Analysis temporarily unavailable";

/// Justification given to a sentence entry that had to be patched.
pub const FORMAT_ERROR: &str = "Analysis format error";

/// Sentence text used when an entry names no sentence.
pub const UNKNOWN_SENTENCE: &str = "Unknown sentence";

/// Perspective text used when an omission names none.
pub const UNKNOWN_OMISSION: &str = "Unknown omission";

/// Impact text of the fallback omission.
pub const OMISSIONS_UNAVAILABLE_IMPACT: &str = "Unable to identify omissions at this time";

/// Most sentences the fallback breakdown covers.
pub const FALLBACK_SENTENCE_CAP: usize = 5;

/// Fallback for the assumptions facet.
#[must_use]
pub fn fallback_assumptions() -> Vec<String> {
    vec![UNAVAILABLE.to_string()]
}

/// Fallback for the sentence facet: a neutral entry per leading sentence.
#[must_use]
pub fn fallback_sentences(text: &str) -> Vec<SentenceAnalysis> {
    let sentences = split_sentences(text, FALLBACK_SENTENCE_CAP);
    if sentences.is_empty() {
        let whole = text.trim();
        let sentence = if whole.is_empty() { UNKNOWN_SENTENCE } else { whole };
        return vec![SentenceAnalysis::neutral(sentence, UNAVAILABLE)];
    }
    sentences
        .into_iter()
        .map(|sentence| SentenceAnalysis::neutral(sentence, UNAVAILABLE))
        .collect()
}

/// Fallback for the omissions facet.
#[must_use]
pub fn fallback_omissions() -> Vec<Omission> {
    vec![Omission::new(UNAVAILABLE, OMISSIONS_UNAVAILABLE_IMPACT)]
}
