//! Offline demonstration results.
//!
//! These fixtures stand in for the live pipeline when no credentials are
//! configured. Both are deterministic and satisfy every result invariant.
//!
//! # Example
//!
//! ```
//! use narrative_deconstruct::demo::simple_result;
//!
//! let result = simple_result("The sky is blue. It is a nice day.");
//! assert_eq!(result.sentence_analyses.len(), 2);
//! assert_eq!(result.sentence_analyses[1].tactics.len(), 1);
//! ```

use crate::config::DemoFixture;
use crate::schema::{split_sentences, AnalysisResult, Omission, SentenceAnalysis, Tactic};

/// Sentences covered by the simple fixture.
const SIMPLE_SENTENCE_CAP: usize = 3;

/// Bias pattern assigned to the simple fixture's sentences.
const SIMPLE_BIAS_SCORES: [f64; SIMPLE_SENTENCE_CAP] = [0.2, -0.4, 0.1];

/// Index of the sentence that carries the demonstration tactic.
const SIMPLE_TACTIC_INDEX: usize = 1;

/// Words of the sentence used as the demonstration phrase.
const SIMPLE_PHRASE_WORDS: usize = 3;

/// Produce the result for the configured fixture.
#[must_use]
pub fn fixture_result(fixture: DemoFixture, text: &str) -> AnalysisResult {
    match fixture {
        DemoFixture::Rich => rich_result(),
        DemoFixture::Simple => simple_result(text),
    }
}

/// A hand-authored analysis of a short essay on nation-states, resources
/// and ideology. Independent of any input.
#[must_use]
pub fn rich_result() -> AnalysisResult {
    let tactics = rich_tactics();
    let tactic = |index: usize| tactics.get(index).cloned().into_iter().collect::<Vec<_>>();

    let sentences = vec![
        SentenceAnalysis::new(
            "Every country, every piece of land, has the raw potential for a happy, satisfied life.",
            0.3,
            "Presents an idealistic view that oversimplifies complex geopolitical realities and assumes universal definitions of 'happiness' and 'satisfaction'",
            Vec::new(),
        ),
        SentenceAnalysis::new(
            "But the moment external hands start extracting resources without contributing to local development.. boom, the whole balance shatters.",
            -0.7,
            "Uses loaded language and dramatic framing to portray all external resource extraction as inherently destructive, ignoring potential benefits or collaborative arrangements",
            [tactic(0), tactic(1)].concat(),
        ),
        SentenceAnalysis::new(
            "Now let's play fair.",
            -0.4,
            "Frames the following argument as inherently fair while actually introducing contested political premises",
            tactic(2),
        ),
        SentenceAnalysis::new(
            "Assume nation-states are real.",
            0.1,
            "While seemingly neutral, this assumption privileges the Westphalian state system over other forms of political organization",
            Vec::new(),
        ),
        SentenceAnalysis::new(
            "Tangible.",
            0.2,
            "Emphasizes the material reality of borders while ignoring their constructed and contested nature",
            Vec::new(),
        ),
        SentenceAnalysis::new(
            "The rightful owners of the land within their borders.",
            -0.6,
            "Presents a highly contested claim about territorial sovereignty as fact, ignoring indigenous rights and historical complexities",
            Vec::new(),
        ),
        SentenceAnalysis::new(
            "That's the common-sense view, right?",
            -0.5,
            "Uses rhetorical validation to make a contested political position seem like obvious common sense",
            tactic(3),
        ),
        SentenceAnalysis::new(
            "So if \"progress\" exists, it's only valid under the assumption that nations are using their resources well and running their ideologies efficiently.",
            0.4,
            "Makes progress conditional on national efficiency while putting 'progress' in scare quotes, suggesting skepticism about the concept itself",
            Vec::new(),
        ),
        SentenceAnalysis::new(
            "But that's where things get spicy because not everyone wants the same life.",
            -0.3,
            "Uses casual language to minimize serious ideological conflicts and cultural differences",
            tactic(4),
        ),
        SentenceAnalysis::new(
            "Cue the arrival of economic and political ideology.",
            0.2,
            "Presents ideology as something external that 'arrives' rather than something inherent to all political systems",
            Vec::new(),
        ),
        SentenceAnalysis::new(
            "And when ideals start mass-producing aspirations, you've got yourself a system of control.",
            -0.8,
            "Uses industrial metaphors to frame all ideological influence as manipulative control, ignoring legitimate political mobilization",
            tactic(5),
        ),
    ];

    let assumptions = [
        "Nation-states are the primary legitimate political units for organizing society",
        "External resource extraction is inherently exploitative rather than potentially beneficial",
        "There exists an objective measure of how well nations 'use their resources'",
        "Political ideologies are primarily systems of control rather than genuine belief systems",
        "Progress is a questionable concept that may not exist in any meaningful sense",
        "All aspirations created by ideological systems are artificially manufactured rather than authentic",
    ];

    let omissions = vec![
        Omission::new(
            "Indigenous sovereignty and land rights",
            "Fails to acknowledge that many current nation-state borders were established through colonization, ignoring indigenous claims and alternative concepts of territorial sovereignty",
        ),
        Omission::new(
            "Benefits of international trade and cooperation",
            "The framing of all external involvement as extractive ignores mutual benefits, technology transfer, and collaborative development that can result from international engagement",
        ),
        Omission::new(
            "Historical context of resource extraction",
            "Lacks discussion of how colonial histories shape current resource relationships, missing important context for understanding contemporary dynamics",
        ),
        Omission::new(
            "Alternative political organization models",
            "By assuming nation-states as the natural unit, it ignores federal systems, supranational governance, and other forms of political organization",
        ),
        Omission::new(
            "Positive aspects of ideological mobilization",
            "Framing all ideology as control mechanisms ignores how shared values and ideals can enable positive social movements and democratic participation",
        ),
    ];

    AnalysisResult::new(
        assumptions.into_iter().map(String::from).collect(),
        sentences,
        Some(omissions),
    )
}

fn rich_tactics() -> Vec<Tactic> {
    vec![
        Tactic::new(
            "external hands start extracting",
            "Loaded Language",
            "Uses emotionally charged language to frame resource extraction as inherently exploitative",
            "framing",
        ),
        Tactic::new(
            "boom, the whole balance shatters",
            "Dramatic Escalation",
            "Uses dramatic language to amplify the perceived consequences",
            "emotional manipulation",
        ),
        Tactic::new(
            "Now let's play fair",
            "False Fairness Appeal",
            "Presents a biased premise as if it's the fair or reasonable position",
            "false premise",
        ),
        Tactic::new(
            "That's the common-sense view, right?",
            "Rhetorical Validation",
            "Uses rhetorical questions to make contested claims seem obvious",
            "consensus manipulation",
        ),
        Tactic::new(
            "things get spicy",
            "Casual Metaphor",
            "Uses informal language to normalize complex political-economic conflicts",
            "minimization",
        ),
        Tactic::new(
            "mass-producing aspirations",
            "Industrial Metaphor",
            "Frames human desires and goals as manufactured products to suggest manipulation",
            "mechanistic framing",
        ),
    ]
}

/// A small result derived from the leading sentences of `text`.
///
/// Up to three sentences get the fixed bias pattern `0.2, -0.4, 0.1`; the
/// second one also carries a demonstration tactic quoting its first words.
#[must_use]
pub fn simple_result(text: &str) -> AnalysisResult {
    let sentences = split_sentences(text, SIMPLE_SENTENCE_CAP)
        .into_iter()
        .enumerate()
        .map(|(index, sentence)| {
            let bias_score = SIMPLE_BIAS_SCORES.get(index).copied().unwrap_or(0.0);
            let direction = if bias_score > 0.0 { "toward" } else { "against" };
            let justification = format!(
                "Demo analysis: This sentence shows {:.1} level of bias {direction} the presented viewpoint.",
                bias_score.abs()
            );
            let tactics = if index == SIMPLE_TACTIC_INDEX {
                vec![demo_tactic(&sentence)]
            } else {
                Vec::new()
            };
            SentenceAnalysis::new(sentence, bias_score, justification, tactics)
        })
        .collect();

    AnalysisResult::new(
        vec![
            "Demo assumption: This is an example of a foundational assumption that would be identified".to_string(),
            "Demo assumption: Another example assumption underlying the argument".to_string(),
        ],
        sentences,
        Some(vec![Omission::new(
            "Alternative viewpoint demonstration",
            "This shows how missing perspectives would be identified in the analysis",
        )]),
    )
}

fn demo_tactic(sentence: &str) -> Tactic {
    let words: Vec<&str> = sentence.split_whitespace().collect();
    let phrase = if words.len() >= SIMPLE_PHRASE_WORDS {
        words[..SIMPLE_PHRASE_WORDS].join(" ")
    } else {
        sentence.to_string()
    };

    Tactic::new(
        phrase,
        "Sample Tactic",
        "This is a demonstration of how rhetorical tactics would be identified",
        "demo",
    )
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use crate::schema::validate_result;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_rich_result_shape() {
        let result = rich_result();
        assert_eq!(result.foundational_assumptions.len(), 6);
        assert_eq!(result.sentence_analyses.len(), 11);
        assert_eq!(result.omissions.as_ref().unwrap().len(), 5);

        let tactic_count: usize = result.sentence_analyses.iter().map(|s| s.tactics.len()).sum();
        assert_eq!(tactic_count, 6);
        assert_eq!(result.sentence_analyses[1].tactics.len(), 2);
        assert!(validate_result(&result).is_ok());
    }

    #[test]
    fn test_rich_tactic_phrases_occur_in_their_sentences() {
        for analysis in rich_result().sentence_analyses {
            for tactic in &analysis.tactics {
                assert!(
                    analysis.sentence.contains(&tactic.phrase),
                    "{:?} not in {:?}",
                    tactic.phrase,
                    analysis.sentence
                );
            }
        }
    }

    #[test]
    fn test_simple_result_pattern() {
        let result = simple_result("The sky is blue. It is a nice day. Birds sing. Rain falls.");
        let scores: Vec<f64> = result.sentence_analyses.iter().map(|s| s.bias_score).collect();
        assert_eq!(scores, vec![0.2, -0.4, 0.1]);

        assert!(result.sentence_analyses[0].tactics.is_empty());
        assert!(result.sentence_analyses[2].tactics.is_empty());
        let tactic = &result.sentence_analyses[1].tactics[0];
        assert_eq!(tactic.phrase, "It is a");
        assert_eq!(tactic.category, "demo");

        assert_eq!(
            result.sentence_analyses[1].justification,
            "Demo analysis: This sentence shows 0.4 level of bias against the presented viewpoint."
        );
        assert_eq!(
            result.sentence_analyses[0].justification,
            "Demo analysis: This sentence shows 0.2 level of bias toward the presented viewpoint."
        );
    }

    #[test]
    fn test_simple_result_short_second_sentence() {
        let result = simple_result("First one here. Short.");
        assert_eq!(result.sentence_analyses[1].tactics[0].phrase, "Short.");
    }

    #[test]
    fn test_simple_result_is_deterministic() {
        let text = "Markets always win. Regulation kills growth.";
        assert_eq!(simple_result(text), simple_result(text));
    }

    #[test]
    fn test_fixture_result_selects_variant() {
        assert_eq!(fixture_result(DemoFixture::Rich, "ignored"), rich_result());
        assert_eq!(
            fixture_result(DemoFixture::Simple, "One. Two."),
            simple_result("One. Two.")
        );
    }
}
