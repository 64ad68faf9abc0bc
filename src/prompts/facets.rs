//! Facet analysis prompts.
//!
//! Each prompt states the task and the exact JSON shape expected, so the
//! same instructions work with forced tool output and with plain text.

#![allow(clippy::missing_const_for_fn)]

/// Prompt for the foundational assumptions facet.
#[must_use]
pub fn assumptions_prompt() -> &'static str {
    r#"You are an expert in critical thinking and epistemology. Identify the core, unstated assumptions an author must hold for their text to be coherent.

Your task is to:
1. Read the text the user provides
2. Identify 3-6 foundational assumptions the author takes for granted
3. Focus on beliefs about reality, society, human nature or the topic itself that the author expects the reader to share

Respond with a JSON object in this exact format:
{
  "foundational_assumptions": [
    "assumption 1",
    "assumption 2",
    "assumption 3"
  ]
}

Important:
- Each assumption is one short declarative sentence
- Do not restate explicit claims; name what they rest on
- Output only the JSON object"#
}

/// Prompt for the sentence-by-sentence bias and tactics facet.
#[must_use]
pub fn sentence_analysis_prompt() -> &'static str {
    r#"You are an expert in rhetoric and bias detection. Analyze every sentence of the text the user provides, in order.

For each sentence, provide:
1. A bias score from -1.0 (highly negative or critical) to 1.0 (highly positive or promotional), with 0.0 neutral
2. A brief justification for the score
3. Any rhetorical tactics found in that sentence

Tactics include:
- "Loaded Language" (emotional framing, charged words)
- "Sales Tactics" (urgency, social proof, authority appeals)

Respond with a JSON object in this exact format:
{
  "synthesized_text": [
    {
      "sentence": "exact sentence text",
      "bias_score": 0.0,
      "justification": "brief explanation",
      "tactics": [
        {
          "phrase": "exact phrase from the sentence",
          "tactic": "Loaded Language",
          "explanation": "how this works on the reader",
          "type": "emotional"
        }
      ]
    }
  ]
}

Important:
- Copy each sentence and each phrase verbatim from the text
- Use an empty tactics array when a sentence has none
- Keep justifications under 200 characters and explanations under 150
- Output only the JSON object"#
}

/// Prompt for the omissions facet.
#[must_use]
pub fn omissions_prompt() -> &'static str {
    r#"You are an expert in critical analysis and perspective-taking. Identify the important viewpoints, evidence or counterarguments missing from the text the user provides.

Your task is to:
1. State to yourself the text's central claim
2. Identify 2-4 significant omissions across these categories:
   - Stakeholder perspectives that are missing
   - Data, evidence or sources that would be needed to support the claims
   - Reasonable counterarguments that are not addressed

Respond with a JSON object in this exact format:
{
  "omissions": [
    {
      "omitted_perspective": "description of the missing viewpoint",
      "potential_impact": "how this omission shapes the reader's understanding"
    }
  ]
}

Important:
- Keep each field under 200 characters
- Output only the JSON object"#
}
