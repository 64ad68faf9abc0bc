//! Coercion of decoded JSON into facet records.
//!
//! Values that already satisfy the facet contract pass through untouched.
//! Anything else is salvaged element by element: known field aliases are
//! accepted, numeric strings become numbers, missing fields get
//! placeholders, and elements that are not records are dropped.

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use super::fallback::{FORMAT_ERROR, UNKNOWN_OMISSION, UNKNOWN_SENTENCE};
use super::json::decode_lenient;
use crate::error::AnalysisError;
use crate::schema::{
    clamp_bias_score, validate_assumptions, validate_omission, validate_sentence, Facet, Omission,
    SentenceAnalysis, Tactic, MAX_ASSUMPTIONS,
};

/// How many wrapper objects or JSON-encoded strings are peeled off.
const MAX_NESTING: usize = 2;

const UNSPECIFIED_TACTIC: &str = "Unspecified Tactic";
const UNSPECIFIED_CATEGORY: &str = "unspecified";

/// Coerce a value into assumption statements.
pub fn assumptions(value: Value) -> Result<Vec<String>, AnalysisError> {
    let items = collection(value, Facet::Assumptions, 0)?;

    if let Some(valid) = typed::<String>(&items) {
        if validate_assumptions(&valid).is_ok() {
            return Ok(valid);
        }
    }

    let assumptions: Vec<String> = items
        .iter()
        .filter_map(assumption_text)
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
        .take(MAX_ASSUMPTIONS)
        .collect();

    non_empty(assumptions, Facet::Assumptions)
}

/// Coerce a value into per-sentence analyses.
pub fn sentences(value: Value) -> Result<Vec<SentenceAnalysis>, AnalysisError> {
    let items = collection(value, Facet::Sentences, 0)?;

    let analyses = match typed::<SentenceAnalysis>(&items) {
        Some(valid) if valid.iter().all(|s| validate_sentence(s).is_ok()) => valid,
        _ => items.iter().filter_map(sentence).collect(),
    };

    let analyses = analyses
        .into_iter()
        .map(SentenceAnalysis::with_verified_phrases)
        .collect();

    non_empty(analyses, Facet::Sentences)
}

/// Coerce a value into omissions.
pub fn omissions(value: Value) -> Result<Vec<Omission>, AnalysisError> {
    let items = collection(value, Facet::Omissions, 0)?;

    if let Some(valid) = typed::<Omission>(&items) {
        if valid.iter().all(|o| validate_omission(o).is_ok()) {
            return non_empty(valid, Facet::Omissions);
        }
    }

    let omissions = items.iter().filter_map(omission).collect();
    non_empty(omissions, Facet::Omissions)
}

/// Whether a decoded value looks like a payload for `facet`.
///
/// Picks the payload when a response holds several JSON values.
pub fn fits_shape(value: &Value, facet: Facet) -> bool {
    match value {
        Value::Array(items) if facet == Facet::Assumptions => items
            .iter()
            .all(|item| item.is_string() || item.is_object()),
        Value::Array(items) => items.iter().all(Value::is_object),
        Value::Object(map) => {
            is_record(map, facet)
                || std::iter::once(facet.wire_key())
                    .chain(facet.key_aliases().iter().copied())
                    .any(|key| map.contains_key(key))
        }
        _ => false,
    }
}

/// Find the facet's list inside whatever shape the model returned.
fn collection(value: Value, facet: Facet, depth: usize) -> Result<Vec<Value>, AnalysisError> {
    match value {
        Value::Array(items) => Ok(items),
        Value::Object(mut map) => {
            let wrapped = std::iter::once(facet.wire_key())
                .chain(facet.key_aliases().iter().copied())
                .find_map(|key| map.remove(key));

            match wrapped {
                Some(inner) if depth < MAX_NESTING => collection(inner, facet, depth + 1),
                Some(_) => Err(violation(facet, facet.wire_key(), "nested too deeply")),
                None if is_record(&map, facet) => Ok(vec![Value::Object(map)]),
                None => Err(violation(
                    facet,
                    facet.wire_key(),
                    "object holds no recognizable list",
                )),
            }
        }
        Value::String(text) => {
            // Some models return the list JSON-encoded inside a string.
            let decoded = if depth < MAX_NESTING {
                decode_lenient(&text).ok()
            } else {
                None
            };
            match decoded {
                Some(inner) if !inner.is_string() => collection(inner, facet, depth + 1),
                _ if facet == Facet::Assumptions => Ok(vec![Value::String(text)]),
                _ => Err(violation(facet, facet.wire_key(), "expected a list, got text")),
            }
        }
        Value::Null => Err(violation(facet, facet.wire_key(), "missing")),
        other if facet == Facet::Assumptions => Ok(vec![other]),
        _ => Err(violation(facet, facet.wire_key(), "expected a list")),
    }
}

fn is_record(map: &Map<String, Value>, facet: Facet) -> bool {
    let keys: &[&str] = match facet {
        Facet::Assumptions => &[],
        Facet::Sentences => &["sentence", "bias_score"],
        Facet::Omissions => &["omitted_perspective", "perspective", "potential_impact"],
    };
    keys.iter().any(|key| map.contains_key(*key))
}

/// Deserialize every element strictly, or `None` if any element differs.
fn typed<T: DeserializeOwned>(items: &[Value]) -> Option<Vec<T>> {
    items
        .iter()
        .map(|item| serde_json::from_value(item.clone()).ok())
        .collect()
}

fn assumption_text(item: &Value) -> Option<String> {
    match item {
        Value::Object(map) => field(map, &["assumption", "text", "statement"]).and_then(text),
        other => text(other),
    }
}

fn sentence(item: &Value) -> Option<SentenceAnalysis> {
    let map = item.as_object()?;

    let sentence = field(map, &["sentence", "text"])
        .and_then(text)
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| UNKNOWN_SENTENCE.to_string());
    let bias_score = field(map, &["bias_score", "score", "bias"])
        .and_then(number)
        .map_or(0.0, clamp_bias_score);
    let justification = field(map, &["justification", "reason", "rationale"])
        .and_then(text)
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| FORMAT_ERROR.to_string());
    let tactics = field(map, &["tactics"])
        .and_then(Value::as_array)
        .map(|items| items.iter().filter_map(tactic).collect())
        .unwrap_or_default();

    Some(SentenceAnalysis::new(sentence, bias_score, justification, tactics))
}

fn tactic(item: &Value) -> Option<Tactic> {
    let map = item.as_object()?;

    let phrase = field(map, &["phrase", "quote"])
        .and_then(text)
        .filter(|s| !s.trim().is_empty())?;
    let name = field(map, &["tactic", "tactic_name", "name"])
        .and_then(text)
        .unwrap_or_else(|| UNSPECIFIED_TACTIC.to_string());
    let explanation = field(map, &["explanation", "description"])
        .and_then(text)
        .unwrap_or_default();
    let category = field(map, &["type", "category"])
        .and_then(text)
        .unwrap_or_else(|| UNSPECIFIED_CATEGORY.to_string());

    Some(Tactic::new(phrase, name, explanation, category))
}

fn omission(item: &Value) -> Option<Omission> {
    let map = item.as_object()?;

    let perspective = field(map, &["omitted_perspective", "perspective", "omission"])
        .and_then(text)
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| UNKNOWN_OMISSION.to_string());
    let impact = field(map, &["potential_impact", "impact"])
        .and_then(text)
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| FORMAT_ERROR.to_string());

    Some(Omission::new(perspective, impact))
}

/// First non-null value among `names`.
fn field<'a>(map: &'a Map<String, Value>, names: &[&str]) -> Option<&'a Value> {
    names
        .iter()
        .filter_map(|name| map.get(*name))
        .find(|value| !value.is_null())
}

fn text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|n| n.is_finite())
}

fn non_empty<T>(items: Vec<T>, facet: Facet) -> Result<Vec<T>, AnalysisError> {
    if items.is_empty() {
        Err(violation(facet, facet.wire_key(), "no usable entries"))
    } else {
        Ok(items)
    }
}

fn violation(facet: Facet, field: &str, reason: &str) -> AnalysisError {
    AnalysisError::SchemaViolation {
        facet: facet.as_str().to_string(),
        field: field.to_string(),
        reason: reason.to_string(),
    }
}
