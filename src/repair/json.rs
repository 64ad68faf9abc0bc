//! Lenient JSON decoding for model output.
//!
//! Decoding is one strict attempt followed by a small set of repaired
//! candidates. Repair strips markdown fences, cuts JSON out of any
//! surrounding commentary, and closes a payload that was cut off mid-stream.

use serde_json::Value;

use crate::error::AnalysisError;

/// Most opening brackets tried as the start of a repaired candidate.
const MAX_CANDIDATE_STARTS: usize = 8;

/// Decode model text into a JSON value, repairing it if needed.
///
/// # Errors
///
/// Returns [`AnalysisError::JsonParseFailed`] if neither the strict text nor
/// any repaired candidate parses.
pub fn decode_lenient(raw: &str) -> Result<Value, AnalysisError> {
    decode_lenient_where(raw, |_| true)
}

/// Like [`decode_lenient`], but prefers the first repaired candidate that
/// `accept` approves.
///
/// Commentary around the payload can hold bracketed tokens of its own, as in
/// `Here are the [3] assumptions: [...]`. Candidates are tried in order: the
/// span from the first opening bracket to the last closing one, then the
/// value starting at each opening bracket. When no candidate is accepted the
/// first one that parsed is returned.
///
/// # Errors
///
/// Returns [`AnalysisError::JsonParseFailed`] if nothing parses.
pub fn decode_lenient_where(
    raw: &str,
    accept: impl Fn(&Value) -> bool,
) -> Result<Value, AnalysisError> {
    let cleaned = strip_code_fences(raw);

    // Fast path: well-formed output
    let strict_err = match serde_json::from_str(cleaned) {
        Ok(value) => return Ok(value),
        Err(e) => e,
    };

    let mut first_parsed = None;
    let mut first_failure = None;
    for candidate in repair_candidates(cleaned) {
        match serde_json::from_str::<Value>(&candidate) {
            Ok(value) if accept(&value) => return Ok(value),
            Ok(value) => {
                first_parsed.get_or_insert(value);
            }
            Err(e) => {
                first_failure.get_or_insert((e, candidate));
            }
        }
    }

    if let Some(value) = first_parsed {
        return Ok(value);
    }

    let message = match first_failure {
        Some((e, candidate)) => format!(
            "{strict_err}; repaired text still invalid ({e}): {}",
            truncate_for_preview(&candidate, 100)
        ),
        None => format!(
            "{strict_err}; no JSON structure found in: {}",
            truncate_for_preview(raw, 100)
        ),
    };
    Err(AnalysisError::JsonParseFailed { message })
}

/// Repaired candidates for `text`, most complete first.
fn repair_candidates(text: &str) -> Vec<String> {
    let is_opener = |c: char| c == '{' || c == '[';

    let mut candidates = Vec::new();
    if let (Some(start), Some(end)) = (
        text.find(is_opener),
        text.rfind(|c: char| c == '}' || c == ']'),
    ) {
        if end > start {
            candidates.push(text[start..=end].to_string());
        }
    }

    for (start, _) in text.match_indices(is_opener).take(MAX_CANDIDATE_STARTS) {
        if let Some(repaired) = repair_json(&text[start..]) {
            if !candidates.contains(&repaired) {
                candidates.push(repaired);
            }
        }
    }
    candidates
}

/// Remove a surrounding markdown code fence and its language tag.
///
/// # Examples
///
/// ```
/// use narrative_deconstruct::repair::strip_code_fences;
///
/// assert_eq!(strip_code_fences("```json\n[\"a\"]\n```"), "[\"a\"]");
/// assert_eq!(strip_code_fences("  [1]  "), "[1]");
/// ```
#[must_use]
pub fn strip_code_fences(text: &str) -> &str {
    let mut body = text.trim();

    if let Some(rest) = body.strip_prefix("```") {
        body = match rest.find('\n') {
            Some(newline) if rest[..newline].trim().chars().all(char::is_alphanumeric) => {
                &rest[newline + 1..]
            }
            _ => rest
                .strip_prefix("json")
                .or_else(|| rest.strip_prefix("JSON"))
                .unwrap_or(rest),
        };
    }

    if let Some(rest) = body.trim_end().strip_suffix("```") {
        body = rest;
    }

    body.trim()
}

/// Produce a parseable candidate from malformed JSON text.
///
/// The first `{` or `[` starts the value. If its brackets balance, everything
/// after the matching closer is dropped. If the text ends first, the payload
/// is treated as truncated: an open string gets its quote, a dangling key or
/// colon gets `null`, a trailing comma or partial literal is removed, and the
/// open brackets are closed innermost first.
///
/// Returns `None` when there is no opening bracket or the brackets are
/// mismatched.
#[must_use]
pub fn repair_json(text: &str) -> Option<String> {
    let start = text.find(|c| c == '{' || c == '[')?;
    let body = &text[start..];

    let mut closers: Vec<char> = Vec::new();
    let mut in_string = false;
    let mut escape_next = false;
    let mut string_is_key = false;
    let mut key_pending = false;
    let mut last_significant = ' ';

    for (i, ch) in body.char_indices() {
        if in_string {
            if escape_next {
                escape_next = false;
            } else if ch == '\\' {
                escape_next = true;
            } else if ch == '"' {
                in_string = false;
                key_pending = string_is_key;
                last_significant = '"';
            }
            continue;
        }

        match ch {
            '"' => {
                in_string = true;
                string_is_key =
                    closers.last() == Some(&'}') && matches!(last_significant, '{' | ',');
            }
            '{' => closers.push('}'),
            '[' => closers.push(']'),
            '}' | ']' => {
                if closers.pop() != Some(ch) {
                    return None;
                }
                if closers.is_empty() {
                    return Some(body[..=i].to_string());
                }
            }
            ':' => key_pending = false,
            _ => {}
        }
        if !ch.is_whitespace() {
            last_significant = ch;
        }
    }

    let mut repaired = body.trim_end().to_string();

    if in_string {
        drop_partial_escape(&mut repaired);
        repaired.push('"');
        if string_is_key {
            repaired.push_str(":null");
        }
    } else {
        drop_partial_literal(&mut repaired);
        if key_pending {
            repaired.push_str(":null");
        } else if repaired.ends_with(':') {
            repaired.push_str("null");
        } else if repaired.ends_with(',') {
            repaired.pop();
        }
    }

    repaired.extend(closers.iter().rev());
    Some(repaired)
}

/// Remove a backslash escape cut off at the end of an open string.
///
/// A complete high-surrogate escape is dropped too, since its low half was
/// cut off and a lone surrogate is not valid JSON.
fn drop_partial_escape(text: &mut String) {
    while let Some(backslash) = text.rfind('\\') {
        let tail = &text[backslash + 1..];
        let partial = tail.is_empty()
            || tail.strip_prefix('u').is_some_and(|hex| {
                hex.chars().all(|c| c.is_ascii_hexdigit())
                    && (hex.len() < 4 || is_high_surrogate(hex))
            });
        if !partial {
            return;
        }
        // An even run of backslashes is a complete escape sequence.
        let run = text[..=backslash].chars().rev().take_while(|&c| c == '\\').count();
        if run % 2 == 0 {
            return;
        }
        text.truncate(backslash);
    }
}

fn is_high_surrogate(hex: &str) -> bool {
    hex.len() == 4
        && u16::from_str_radix(hex, 16).is_ok_and(|unit| (0xD800..=0xDBFF).contains(&unit))
}

/// Remove an unfinished number or literal such as `0.`, `-` or `tru`.
fn drop_partial_literal(text: &mut String) {
    let tail_len = text
        .chars()
        .rev()
        .take_while(|c| c.is_ascii_alphabetic() || matches!(c, '.' | '+' | '-'))
        .count();
    if tail_len == 0 {
        return;
    }
    let cut = text.len() - tail_len;
    if !matches!(&text[cut..], "true" | "false" | "null") {
        text.truncate(cut);
        let trimmed = text.trim_end().len();
        text.truncate(trimmed);
    }
}

/// Truncate text for previews in logs and error messages.
#[must_use]
pub fn truncate_for_preview(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}
