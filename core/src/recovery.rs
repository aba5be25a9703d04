//! Lenient recovery of JSON values from free-form model output.
//!
//! Model replies often wrap the formula in prose, code fences or a trailing
//! termination sentinel, and sometimes use Python-style single quotes. The
//! routines here peel those layers off with a fixed sequence of heuristics.
//!
//! Span detection is first-opener/last-closer, not a balanced scan. Stray
//! braces in the surrounding prose can therefore yield a slice that does not
//! parse; callers get a failed [`RecoveryResult`] with the raw text intact.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use crate::TERMINATION_SENTINEL;

static SENTINEL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"(?i)\b{}\b", regex::escape(TERMINATION_SENTINEL)))
        .expect("valid sentinel regex")
});

#[derive(Debug, thiserror::Error)]
pub enum RecoveryError {
    #[error(
        "Failed to parse JSON-like string. Tried raw, extracted JSON-like parts, \
         and single-quote replacement. Last error: {0}"
    )]
    Exhausted(serde_json::Error),
}

/// Outcome of one recovery attempt. `raw` is always the input, verbatim.
#[derive(Debug, Clone, PartialEq)]
pub struct RecoveryResult {
    pub succeeded: bool,
    pub value: Option<Value>,
    pub raw: String,
    pub failure_reason: Option<String>,
}

/// Recover a JSON value from `text`, never failing.
pub fn recover(text: &str) -> RecoveryResult {
    match try_recover(text) {
        Ok(value) => RecoveryResult {
            succeeded: true,
            value: Some(value),
            raw: text.to_string(),
            failure_reason: None,
        },
        Err(err) => RecoveryResult {
            succeeded: false,
            value: None,
            raw: text.to_string(),
            failure_reason: Some(err.to_string()),
        },
    }
}

/// Run the recovery ladder, first success wins:
///
/// 1. the trimmed text as-is
/// 2. the `{ ... }` span of the sentinel-stripped text
/// 3. the `[ ... ]` span, if there was no object span or it did not parse
/// 4. the sentinel-stripped text, if neither span exists
/// 5. the derived candidate with every `'` turned into `"`
pub fn try_recover(text: &str) -> Result<Value, RecoveryError> {
    let trimmed = text.trim();
    if let Ok(value) = serde_json::from_str::<Value>(trimmed) {
        return Ok(value);
    }

    let cleaned = strip_sentinel(trimmed);
    let object = find_span(&cleaned, '{', '}');
    let array = find_span(&cleaned, '[', ']');

    for candidate in [object, array].into_iter().flatten() {
        if let Ok(value) = serde_json::from_str::<Value>(candidate) {
            return Ok(value);
        }
    }

    if object.is_none() && array.is_none() {
        if let Ok(value) = serde_json::from_str::<Value>(&cleaned) {
            return Ok(value);
        }
    }

    let requoted = extract_json_like(trimmed).replace('\'', "\"");
    serde_json::from_str::<Value>(&requoted).map_err(RecoveryError::Exhausted)
}

/// Best-effort JSON-looking substring: the object span, else the array span,
/// else the sentinel-stripped text.
pub fn extract_json_like(text: &str) -> String {
    let cleaned = strip_sentinel(text);
    if let Some(span) = find_span(&cleaned, '{', '}') {
        return span.to_string();
    }
    if let Some(span) = find_span(&cleaned, '[', ']') {
        return span.to_string();
    }
    cleaned
}

/// Remove every standalone, case-insensitive termination sentinel and trim.
pub fn strip_sentinel(text: &str) -> String {
    SENTINEL_RE.replace_all(text, "").trim().to_string()
}

fn find_span(text: &str, open: char, close: char) -> Option<&str> {
    let start = text.find(open)?;
    let end = text.rfind(close)?;
    // Both delimiters are ASCII, so these byte offsets are char boundaries.
    (end > start).then(|| &text[start..=end])
}
