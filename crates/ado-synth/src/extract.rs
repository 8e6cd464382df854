//! JSON extraction from free-form oracle replies
//!
//! Strategy order:
//! 1) Narrow to the inner text of a fenced code block if one is present.
//! 2) Scan for a `{`, track brace depth (ignoring braces inside strings)
//!    and try each balanced candidate; the first that parses wins.
//! 3) Regex-scan for brace-balanced candidates (one nesting level, not
//!    string-aware) and accept the first that parses.

use crate::error::ExtractionError;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

static FENCED_BLOCK: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"(?is)```(?:json)?\s*\n?(.*?)\n?```").ok());

static SHALLOW_OBJECT: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"(?s)\{[^{}]*(?:\{[^{}]*\}[^{}]*)*\}").ok());

/// Locate a JSON object inside `text` and return its source slice
///
/// # Errors
/// [`ExtractionError`] when no candidate parses.
pub fn extract_json(text: &str) -> Result<&str, ExtractionError> {
    let text = fenced_inner(text.trim());

    if let Some(found) = scan_balanced(text) {
        return Ok(found);
    }

    if let Some(re) = SHALLOW_OBJECT.as_ref() {
        if let Some(found) = re
            .find_iter(text)
            .map(|m| m.as_str())
            .find(|candidate| parses(candidate))
        {
            tracing::debug!("extracted JSON through shallow regex scan");
            return Ok(found);
        }
    }

    Err(ExtractionError)
}

/// Locate and parse a JSON object inside `text`
///
/// # Errors
/// [`ExtractionError`] when no candidate parses.
pub fn extract_value(text: &str) -> Result<Value, ExtractionError> {
    let json = extract_json(text)?;
    serde_json::from_str(json).map_err(|_| ExtractionError)
}

fn fenced_inner(text: &str) -> &str {
    if !text.contains("```") {
        return text;
    }
    FENCED_BLOCK
        .as_ref()
        .and_then(|re| re.captures(text))
        .and_then(|c| c.get(1))
        .map_or(text, |m| m.as_str().trim())
}

fn parses(candidate: &str) -> bool {
    serde_json::from_str::<Value>(candidate).is_ok()
}

/// First balanced `{...}` candidate that parses, trying each `{` in order
fn scan_balanced(text: &str) -> Option<&str> {
    let bytes = text.as_bytes();
    let mut from = 0;

    while let Some(offset) = bytes[from..].iter().position(|&b| b == b'{') {
        let start = from + offset;
        if let Some(end) = balanced_end(bytes, start) {
            let candidate = &text[start..end];
            if parses(candidate) {
                return Some(candidate);
            }
        }
        from = start + 1;
    }

    None
}

/// Index one past the `}` that closes the `{` at `start`
fn balanced_end(bytes: &[u8], start: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, &b) in bytes.iter().enumerate().skip(start) {
        if in_string {
            match b {
                _ if escaped => escaped = false,
                b'\\' => escaped = true,
                b'"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match b {
            b'"' => in_string = true,
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i + 1);
                }
            }
            _ => {}
        }
    }

    None
}
