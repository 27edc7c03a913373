//! Lenient parsing of model responses.
//!
//! Models are asked for strict JSON but occasionally wrap it in code
//! fences or prose. Before giving up, strip fence wrappers and trim to the
//! outermost `{...}`.

use crate::EnrichError;

/// Extract a JSON object from a model response.
pub fn extract_json(text: &str) -> Result<serde_json::Value, EnrichError> {
    let candidate = if text.contains("```json") {
        text.split("```json")
            .nth(1)
            .and_then(|s| s.split("```").next())
            .unwrap_or(text)
            .trim()
    } else if text.contains("```") {
        text.split("```")
            .nth(1)
            .and_then(|s| s.split("```").next())
            .unwrap_or(text)
            .trim()
    } else {
        text.trim()
    };

    if let Ok(value) = serde_json::from_str(candidate) {
        return Ok(value);
    }

    // Trim to the outermost braces and try once more.
    if let (Some(open), Some(close)) = (candidate.find('{'), candidate.rfind('}')) {
        if open < close {
            if let Ok(value) = serde_json::from_str(&candidate[open..=close]) {
                return Ok(value);
            }
        }
    }

    Err(EnrichError::InvalidResponse(format!(
        "response is not parseable JSON: {}",
        truncate(text, 200)
    )))
}

fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
