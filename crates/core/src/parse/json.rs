use crate::error::InsightError;
use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;

fn fenced_block_regex() -> &'static Regex {
    static FENCED_BLOCK_RE: OnceLock<Regex> = OnceLock::new();
    FENCED_BLOCK_RE.get_or_init(|| {
        Regex::new(r"(?s)^```(?:json)?\s*\n?(?P<inner>.*?)\n?\s*```$")
            .expect("fenced block regex must compile")
    })
}

/// Isolates the JSON payload inside a model response.
///
/// Handles Markdown fences (```json ... ``` or ``` ... ```) and prose before
/// the payload. Returns `None` when the text has no `{` or `[` at all. The
/// returned slice is not validated as JSON.
pub fn extract_json_payload(text: &str) -> Option<&str> {
    let trimmed = text.trim();

    if let Some(inner) = fenced_block_regex()
        .captures(trimmed)
        .and_then(|c| c.name("inner"))
    {
        return Some(inner.as_str().trim());
    }

    // Best-effort: start at whichever of '{' or '[' comes first.
    let start = match (trimmed.find('{'), trimmed.find('[')) {
        (Some(brace), Some(bracket)) => brace.min(bracket),
        (Some(i), None) | (None, Some(i)) => i,
        (None, None) => return None,
    };
    Some(&trimmed[start..])
}

/// Extracts and parses the JSON payload of a model response.
///
/// Returns the isolated payload slice alongside the parsed value so callers
/// can quote what the model actually wrote when the shape is wrong.
pub fn parse_payload(text: &str) -> Result<(&str, Value), InsightError> {
    let payload = extract_json_payload(text).ok_or_else(|| InsightError::missing_payload(text))?;
    let value = serde_json::from_str::<Value>(payload).map_err(|e| {
        tracing::warn!(
            error = %e,
            payload_len = payload.len(),
            "model JSON payload failed to parse"
        );
        InsightError::malformed(e.to_string(), payload)
    })?;
    Ok((payload, value))
}
