//! Degraded-mode JSON extraction from free-text model replies
//!
//! Used only where a single-shot call asks for JSON in plain text. Tool-calling
//! paths receive structured arguments and never go through here.

use serde::de::DeserializeOwned;

use crate::core::{Result, TrendwatchError};

/// Pull the first JSON object out of `text` and deserialize it.
///
/// Accepts a bare object, an object wrapped in a fenced code block, or an
/// object surrounded by prose.
pub fn extract_json<T: DeserializeOwned>(text: &str) -> Result<T> {
    let candidate = fenced_block(text)
        .or_else(|| outer_object(text))
        .ok_or_else(|| TrendwatchError::parse("no JSON object found in reply"))?;

    serde_json::from_str(candidate).map_err(|e| TrendwatchError::parse(e.to_string()))
}

fn fenced_block(text: &str) -> Option<&str> {
    let start = text.find("```")?;
    let rest = &text[start + 3..];
    // Skip an optional language tag on the opening fence
    let body_start = rest.find('\n')? + 1;
    let body = &rest[body_start..];
    let end = body.find("```")?;
    let inner = body[..end].trim();
    inner.starts_with('{').then_some(inner)
}

fn outer_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}
