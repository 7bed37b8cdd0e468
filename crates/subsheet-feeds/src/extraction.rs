//! Extraction payload decoding.
//!
//! The extraction step answers with `{"records": [...]}`. In practice the
//! payload also shows up as a bare array, and model output often wraps
//! either form in a fenced ```` ```json ```` block with prose around it.
//! All three are accepted.

use std::io::Read;

use serde_json::Value;
use subsheet_core::CandidateRecord;

use crate::FeedError;

const FENCE_OPEN: &str = "```json";
const FENCE_CLOSE: &str = "```";

/// Decode payload text into candidate rows, preserving item order.
///
/// Array items that are not objects decode to empty candidates so the
/// normalizer counts them as rejected rows.
pub fn decode_payload(text: &str) -> Result<Vec<CandidateRecord>, FeedError> {
    let json = locate_json(text)?;
    let value: Value = serde_json::from_str(json)?;

    let items = match value {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove("records") {
            Some(Value::Array(items)) => items,
            Some(other) => {
                return Err(FeedError::WrongShape(format!(
                    "`records` must be an array, got {}",
                    kind(&other)
                )))
            }
            None => {
                return Err(FeedError::WrongShape(
                    "object payload has no `records` key".to_string(),
                ))
            }
        },
        other => {
            return Err(FeedError::WrongShape(format!(
                "expected an object or array, got {}",
                kind(&other)
            )))
        }
    };

    let mut rows = Vec::with_capacity(items.len());
    for (index, item) in items.into_iter().enumerate() {
        if item.is_object() {
            rows.push(serde_json::from_value(item)?);
        } else {
            tracing::debug!(index, kind = kind(&item), "non-object payload item");
            rows.push(CandidateRecord::default());
        }
    }

    tracing::debug!(rows = rows.len(), "decoded extraction payload");
    Ok(rows)
}

/// Read everything from `reader` and decode it with [`decode_payload`].
pub fn decode_reader<R: Read>(mut reader: R, name: &str) -> Result<Vec<CandidateRecord>, FeedError> {
    let mut text = String::new();
    reader
        .read_to_string(&mut text)
        .map_err(|source| FeedError::Io {
            name: name.to_string(),
            source,
        })?;
    decode_payload(&text)
}

/// Find the JSON text inside `text`: the whole input when it already looks
/// like JSON, else the first fenced block.
fn locate_json(text: &str) -> Result<&str, FeedError> {
    let trimmed = text.trim();
    if trimmed.starts_with('{') || trimmed.starts_with('[') {
        return Ok(trimmed);
    }

    let start = trimmed.find(FENCE_OPEN).ok_or(FeedError::NoJson)? + FENCE_OPEN.len();
    let len = trimmed[start..].find(FENCE_CLOSE).ok_or(FeedError::NoJson)?;
    let json = trimmed[start..start + len].trim();
    if json.is_empty() {
        return Err(FeedError::NoJson);
    }
    Ok(json)
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
