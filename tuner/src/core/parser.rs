//! Label extraction from free-form predictor output

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use thiserror::Error;

/// First flat object carrying a `diseases` array
static LABEL_OBJECT_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"\{[^{}]*"diseases"\s*:\s*\[[^\]]*\][^{}]*\}"#).expect("valid label object pattern")
});

/// Why a response yielded no label list
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseFailure {
    #[error("response is empty")]
    EmptyResponse,

    #[error("service reported an error: {0}")]
    ErrorPayload(String),

    #[error("no diseases payload found")]
    NoLabelPayload,

    #[error("diseases field has unsupported shape: {0}")]
    InvalidShape(String),
}

/// Return the text inside the first fenced block, wherever it starts
///
/// Text without a fence is returned trimmed and otherwise untouched.
pub fn strip_code_fence(response: &str) -> &str {
    let trimmed = response.trim();
    let Some(open) = trimmed.find("```") else {
        return trimmed;
    };
    let after_open = &trimmed[open + 3..];

    // Skip the language tag line
    let body = match after_open.find('\n') {
        Some(newline) => &after_open[newline + 1..],
        None => after_open,
    };

    match body.find("```") {
        Some(end) => body[..end].trim(),
        None => body.trim(),
    }
}

/// Extract the label list from a response
pub fn extract_labels(response: &str) -> Result<Vec<String>, ParseFailure> {
    let text = strip_code_fence(response);
    if text.is_empty() {
        return Err(ParseFailure::EmptyResponse);
    }

    if let Ok(value) = serde_json::from_str::<Value>(text) {
        if let Some(object) = value.as_object() {
            if let Some(error) = object.get("error") {
                return Err(ParseFailure::ErrorPayload(display_value(error)));
            }
            if let Some(diseases) = object.get("diseases") {
                return labels_from_value(diseases);
            }
        }
    }

    let embedded = LABEL_OBJECT_REGEX
        .find(text)
        .ok_or(ParseFailure::NoLabelPayload)?;
    let value: Value =
        serde_json::from_str(embedded.as_str()).map_err(|e| ParseFailure::InvalidShape(e.to_string()))?;

    match value.get("diseases") {
        Some(diseases) => labels_from_value(diseases),
        None => Err(ParseFailure::NoLabelPayload),
    }
}

/// Total form of [`extract_labels`]: any failure is an empty list
pub fn parse_labels(response: &str) -> Vec<String> {
    extract_labels(response).unwrap_or_default()
}

fn labels_from_value(diseases: &Value) -> Result<Vec<String>, ParseFailure> {
    match diseases {
        Value::Array(items) => Ok(items.iter().filter_map(label_from_item).collect()),
        Value::String(_) | Value::Number(_) => Ok(label_from_item(diseases).into_iter().collect()),
        Value::Null => Ok(Vec::new()),
        other => Err(ParseFailure::InvalidShape(other.to_string())),
    }
}

fn label_from_item(item: &Value) -> Option<String> {
    let raw = match item {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };
    (!raw.is_empty()).then_some(raw)
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
