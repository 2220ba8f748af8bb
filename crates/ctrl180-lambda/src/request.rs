//! Request parameter and payload extraction.

use serde_json::Value;

use ctrl180_core::layout::parse_overrides;
use ctrl180_core::models::layout::LayoutOverrides;
use ctrl180_core::naming::sanitize_template_name;
use ctrl180_core::payload::{decode_data_param_lenient, empty_payload, parse_body};

use crate::config::is_truthy;

/// Control parameters of one fill request.
#[derive(Debug, Clone, Default)]
pub struct FillParams {
    /// Explicit template filename, already sanitized. `None` when blank.
    pub tpl: Option<String>,
    pub data: Option<String>,
    pub out: Option<String>,
    pub debug: bool,
    pub overrides: LayoutOverrides,
}

impl FillParams {
    /// Read parameters from key/value pairs. The first occurrence of a key
    /// wins.
    pub fn from_pairs(pairs: &[(String, String)]) -> Self {
        let first = |key: &str| {
            pairs
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.trim())
                .filter(|v| !v.is_empty())
        };

        Self {
            tpl: first("tpl")
                .map(sanitize_template_name)
                .filter(|t| !t.is_empty()),
            data: first("data").map(str::to_string),
            out: first("out").map(str::to_string),
            debug: first("debug").is_some_and(is_truthy),
            overrides: parse_overrides(pairs.iter().map(|(k, v)| (k.as_str(), v.as_str()))),
        }
    }
}

/// Query pairs followed by the body's top-level scalar fields whose keys the
/// query does not already set.
pub fn merge_body_params(query: Vec<(String, String)>, body: Option<&Value>) -> Vec<(String, String)> {
    let Some(Value::Object(map)) = body else {
        return query;
    };

    let mut pairs = query;
    for (key, value) in map {
        if pairs.iter().any(|(k, _)| k == key) {
            continue;
        }
        if let Some(text) = scalar_text(value) {
            pairs.push((key.clone(), text));
        }
    }
    pairs
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Parse a POST body leniently: anything but a JSON object is ignored.
pub fn body_json(body: &[u8]) -> Option<Value> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return None;
    }
    match parse_body(body) {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!(error = %e, bytes = body.len(), "request body is not a JSON object, ignoring");
            None
        }
    }
}

/// The decoded payload and the size of its encoded form.
#[derive(Debug, Clone)]
pub struct RequestPayload {
    pub value: Value,
    pub bytes: usize,
}

/// The `data` parameter wins; otherwise a POST body is the payload itself.
/// Malformed input becomes an empty payload.
pub fn read_payload(data: Option<&str>, body: Option<Value>, body_len: usize) -> RequestPayload {
    if let Some(raw) = data {
        return RequestPayload {
            value: decode_data_param_lenient(raw),
            bytes: raw.len(),
        };
    }
    match body {
        Some(value) => RequestPayload {
            value,
            bytes: body_len,
        },
        None => RequestPayload {
            value: empty_payload(),
            bytes: 0,
        },
    }
}
