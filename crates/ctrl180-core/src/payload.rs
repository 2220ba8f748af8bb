//! Request payload decoding and path lookup.
//!
//! Payloads arrive either as a JSON body or as a base64url-ish `data`
//! parameter. Producers are loose about the alphabet and padding, so both
//! are repaired before decoding.

use std::borrow::Cow;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde_json::{Map, Value};

use crate::error::CoreError;

/// Decode a `data` parameter into a JSON object.
///
/// Percent-escapes are undone first, the URL-safe alphabet is mapped back
/// to the standard one and missing `=` padding is restored.
pub fn decode_data_param(raw: &str) -> Result<Value, CoreError> {
    let unescaped = percent_encoding::percent_decode_str(raw.trim())
        .decode_utf8()
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| raw.trim().to_string());

    let mut b64: String = unescaped
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| match c {
            '-' => '+',
            '_' => '/',
            c => c,
        })
        .collect();
    while b64.len() % 4 != 0 {
        b64.push('=');
    }

    let bytes = STANDARD.decode(b64.as_bytes())?;
    let text = String::from_utf8(bytes)?;
    let value: Value = serde_json::from_str(&strip_lone_surrogates(&text))?;

    if value.is_object() {
        Ok(value)
    } else {
        Err(CoreError::PayloadNotObject)
    }
}

/// Like [`decode_data_param`], but a malformed payload becomes `{}`.
pub fn decode_data_param_lenient(raw: &str) -> Value {
    match decode_data_param(raw) {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!(error = %e, "payload decode failed, using empty payload");
            empty_payload()
        }
    }
}

/// Parse a raw JSON request body into a payload object.
pub fn parse_body(body: &[u8]) -> Result<Value, CoreError> {
    let value: Value = match std::str::from_utf8(body) {
        Ok(text) => serde_json::from_str(&strip_lone_surrogates(text))?,
        Err(_) => serde_json::from_slice(body)?,
    };
    if value.is_object() {
        Ok(value)
    } else {
        Err(CoreError::PayloadNotObject)
    }
}

/// Drop `\uXXXX` escapes of unpaired UTF-16 surrogates from JSON text.
///
/// Producers that truncate strings mid-emoji leave a lone high surrogate
/// behind, which serde_json rejects for the whole document. Paired escapes
/// and every other escape are kept as written.
pub fn strip_lone_surrogates(json: &str) -> Cow<'_, str> {
    if !json.contains("\\u") {
        return Cow::Borrowed(json);
    }

    let bytes = json.as_bytes();
    let mut out = String::with_capacity(json.len());
    let mut copied = 0;
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] != b'\\' {
            i += 1;
            continue;
        }
        match escaped_unit(bytes, i) {
            Some(0xD800..=0xDBFF)
                if matches!(escaped_unit(bytes, i + 6), Some(0xDC00..=0xDFFF)) =>
            {
                i += 12;
            }
            Some(0xD800..=0xDFFF) => {
                out.push_str(&json[copied..i]);
                i += 6;
                copied = i;
            }
            Some(_) => i += 6,
            // Any other escape, `\\` included, is two bytes.
            None => i += 2,
        }
    }

    if copied == 0 {
        return Cow::Borrowed(json);
    }
    out.push_str(&json[copied..]);
    Cow::Owned(out)
}

/// The code unit of a `\uXXXX` escape starting at `at`.
fn escaped_unit(bytes: &[u8], at: usize) -> Option<u16> {
    let escape = bytes.get(at..at + 6)?;
    if escape[0] != b'\\' || escape[1] != b'u' || !escape[2..].iter().all(u8::is_ascii_hexdigit) {
        return None;
    }
    std::str::from_utf8(&escape[2..])
        .ok()
        .and_then(|hex| u16::from_str_radix(hex, 16).ok())
}

pub fn empty_payload() -> Value {
    Value::Object(Map::new())
}

/// Follow a dotted path such as `person.fullName` through nested objects.
///
/// Segments are matched literally, so keys like `p1:d` work as-is.
pub fn lookup<'a>(payload: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.')
        .try_fold(payload, |node, segment| node.as_object()?.get(segment))
}

/// Why a path did not yield usable text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextLookup<'a> {
    /// Nothing at the path (or an explicit `null`).
    Missing,
    /// A string that is empty after trimming.
    Blank,
    /// A value that cannot be rendered as text, e.g. an object.
    Malformed(&'static str),
    Found(&'a Value),
}

/// Classify the value at `path` for text resolution.
///
/// Strings, numbers and booleans count as text; arrays count when all of
/// their items are strings.
pub fn lookup_text<'a>(payload: &'a Value, path: &str) -> TextLookup<'a> {
    let Some(value) = lookup(payload, path) else {
        return TextLookup::Missing;
    };

    match value {
        Value::Null => TextLookup::Missing,
        Value::String(s) if s.trim().is_empty() => TextLookup::Blank,
        Value::String(_) | Value::Number(_) | Value::Bool(_) => TextLookup::Found(value),
        Value::Array(items) if items.is_empty() => TextLookup::Blank,
        Value::Array(items) if items.iter().all(Value::is_string) => TextLookup::Found(value),
        Value::Array(_) => TextLookup::Malformed("array"),
        Value::Object(_) => TextLookup::Malformed("object"),
    }
}

/// Render a value found by [`lookup_text`] as a string. String arrays are
/// joined with blank lines.
pub fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .filter_map(Value::as_str)
            .collect::<Vec<_>>()
            .join("\n\n"),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
