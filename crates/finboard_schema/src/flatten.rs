// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use serde_json::{Map, Value};

use crate::reshape::time_series_records;
use crate::shape::Shape;
use crate::xml::{looks_like_xml, xml_to_json};

/// Separator between the segments of a flattened path.
pub const PATH_SEPARATOR: char = '.';

/// Pseudo-field naming a scalar payload.
pub const VALUE_FIELD: &str = "value";

/// Pseudo-field naming a plain-text payload.
pub const TEXT_FIELD: &str = "text";

/// Flattens nested objects and arrays into `path -> leaf` pairs.
///
/// Object keys are joined with `.` and array elements contribute their index, so
/// `{"a": {"b": [1, 2]}}` becomes `a.b.0` and `a.b.1`. Empty objects and arrays are kept as
/// leaves. A scalar payload flattens to a single `value` field, a string to a single `text`
/// field and `null` to nothing.
#[must_use]
pub fn flatten(payload: &Value) -> Map<String, Value> {
    let mut out = Map::new();
    match Shape::of(payload) {
        Shape::Object(map) if map.is_empty() => {}
        Shape::Array(items) if items.is_empty() => {}
        Shape::Object(_) | Shape::Array(_) => flatten_into(payload, &mut String::new(), &mut out),
        Shape::Text(text) => {
            out.insert(TEXT_FIELD.to_string(), Value::String(text.to_string()));
        }
        Shape::Number(_) | Shape::Bool(_) => {
            out.insert(VALUE_FIELD.to_string(), payload.clone());
        }
        Shape::Null => {}
    }
    out
}

fn flatten_into(value: &Value, prefix: &mut String, out: &mut Map<String, Value>) {
    match Shape::of(value) {
        Shape::Object(map) if !map.is_empty() => {
            for (key, child) in map {
                descend(key, child, prefix, out);
            }
        }
        Shape::Array(items) if !items.is_empty() => {
            for (index, child) in items.iter().enumerate() {
                descend(&index.to_string(), child, prefix, out);
            }
        }
        _ => {
            out.insert(prefix.clone(), value.clone());
        }
    }
}

fn descend(segment: &str, child: &Value, prefix: &mut String, out: &mut Map<String, Value>) {
    let restore = prefix.len();
    if restore > 0 {
        prefix.push(PATH_SEPARATOR);
    }
    prefix.push_str(segment);
    flatten_into(child, prefix, out);
    prefix.truncate(restore);
}

/// Returns `true` for paths that never appear in a field list: empty paths, fully numeric
/// paths and paths starting with `_`.
#[must_use]
pub fn is_reserved(path: &str) -> bool {
    let trimmed = path.trim();
    trimmed.is_empty() || path.starts_with('_') || is_numeric_literal(trimmed)
}

/// Decimal numbers with optional sign and exponent, signed `Infinity`, and unsigned
/// `0x`/`0o`/`0b` integers.
fn is_numeric_literal(text: &str) -> bool {
    let radix = match text.get(..2) {
        Some("0x" | "0X") => Some(16),
        Some("0o" | "0O") => Some(8),
        Some("0b" | "0B") => Some(2),
        _ => None,
    };
    if let Some(radix) = radix {
        let digits = &text[2..];
        return !digits.is_empty() && digits.chars().all(|c| c.is_digit(radix));
    }

    let unsigned = text.strip_prefix(['+', '-']).unwrap_or(text);
    if unsigned == "Infinity" {
        return true;
    }
    unsigned.bytes().any(|b| b.is_ascii_digit())
        && unsigned.bytes().all(|b| b.is_ascii_digit() || matches!(b, b'.' | b'e' | b'E' | b'+' | b'-'))
        && text.parse::<f64>().is_ok()
}

/// Lists the addressable field paths of a payload.
///
/// This is the list a user picks widget fields from:
///
/// - a vendor time series uses its newest record,
/// - an array must hold only objects (otherwise the list is empty) and uses its first element,
/// - an object is flattened,
/// - an XML string is converted first, a JSON string is parsed first,
/// - any other string yields `text`, any other scalar yields `value` and `null` yields nothing.
///
/// Reserved paths are removed, see [`is_reserved`].
#[must_use]
pub fn field_names(payload: &Value) -> Vec<String> {
    match Shape::of(payload) {
        Shape::Null => Vec::new(),
        Shape::Object(_) => {
            if let Some(records) = time_series_records(payload) {
                return records.first().map_or_else(Vec::new, keys_of);
            }
            keys_of(payload)
        }
        Shape::Array(items) => {
            if items.iter().all(Value::is_object) {
                items.first().map_or_else(Vec::new, keys_of)
            } else {
                Vec::new()
            }
        }
        Shape::Text(text) => {
            let trimmed = text.trim();
            if looks_like_xml(trimmed) {
                return xml_to_json(trimmed).as_ref().map_or_else(Vec::new, keys_of);
            }
            match serde_json::from_str::<Value>(trimmed) {
                Ok(parsed) => field_names(&parsed),
                Err(_) => vec![TEXT_FIELD.to_string()],
            }
        }
        Shape::Number(_) | Shape::Bool(_) => vec![VALUE_FIELD.to_string()],
    }
}

fn keys_of(value: &Value) -> Vec<String> {
    if !Shape::of(value).is_container() {
        return Vec::new();
    }
    flatten(value)
        .into_iter()
        .map(|(path, _)| path)
        .filter(|path| !is_reserved(path))
        .collect()
}

/// Resolves a flattened path against a payload.
///
/// Numeric segments index into arrays. An exact key match wins over splitting, so keys that
/// themselves contain `.` still resolve.
#[must_use]
pub fn value_at<'a>(payload: &'a Value, path: &str) -> Option<&'a Value> {
    if path.is_empty() {
        return Some(payload);
    }

    match Shape::of(payload) {
        Shape::Object(map) => {
            if let Some(value) = map.get(path) {
                return Some(value);
            }
            path.match_indices(PATH_SEPARATOR).find_map(|(i, _)| {
                map.get(&path[..i])
                    .and_then(|child| value_at(child, &path[i + 1..]))
            })
        }
        Shape::Array(items) => {
            let (head, rest) = path.split_once(PATH_SEPARATOR).unwrap_or((path, ""));
            let index = head.parse::<usize>().ok()?;
            value_at(items.get(index)?, rest)
        }
        _ => None,
    }
}
