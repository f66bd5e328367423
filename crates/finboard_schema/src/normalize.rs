// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::borrow::Cow;

use serde_json::Value;

use crate::reshape::time_series_records;
use crate::shape::Shape;
use crate::xml::{looks_like_xml, xml_to_json};

/// Brings a payload into the shape the rest of the engine works on.
///
/// XML strings become objects, JSON strings are parsed and vendor time series become record
/// arrays, newest first. Anything else, including strings that are neither, is returned
/// unchanged. The result is a fixed point: normalizing it again changes nothing.
#[must_use]
pub fn normalize(payload: &Value) -> Cow<'_, Value> {
    match decode(payload) {
        Cow::Borrowed(value) => reshape(value).map_or(Cow::Borrowed(value), Cow::Owned),
        Cow::Owned(value) => Cow::Owned(reshape(&value).unwrap_or(value)),
    }
}

/// Decodes serialized text payloads without reshaping them.
pub(crate) fn decode(payload: &Value) -> Cow<'_, Value> {
    let Shape::Text(text) = Shape::of(payload) else {
        return Cow::Borrowed(payload);
    };

    let trimmed = text.trim();
    let decoded = if looks_like_xml(trimmed) {
        xml_to_json(trimmed)
    } else {
        serde_json::from_str::<Value>(trimmed).ok()
    };

    match decoded {
        Some(value) => Cow::Owned(decode(&value).into_owned()),
        None => Cow::Borrowed(payload),
    }
}

fn reshape(payload: &Value) -> Option<Value> {
    time_series_records(payload).map(Value::Array)
}
