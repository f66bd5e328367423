// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use serde_json::{Map, Number, Value};

/// The closed set of payload shapes the engine distinguishes.
///
/// Every engine function matches on a `Shape` and has an explicit neutral outcome for the
/// shapes it does not understand, which is what keeps the engine total.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Shape<'a> {
    /// A JSON object, keys in document order.
    Object(&'a Map<String, Value>),
    /// A JSON array.
    Array(&'a [Value]),
    /// A string, possibly holding serialized JSON or XML.
    Text(&'a str),
    /// A number.
    Number(&'a Number),
    /// A boolean.
    Bool(bool),
    /// `null`.
    Null,
}

impl<'a> Shape<'a> {
    /// Classifies `value`.
    #[must_use]
    pub fn of(value: &'a Value) -> Self {
        match value {
            Value::Object(map) => Self::Object(map),
            Value::Array(items) => Self::Array(items),
            Value::String(text) => Self::Text(text),
            Value::Number(number) => Self::Number(number),
            Value::Bool(flag) => Self::Bool(*flag),
            Value::Null => Self::Null,
        }
    }

    /// Returns `true` for objects and arrays.
    #[must_use]
    pub const fn is_container(&self) -> bool {
        matches!(self, Self::Object(_) | Self::Array(_))
    }
}

impl<'a> From<&'a Value> for Shape<'a> {
    fn from(value: &'a Value) -> Self {
        Self::of(value)
    }
}

/// Loose truthiness: `null`, `false`, `0`, `NaN` and `""` are falsy, everything else is truthy.
pub(crate) fn is_truthy(value: &Value) -> bool {
    match Shape::of(value) {
        Shape::Null => false,
        Shape::Bool(flag) => flag,
        Shape::Number(n) => n.as_f64().is_some_and(|n| n != 0.0 && !n.is_nan()),
        Shape::Text(text) => !text.is_empty(),
        Shape::Object(_) | Shape::Array(_) => true,
    }
}

/// Numeric view of a value: numbers as is, strings when they parse as a finite number.
pub(crate) fn as_number(value: &Value) -> Option<f64> {
    match Shape::of(value) {
        Shape::Number(n) => n.as_f64(),
        Shape::Text(text) => text.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
        _ => None,
    }
}
