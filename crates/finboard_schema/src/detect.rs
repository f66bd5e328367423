// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Field-level heuristics: chart series, table columns, sampling interval and ticker symbol.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::label::humanize_label;
use crate::shape::{Shape, is_truthy};

/// Numbers above this are taken to be Unix timestamps (seconds or milliseconds).
pub const EPOCH_THRESHOLD: f64 = 1_000_000_000.0;

/// Keys that carry a ticker symbol, in priority order.
pub const SYMBOL_KEYS: [&str; 5] = ["symbol", "ticker", "displaySymbol", "code", "stockSymbol"];

/// The JSON type of a sampled value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InferredType {
    /// A string.
    String,
    /// A number.
    Number,
    /// A boolean.
    Boolean,
    /// An object.
    Object,
    /// An array.
    Array,
    /// `null`.
    Null,
}

impl InferredType {
    /// Infers the type of `value`.
    #[must_use]
    pub fn of(value: &Value) -> Self {
        match Shape::of(value) {
            Shape::Text(_) => Self::String,
            Shape::Number(_) => Self::Number,
            Shape::Bool(_) => Self::Boolean,
            Shape::Object(_) => Self::Object,
            Shape::Array(_) => Self::Array,
            Shape::Null => Self::Null,
        }
    }

    /// The lower-case type name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Object => "object",
            Self::Array => "array",
            Self::Null => "null",
        }
    }
}

impl fmt::Display for InferredType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sampling interval of a series.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Interval {
    /// One point per day.
    Daily,
    /// One point per week.
    Weekly,
    /// One point per month.
    Monthly,
    /// Minute or hour resolution.
    Intraday,
    /// The payload gives no usable hint.
    Unknown,
}

impl Interval {
    /// The lower-case interval name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
            Self::Intraday => "intraday",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A top-level key holding a plottable numeric series.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartField {
    /// The payload key.
    pub key: String,
    /// Display label.
    pub label: String,
    /// The key, lower-cased.
    pub kind: String,
    /// Every element looks like a Unix timestamp.
    pub is_timestamp: bool,
}

/// A column of a tabular payload.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableColumn {
    /// The record key.
    pub key: String,
    /// Display label.
    pub label: String,
    /// Type of the value in the first record.
    pub value_type: InferredType,
    /// The value in the first record is a number.
    pub is_numeric: bool,
}

/// Lists the top-level keys whose value is a non-empty array of numbers.
///
/// Only objects have chart fields.
#[must_use]
pub fn detect_chart_fields(payload: &Value) -> Vec<ChartField> {
    let Shape::Object(map) = Shape::of(payload) else {
        return Vec::new();
    };

    map.iter()
        .filter_map(|(key, value)| {
            let numbers = numeric_series(value)?;
            Some(ChartField {
                key: key.clone(),
                label: humanize_label(key),
                kind: key.to_lowercase(),
                is_timestamp: numbers.iter().all(|n| *n > EPOCH_THRESHOLD),
            })
        })
        .collect()
}

/// The elements of a non-empty array consisting only of numbers.
pub(crate) fn numeric_series(value: &Value) -> Option<Vec<f64>> {
    let Shape::Array(items) = Shape::of(value) else {
        return None;
    };
    if items.is_empty() {
        return None;
    }
    items.iter().map(Value::as_f64).collect()
}

/// Describes the columns of an array of records, sampled from the first record.
///
/// Anything other than an array whose first element is an object has no columns.
#[must_use]
pub fn detect_table_columns(payload: &Value) -> Vec<TableColumn> {
    let Some(Shape::Object(sample)) = first_element(payload).map(Shape::of) else {
        return Vec::new();
    };

    sample
        .iter()
        .map(|(key, value)| {
            let value_type = InferredType::of(value);
            TableColumn {
                key: key.clone(),
                label: humanize_label(key),
                value_type,
                is_numeric: value_type == InferredType::Number,
            }
        })
        .collect()
}

/// Guesses the sampling interval of a payload.
///
/// Returns `None` for empty payloads (`null`, `false`, `0`, `""`). Objects are checked for a
/// status-and-timestamps candle response, then for interval words in their keys, then for an
/// explicit `interval` field. Everything else is [`Interval::Unknown`].
#[must_use]
pub fn detect_interval(payload: &Value) -> Option<Interval> {
    if !is_truthy(payload) {
        return None;
    }

    let Shape::Object(map) = Shape::of(payload) else {
        return Some(Interval::Unknown);
    };

    if map.get("s").and_then(Value::as_str) == Some("ok") && map.get("t").is_some_and(is_truthy) {
        return Some(Interval::Intraday);
    }

    for key in map.keys() {
        if let Some(interval) = interval_from_key(&key.to_lowercase()) {
            return Some(interval);
        }
    }

    if let Some(value) = map.get("interval").filter(|v| is_truthy(v)) {
        let hint = match value {
            Value::String(text) => text.to_lowercase(),
            other => other.to_string().to_lowercase(),
        };
        if let Some(interval) = interval_from_hint(&hint) {
            return Some(interval);
        }
    }

    Some(Interval::Unknown)
}

fn interval_from_key(key: &str) -> Option<Interval> {
    if key.contains("day") || key.contains("1d") {
        Some(Interval::Daily)
    } else if key.contains("week") || key.contains("1w") {
        Some(Interval::Weekly)
    } else if key.contains("month") || key.contains("1mo") {
        Some(Interval::Monthly)
    } else if key.contains("min") || key.contains("hour") || key.contains("1h") {
        Some(Interval::Intraday)
    } else {
        None
    }
}

fn interval_from_hint(hint: &str) -> Option<Interval> {
    if hint.contains('d') {
        Some(Interval::Daily)
    } else if hint.contains('w') {
        Some(Interval::Weekly)
    } else if hint.contains('m') && !hint.contains("min") {
        Some(Interval::Monthly)
    } else if hint.contains("min") || hint.contains('h') {
        Some(Interval::Intraday)
    } else {
        None
    }
}

/// Finds a ticker symbol on the payload or, for arrays, on the first record.
///
/// Only string values count.
#[must_use]
pub fn detect_symbol(payload: &Value) -> Option<String> {
    let symbol_of = |value: &Value| {
        let map = value.as_object()?;
        SYMBOL_KEYS
            .iter()
            .find_map(|key| map.get(*key).and_then(Value::as_str))
            .map(str::to_string)
    };

    symbol_of(payload).or_else(|| first_element(payload).and_then(symbol_of))
}

pub(crate) fn first_element(payload: &Value) -> Option<&Value> {
    payload.as_array().and_then(|items| items.first())
}
