// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::classify::{WidgetType, classify_normalized};
use crate::detect::{
    ChartField, InferredType, Interval, TableColumn, detect_chart_fields, detect_interval, detect_symbol,
    detect_table_columns, first_element,
};
use crate::flatten::{flatten, is_reserved};
use crate::label::humanize_label;
use crate::normalize::decode;
use crate::reshape::time_series_records;
use crate::shape::Shape;

/// One leaf path of the sampled record.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SchemaField {
    /// Dot-separated path to the leaf.
    pub key: String,
    /// Display label.
    pub label: String,
    /// The leaf value.
    pub sample: Value,
    /// Type of the leaf value.
    pub inferred_type: InferredType,
}

/// Everything the engine can tell about a payload.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Analysis {
    /// Best widget for the payload.
    pub widget_type: WidgetType,
    /// Leaf fields of the sampled record: the payload itself, or the first element of an array.
    pub schema: Vec<SchemaField>,
    /// Plottable numeric series.
    pub chart_fields: Vec<ChartField>,
    /// Columns, for arrays of records.
    pub table_columns: Vec<TableColumn>,
    /// Sampling interval, `None` for empty payloads.
    pub interval: Option<Interval>,
    /// Ticker symbol, if the payload names one.
    pub symbol: Option<String>,
    /// Number of records: the array length, 1 for other values and 0 for `null`.
    pub records: usize,
}

/// Analyzes a payload.
///
/// The payload is decoded from text and vendor time series are reshaped into records before
/// any heuristic runs. Interval and symbol detection also look at the payload before
/// reshaping, where the vendor keys still carry those hints.
#[must_use]
pub fn analyze(payload: &Value) -> Analysis {
    let decoded = decode(payload);
    let reshaped = time_series_records(&decoded).map(Value::Array);
    let data = reshaped.as_ref().unwrap_or(&decoded);

    let analysis = Analysis {
        widget_type: classify_normalized(data).widget_type,
        schema: build_schema(data),
        chart_fields: detect_chart_fields(data),
        table_columns: detect_table_columns(data),
        interval: detect_interval(data)
            .filter(|interval| *interval != Interval::Unknown)
            .or_else(|| detect_interval(&decoded)),
        symbol: detect_symbol(data).or_else(|| detect_symbol(&decoded)),
        records: record_count(data),
    };

    tracing::debug!(
        widget_type = %analysis.widget_type,
        fields = analysis.schema.len(),
        records = analysis.records,
        "payload analyzed"
    );

    analysis
}

fn build_schema(data: &Value) -> Vec<SchemaField> {
    let sample = match Shape::of(data) {
        Shape::Object(_) => data,
        Shape::Array(_) => match first_element(data) {
            Some(first) if first.is_object() => first,
            _ => return Vec::new(),
        },
        Shape::Text(_) | Shape::Number(_) | Shape::Bool(_) | Shape::Null => return Vec::new(),
    };

    flatten(sample)
        .into_iter()
        .filter(|(path, _)| !is_reserved(path))
        .map(|(path, value)| SchemaField {
            label: humanize_label(&path),
            inferred_type: InferredType::of(&value),
            key: path,
            sample: value,
        })
        .collect()
}

fn record_count(data: &Value) -> usize {
    match Shape::of(data) {
        Shape::Array(items) => items.len(),
        Shape::Null => 0,
        Shape::Object(_) | Shape::Text(_) | Shape::Number(_) | Shape::Bool(_) => 1,
    }
}
