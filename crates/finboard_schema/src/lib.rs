// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Schema inference for arbitrary JSON and XML payloads.
//!
//! Dashboards point widgets at APIs they know nothing about. This crate looks at whatever came
//! back and answers the questions a widget builder asks: which fields can be picked, what
//! should they be called, and is this a table, a chart or a card.
//!
//! Every function is total. Unexpected shapes produce empty or neutral results (an empty field
//! list, `None`, [`WidgetType::InfoCard`]) instead of errors.
//!
//! # Overview
//!
//! - [`normalize()`] decodes XML and JSON text and reshapes vendor time series into records.
//! - [`flatten()`] and [`field_names`] turn nested payloads into addressable dotted paths.
//! - [`classify()`] picks a [`WidgetType`]; [`analyze`] adds schema, chart fields, table
//!   columns, interval and symbol detection.
//! - [`suggest_display`] turns an [`Analysis`] into a [`DisplayConfig`].
//! - [`humanize_label`] produces display labels for keys.
//!
//! # Example
//!
//! ```
//! use finboard_schema::{DisplayConfig, WidgetType, analyze, field_names, suggest_display};
//! use serde_json::json;
//!
//! let payload = json!([
//!     {"date": "2024-01-01", "value": 5},
//!     {"date": "2024-01-02", "value": 7},
//! ]);
//!
//! assert_eq!(field_names(&payload), ["date", "value"]);
//!
//! let analysis = analyze(&payload);
//! assert_eq!(analysis.widget_type, WidgetType::Table);
//! assert!(matches!(suggest_display(&analysis), DisplayConfig::Table(_)));
//! ```

mod analysis;
mod classify;
mod detect;
mod display;
mod flatten;
mod label;
mod normalize;
mod reshape;
mod shape;
mod xml;

pub use analysis::{Analysis, SchemaField, analyze};
pub use classify::{
    CANDLE_KEYS, Classification, PERFORMANCE_KEYS, QUOTE_KEYS, QUOTE_THRESHOLD, WidgetType, classify,
};
pub use detect::{
    ChartField, EPOCH_THRESHOLD, InferredType, Interval, SYMBOL_KEYS, TableColumn, detect_chart_fields,
    detect_interval, detect_symbol, detect_table_columns,
};
pub use display::{
    CardKind, CardsConfig, ChartConfig, ChartInterval, ChartKind, DisplayConfig, PAGINATION_THRESHOLD,
    TableConfig, suggest_display,
};
pub use flatten::{PATH_SEPARATOR, TEXT_FIELD, VALUE_FIELD, field_names, flatten, is_reserved, value_at};
pub use label::humanize_label;
pub use normalize::normalize;
pub use reshape::{TIME_SERIES_KEYS, time_series_records};
pub use shape::Shape;
pub use xml::{ATTRIBUTE_PREFIX, TEXT_KEY, looks_like_xml, xml_to_json};
