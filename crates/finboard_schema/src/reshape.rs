// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Reshaping of vendor "date -> OHLCV record" maps into record arrays.

use std::cmp::Ordering;

use chrono::{NaiveDate, NaiveDateTime};
use serde_json::{Map, Value};

use crate::shape::{Shape, as_number, is_truthy};

/// Keys under which vendors publish a date-keyed series, checked in this order.
pub const TIME_SERIES_KEYS: [&str; 6] = [
    "Time Series (Daily)",
    "Time Series (Weekly)",
    "Time Series (Monthly)",
    "Time Series (Intraday)",
    "Time Series (1min)",
    "Time Series (5min)",
];

const PRICE_FIELDS: [(&str, &str); 4] = [
    ("open", "1. open"),
    ("high", "2. high"),
    ("low", "3. low"),
    ("close", "4. close"),
];

const VOLUME_FIELD: (&str, &str) = ("volume", "5. volume");

/// Converts a vendor time series into flat records sorted newest first.
///
/// Each record carries `date`, `timestamp` (Unix milliseconds, `null` when the date does not
/// parse), numeric `open`/`high`/`low`/`close`/`volume` and the vendor's original fields.
/// Returns `None` when `payload` holds no time series.
#[must_use]
pub fn time_series_records(payload: &Value) -> Option<Vec<Value>> {
    let Shape::Object(map) = Shape::of(payload) else {
        return None;
    };

    let series = TIME_SERIES_KEYS
        .iter()
        .find_map(|key| map.get(*key).and_then(Value::as_object))?;

    let mut records: Vec<(Option<i64>, Value)> = series
        .iter()
        .map(|(date, values)| {
            let timestamp = parse_timestamp(date);
            (timestamp, record(date, timestamp, values))
        })
        .collect();

    records.sort_by(|(a_ts, a), (b_ts, b)| match b_ts.cmp(a_ts) {
        Ordering::Equal => date_of(b).cmp(date_of(a)),
        other => other,
    });

    Some(records.into_iter().map(|(_, record)| record).collect())
}

fn record(date: &str, timestamp: Option<i64>, values: &Value) -> Value {
    let original = values.as_object();
    let lookup = |(name, vendor): (&str, &str)| {
        original.and_then(|fields| {
            [vendor, name]
                .into_iter()
                .filter_map(|key| fields.get(key))
                .find(|value| is_truthy(value))
        })
    };

    let mut out = Map::new();
    out.insert("date".to_string(), Value::String(date.to_string()));
    out.insert("timestamp".to_string(), timestamp.map_or(Value::Null, Value::from));

    for field in PRICE_FIELDS {
        let value = lookup(field).map_or(Value::from(0), |raw| {
            as_number(raw).map_or(Value::Null, Value::from)
        });
        out.insert(field.0.to_string(), value);
    }

    let volume = lookup(VOLUME_FIELD).map_or(Value::from(0), |raw| {
        parse_volume(raw).map_or(Value::Null, Value::from)
    });
    out.insert(VOLUME_FIELD.0.to_string(), volume);

    if let Some(fields) = original {
        for (key, value) in fields {
            if !out.contains_key(key) {
                out.insert(key.clone(), value.clone());
            }
        }
    }

    Value::Object(out)
}

#[expect(clippy::cast_possible_truncation, reason = "volumes are whole numbers")]
fn parse_volume(raw: &Value) -> Option<i64> {
    if let Some(integer) = raw.as_i64() {
        return Some(integer);
    }
    as_number(raw).map(|n| n.trunc() as i64)
}

/// Parses `YYYY-MM-DD` or `YYYY-MM-DD HH:MM:SS` as UTC into Unix milliseconds.
fn parse_timestamp(date: &str) -> Option<i64> {
    let date = date.trim();
    NaiveDateTime::parse_from_str(date, "%Y-%m-%d %H:%M:%S")
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(date, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
        .map(|dt| dt.and_utc().timestamp_millis())
}

fn date_of(record: &Value) -> &str {
    record.get("date").and_then(Value::as_str).unwrap_or_default()
}
