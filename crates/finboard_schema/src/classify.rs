// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::detect::{EPOCH_THRESHOLD, numeric_series};
use crate::flatten::is_reserved;
use crate::normalize::normalize;
use crate::shape::{Shape, as_number, is_truthy};

/// Parallel arrays making up a candle series.
pub const CANDLE_KEYS: [&str; 4] = ["o", "h", "l", "c"];

/// Keys typical of a price quote.
pub const QUOTE_KEYS: [&str; 12] = [
    "c", "o", "h", "l", "pc", "d", "dp", "price", "open", "close", "high", "low",
];

/// Keys typical of company fundamentals.
pub const PERFORMANCE_KEYS: [&str; 6] = ["marketCap", "peRatio", "roe", "eps", "beta", "pe"];

/// Minimum number of [`QUOTE_KEYS`] an object needs to count as a quote.
pub const QUOTE_THRESHOLD: usize = 3;

/// The widget a payload is best rendered with.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WidgetType {
    /// Rows of records.
    Table,
    /// A numeric series over time.
    LineChart,
    /// A filled line chart. Never inferred, only chosen by users.
    AreaChart,
    /// Open/high/low/close candles.
    CandleChart,
    /// A single instrument quote with its symbol.
    Watchlist,
    /// A quote with a positive change.
    Gainers,
    /// Company fundamentals.
    Performance,
    /// A generic price quote.
    Financial,
    /// Anything else, shown as key/value pairs.
    InfoCard,
}

impl WidgetType {
    /// The kebab-case widget name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Table => "table",
            Self::LineChart => "line-chart",
            Self::AreaChart => "area-chart",
            Self::CandleChart => "candle-chart",
            Self::Watchlist => "watchlist",
            Self::Gainers => "gainers",
            Self::Performance => "performance",
            Self::Financial => "financial",
            Self::InfoCard => "info-card",
        }
    }

    /// Returns `true` for the chart widgets.
    #[must_use]
    pub const fn is_chart(self) -> bool {
        matches!(self, Self::LineChart | Self::AreaChart | Self::CandleChart)
    }

    /// Returns `true` for the finance card family.
    #[must_use]
    pub const fn is_finance_card(self) -> bool {
        matches!(self, Self::Watchlist | Self::Gainers | Self::Performance | Self::Financial)
    }
}

impl fmt::Display for WidgetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of [`classify`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    /// The chosen widget.
    pub widget_type: WidgetType,
    /// The keys that decided the classification, empty for info cards.
    pub fields: Vec<String>,
}

impl Classification {
    fn new(widget_type: WidgetType, fields: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            widget_type,
            fields: fields.into_iter().map(Into::into).collect(),
        }
    }

    const fn info_card() -> Self {
        Self {
            widget_type: WidgetType::InfoCard,
            fields: Vec::new(),
        }
    }
}

/// Picks the widget a payload is best rendered with.
///
/// The payload is normalized first (see [`normalize`](crate::normalize())). Rules, first match
/// wins:
///
/// 1. an array whose first element is an object is a [`Table`](WidgetType::Table),
/// 2. an object with `o`, `h`, `l` and `c` arrays is a [`CandleChart`](WidgetType::CandleChart),
/// 3. an object with an array of Unix timestamps is a [`LineChart`](WidgetType::LineChart),
/// 4. an object with a truthy `symbol` and `c` is a [`Watchlist`](WidgetType::Watchlist),
/// 5. an object with a positive `percentChange`, or a positive `dp` without being a full
///    quote, is [`Gainers`](WidgetType::Gainers),
/// 6. an object with any fundamentals key is [`Performance`](WidgetType::Performance),
/// 7. an object with at least three quote keys is [`Financial`](WidgetType::Financial),
/// 8. everything else is an [`InfoCard`](WidgetType::InfoCard).
///
/// ```
/// use finboard_schema::{WidgetType, classify};
/// use serde_json::json;
///
/// let quote = json!({"c": 150.2, "o": 148, "h": 151, "l": 147, "pc": 149, "d": 1.2, "dp": 0.8});
/// assert_eq!(classify(&quote).widget_type, WidgetType::Financial);
/// assert_eq!(classify(&json!({"symbol": "AAPL", "c": 150.2})).widget_type, WidgetType::Watchlist);
/// ```
#[must_use]
pub fn classify(payload: &Value) -> Classification {
    classify_normalized(&normalize(payload))
}

pub(crate) fn classify_normalized(payload: &Value) -> Classification {
    match Shape::of(payload) {
        Shape::Array(items) => match items.first().and_then(Value::as_object) {
            Some(first) => Classification::new(
                WidgetType::Table,
                first.keys().filter(|key| !is_reserved(key)).map(String::as_str),
            ),
            None => Classification::info_card(),
        },
        Shape::Object(map) => classify_object(map),
        Shape::Text(_) | Shape::Number(_) | Shape::Bool(_) | Shape::Null => {
            Classification::info_card()
        }
    }
}

fn classify_object(map: &Map<String, Value>) -> Classification {
    if CANDLE_KEYS.iter().all(|key| map.get(*key).is_some_and(Value::is_array)) {
        return Classification::new(WidgetType::CandleChart, CANDLE_KEYS);
    }

    let timestamps = map.iter().find(|(_, value)| {
        numeric_series(value).is_some_and(|numbers| numbers.iter().all(|n| *n > EPOCH_THRESHOLD))
    });
    if let Some((key, _)) = timestamps {
        return Classification::new(WidgetType::LineChart, [key.as_str()]);
    }

    let truthy = |key: &str| map.get(key).is_some_and(is_truthy);
    if truthy("symbol") && truthy("c") {
        return Classification::new(WidgetType::Watchlist, ["symbol", "c"]);
    }

    let quote: Vec<_> = QUOTE_KEYS
        .into_iter()
        .filter(|key| map.contains_key(*key))
        .collect();
    let is_quote = quote.len() >= QUOTE_THRESHOLD;
    let positive = |key: &str| map.get(key).and_then(as_number).is_some_and(|n| n > 0.0);
    if positive("percentChange") {
        return Classification::new(WidgetType::Gainers, ["percentChange"]);
    }
    if positive("dp") && !is_quote {
        return Classification::new(WidgetType::Gainers, ["dp"]);
    }

    let performance: Vec<_> = PERFORMANCE_KEYS
        .into_iter()
        .filter(|key| map.contains_key(*key))
        .collect();
    if !performance.is_empty() {
        return Classification::new(WidgetType::Performance, performance);
    }

    if is_quote {
        return Classification::new(WidgetType::Financial, quote);
    }

    Classification::info_card()
}
