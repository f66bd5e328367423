// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Display configuration suggested for an analyzed payload.

use serde::{Deserialize, Serialize};

use crate::analysis::Analysis;
use crate::classify::WidgetType;
use crate::detect::Interval;

/// Above this many records a table is paginated.
pub const PAGINATION_THRESHOLD: usize = 10;

const TIME_FIELD: &str = "t";

/// How a widget renders its data.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum DisplayConfig {
    /// Rows and columns.
    Table(TableConfig),
    /// One or more cards.
    Cards(CardsConfig),
    /// A chart.
    Chart(ChartConfig),
}

/// Table rendering options.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableConfig {
    /// Columns to show.
    pub fields: Vec<String>,
    /// Offer a search box.
    pub searchable: bool,
    /// Split rows into pages.
    pub paginated: bool,
}

/// Card rendering options.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardsConfig {
    /// Card layout.
    pub kind: CardKind,
    /// Fields to show.
    pub fields: Vec<String>,
}

/// Card layouts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CardKind {
    /// Symbol and price.
    Watchlist,
    /// Price with its change.
    Gainers,
    /// Fundamentals.
    Performance,
    /// Full quote.
    Financial,
    /// Plain key/value pairs.
    Info,
}

/// Chart rendering options.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartConfig {
    /// Chart style.
    pub kind: ChartKind,
    /// Field on the horizontal axis.
    pub x_field: String,
    /// Field on the vertical axis.
    pub y_field: String,
    /// Candle width or point spacing.
    pub interval: ChartInterval,
    /// Candle open series.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub open_field: Option<String>,
    /// Candle high series.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub high_field: Option<String>,
    /// Candle low series.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub low_field: Option<String>,
    /// Candle close series.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub close_field: Option<String>,
}

/// Chart styles.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    /// Line.
    Line,
    /// Filled line.
    Area,
    /// Bars.
    Bar,
    /// OHLC candles.
    Candle,
}

/// Chart resolution.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChartInterval {
    /// One day.
    #[default]
    #[serde(rename = "1D")]
    Day,
    /// One week.
    #[serde(rename = "1W")]
    Week,
    /// One month.
    #[serde(rename = "1M")]
    Month,
}

impl From<Option<Interval>> for ChartInterval {
    fn from(interval: Option<Interval>) -> Self {
        match interval {
            Some(Interval::Weekly) => Self::Week,
            Some(Interval::Monthly) => Self::Month,
            Some(Interval::Daily | Interval::Intraday | Interval::Unknown) | None => Self::Day,
        }
    }
}

/// Suggests how to display an analyzed payload.
///
/// Tables list every column and paginate above ten records. The finance card family and info
/// cards become cards. Charts pick their axes from the detected numeric series.
#[must_use]
pub fn suggest_display(analysis: &Analysis) -> DisplayConfig {
    let schema_keys = || -> Vec<String> {
        analysis.schema.iter().map(|field| field.key.clone()).collect()
    };

    match analysis.widget_type {
        WidgetType::Table => {
            let fields = if analysis.table_columns.is_empty() {
                schema_keys()
            } else {
                analysis.table_columns.iter().map(|column| column.key.clone()).collect()
            };
            DisplayConfig::Table(TableConfig {
                fields,
                searchable: true,
                paginated: analysis.records > PAGINATION_THRESHOLD,
            })
        }
        WidgetType::CandleChart => DisplayConfig::Chart(ChartConfig {
            kind: ChartKind::Candle,
            x_field: TIME_FIELD.to_string(),
            y_field: "c".to_string(),
            interval: analysis.interval.into(),
            open_field: Some("o".to_string()),
            high_field: Some("h".to_string()),
            low_field: Some("l".to_string()),
            close_field: Some("c".to_string()),
        }),
        WidgetType::LineChart | WidgetType::AreaChart => {
            let kind = if analysis.widget_type == WidgetType::AreaChart {
                ChartKind::Area
            } else {
                ChartKind::Line
            };
            let (x_field, y_field) = chart_axes(analysis);
            DisplayConfig::Chart(ChartConfig {
                kind,
                x_field,
                y_field,
                interval: analysis.interval.into(),
                open_field: None,
                high_field: None,
                low_field: None,
                close_field: None,
            })
        }
        WidgetType::Watchlist => cards(CardKind::Watchlist, schema_keys()),
        WidgetType::Gainers => cards(CardKind::Gainers, schema_keys()),
        WidgetType::Performance => cards(CardKind::Performance, schema_keys()),
        WidgetType::Financial => cards(CardKind::Financial, schema_keys()),
        WidgetType::InfoCard => cards(CardKind::Info, schema_keys()),
    }
}

const fn cards(kind: CardKind, fields: Vec<String>) -> DisplayConfig {
    DisplayConfig::Cards(CardsConfig { kind, fields })
}

fn chart_axes(analysis: &Analysis) -> (String, String) {
    let fields = &analysis.chart_fields;
    let x_field = fields
        .iter()
        .find(|field| field.is_timestamp)
        .map_or(TIME_FIELD, |field| field.key.as_str());

    let y_field = fields
        .iter()
        .find(|field| field.key == "c")
        .or_else(|| fields.iter().find(|field| field.key != x_field))
        .map_or("c", |field| field.key.as_str());

    (x_field.to_string(), y_field.to_string())
}
