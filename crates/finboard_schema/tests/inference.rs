// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! End-to-end inference over payloads shaped like real market-data APIs.

use finboard_schema::{
    CardKind, ChartInterval, ChartKind, DisplayConfig, Interval, WidgetType, analyze, classify, field_names,
    flatten, humanize_label, normalize, suggest_display, value_at,
};
use serde_json::{Value, json};

fn quote() -> Value {
    json!({"c": 150.2, "o": 148, "h": 151, "l": 147, "pc": 149, "d": 1.2, "dp": 0.8, "t": 1_704_153_600})
}

#[test]
fn quote_is_a_financial_card() {
    let analysis = analyze(&quote());
    assert_eq!(analysis.widget_type, WidgetType::Financial);

    let DisplayConfig::Cards(cards) = suggest_display(&analysis) else {
        panic!("expected cards");
    };
    assert_eq!(cards.kind, CardKind::Financial);
    assert_eq!(cards.fields, ["c", "o", "h", "l", "pc", "d", "dp", "t"]);

    let labels: Vec<_> = analysis.schema.iter().map(|f| f.label.as_str()).collect();
    assert_eq!(labels[..3], ["Current Price", "Open Price", "High Price"]);
}

#[test]
fn symbol_with_price_is_a_watchlist() {
    let payload = json!({"symbol": "AAPL", "c": 150.2});
    assert_eq!(classify(&payload).widget_type, WidgetType::Watchlist);
    assert_eq!(analyze(&payload).symbol.as_deref(), Some("AAPL"));
}

#[test]
fn records_are_a_table() {
    let payload = json!([{"date": "2024-01-01", "value": 5}, {"date": "2024-01-02", "value": 7}]);
    let analysis = analyze(&payload);
    assert_eq!(analysis.widget_type, WidgetType::Table);
    assert_eq!(field_names(&payload), ["date", "value"]);
    assert!(matches!(
        suggest_display(&analysis),
        DisplayConfig::Table(table) if table.fields == ["date", "value"] && !table.paginated
    ));
}

#[test]
fn candle_response_is_a_candle_chart() {
    let payload = json!({
        "c": [217.68, 221.03], "h": [222.49, 221.5], "l": [217.19, 217.14],
        "o": [221.03, 218.55], "s": "ok", "t": [1_569_297_600, 1_569_384_000],
        "v": [33_463_820, 24_018_876],
    });

    let analysis = analyze(&payload);
    assert_eq!(analysis.widget_type, WidgetType::CandleChart);
    assert_eq!(analysis.interval, Some(Interval::Intraday));

    let DisplayConfig::Chart(chart) = suggest_display(&analysis) else {
        panic!("expected a chart");
    };
    assert_eq!(chart.kind, ChartKind::Candle);
    assert_eq!(chart.interval, ChartInterval::Day);
    assert_eq!(chart.open_field.as_deref(), Some("o"));
}

#[test]
fn vendor_time_series_becomes_newest_first_table() {
    let payload = json!({
        "Meta Data": {"1. Information": "Monthly Prices", "2. Symbol": "IBM"},
        "Monthly Time Series": {},
        "Time Series (Monthly)": {
            "2023-11-30": {"1. open": "144.25", "2. high": "158.60", "3. low": "142.80", "4. close": "158.56", "5. volume": "90262434"},
            "2023-12-29": {"1. open": "158.41", "2. high": "166.34", "3. low": "158.00", "4. close": "163.55", "5. volume": "87358302"},
        }
    });

    let normalized = normalize(&payload);
    let records = normalized.as_array().expect("time series reshapes into an array");
    assert_eq!(records[0]["date"], json!("2023-12-29"));
    assert_eq!(records[0]["close"], json!(163.55));
    assert_eq!(records[0]["volume"], json!(87_358_302));

    let analysis = analyze(&payload);
    assert_eq!(analysis.widget_type, WidgetType::Table);
    assert_eq!(analysis.interval, Some(Interval::Monthly));
    assert_eq!(analysis.records, 2);

    let DisplayConfig::Table(table) = suggest_display(&analysis) else {
        panic!("expected a table");
    };
    assert_eq!(table.fields[..7], ["date", "timestamp", "open", "high", "low", "close", "volume"]);
}

#[test]
fn xml_feed() {
    let payload = json!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
        <rates base="USD">
            <rate currency="EUR">0.92</rate>
            <rate currency="GBP">0.79</rate>
            <updated>2024-01-02</updated>
        </rates>"#
    );

    let names = field_names(&payload);
    assert_eq!(
        names,
        [
            "rates.@_base",
            "rates.rate.0.@_currency",
            "rates.rate.0.#text",
            "rates.rate.1.@_currency",
            "rates.rate.1.#text",
            "rates.updated",
        ]
    );

    let normalized = normalize(&payload);
    assert_eq!(value_at(&normalized, "rates.rate.1.#text"), Some(&json!(0.79)));
    assert_eq!(analyze(&payload).widget_type, WidgetType::InfoCard);
}

#[test]
fn every_field_name_resolves() {
    let payload = json!({
        "quote": {"c": 1.5, "history": [1, 2, 3]},
        "profile": {"name": "Apple", "listing": {"exchange": "NASDAQ"}},
        "_links": {"self": "/x"},
    });

    let flat = flatten(&payload);
    for name in field_names(&payload) {
        assert_eq!(value_at(&payload, &name), flat.get(&name), "field {name}");
        assert!(!humanize_label(&name).is_empty());
    }
}

#[test]
fn analysis_is_stable_under_normalization() {
    let payloads = [
        quote(),
        json!({"Time Series (Daily)": {"2024-01-02": {"4. close": "1"}, "2024-01-03": {"4. close": "2"}}}),
        json!("<a><b>1</b></a>"),
        json!(r#"[{"id": 1}]"#),
        json!(null),
        json!("plain"),
    ];

    for payload in payloads {
        let normalized = normalize(&payload).into_owned();
        assert_eq!(classify(&payload), classify(&normalized));
        assert_eq!(field_names(&payload), field_names(&normalized));
    }
}

#[test]
fn unexpected_shapes_get_neutral_results() {
    for payload in [json!(null), json!(true), json!(3.5), json!([]), json!([1, "a"]), json!("not json")] {
        let analysis = analyze(&payload);
        assert_eq!(analysis.widget_type, WidgetType::InfoCard);
        assert!(analysis.table_columns.is_empty());
        assert!(analysis.chart_fields.is_empty());
        assert!(matches!(
            suggest_display(&analysis),
            DisplayConfig::Cards(cards) if cards.kind == CardKind::Info
        ));
    }
}
