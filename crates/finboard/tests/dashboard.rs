// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Integration tests for the `Dashboard` service.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use finboard::cache::{CacheKey, DataCache, FetchError, Fetcher, GetOptions};
use finboard::schema::{DisplayConfig, Interval, WidgetType};
use finboard::{Dashboard, DashboardConfig};
use parking_lot::Mutex;
use serde_json::{Value, json};
use tick::ClockControl;

const QUOTE: &str = "https://finnhub.io/api/v1/quote?symbol=AAPL";
const CANDLES: &str = "https://finnhub.io/api/v1/stock/candle?symbol=AAPL&resolution=D";
const RATES: &str = "https://example.com/rates.xml";

/// Serves canned payloads per URL; unknown URLs and URLs marked down fail with 503.
#[derive(Debug, Default)]
struct Feed {
    payloads: Mutex<HashMap<String, Value>>,
    down: Mutex<bool>,
    calls: AtomicUsize,
}

impl Feed {
    fn with(payloads: impl IntoIterator<Item = (&'static str, Value)>) -> Arc<Self> {
        let feed = Self::default();
        feed.payloads
            .lock()
            .extend(payloads.into_iter().map(|(url, payload)| (url.to_string(), payload)));
        Arc::new(feed)
    }

    fn set_down(&self, down: bool) {
        *self.down.lock() = down;
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Fetcher for Feed {
    type Output = Value;

    async fn fetch(&self, key: &CacheKey) -> Result<Value, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if *self.down.lock() {
            return Err(FetchError::status(503, "Service Unavailable"));
        }
        self.payloads
            .lock()
            .get(key.url())
            .cloned()
            .ok_or_else(|| FetchError::status(404, "Not Found"))
    }
}

fn quote() -> Value {
    json!({"c": 150.2, "o": 148, "h": 151, "l": 147, "pc": 149, "d": 1.2, "dp": 0.8})
}

fn candles() -> Value {
    json!({
        "c": [217.68, 221.03], "h": [222.49, 221.5], "l": [217.19, 217.14],
        "o": [221.03, 218.55], "s": "ok", "t": [1_569_297_600, 1_569_384_000],
    })
}

fn setup(control: &ClockControl, feed: &Arc<Feed>, config: DashboardConfig) -> Dashboard<Arc<Feed>> {
    let cache = DataCache::builder(control.to_clock()).build(Arc::clone(feed));
    Dashboard::from_parts(cache, config)
}

fn secs(s: u64) -> Duration {
    Duration::from_secs(s)
}

#[tokio::test]
async fn load_serves_analyzed_widget_data() {
    let control = ClockControl::new();
    let feed = Feed::with([(QUOTE, quote())]);
    let dashboard = setup(&control, &feed, DashboardConfig::default());

    let first = dashboard.load_default(QUOTE).await.unwrap();
    assert!(!first.cached);
    assert_eq!(first.raw, quote());
    assert_eq!(first.fields, ["c", "o", "h", "l", "pc", "d", "dp"]);
    assert_eq!(first.analysis.widget_type, WidgetType::Financial);
    assert!(matches!(first.display, DisplayConfig::Cards(_)));
    assert_eq!(first.value("pc"), Some(&json!(149)));

    let second = dashboard.load_default(QUOTE).await.unwrap();
    assert!(second.cached);
    assert!(!second.stale);
    assert_eq!(feed.calls(), 1);
}

#[tokio::test]
async fn candle_payload_becomes_candle_chart() {
    let control = ClockControl::new();
    let feed = Feed::with([(CANDLES, candles())]);
    let dashboard = setup(&control, &feed, DashboardConfig::default());

    let widget = dashboard.refresh_widget(CANDLES, secs(60)).await.unwrap();
    assert_eq!(widget.analysis.widget_type, WidgetType::CandleChart);
    assert_eq!(widget.analysis.interval, Some(Interval::Intraday));
    let DisplayConfig::Chart(chart) = widget.display else {
        panic!("expected a chart");
    };
    assert_eq!(chart.close_field.as_deref(), Some("c"));
}

#[tokio::test]
async fn xml_payload_fields_are_addressable() {
    let control = ClockControl::new();
    let feed = Feed::with([(RATES, json!(r#"<rates base="USD"><rate>0.92</rate></rates>"#))]);
    let dashboard = setup(&control, &feed, DashboardConfig::default());

    let widget = dashboard.load_default(RATES).await.unwrap();
    assert_eq!(widget.fields, ["rates.@_base", "rates.rate"]);
    assert_eq!(widget.value("rates.rate"), Some(&json!(0.92)));
}

#[tokio::test]
async fn failing_upstream_falls_back_to_last_good_payload() {
    let control = ClockControl::new();
    let feed = Feed::with([(QUOTE, quote())]);
    let dashboard = setup(&control, &feed, DashboardConfig::default());

    dashboard.refresh_widget(QUOTE, secs(30)).await.unwrap();
    feed.set_down(true);
    control.advance(secs(45));

    let widget = dashboard.refresh_widget(QUOTE, secs(30)).await.unwrap();
    assert!(widget.cached);
    assert!(widget.stale);
    assert!(widget.from_fallback);
    assert_eq!(widget.raw, quote());
    assert_eq!(feed.calls(), 2);
}

#[tokio::test]
async fn widget_max_age_is_sixty_refresh_intervals() {
    let control = ClockControl::new();
    let feed = Feed::with([(QUOTE, quote())]);
    let dashboard = setup(&control, &feed, DashboardConfig::default());

    dashboard.refresh_widget(QUOTE, secs(10)).await.unwrap();
    feed.set_down(true);

    control.advance(secs(590));
    assert!(dashboard.refresh_widget(QUOTE, secs(10)).await.unwrap().from_fallback);

    control.advance(secs(20));
    let error = dashboard.refresh_widget(QUOTE, secs(10)).await.unwrap_err();
    assert!(error.is_fetch_failure() || error.is_expired());
}

#[tokio::test]
async fn force_refresh_bypasses_fresh_data() {
    let control = ClockControl::new();
    let feed = Feed::with([(QUOTE, quote())]);
    let dashboard = setup(&control, &feed, DashboardConfig::default());

    dashboard.refresh_widget(QUOTE, secs(60)).await.unwrap();
    let widget = dashboard.force_refresh(QUOTE, secs(60)).await.unwrap();

    assert!(!widget.cached);
    assert_eq!(feed.calls(), 2);
}

#[tokio::test]
async fn force_refresh_has_no_fallback() {
    let control = ClockControl::new();
    let feed = Feed::with([(QUOTE, quote())]);
    let dashboard = setup(&control, &feed, DashboardConfig::default());

    dashboard.refresh_widget(QUOTE, secs(60)).await.unwrap();
    feed.set_down(true);

    let error = dashboard.force_refresh(QUOTE, secs(60)).await.unwrap_err();
    assert!(error.is_fetch_failure());
    assert!(dashboard.stats().entries().is_empty());
}

#[tokio::test]
async fn stats_and_cleanup() {
    let control = ClockControl::new();
    let feed = Feed::with([(QUOTE, quote()), (CANDLES, candles()), (RATES, json!("<a/>"))]);
    let config = DashboardConfig {
        cleanup_max_age: secs(600),
        ..DashboardConfig::default()
    };
    let dashboard = setup(&control, &feed, config);

    dashboard.load_default(QUOTE).await.unwrap();
    dashboard.load_default(CANDLES).await.unwrap();
    control.advance(secs(700));
    dashboard.load_default(RATES).await.unwrap();

    assert_eq!(dashboard.stats().total_entries(), 3);
    assert_eq!(dashboard.stats_for("https://finnhub.io/").len(), 2);

    assert_eq!(dashboard.cleanup_default(), 2);
    assert_eq!(dashboard.stats().total_entries(), 1);
    assert!(dashboard.invalidate(RATES));
    assert!(!dashboard.invalidate(RATES));
}

#[tokio::test]
async fn janitor_uses_configured_schedule() {
    let control = ClockControl::new();
    let feed = Feed::with([(QUOTE, quote())]);
    let config = DashboardConfig {
        cleanup_period: secs(60),
        cleanup_max_age: secs(90),
        ..DashboardConfig::default()
    };
    let dashboard = setup(&control, &feed, config);
    let janitor = dashboard.start_janitor();

    dashboard.load_default(QUOTE).await.unwrap();
    for _ in 0..10 {
        tokio::task::yield_now().await;
    }

    control.advance(secs(60));
    for _ in 0..10 {
        tokio::task::yield_now().await;
    }
    assert_eq!(dashboard.cache().len(), 1);

    control.advance(secs(60));
    for _ in 0..10 {
        tokio::task::yield_now().await;
    }
    assert!(dashboard.cache().is_empty());
    janitor.stop();
}

#[tokio::test]
async fn clones_share_the_cache() {
    let control = ClockControl::new();
    let feed = Feed::with([(QUOTE, quote())]);
    let dashboard = setup(&control, &feed, DashboardConfig::default());
    let other = dashboard.clone();

    dashboard.load(QUOTE, GetOptions::default()).await.unwrap();
    assert!(other.load(QUOTE, GetOptions::default()).await.unwrap().cached);
    assert_eq!(feed.calls(), 1);
}
