// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use finboard_cache::{Lookup, Served};
use finboard_schema::{Analysis, DisplayConfig, analyze, field_names, normalize, suggest_display, value_at};
use serde::Serialize;
use serde_json::Value;

/// Everything a widget needs to render one payload.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct WidgetData {
    /// The payload as the upstream API returned it.
    pub raw: Value,
    /// The payload after XML/JSON decoding and time-series reshaping.
    pub data: Value,
    /// Field paths a user can pick from.
    pub fields: Vec<String>,
    /// Inferred widget type, schema and series information.
    pub analysis: Analysis,
    /// Suggested rendering.
    pub display: DisplayConfig,
    /// The payload came from the cache rather than a fetch made for this request.
    pub cached: bool,
    /// The payload is older than the requested refresh interval.
    pub stale: bool,
    /// A refresh failed and the payload is the last good one.
    pub from_fallback: bool,
}

impl WidgetData {
    pub(crate) fn from_lookup(lookup: Lookup<Value>) -> Self {
        let served = lookup.served();
        let raw = lookup.into_data();
        let data = normalize(&raw).into_owned();
        let analysis = analyze(&raw);

        Self {
            fields: field_names(&raw),
            display: suggest_display(&analysis),
            analysis,
            cached: served != Served::Fetched,
            stale: matches!(served, Served::Stale | Served::Fallback),
            from_fallback: served == Served::Fallback,
            data,
            raw,
        }
    }

    /// The record the field paths describe: the first element of an array, otherwise the
    /// decoded payload itself.
    #[must_use]
    pub fn sample(&self) -> &Value {
        match &self.data {
            Value::Array(items) => items.first().unwrap_or(&Value::Null),
            other => other,
        }
    }

    /// Resolves a field path picked from [`fields`](Self::fields).
    #[must_use]
    pub fn value(&self, field: &str) -> Option<&Value> {
        value_at(self.sample(), field)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn fields_resolve_against_the_sample() {
        let payload = json!([{"date": "2024-01-01", "quote": {"c": 5}}, {"date": "x"}]);
        let widget = WidgetData::from_lookup(Lookup::new(payload, Served::Fresh));

        assert_eq!(widget.fields, ["date", "quote.c"]);
        assert_eq!(widget.value("quote.c"), Some(&json!(5)));
        assert_eq!(widget.value("missing"), None);
        assert!(widget.cached);
        assert!(!widget.stale);
    }

    #[test]
    fn flags_follow_how_the_payload_was_served() {
        let flags = |served| {
            let widget = WidgetData::from_lookup(Lookup::new(json!({"c": 1}), served));
            (widget.cached, widget.stale, widget.from_fallback)
        };

        assert_eq!(flags(Served::Fetched), (false, false, false));
        assert_eq!(flags(Served::Fresh), (true, false, false));
        assert_eq!(flags(Served::Stale), (true, true, false));
        assert_eq!(flags(Served::Fallback), (true, true, true));
    }

    #[test]
    fn xml_payload_is_decoded() {
        let widget = WidgetData::from_lookup(Lookup::new(json!("<q><c>2.5</c></q>"), Served::Fetched));
        assert_eq!(widget.raw, json!("<q><c>2.5</c></q>"));
        assert_eq!(widget.data, json!({"q": {"c": 2.5}}));
        assert_eq!(widget.fields, ["q.c"]);
        assert_eq!(widget.value("q.c"), Some(&json!(2.5)));
    }

    #[test]
    fn empty_array_has_null_sample() {
        let widget = WidgetData::from_lookup(Lookup::new(json!([]), Served::Fetched));
        assert_eq!(widget.sample(), &Value::Null);
        assert!(widget.fields.is_empty());
    }
}
