// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! XML to JSON conversion.
//!
//! The conversion mirrors the object model dashboards expect from XML feeds: elements become
//! keys, repeated siblings become arrays, attributes become `@_name` keys and the text of an
//! element that also carries attributes or children becomes `#text`.

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use serde_json::{Map, Number, Value};

/// Prefix for attribute keys.
pub const ATTRIBUTE_PREFIX: &str = "@_";

/// Key holding the text of an element that also has attributes or children.
pub const TEXT_KEY: &str = "#text";

/// Returns `true` when `text` is plausibly an XML document.
#[must_use]
pub fn looks_like_xml(text: &str) -> bool {
    let trimmed = text.trim();
    trimmed.starts_with('<') && trimmed.ends_with('>')
}

/// Converts an XML document into a JSON object keyed by the root element name.
///
/// Returns `None` when the document is malformed or has no root element.
#[must_use]
pub fn xml_to_json(text: &str) -> Option<Value> {
    let mut reader = Reader::from_str(text);
    reader.config_mut().trim_text(true);

    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<(String, Value)> = None;

    loop {
        let event = match reader.read_event() {
            Ok(event) => event,
            Err(error) => {
                tracing::debug!(%error, "xml payload could not be parsed");
                return None;
            }
        };

        match event {
            Event::Start(start) => stack.push(Element::open(&start)),
            Event::Empty(start) => {
                let element = Element::open(&start);
                close(element, &mut stack, &mut root);
            }
            Event::End(_) => {
                let element = stack.pop()?;
                close(element, &mut stack, &mut root);
            }
            Event::Text(text) => {
                if let Some(top) = stack.last_mut() {
                    let text = text.unescape().ok()?;
                    top.text.push_str(&text);
                }
            }
            Event::CData(data) => {
                if let Some(top) = stack.last_mut() {
                    top.text.push_str(&String::from_utf8_lossy(&data.into_inner()));
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !stack.is_empty() {
        return None;
    }

    let (name, value) = root?;
    let mut object = Map::new();
    object.insert(name, value);
    Some(Value::Object(object))
}

#[derive(Debug)]
struct Element {
    name: String,
    attributes: Map<String, Value>,
    children: Map<String, Value>,
    text: String,
}

impl Element {
    fn open(start: &BytesStart<'_>) -> Self {
        let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
        let mut attributes = Map::new();
        for attribute in start.attributes().flatten() {
            let key = String::from_utf8_lossy(attribute.key.as_ref());
            let value = attribute.unescape_value().map_or_else(
                |_| String::from_utf8_lossy(&attribute.value).into_owned(),
                std::borrow::Cow::into_owned,
            );
            attributes.insert(format!("{ATTRIBUTE_PREFIX}{key}"), Value::String(value));
        }

        Self {
            name,
            attributes,
            children: Map::new(),
            text: String::new(),
        }
    }

    fn finish(self) -> (String, Value) {
        if self.attributes.is_empty() && self.children.is_empty() {
            return (self.name, scalar(&self.text));
        }

        let mut object = self.attributes;
        for (key, value) in self.children {
            object.insert(key, value);
        }
        if !self.text.is_empty() {
            object.insert(TEXT_KEY.to_string(), scalar(&self.text));
        }
        (self.name, Value::Object(object))
    }
}

fn close(element: Element, stack: &mut [Element], root: &mut Option<(String, Value)>) {
    let (name, value) = element.finish();
    match stack.last_mut() {
        Some(parent) => append_child(&mut parent.children, name, value),
        None => {
            if root.is_none() {
                *root = Some((name, value));
            }
        }
    }
}

fn append_child(children: &mut Map<String, Value>, name: String, value: Value) {
    match children.get_mut(&name) {
        Some(Value::Array(items)) => items.push(value),
        Some(existing) => {
            let first = existing.take();
            *existing = Value::Array(vec![first, value]);
        }
        None => {
            children.insert(name, value);
        }
    }
}

/// Leaf text becomes a boolean or number when it reads as one.
fn scalar(text: &str) -> Value {
    let trimmed = text.trim();
    match trimmed {
        "" => return Value::String(String::new()),
        "true" => return Value::Bool(true),
        "false" => return Value::Bool(false),
        _ => {}
    }

    if let Ok(integer) = trimmed.parse::<i64>() {
        return Value::Number(integer.into());
    }

    let numeric = trimmed
        .bytes()
        .all(|b| b.is_ascii_digit() || matches!(b, b'-' | b'+' | b'.' | b'e' | b'E'));
    if numeric && let Some(number) = trimmed.parse::<f64>().ok().and_then(Number::from_f64) {
        return Value::Number(number);
    }

    Value::String(text.to_string())
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use serde_json::json;

    use super::*;

    #[rstest]
    #[case::document("<a>1</a>", true)]
    #[case::padded("  \n<rss/>\n ", true)]
    #[case::json("{\"a\": 1}", false)]
    #[case::text("hello", false)]
    #[case::unterminated("<a", false)]
    fn xml_detection(#[case] text: &str, #[case] expected: bool) {
        assert_eq!(looks_like_xml(text), expected);
    }

    #[test]
    fn elements_become_keys_with_typed_leaves() {
        let value = xml_to_json(
            "<?xml version=\"1.0\"?><quote><symbol>AAPL</symbol><c>150.2</c><open>true</open><n>7</n></quote>",
        );
        assert_eq!(
            value,
            Some(json!({"quote": {"symbol": "AAPL", "c": 150.2, "open": true, "n": 7}}))
        );
    }

    #[test]
    fn repeated_siblings_become_arrays() {
        let value = xml_to_json("<rates><rate>1</rate><rate>2</rate><rate>3</rate><base>USD</base></rates>");
        assert_eq!(value, Some(json!({"rates": {"rate": [1, 2, 3], "base": "USD"}})));
    }

    #[test]
    fn attributes_and_text() {
        let value = xml_to_json(r#"<rate currency="EUR" kind="spot">1.08</rate>"#);
        assert_eq!(
            value,
            Some(json!({"rate": {"@_currency": "EUR", "@_kind": "spot", "#text": 1.08}}))
        );
    }

    #[test]
    fn empty_elements() {
        assert_eq!(xml_to_json("<a><b/><c></c></a>"), Some(json!({"a": {"b": "", "c": ""}})));
        assert_eq!(xml_to_json(r#"<a id="x"/>"#), Some(json!({"a": {"@_id": "x"}})));
    }

    #[test]
    fn comments_and_cdata() {
        let value = xml_to_json("<a><!-- note --><b><![CDATA[x < y]]></b></a>");
        assert_eq!(value, Some(json!({"a": {"b": "x < y"}})));
    }

    #[test]
    fn escaped_text_is_unescaped() {
        assert_eq!(xml_to_json("<a>AT&amp;T</a>"), Some(json!({"a": "AT&T"})));
    }

    #[test]
    fn non_numeric_leaves_stay_text() {
        assert_eq!(xml_to_json("<a>inf</a>"), Some(json!({"a": "inf"})));
        assert_eq!(xml_to_json("<a>2024-01-02</a>"), Some(json!({"a": "2024-01-02"})));
    }

    #[rstest]
    #[case::mismatched("<a><b></a>")]
    #[case::unclosed("<a><b>1</b>")]
    #[case::no_root("just text")]
    fn malformed_documents(#[case] text: &str) {
        assert_eq!(xml_to_json(text), None);
    }
}
