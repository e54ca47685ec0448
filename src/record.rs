//! Loosely-typed table rows.
//!
//! Rows come from an external schema with no guarantees, so every accessor
//! returns `Option` and callers try a list of aliased field names.

use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Number(f64),
    List(Vec<String>),
}

impl FieldValue {
    /// Convert a JSON value, dropping anything that has no field meaning.
    fn from_json(value: Value) -> Option<Self> {
        match value {
            Value::String(text) => Some(Self::Text(text)),
            Value::Number(number) => number.as_f64().map(Self::Number),
            Value::Array(items) => Some(Self::List(
                items
                    .into_iter()
                    .filter_map(|item| match item {
                        Value::String(text) => Some(text),
                        Value::Number(number) => Some(number.to_string()),
                        _ => None,
                    })
                    .collect(),
            )),
            Value::Null | Value::Bool(_) | Value::Object(_) => None,
        }
    }

    /// Scalar text view. Lists yield their first non-blank element.
    pub fn as_text(&self) -> Option<String> {
        match self {
            Self::Text(text) => Some(text.clone()),
            Self::Number(number) => Some(format_number(*number)),
            Self::List(items) => items.iter().find(|item| !item.trim().is_empty()).cloned(),
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(number) => Some(*number),
            Self::Text(text) => text.trim().parse().ok(),
            Self::List(items) => items.first().and_then(|item| item.trim().parse().ok()),
        }
    }

    /// Every element for lists, the single value otherwise.
    pub fn as_list(&self) -> Vec<String> {
        match self {
            Self::List(items) => items.clone(),
            other => other.as_text().into_iter().collect(),
        }
    }
}

fn format_number(number: f64) -> String {
    if number.fract() == 0.0 && number.abs() < 1e15 {
        format!("{}", number as i64)
    } else {
        number.to_string()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(from = "BTreeMap<String, Value>")]
pub struct Record {
    fields: BTreeMap<String, FieldValue>,
}

impl From<BTreeMap<String, Value>> for Record {
    fn from(raw: BTreeMap<String, Value>) -> Self {
        let fields = raw
            .into_iter()
            .filter_map(|(key, value)| FieldValue::from_json(value).map(|v| (key, v)))
            .collect();
        Self { fields }
    }
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: FieldValue) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: FieldValue) {
        self.fields.insert(key.into(), value);
    }

    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.fields.get(key)
    }

    /// First non-blank text among `keys`, trimmed.
    pub fn get_text(&self, keys: &[&str]) -> Option<String> {
        keys.iter()
            .filter_map(|key| self.fields.get(*key))
            .filter_map(FieldValue::as_text)
            .map(|text| text.trim().to_string())
            .find(|text| !text.is_empty())
    }

    pub fn get_number(&self, keys: &[&str]) -> Option<f64> {
        keys.iter()
            .filter_map(|key| self.fields.get(*key))
            .find_map(FieldValue::as_number)
    }

    /// All values of the first present key among `keys`.
    pub fn get_list(&self, keys: &[&str]) -> Vec<String> {
        keys.iter()
            .filter_map(|key| self.fields.get(*key))
            .map(FieldValue::as_list)
            .find(|items| !items.is_empty())
            .unwrap_or_default()
    }
}

/// Turn a decoded JSON document into records.
///
/// Anything other than an array (including error-shaped objects) becomes an
/// empty collection; array elements that are not objects are skipped.
pub fn records_from_value(value: Value) -> Vec<Record> {
    match value {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| match item {
                Value::Object(map) => Some(Record::from(
                    map.into_iter().collect::<BTreeMap<String, Value>>(),
                )),
                _ => None,
            })
            .collect(),
        other => {
            tracing::warn!(
                kind = json_kind(&other),
                "expected a sequence of records, using an empty collection"
            );
            Vec::new()
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(map) if map.contains_key("error") => "error object",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn drops_values_without_field_meaning() {
        let records = records_from_value(json!([{
            "Email": "a@example.com",
            "Count": 3,
            "Tags": ["x", 2, null],
            "Missing": null,
            "Flag": true,
            "Nested": {"a": 1}
        }]));
        let record = &records[0];
        assert_eq!(record.get_text(&["Email"]).as_deref(), Some("a@example.com"));
        assert_eq!(record.get_number(&["Count"]), Some(3.0));
        assert_eq!(record.get_list(&["Tags"]), vec!["x".to_string(), "2".to_string()]);
        assert!(record.get("Missing").is_none());
        assert!(record.get("Flag").is_none());
        assert!(record.get("Nested").is_none());
    }

    #[test]
    fn non_sequence_input_is_empty() {
        assert!(records_from_value(json!({"error": "NOT_FOUND"})).is_empty());
        assert!(records_from_value(json!("oops")).is_empty());
        assert_eq!(records_from_value(json!([1, {"a": "b"}])).len(), 1);
    }

    #[test]
    fn text_lookup_skips_blank_aliases() {
        let record = Record::new()
            .with("Medium", FieldValue::Text("  ".into()))
            .with("source_medium", FieldValue::List(vec!["".into(), "Referral".into()]));
        assert_eq!(
            record.get_text(&["Medium", "source_medium"]).as_deref(),
            Some("Referral")
        );
    }

    #[test]
    fn numbers_render_without_trailing_fraction() {
        assert_eq!(FieldValue::Number(42.0).as_text().as_deref(), Some("42"));
        assert_eq!(FieldValue::Number(1.5).as_text().as_deref(), Some("1.5"));
        assert_eq!(FieldValue::Text(" 12 ".into()).as_number(), Some(12.0));
    }
}
