use std::collections::btree_map;
use std::collections::BTreeMap;

use opentelemetry_proto::tonic::common::v1::{any_value, KeyValue};

/// A typed attribute value.
///
/// OTLP byte and key/value-list values have no counterpart and are dropped when the bag is
/// built, as are slices holding them.
#[derive(Clone, Debug, PartialEq)]
pub enum AttributeValue {
    Str(String),
    Bool(bool),
    Int(i64),
    Double(f64),
    Slice(Vec<AttributeValue>),
}

impl AttributeValue {
    fn from_proto(value: &any_value::Value) -> Option<Self> {
        match value {
            any_value::Value::StringValue(s) => Some(Self::Str(s.clone())),
            any_value::Value::BoolValue(b) => Some(Self::Bool(*b)),
            any_value::Value::IntValue(i) => Some(Self::Int(*i)),
            any_value::Value::DoubleValue(d) => Some(Self::Double(*d)),
            any_value::Value::ArrayValue(arr) => arr
                .values
                .iter()
                .map(|v| v.value.as_ref().and_then(Self::from_proto))
                .collect::<Option<Vec<_>>>()
                .map(Self::Slice),
            any_value::Value::BytesValue(_) | any_value::Value::KvlistValue(_) => None,
        }
    }

    /// The string held by this value, or an empty string for any other kind.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Str(s) => s,
            _ => "",
        }
    }

    /// The integer held by this value, or zero for any other kind.
    pub fn as_int(&self) -> i64 {
        match self {
            Self::Int(i) => *i,
            _ => 0,
        }
    }
}

impl From<&str> for AttributeValue {
    fn from(s: &str) -> Self {
        Self::Str(s.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(s: String) -> Self {
        Self::Str(s)
    }
}

impl From<bool> for AttributeValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for AttributeValue {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

impl From<f64> for AttributeValue {
    fn from(d: f64) -> Self {
        Self::Double(d)
    }
}

/// A read-only bag of attributes keyed by their dotted semantic name.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Attributes(BTreeMap<String, AttributeValue>);

impl Attributes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a bag from OTLP key/values. A repeated key keeps its last value.
    pub fn from_key_values(attrs: &[KeyValue]) -> Self {
        attrs
            .iter()
            .filter_map(|kv| {
                kv.value
                    .as_ref()
                    .and_then(|v| v.value.as_ref())
                    .and_then(AttributeValue::from_proto)
                    .map(|v| (kv.key.clone(), v))
            })
            .collect()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<AttributeValue>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&AttributeValue> {
        self.0.get(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, AttributeValue> {
        self.0.iter()
    }
}

impl FromIterator<(String, AttributeValue)> for Attributes {
    fn from_iter<I: IntoIterator<Item = (String, AttributeValue)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a Attributes {
    type Item = (&'a String, &'a AttributeValue);
    type IntoIter = btree_map::Iter<'a, String, AttributeValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use opentelemetry_proto::tonic::common::v1::{AnyValue, ArrayValue, KeyValueList};

    fn make_kv(key: &str, value: any_value::Value) -> KeyValue {
        KeyValue {
            key: key.to_string(),
            value: Some(AnyValue { value: Some(value) }),
        }
    }

    fn array(values: Vec<any_value::Value>) -> any_value::Value {
        any_value::Value::ArrayValue(ArrayValue {
            values: values
                .into_iter()
                .map(|v| AnyValue { value: Some(v) })
                .collect(),
        })
    }

    #[test]
    fn converts_supported_values() {
        let attrs = Attributes::from_key_values(&[
            make_kv("s", any_value::Value::StringValue("x".to_string())),
            make_kv("b", any_value::Value::BoolValue(true)),
            make_kv("i", any_value::Value::IntValue(7)),
            make_kv("d", any_value::Value::DoubleValue(1.5)),
            make_kv(
                "a",
                array(vec![
                    any_value::Value::IntValue(1),
                    any_value::Value::IntValue(2),
                ]),
            ),
        ]);

        assert_eq!(attrs.len(), 5);
        assert_eq!(attrs.get("s"), Some(&AttributeValue::Str("x".to_string())));
        assert_eq!(attrs.get("b"), Some(&AttributeValue::Bool(true)));
        assert_eq!(attrs.get("i"), Some(&AttributeValue::Int(7)));
        assert_eq!(attrs.get("d"), Some(&AttributeValue::Double(1.5)));
        assert_eq!(
            attrs.get("a"),
            Some(&AttributeValue::Slice(vec![
                AttributeValue::Int(1),
                AttributeValue::Int(2)
            ]))
        );
    }

    #[test]
    fn drops_unsupported_values() {
        let attrs = Attributes::from_key_values(&[
            make_kv("bytes", any_value::Value::BytesValue(vec![1, 2])),
            make_kv(
                "kv",
                any_value::Value::KvlistValue(KeyValueList { values: vec![] }),
            ),
            make_kv(
                "mixed",
                array(vec![
                    any_value::Value::StringValue("a".to_string()),
                    any_value::Value::BytesValue(vec![]),
                ]),
            ),
            KeyValue {
                key: "empty".to_string(),
                value: None,
            },
        ]);
        assert!(attrs.is_empty());
    }

    #[test]
    fn repeated_key_keeps_last_value() {
        let attrs = Attributes::from_key_values(&[
            make_kv("k", any_value::Value::IntValue(1)),
            make_kv("k", any_value::Value::IntValue(2)),
        ]);
        assert_eq!(attrs.get("k").map(AttributeValue::as_int), Some(2));
    }

    #[test]
    fn accessors_default_on_other_kinds() {
        assert_eq!(AttributeValue::Int(3).as_str(), "");
        assert_eq!(AttributeValue::from("3").as_int(), 0);
    }
}
