use std::collections::hash_map;
use std::collections::HashMap;

use serde_json::{Map, Number, Value};

use crate::error::DecodeError;

/// A multi-value HTTP header collection. Header names are kept exactly as received.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Headers(HashMap<String, Vec<String>>);

impl Headers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `value` to the values held for `name`.
    pub fn add(&mut self, name: &str, value: impl Into<String>) {
        self.0
            .entry(name.to_string())
            .or_default()
            .push(value.into());
    }

    pub fn get(&self, name: &str) -> Option<&[String]> {
        self.0.get(name).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> hash_map::Iter<'_, String, Vec<String>> {
        self.0.iter()
    }
}

/// Adds the entries of a JSON header object to `into`.
///
/// Each value may be null (ignored), a string, or a list of strings. Decoding stops at the
/// first invalid value; entries added for earlier keys stay in `into`.
pub fn decode_headers(object: &Map<String, Value>, into: &mut Headers) -> Result<(), DecodeError> {
    for (name, value) in object {
        match value {
            Value::Null => {}
            Value::String(s) => into.add(name, s.as_str()),
            Value::Array(entries) => {
                for entry in entries {
                    match entry {
                        Value::String(s) => into.add(name, s.as_str()),
                        _ => return Err(DecodeError::InvalidHeaders(value.to_string())),
                    }
                }
            }
            _ => return Err(DecodeError::InvalidHeaders(value.to_string())),
        }
    }
    Ok(())
}

/// Converts `headers` into the structured form stored on events, or `None` when there are
/// no headers.
pub fn headers_to_map(headers: &Headers) -> Option<Map<String, Value>> {
    if headers.is_empty() {
        return None;
    }
    Some(
        headers
            .iter()
            .map(|(name, values)| {
                let values = values.iter().cloned().map(Value::String).collect();
                (name.clone(), Value::Array(values))
            })
            .collect(),
    )
}

/// Recursively converts every number in `value` to a 64-bit float, the only numeric kind
/// the structured value form stored on events supports.
pub fn normalize_value(value: Value) -> Value {
    match value {
        Value::Number(n) => n
            .as_f64()
            .and_then(Number::from_f64)
            .map_or(Value::Number(n), Value::Number),
        Value::Array(values) => Value::Array(values.into_iter().map(normalize_value).collect()),
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(k, v)| (k, normalize_value(v)))
                .collect(),
        ),
        other => other,
    }
}
