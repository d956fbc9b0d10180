use std::collections::btree_map;
use std::collections::BTreeMap;

use serde::Serialize;

/// The value held by a single label: either one scalar or a list of scalars of the same kind.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub enum LabelData<T> {
    #[serde(rename = "value")]
    Scalar(T),
    #[serde(rename = "values")]
    Slice(Vec<T>),
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct LabelValue<T> {
    #[serde(flatten)]
    pub data: LabelData<T>,
    /// Set for labels defined at the service level rather than on a single event.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub global: bool,
}

impl<T> LabelValue<T> {
    pub fn scalar(&self) -> Option<&T> {
        match &self.data {
            LabelData::Scalar(v) => Some(v),
            LabelData::Slice(_) => None,
        }
    }

    pub fn slice(&self) -> Option<&[T]> {
        match &self.data {
            LabelData::Scalar(_) => None,
            LabelData::Slice(v) => Some(v),
        }
    }
}

/// A set of labels keyed by name.
///
/// `Clone` is a deep copy: slice values are copied, never shared, so an event can take its own
/// copy of the resource-level labels before adding event-level ones.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(transparent)]
pub struct LabelSet<T>(BTreeMap<String, LabelValue<T>>);

/// String-valued labels.
pub type Labels = LabelSet<String>;

/// Numeric labels, stored as 64-bit floats.
pub type NumericLabels = LabelSet<f64>;

impl<T> Default for LabelSet<T> {
    fn default() -> Self {
        Self(BTreeMap::new())
    }
}

impl<T> LabelSet<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the label `key` to `value`. Any existing label with the same key is replaced
    /// and the new one is local.
    pub fn set(&mut self, key: impl Into<String>, value: T) {
        self.0.insert(
            key.into(),
            LabelValue {
                data: LabelData::Scalar(value),
                global: false,
            },
        );
    }

    /// Sets the label `key` to the list `values`. Any existing label with the same key is
    /// replaced and the new one is local.
    pub fn set_slice(&mut self, key: impl Into<String>, values: Vec<T>) {
        self.0.insert(
            key.into(),
            LabelValue {
                data: LabelData::Slice(values),
                global: false,
            },
        );
    }

    /// Marks every label in the set as global.
    pub fn mark_all_global(&mut self) {
        for value in self.0.values_mut() {
            value.global = true;
        }
    }

    pub fn get(&self, key: &str) -> Option<&LabelValue<T>> {
        self.0.get(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<LabelValue<T>> {
        self.0.remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, LabelValue<T>> {
        self.0.iter()
    }
}

impl<'a, T> IntoIterator for &'a LabelSet<T> {
    type Item = (&'a String, &'a LabelValue<T>);
    type IntoIter = btree_map::Iter<'a, String, LabelValue<T>>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
