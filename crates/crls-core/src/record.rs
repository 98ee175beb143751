//! Record model.
//!
//! A record is any value with named fields that can produce a projected
//! copy of itself. The evaluator only reads records; projection always
//! builds a new value.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::columns::FieldSet;
use crate::error::{GuardError, GuardResult};

/// A structured value with named fields.
pub trait Record: Clone {
    /// Field names in the record's natural order.
    fn field_names(&self) -> Vec<&str>;

    /// Check whether the record has a field.
    fn has_field(&self, name: &str) -> bool {
        self.field_names().contains(&name)
    }

    /// Build a copy holding only the fields in `fields`.
    ///
    /// Output order follows the record's own field order. Names in `fields`
    /// that the record lacks are skipped.
    fn project(&self, fields: &FieldSet) -> Self;
}

/// Default record type: an insertion-ordered map of JSON values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Row(Map<String, Value>);

impl Row {
    /// Create an empty row.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a field, builder style.
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(name.into(), value.into());
        self
    }

    /// Get a field value.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if the row has no fields.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate fields in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Unwrap into the underlying JSON map.
    pub fn into_inner(self) -> Map<String, Value> {
        self.0
    }
}

impl From<Map<String, Value>> for Row {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl TryFrom<Value> for Row {
    type Error = GuardError;

    fn try_from(value: Value) -> GuardResult<Self> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            other => Err(GuardError::InvalidRecord(format!(
                "expected JSON object, got {}",
                other
            ))),
        }
    }
}

impl Record for Row {
    fn field_names(&self) -> Vec<&str> {
        self.0.keys().map(String::as_str).collect()
    }

    fn has_field(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    fn project(&self, fields: &FieldSet) -> Self {
        Self(self.0.project(fields))
    }
}

impl Record for Map<String, Value> {
    fn field_names(&self) -> Vec<&str> {
        self.keys().map(String::as_str).collect()
    }

    fn has_field(&self, name: &str) -> bool {
        self.contains_key(name)
    }

    fn project(&self, fields: &FieldSet) -> Self {
        self.iter()
            .filter(|(name, _)| fields.contains(name))
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect()
    }
}

impl<V: Clone> Record for BTreeMap<String, V> {
    fn field_names(&self) -> Vec<&str> {
        self.keys().map(String::as_str).collect()
    }

    fn has_field(&self, name: &str) -> bool {
        self.contains_key(name)
    }

    fn project(&self, fields: &FieldSet) -> Self {
        self.iter()
            .filter(|(name, _)| fields.contains(name))
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect()
    }
}
