//! Column selection and per-record security decisions.

use std::collections::HashSet;

use serde_json::Value;

use crate::error::DecisionError;

/// Set of field names a column predicate permits.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldSet(HashSet<String>);

impl FieldSet {
    /// Create an empty field set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a field name.
    pub fn insert(&mut self, field: impl Into<String>) -> bool {
        self.0.insert(field.into())
    }

    /// Add a field name, builder style.
    pub fn with(mut self, field: impl Into<String>) -> Self {
        self.insert(field);
        self
    }

    /// Check whether a field is permitted.
    pub fn contains(&self, field: &str) -> bool {
        self.0.contains(field)
    }

    /// Number of permitted fields.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check whether no field is permitted.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate the permitted field names (unordered).
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for FieldSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

impl<S: Into<String>, const N: usize> From<[S; N]> for FieldSet {
    fn from(fields: [S; N]) -> Self {
        fields.into_iter().collect()
    }
}

/// Columns visible on an admitted record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Columns {
    /// Every field of the record.
    All,
    /// Only the listed fields that exist on the record.
    Only(FieldSet),
}

impl Columns {
    /// Select only the given fields.
    pub fn only<S: Into<String>>(fields: impl IntoIterator<Item = S>) -> Self {
        Columns::Only(fields.into_iter().collect())
    }

    /// Check if this selects every field.
    pub fn is_all(&self) -> bool {
        matches!(self, Columns::All)
    }
}

impl Default for Columns {
    fn default() -> Self {
        Columns::All
    }
}

impl From<FieldSet> for Columns {
    fn from(fields: FieldSet) -> Self {
        Columns::Only(fields)
    }
}

/// Combined row and column decision for a single record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// The record is not visible.
    Exclude,
    /// The record is visible with the given columns.
    Include(Columns),
}

impl Decision {
    /// Include every column.
    pub fn include_all() -> Self {
        Decision::Include(Columns::All)
    }

    /// Include only the given fields.
    pub fn include_only<S: Into<String>>(fields: impl IntoIterator<Item = S>) -> Self {
        Decision::Include(Columns::only(fields))
    }

    /// Check if the record is admitted.
    pub fn is_included(&self) -> bool {
        matches!(self, Decision::Include(_))
    }

    /// Decode a loosely typed decision.
    ///
    /// `false` excludes, `true` includes every column and an array of
    /// strings includes exactly those fields. Anything else is rejected
    /// rather than coerced.
    pub fn from_json(value: &Value) -> Result<Self, DecisionError> {
        match value {
            Value::Bool(false) => Ok(Decision::Exclude),
            Value::Bool(true) => Ok(Decision::include_all()),
            Value::Array(items) => {
                let mut fields = FieldSet::new();
                for item in items {
                    match item {
                        Value::String(name) => {
                            fields.insert(name.as_str());
                        }
                        other => return Err(DecisionError::FieldName(json_kind(other))),
                    }
                }
                Ok(Decision::Include(Columns::Only(fields)))
            }
            other => Err(DecisionError::Shape(json_kind(other))),
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
        Value::Object(_) => "object",
    }
}
