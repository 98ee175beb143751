//! Evaluator configuration.

use serde::{Deserialize, Serialize};

use crate::error::{GuardError, GuardResult};

/// Default label recorded on guard tracing spans.
pub const DEFAULT_LABEL: &str = "guard";

/// What to do when a column selection names a field the record lacks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingFieldPolicy {
    /// Skip the field silently.
    #[default]
    Ignore,
    /// Fail the guard call with [`GuardError::UnknownField`].
    Reject,
}

/// Configuration shared by every call of one guard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Handling of selected fields absent from a record.
    pub missing_fields: MissingFieldPolicy,

    /// Name recorded on tracing spans, to tell guards apart in logs.
    pub label: String,
}

impl FilterConfig {
    /// Create the default configuration.
    pub fn new() -> Self {
        Self {
            missing_fields: MissingFieldPolicy::Ignore,
            label: DEFAULT_LABEL.to_string(),
        }
    }

    /// Parse a configuration from a JSON document.
    ///
    /// Missing keys take their default values.
    pub fn from_json(json: &str) -> GuardResult<Self> {
        serde_json::from_str(json).map_err(|e| GuardError::Config(e.to_string()))
    }

    /// Set the missing field policy.
    pub fn with_missing_fields(mut self, policy: MissingFieldPolicy) -> Self {
        self.missing_fields = policy;
        self
    }

    /// Reject selections naming fields the record lacks.
    pub fn strict(self) -> Self {
        self.with_missing_fields(MissingFieldPolicy::Reject)
    }

    /// Set the tracing label.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Check if missing fields are rejected.
    pub fn is_strict(&self) -> bool {
        self.missing_fields == MissingFieldPolicy::Reject
    }
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self::new()
    }
}
