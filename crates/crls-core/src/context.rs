//! Attribute-bag context for callers without their own context type.
//!
//! Guards are generic over the context, so any caller value works. This type
//! covers the common case of an identity plus a handful of named attributes
//! (tenant, role, org) compared against record fields by predicates.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Requester identity and attributes for one guard call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SecurityContext {
    /// Authenticated principal, if any.
    #[serde(default)]
    pub principal: Option<String>,
    /// Named attributes used by predicates (e.g. tenant, role).
    #[serde(default)]
    pub attributes: HashMap<String, Value>,
}

impl SecurityContext {
    /// Create an anonymous context with no attributes.
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// Create a context for a principal.
    pub fn new(principal: impl Into<String>) -> Self {
        Self {
            principal: Some(principal.into()),
            attributes: HashMap::new(),
        }
    }

    /// Set the principal.
    pub fn with_principal(mut self, principal: impl Into<String>) -> Self {
        self.principal = Some(principal.into());
        self
    }

    /// Add an attribute.
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// Get an attribute value.
    pub fn attribute(&self, name: &str) -> Option<&Value> {
        self.attributes.get(name)
    }

    /// Get the principal.
    pub fn principal(&self) -> Option<&str> {
        self.principal.as_deref()
    }

    /// Check if a principal is set.
    pub fn is_authenticated(&self) -> bool {
        self.principal.is_some()
    }
}
