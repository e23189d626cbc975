//! The open key-value document attached to every project.
//!
//! Clients may store arbitrary keys in it. The server only ever touches one
//! key, [`STATUS_KEY`], and does so through [`ProjectMetadata::set`], which
//! replaces that single entry and leaves every other key untouched.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Metadata key holding the project's lifecycle marker.
pub const STATUS_KEY: &str = "status";

/// Value of [`STATUS_KEY`] once a project has been completed.
pub const STATUS_COMPLETED: &str = "completed";

/// Free-form project metadata. Always a JSON object on the wire and in the
/// database; deserializing anything else fails.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProjectMetadata(BTreeMap<String, Value>);

/// Logical project state derived from its metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectStatus {
    /// Any document without the completed marker, including `{}`.
    Open,
    Completed,
}

impl ProjectStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ProjectStatus::Open => "open",
            ProjectStatus::Completed => STATUS_COMPLETED,
        }
    }
}

impl ProjectMetadata {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Set a single key, returning the value it replaced.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(key.into(), value.into())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn status(&self) -> ProjectStatus {
        match self.get(STATUS_KEY).and_then(Value::as_str) {
            Some(STATUS_COMPLETED) => ProjectStatus::Completed,
            _ => ProjectStatus::Open,
        }
    }

    /// True if any key or string value, at any depth, contains U+0000.
    pub fn contains_nul(&self) -> bool {
        self.0
            .iter()
            .any(|(key, value)| key.contains('\0') || value_contains_nul(value))
    }

    /// Merge the completed marker into the document.
    ///
    /// Returns `false` when the project was already completed; the document
    /// is identical either way.
    pub fn mark_completed(&mut self) -> bool {
        let previous = self.set(STATUS_KEY, STATUS_COMPLETED);
        previous.as_ref().and_then(Value::as_str) != Some(STATUS_COMPLETED)
    }
}

fn value_contains_nul(value: &Value) -> bool {
    match value {
        Value::String(s) => s.contains('\0'),
        Value::Array(items) => items.iter().any(value_contains_nul),
        Value::Object(map) => map
            .iter()
            .any(|(key, value)| key.contains('\0') || value_contains_nul(value)),
        Value::Null | Value::Bool(_) | Value::Number(_) => false,
    }
}
