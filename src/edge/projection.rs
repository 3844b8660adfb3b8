//! Shallow field projection of JSON documents
//!
//! Given an allow-list of top-level keys, keep only those keys. Nested values
//! come back whole; there is no path syntax.

use serde_json::{Map, Value};

/// Allow-list of top-level field names, parsed from `fields=a,b,c`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSelector {
    fields: Vec<String>,
}

impl FieldSelector {
    /// Parse a comma-delimited list
    ///
    /// Names are trimmed and empty names dropped; `None` when nothing is left.
    pub fn parse(raw: &str) -> Option<Self> {
        let mut fields: Vec<String> = Vec::new();
        for name in raw.split(',').map(str::trim).filter(|n| !n.is_empty()) {
            if !fields.iter().any(|f| f == name) {
                fields.push(name.to_string());
            }
        }
        if fields.is_empty() {
            None
        } else {
            Some(Self { fields })
        }
    }

    pub fn allows(&self, name: &str) -> bool {
        self.fields.iter().any(|f| f == name)
    }
}

/// Narrow an object to the selected keys
///
/// Keys missing from the object are skipped.
pub fn project_object(object: Map<String, Value>, selector: &FieldSelector) -> Map<String, Value> {
    object
        .into_iter()
        .filter(|(key, _)| selector.allows(key))
        .collect()
}

/// Apply an optional selector to any JSON value
///
/// Objects are narrowed, arrays are narrowed element by element, scalars and
/// a missing selector leave the value unchanged.
pub fn project(value: Value, selector: Option<&FieldSelector>) -> Value {
    let Some(selector) = selector else {
        return value;
    };
    match value {
        Value::Object(object) => Value::Object(project_object(object, selector)),
        Value::Array(items) => Value::Array(
            items
                .into_iter()
                .map(|item| match item {
                    Value::Object(object) => Value::Object(project_object(object, selector)),
                    other => other,
                })
                .collect(),
        ),
        scalar => scalar,
    }
}
