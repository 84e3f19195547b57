use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

use crate::parser::step::StepValue;

/// Property name to value, as returned by a property-set lookup.
pub type PropertyMap = BTreeMap<String, PropertyValue>;

/// Scalar value of a single property.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Text(String),
    Real(f64),
    Integer(i64),
    Boolean(bool),
    Null,
}

impl PropertyValue {
    /// Absent and empty-string values both count as empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            PropertyValue::Null => true,
            PropertyValue::Text(s) => s.is_empty(),
            _ => false,
        }
    }

    #[must_use]
    pub fn from_step(value: &StepValue) -> Self {
        match value {
            StepValue::String(s) | StepValue::Enum(s) => PropertyValue::Text(s.clone()),
            StepValue::Real(f) => PropertyValue::Real(*f),
            StepValue::Integer(i) => PropertyValue::Integer(*i),
            StepValue::Boolean(b) => PropertyValue::Boolean(*b),
            StepValue::Typed { value, .. } => PropertyValue::from_step(value),
            StepValue::Reference(id) => PropertyValue::Text(format!("#{id}")),
            StepValue::List(items) => {
                let parts: Vec<String> = items
                    .iter()
                    .map(PropertyValue::from_step)
                    .filter(|v| !v.is_empty())
                    .map(|v| v.to_string())
                    .collect();
                if parts.is_empty() {
                    PropertyValue::Null
                } else {
                    PropertyValue::Text(parts.join(", "))
                }
            }
            StepValue::Null | StepValue::Derived => PropertyValue::Null,
        }
    }
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyValue::Text(s) => f.write_str(s),
            PropertyValue::Real(v) => write!(f, "{v:?}"),
            PropertyValue::Integer(v) => write!(f, "{v}"),
            PropertyValue::Boolean(true) => f.write_str("True"),
            PropertyValue::Boolean(false) => f.write_str("False"),
            PropertyValue::Null => Ok(()),
        }
    }
}

impl From<&str> for PropertyValue {
    fn from(s: &str) -> Self {
        PropertyValue::Text(s.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(s: String) -> Self {
        PropertyValue::Text(s)
    }
}

impl From<f64> for PropertyValue {
    fn from(v: f64) -> Self {
        PropertyValue::Real(v)
    }
}

impl From<i64> for PropertyValue {
    fn from(v: i64) -> Self {
        PropertyValue::Integer(v)
    }
}

impl From<bool> for PropertyValue {
    fn from(v: bool) -> Self {
        PropertyValue::Boolean(v)
    }
}
