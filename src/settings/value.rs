use crate::errors::{CameraError, Result};
use serde::{Deserialize, Serialize};

/// Untyped value handed in by a host for a configuration write.
///
/// Each variant is checked against the target widget's kind at write time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum GenericValue {
    Bool(bool),
    Number(f64),
    Text(String),
}

impl GenericValue {
    pub fn type_name(&self) -> &'static str {
        match self {
            GenericValue::Bool(_) => "bool",
            GenericValue::Number(_) => "number",
            GenericValue::Text(_) => "string",
        }
    }

    /// Narrow a JSON value to the shapes a widget write accepts.
    pub fn from_json(widget: &str, value: serde_json::Value) -> Result<Self> {
        match value {
            serde_json::Value::Bool(b) => Ok(GenericValue::Bool(b)),
            serde_json::Value::String(s) => Ok(GenericValue::Text(s)),
            serde_json::Value::Number(n) => n
                .as_f64()
                .map(GenericValue::Number)
                .ok_or_else(|| CameraError::type_mismatch(widget, "number", n.to_string())),
            serde_json::Value::Null => Err(CameraError::type_mismatch(
                widget,
                "number, string or bool",
                "null",
            )),
            serde_json::Value::Array(_) => Err(CameraError::type_mismatch(
                widget,
                "number, string or bool",
                "array",
            )),
            serde_json::Value::Object(_) => Err(CameraError::type_mismatch(
                widget,
                "number, string or bool",
                "object",
            )),
        }
    }
}

impl From<bool> for GenericValue {
    fn from(value: bool) -> Self {
        GenericValue::Bool(value)
    }
}

impl From<f64> for GenericValue {
    fn from(value: f64) -> Self {
        GenericValue::Number(value)
    }
}

impl From<f32> for GenericValue {
    fn from(value: f32) -> Self {
        GenericValue::Number(f64::from(value))
    }
}

impl From<i32> for GenericValue {
    fn from(value: i32) -> Self {
        GenericValue::Number(f64::from(value))
    }
}

impl From<i64> for GenericValue {
    fn from(value: i64) -> Self {
        GenericValue::Number(value as f64)
    }
}

impl From<&str> for GenericValue {
    fn from(value: &str) -> Self {
        GenericValue::Text(value.to_string())
    }
}

impl From<String> for GenericValue {
    fn from(value: String) -> Self {
        GenericValue::Text(value)
    }
}
