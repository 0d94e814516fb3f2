use std::fmt;
use std::str::FromStr;

use crate::error::{ConfigurationError, ParseError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldType {
    String,
    Number,
    Boolean,
    Json,
}

impl FieldType {
    pub fn name(self) -> &'static str {
        match self {
            FieldType::String => "string",
            FieldType::Number => "number",
            FieldType::Boolean => "boolean",
            FieldType::Json => "json",
        }
    }

    /// Zero value used when a schema omits a default.
    pub fn zero(self) -> Value {
        match self {
            FieldType::String => Value::String(String::new()),
            FieldType::Number => Value::Number(0.0),
            FieldType::Boolean => Value::Bool(false),
            FieldType::Json => Value::Json(serde_json::Value::Null),
        }
    }

    /// Parse an attribute string into a typed value.
    ///
    /// `None` means the attribute is absent: booleans become `false`, every
    /// other type falls back to `default`.
    pub fn parse_attribute(self, raw: Option<&str>, default: &Value) -> Result<Value, ParseError> {
        let Some(raw) = raw else {
            return Ok(match self {
                FieldType::Boolean => Value::Bool(false),
                _ => default.clone(),
            });
        };

        match self {
            FieldType::String => Ok(Value::String(raw.to_owned())),
            FieldType::Boolean => Ok(Value::Bool(raw != "false")),
            FieldType::Number => {
                let trimmed = raw.trim();
                if trimmed.is_empty() {
                    return Ok(default.clone());
                }
                trimmed
                    .parse::<f64>()
                    .ok()
                    .filter(|n| n.is_finite())
                    .map(Value::Number)
                    .ok_or_else(|| ParseError::InvalidNumber(raw.to_owned()))
            }
            FieldType::Json => serde_json::from_str(raw)
                .map(Value::Json)
                .map_err(|err| ParseError::InvalidJson(err.to_string())),
        }
    }

    /// Convert a value crossing a field link into this type.
    pub fn coerce(self, value: Value) -> Option<Value> {
        if value.field_type() == self {
            return Some(value);
        }
        match (self, value) {
            (FieldType::Json, value) => Some(Value::Json(value.to_json())),
            (FieldType::String, Value::Json(serde_json::Value::Null)) => Some(Value::String(String::new())),
            (ty, Value::Json(json)) => ty.from_json(json),
            _ => None,
        }
    }

    /// Coerce a JSON literal (schema defaults, config) into this type.
    pub(crate) fn from_json(self, json: serde_json::Value) -> Option<Value> {
        match (self, json) {
            (FieldType::String, serde_json::Value::String(s)) => Some(Value::String(s)),
            (FieldType::Number, serde_json::Value::Number(n)) => n.as_f64().map(Value::Number),
            (FieldType::Boolean, serde_json::Value::Bool(b)) => Some(Value::Bool(b)),
            (FieldType::Json, json) => Some(Value::Json(json)),
            _ => None,
        }
    }
}

impl FromStr for FieldType {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "string" => Ok(FieldType::String),
            "number" => Ok(FieldType::Number),
            "boolean" => Ok(FieldType::Boolean),
            "json" | "object" | "array" => Ok(FieldType::Json),
            other => Err(ConfigurationError::UnknownFieldType(other.to_owned())),
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Typed state value. Attributes only ever hold the serialized form.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    String(String),
    Number(f64),
    Bool(bool),
    Json(serde_json::Value),
}

impl Value {
    pub fn field_type(&self) -> FieldType {
        match self {
            Value::String(_) => FieldType::String,
            Value::Number(_) => FieldType::Number,
            Value::Bool(_) => FieldType::Boolean,
            Value::Json(_) => FieldType::Json,
        }
    }

    /// Serialized attribute form. `None` means the attribute must be absent.
    pub fn to_attribute(&self) -> Option<String> {
        match self {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) if n.is_finite() => Some(n.to_string()),
            Value::Number(_) => None,
            Value::Bool(true) => Some(String::new()),
            Value::Bool(false) => None,
            Value::Json(json) => serde_json::to_string(json).ok(),
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::String(s) => serde_json::Value::String(s.clone()),
            Value::Number(n) => serde_json::Number::from_f64(*n)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Json(json) => json.clone(),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_json(&self) -> Option<&serde_json::Value> {
        match self {
            Value::Json(json) => Some(json),
            _ => None,
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_owned())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<usize> for Value {
    fn from(n: usize) -> Self {
        Value::Number(n as f64)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        Value::Json(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn round_trip(value: Value) -> Value {
        let ty = value.field_type();
        let attr = value.to_attribute();
        ty.parse_attribute(attr.as_deref(), &ty.zero()).unwrap()
    }

    #[test]
    fn attribute_round_trip_reproduces_value() {
        let samples = [
            Value::from("retro radio"),
            Value::from(""),
            Value::from(42.0),
            Value::from(-0.25),
            Value::from(true),
            Value::from(false),
            Value::from(json!({ "a": [1, 2, { "b": null }] })),
            Value::from(json!(["x", "y"])),
        ];
        for sample in samples {
            assert_eq!(round_trip(sample.clone()), sample);
        }
    }

    #[test]
    fn boolean_maps_to_attribute_presence() {
        assert_eq!(Value::Bool(true).to_attribute().as_deref(), Some(""));
        assert_eq!(Value::Bool(false).to_attribute(), None);
        let default = Value::Bool(true);
        assert_eq!(
            FieldType::Boolean.parse_attribute(None, &default),
            Ok(Value::Bool(false))
        );
        assert_eq!(
            FieldType::Boolean.parse_attribute(Some("disabled"), &default),
            Ok(Value::Bool(true))
        );
    }

    #[test]
    fn malformed_input_is_rejected() {
        let zero = FieldType::Json.zero();
        assert!(matches!(
            FieldType::Json.parse_attribute(Some("{oops"), &zero),
            Err(ParseError::InvalidJson(_))
        ));
        assert!(matches!(
            FieldType::Number.parse_attribute(Some("ten"), &Value::Number(1.0)),
            Err(ParseError::InvalidNumber(_))
        ));
    }

    #[test]
    fn link_coercion_moves_between_json_and_scalars() {
        assert_eq!(
            FieldType::Json.coerce(Value::from("red")),
            Some(Value::Json(json!("red")))
        );
        assert_eq!(
            FieldType::String.coerce(Value::Json(json!("red"))),
            Some(Value::from("red"))
        );
        assert_eq!(FieldType::String.coerce(Value::Json(json!(null))), Some(Value::from("")));
        assert_eq!(FieldType::Number.coerce(Value::from("1")), None);
    }

    #[test]
    fn unknown_type_name_is_a_configuration_error() {
        assert_eq!("array".parse::<FieldType>(), Ok(FieldType::Json));
        assert_eq!(
            "date".parse::<FieldType>(),
            Err(ConfigurationError::UnknownFieldType("date".into()))
        );
    }
}
