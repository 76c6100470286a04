//! Open constraint values
//!
//! Extracted constraints, heuristic applicability, and preference payloads
//! are dynamically keyed maps whose values are only interpreted at the
//! point of use. The union is untagged so stored documents stay plain JSON.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A dynamically typed value carried by open record fields
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// Null/missing value
    Null,

    /// Boolean value
    Boolean(bool),

    /// 64-bit signed integer
    Integer(i64),

    /// 64-bit floating point
    Float(f64),

    /// UTF-8 string
    String(String),

    /// Array of values
    Array(Vec<Value>),

    /// Map of string keys to values
    Map(BTreeMap<String, Value>),
}

/// An open, dynamically keyed mapping (constraints, applicability)
pub type ValueMap = BTreeMap<String, Value>;

impl Value {
    /// Returns true if the value is null
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Try to get as boolean
    pub fn as_boolean(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Try to get as integer
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Try to get as float, coercing integers
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            Value::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// Try to get as string reference
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Try to get as array reference
    pub fn as_array(&self) -> Option<&Vec<Value>> {
        match self {
            Value::Array(arr) => Some(arr),
            _ => None,
        }
    }

    /// Try to get as map reference
    pub fn as_map(&self) -> Option<&ValueMap> {
        match self {
            Value::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Get the type name of this value
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Boolean(_) => "boolean",
            Value::Integer(_) => "integer",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Map(_) => "map",
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Integer(i as i64)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Integer(i)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<Vec<Value>> for Value {
    fn from(arr: Vec<Value>) -> Self {
        Value::Array(arr)
    }
}

impl From<ValueMap> for Value {
    fn from(map: ValueMap) -> Self {
        Value::Map(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accessors() {
        assert_eq!(Value::from(42).as_integer(), Some(42));
        assert_eq!(Value::from(42).as_float(), Some(42.0));
        assert_eq!(Value::from("LG").as_str(), Some("LG"));
        assert_eq!(Value::from(true).as_boolean(), Some(true));
        assert!(Value::Null.is_null());
        assert_eq!(Value::from("LG").as_integer(), None);
    }

    #[test]
    fn test_type_name() {
        assert_eq!(Value::from(1.5).type_name(), "float");
        assert_eq!(Value::Array(vec![]).type_name(), "array");
    }

    #[test]
    fn test_json_round_trip() {
        let mut map = ValueMap::new();
        map.insert("budget".to_string(), Value::from(250_000));
        map.insert("brand".to_string(), Value::from("LG"));
        map.insert("refurbished_ok".to_string(), Value::from(false));
        let value = Value::Map(map);

        let json = serde_json::to_value(&value).unwrap();
        assert_eq!(json["budget"], 250_000);
        assert_eq!(json["brand"], "LG");

        let back: Value = serde_json::from_value(json).unwrap();
        assert_eq!(back, value);
    }

    #[test]
    fn test_untagged_integer_vs_float() {
        let int: Value = serde_json::from_str("5").unwrap();
        assert_eq!(int, Value::Integer(5));

        let float: Value = serde_json::from_str("5.5").unwrap();
        assert_eq!(float, Value::Float(5.5));
    }
}
