//! Language-native values returned by interpreters.

use std::collections::BTreeMap;
use std::fmt;

/// The result of evaluating a command.
///
/// Backends map their native values onto these variants. Values with no
/// structural mapping are kept as [`ScriptValue::Object`], carrying the class
/// name and the backend's own rendering of the value.
#[derive(Debug, Clone, PartialEq)]
pub enum ScriptValue {
    /// No value (`nil`, `null`, unit).
    Nil,
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
    List(Vec<ScriptValue>),
    Map(BTreeMap<String, ScriptValue>),
    /// An opaque object reference.
    Object { class_name: String, inspect: String },
}

impl ScriptValue {
    /// The empty string, returned by inert backends.
    pub fn empty() -> Self {
        ScriptValue::String(String::new())
    }

    pub fn is_nil(&self) -> bool {
        matches!(self, ScriptValue::Nil)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ScriptValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            ScriptValue::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ScriptValue::Float(f) => Some(*f),
            ScriptValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[ScriptValue]> {
        match self {
            ScriptValue::List(items) => Some(items),
            _ => None,
        }
    }
}

impl From<serde_json::Value> for ScriptValue {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => ScriptValue::Nil,
            serde_json::Value::Bool(b) => ScriptValue::Bool(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => ScriptValue::Integer(i),
                // u64 beyond i64 and real floats both land here
                None => ScriptValue::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            serde_json::Value::String(s) => ScriptValue::String(s),
            serde_json::Value::Array(items) => {
                ScriptValue::List(items.into_iter().map(ScriptValue::from).collect())
            }
            serde_json::Value::Object(map) => ScriptValue::Map(
                map.into_iter()
                    .map(|(k, v)| (k, ScriptValue::from(v)))
                    .collect(),
            ),
        }
    }
}

impl From<&str> for ScriptValue {
    fn from(s: &str) -> Self {
        ScriptValue::String(s.to_string())
    }
}

impl From<String> for ScriptValue {
    fn from(s: String) -> Self {
        ScriptValue::String(s)
    }
}

impl From<i64> for ScriptValue {
    fn from(i: i64) -> Self {
        ScriptValue::Integer(i)
    }
}

impl fmt::Display for ScriptValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScriptValue::Nil => f.write_str("nil"),
            ScriptValue::Bool(b) => write!(f, "{}", b),
            ScriptValue::Integer(i) => write!(f, "{}", i),
            ScriptValue::Float(x) => write!(f, "{}", x),
            ScriptValue::String(s) => f.write_str(s),
            ScriptValue::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                f.write_str("]")
            }
            ScriptValue::Map(map) => {
                f.write_str("{")?;
                for (i, (k, v)) in map.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}: {}", k, v)?;
                }
                f.write_str("}")
            }
            ScriptValue::Object { inspect, .. } => f.write_str(inspect),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_json_scalars() {
        assert_eq!(ScriptValue::from(json!(null)), ScriptValue::Nil);
        assert_eq!(ScriptValue::from(json!(4)), ScriptValue::Integer(4));
        assert_eq!(ScriptValue::from(json!(2.5)), ScriptValue::Float(2.5));
        assert_eq!(ScriptValue::from(json!("x")), ScriptValue::String("x".into()));
    }

    #[test]
    fn test_from_json_nested() {
        let value = ScriptValue::from(json!({"a": [1, true]}));
        let ScriptValue::Map(map) = value else {
            panic!("expected a map");
        };
        assert_eq!(
            map["a"],
            ScriptValue::List(vec![ScriptValue::Integer(1), ScriptValue::Bool(true)])
        );
    }

    #[test]
    fn test_display() {
        let list = ScriptValue::List(vec![ScriptValue::Integer(1), ScriptValue::Nil]);
        assert_eq!(list.to_string(), "[1, nil]");

        let obj = ScriptValue::Object {
            class_name: "Box".to_string(),
            inspect: "#<Box size=5>".to_string(),
        };
        assert_eq!(obj.to_string(), "#<Box size=5>");
    }

    #[test]
    fn test_accessors() {
        assert_eq!(ScriptValue::empty().as_str(), Some(""));
        assert_eq!(ScriptValue::Integer(3).as_f64(), Some(3.0));
        assert!(ScriptValue::Nil.is_nil());
        assert!(ScriptValue::Integer(1).as_list().is_none());
    }
}
