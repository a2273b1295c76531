//! [`JsonToken`]: the intermediate tree between JSON text and the public
//! containers.
//!
//! The decoder keeps every integer the text can express (`Integer`,
//! `UInteger`) separate from floats, and objects keep their source order, so
//! the containers can apply their own typing and ordering rules on top.

use serde_json::{Map, Number, Value};

#[derive(Debug, Clone, PartialEq)]
pub enum JsonToken {
    Null,
    Bool(bool),
    /// Integer that fits in an `i64`.
    Integer(i64),
    /// Non-negative integer above `i64::MAX`.
    UInteger(u64),
    Float(f64),
    Str(String),
    Array(Vec<JsonToken>),
    /// Object entries in source order. Duplicate keys are kept.
    Object(Vec<(String, JsonToken)>),
}

impl JsonToken {
    /// Short name of the token kind, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            JsonToken::Null => "null",
            JsonToken::Bool(_) => "boolean",
            JsonToken::Integer(_) | JsonToken::UInteger(_) => "integer",
            JsonToken::Float(_) => "float",
            JsonToken::Str(_) => "string",
            JsonToken::Array(_) => "array",
            JsonToken::Object(_) => "object",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, JsonToken::Null)
    }

    pub fn as_object(&self) -> Option<&[(String, JsonToken)]> {
        match self {
            JsonToken::Object(entries) => Some(entries),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[JsonToken]> {
        match self {
            JsonToken::Array(items) => Some(items),
            _ => None,
        }
    }
}

impl From<Value> for JsonToken {
    fn from(v: Value) -> Self {
        match v {
            Value::Null => JsonToken::Null,
            Value::Bool(b) => JsonToken::Bool(b),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    JsonToken::Integer(i)
                } else if let Some(u) = n.as_u64() {
                    JsonToken::UInteger(u)
                } else {
                    JsonToken::Float(n.as_f64().unwrap_or(0.0))
                }
            }
            Value::String(s) => JsonToken::Str(s),
            Value::Array(arr) => JsonToken::Array(arr.into_iter().map(JsonToken::from).collect()),
            Value::Object(obj) => JsonToken::Object(
                obj.into_iter()
                    .map(|(k, v)| (k, JsonToken::from(v)))
                    .collect(),
            ),
        }
    }
}

impl From<JsonToken> for Value {
    fn from(t: JsonToken) -> Self {
        match t {
            JsonToken::Null => Value::Null,
            JsonToken::Bool(b) => Value::Bool(b),
            JsonToken::Integer(i) => Value::Number(i.into()),
            JsonToken::UInteger(u) => Value::Number(u.into()),
            // serde_json has no representation for NaN or infinities.
            JsonToken::Float(f) => Number::from_f64(f).map_or(Value::Null, Value::Number),
            JsonToken::Str(s) => Value::String(s),
            JsonToken::Array(arr) => Value::Array(arr.into_iter().map(Value::from).collect()),
            JsonToken::Object(obj) => {
                let mut map = Map::new();
                for (k, v) in obj {
                    map.insert(k, Value::from(v));
                }
                Value::Object(map)
            }
        }
    }
}
