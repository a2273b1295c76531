//! [`Value`], the closed set of things a container slot can hold.

use std::fmt;
use std::sync::Arc;

use socialize_json::{JsonEncoder, JsonToken};
use socialize_util::deep_copy::{CopyContext, DeepCopy};

use crate::node::Node;
use crate::sequence::Sequence;

/// A single slot of a [`Node`] or [`Sequence`].
///
/// Inputs of other shapes are normalized on the way in: `f32` widens to
/// `Double`, the small integer types become `Int`, `u32` becomes `Long` and
/// `None` becomes `Null`.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Null,
    String(String),
    Bool(bool),
    Int(i32),
    Long(i64),
    Double(f64),
    Node(Arc<Node>),
    Sequence(Arc<Sequence>),
}

impl Value {
    /// Short name of the stored kind, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::String(_) => "string",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Long(_) => "long",
            Value::Double(_) => "double",
            Value::Node(_) => "node",
            Value::Sequence(_) => "sequence",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// `true` for strings, booleans and numbers.
    pub fn is_scalar(&self) -> bool {
        matches!(
            self,
            Value::String(_) | Value::Bool(_) | Value::Int(_) | Value::Long(_) | Value::Double(_)
        )
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_node(&self) -> Option<&Node> {
        match self {
            Value::Node(node) => Some(node),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&Sequence> {
        match self {
            Value::Sequence(seq) => Some(seq),
            _ => None,
        }
    }

    pub(crate) fn from_token(token: JsonToken) -> Value {
        match token {
            JsonToken::Null => Value::Null,
            JsonToken::Bool(b) => Value::Bool(b),
            JsonToken::Integer(i) => match i32::try_from(i) {
                Ok(small) => Value::Int(small),
                Err(_) => Value::Long(i),
            },
            JsonToken::UInteger(u) => Value::Double(u as f64),
            JsonToken::Float(f) => Value::Double(f),
            JsonToken::Str(s) => Value::String(s),
            JsonToken::Array(items) => Value::Sequence(Arc::new(Sequence::from_tokens(items))),
            JsonToken::Object(entries) => Value::Node(Arc::new(Node::from_entries(entries))),
        }
    }

    pub(crate) fn to_token(&self) -> JsonToken {
        match self {
            Value::Null => JsonToken::Null,
            Value::String(s) => JsonToken::Str(s.clone()),
            Value::Bool(b) => JsonToken::Bool(*b),
            Value::Int(i) => JsonToken::Integer(i64::from(*i)),
            Value::Long(l) => JsonToken::Integer(*l),
            Value::Double(d) => JsonToken::Float(*d),
            Value::Node(node) => node.to_token(),
            Value::Sequence(seq) => seq.to_token(),
        }
    }
}

/// Textual form used by string coercion: strings verbatim, numbers in
/// decimal, booleans lowercase and containers as canonical JSON.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::String(s) => f.write_str(s),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Long(l) => write!(f, "{l}"),
            Value::Double(d) => write!(f, "{d}"),
            Value::Node(_) | Value::Sequence(_) => {
                f.write_str(&JsonEncoder::new().encode(&self.to_token()))
            }
        }
    }
}

impl DeepCopy for Value {
    fn deep_copy_in(&self, ctx: &mut CopyContext) -> Self {
        match self {
            Value::Node(node) => Value::Node(node.deep_copy_in(ctx)),
            Value::Sequence(seq) => Value::Sequence(seq.deep_copy_in(ctx)),
            Value::String(s) => Value::String(s.deep_copy_in(ctx)),
            scalar => scalar.clone(),
        }
    }
}

macro_rules! value_from {
    ($($t:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$t> for Value {
                fn from(v: $t) -> Self {
                    Value::$variant(v.into())
                }
            }
        )*
    };
}

value_from!(
    bool => Bool,
    i8 => Int,
    i16 => Int,
    i32 => Int,
    u8 => Int,
    u16 => Int,
    i64 => Long,
    u32 => Long,
    f32 => Double,
    f64 => Double,
    String => String,
    &str => String,
    &String => String,
    char => String,
);

impl From<Node> for Value {
    fn from(node: Node) -> Self {
        Value::Node(Arc::new(node))
    }
}

impl From<Sequence> for Value {
    fn from(seq: Sequence) -> Self {
        Value::Sequence(Arc::new(seq))
    }
}

impl From<Arc<Node>> for Value {
    fn from(node: Arc<Node>) -> Self {
        Value::Node(node)
    }
}

impl From<Arc<Sequence>> for Value {
    fn from(seq: Arc<Sequence>) -> Self {
        Value::Sequence(seq)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

impl From<JsonToken> for Value {
    fn from(token: JsonToken) -> Self {
        Value::from_token(token)
    }
}

impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        Value::from_token(JsonToken::from(v))
    }
}

impl From<&Value> for serde_json::Value {
    fn from(v: &Value) -> Self {
        serde_json::Value::from(v.to_token())
    }
}
