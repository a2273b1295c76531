//! Typed reads over stored [`Value`]s.
//!
//! Every typed accessor goes through [`FromValue`]: an exact match returns
//! the stored value unchanged, otherwise scalars take a textual round trip
//! (stringify, trim, parse) into the requested type.

use std::borrow::Cow;
use std::sync::Arc;

use tracing::trace;

use crate::error::{Error, Result};
use crate::node::Node;
use crate::sequence::Sequence;
use crate::value::Value;

/// A type that can be read out of a container slot.
pub trait FromValue: Sized {
    /// Name of the type in error messages.
    const TARGET: &'static str;

    /// The stored value, only when it already has this type.
    fn exact(value: &Value) -> Option<Self>;

    /// The stored value converted to this type.
    fn coerce(value: &Value) -> Result<Self> {
        Self::exact(value).ok_or_else(|| Error::invalid_cast(value.kind(), Self::TARGET))
    }
}

/// Collapses a failed typed read into the caller's default.
pub(crate) fn or_default<T>(result: Result<T>, default: T) -> T {
    match result {
        Ok(v) => v,
        Err(err) => {
            trace!(error = %err, "typed read failed, using default");
            default
        }
    }
}

fn scalar_text<'a>(value: &'a Value, target: &'static str) -> Result<Cow<'a, str>> {
    match value {
        Value::String(s) => Ok(Cow::Borrowed(s)),
        Value::Bool(_) | Value::Int(_) | Value::Long(_) | Value::Double(_) => {
            Ok(Cow::Owned(value.to_string()))
        }
        Value::Null | Value::Node(_) | Value::Sequence(_) => {
            Err(Error::invalid_cast(value.kind(), target))
        }
    }
}

pub(crate) fn parse_bool(text: &str) -> Option<bool> {
    let text = text.trim();
    if text.eq_ignore_ascii_case("true") {
        Some(true)
    } else if text.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

macro_rules! from_value_number {
    ($($t:ty => $variant:ident, $name:literal;)*) => {
        $(
            impl FromValue for $t {
                const TARGET: &'static str = $name;

                fn exact(value: &Value) -> Option<Self> {
                    match value {
                        Value::$variant(v) => Some(*v),
                        _ => None,
                    }
                }

                fn coerce(value: &Value) -> Result<Self> {
                    if let Some(v) = Self::exact(value) {
                        return Ok(v);
                    }
                    let text = scalar_text(value, Self::TARGET)?;
                    text.trim()
                        .parse::<$t>()
                        .map_err(|_| Error::format(text.into_owned(), Self::TARGET))
                }
            }
        )*
    };
}

from_value_number! {
    i32 => Int, "int";
    i64 => Long, "long";
    f64 => Double, "double";
}

impl FromValue for bool {
    const TARGET: &'static str = "bool";

    fn exact(value: &Value) -> Option<Self> {
        match value {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    fn coerce(value: &Value) -> Result<Self> {
        if let Some(b) = Self::exact(value) {
            return Ok(b);
        }
        let text = scalar_text(value, Self::TARGET)?;
        parse_bool(&text).ok_or_else(|| Error::format(text.into_owned(), Self::TARGET))
    }
}

impl FromValue for String {
    const TARGET: &'static str = "string";

    fn exact(value: &Value) -> Option<Self> {
        value.as_str().map(str::to_owned)
    }

    fn coerce(value: &Value) -> Result<Self> {
        match value {
            Value::Null => Err(Error::invalid_cast(value.kind(), Self::TARGET)),
            Value::String(s) => Ok(s.clone()),
            other => Ok(other.to_string()),
        }
    }
}

impl FromValue for Node {
    const TARGET: &'static str = "node";

    fn exact(value: &Value) -> Option<Self> {
        value.as_node().cloned()
    }
}

impl FromValue for Arc<Node> {
    const TARGET: &'static str = "node";

    fn exact(value: &Value) -> Option<Self> {
        match value {
            Value::Node(node) => Some(Arc::clone(node)),
            _ => None,
        }
    }
}

impl FromValue for Sequence {
    const TARGET: &'static str = "sequence";

    fn exact(value: &Value) -> Option<Self> {
        value.as_sequence().cloned()
    }
}

impl FromValue for Arc<Sequence> {
    const TARGET: &'static str = "sequence";

    fn exact(value: &Value) -> Option<Self> {
        match value {
            Value::Sequence(seq) => Some(Arc::clone(seq)),
            _ => None,
        }
    }
}

impl FromValue for Value {
    const TARGET: &'static str = "value";

    fn exact(value: &Value) -> Option<Self> {
        Some(value.clone())
    }
}

/// `Null` reads as `None`; anything else goes through `T`.
impl<T: FromValue> FromValue for Option<T> {
    const TARGET: &'static str = T::TARGET;

    fn exact(value: &Value) -> Option<Self> {
        match value {
            Value::Null => Some(None),
            other => T::exact(other).map(Some),
        }
    }

    fn coerce(value: &Value) -> Result<Self> {
        match value {
            Value::Null => Ok(None),
            other => T::coerce(other).map(Some),
        }
    }
}
