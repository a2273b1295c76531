//! [`Sequence`], the list-shaped container.

use std::fmt;
use std::slice;
use std::str::FromStr;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use socialize_json::{JsonEncoder, JsonToken, Limits};
use socialize_util::deep_copy::{deep_copy, CopyContext, DeepCopy};

use crate::convert::{or_default, FromValue};
use crate::error::{Error, Result};
use crate::node::Node;
use crate::path::{Lookup, Root};
use crate::record;
use crate::value::Value;

/// Index-addressable list of [`Value`]s. Same accessor contract as
/// [`Node`], keyed by position.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Sequence {
    items: Vec<Value>,
}

impl Sequence {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            items: Vec::with_capacity(capacity),
        }
    }

    /// Parses a JSON array with the default [`Limits`].
    pub fn parse(text: &str) -> Result<Self> {
        Self::parse_with(text, &Limits::default())
    }

    pub fn parse_with(text: &str, limits: &Limits) -> Result<Self> {
        Self::from_token(socialize_json::parse_with(text, limits)?)
    }

    pub fn from_token(token: JsonToken) -> Result<Self> {
        match token {
            JsonToken::Array(items) => Ok(Self::from_tokens(items)),
            other => Err(Error::invalid_cast(other.kind(), "sequence")),
        }
    }

    pub(crate) fn from_tokens(tokens: Vec<JsonToken>) -> Self {
        Self {
            items: tokens.into_iter().map(Value::from_token).collect(),
        }
    }

    pub(crate) fn to_token(&self) -> JsonToken {
        JsonToken::Array(self.items.iter().map(Value::to_token).collect())
    }

    /// Packs each record into one element.
    pub fn from_records<I>(records: I) -> Result<Self>
    where
        I: IntoIterator,
        I::Item: Serialize,
    {
        let items = records
            .into_iter()
            .map(|r| record::to_value(&r))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { items })
    }

    /// Unpacks every element into `T`.
    pub fn cast<T: DeserializeOwned>(&self) -> Result<Vec<T>> {
        self.items.iter().map(record::from_value::<T>).collect()
    }

    pub fn to_json_string(&self) -> String {
        JsonEncoder::new().encode(&self.to_token())
    }

    pub fn deep_clone(&self) -> Sequence {
        deep_copy(self)
    }

    pub fn add(&mut self, value: impl Into<Value>) -> &mut Self {
        self.items.push(value.into());
        self
    }

    pub fn add_shared(&mut self, node: Arc<Node>) -> &mut Self {
        self.items.push(Value::Node(node));
        self
    }

    pub fn add_shared_sequence(&mut self, seq: Arc<Sequence>) -> &mut Self {
        self.items.push(Value::Sequence(seq));
        self
    }

    /// Removes and returns the element at `index`, shifting the rest down.
    pub fn remove(&mut self, index: usize) -> Result<Value> {
        if index < self.items.len() {
            Ok(self.items.remove(index))
        } else {
            Err(self.out_of_range(index))
        }
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> slice::Iter<'_, Value> {
        self.items.iter()
    }

    pub fn get_value(&self, index: usize) -> Option<&Value> {
        self.items.get(index)
    }

    pub fn get<T: FromValue>(&self, index: usize) -> Result<T> {
        match self.items.get(index) {
            Some(value) => T::coerce(value),
            None => Err(self.out_of_range(index)),
        }
    }

    pub fn get_or<T: FromValue>(&self, index: usize, default: T) -> T {
        or_default(self.get(index), default)
    }

    pub fn get_node_mut(&mut self, index: usize) -> Result<&mut Node> {
        let len = self.items.len();
        match self.items.get_mut(index) {
            Some(Value::Node(node)) => Ok(Arc::make_mut(node)),
            Some(other) => Err(Error::invalid_cast(other.kind(), "node")),
            None => Err(Error::IndexOutOfRange { index, len }),
        }
    }

    pub fn get_sequence_mut(&mut self, index: usize) -> Result<&mut Sequence> {
        let len = self.items.len();
        match self.items.get_mut(index) {
            Some(Value::Sequence(seq)) => Ok(Arc::make_mut(seq)),
            Some(other) => Err(Error::invalid_cast(other.kind(), "sequence")),
            None => Err(Error::IndexOutOfRange { index, len }),
        }
    }

    /// Dotted path whose first segment is an index into this sequence.
    pub fn lookup<'a, T: FromValue>(&'a self, path: &'a str) -> Lookup<'a, T> {
        Lookup::new(Root::Sequence(self), path, true)
    }

    pub fn lookup_exact<'a, T: FromValue>(&'a self, path: &'a str) -> Lookup<'a, T> {
        Lookup::new(Root::Sequence(self), path, false)
    }

    fn out_of_range(&self, index: usize) -> Error {
        Error::IndexOutOfRange {
            index,
            len: self.items.len(),
        }
    }
}

macro_rules! named_getters {
    ($($get:ident, $get_or:ident => $t:ty;)*) => {
        impl Sequence {
            $(
                pub fn $get(&self, index: usize) -> Result<$t> {
                    self.get(index)
                }

                pub fn $get_or(&self, index: usize, default: $t) -> $t {
                    self.get_or(index, default)
                }
            )*
        }
    };
}

named_getters! {
    get_string, get_string_or => String;
    get_int, get_int_or => i32;
    get_long, get_long_or => i64;
    get_bool, get_bool_or => bool;
    get_double, get_double_or => f64;
    get_node, get_node_or => Node;
    get_sequence, get_sequence_or => Sequence;
}

impl<'a> IntoIterator for &'a Sequence {
    type Item = &'a Value;
    type IntoIter = slice::Iter<'a, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl<V: Into<Value>> FromIterator<V> for Sequence {
    fn from_iter<I: IntoIterator<Item = V>>(iter: I) -> Self {
        Self {
            items: iter.into_iter().map(Into::into).collect(),
        }
    }
}

impl From<Vec<Value>> for Sequence {
    fn from(items: Vec<Value>) -> Self {
        Self { items }
    }
}

impl DeepCopy for Sequence {
    fn deep_copy_in(&self, ctx: &mut CopyContext) -> Self {
        Sequence {
            items: self.items.deep_copy_in(ctx),
        }
    }
}

impl fmt::Display for Sequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_json_string())
    }
}

impl FromStr for Sequence {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Sequence::parse(s)
    }
}

impl TryFrom<serde_json::Value> for Sequence {
    type Error = Error;

    fn try_from(v: serde_json::Value) -> Result<Self> {
        Sequence::from_token(JsonToken::from(v))
    }
}

impl From<&Sequence> for serde_json::Value {
    fn from(seq: &Sequence) -> Self {
        serde_json::Value::from(seq.to_token())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coercing_reads_by_index() {
        let seq = Sequence::parse(r#"["1","2","x"]"#).unwrap();
        assert_eq!(seq.get_or::<i32>(2, 0), 0);
        assert_eq!(seq.get_or::<i32>(0, 0), 1);
        assert!(matches!(seq.get_int(2), Err(Error::Format { .. })));
        assert!(matches!(
            seq.get_int(3),
            Err(Error::IndexOutOfRange { index: 3, len: 3 })
        ));
        assert_eq!(seq.get_int_or(9, 5), 5);
    }

    #[test]
    fn keeps_duplicates_and_order() {
        let mut seq = Sequence::new();
        seq.add(2).add("a").add(2).add(Node::new());
        assert_eq!(seq.to_string(), r#"[2,"a",2,{}]"#);
        assert_eq!(seq.len(), 4);
    }

    #[test]
    fn remove_shifts() {
        let mut seq: Sequence = [1, 2, 3].into_iter().collect();
        assert_eq!(seq.remove(0).unwrap(), Value::Int(1));
        assert_eq!(seq.get_int(0).unwrap(), 2);
        assert!(seq.remove(5).is_err());
        seq.clear();
        assert!(seq.is_empty());
    }

    #[test]
    fn nested_children() {
        let mut seq = Sequence::parse(r#"[{"a":1},[true]]"#).unwrap();
        assert_eq!(seq.get_node(0).unwrap().get_int("a").unwrap(), 1);
        assert!(seq.get_sequence(1).unwrap().get_bool(0).unwrap());
        assert!(matches!(seq.get_node(1), Err(Error::InvalidCast { .. })));

        seq.get_node_mut(0).unwrap().put("b", 2);
        assert_eq!(seq.to_string(), r#"[{"a":1,"b":2},[true]]"#);
    }

    #[test]
    fn mutable_child_sequences_are_copy_on_write() {
        let mut seq = Sequence::parse(r#"[[1],{"a":1}]"#).unwrap();
        let before = seq.clone();
        seq.get_sequence_mut(0).unwrap().add(2);
        assert_eq!(seq.to_string(), r#"[[1,2],{"a":1}]"#);
        assert_eq!(before.to_string(), r#"[[1],{"a":1}]"#);

        assert!(matches!(seq.get_sequence_mut(1), Err(Error::InvalidCast { .. })));
        assert!(matches!(
            seq.get_sequence_mut(2),
            Err(Error::IndexOutOfRange { index: 2, len: 2 })
        ));
    }

    #[test]
    fn parse_rejects_non_arrays() {
        assert!(matches!(
            Sequence::parse("{}"),
            Err(Error::InvalidCast { found: "object", .. })
        ));
        assert_eq!("[]".parse::<Sequence>().unwrap(), Sequence::new());
    }
}
