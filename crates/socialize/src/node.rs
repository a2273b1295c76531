//! [`Node`], the map-shaped container.

use std::collections::btree_map::{self, BTreeMap};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use socialize_json::{JsonEncoder, JsonToken, Limits};
use socialize_util::deep_copy::{deep_copy, CopyContext, DeepCopy};

use crate::convert::{or_default, FromValue};
use crate::error::{Error, Result};
use crate::path::{Lookup, Root};
use crate::record::{self, MemberCache};
use crate::sequence::Sequence;
use crate::value::Value;

/// Ordered map from string keys to [`Value`]s.
///
/// Keys are kept in byte-wise ascending order at all times, which is also the
/// order they are rendered in. Child containers sit behind `Arc`: `Clone` is
/// shallow and mutation through [`Node::get_node_mut`] is copy-on-write. Use
/// [`Node::deep_clone`] for a copy that shares nothing.
///
/// # Examples
///
/// ```
/// use socialize::Node;
///
/// let mut node = Node::parse(r#"{"b": "5", "a": {"c": true}}"#).unwrap();
/// assert_eq!(node.get_int("b").unwrap(), 5);
/// assert!(node.get_path::<bool>("a.c").unwrap());
///
/// node.put("C", 1.5);
/// assert_eq!(node.to_string(), r#"{"C":1.5,"a":{"c":true},"b":"5"}"#);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Node {
    map: BTreeMap<String, Value>,
}

impl Node {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a JSON object with the default [`Limits`].
    pub fn parse(text: &str) -> Result<Self> {
        Self::parse_with(text, &Limits::default())
    }

    pub fn parse_with(text: &str, limits: &Limits) -> Result<Self> {
        Self::from_token(socialize_json::parse_with(text, limits)?)
    }

    /// Builds a node from a decoded object token.
    pub fn from_token(token: JsonToken) -> Result<Self> {
        match token {
            JsonToken::Object(entries) => Ok(Self::from_entries(entries)),
            other => Err(Error::invalid_cast(other.kind(), "node")),
        }
    }

    /// Later duplicates overwrite earlier ones.
    pub(crate) fn from_entries(entries: Vec<(String, JsonToken)>) -> Self {
        let mut map = BTreeMap::new();
        for (key, token) in entries {
            map.insert(key, Value::from_token(token));
        }
        Self { map }
    }

    pub(crate) fn to_token(&self) -> JsonToken {
        JsonToken::Object(
            self.map
                .iter()
                .map(|(key, value)| (key.clone(), value.to_token()))
                .collect(),
        )
    }

    /// Packs a serializable record into a node.
    pub fn from_record<R: Serialize + ?Sized>(record: &R) -> Result<Self> {
        record::pack(record)
    }

    /// Unpacks this node into a record, using the process-wide member cache.
    pub fn cast<R: DeserializeOwned + 'static>(&self) -> Result<R> {
        self.cast_with(MemberCache::global())
    }

    pub fn cast_with<R: DeserializeOwned + 'static>(&self, cache: &MemberCache) -> Result<R> {
        record::unpack(self, cache)
    }

    /// Compact JSON with keys in byte-wise order.
    pub fn to_json_string(&self) -> String {
        JsonEncoder::new().encode(&self.to_token())
    }

    /// Copy that shares no allocation with `self`.
    ///
    /// Children that were shared between several keys stay shared, once, in
    /// the copy.
    pub fn deep_clone(&self) -> Node {
        deep_copy(self)
    }

    pub fn put(&mut self, key: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.map.insert(key.into(), value.into());
        self
    }

    /// Inserts an existing child node without copying it.
    pub fn put_shared(&mut self, key: impl Into<String>, node: Arc<Node>) -> &mut Self {
        self.map.insert(key.into(), Value::Node(node));
        self
    }

    pub fn put_shared_sequence(&mut self, key: impl Into<String>, seq: Arc<Sequence>) -> &mut Self {
        self.map.insert(key.into(), Value::Sequence(seq));
        self
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.map.contains_key(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.map.remove(key)
    }

    pub fn clear(&mut self) {
        self.map.clear();
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> + '_ {
        self.map.keys().map(String::as_str)
    }

    pub fn iter(&self) -> Iter<'_> {
        Iter {
            inner: self.map.iter(),
        }
    }

    pub fn get_value(&self, key: &str) -> Option<&Value> {
        self.map.get(key)
    }

    /// Strict typed read.
    pub fn get<T: FromValue>(&self, key: &str) -> Result<T> {
        match self.map.get(key) {
            Some(value) => T::coerce(value),
            None => Err(Error::KeyNotFound(key.to_owned())),
        }
    }

    /// Typed read that returns `default` on any failure.
    pub fn get_or<T: FromValue>(&self, key: &str, default: T) -> T {
        or_default(self.get(key), default)
    }

    /// Mutable access to a child node. A child shared with other owners is
    /// copied first.
    pub fn get_node_mut(&mut self, key: &str) -> Result<&mut Node> {
        match self.map.get_mut(key) {
            Some(Value::Node(node)) => Ok(Arc::make_mut(node)),
            Some(other) => Err(Error::invalid_cast(other.kind(), "node")),
            None => Err(Error::KeyNotFound(key.to_owned())),
        }
    }

    pub fn get_sequence_mut(&mut self, key: &str) -> Result<&mut Sequence> {
        match self.map.get_mut(key) {
            Some(Value::Sequence(seq)) => Ok(Arc::make_mut(seq)),
            Some(other) => Err(Error::invalid_cast(other.kind(), "sequence")),
            None => Err(Error::KeyNotFound(key.to_owned())),
        }
    }

    /// Unpacks the child node under `key` into a record.
    pub fn get_record<R: DeserializeOwned + 'static>(&self, key: &str) -> Result<R> {
        let child: Arc<Node> = self.get(key)?;
        child.cast()
    }

    /// Unpacks every element of the child sequence under `key`.
    pub fn get_records<R: DeserializeOwned>(&self, key: &str) -> Result<Vec<R>> {
        let child: Arc<Sequence> = self.get(key)?;
        child.cast()
    }

    /// Walks a dotted path with conversion at the last step.
    ///
    /// The result holds at most one item; a missing step or a value that
    /// does not convert gives an empty result.
    pub fn lookup<'a, T: FromValue>(&'a self, path: &'a str) -> Lookup<'a, T> {
        Lookup::new(Root::Node(self), path, true)
    }

    /// Like [`Node::lookup`], but only matches values already of type `T`.
    pub fn lookup_exact<'a, T: FromValue>(&'a self, path: &'a str) -> Lookup<'a, T> {
        Lookup::new(Root::Node(self), path, false)
    }

    pub fn get_path<T: FromValue>(&self, path: &str) -> Result<T> {
        self.lookup(path)
            .next()
            .ok_or_else(|| Error::KeyNotFound(path.to_owned()))
    }

    pub fn get_path_or<T: FromValue>(&self, path: &str, default: T) -> T {
        or_default(self.get_path(path), default)
    }
}

macro_rules! named_getters {
    ($($get:ident, $get_or:ident => $t:ty;)*) => {
        impl Node {
            $(
                pub fn $get(&self, key: &str) -> Result<$t> {
                    self.get(key)
                }

                pub fn $get_or(&self, key: &str, default: $t) -> $t {
                    self.get_or(key, default)
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

/// Entries of a [`Node`] in key order.
#[derive(Debug, Clone)]
pub struct Iter<'a> {
    inner: btree_map::Iter<'a, String, Value>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = (&'a str, &'a Value);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(k, v)| (k.as_str(), v))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl DoubleEndedIterator for Iter<'_> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back().map(|(k, v)| (k.as_str(), v))
    }
}

impl ExactSizeIterator for Iter<'_> {}

impl<'a> IntoIterator for &'a Node {
    type Item = (&'a str, &'a Value);
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Iter<'a> {
        self.iter()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Node {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut node = Node::new();
        for (key, value) in iter {
            node.put(key, value);
        }
        node
    }
}

impl DeepCopy for Node {
    fn deep_copy_in(&self, ctx: &mut CopyContext) -> Self {
        Node {
            map: self.map.deep_copy_in(ctx),
        }
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_json_string())
    }
}

impl FromStr for Node {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Node::parse(s)
    }
}

impl TryFrom<serde_json::Value> for Node {
    type Error = Error;

    fn try_from(v: serde_json::Value) -> Result<Self> {
        Node::from_token(JsonToken::from(v))
    }
}

impl From<&Node> for serde_json::Value {
    fn from(node: &Node) -> Self {
        serde_json::Value::from(node.to_token())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_stay_in_byte_order() {
        let mut node = Node::new();
        node.put("b", 1).put("a", 2).put("C", 3).put("_", 4);
        assert_eq!(node.keys().collect::<Vec<_>>(), ["C", "_", "a", "b"]);
    }

    #[test]
    fn put_overwrites() {
        let mut node = Node::new();
        node.put("k", 1).put("k", "two");
        assert_eq!(node.len(), 1);
        assert_eq!(node.get_value("k"), Some(&Value::String("two".into())));
    }

    #[test]
    fn strict_and_defaulted_reads() {
        let node = Node::parse(r#"{"n":"12","s":"x","b":"yes","d":2}"#).unwrap();
        assert_eq!(node.get_int("n").unwrap(), 12);
        assert_eq!(node.get_long("n").unwrap(), 12);
        assert_eq!(node.get_double("d").unwrap(), 2.0);
        assert_eq!(node.get_string("d").unwrap(), "2");
        assert!(matches!(node.get_int("s"), Err(Error::Format { .. })));
        assert!(matches!(node.get_bool("b"), Err(Error::Format { .. })));
        assert!(matches!(node.get_int("missing"), Err(Error::KeyNotFound(k)) if k == "missing"));

        assert_eq!(node.get_int_or("s", -1), -1);
        assert_eq!(node.get_int_or("missing", -1), -1);
        assert!(node.get_bool_or("b", true));
        assert_eq!(node.get_node_or("n", Node::new()), Node::new());
    }

    #[test]
    fn nullable_reads() {
        let node = Node::parse(r#"{"x":null,"y":"4"}"#).unwrap();
        assert_eq!(node.get::<Option<i32>>("x").unwrap(), None);
        assert_eq!(node.get::<Option<i32>>("y").unwrap(), Some(4));
        assert!(matches!(node.get_string("x"), Err(Error::InvalidCast { .. })));
        assert_eq!(node.get_or::<Option<i32>>("missing", Some(9)), Some(9));
    }

    #[test]
    fn child_containers() {
        let mut node = Node::parse(r#"{"c":{"x":1},"l":[1,2]}"#).unwrap();
        assert_eq!(node.get_node("c").unwrap().get_int("x").unwrap(), 1);
        assert_eq!(node.get_sequence("l").unwrap().len(), 2);
        assert!(matches!(node.get_sequence("c"), Err(Error::InvalidCast { .. })));

        node.get_node_mut("c").unwrap().put("y", 2);
        node.get_sequence_mut("l").unwrap().add(3);
        assert_eq!(node.to_string(), r#"{"c":{"x":1,"y":2},"l":[1,2,3]}"#);
    }

    #[test]
    fn shared_children_are_copy_on_write() {
        let child = Arc::new(Node::parse(r#"{"v":1}"#).unwrap());
        let mut node = Node::new();
        node.put_shared("a", Arc::clone(&child))
            .put_shared("b", Arc::clone(&child));

        node.get_node_mut("a").unwrap().put("v", 2);
        assert_eq!(node.get_path::<i32>("a.v").unwrap(), 2);
        assert_eq!(node.get_path::<i32>("b.v").unwrap(), 1);
        assert_eq!(child.get_int("v").unwrap(), 1);
    }

    #[test]
    fn remove_and_clear() {
        let mut node: Node = [("a", 1), ("b", 2)].into_iter().collect();
        assert_eq!(node.remove("a"), Some(Value::Int(1)));
        assert_eq!(node.remove("a"), None);
        assert!(node.contains_key("b"));
        node.clear();
        assert!(node.is_empty());
    }

    #[test]
    fn parse_rejects_non_objects() {
        assert!(matches!(Node::parse("[1]"), Err(Error::InvalidCast { found: "array", .. })));
        assert!(matches!(Node::parse("{"), Err(Error::Json(_))));
        assert!("{}".parse::<Node>().unwrap().is_empty());
    }

    #[test]
    fn duplicate_keys_keep_the_last_value() {
        let node = Node::parse(r#"{"a":1,"a":2}"#).unwrap();
        assert_eq!(node.get_int("a").unwrap(), 2);
    }

    #[test]
    fn serde_json_interop() {
        let node = Node::try_from(serde_json::json!({"b": [1, 2.5], "a": "x"})).unwrap();
        assert_eq!(node.to_string(), r#"{"a":"x","b":[1,2.5]}"#);
        let back = serde_json::Value::from(&node);
        assert_eq!(back, serde_json::json!({"a": "x", "b": [1, 2.5]}));
    }
}
