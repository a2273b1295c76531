//! Unpack: `serde::Deserializer`s over stored values.
//!
//! Members missing from a node read as `Null`, and `Null` reads as the
//! member's zero value. Which names stand for which member is kept in
//! [`layout`](super::layout). Scalars convert through their textual form, the same
//! way the typed accessors do. A container where a scalar is expected (or the
//! other way round) is an `UnsupportedType` error naming the target.

use std::any::type_name;
use std::str::FromStr;

use serde::de::value::BorrowedStrDeserializer;
use serde::de::{
    DeserializeSeed, Deserializer, EnumAccess, MapAccess, SeqAccess, VariantAccess, Visitor,
};
use serde::forward_to_deserialize_any;

use super::layout::{self, Shape};
use super::members::TypeMembers;
use crate::convert::parse_bool;
use crate::error::{Error, Result};
use crate::node::Node;
use crate::sequence::Sequence;
use crate::value::Value;

static NULL: Value = Value::Null;

pub(crate) struct ValueDeserializer<'de> {
    value: &'de Value,
}

impl<'de> ValueDeserializer<'de> {
    pub(crate) fn new(value: &'de Value) -> Self {
        Self { value }
    }

    pub(crate) fn null() -> Self {
        Self { value: &NULL }
    }

    fn unsupported(&self, target: &str) -> Error {
        Error::unsupported(target, format!("cannot unpack a {} value", self.value.kind()))
    }

    /// Stringify, trim and parse.
    fn parse<T: FromStr>(&self, target: &'static str) -> Result<T> {
        let text = self.value.to_string();
        text.trim().parse().map_err(|_| Error::format(text, target))
    }
}

fn visit_sequence<'de, V: Visitor<'de>>(seq: &'de Sequence, visitor: V) -> Result<V::Value> {
    visitor.visit_seq(SeqItems { iter: seq.iter() })
}

macro_rules! deserialize_number {
    ($($method:ident => $visit:ident, $t:ty $(, $exact:ident)?;)*) => {
        $(
            fn $method<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
                match self.value {
                    Value::Null => visitor.$visit(<$t>::default()),
                    $(Value::$exact(v) => visitor.$visit(*v),)?
                    Value::Node(_) | Value::Sequence(_) => Err(self.unsupported(stringify!($t))),
                    _ => visitor.$visit(self.parse::<$t>(stringify!($t))?),
                }
            }
        )*
    };
}

impl<'de> Deserializer<'de> for ValueDeserializer<'de> {
    type Error = Error;

    fn deserialize_any<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        match self.value {
            Value::Null => visitor.visit_unit(),
            Value::String(s) => visitor.visit_borrowed_str(s),
            Value::Bool(b) => visitor.visit_bool(*b),
            Value::Int(i) => visitor.visit_i32(*i),
            Value::Long(l) => visitor.visit_i64(*l),
            Value::Double(d) => visitor.visit_f64(*d),
            Value::Node(node) => NodeDeserializer::new(node).deserialize_any(visitor),
            Value::Sequence(seq) => visit_sequence(seq, visitor),
        }
    }

    fn deserialize_bool<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        match self.value {
            Value::Null => visitor.visit_bool(false),
            Value::Bool(b) => visitor.visit_bool(*b),
            Value::Node(_) | Value::Sequence(_) => Err(self.unsupported("bool")),
            scalar => {
                let text = scalar.to_string();
                match parse_bool(&text) {
                    Some(b) => visitor.visit_bool(b),
                    None => Err(Error::format(text, "bool")),
                }
            }
        }
    }

    deserialize_number! {
        deserialize_i8 => visit_i8, i8;
        deserialize_i16 => visit_i16, i16;
        deserialize_i32 => visit_i32, i32, Int;
        deserialize_i64 => visit_i64, i64, Long;
        deserialize_u8 => visit_u8, u8;
        deserialize_u16 => visit_u16, u16;
        deserialize_u32 => visit_u32, u32;
        deserialize_u64 => visit_u64, u64;
        deserialize_f32 => visit_f32, f32;
        deserialize_f64 => visit_f64, f64, Double;
    }

    fn deserialize_char<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        match self.value {
            Value::Null => visitor.visit_char('\0'),
            Value::Node(_) | Value::Sequence(_) => Err(self.unsupported("char")),
            scalar => {
                let text = scalar.to_string();
                let mut chars = text.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => visitor.visit_char(c),
                    _ => Err(Error::format(text, "char")),
                }
            }
        }
    }

    fn deserialize_str<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        match self.value {
            Value::Null => visitor.visit_borrowed_str(""),
            Value::String(s) => visitor.visit_borrowed_str(s),
            other => visitor.visit_string(other.to_string()),
        }
    }

    fn deserialize_string<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        self.deserialize_str(visitor)
    }

    fn deserialize_bytes<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        match self.value {
            Value::Null => visitor.visit_borrowed_bytes(&[]),
            Value::String(s) => visitor.visit_borrowed_bytes(s.as_bytes()),
            Value::Sequence(seq) => visit_sequence(seq, visitor),
            _ => Err(self.unsupported("bytes")),
        }
    }

    fn deserialize_byte_buf<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        self.deserialize_bytes(visitor)
    }

    fn deserialize_option<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        match self.value {
            Value::Null => visitor.visit_none(),
            _ => visitor.visit_some(self),
        }
    }

    fn deserialize_unit<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        match self.value {
            Value::Null => visitor.visit_unit(),
            _ => Err(self.unsupported("()")),
        }
    }

    fn deserialize_unit_struct<V: Visitor<'de>>(
        self,
        name: &'static str,
        visitor: V,
    ) -> Result<V::Value> {
        match self.value {
            Value::Null => visitor.visit_unit(),
            _ => Err(self.unsupported(name)),
        }
    }

    fn deserialize_newtype_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        visitor: V,
    ) -> Result<V::Value> {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_seq<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        match self.value {
            Value::Null => visitor.visit_seq(SeqItems {
                iter: std::iter::empty::<&Value>(),
            }),
            Value::Sequence(seq) => visit_sequence(seq, visitor),
            _ => Err(self.unsupported("sequence")),
        }
    }

    fn deserialize_tuple<V: Visitor<'de>>(self, _len: usize, visitor: V) -> Result<V::Value> {
        self.deserialize_seq(visitor)
    }

    fn deserialize_tuple_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        _len: usize,
        visitor: V,
    ) -> Result<V::Value> {
        self.deserialize_seq(visitor)
    }

    fn deserialize_map<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        match self.value {
            Value::Null => visit_record(None, Shape::Map, None, visitor),
            Value::Node(node) => NodeDeserializer::new(node).deserialize_map(visitor),
            _ => Err(self.unsupported("map")),
        }
    }

    fn deserialize_struct<V: Visitor<'de>>(
        self,
        name: &'static str,
        fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value> {
        match self.value {
            Value::Null => visit_record(None, Shape::Fields(fields), None, visitor),
            Value::Node(node) => NodeDeserializer::new(node).deserialize_struct(name, fields, visitor),
            _ => Err(self.unsupported(name)),
        }
    }

    fn deserialize_enum<V: Visitor<'de>>(
        self,
        name: &'static str,
        variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value> {
        match self.value {
            Value::String(s) => visitor.visit_enum(BorrowedStrDeserializer::<Error>::new(s)),
            Value::Node(node) => NodeDeserializer::new(node).deserialize_enum(name, variants, visitor),
            _ => Err(self.unsupported(name)),
        }
    }

    fn deserialize_identifier<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        self.deserialize_str(visitor)
    }

    fn deserialize_ignored_any<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        visitor.visit_unit()
    }
}

/// Payload side of a `{variant: payload}` node.
impl<'de> VariantAccess<'de> for ValueDeserializer<'de> {
    type Error = Error;

    fn unit_variant(self) -> Result<()> {
        Ok(())
    }

    fn newtype_variant_seed<T: DeserializeSeed<'de>>(self, seed: T) -> Result<T::Value> {
        seed.deserialize(self)
    }

    fn tuple_variant<V: Visitor<'de>>(self, _len: usize, visitor: V) -> Result<V::Value> {
        self.deserialize_seq(visitor)
    }

    fn struct_variant<V: Visitor<'de>>(
        self,
        fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value> {
        self.deserialize_struct("", fields, visitor)
    }
}

/// Deserializer for a whole node. At the top level of an unpack it carries
/// the cached member list of the target type.
pub(crate) struct NodeDeserializer<'de> {
    node: &'de Node,
    members: Option<&'de TypeMembers>,
}

impl<'de> NodeDeserializer<'de> {
    pub(crate) fn new(node: &'de Node) -> Self {
        Self {
            node,
            members: None,
        }
    }

    pub(crate) fn with_members(node: &'de Node, members: &'de TypeMembers) -> Self {
        Self {
            node,
            members: Some(members),
        }
    }

    fn unsupported(&self, target: &str) -> Error {
        Error::unsupported(target, "cannot unpack a node value")
    }
}

macro_rules! node_is_not {
    ($($method:ident => $target:literal;)*) => {
        $(
            fn $method<V: Visitor<'de>>(self, _visitor: V) -> Result<V::Value> {
                Err(self.unsupported($target))
            }
        )*
    };
}

impl<'de> Deserializer<'de> for NodeDeserializer<'de> {
    type Error = Error;

    fn deserialize_any<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        visitor.visit_map(NodeEntries::new(self.node.iter()))
    }

    fn deserialize_map<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        visit_record(Some(self.node), Shape::Map, self.members, visitor)
    }

    fn deserialize_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value> {
        visit_record(Some(self.node), Shape::Fields(fields), self.members, visitor)
    }

    fn deserialize_enum<V: Visitor<'de>>(
        self,
        name: &'static str,
        _variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value> {
        let mut entries = self.node.iter();
        match (entries.next(), entries.next()) {
            (Some((variant, payload)), None) => visitor.visit_enum(TaggedVariant { variant, payload }),
            _ => Err(Error::unsupported(
                name,
                format!("expected a node with one entry, found {}", self.node.len()),
            )),
        }
    }

    fn deserialize_option<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        visitor.visit_some(self)
    }

    fn deserialize_newtype_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        visitor: V,
    ) -> Result<V::Value> {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_str<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        visitor.visit_string(self.node.to_json_string())
    }

    fn deserialize_string<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        self.deserialize_str(visitor)
    }

    fn deserialize_ignored_any<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        visitor.visit_unit()
    }

    fn deserialize_unit_struct<V: Visitor<'de>>(
        self,
        name: &'static str,
        _visitor: V,
    ) -> Result<V::Value> {
        Err(self.unsupported(name))
    }

    fn deserialize_tuple<V: Visitor<'de>>(self, _len: usize, _visitor: V) -> Result<V::Value> {
        Err(self.unsupported("tuple"))
    }

    fn deserialize_tuple_struct<V: Visitor<'de>>(
        self,
        name: &'static str,
        _len: usize,
        _visitor: V,
    ) -> Result<V::Value> {
        Err(self.unsupported(name))
    }

    node_is_not! {
        deserialize_bool => "bool";
        deserialize_i8 => "i8";
        deserialize_i16 => "i16";
        deserialize_i32 => "i32";
        deserialize_i64 => "i64";
        deserialize_u8 => "u8";
        deserialize_u16 => "u16";
        deserialize_u32 => "u32";
        deserialize_u64 => "u64";
        deserialize_f32 => "f32";
        deserialize_f64 => "f64";
        deserialize_char => "char";
        deserialize_bytes => "bytes";
        deserialize_byte_buf => "bytes";
        deserialize_unit => "()";
        deserialize_seq => "sequence";
        deserialize_identifier => "identifier";
    }
}

struct SeqItems<I> {
    iter: I,
}

impl<'de, I: Iterator<Item = &'de Value>> SeqAccess<'de> for SeqItems<I> {
    type Error = Error;

    fn next_element_seed<T: DeserializeSeed<'de>>(&mut self, seed: T) -> Result<Option<T::Value>> {
        match self.iter.next() {
            Some(value) => seed.deserialize(ValueDeserializer::new(value)).map(Some),
            None => Ok(None),
        }
    }

    fn size_hint(&self) -> Option<usize> {
        self.iter.size_hint().1
    }
}

/// Every entry of a node as stored, for self-describing targets.
struct NodeEntries<'de, I> {
    iter: I,
    pending: &'de Value,
}

impl<'de, I> NodeEntries<'de, I> {
    fn new(iter: I) -> Self {
        Self {
            iter,
            pending: &NULL,
        }
    }
}

impl<'de, I: Iterator<Item = (&'de str, &'de Value)>> MapAccess<'de> for NodeEntries<'de, I> {
    type Error = Error;

    fn next_key_seed<K: DeserializeSeed<'de>>(&mut self, seed: K) -> Result<Option<K::Value>> {
        match self.iter.next() {
            Some((key, value)) => {
                self.pending = value;
                seed.deserialize(KeyDeserializer(key)).map(Some)
            }
            None => Ok(None),
        }
    }

    fn next_value_seed<V: DeserializeSeed<'de>>(&mut self, seed: V) -> Result<V::Value> {
        seed.deserialize(ValueDeserializer::new(self.pending))
    }

    fn size_hint(&self) -> Option<usize> {
        self.iter.size_hint().1
    }
}

/// Runs a record or map visitor over the entries its layout picks. When the
/// visitor itself rejects them, the layout learns from the rejection.
fn visit_record<'de, V: Visitor<'de>>(
    node: Option<&'de Node>,
    shape: Shape,
    members: Option<&TypeMembers>,
    visitor: V,
) -> Result<V::Value> {
    let key = type_name::<V>();
    let mut access = RecordEntries::new(layout::layout_for(key, shape, members).entries(node, shape));
    let result = visitor.visit_map(&mut access);
    if let Err(err) = &result {
        // Errors from inside a member belong to that member's own layout.
        if !access.value_failed {
            layout::learn(key, err, access.last_key);
        }
    }
    result
}

struct RecordEntries<'de> {
    entries: std::vec::IntoIter<(&'de str, &'de Value)>,
    pending: &'de Value,
    last_key: &'de str,
    value_failed: bool,
}

impl<'de> RecordEntries<'de> {
    fn new(entries: Vec<(&'de str, &'de Value)>) -> Self {
        Self {
            entries: entries.into_iter(),
            pending: &NULL,
            last_key: "",
            value_failed: false,
        }
    }
}

impl<'de> MapAccess<'de> for RecordEntries<'de> {
    type Error = Error;

    fn next_key_seed<K: DeserializeSeed<'de>>(&mut self, seed: K) -> Result<Option<K::Value>> {
        let Some((key, value)) = self.entries.next() else {
            return Ok(None);
        };
        self.pending = value;
        self.last_key = key;
        seed.deserialize(KeyDeserializer(key)).map(Some)
    }

    fn next_value_seed<V: DeserializeSeed<'de>>(&mut self, seed: V) -> Result<V::Value> {
        let result = seed.deserialize(ValueDeserializer::new(self.pending));
        self.value_failed |= result.is_err();
        result
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.entries.len())
    }
}

struct TaggedVariant<'de> {
    variant: &'de str,
    payload: &'de Value,
}

impl<'de> EnumAccess<'de> for TaggedVariant<'de> {
    type Error = Error;
    type Variant = ValueDeserializer<'de>;

    fn variant_seed<V: DeserializeSeed<'de>>(self, seed: V) -> Result<(V::Value, Self::Variant)> {
        let tag = seed.deserialize(BorrowedStrDeserializer::<Error>::new(self.variant))?;
        Ok((tag, ValueDeserializer::new(self.payload)))
    }
}

/// Node keys, parsed on demand for maps keyed by numbers or booleans.
struct KeyDeserializer<'de>(&'de str);

macro_rules! deserialize_key_number {
    ($($method:ident => $visit:ident, $t:ty;)*) => {
        $(
            fn $method<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
                match self.0.parse::<$t>() {
                    Ok(n) => visitor.$visit(n),
                    Err(_) => Err(Error::format(self.0, stringify!($t))),
                }
            }
        )*
    };
}

impl<'de> Deserializer<'de> for KeyDeserializer<'de> {
    type Error = Error;

    fn deserialize_any<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        visitor.visit_borrowed_str(self.0)
    }

    fn deserialize_bool<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        match parse_bool(self.0) {
            Some(b) => visitor.visit_bool(b),
            None => Err(Error::format(self.0, "bool")),
        }
    }

    deserialize_key_number! {
        deserialize_i8 => visit_i8, i8;
        deserialize_i16 => visit_i16, i16;
        deserialize_i32 => visit_i32, i32;
        deserialize_i64 => visit_i64, i64;
        deserialize_u8 => visit_u8, u8;
        deserialize_u16 => visit_u16, u16;
        deserialize_u32 => visit_u32, u32;
        deserialize_u64 => visit_u64, u64;
        deserialize_f32 => visit_f32, f32;
        deserialize_f64 => visit_f64, f64;
    }

    fn deserialize_option<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        visitor.visit_some(self)
    }

    fn deserialize_newtype_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        visitor: V,
    ) -> Result<V::Value> {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_enum<V: Visitor<'de>>(
        self,
        _name: &'static str,
        _variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value> {
        visitor.visit_enum(BorrowedStrDeserializer::<Error>::new(self.0))
    }

    forward_to_deserialize_any! {
        i128 u128 char str string bytes byte_buf unit unit_struct seq tuple
        tuple_struct map struct identifier ignored_any
    }
}
