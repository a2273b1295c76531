//! Mapping between containers and serde records.
//!
//! Pack turns anything `Serialize` into a [`Value`] tree: records and maps
//! become nodes, lists and tuples become sequences, unit enum variants become
//! their name and data-carrying variants become `{variant: payload}`.
//! `#[serde(skip)]` members are left out.
//!
//! Unpack goes the other way through a `Deserializer` that applies the same
//! coercions as the typed accessors. The member list of the top-level record
//! comes from a [`MemberCache`]. Nested records start from a guess that is
//! corrected from the derive's own missing and duplicate member reports, so
//! the first unpack of such a type may run more than once.
//!
//! Members of a `#[serde(flatten)]` record are buffered by serde itself and
//! skip these coercions: they must be stored with their exact kind, and an
//! absent one only reads as zero when it is an `Option`.

mod de;
mod layout;
mod members;
mod ser;

pub use members::{MemberCache, MemberDescriptor, TypeMembers};

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::trace;

use crate::error::{Error, Result};
use crate::node::Node;
use crate::value::Value;

use self::de::{NodeDeserializer, ValueDeserializer};
use self::ser::ValueSerializer;

/// Packs any serializable value.
pub fn to_value<T: Serialize + ?Sized>(value: &T) -> Result<Value> {
    value.serialize(ValueSerializer)
}

/// Unpacks a stored value into `T`.
pub fn from_value<T: DeserializeOwned>(value: &Value) -> Result<T> {
    relearning(|| T::deserialize(ValueDeserializer::new(value)))
}

pub(crate) fn pack<R: Serialize + ?Sized>(record: &R) -> Result<Node> {
    match to_value(record)? {
        Value::Node(node) => Ok(Arc::try_unwrap(node).unwrap_or_else(|shared| (*shared).clone())),
        other => Err(Error::invalid_cast(other.kind(), "node")),
    }
}

pub(crate) fn unpack<R: DeserializeOwned + 'static>(node: &Node, cache: &MemberCache) -> Result<R> {
    let members = cache.members_of::<R>();
    relearning(|| R::deserialize(NodeDeserializer::with_members(node, &members)))
}

/// Repeats an unpack for as long as its failures teach a layout something.
fn relearning<T>(mut unpack: impl FnMut() -> Result<T>) -> Result<T> {
    loop {
        let before = layout::generation();
        match unpack() {
            Err(err) if layout::generation() != before => {
                trace!(%err, "unpacking again with a corrected record layout");
            }
            result => return result,
        }
    }
}

