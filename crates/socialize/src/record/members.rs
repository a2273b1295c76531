//! Per-type member lists, discovered once and cached.
//!
//! A record's members are whatever its `Deserialize` impl asks for when it
//! calls `deserialize_struct`. [`TypeMembers::probe`] runs the impl against a
//! deserializer that records that call and stops. Types that never make it
//! (maps, sequences, scalars) are anonymous: Unpack enumerates every entry
//! for them.
//!
//! A derive lists aliases next to member names without saying which is
//! which. Each listed name is fed to the record twice; the derive's
//! duplicate report names the member it belongs to.

use std::any::{type_name, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, OnceLock, PoisonError, RwLock};

use serde::de::value::BorrowedStrDeserializer;
use serde::de::{self, DeserializeOwned, DeserializeSeed, MapAccess, Visitor};
use serde::forward_to_deserialize_any;
use tracing::debug;

use super::de::ValueDeserializer;
use crate::error::Error;

/// One writable member of a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberDescriptor {
    pub name: &'static str,
    pub index: usize,
    /// Other names the member is read from (`#[serde(alias = ...)]`).
    pub aliases: Vec<&'static str>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeMembers {
    type_name: &'static str,
    record_name: Option<&'static str>,
    members: Vec<MemberDescriptor>,
}

impl TypeMembers {
    pub fn probe<T: DeserializeOwned>() -> Self {
        let mut found = None;
        // The probe always fails; only what it captured matters.
        let _ = T::deserialize(Probe { found: &mut found });
        let (record_name, fields) = match found {
            Some((name, fields)) => (Some(name), fields),
            None => (None, &[][..]),
        };
        let mut members: Vec<MemberDescriptor> = Vec::new();
        for &name in fields {
            let member = member_named::<T>(name);
            let alias = (name != member).then_some(name);
            match members.iter().position(|m| m.name == member) {
                Some(at) => members[at].aliases.extend(alias),
                None => {
                    let index = members.len();
                    members.push(MemberDescriptor {
                        name: member,
                        index,
                        aliases: alias.into_iter().collect(),
                    });
                }
            }
        }
        TypeMembers {
            type_name: type_name::<T>(),
            record_name,
            members,
        }
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Name the type gives itself in its `Deserialize` impl.
    pub fn record_name(&self) -> Option<&'static str> {
        self.record_name
    }

    pub fn is_anonymous(&self) -> bool {
        self.record_name.is_none()
    }

    pub fn members(&self) -> &[MemberDescriptor] {
        &self.members
    }
}

/// The member that accepts `name`: the one the derive reports when `name`
/// arrives twice. A name whose first value cannot be read as `Null` is
/// taken as its own member.
fn member_named<T: DeserializeOwned>(name: &'static str) -> &'static str {
    let mut repeated = false;
    match T::deserialize(RepeatName {
        name,
        repeated: &mut repeated,
    }) {
        Err(Error::DuplicateMember(member)) if repeated => member,
        _ => name,
    }
}

/// Cache of [`TypeMembers`] keyed by [`TypeId`].
///
/// Lookups take the read lock only. A miss takes the write lock, checks
/// again and probes the type while holding it.
#[derive(Default)]
pub struct MemberCache {
    entries: RwLock<HashMap<TypeId, Arc<TypeMembers>>>,
}

impl MemberCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide cache used by [`Node::cast`](crate::Node::cast).
    pub fn global() -> &'static MemberCache {
        static GLOBAL: OnceLock<MemberCache> = OnceLock::new();
        GLOBAL.get_or_init(MemberCache::new)
    }

    pub fn members_of<T: DeserializeOwned + 'static>(&self) -> Arc<TypeMembers> {
        let id = TypeId::of::<T>();
        if let Some(found) = self.read().get(&id) {
            return Arc::clone(found);
        }

        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(found) = entries.get(&id) {
            return Arc::clone(found);
        }
        let members = Arc::new(TypeMembers::probe::<T>());
        debug!(
            type_name = members.type_name,
            members = members.members.len(),
            anonymous = members.is_anonymous(),
            "cached record members"
        );
        entries.insert(id, Arc::clone(&members));
        members
    }

    pub fn contains<T: 'static>(&self) -> bool {
        self.read().contains_key(&TypeId::of::<T>())
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    pub fn clear(&self) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, HashMap<TypeId, Arc<TypeMembers>>> {
        self.entries.read().unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for MemberCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemberCache")
            .field("len", &self.len())
            .finish()
    }
}

type Captured = Option<(&'static str, &'static [&'static str])>;

struct Probe<'a> {
    found: &'a mut Captured,
}

#[derive(Debug)]
struct ProbeStop;

impl fmt::Display for ProbeStop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("probe stop")
    }
}

impl std::error::Error for ProbeStop {}

impl de::Error for ProbeStop {
    fn custom<T: fmt::Display>(_msg: T) -> Self {
        ProbeStop
    }
}

impl<'de> de::Deserializer<'de> for Probe<'_> {
    type Error = ProbeStop;

    fn deserialize_any<V: Visitor<'de>>(self, _visitor: V) -> Result<V::Value, ProbeStop> {
        Err(ProbeStop)
    }

    fn deserialize_struct<V: Visitor<'de>>(
        self,
        name: &'static str,
        fields: &'static [&'static str],
        _visitor: V,
    ) -> Result<V::Value, ProbeStop> {
        *self.found = Some((name, fields));
        Err(ProbeStop)
    }

    fn deserialize_option<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, ProbeStop> {
        visitor.visit_some(self)
    }

    fn deserialize_newtype_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        visitor: V,
    ) -> Result<V::Value, ProbeStop> {
        visitor.visit_newtype_struct(self)
    }

    forward_to_deserialize_any! {
        bool i8 i16 i32 i64 i128 u8 u16 u32 u64 u128 f32 f64 char str string
        bytes byte_buf unit unit_struct seq tuple tuple_struct map enum
        identifier ignored_any
    }
}

/// Presents a record with the same name twice, the first time as `Null`.
struct RepeatName<'a> {
    name: &'static str,
    repeated: &'a mut bool,
}

impl<'de> de::Deserializer<'de> for RepeatName<'_> {
    type Error = Error;

    fn deserialize_any<V: Visitor<'de>>(self, _visitor: V) -> Result<V::Value, Error> {
        Err(Error::Record("not a record".to_owned()))
    }

    fn deserialize_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        _fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, Error> {
        visitor.visit_map(RepeatedEntries {
            name: self.name,
            given: 0,
            repeated: self.repeated,
        })
    }

    fn deserialize_option<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Error> {
        visitor.visit_some(self)
    }

    fn deserialize_newtype_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        visitor: V,
    ) -> Result<V::Value, Error> {
        visitor.visit_newtype_struct(self)
    }

    forward_to_deserialize_any! {
        bool i8 i16 i32 i64 i128 u8 u16 u32 u64 u128 f32 f64 char str string
        bytes byte_buf unit unit_struct seq tuple tuple_struct map enum
        identifier ignored_any
    }
}

struct RepeatedEntries<'a> {
    name: &'static str,
    given: u8,
    repeated: &'a mut bool,
}

impl<'de> MapAccess<'de> for RepeatedEntries<'_> {
    type Error = Error;

    fn next_key_seed<K: DeserializeSeed<'de>>(&mut self, seed: K) -> Result<Option<K::Value>, Error> {
        if self.given == 2 {
            return Ok(None);
        }
        self.given += 1;
        *self.repeated = self.given == 2;
        seed.deserialize(BorrowedStrDeserializer::<Error>::new(self.name))
            .map(Some)
    }

    fn next_value_seed<V: DeserializeSeed<'de>>(&mut self, seed: V) -> Result<V::Value, Error> {
        seed.deserialize(ValueDeserializer::null())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use std::collections::BTreeMap;

    #[allow(dead_code)]
    #[derive(Deserialize)]
    struct Account {
        #[serde(rename = "UID")]
        uid: String,
        age: i32,
        #[serde(skip)]
        session: Option<String>,
    }

    #[allow(dead_code)]
    #[derive(Deserialize)]
    struct Wrapper(Account);

    #[test]
    fn probes_record_members() {
        let members = TypeMembers::probe::<Account>();
        assert_eq!(members.record_name(), Some("Account"));
        assert!(!members.is_anonymous());
        let names: Vec<_> = members.members().iter().map(|m| m.name).collect();
        assert_eq!(names, ["UID", "age"]);
        assert_eq!(members.members()[1].index, 1);
        assert!(members.members().iter().all(|m| m.aliases.is_empty()));
    }

    #[allow(dead_code)]
    #[derive(Deserialize)]
    struct Aliased {
        #[serde(alias = "userName", alias = "login")]
        name: String,
        #[serde(alias = "years")]
        age: i32,
    }

    #[test]
    fn aliases_fold_into_their_member() {
        let members = TypeMembers::probe::<Aliased>();
        assert_eq!(members.members().len(), 2);
        let name = &members.members()[0];
        assert_eq!(name.name, "name");
        assert_eq!(name.index, 0);
        let mut aliases = name.aliases.clone();
        aliases.sort_unstable();
        assert_eq!(aliases, ["login", "userName"]);
        assert_eq!(members.members()[1].name, "age");
        assert_eq!(members.members()[1].aliases, ["years"]);
    }

    #[test]
    fn sees_through_options_and_newtypes() {
        assert_eq!(TypeMembers::probe::<Option<Account>>().record_name(), Some("Account"));
        assert_eq!(TypeMembers::probe::<Wrapper>().record_name(), Some("Account"));
    }

    #[test]
    fn maps_are_anonymous() {
        let members = TypeMembers::probe::<BTreeMap<String, i32>>();
        assert!(members.is_anonymous());
        assert!(members.members().is_empty());
    }

    #[test]
    fn cache_populates_once_and_clears() {
        let cache = MemberCache::new();
        assert!(cache.is_empty());
        let first = cache.members_of::<Account>();
        let second = cache.members_of::<Account>();
        assert!(Arc::ptr_eq(&first, &second));
        assert!(cache.contains::<Account>());
        assert!(!cache.contains::<Wrapper>());
        assert_eq!(cache.len(), 1);

        cache.clear();
        assert!(cache.is_empty());
        assert!(!Arc::ptr_eq(&first, &cache.members_of::<Account>()));
    }

    #[test]
    fn concurrent_first_use_yields_one_entry() {
        let cache = MemberCache::new();
        std::thread::scope(|scope| {
            for _ in 0..8 {
                scope.spawn(|| cache.members_of::<Account>());
            }
        });
        assert_eq!(cache.len(), 1);
    }
}
