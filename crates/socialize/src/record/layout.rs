//! What Unpack has learned about the names each record visitor accepts.
//!
//! A derived `Deserialize` publishes every name it accepts but not which of
//! them are aliases of one member, and a flattened record publishes nothing.
//! Unpack starts from a guess, reads corrections off the visitor's
//! `missing_field` and `duplicate_field` errors, and tries again. Layouts are
//! keyed by the visitor's type name and shared process-wide.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock, PoisonError, RwLock};

use tracing::debug;

use super::members::TypeMembers;
use crate::error::Error;
use crate::node::Node;
use crate::value::Value;

static NULL: Value = Value::Null;

#[derive(Debug, Clone, Default)]
pub(crate) struct Layout {
    /// Members fed to the visitor as `Null` when the node holds none of
    /// their names.
    nulls: Vec<&'static str>,
    /// Alias to the member it stands for.
    aliases: HashMap<String, &'static str>,
    /// `nulls` still holds every accepted name, aliases included.
    guessing: bool,
}

/// Where a visitor's candidate entries come from.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Shape {
    /// `deserialize_struct`: only the listed names.
    Fields(&'static [&'static str]),
    /// `deserialize_map`: every entry of the node.
    Map,
}

impl Layout {
    fn initial(shape: Shape, members: Option<&TypeMembers>) -> Self {
        match (members, shape) {
            (Some(members), _) if !members.is_anonymous() => Layout {
                nulls: members.members().iter().map(|m| m.name).collect(),
                aliases: members
                    .members()
                    .iter()
                    .flat_map(|m| m.aliases.iter().map(move |&alias| (alias.to_owned(), m.name)))
                    .collect(),
                guessing: false,
            },
            (_, Shape::Fields(fields)) => Layout {
                nulls: fields.to_vec(),
                aliases: HashMap::new(),
                guessing: true,
            },
            (_, Shape::Map) => Layout::default(),
        }
    }

    fn member_of<'k>(&self, key: &'k str) -> &'k str {
        self.aliases.get(key).copied().unwrap_or(key)
    }

    /// Synthesized `Null`s first, then one entry per member found in the
    /// node. A duplicate therefore always surfaces on a name the node holds.
    pub(crate) fn entries<'de>(
        &self,
        node: Option<&'de Node>,
        shape: Shape,
    ) -> Vec<(&'de str, &'de Value)> {
        let candidates: Vec<(&'de str, &'de Value)> = match (node, shape) {
            (None, _) => Vec::new(),
            (Some(node), Shape::Fields(fields)) => fields
                .iter()
                .filter_map(|&name| node.get_value(name).map(|value| (name, value)))
                .collect(),
            (Some(node), Shape::Map) => node.iter().collect(),
        };

        let mut filled = HashSet::new();
        let present: Vec<_> = candidates
            .into_iter()
            .filter(|&(key, _)| filled.insert(self.member_of(key)))
            .collect();
        self.nulls
            .iter()
            .filter(|name| !filled.contains(*name))
            .map(|&name| -> (&'de str, &'de Value) { (name, &NULL) })
            .chain(present)
            .collect()
    }

    fn require(&mut self, member: &'static str) -> bool {
        if self.nulls.contains(&member) {
            return false;
        }
        self.nulls.push(member);
        true
    }

    /// `key` was fed to the visitor and turned out to fill `member` a second
    /// time.
    fn alias(&mut self, key: &str, member: &'static str) -> bool {
        if key != member {
            if self.aliases.get(key) == Some(&member) {
                return false;
            }
            self.aliases.insert(key.to_owned(), member);
            self.nulls.retain(|&name| name != key);
            return true;
        }
        // The clash came from a guessed `Null` under some alias of `member`.
        // Drop the guesses and learn required members one at a time.
        if !self.guessing {
            return false;
        }
        self.guessing = false;
        self.nulls.clear();
        true
    }
}

type Table = RwLock<HashMap<&'static str, Arc<Layout>>>;

fn table() -> &'static Table {
    static LAYOUTS: OnceLock<Table> = OnceLock::new();
    LAYOUTS.get_or_init(Table::default)
}

static GENERATION: AtomicU64 = AtomicU64::new(0);

/// Bumped whenever any layout changes.
pub(crate) fn generation() -> u64 {
    GENERATION.load(Ordering::Acquire)
}

pub(crate) fn layout_for(
    visitor: &'static str,
    shape: Shape,
    members: Option<&TypeMembers>,
) -> Arc<Layout> {
    if let Some(found) = table()
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .get(visitor)
    {
        return Arc::clone(found);
    }
    let mut layouts = table().write().unwrap_or_else(PoisonError::into_inner);
    Arc::clone(
        layouts
            .entry(visitor)
            .or_insert_with(|| Arc::new(Layout::initial(shape, members))),
    )
}

/// Folds what a failed visit revealed into the visitor's layout.
pub(crate) fn learn(visitor: &'static str, err: &Error, last_key: &str) {
    let mut layouts = table().write().unwrap_or_else(PoisonError::into_inner);
    let Some(layout) = layouts.get_mut(visitor) else {
        return;
    };
    let changed = match *err {
        Error::MissingMember(member) => Arc::make_mut(layout).require(member),
        Error::DuplicateMember(member) => Arc::make_mut(layout).alias(last_key, member),
        _ => false,
    };
    if changed {
        GENERATION.fetch_add(1, Ordering::AcqRel);
        debug!(visitor, %err, last_key, "record layout updated");
    }
}
