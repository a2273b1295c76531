//! Structural deep copy.
//!
//! [`deep_copy`] walks a value graph and rebuilds it without going through
//! any text format, so distinctions a JSON round trip would erase (an `i32`
//! versus an `i64`, a `f32` versus a `f64`) survive the copy. Shared
//! `Arc`/`Rc` children are copied once and stay shared in the result; see
//! [`CopyContext`].

mod context;

pub use context::CopyContext;

use std::collections::{BTreeMap, HashMap};
use std::hash::{BuildHasher, Hash};
use std::rc::Rc;
use std::sync::Arc;

use serde_json::{Map, Value};

/// A value that can produce an independent copy of itself.
///
/// Unlike `Clone`, the copy must not share any allocation with the original:
/// implementations for pointer types allocate a new pointee.
pub trait DeepCopy: Sized {
    fn deep_copy_in(&self, ctx: &mut CopyContext) -> Self;
}

/// Creates an independent copy of `value`.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use socialize_util::deep_copy::deep_copy;
///
/// let child = Arc::new(vec![1, 2, 3]);
/// let original = vec![Arc::clone(&child), Arc::clone(&child)];
/// let copy = deep_copy(&original);
///
/// assert_eq!(copy, original);
/// assert!(!Arc::ptr_eq(&copy[0], &child));
/// // The two slots alias one allocation in the copy as they did before.
/// assert!(Arc::ptr_eq(&copy[0], &copy[1]));
/// ```
pub fn deep_copy<T: DeepCopy>(value: &T) -> T {
    let mut ctx = CopyContext::new();
    value.deep_copy_in(&mut ctx)
}

macro_rules! copy_by_value {
    ($($t:ty),* $(,)?) => {
        $(
            impl DeepCopy for $t {
                #[inline]
                fn deep_copy_in(&self, _ctx: &mut CopyContext) -> Self {
                    *self
                }
            }
        )*
    };
}

copy_by_value!(
    (), bool, char, i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64,
);

impl DeepCopy for String {
    fn deep_copy_in(&self, _ctx: &mut CopyContext) -> Self {
        self.as_str().to_owned()
    }
}

impl<T: DeepCopy> DeepCopy for Option<T> {
    fn deep_copy_in(&self, ctx: &mut CopyContext) -> Self {
        self.as_ref().map(|v| v.deep_copy_in(ctx))
    }
}

impl<T: DeepCopy> DeepCopy for Box<T> {
    fn deep_copy_in(&self, ctx: &mut CopyContext) -> Self {
        Box::new(T::deep_copy_in(self, ctx))
    }
}

impl<T: DeepCopy> DeepCopy for Vec<T> {
    fn deep_copy_in(&self, ctx: &mut CopyContext) -> Self {
        self.iter().map(|v| v.deep_copy_in(ctx)).collect()
    }
}

impl<K, V> DeepCopy for BTreeMap<K, V>
where
    K: DeepCopy + Ord,
    V: DeepCopy,
{
    fn deep_copy_in(&self, ctx: &mut CopyContext) -> Self {
        let mut out = BTreeMap::new();
        for (k, v) in self {
            out.insert(k.deep_copy_in(ctx), v.deep_copy_in(ctx));
        }
        out
    }
}

impl<K, V, S> DeepCopy for HashMap<K, V, S>
where
    K: DeepCopy + Eq + Hash,
    V: DeepCopy,
    S: BuildHasher + Clone,
{
    fn deep_copy_in(&self, ctx: &mut CopyContext) -> Self {
        let mut out = HashMap::with_capacity_and_hasher(self.len(), self.hasher().clone());
        for (k, v) in self {
            out.insert(k.deep_copy_in(ctx), v.deep_copy_in(ctx));
        }
        out
    }
}

impl<T: DeepCopy + 'static> DeepCopy for Arc<T> {
    fn deep_copy_in(&self, ctx: &mut CopyContext) -> Self {
        ctx.copy_arc(self)
    }
}

impl<T: DeepCopy + 'static> DeepCopy for Rc<T> {
    fn deep_copy_in(&self, ctx: &mut CopyContext) -> Self {
        ctx.copy_rc(self)
    }
}

impl DeepCopy for Value {
    fn deep_copy_in(&self, ctx: &mut CopyContext) -> Self {
        match self {
            Value::Null => Value::Null,
            Value::Bool(b) => Value::Bool(*b),
            Value::Number(n) => Value::Number(n.clone()),
            Value::String(s) => Value::String(s.deep_copy_in(ctx)),
            Value::Array(arr) => Value::Array(arr.deep_copy_in(ctx)),
            Value::Object(obj) => {
                let mut out = Map::new();
                for (key, val) in obj {
                    out.insert(key.deep_copy_in(ctx), val.deep_copy_in(ctx));
                }
                Value::Object(out)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, PartialEq)]
    struct Holder {
        left: Arc<Vec<String>>,
        right: Arc<Vec<String>>,
    }

    impl DeepCopy for Holder {
        fn deep_copy_in(&self, ctx: &mut CopyContext) -> Self {
            Holder {
                left: self.left.deep_copy_in(ctx),
                right: self.right.deep_copy_in(ctx),
            }
        }
    }

    #[test]
    fn copies_scalars_and_strings() {
        assert_eq!(deep_copy(&42i32), 42);
        assert_eq!(deep_copy(&Some("x".to_string())), Some("x".to_string()));
        assert_eq!(deep_copy(&None::<u8>), None);
    }

    #[test]
    fn preserves_aliasing() {
        let shared = Arc::new(vec!["a".to_string()]);
        let holder = Holder {
            left: Arc::clone(&shared),
            right: Arc::clone(&shared),
        };
        let copy = deep_copy(&holder);
        assert_eq!(copy, holder);
        assert!(Arc::ptr_eq(&copy.left, &copy.right));
        assert!(!Arc::ptr_eq(&copy.left, &shared));
    }

    #[test]
    fn distinct_allocations_stay_distinct() {
        let holder = Holder {
            left: Arc::new(vec!["a".to_string()]),
            right: Arc::new(vec!["a".to_string()]),
        };
        let copy = deep_copy(&holder);
        assert!(!Arc::ptr_eq(&copy.left, &copy.right));
    }

    #[test]
    fn rc_aliasing() {
        let shared = Rc::new(7u64);
        let pair = vec![Rc::clone(&shared), Rc::clone(&shared)];
        let copy = deep_copy(&pair);
        assert!(Rc::ptr_eq(&copy[0], &copy[1]));
        assert!(!Rc::ptr_eq(&copy[0], &shared));
        assert_eq!(Rc::strong_count(&shared), 3);
    }

    #[test]
    fn copies_json_values() {
        let value = json!({"a": [1, 2.5, null, {"b": true}], "c": "d"});
        assert_eq!(deep_copy(&value), value);
    }

    #[test]
    fn maps_are_copied() {
        let mut map = BTreeMap::new();
        map.insert("k".to_string(), vec![1i64, 2]);
        assert_eq!(deep_copy(&map), map);

        let mut hashed: HashMap<String, f32> = HashMap::new();
        hashed.insert("x".to_string(), 1.5);
        assert_eq!(deep_copy(&hashed), hashed);
    }
}
