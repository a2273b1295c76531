//! Dotted-path lookup over nested containers.
//!
//! A path such as `"a.items.0.id"` is split on `.`; each step descends into
//! a [`Node`] by key or into a [`Sequence`] by decimal index. Walking stops
//! quietly at the first step that does not resolve.

use std::fmt;
use std::iter::FusedIterator;
use std::marker::PhantomData;

use crate::convert::FromValue;
use crate::node::Node;
use crate::sequence::Sequence;
use crate::value::Value;

#[derive(Debug, Clone, Copy)]
pub(crate) enum Root<'a> {
    Node(&'a Node),
    Sequence(&'a Sequence),
}

impl<'a> Root<'a> {
    fn step(self, segment: &str) -> Option<&'a Value> {
        match self {
            Root::Node(node) => node.get_value(segment),
            Root::Sequence(seq) => seq.get_value(index(segment)?),
        }
    }
}

/// Digits only: `usize::from_str` alone would also take a leading `+`.
fn index(segment: &str) -> Option<usize> {
    if segment.is_empty() || !segment.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    segment.parse().ok()
}

fn resolve<'a>(root: Root<'a>, path: &str) -> Option<&'a Value> {
    let mut segments = path.split('.');
    let mut current = root.step(segments.next()?)?;
    for segment in segments {
        current = match current {
            Value::Node(node) => Root::Node(node).step(segment)?,
            Value::Sequence(seq) => Root::Sequence(seq).step(segment)?,
            _ => return None,
        };
    }
    Some(current)
}

/// Lazy result of [`Node::lookup`] and friends: zero or one item.
///
/// Nothing is resolved until the first call to `next`. Cloning an unstarted
/// lookup gives an independent one that walks the path again.
pub struct Lookup<'a, T> {
    root: Root<'a>,
    path: &'a str,
    convert: bool,
    done: bool,
    _target: PhantomData<fn() -> T>,
}

impl<'a, T> Lookup<'a, T> {
    pub(crate) fn new(root: Root<'a>, path: &'a str, convert: bool) -> Self {
        Self {
            root,
            path,
            convert,
            done: false,
            _target: PhantomData,
        }
    }

    pub fn path(&self) -> &'a str {
        self.path
    }
}

impl<T> Clone for Lookup<'_, T> {
    fn clone(&self) -> Self {
        Self {
            root: self.root,
            path: self.path,
            convert: self.convert,
            done: self.done,
            _target: PhantomData,
        }
    }
}

impl<T> fmt::Debug for Lookup<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Lookup")
            .field("path", &self.path)
            .field("convert", &self.convert)
            .field("done", &self.done)
            .finish()
    }
}

impl<T: FromValue> Iterator for Lookup<'_, T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        if self.done {
            return None;
        }
        self.done = true;
        let value = resolve(self.root, self.path)?;
        if self.convert {
            T::coerce(value).ok()
        } else {
            T::exact(value)
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(usize::from(!self.done)))
    }
}

impl<T: FromValue> FusedIterator for Lookup<'_, T> {}
