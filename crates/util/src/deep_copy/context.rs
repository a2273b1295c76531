use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::rc::Rc;
use std::sync::Arc;

use super::DeepCopy;

/// Bookkeeping for one deep-copy pass.
///
/// Every `Arc`/`Rc` met during the walk is recorded by address together with
/// its copy. Meeting the same allocation again returns the recorded copy, so
/// a graph in which two owners share one child is copied into a graph in
/// which two owners share one (new) child.
///
/// The context does not detect cycles: a value that reaches itself through
/// its own children recurses without bound.
#[derive(Default)]
pub struct CopyContext {
    visited: HashMap<(usize, TypeId), Box<dyn Any>>,
}

impl CopyContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of shared allocations copied so far.
    pub fn len(&self) -> usize {
        self.visited.len()
    }

    pub fn is_empty(&self) -> bool {
        self.visited.is_empty()
    }

    /// Copy the value behind `original`, reusing the copy if this allocation
    /// was already visited in this pass.
    pub fn copy_arc<T>(&mut self, original: &Arc<T>) -> Arc<T>
    where
        T: DeepCopy + 'static,
    {
        let key = (Arc::as_ptr(original) as *const () as usize, TypeId::of::<Arc<T>>());
        if let Some(copy) = self.visited.get(&key).and_then(|c| c.downcast_ref::<Arc<T>>()) {
            return Arc::clone(copy);
        }
        let copy = Arc::new(T::deep_copy_in(original, self));
        self.visited.insert(key, Box::new(Arc::clone(&copy)));
        copy
    }

    /// `Rc` counterpart of [`CopyContext::copy_arc`].
    pub fn copy_rc<T>(&mut self, original: &Rc<T>) -> Rc<T>
    where
        T: DeepCopy + 'static,
    {
        let key = (Rc::as_ptr(original) as *const () as usize, TypeId::of::<Rc<T>>());
        if let Some(copy) = self.visited.get(&key).and_then(|c| c.downcast_ref::<Rc<T>>()) {
            return Rc::clone(copy);
        }
        let copy = Rc::new(T::deep_copy_in(original, self));
        self.visited.insert(key, Box::new(Rc::clone(&copy)));
        copy
    }
}

impl std::fmt::Debug for CopyContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CopyContext")
            .field("visited", &self.visited.len())
            .finish()
    }
}
