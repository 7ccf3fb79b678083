//! Slab storage with stale-checked handles for bodies and interactions
//!
//! Each value is stored in a `Slab` next to the insertion counter it was
//! given. A handle carries both the slab index and that counter, so a handle
//! taken before a removal stops resolving instead of pointing at whatever
//! value reuses the slot later.

use std::fmt;
use std::marker::PhantomData;

use slab::Slab;

/// Stable handle into an [`Arena`]
pub struct Handle<T> {
    idx: usize,
    ctr: u64,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Handle<T> {
    fn new(idx: usize, ctr: u64) -> Self {
        Self { idx, ctr, _marker: PhantomData }
    }

    /// Slot index, useful as a stable label in logs
    pub fn index(&self) -> usize {
        self.idx
    }
}

// manual impls so `T` doesn't need to be Copy/Eq itself
impl<T> Clone for Handle<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Handle<T> {}

impl<T> PartialEq for Handle<T> {
    fn eq(&self, other: &Self) -> bool {
        self.idx == other.idx && self.ctr == other.ctr
    }
}

impl<T> Eq for Handle<T> {}

impl<T> std::hash::Hash for Handle<T> {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.idx.hash(state);
        self.ctr.hash(state);
    }
}

impl<T> fmt::Debug for Handle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}v{}", self.idx, self.ctr)
    }
}

impl<T> fmt::Display for Handle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.idx)
    }
}

/// Slab of values, each tagged with the counter its handle carries
pub struct Arena<T> {
    slab: Slab<(T, u64)>,
    ctr: u64,
}

impl<T> Default for Arena<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Arena<T> {
    pub fn new() -> Self {
        Self { slab: Slab::new(), ctr: 0 }
    }

    pub fn len(&self) -> usize {
        self.slab.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slab.is_empty()
    }

    /// Store a value and return its handle, reusing a freed slot if any
    pub fn insert(&mut self, value: T) -> Handle<T> {
        let ctr = self.ctr;
        let idx = self.slab.insert((value, ctr));
        self.ctr = self.ctr.wrapping_add(1);
        Handle::new(idx, ctr)
    }

    /// Remove a value; the handle (and all copies of it) stop resolving
    pub fn remove(&mut self, handle: Handle<T>) -> Option<T> {
        if !self.contains(handle) {
            return None;
        }
        let (value, _) = self.slab.remove(handle.idx);
        Some(value)
    }

    pub fn contains(&self, handle: Handle<T>) -> bool {
        self.get(handle).is_some()
    }

    pub fn get(&self, handle: Handle<T>) -> Option<&T> {
        match self.slab.get(handle.idx) {
            Some((value, ctr)) if *ctr == handle.ctr => Some(value),
            _ => None,
        }
    }

    pub fn get_mut(&mut self, handle: Handle<T>) -> Option<&mut T> {
        match self.slab.get_mut(handle.idx) {
            Some((value, ctr)) if *ctr == handle.ctr => Some(value),
            _ => None,
        }
    }

    /// Mutable access to two distinct values at once
    ///
    /// Returns `None` if either handle is stale or both name the same slot.
    pub fn pair_mut(&mut self, a: Handle<T>, b: Handle<T>) -> Option<(&mut T, &mut T)> {
        // get2_mut panics on equal keys
        if a.idx == b.idx {
            return None;
        }
        let ((va, ca), (vb, cb)) = self.slab.get2_mut(a.idx, b.idx)?;
        if *ca != a.ctr || *cb != b.ctr {
            return None;
        }
        Some((va, vb))
    }

    /// Live values in slot order
    pub fn iter(&self) -> impl Iterator<Item = (Handle<T>, &T)> {
        self.slab
            .iter()
            .map(|(idx, (value, ctr))| (Handle::new(idx, *ctr), value))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (Handle<T>, &mut T)> {
        self.slab
            .iter_mut()
            .map(|(idx, (value, ctr))| (Handle::new(idx, *ctr), value))
    }

    pub fn values(&self) -> impl Iterator<Item = &T> {
        self.slab.iter().map(|(_, (value, _))| value)
    }

    pub fn values_mut(&mut self) -> impl Iterator<Item = &mut T> {
        self.slab.iter_mut().map(|(_, (value, _))| value)
    }

    /// Drop every value for which `keep` returns false
    pub fn retain(&mut self, mut keep: impl FnMut(Handle<T>, &T) -> bool) {
        self.slab
            .retain(|idx, (value, ctr)| keep(Handle::new(idx, *ctr), value));
    }
}
