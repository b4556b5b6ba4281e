//! KvFifo: the public copy-on-write handle.

use crate::error::KvFifoError;
use crate::guard::MutationGuard;
use crate::sequence;
use crate::value_block::{self, ValueBlock};
use core::fmt;
use std::rc::Rc;

/// A FIFO of `(key, value)` pairs with ordered per-key lookup.
///
/// Cloning is O(1): clones share storage until one of them is mutated.
/// Accessors that hand out `&mut V` mark the handle as aliased, and the
/// next clone of an aliased handle takes a private copy instead of sharing.
///
/// ```
/// use kv_fifo::KvFifo;
///
/// let mut q = KvFifo::new();
/// q.push(1, "a").unwrap();
/// q.push(2, "b").unwrap();
/// q.push(1, "c").unwrap();
/// assert_eq!(q.front(), Ok((&1, &"a")));
/// assert_eq!(q.last(&1), Ok((&1, &"c")));
///
/// q.move_to_back(&1).unwrap();
/// let order: Vec<_> = q.iter().map(|(_, v)| *v).collect();
/// assert_eq!(order, ["b", "a", "c"]);
/// ```
pub struct KvFifo<K, V> {
    pub(crate) block: Rc<ValueBlock<K, V>>,
    pub(crate) aliased: bool,
}

impl<K: Ord, V> KvFifo<K, V> {
    pub fn new() -> Self {
        Self {
            block: Rc::new(ValueBlock::new()),
            aliased: false,
        }
    }

    pub fn len(&self) -> usize {
        self.block.len()
    }
    pub fn is_empty(&self) -> bool {
        self.block.is_empty()
    }

    /// Number of live entries for `key`; 0 when absent.
    pub fn count(&self, key: &K) -> usize {
        self.block.count(key)
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.block.contains_key(key)
    }

    /// Drop this handle's reference to its storage and start over empty.
    /// Handles that shared the old storage keep it.
    pub fn clear(&mut self) {
        self.block = Rc::new(ValueBlock::new());
        self.aliased = false;
    }

    pub fn front(&self) -> Result<(&K, &V), KvFifoError> {
        let position = self.block.front()?;
        self.block.get(position).ok_or(KvFifoError::EmptyCollection)
    }

    pub fn back(&self) -> Result<(&K, &V), KvFifoError> {
        let position = self.block.back()?;
        self.block.get(position).ok_or(KvFifoError::EmptyCollection)
    }

    /// Oldest surviving entry for `key`.
    pub fn first(&self, key: &K) -> Result<(&K, &V), KvFifoError> {
        let position = self.block.first(key)?;
        self.block.get(position).ok_or(KvFifoError::KeyNotFound)
    }

    /// Newest surviving entry for `key`.
    pub fn last(&self, key: &K) -> Result<(&K, &V), KvFifoError> {
        let position = self.block.last(key)?;
        self.block.get(position).ok_or(KvFifoError::KeyNotFound)
    }

    /// Entries front to back.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            inner: self.block.iter(),
        }
    }

    /// Distinct keys in ascending order.
    pub fn keys(&self) -> Keys<'_, K> {
        Keys {
            inner: self.block.keys(),
        }
    }

    /// True when both handles currently read the same storage.
    pub fn shares_storage_with(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.block, &other.block)
    }
}

// Mutators report `EmptyCollection`/`KeyNotFound` from the current block
// before securing the guard, so a failing call never copies a shared block.
impl<K: Ord, V: Clone> KvFifo<K, V> {
    /// Append `(key, value)` at the back.
    pub fn push(&mut self, key: K, value: V) -> Result<(), KvFifoError> {
        let mut guard = MutationGuard::secure(self);
        guard.block_mut().push(key, value)?;
        guard.commit();
        Ok(())
    }

    /// Remove the oldest entry and return its value.
    pub fn pop(&mut self) -> Result<V, KvFifoError> {
        if self.is_empty() {
            return Err(KvFifoError::EmptyCollection);
        }
        let mut guard = MutationGuard::secure(self);
        let value = guard.block_mut().pop_front()?;
        guard.commit();
        Ok(value)
    }

    /// Remove the oldest entry for `key` and return its value.
    pub fn pop_key(&mut self, key: &K) -> Result<V, KvFifoError> {
        self.block.first(key)?;
        let mut guard = MutationGuard::secure(self);
        let value = guard.block_mut().pop_key(key)?;
        guard.commit();
        Ok(value)
    }

    /// Move every entry for `key` to the back, keeping their relative order.
    pub fn move_to_back(&mut self, key: &K) -> Result<(), KvFifoError> {
        self.block.first(key)?;
        let mut guard = MutationGuard::secure(self);
        guard.block_mut().move_to_back(key)?;
        guard.commit();
        Ok(())
    }

    pub fn front_mut(&mut self) -> Result<(&K, &mut V), KvFifoError> {
        self.block.front()?;
        let mut guard = MutationGuard::secure(self);
        let position = guard.block_mut().front()?;
        guard
            .commit_aliased()
            .get_mut(position)
            .ok_or(KvFifoError::EmptyCollection)
    }

    pub fn back_mut(&mut self) -> Result<(&K, &mut V), KvFifoError> {
        self.block.back()?;
        let mut guard = MutationGuard::secure(self);
        let position = guard.block_mut().back()?;
        guard
            .commit_aliased()
            .get_mut(position)
            .ok_or(KvFifoError::EmptyCollection)
    }

    pub fn first_mut(&mut self, key: &K) -> Result<(&K, &mut V), KvFifoError> {
        self.block.first(key)?;
        let mut guard = MutationGuard::secure(self);
        let position = guard.block_mut().first(key)?;
        guard
            .commit_aliased()
            .get_mut(position)
            .ok_or(KvFifoError::KeyNotFound)
    }

    pub fn last_mut(&mut self, key: &K) -> Result<(&K, &mut V), KvFifoError> {
        self.block.last(key)?;
        let mut guard = MutationGuard::secure(self);
        let position = guard.block_mut().last(key)?;
        guard
            .commit_aliased()
            .get_mut(position)
            .ok_or(KvFifoError::KeyNotFound)
    }
}

impl<K: Ord, V> Default for KvFifo<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V: Clone> Clone for KvFifo<K, V> {
    fn clone(&self) -> Self {
        if self.aliased {
            // A `&mut V` was handed out; the copy must not share that storage.
            Self {
                block: Rc::new(ValueBlock::clone(&self.block)),
                aliased: false,
            }
        } else {
            Self {
                block: Rc::clone(&self.block),
                aliased: false,
            }
        }
    }
}

impl<K, V> fmt::Debug for KvFifo<K, V>
where
    K: Ord + fmt::Debug,
    V: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<'a, K: Ord, V> IntoIterator for &'a KvFifo<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Front-to-back iterator over a `KvFifo`.
pub struct Iter<'a, K, V> {
    inner: sequence::Iter<'a, K, V>,
}

impl<'a, K, V> Clone for Iter<'a, K, V> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);
    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<'a, K, V> ExactSizeIterator for Iter<'a, K, V> {}

impl<'a, K, V> core::iter::FusedIterator for Iter<'a, K, V> {}

/// Ascending iterator over the distinct keys of a `KvFifo`. Borrows the
/// handle, so it cannot outlive the next mutation.
pub struct Keys<'a, K> {
    inner: value_block::Keys<'a, K>,
}

impl<'a, K> Clone for Keys<'a, K> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<'a, K> Iterator for Keys<'a, K> {
    type Item = &'a K;
    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|k| &**k)
    }
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<'a, K> DoubleEndedIterator for Keys<'a, K> {
    #[inline]
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back().map(|k| &**k)
    }
}

impl<'a, K> ExactSizeIterator for Keys<'a, K> {}

impl<'a, K> core::iter::FusedIterator for Keys<'a, K> {}
