//! ValueBlock: the FIFO sequence plus its ordered key index.
//!
//! Every method assumes the caller holds the block exclusively; the handle
//! layer arranges that through `MutationGuard`. Each fallible operation
//! validates its input before the first structural change, so an `Err`
//! return leaves the block untouched.

use crate::error::KvFifoError;
use crate::sequence::{Iter, Position, Sequence};
use std::collections::btree_map::{self, BTreeMap};
use std::collections::VecDeque;
use std::rc::Rc;

pub struct ValueBlock<K, V> {
    sequence: Sequence<K, V>,
    // Owns the canonical key; entries hold clones of the same `Rc`.
    index: BTreeMap<Rc<K>, VecDeque<Position>>,
}

impl<K, V: Clone> Clone for ValueBlock<K, V> {
    fn clone(&self) -> Self {
        Self {
            sequence: self.sequence.clone(),
            index: self.index.clone(),
        }
    }
}

impl<K: Ord, V> Default for ValueBlock<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

pub type Keys<'a, K> = btree_map::Keys<'a, Rc<K>, VecDeque<Position>>;

impl<K: Ord, V> ValueBlock<K, V> {
    pub fn new() -> Self {
        Self {
            sequence: Sequence::new(),
            index: BTreeMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.sequence.len()
    }
    pub fn is_empty(&self) -> bool {
        self.sequence.is_empty()
    }

    pub fn count(&self, key: &K) -> usize {
        self.index.get(key).map_or(0, VecDeque::len)
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.index.contains_key(key)
    }

    /// Append `(key, value)` at the back.
    ///
    /// Every key comparison and the reservation for the new position happen
    /// before the sequence is touched, so a panicking `K::cmp` or an
    /// allocation failure leaves the block unchanged.
    pub fn push(&mut self, key: K, value: V) -> Result<(), KvFifoError> {
        match self.index.entry(Rc::new(key)) {
            btree_map::Entry::Occupied(mut slot) => {
                slot.get_mut().try_reserve(1)?;
                let shared = Rc::clone(slot.key());
                let position = self.sequence.push_back(shared, value);
                slot.get_mut().push_back(position);
            }
            btree_map::Entry::Vacant(slot) => {
                let mut positions = VecDeque::new();
                positions.try_reserve(1)?;
                let shared = Rc::clone(slot.key());
                positions.push_back(self.sequence.push_back(shared, value));
                // No comparisons: the slot was located above.
                slot.insert(positions);
            }
        }
        Ok(())
    }

    /// Remove the oldest entry and return its value.
    pub fn pop_front(&mut self) -> Result<V, KvFifoError> {
        let position = self.sequence.front().ok_or(KvFifoError::EmptyCollection)?;
        self.remove_oldest(position).ok_or(KvFifoError::EmptyCollection)
    }

    /// Remove the oldest entry recorded for `key` and return its value.
    pub fn pop_key(&mut self, key: &K) -> Result<V, KvFifoError> {
        let position = self.first(key)?;
        self.remove_oldest(position).ok_or(KvFifoError::KeyNotFound)
    }

    /// Relocate every entry for `key` to the back, oldest first. Other
    /// entries keep their relative order; positions stay valid.
    pub fn move_to_back(&mut self, key: &K) -> Result<(), KvFifoError> {
        let positions = self.index.get(key).ok_or(KvFifoError::KeyNotFound)?;
        for &position in positions {
            let moved = self.sequence.move_to_back(position);
            debug_assert!(moved, "indexed position must be live");
        }
        Ok(())
    }

    pub fn front(&self) -> Result<Position, KvFifoError> {
        self.sequence.front().ok_or(KvFifoError::EmptyCollection)
    }
    pub fn back(&self) -> Result<Position, KvFifoError> {
        self.sequence.back().ok_or(KvFifoError::EmptyCollection)
    }

    pub fn first(&self, key: &K) -> Result<Position, KvFifoError> {
        self.index
            .get(key)
            .and_then(|positions| positions.front().copied())
            .ok_or(KvFifoError::KeyNotFound)
    }
    pub fn last(&self, key: &K) -> Result<Position, KvFifoError> {
        self.index
            .get(key)
            .and_then(|positions| positions.back().copied())
            .ok_or(KvFifoError::KeyNotFound)
    }

    pub fn get(&self, position: Position) -> Option<(&K, &V)> {
        self.sequence.get(position)
    }
    pub fn get_mut(&mut self, position: Position) -> Option<(&K, &mut V)> {
        self.sequence.get_mut(position)
    }

    pub fn iter(&self) -> Iter<'_, K, V> {
        self.sequence.iter()
    }

    pub fn keys(&self) -> Keys<'_, K> {
        self.index.keys()
    }

    // `position` must be the oldest entry for its key, which holds for the
    // sequence front and for the front of any key's list. The index slot is
    // located before anything is unlinked.
    fn remove_oldest(&mut self, position: Position) -> Option<V> {
        let key = Rc::clone(self.sequence.shared_key(position)?);
        let btree_map::Entry::Occupied(mut slot) = self.index.entry(key) else {
            return None;
        };
        let (_, value) = self.sequence.remove(position)?;
        let oldest = slot.get_mut().pop_front();
        debug_assert_eq!(oldest, Some(position), "position list out of order");
        if slot.get().is_empty() {
            slot.remove();
        }
        Some(value)
    }

    /// Full structural check for tests: every entry is indexed exactly once
    /// under the canonical key, per-key lists follow sequence order, and no
    /// list is empty. Walks the whole block.
    #[cfg(test)]
    pub(crate) fn assert_consistent(&self) {
        let mut recorded = 0;
        for (key, positions) in &self.index {
            assert!(!positions.is_empty(), "empty position list left in index");
            recorded += positions.len();
            for &position in positions {
                let stored = self
                    .sequence
                    .shared_key(position)
                    .expect("indexed position must be live");
                assert!(Rc::ptr_eq(stored, key), "entry does not share the canonical key");
            }
        }
        assert_eq!(recorded, self.sequence.len(), "recorded positions != entries");

        let mut nth: BTreeMap<&K, usize> = BTreeMap::new();
        for position in self.sequence.positions() {
            let key = self
                .sequence
                .shared_key(position)
                .expect("walked position must be live");
            let i = nth.entry(&**key).or_insert(0);
            let expected = self.index.get(&**key).and_then(|l| l.get(*i));
            assert_eq!(expected, Some(&position), "position list out of sequence order");
            *i += 1;
        }
    }
}
