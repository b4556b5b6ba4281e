//! Sequence: slot-map backed doubly linked list with stable positions.

use slotmap::{DefaultKey, SlotMap};
use std::rc::Rc;

/// Stable locator for one live entry. Survives unrelated insertions and
/// removals; a stale position never resolves to a newer entry.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct Position(DefaultKey);

impl Position {
    pub(crate) fn new(k: DefaultKey) -> Self {
        Position(k)
    }
    pub(crate) fn raw_position(&self) -> DefaultKey {
        self.0
    }
}

struct Node<K, V> {
    key: Rc<K>,
    value: V,
    prev: Option<DefaultKey>,
    next: Option<DefaultKey>,
}

// Keys are shared, never cloned; only `V: Clone` is needed.
impl<K, V: Clone> Clone for Node<K, V> {
    fn clone(&self) -> Self {
        Self {
            key: Rc::clone(&self.key),
            value: self.value.clone(),
            prev: self.prev,
            next: self.next,
        }
    }
}

pub struct Sequence<K, V> {
    slots: SlotMap<DefaultKey, Node<K, V>>,
    head: Option<DefaultKey>,
    tail: Option<DefaultKey>,
}

impl<K, V: Clone> Clone for Sequence<K, V> {
    fn clone(&self) -> Self {
        // SlotMap::clone preserves keys, so positions recorded elsewhere stay valid.
        Self {
            slots: self.slots.clone(),
            head: self.head,
            tail: self.tail,
        }
    }
}

impl<K, V> Default for Sequence<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> Sequence<K, V> {
    pub fn new() -> Self {
        Self {
            slots: SlotMap::with_key(),
            head: None,
            tail: None,
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn front(&self) -> Option<Position> {
        self.head.map(Position::new)
    }
    pub fn back(&self) -> Option<Position> {
        self.tail.map(Position::new)
    }

    pub fn contains(&self, position: Position) -> bool {
        self.slots.contains_key(position.raw_position())
    }

    /// Append an entry at the back and return its position.
    pub fn push_back(&mut self, key: Rc<K>, value: V) -> Position {
        let prev = self.tail;
        let k = self.slots.insert(Node {
            key,
            value,
            prev,
            next: None,
        });
        self.link_after(prev, k);
        Position::new(k)
    }

    /// Unlink and return the entry at `position`.
    pub fn remove(&mut self, position: Position) -> Option<(Rc<K>, V)> {
        if !self.contains(position) {
            return None;
        }
        let k = position.raw_position();
        self.unlink(k);
        let node = self.slots.remove(k)?;
        Some((node.key, node.value))
    }

    /// Relink the entry at `position` as the new back. Returns false for a
    /// stale position.
    pub fn move_to_back(&mut self, position: Position) -> bool {
        if !self.contains(position) {
            return false;
        }
        let k = position.raw_position();
        if self.tail == Some(k) {
            return true;
        }
        self.unlink(k);
        let prev = self.tail;
        let node = &mut self.slots[k];
        node.prev = prev;
        node.next = None;
        self.link_after(prev, k);
        true
    }

    pub fn get(&self, position: Position) -> Option<(&K, &V)> {
        self.slots
            .get(position.raw_position())
            .map(|n| (&*n.key, &n.value))
    }

    pub fn get_mut(&mut self, position: Position) -> Option<(&K, &mut V)> {
        self.slots
            .get_mut(position.raw_position())
            .map(|n| (&*n.key, &mut n.value))
    }

    pub(crate) fn shared_key(&self, position: Position) -> Option<&Rc<K>> {
        self.slots.get(position.raw_position()).map(|n| &n.key)
    }

    #[cfg(test)]
    pub(crate) fn positions(&self) -> impl Iterator<Item = Position> + '_ {
        core::iter::successors(self.head, move |&k| self.slots.get(k).and_then(|n| n.next))
            .map(Position::new)
    }

    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            slots: &self.slots,
            next: self.head,
            remaining: self.slots.len(),
        }
    }

    // `k` must already be detached (or freshly inserted) with `prev` set.
    fn link_after(&mut self, prev: Option<DefaultKey>, k: DefaultKey) {
        match prev {
            Some(p) => self.slots[p].next = Some(k),
            None => self.head = Some(k),
        }
        self.tail = Some(k);
    }

    fn unlink(&mut self, k: DefaultKey) {
        let (prev, next) = {
            let n = &self.slots[k];
            (n.prev, n.next)
        };
        match prev {
            Some(p) => self.slots[p].next = next,
            None => self.head = next,
        }
        match next {
            Some(n) => self.slots[n].prev = prev,
            None => self.tail = prev,
        }
    }
}

/// Front-to-back iterator over entries.
pub struct Iter<'a, K, V> {
    slots: &'a SlotMap<DefaultKey, Node<K, V>>,
    next: Option<DefaultKey>,
    remaining: usize,
}

impl<'a, K, V> Clone for Iter<'a, K, V> {
    fn clone(&self) -> Self {
        Self {
            slots: self.slots,
            next: self.next,
            remaining: self.remaining,
        }
    }
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);
    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        let k = self.next?;
        let node = self.slots.get(k)?;
        self.next = node.next;
        self.remaining -= 1;
        Some((&*node.key, &node.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a, K, V> ExactSizeIterator for Iter<'a, K, V> {}

impl<'a, K, V> core::iter::FusedIterator for Iter<'a, K, V> {}
