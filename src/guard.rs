//! MutationGuard: the single place that decides whether a handle detaches.
//!
//! `secure` stages a private deep copy when the block is shared, otherwise
//! the guard works on the live block. Nothing is published until `commit`
//! or `commit_aliased`; dropping an uncommitted guard discards the staged
//! copy and leaves the handle as it was. If `V::clone` panics while staging,
//! the partial copy unwinds away and the handle is likewise untouched.

use crate::kv_fifo::KvFifo;
use crate::value_block::ValueBlock;
use std::rc::Rc;

pub(crate) struct MutationGuard<'h, K, V> {
    handle: &'h mut KvFifo<K, V>,
    staged: Option<Rc<ValueBlock<K, V>>>,
}

impl<'h, K, V> MutationGuard<'h, K, V>
where
    K: Ord,
    V: Clone,
{
    pub(crate) fn secure(handle: &'h mut KvFifo<K, V>) -> Self {
        let staged = if Rc::strong_count(&handle.block) > 1 {
            Some(Rc::new(ValueBlock::clone(&handle.block)))
        } else {
            None
        };
        Self { handle, staged }
    }

    /// The exclusively owned block the operation runs against.
    pub(crate) fn block_mut(&mut self) -> &mut ValueBlock<K, V> {
        let target = match self.staged.as_mut() {
            Some(staged) => staged,
            None => &mut self.handle.block,
        };
        // Unique at this point, so this never clones.
        Rc::make_mut(target)
    }

    /// Publish after a successful mutation; the handle is no longer aliased.
    ///
    /// O(1): the block was already validated by the operation that ran
    /// against it, and nothing is checked once it is visible to the handle.
    pub(crate) fn commit(self) {
        let handle = self.publish();
        handle.aliased = false;
    }

    /// Publish for an accessor that hands out a mutable reference into the
    /// block; later clones of the handle must deep copy.
    pub(crate) fn commit_aliased(self) -> &'h mut ValueBlock<K, V> {
        let handle = self.publish();
        handle.aliased = true;
        Rc::make_mut(&mut handle.block)
    }

    fn publish(self) -> &'h mut KvFifo<K, V> {
        let Self { handle, staged } = self;
        if let Some(block) = staged {
            handle.block = block;
        }
        handle
    }
}
