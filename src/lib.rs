//! kv-fifo: a single-threaded FIFO of key-value pairs with ordered
//! per-key lookup, cheap copy-on-write clones, and a strong failure
//! guarantee on every mutation.
//!
//! Internal Design:
//!
//! Summary
//! - Goal: build `KvFifo` in small layers whose invariants can be checked
//!   independently.
//! - Layers:
//!   - Sequence<K, V>: doubly linked list stored in a `SlotMap`; entries
//!     are addressed by generational `Position`s that survive unrelated
//!     insertions and removals and can be relinked in O(1).
//!   - ValueBlock<K, V>: Sequence plus a `BTreeMap` index from key to the
//!     oldest-first list of that key's positions. Implements push, pop,
//!     pop by key and move-to-back.
//!   - MutationGuard: secures an exclusively owned block for one call,
//!     deep copying only when the block is shared, and publishes the
//!     result only on success.
//!   - KvFifo<K, V>: public handle, an `Rc<ValueBlock>` plus an `aliased`
//!     flag.
//!
//! Constraints
//! - Single-threaded: `!Send`/`!Sync` (no atomics).
//! - O(1) append and front removal; O(log n) per-key lookup in the number
//!   of distinct keys; O(log n + m) relocation of a key's m entries.
//! - Each distinct key is allocated once as an `Rc<K>` owned by the index;
//!   entries hold clones of that `Rc`. Keys are never mutated, so deep
//!   copies share key allocations and clone values only.
//!
//! Copy-on-write and aliasing
//! - `Clone` on a handle shares the block. Mutating calls go through
//!   `MutationGuard`, which detaches only when the block is shared.
//! - `front_mut`/`back_mut`/`first_mut`/`last_mut` mark the handle
//!   aliased. The next clone of an aliased handle takes a private copy, so
//!   storage that has had a `&mut V` handed out is never shared. A
//!   successful mutation (or `clear`) clears the flag.
//! - `&self` accessors neither detach nor alias; a shared borrow cannot be
//!   written through.
//!
//! Failure semantics
//! - Block operations validate before their first structural change.
//!   Combined with the guard staging a copy for shared blocks, a failed
//!   call leaves the handle and all its siblings unchanged. A panic in
//!   `V::clone` during a detach unwinds the partial copy without touching
//!   the handle. Every `K::cmp` a block operation makes happens before that
//!   first change, so a panicking comparator leaves the block as it was.
//! - Committing is O(1). The full structural walk
//!   (`ValueBlock::assert_consistent`) exists only in test builds, where the
//!   unit tests and the state-machine proptest call it after each step;
//!   the mutation paths carry cheap `debug_assert!`s on the touched entry.
//!
//! Notes and non-goals
//! - No sharing across threads, no serialization.
//! - Ordering is FIFO adjusted only by `move_to_back`.

mod error;
mod guard;
mod kv_fifo;
#[cfg(feature = "bench_internal")]
pub mod sequence;
#[cfg(not(feature = "bench_internal"))]
mod sequence;
#[cfg(feature = "bench_internal")]
pub mod value_block;
#[cfg(not(feature = "bench_internal"))]
mod value_block;
mod value_block_proptest;

// Public surface
pub use error::KvFifoError;
pub use kv_fifo::{Iter, Keys, KvFifo};
