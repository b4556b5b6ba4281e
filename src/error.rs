//! Error taxonomy shared by every layer.

use std::collections::TryReserveError;
use thiserror::Error;

/// Failure of a `KvFifo` operation. A failed call leaves the collection
/// (and every handle sharing its storage) exactly as it was.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum KvFifoError {
    /// `front`/`back`/`pop` on a collection with no entries.
    #[error("collection is empty")]
    EmptyCollection,
    /// Key lookup (`first`/`last`/`pop_key`/`move_to_back`) for an absent key.
    #[error("key not found")]
    KeyNotFound,
    /// Reserving index storage failed during `push`.
    #[error("allocation failed: {0}")]
    AllocationFailure(#[from] TryReserveError),
}
