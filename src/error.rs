use alloc::collections::TryReserveError;

/// Errors returned by operations that may allocate.
///
/// Lookups and duplicate insertions are not errors: they are reported through
/// `Option`, `bool`, or the [`end`](crate::HashTable::end) index.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// The requested capacity rounds up past
    /// [`MAX_CAPACITY`](crate::hash_table::MAX_CAPACITY).
    #[error("requested capacity {requested} exceeds the maximum table capacity")]
    CapacityOverflow {
        /// The capacity that was asked for.
        requested: usize,
    },
    /// The allocator could not provide storage for the table.
    #[error("failed to allocate storage for {slots} slots")]
    AllocFailed {
        /// Number of slots the failed allocation was sized for.
        slots: usize,
    },
}

impl Error {
    pub(crate) fn alloc(slots: usize) -> impl FnOnce(TryReserveError) -> Self {
        move |_| Error::AllocFailed { slots }
    }
}
