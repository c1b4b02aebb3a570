#![warn(missing_docs)]
#![doc = include_str!("../README.md")]
#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

mod error;
mod flags;
mod probe;

/// A map of `Copy` keys and values with an index-based API.
///
/// This module provides a `HashMap` that wraps the `HashTable` and hashes keys
/// with a configurable `BuildHasher`.
pub mod hash_map;

/// The table engine behind the map and set, for callers that hash keys
/// themselves.
pub mod hash_table;

/// A set of `Copy` keys with an index-based API.
pub mod hash_set;

cfg_if::cfg_if! {
    if #[cfg(feature = "foldhash")] {
        /// Hasher builder used when none is named: `foldhash`'s randomly
        /// seeded fast hasher.
        pub type DefaultHashBuilder = foldhash::fast::RandomState;
    } else if #[cfg(feature = "std")] {
        /// Hasher builder used when none is named: the standard library's
        /// randomly seeded SipHash.
        pub type DefaultHashBuilder = std::collections::hash_map::RandomState;
    } else {
        /// Hasher builder used when none is named: SipHash-1-3 with fixed
        /// keys. Name a seeded builder for inputs chosen by an adversary.
        pub type DefaultHashBuilder =
            core::hash::BuildHasherDefault<siphasher::sip::SipHasher13>;
    }
}

pub use error::Error;
pub use hash_map::HashMap;
pub use hash_map::Swap;
pub use hash_set::HashSet;
pub use hash_table::HashTable;
pub use hash_table::Insertion;
pub use hash_table::Visit;
#[cfg(feature = "stats")]
pub use hash_table::TableStats;
