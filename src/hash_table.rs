use alloc::string::String;
use alloc::vec::Vec;
use core::fmt::Debug;
use core::hash::BuildHasher;
use core::hash::Hash;
use core::mem::MaybeUninit;

use crate::Error;
use crate::flags::FlagVec;
use crate::probe::Probe;

/// Smallest non-zero capacity of a table.
pub const MIN_CAPACITY: usize = 16;

/// Largest capacity of a table. Slot positions are derived from 32-bit
/// hashes, so larger tables could never be addressed.
pub const MAX_CAPACITY: usize = 1 << 31;

/// Fraction of slots that may be occupied (live or deleted) before an
/// insertion forces a rehash.
pub const LOAD_FACTOR: f64 = 0.77;

/// Automatic shrinking on removal is only considered once the table holds
/// more than this many live entries.
pub const SHRINK_THRESHOLD: usize = 4096;

#[inline(always)]
fn upper_bound_for(capacity: usize) -> usize {
    (capacity as f64 * LOAD_FACTOR + 0.5) as usize
}

fn slots_for(entries: usize) -> Result<usize, Error> {
    // The float cast saturates, so only the increment can overflow.
    ((entries as f64 / LOAD_FACTOR) as usize)
        .checked_add(1)
        .ok_or(Error::CapacityOverflow { requested: entries })
}

fn round_capacity(requested: usize) -> Result<usize, Error> {
    match requested.max(MIN_CAPACITY).checked_next_power_of_two() {
        Some(capacity) if capacity <= MAX_CAPACITY => Ok(capacity),
        _ => Err(Error::CapacityOverflow { requested }),
    }
}

/// Hashes `key` with `hash_builder` and folds the result to the 32 bits the
/// table probes with.
#[inline(always)]
pub(crate) fn make_hash<K: Hash + ?Sized, S: BuildHasher>(hash_builder: &S, key: &K) -> u32 {
    hash_builder.hash_one(key) as u32
}

/// How [`HashTable::insert`] resolved a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Insertion {
    /// The key took a slot that had never held an entry. Both the size and
    /// the occupied count grew.
    Fresh,
    /// The key took the slot of a deleted entry. Only the size grew.
    Reclaimed,
    /// The key was already live; nothing was written.
    Present,
}

/// Returned by the callback passed to [`HashTable::iterate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visit {
    /// Keep going.
    Continue,
    /// Remove the entry just visited, then keep going. The table never
    /// shrinks here, so slot indices stay valid for the rest of the walk.
    Remove,
    /// Stop the walk.
    Stop,
}

/// Occupancy and probe-length statistics.
#[cfg(any(test, feature = "stats"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableStats {
    /// Number of slots.
    pub capacity: usize,
    /// Number of live entries.
    pub size: usize,
    /// Number of live or deleted slots.
    pub occupied: usize,
    /// Number of deleted slots awaiting a rehash.
    pub tombstones: usize,
    /// Maximum occupied slots before an insertion rehashes.
    pub upper_bound: usize,
    /// Longest probe sequence any live entry needs to be found.
    pub longest_probe: usize,
    /// Sum of the probe lengths of all live entries.
    pub total_probe: usize,
}

/// An open-addressing hash table of plain-old-data entries.
///
/// `HashTable<K, V>` stores `(K, V)` pairs in a flat slot array and tracks
/// the state of every slot (empty, deleted, live) in a packed 2-bit flag
/// vector. Collisions are resolved by triangular probing, removals leave
/// tombstones, and an insertion that would push the number of occupied slots
/// past `capacity * 0.77` rehashes the table in place.
///
/// Like a raw table, every call takes the key's 32-bit hash and an equality
/// predicate; calls that may rehash also take a `hasher` that recomputes the
/// hash of a stored key. [`HashMap`](crate::HashMap) and
/// [`HashSet`](crate::HashSet) wrap this with a `BuildHasher`.
///
/// Both `K` and `V` must be `Copy`: the rehash relocates entries bytewise
/// and never runs per-entry drop logic.
///
/// Lookups return slot indices. An index is only valid until the next call
/// that may rehash; [`end`](Self::end) marks a miss.
///
/// # Example
///
/// ```rust
/// use pod_hash::hash_table::HashTable;
/// use pod_hash::hash_table::Insertion;
///
/// fn hash(key: &u32) -> u32 {
///     key.wrapping_mul(0x9e37_79b9)
/// }
///
/// let mut table: HashTable<u32, u16> = HashTable::new();
/// let (index, kind) = table
///     .insert(hash(&7), 7, 70, |k| *k == 7, hash)
///     .unwrap();
/// assert_eq!(kind, Insertion::Fresh);
/// assert_eq!(table.find(hash(&7), |k| *k == 7), index);
/// assert_eq!(table.value(index), Some(&70));
///
/// table.remove(index, true, hash);
/// assert_eq!(table.find(hash(&7), |k| *k == 7), table.end());
/// ```
#[derive(Clone)]
pub struct HashTable<K: Copy, V: Copy> {
    flags: FlagVec,
    slots: Vec<MaybeUninit<(K, V)>>,
    size: usize,
    occupied: usize,
    upper_bound: usize,
}

/// Tables larger than this are debug-printed without their slot map.
const DEBUG_SLOT_LIMIT: usize = 256;

impl<K: Copy, V: Copy> Debug for HashTable<K, V> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let mut out = f.debug_struct("HashTable");
        out.field("capacity", &self.capacity())
            .field("size", &self.size)
            .field("occupied", &self.occupied)
            .field("upper_bound", &self.upper_bound);
        if self.capacity() > DEBUG_SLOT_LIMIT {
            return out.finish_non_exhaustive();
        }

        let rows = (0..self.capacity())
            .step_by(16)
            .map(|row| {
                (row..row + 16)
                    .map(|i| {
                        if self.flags.is_live(i) {
                            'L'
                        } else if self.flags.is_deleted(i) {
                            'D'
                        } else {
                            '.'
                        }
                    })
                    .collect::<String>()
            })
            .collect::<Vec<_>>();

        out.field("flags", &rows).finish()
    }
}

impl<K: Copy, V: Copy> Default for HashTable<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Copy, V: Copy> HashTable<K, V> {
    /// Creates an empty table. Nothing is allocated until the first
    /// insertion.
    ///
    /// ```rust
    /// use pod_hash::hash_table::HashTable;
    ///
    /// let table: HashTable<u64, u8> = HashTable::new();
    /// assert_eq!(table.capacity(), 0);
    /// assert_eq!(table.begin(), table.end());
    /// ```
    pub const fn new() -> Self {
        Self {
            flags: FlagVec::new(),
            slots: Vec::new(),
            size: 0,
            occupied: 0,
            upper_bound: 0,
        }
    }

    /// Creates a table that holds at least `entries` entries before it
    /// rehashes.
    ///
    /// ```rust
    /// use pod_hash::hash_table::HashTable;
    ///
    /// let table: HashTable<u32, ()> = HashTable::try_with_capacity(100).unwrap();
    /// assert!(table.upper_bound() >= 100);
    /// assert_eq!(table.capacity(), 256);
    /// ```
    pub fn try_with_capacity(entries: usize) -> Result<Self, Error> {
        let mut table = Self::new();
        if entries > 0 {
            let capacity = round_capacity(slots_for(entries)?)?;
            table
                .slots
                .try_reserve_exact(capacity)
                .map_err(Error::alloc(capacity))?;
            table.flags = FlagVec::try_new(capacity)?;
            table.slots.resize(capacity, MaybeUninit::uninit());
            table.upper_bound = upper_bound_for(capacity);
        }
        Ok(table)
    }

    /// Number of slots.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Number of live entries.
    #[inline]
    pub fn len(&self) -> usize {
        self.size
    }

    /// Returns `true` if the table holds no live entries.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Number of slots that are live or deleted.
    #[inline]
    pub fn occupied(&self) -> usize {
        self.occupied
    }

    /// Maximum number of occupied slots at the current capacity.
    #[inline]
    pub fn upper_bound(&self) -> usize {
        self.upper_bound
    }

    /// First slot index; always 0.
    #[inline]
    pub fn begin(&self) -> usize {
        0
    }

    /// One past the last slot index. Lookups return it on a miss.
    #[inline]
    pub fn end(&self) -> usize {
        self.capacity()
    }

    /// Returns `true` if `index` names a live slot.
    #[inline]
    pub fn exists(&self, index: usize) -> bool {
        index < self.end() && self.flags.is_live(index)
    }

    /// Key stored at `index`, if the slot is live.
    pub fn key(&self, index: usize) -> Option<&K> {
        self.exists(index).then(|| &self.entry(index).0)
    }

    /// Value stored at `index`, if the slot is live.
    pub fn value(&self, index: usize) -> Option<&V> {
        self.exists(index).then(|| &self.entry(index).1)
    }

    /// Mutable value stored at `index`, if the slot is live.
    pub fn value_mut(&mut self, index: usize) -> Option<&mut V> {
        if !self.exists(index) {
            return None;
        }
        // SAFETY: `exists` confirmed the slot is live, and live slots are
        // always initialized.
        Some(unsafe { &mut self.slots[index].assume_init_mut().1 })
    }

    #[inline(always)]
    fn mask(&self) -> usize {
        self.capacity().wrapping_sub(1)
    }

    #[inline(always)]
    fn entry(&self, index: usize) -> &(K, V) {
        debug_assert!(self.flags.is_live(index));
        // SAFETY: a slot is written before it is marked live, and written
        // slots are never de-initialized. Callers only pass live indices.
        unsafe { self.slots[index].assume_init_ref() }
    }

    #[inline(always)]
    fn tombstone(&mut self, index: usize) {
        self.flags.mark_deleted(index);
        self.size -= 1;
    }

    /// Returns the index of the live entry whose key satisfies `eq`, or
    /// [`end`](Self::end) if there is none.
    ///
    /// Deleted slots are stepped over; the walk stops at the first empty
    /// slot or after a full lap.
    pub fn find(&self, hash: u32, eq: impl Fn(&K) -> bool) -> usize {
        if self.capacity() == 0 {
            return 0;
        }

        let mut probe = Probe::start(hash, self.mask());
        let start = probe.pos();
        loop {
            let index = probe.pos();
            if self.flags.is_empty(index) {
                return self.end();
            }
            if !self.flags.is_deleted(index) && eq(&self.entry(index).0) {
                return index;
            }

            probe.next();
            if probe.pos() == start {
                return self.end();
            }
        }
    }

    /// Inserts `(key, value)` unless a live entry already satisfies `eq`.
    ///
    /// If the occupied count has reached the upper bound the table is
    /// rehashed first: at the same capacity when tombstones make up more
    /// than half of it, otherwise at double the capacity.
    ///
    /// On [`Insertion::Present`] nothing is written and the returned index
    /// names the existing entry; the caller decides whether to update it.
    /// A new key is placed in the first deleted slot on its probe path when
    /// there is one, otherwise in the empty slot that ended the walk.
    pub fn insert(
        &mut self,
        hash: u32,
        key: K,
        value: V,
        eq: impl Fn(&K) -> bool,
        hasher: impl Fn(&K) -> u32,
    ) -> Result<(usize, Insertion), Error> {
        if self.occupied >= self.upper_bound {
            let capacity = self.capacity();
            if capacity > self.size << 1 {
                tracing::trace!(capacity, size = self.size, "purging tombstones");
                self.resize(capacity - 1, &hasher)?;
            } else {
                tracing::trace!(capacity, size = self.size, "growing table");
                self.resize(capacity + 1, &hasher)?;
            }
        }

        let mut probe = Probe::start(hash, self.mask());
        let start = probe.pos();
        let index = if self.flags.is_empty(start) {
            start
        } else {
            let mut site = None;
            loop {
                let index = probe.pos();
                if self.flags.is_empty(index) {
                    break site.unwrap_or(index);
                }
                if self.flags.is_deleted(index) {
                    site = site.or(Some(index));
                } else if eq(&self.entry(index).0) {
                    return Ok((index, Insertion::Present));
                }

                probe.next();
                if probe.pos() == start {
                    match site {
                        Some(site) => break site,
                        // occupied < upper_bound < capacity, so a lap always
                        // passes an empty or deleted slot.
                        None => unreachable!("probe lapped a table with no free slot"),
                    }
                }
            }
        };

        let kind = if self.flags.is_empty(index) {
            self.occupied += 1;
            Insertion::Fresh
        } else {
            Insertion::Reclaimed
        };
        self.slots[index] = MaybeUninit::new((key, value));
        self.flags.mark_live(index);
        self.size += 1;

        Ok((index, kind))
    }

    /// Removes the entry at `index`, returning it if the slot was live.
    ///
    /// The slot becomes a tombstone. With `shrink` set, a table holding more
    /// than [`SHRINK_THRESHOLD`] entries but under a quarter of its capacity
    /// is rehashed down to about `size / 0.77 * 1.5` slots, which
    /// invalidates outstanding indices. If that allocation fails the table
    /// keeps its current capacity.
    pub fn remove(
        &mut self,
        index: usize,
        shrink: bool,
        hasher: impl Fn(&K) -> u32,
    ) -> Option<(K, V)> {
        let removed = self.exists(index).then(|| *self.entry(index));
        if removed.is_some() {
            self.tombstone(index);
        }

        if shrink && self.size > SHRINK_THRESHOLD && self.size < self.capacity() >> 2 {
            let target = (self.size as f64 / LOAD_FACTOR * 1.5) as usize;
            if let Err(error) = self.resize(target, hasher) {
                tracing::warn!(
                    %error,
                    capacity = self.capacity(),
                    size = self.size,
                    "skipping shrink"
                );
            }
        }

        removed
    }

    /// Rehashes the table into `capacity` slots, rounded up to a power of
    /// two no smaller than [`MIN_CAPACITY`].
    ///
    /// Does nothing if the live entries would not fit under the new upper
    /// bound. Otherwise every tombstone is purged, so afterwards
    /// `occupied() == len()`. Outstanding indices are invalidated.
    ///
    /// Entries are migrated in place: each live slot, in index order, is
    /// lifted out and placed along its probe path in the new layout. When the
    /// chosen slot still holds an entry that has not been migrated yet, that
    /// entry is kicked out and placed next.
    pub fn resize(&mut self, capacity: usize, hasher: impl Fn(&K) -> u32) -> Result<(), Error> {
        let new_capacity = round_capacity(capacity)?;
        if self.size >= upper_bound_for(new_capacity) {
            return Ok(());
        }

        // Every allocation happens before the first entry moves, so a failure
        // leaves the table as it was.
        let old_capacity = self.capacity();
        let mut shrunk = Vec::new();
        if new_capacity > old_capacity {
            self.slots
                .try_reserve_exact(new_capacity - old_capacity)
                .map_err(Error::alloc(new_capacity))?;
        } else if new_capacity < old_capacity {
            shrunk
                .try_reserve_exact(new_capacity)
                .map_err(Error::alloc(new_capacity))?;
        }
        let mut new_flags = FlagVec::try_new(new_capacity)?;
        if new_capacity > old_capacity {
            self.slots.resize(new_capacity, MaybeUninit::uninit());
        }

        let new_mask = new_capacity - 1;
        for j in 0..old_capacity {
            if !self.flags.is_live(j) {
                continue;
            }

            let mut item = *self.entry(j);
            self.flags.mark_deleted(j);
            loop {
                let mut probe = Probe::start(hasher(&item.0), new_mask);
                while !new_flags.is_empty(probe.pos()) {
                    probe.next();
                }
                let i = probe.pos();
                new_flags.mark_live(i);

                if i < old_capacity && self.flags.is_live(i) {
                    let evicted = *self.entry(i);
                    self.slots[i] = MaybeUninit::new(item);
                    self.flags.mark_deleted(i);
                    item = evicted;
                } else {
                    self.slots[i] = MaybeUninit::new(item);
                    break;
                }
            }
        }

        if new_capacity < old_capacity {
            shrunk.extend_from_slice(&self.slots[..new_capacity]);
            self.slots = shrunk;
        }

        tracing::debug!(
            from = old_capacity,
            to = new_capacity,
            size = self.size,
            purged = self.occupied - self.size,
            "rehashed table"
        );

        self.flags = new_flags;
        self.occupied = self.size;
        self.upper_bound = upper_bound_for(new_capacity);
        Ok(())
    }

    /// Makes room for at least `additional` more entries without another
    /// rehash.
    pub fn reserve(&mut self, additional: usize, hasher: impl Fn(&K) -> u32) -> Result<(), Error> {
        let required = self.size.saturating_add(additional);
        if required <= self.upper_bound.saturating_sub(self.occupied - self.size) {
            return Ok(());
        }
        let capacity = slots_for(required)?.max(self.capacity());
        self.resize(capacity, hasher)
    }

    /// Rehashes into the smallest capacity that holds the live entries.
    pub fn shrink_to_fit(&mut self, hasher: impl Fn(&K) -> u32) -> Result<(), Error> {
        let capacity = round_capacity(slots_for(self.size)?)?;
        if capacity < self.capacity() {
            self.resize(capacity, hasher)?;
        }
        Ok(())
    }

    /// Marks every slot empty. The storage is kept.
    pub fn clear(&mut self) {
        self.flags.reset();
        self.size = 0;
        self.occupied = 0;
    }

    /// Visits every live slot in index order.
    ///
    /// The callback receives the slot index, the key, and the value, and
    /// decides whether to continue, remove the entry and continue, or stop.
    pub fn iterate(&mut self, mut f: impl FnMut(usize, &K, &mut V) -> Visit) {
        for index in self.begin()..self.end() {
            if !self.flags.is_live(index) {
                continue;
            }

            // SAFETY: the slot is live, so it is initialized.
            let (key, value) = unsafe { self.slots[index].assume_init_mut() };
            match f(index, &*key, value) {
                Visit::Continue => {}
                Visit::Remove => self.tombstone(index),
                Visit::Stop => break,
            }
        }
    }

    /// Returns an iterator over the live entries in slot order.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            table: self,
            index: 0,
        }
    }

    /// Collects occupancy and probe-length statistics.
    ///
    /// Only available with the `stats` feature.
    #[cfg(any(test, feature = "stats"))]
    pub fn stats(&self, hasher: impl Fn(&K) -> u32) -> TableStats {
        let mut longest_probe = 0;
        let mut total_probe = 0;
        for index in 0..self.capacity() {
            if !self.flags.is_live(index) {
                continue;
            }
            let mut probe = Probe::start(hasher(&self.entry(index).0), self.mask());
            while probe.pos() != index {
                probe.next();
            }
            longest_probe = longest_probe.max(probe.attempts());
            total_probe += probe.attempts();
        }

        TableStats {
            capacity: self.capacity(),
            size: self.size,
            occupied: self.occupied,
            tombstones: self.occupied - self.size,
            upper_bound: self.upper_bound,
            longest_probe,
            total_probe,
        }
    }
}

/// An iterator over the live entries of a [`HashTable`], in slot order.
pub struct Iter<'a, K: Copy, V: Copy> {
    table: &'a HashTable<K, V>,
    index: usize,
}

impl<'a, K: Copy, V: Copy> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        while self.index < self.table.capacity() {
            let index = self.index;
            self.index += 1;
            if self.table.flags.is_live(index) {
                let (key, value) = self.table.entry(index);
                return Some((key, value));
            }
        }
        None
    }
}
