use core::fmt::Debug;
use core::hash::BuildHasher;
use core::hash::Hash;

use crate::DefaultHashBuilder;
use crate::Error;
use crate::hash_table::HashTable;
use crate::hash_table::Insertion;
use crate::hash_table::Iter as TableIter;
use crate::hash_table::Visit;
use crate::hash_table::make_hash;

/// A hash set of plain-old-data keys backed by [`HashTable`].
///
/// `HashSet<T, S>` is a [`HashTable`] with a unit value: the same probing,
/// tombstones, and resize policy, without per-entry value storage. Slot
/// indices are exposed the same way as on [`HashMap`](crate::HashMap).
///
/// ```rust
/// use pod_hash::HashSet;
///
/// let mut seen: HashSet<u64> = HashSet::new();
/// assert!(seen.add(42).unwrap());
/// assert!(!seen.add(42).unwrap());
/// assert!(seen.contains(&42));
/// assert!(seen.remove(&42));
/// assert!(seen.is_empty());
/// ```
#[derive(Clone)]
pub struct HashSet<T: Copy, S = DefaultHashBuilder> {
    table: HashTable<T, ()>,
    hash_builder: S,
}

impl<T, S> PartialEq for HashSet<T, S>
where
    T: Copy + Hash + Eq,
    S: BuildHasher,
{
    fn eq(&self, other: &Self) -> bool {
        if self.len() != other.len() {
            return false;
        }
        self.iter().all(|v| other.contains(v))
    }
}

impl<T, S> Eq for HashSet<T, S>
where
    T: Copy + Hash + Eq,
    S: BuildHasher,
{
}

impl<T, S> Debug for HashSet<T, S>
where
    T: Copy + Debug,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_set().entries(self.table.iter().map(|(k, _)| k)).finish()
    }
}

impl<T, S> HashSet<T, S>
where
    T: Copy + Hash + Eq,
    S: BuildHasher,
{
    /// Creates an empty set that hashes with `hash_builder`.
    pub fn with_hasher(hash_builder: S) -> Self {
        Self {
            table: HashTable::new(),
            hash_builder,
        }
    }

    /// Creates a set that holds at least `capacity` keys before it rehashes.
    pub fn try_with_capacity_and_hasher(capacity: usize, hash_builder: S) -> Result<Self, Error> {
        Ok(Self {
            table: HashTable::try_with_capacity(capacity)?,
            hash_builder,
        })
    }

    /// Returns a reference to the set's hasher builder.
    pub fn hasher(&self) -> &S {
        &self.hash_builder
    }

    /// Number of keys in the set.
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Returns `true` if the set holds no keys.
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Number of slots.
    pub fn capacity(&self) -> usize {
        self.table.capacity()
    }

    /// Number of live or deleted slots.
    pub fn occupied(&self) -> usize {
        self.table.occupied()
    }

    /// Maximum number of occupied slots at the current capacity.
    pub fn upper_bound(&self) -> usize {
        self.table.upper_bound()
    }

    /// First slot index.
    pub fn begin(&self) -> usize {
        self.table.begin()
    }

    /// One past the last slot index.
    pub fn end(&self) -> usize {
        self.table.end()
    }

    /// Removes every key, keeping the allocation.
    pub fn clear(&mut self) {
        self.table.clear();
    }

    /// Rehashes into at least `capacity` slots.
    pub fn resize(&mut self, capacity: usize) -> Result<(), Error> {
        let hash_builder = &self.hash_builder;
        self.table.resize(capacity, |k| make_hash(hash_builder, k))
    }

    /// Makes room for at least `additional` more keys.
    pub fn reserve(&mut self, additional: usize) -> Result<(), Error> {
        let hash_builder = &self.hash_builder;
        self.table.reserve(additional, |k| make_hash(hash_builder, k))
    }

    /// Rehashes into the smallest capacity that holds the current keys.
    pub fn shrink_to_fit(&mut self) -> Result<(), Error> {
        let hash_builder = &self.hash_builder;
        self.table.shrink_to_fit(|k| make_hash(hash_builder, k))
    }

    /// Returns the slot index of `key`, or [`end`](Self::end).
    pub fn find(&self, key: &T) -> usize {
        let hash = make_hash(&self.hash_builder, key);
        self.table.find(hash, |k| k == key)
    }

    /// Returns `true` if the set contains `key`.
    pub fn contains(&self, key: &T) -> bool {
        self.find(key) != self.end()
    }

    /// Adds `key`, returning `Ok(false)` if it was already present.
    pub fn add(&mut self, key: T) -> Result<bool, Error> {
        let (_, kind) = self.put_index(key)?;
        Ok(kind != Insertion::Present)
    }

    /// Claims a slot for `key` and reports how it was resolved.
    pub fn put_index(&mut self, key: T) -> Result<(usize, Insertion), Error> {
        let hash = make_hash(&self.hash_builder, &key);
        let hash_builder = &self.hash_builder;
        self.table.insert(
            hash,
            key,
            (),
            |k| *k == key,
            |k| make_hash(hash_builder, k),
        )
    }

    /// Removes `key`. May shrink a sparse table.
    pub fn remove(&mut self, key: &T) -> bool {
        let index = self.find(key);
        self.remove_at(index, true).is_some()
    }

    /// Removes the key at slot `index`, returning it if the slot was live.
    pub fn remove_at(&mut self, index: usize, shrink: bool) -> Option<T> {
        let hash_builder = &self.hash_builder;
        self.table
            .remove(index, shrink, |k| make_hash(hash_builder, k))
            .map(|(k, ())| k)
    }

    /// Returns `true` if slot `index` holds a key.
    pub fn exists(&self, index: usize) -> bool {
        self.table.exists(index)
    }

    /// Returns the key stored at slot `index`.
    pub fn key_at(&self, index: usize) -> Option<T> {
        self.table.key(index).copied()
    }

    /// Visits every key in slot order; see [`Visit`].
    pub fn iterate(&mut self, mut f: impl FnMut(usize, &T) -> Visit) {
        self.table.iterate(|index, key, _| f(index, key));
    }

    /// Returns an iterator over the keys in slot order.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            inner: self.table.iter(),
        }
    }

    /// Occupancy and probe-length statistics of the underlying table.
    #[cfg(any(test, feature = "stats"))]
    pub fn stats(&self) -> crate::hash_table::TableStats {
        self.table.stats(|k| make_hash(&self.hash_builder, k))
    }
}

impl<T, S> HashSet<T, S>
where
    T: Copy + Hash + Eq,
    S: BuildHasher + Default,
{
    /// Creates an empty set with the default hasher builder.
    pub fn new() -> Self {
        Self::with_hasher(S::default())
    }

    /// Creates a set with the default hasher builder that holds at least
    /// `capacity` keys before it rehashes.
    pub fn try_with_capacity(capacity: usize) -> Result<Self, Error> {
        Self::try_with_capacity_and_hasher(capacity, S::default())
    }
}

impl<T, S> Default for HashSet<T, S>
where
    T: Copy + Hash + Eq,
    S: BuildHasher + Default,
{
    fn default() -> Self {
        Self::new()
    }
}

/// An iterator over the keys of a [`HashSet`].
pub struct Iter<'a, T: Copy> {
    inner: TableIter<'a, T, ()>,
}

impl<'a, T: Copy> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(k, _)| k)
    }
}

impl<'a, T, S> IntoIterator for &'a HashSet<T, S>
where
    T: Copy + Hash + Eq,
    S: BuildHasher,
{
    type IntoIter = Iter<'a, T>;
    type Item = &'a T;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
