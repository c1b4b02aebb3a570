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

/// Outcome of [`HashMap::swap`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Swap {
    /// Whether any value moved (or, for identical keys, whether the key is
    /// present).
    pub success: bool,
    /// Slot indices of the first and second key after the call, in argument
    /// order. A key that is absent afterwards reports
    /// [`end`](HashMap::end).
    pub indices: [usize; 2],
}

/// A hash map of plain-old-data keys and values backed by [`HashTable`].
///
/// Keys and values must be `Copy`. Keys are hashed with `S` and folded to 32
/// bits. Besides the usual keyed operations the map exposes the slot indices
/// of its entries; an index stays valid until the next call that may rehash
/// (an insertion, a shrinking removal, or an explicit resize).
///
/// # Example
///
/// ```rust
/// use pod_hash::HashMap;
///
/// let mut sessions: HashMap<u64, u32> = HashMap::new();
/// assert!(sessions.put(7, 100).unwrap());
/// assert!(!sessions.put(7, 200).unwrap());
/// assert_eq!(sessions.get(&7), Some(100));
///
/// assert_eq!(sessions.replace(7, 300).unwrap(), Some(100));
/// assert_eq!(sessions.remove(&7), Some(300));
/// assert!(!sessions.contains_key(&7));
/// ```
#[derive(Clone)]
pub struct HashMap<K: Copy, V: Copy, S = DefaultHashBuilder> {
    table: HashTable<K, V>,
    hash_builder: S,
}

impl<K, V, S> Debug for HashMap<K, V, S>
where
    K: Copy + Debug,
    V: Copy + Debug,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_map().entries(self.table.iter()).finish()
    }
}

impl<K, V, S> HashMap<K, V, S>
where
    K: Copy + Hash + Eq,
    V: Copy,
    S: BuildHasher,
{
    /// Creates an empty map that hashes with `hash_builder`. Nothing is
    /// allocated until the first insertion.
    pub fn with_hasher(hash_builder: S) -> Self {
        Self {
            table: HashTable::new(),
            hash_builder,
        }
    }

    /// Creates a map that holds at least `capacity` entries before it
    /// rehashes.
    pub fn try_with_capacity_and_hasher(capacity: usize, hash_builder: S) -> Result<Self, Error> {
        Ok(Self {
            table: HashTable::try_with_capacity(capacity)?,
            hash_builder,
        })
    }

    /// Returns a reference to the map's hasher builder.
    pub fn hasher(&self) -> &S {
        &self.hash_builder
    }

    /// Number of entries in the map.
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Returns `true` if the map holds no entries.
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

    /// One past the last slot index; returned by lookups that miss.
    pub fn end(&self) -> usize {
        self.table.end()
    }

    /// Removes every entry, keeping the allocation.
    pub fn clear(&mut self) {
        self.table.clear();
    }

    /// Rehashes into at least `capacity` slots. See [`HashTable::resize`].
    pub fn resize(&mut self, capacity: usize) -> Result<(), Error> {
        let hash_builder = &self.hash_builder;
        self.table.resize(capacity, |k| make_hash(hash_builder, k))
    }

    /// Makes room for at least `additional` more entries.
    pub fn reserve(&mut self, additional: usize) -> Result<(), Error> {
        let hash_builder = &self.hash_builder;
        self.table.reserve(additional, |k| make_hash(hash_builder, k))
    }

    /// Rehashes into the smallest capacity that holds the current entries.
    pub fn shrink_to_fit(&mut self) -> Result<(), Error> {
        let hash_builder = &self.hash_builder;
        self.table.shrink_to_fit(|k| make_hash(hash_builder, k))
    }

    /// Returns the slot index of `key`, or [`end`](Self::end) if it is
    /// absent.
    pub fn find(&self, key: &K) -> usize {
        let hash = make_hash(&self.hash_builder, key);
        self.table.find(hash, |k| k == key)
    }

    /// Returns `true` if the map contains `key`.
    pub fn contains_key(&self, key: &K) -> bool {
        self.find(key) != self.end()
    }

    /// Returns a copy of the value stored for `key`.
    pub fn get(&self, key: &K) -> Option<V> {
        self.table.value(self.find(key)).copied()
    }

    /// Returns a mutable reference to the value stored for `key`.
    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        let index = self.find(key);
        self.table.value_mut(index)
    }

    /// Inserts `key` with `value` unless the key is already present.
    ///
    /// Returns `Ok(false)` and leaves the map untouched for an existing key.
    ///
    /// ```rust
    /// use pod_hash::HashMap;
    ///
    /// let mut map: HashMap<u32, char> = HashMap::new();
    /// assert_eq!(map.put(1, 'a'), Ok(true));
    /// assert_eq!(map.put(1, 'b'), Ok(false));
    /// assert_eq!(map.get(&1), Some('a'));
    /// ```
    pub fn put(&mut self, key: K, value: V) -> Result<bool, Error> {
        let (_, kind) = self.put_index(key, value)?;
        Ok(kind != Insertion::Present)
    }

    /// Stores `value` under `key`, returning the value it replaced.
    ///
    /// ```rust
    /// use pod_hash::HashMap;
    ///
    /// let mut map: HashMap<u32, u8> = HashMap::new();
    /// assert_eq!(map.replace(4, 1), Ok(None));
    /// assert_eq!(map.replace(4, 2), Ok(Some(1)));
    /// assert_eq!(map.get(&4), Some(2));
    /// ```
    pub fn replace(&mut self, key: K, value: V) -> Result<Option<V>, Error> {
        let (index, kind) = self.put_index(key, value)?;
        if kind != Insertion::Present {
            return Ok(None);
        }
        Ok(self
            .table
            .value_mut(index)
            .map(|slot| core::mem::replace(slot, value)))
    }

    /// Claims a slot for `key`, writing `value` only if the key was absent.
    ///
    /// Returns the slot index and how the key was resolved. On
    /// [`Insertion::Present`] the index names the existing entry.
    pub fn put_index(&mut self, key: K, value: V) -> Result<(usize, Insertion), Error> {
        let hash = make_hash(&self.hash_builder, &key);
        let hash_builder = &self.hash_builder;
        self.table.insert(
            hash,
            key,
            value,
            |k| *k == key,
            |k| make_hash(hash_builder, k),
        )
    }

    /// Removes `key`, returning its value. May shrink a sparse table.
    pub fn remove(&mut self, key: &K) -> Option<V> {
        let index = self.find(key);
        self.remove_at(index, true).map(|(_, v)| v)
    }

    /// Removes the entry at slot `index`, returning it if the slot was live.
    ///
    /// With `shrink` set a sparse table may be rehashed, which invalidates
    /// other indices.
    pub fn remove_at(&mut self, index: usize, shrink: bool) -> Option<(K, V)> {
        let hash_builder = &self.hash_builder;
        self.table
            .remove(index, shrink, |k| make_hash(hash_builder, k))
    }

    /// Returns `true` if slot `index` holds an entry.
    pub fn exists(&self, index: usize) -> bool {
        self.table.exists(index)
    }

    /// Returns the key stored at slot `index`.
    pub fn key_at(&self, index: usize) -> Option<K> {
        self.table.key(index).copied()
    }

    /// Returns the value stored at slot `index`.
    pub fn value_at(&self, index: usize) -> Option<V> {
        self.table.value(index).copied()
    }

    /// Returns a mutable reference to the value stored at slot `index`.
    pub fn value_at_mut(&mut self, index: usize) -> Option<&mut V> {
        self.table.value_mut(index)
    }

    /// Overwrites the value at slot `index`. Returns `false` if the slot is
    /// not live.
    pub fn set_value(&mut self, index: usize, value: V) -> bool {
        match self.table.value_mut(index) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }

    /// Swaps or migrates the values of two keys.
    ///
    /// - Identical keys: succeeds if the key is present.
    /// - Both present: exchanges the values if `allow_swap` is set, otherwise
    ///   fails without changes.
    /// - One present: moves its value to the absent key and removes the
    ///   present one. The vacated side reports [`end`](Self::end).
    /// - Neither present: fails, both indices are [`end`](Self::end).
    ///
    /// The indices in the result are valid until the next rehashing call.
    ///
    /// ```rust
    /// use pod_hash::HashMap;
    ///
    /// let mut map: HashMap<u32, u32> = HashMap::new();
    /// map.put(1, 10).unwrap();
    /// map.put(2, 20).unwrap();
    ///
    /// assert!(!map.swap(&1, &2, false).unwrap().success);
    /// assert!(map.swap(&1, &2, true).unwrap().success);
    /// assert_eq!(map.get(&1), Some(20));
    ///
    /// let moved = map.swap(&2, &3, true).unwrap();
    /// assert_eq!(moved.indices, [map.end(), map.find(&3)]);
    /// assert_eq!(map.get(&3), Some(10));
    /// assert!(!map.contains_key(&2));
    /// ```
    pub fn swap(&mut self, first: &K, second: &K, allow_swap: bool) -> Result<Swap, Error> {
        let end = self.end();
        let fi = self.find(first);
        let si = if first == second { fi } else { self.find(second) };

        if fi == si {
            return Ok(Swap {
                success: self.exists(fi),
                indices: [fi, si],
            });
        }

        match (self.table.value(fi).copied(), self.table.value(si).copied()) {
            (Some(fv), Some(sv)) => {
                if allow_swap {
                    self.set_value(fi, sv);
                    self.set_value(si, fv);
                }
                Ok(Swap {
                    success: allow_swap,
                    indices: [fi, si],
                })
            }
            (Some(fv), None) => {
                let si = self.migrate(*first, *second, fv)?;
                Ok(Swap {
                    success: true,
                    indices: [self.end(), si],
                })
            }
            (None, Some(sv)) => {
                let fi = self.migrate(*second, *first, sv)?;
                Ok(Swap {
                    success: true,
                    indices: [fi, self.end()],
                })
            }
            (None, None) => Ok(Swap {
                success: false,
                indices: [end, end],
            }),
        }
    }

    // Inserting before removing keeps the map unchanged if the insertion
    // fails to allocate. The source is removed without shrinking so the
    // returned index survives.
    fn migrate(&mut self, from: K, to: K, value: V) -> Result<usize, Error> {
        let (index, _) = self.put_index(to, value)?;
        let source = self.find(&from);
        self.remove_at(source, false);
        Ok(index)
    }

    /// Visits every entry in slot order. The callback receives the slot
    /// index, key, and value, and returns whether to continue, remove the
    /// entry, or stop.
    ///
    /// ```rust
    /// use pod_hash::HashMap;
    /// use pod_hash::Visit;
    ///
    /// let mut map: HashMap<u32, u32> = HashMap::new();
    /// for i in 0..10 {
    ///     map.put(i, i).unwrap();
    /// }
    /// map.iterate(|_, _, v| if *v % 2 == 0 { Visit::Remove } else { Visit::Continue });
    /// assert_eq!(map.len(), 5);
    /// ```
    pub fn iterate(&mut self, f: impl FnMut(usize, &K, &mut V) -> Visit) {
        self.table.iterate(f);
    }

    /// Returns an iterator over the entries in slot order.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            inner: self.table.iter(),
        }
    }

    /// Returns an iterator over the keys in slot order.
    pub fn keys(&self) -> Keys<'_, K, V> {
        Keys { inner: self.iter() }
    }

    /// Returns an iterator over the values in slot order.
    pub fn values(&self) -> Values<'_, K, V> {
        Values { inner: self.iter() }
    }

    /// Occupancy and probe-length statistics of the underlying table.
    #[cfg(any(test, feature = "stats"))]
    pub fn stats(&self) -> crate::hash_table::TableStats {
        self.table.stats(|k| make_hash(&self.hash_builder, k))
    }
}

impl<K, V, S> HashMap<K, V, S>
where
    K: Copy + Hash + Eq,
    V: Copy,
    S: BuildHasher + Default,
{
    /// Creates an empty map with the default hasher builder.
    pub fn new() -> Self {
        Self::with_hasher(S::default())
    }

    /// Creates a map with the default hasher builder that holds at least
    /// `capacity` entries before it rehashes.
    pub fn try_with_capacity(capacity: usize) -> Result<Self, Error> {
        Self::try_with_capacity_and_hasher(capacity, S::default())
    }
}

impl<K, V, S> Default for HashMap<K, V, S>
where
    K: Copy + Hash + Eq,
    V: Copy,
    S: BuildHasher + Default,
{
    fn default() -> Self {
        Self::new()
    }
}

/// An iterator over the entries of a [`HashMap`].
pub struct Iter<'a, K: Copy, V: Copy> {
    inner: TableIter<'a, K, V>,
}

impl<'a, K: Copy, V: Copy> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }
}

/// An iterator over the keys of a [`HashMap`].
pub struct Keys<'a, K: Copy, V: Copy> {
    inner: Iter<'a, K, V>,
}

impl<'a, K: Copy, V: Copy> Iterator for Keys<'a, K, V> {
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(k, _)| k)
    }
}

/// An iterator over the values of a [`HashMap`].
pub struct Values<'a, K: Copy, V: Copy> {
    inner: Iter<'a, K, V>,
}

impl<'a, K: Copy, V: Copy> Iterator for Values<'a, K, V> {
    type Item = &'a V;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_, v)| v)
    }
}
