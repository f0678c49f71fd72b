use core::fmt::Debug;
use core::hash::BuildHasher;
use core::hash::Hash;
use core::iter::FusedIterator;

use crate::error::Result;
use crate::hash_table::DEFAULT_LOAD_FACTOR;
use crate::hash_table::Entry as TableEntry;
use crate::hash_table::HashTable;

/// A hash map implemented using the chained [`HashTable`] as the underlying
/// storage.
///
/// `HashMap<K, V, S>` stores key-value pairs where keys implement `Hash + Eq`
/// and uses a configurable hasher builder `S` to hash keys.
///
/// Keys are passed as `Option<K>`: `None` is a valid key of its own, distinct
/// from every `Some` key, and hashes to 0. At most one entry has the `None`
/// key at any time.
///
/// Iteration order is unspecified and changes as the map grows.
#[derive(Clone)]
pub struct HashMap<K, V, S> {
    table: HashTable<(Option<K>, V)>,
    hash_builder: S,
}

impl<K, V, S> Debug for HashMap<K, V, S>
where
    K: Debug + Hash + Eq,
    V: Debug,
    S: BuildHasher,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let mut map = f.debug_map();
        for (k, v) in self.iter() {
            map.entry(&k, v);
        }
        map.finish()
    }
}

impl<K, V, S> HashMap<K, V, S>
where
    K: Hash + Eq,
    S: BuildHasher,
{
    /// Creates a new hash map with the given hasher builder.
    ///
    /// The map allocates 16 buckets on first insertion and grows at a load
    /// factor of 0.75.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use chain_hash::DefaultHashBuilder;
    /// # use chain_hash::HashMap;
    /// let map: HashMap<i32, String, _> = HashMap::with_hasher(DefaultHashBuilder::default());
    /// assert!(map.is_empty());
    /// assert_eq!(map.threshold(), 12);
    /// ```
    pub fn with_hasher(hash_builder: S) -> Self {
        Self {
            table: HashTable::new(),
            hash_builder,
        }
    }

    /// Creates a new hash map with the specified initial capacity and hasher
    /// builder.
    ///
    /// The first allocation holds `capacity` buckets rounded up to a power of
    /// two.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidCapacity`](crate::Error::InvalidCapacity) if
    /// `capacity` exceeds
    /// [`MAXIMUM_CAPACITY`](crate::hash_table::MAXIMUM_CAPACITY).
    pub fn with_capacity_and_hasher(capacity: usize, hash_builder: S) -> Result<Self> {
        Self::with_capacity_load_factor_and_hasher(capacity, DEFAULT_LOAD_FACTOR, hash_builder)
    }

    /// Creates a new hash map with the specified initial capacity, load
    /// factor, and hasher builder.
    ///
    /// # Errors
    ///
    /// Fails if `capacity` exceeds
    /// [`MAXIMUM_CAPACITY`](crate::hash_table::MAXIMUM_CAPACITY) or if
    /// `load_factor` is not a positive number.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use chain_hash::DefaultHashBuilder;
    /// # use chain_hash::Error;
    /// # use chain_hash::HashMap;
    /// let map: HashMap<u32, u32, _> =
    ///     HashMap::with_capacity_load_factor_and_hasher(32, 0.5, DefaultHashBuilder::default())?;
    /// assert_eq!(map.threshold(), 16);
    ///
    /// let err = HashMap::<u32, u32, _>::with_capacity_load_factor_and_hasher(
    ///     32,
    ///     -1.0,
    ///     DefaultHashBuilder::default(),
    /// )
    /// .unwrap_err();
    /// assert_eq!(err, Error::InvalidLoadFactor(-1.0));
    /// # Ok::<(), Error>(())
    /// ```
    pub fn with_capacity_load_factor_and_hasher(
        capacity: usize,
        load_factor: f32,
        hash_builder: S,
    ) -> Result<Self> {
        Ok(Self {
            table: HashTable::with_capacity_and_load_factor(capacity, load_factor)?,
            hash_builder,
        })
    }

    /// Hashes a key for the underlying table. The `None` key hashes to 0.
    fn make_hash(&self, key: Option<&K>) -> u64 {
        key.map_or(0, |key| self.hash_builder.hash_one(key))
    }

    /// Returns the number of elements in the map.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use chain_hash::DefaultHashBuilder;
    /// # use chain_hash::HashMap;
    /// let mut map: HashMap<_, _, DefaultHashBuilder> = HashMap::new();
    /// assert_eq!(map.len(), 0);
    /// map.insert(Some(1), "a");
    /// map.insert(None, "b");
    /// assert_eq!(map.len(), 2);
    /// ```
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Returns `true` if the map contains no elements.
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Returns the number of buckets currently allocated.
    ///
    /// This is 0 until the first insertion.
    pub fn capacity(&self) -> usize {
        self.table.capacity()
    }

    /// Returns the number of elements the map may hold before the next
    /// insertion grows it.
    pub fn threshold(&self) -> usize {
        self.table.threshold()
    }

    /// Returns the load factor the map was created with.
    pub fn load_factor(&self) -> f32 {
        self.table.load_factor()
    }

    /// Returns a reference to the map's hasher builder.
    pub fn hasher(&self) -> &S {
        &self.hash_builder
    }

    /// Removes all elements from the map.
    ///
    /// This operation preserves the map's allocated capacity.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use chain_hash::DefaultHashBuilder;
    /// # use chain_hash::HashMap;
    /// let mut map: HashMap<_, _, DefaultHashBuilder> = HashMap::new();
    /// map.insert(Some(1), "a");
    /// map.clear();
    /// assert!(map.is_empty());
    /// assert_eq!(map.get(Some(&1)), None);
    /// ```
    pub fn clear(&mut self) {
        self.table.clear();
    }

    /// Inserts a key-value pair into the map.
    ///
    /// If the map did not have this key present, `None` is returned.
    /// If the map did have this key present, the value is updated, and the old
    /// value is returned. The key itself is not updated.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use chain_hash::DefaultHashBuilder;
    /// # use chain_hash::HashMap;
    /// let mut map: HashMap<_, _, DefaultHashBuilder> = HashMap::new();
    /// assert_eq!(map.insert(Some(37), "a"), None);
    /// assert_eq!(map.insert(Some(37), "b"), Some("a"));
    /// assert_eq!(map.get(Some(&37)), Some(&"b"));
    ///
    /// assert_eq!(map.insert(None, "null"), None);
    /// assert_eq!(map.get(None), Some(&"null"));
    /// ```
    pub fn insert(&mut self, key: Option<K>, value: V) -> Option<V> {
        let hash = self.make_hash(key.as_ref());
        match self.table.entry(hash, |(k, _)| *k == key) {
            TableEntry::Occupied(mut entry) => {
                let old_value = core::mem::replace(&mut entry.get_mut().1, value);
                Some(old_value)
            }
            TableEntry::Vacant(entry) => {
                entry.insert((key, value));
                None
            }
        }
    }

    /// Returns a reference to the value corresponding to the key.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use chain_hash::DefaultHashBuilder;
    /// # use chain_hash::HashMap;
    /// let mut map: HashMap<_, _, DefaultHashBuilder> = HashMap::new();
    /// map.insert(Some("abc"), 1);
    /// map.insert(Some("cba"), 2);
    /// assert_eq!(map.get(Some(&"abc")), Some(&1));
    /// assert_eq!(map.get(Some(&"cba")), Some(&2));
    /// assert_eq!(map.get(None), None);
    /// ```
    pub fn get(&self, key: Option<&K>) -> Option<&V> {
        self.get_key_value(key).map(|(_, v)| v)
    }

    /// Returns the stored key and a reference to the value corresponding to
    /// the key.
    pub fn get_key_value(&self, key: Option<&K>) -> Option<(Option<&K>, &V)> {
        let hash = self.make_hash(key);
        self.table
            .find(hash, |(k, _)| k.as_ref() == key)
            .map(|(k, v)| (k.as_ref(), v))
    }

    /// Returns a mutable reference to the value corresponding to the key.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use chain_hash::DefaultHashBuilder;
    /// # use chain_hash::HashMap;
    /// let mut map: HashMap<_, _, DefaultHashBuilder> = HashMap::new();
    /// map.insert(Some(1), "a");
    /// if let Some(x) = map.get_mut(Some(&1)) {
    ///     *x = "b";
    /// }
    /// assert_eq!(map.get(Some(&1)), Some(&"b"));
    /// ```
    pub fn get_mut(&mut self, key: Option<&K>) -> Option<&mut V> {
        let hash = self.make_hash(key);
        self.table
            .find_mut(hash, |(k, _)| k.as_ref() == key)
            .map(|(_, v)| v)
    }

    /// Returns `true` if the map contains a value for the specified key.
    pub fn contains_key(&self, key: Option<&K>) -> bool {
        self.get(key).is_some()
    }

    /// Removes a key from the map, returning the value at the key if the key
    /// was previously in the map.
    ///
    /// The map's capacity is never reduced.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use chain_hash::DefaultHashBuilder;
    /// # use chain_hash::HashMap;
    /// let mut map: HashMap<_, _, DefaultHashBuilder> = HashMap::new();
    /// map.insert(Some(1), "a");
    /// assert_eq!(map.remove(Some(&1)), Some("a"));
    /// assert_eq!(map.remove(Some(&1)), None);
    /// ```
    pub fn remove(&mut self, key: Option<&K>) -> Option<V> {
        self.remove_entry(key).map(|(_, v)| v)
    }

    /// Removes a key from the map, returning the stored key and value if the
    /// key was previously in the map.
    pub fn remove_entry(&mut self, key: Option<&K>) -> Option<(Option<K>, V)> {
        let hash = self.make_hash(key);
        self.table.remove(hash, |(k, _)| k.as_ref() == key)
    }

    /// Gets the given key's corresponding entry in the map for in-place
    /// manipulation.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use chain_hash::DefaultHashBuilder;
    /// # use chain_hash::HashMap;
    /// let mut letters: HashMap<_, _, DefaultHashBuilder> = HashMap::new();
    ///
    /// for ch in "a short treatise on fungi".chars() {
    ///     letters
    ///         .entry(Some(ch))
    ///         .and_modify(|counter| *counter += 1)
    ///         .or_insert(1);
    /// }
    ///
    /// assert_eq!(letters.get(Some(&'s')), Some(&2));
    /// assert_eq!(letters.get(Some(&'t')), Some(&3));
    /// assert_eq!(letters.get(Some(&'y')), None);
    /// ```
    pub fn entry(&mut self, key: Option<K>) -> Entry<'_, K, V> {
        let hash = self.make_hash(key.as_ref());
        match self.table.entry(hash, |(k, _)| *k == key) {
            TableEntry::Occupied(entry) => Entry::Occupied(OccupiedEntry { entry }),
            TableEntry::Vacant(entry) => Entry::Vacant(VacantEntry { entry, key }),
        }
    }

    /// Returns an iterator over the key-value pairs of the map.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use chain_hash::DefaultHashBuilder;
    /// # use chain_hash::HashMap;
    /// let mut map: HashMap<_, _, DefaultHashBuilder> = HashMap::new();
    /// map.insert(Some(1), "a");
    /// map.insert(None, "b");
    ///
    /// let mut pairs: Vec<_> = map.iter().collect();
    /// pairs.sort();
    /// assert_eq!(pairs, vec![(None, &"b"), (Some(&1), &"a")]);
    /// ```
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            inner: self.table.iter(),
        }
    }

    /// Returns an iterator over the keys of the map.
    pub fn keys(&self) -> Keys<'_, K, V> {
        Keys { inner: self.iter() }
    }

    /// Returns an iterator over the values of the map.
    pub fn values(&self) -> Values<'_, K, V> {
        Values { inner: self.iter() }
    }

    /// Returns an iterator over mutable references to the values of the map.
    pub fn values_mut(&mut self) -> ValuesMut<'_, K, V> {
        ValuesMut {
            inner: self.table.iter_mut(),
        }
    }

    /// Clears the map, returning all key-value pairs as an iterator.
    ///
    /// The capacity is unchanged.
    pub fn drain(&mut self) -> Drain<'_, K, V> {
        Drain {
            inner: self.table.drain(),
        }
    }

    /// Returns utilization statistics for the underlying table.
    ///
    /// Available in tests and with the `stats` feature.
    #[cfg(any(test, feature = "stats"))]
    pub fn debug_stats(&self) -> crate::hash_table::DebugStats {
        self.table.debug_stats()
    }

    /// Pretty-prints the chain-length histogram of the underlying table.
    ///
    /// Requires the `std` feature, and `stats` outside of tests.
    #[cfg(all(any(test, feature = "stats"), feature = "std"))]
    pub fn print_chain_histogram(&self) {
        self.table.print_chain_histogram();
    }
}

impl<K, V, S> HashMap<K, V, S>
where
    K: Hash + Eq,
    S: BuildHasher + Default,
{
    /// Creates a new hash map using the default hasher builder, the default
    /// capacity of 16, and the default load factor of 0.75.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use chain_hash::DefaultHashBuilder;
    /// # use chain_hash::HashMap;
    /// let map: HashMap<i32, String, DefaultHashBuilder> = HashMap::new();
    /// assert!(map.is_empty());
    /// assert_eq!(map.capacity(), 0);
    /// ```
    pub fn new() -> Self {
        Self::with_hasher(S::default())
    }

    /// Creates a new hash map with the specified initial capacity using the
    /// default hasher builder.
    ///
    /// # Errors
    ///
    /// Fails if `capacity` exceeds
    /// [`MAXIMUM_CAPACITY`](crate::hash_table::MAXIMUM_CAPACITY).
    pub fn with_capacity(capacity: usize) -> Result<Self> {
        Self::with_capacity_and_hasher(capacity, S::default())
    }

    /// Creates a new hash map with the specified initial capacity and load
    /// factor using the default hasher builder.
    ///
    /// # Errors
    ///
    /// Fails if `capacity` exceeds
    /// [`MAXIMUM_CAPACITY`](crate::hash_table::MAXIMUM_CAPACITY) or if
    /// `load_factor` is not a positive number.
    pub fn with_capacity_and_load_factor(capacity: usize, load_factor: f32) -> Result<Self> {
        Self::with_capacity_load_factor_and_hasher(capacity, load_factor, S::default())
    }
}

impl<K, V, S> Default for HashMap<K, V, S>
where
    K: Hash + Eq,
    S: BuildHasher + Default,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, S> Extend<(Option<K>, V)> for HashMap<K, V, S>
where
    K: Hash + Eq,
    S: BuildHasher,
{
    fn extend<T: IntoIterator<Item = (Option<K>, V)>>(&mut self, iter: T) {
        for (k, v) in iter {
            self.insert(k, v);
        }
    }
}

impl<K, V, S> IntoIterator for HashMap<K, V, S> {
    type IntoIter = IntoIter<K, V>;
    type Item = (Option<K>, V);

    fn into_iter(self) -> Self::IntoIter {
        IntoIter {
            inner: self.table.into_iter(),
        }
    }
}

impl<'a, K, V, S> IntoIterator for &'a HashMap<K, V, S>
where
    K: Hash + Eq,
    S: BuildHasher,
{
    type IntoIter = Iter<'a, K, V>;
    type Item = (Option<&'a K>, &'a V);

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// A view into a single entry in the map, which may either be vacant or
/// occupied.
///
/// This enum is constructed from the [`entry`] method on [`HashMap`].
///
/// [`entry`]: HashMap::entry
pub enum Entry<'a, K, V> {
    /// A vacant entry.
    Vacant(VacantEntry<'a, K, V>),
    /// An occupied entry.
    Occupied(OccupiedEntry<'a, K, V>),
}

impl<'a, K, V> Entry<'a, K, V> {
    /// Inserts a default value if the entry is vacant and returns a mutable
    /// reference.
    pub fn or_insert(self, default: V) -> &'a mut V {
        match self {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => entry.insert(default),
        }
    }

    /// Inserts a value computed from a closure if the entry is vacant and
    /// returns a mutable reference.
    pub fn or_insert_with<F>(self, default: F) -> &'a mut V
    where
        F: FnOnce() -> V,
    {
        match self {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => entry.insert(default()),
        }
    }

    /// Provides in-place mutable access to an occupied entry before any
    /// potential inserts.
    pub fn and_modify<F>(self, f: F) -> Self
    where
        F: FnOnce(&mut V),
    {
        match self {
            Entry::Occupied(mut entry) => {
                f(entry.get_mut());
                Entry::Occupied(entry)
            }
            Entry::Vacant(entry) => Entry::Vacant(entry),
        }
    }

    /// Returns a reference to this entry's key.
    pub fn key(&self) -> Option<&K> {
        match self {
            Entry::Occupied(entry) => entry.key(),
            Entry::Vacant(entry) => entry.key(),
        }
    }
}

impl<'a, K, V> Entry<'a, K, V>
where
    V: Default,
{
    /// Inserts the default value if the entry is vacant and returns a mutable
    /// reference.
    pub fn or_default(self) -> &'a mut V {
        self.or_insert_with(Default::default)
    }
}

/// A view into a vacant entry in the map.
pub struct VacantEntry<'a, K, V> {
    entry: crate::hash_table::VacantEntry<'a, (Option<K>, V)>,
    key: Option<K>,
}

impl<'a, K, V> VacantEntry<'a, K, V> {
    /// Gets a reference to the key that would be used when inserting a value.
    pub fn key(&self) -> Option<&K> {
        self.key.as_ref()
    }

    /// Take ownership of the key.
    pub fn into_key(self) -> Option<K> {
        self.key
    }

    /// Inserts the value into the map and returns a mutable reference to it.
    pub fn insert(self, value: V) -> &'a mut V {
        &mut self.entry.insert((self.key, value)).1
    }
}

/// A view into an occupied entry in the map.
pub struct OccupiedEntry<'a, K, V> {
    entry: crate::hash_table::OccupiedEntry<'a, (Option<K>, V)>,
}

impl<'a, K, V> OccupiedEntry<'a, K, V> {
    /// Gets a reference to the key in the entry.
    pub fn key(&self) -> Option<&K> {
        self.entry.get().0.as_ref()
    }

    /// Gets a reference to the value in the entry.
    pub fn get(&self) -> &V {
        &self.entry.get().1
    }

    /// Gets a mutable reference to the value in the entry.
    pub fn get_mut(&mut self) -> &mut V {
        &mut self.entry.get_mut().1
    }

    /// Converts the entry into a mutable reference to the value.
    pub fn into_mut(self) -> &'a mut V {
        &mut self.entry.into_mut().1
    }

    /// Inserts a value into the entry and returns the old value.
    pub fn insert(&mut self, value: V) -> V {
        core::mem::replace(&mut self.entry.get_mut().1, value)
    }

    /// Removes the entry from the map and returns the value.
    pub fn remove(self) -> V {
        self.entry.remove().1
    }

    /// Removes the entry from the map and returns the key and value.
    pub fn remove_entry(self) -> (Option<K>, V) {
        self.entry.remove()
    }
}

/// An iterator over the key-value pairs of a `HashMap`.
pub struct Iter<'a, K, V> {
    inner: crate::hash_table::Iter<'a, (Option<K>, V)>,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (Option<&'a K>, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(k, v)| (k.as_ref(), v))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}

impl<K, V> FusedIterator for Iter<'_, K, V> {}

/// An iterator over the keys of a `HashMap`.
pub struct Keys<'a, K, V> {
    inner: Iter<'a, K, V>,
}

impl<'a, K, V> Iterator for Keys<'a, K, V> {
    type Item = Option<&'a K>;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(k, _)| k)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for Keys<'_, K, V> {}

impl<K, V> FusedIterator for Keys<'_, K, V> {}

/// An iterator over the values of a `HashMap`.
pub struct Values<'a, K, V> {
    inner: Iter<'a, K, V>,
}

impl<'a, K, V> Iterator for Values<'a, K, V> {
    type Item = &'a V;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_, v)| v)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for Values<'_, K, V> {}

impl<K, V> FusedIterator for Values<'_, K, V> {}

/// A mutable iterator over the values of a `HashMap`.
pub struct ValuesMut<'a, K, V> {
    inner: crate::hash_table::IterMut<'a, (Option<K>, V)>,
}

impl<'a, K, V> Iterator for ValuesMut<'a, K, V> {
    type Item = &'a mut V;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_, v)| v)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for ValuesMut<'_, K, V> {}

impl<K, V> FusedIterator for ValuesMut<'_, K, V> {}

/// A draining iterator over the key-value pairs of a `HashMap`.
pub struct Drain<'a, K, V> {
    inner: crate::hash_table::Drain<'a, (Option<K>, V)>,
}

impl<'a, K, V> Iterator for Drain<'a, K, V> {
    type Item = (Option<K>, V);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for Drain<'_, K, V> {}

impl<K, V> FusedIterator for Drain<'_, K, V> {}

/// An owning iterator over the key-value pairs of a `HashMap`.
pub struct IntoIter<K, V> {
    inner: crate::hash_table::IntoIter<(Option<K>, V)>,
}

impl<K, V> Iterator for IntoIter<K, V> {
    type Item = (Option<K>, V);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for IntoIter<K, V> {}

impl<K, V> FusedIterator for IntoIter<K, V> {}
