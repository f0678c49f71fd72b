use alloc::boxed::Box;
use alloc::vec::Vec;
use core::fmt::Debug;
use core::iter::FusedIterator;

use crate::error::Error;
use crate::error::Result;

/// Number of buckets allocated on first insertion when no capacity was
/// requested.
pub const DEFAULT_CAPACITY: usize = 16;

/// Load factor used by constructors that don't take one.
pub const DEFAULT_LOAD_FACTOR: f32 = 0.75;

/// Largest bucket count a table will ever allocate. Once reached, the table
/// stops growing and chains simply get longer.
pub const MAXIMUM_CAPACITY: usize = 1 << (usize::BITS - 2);

/// Largest bucket array allocated by the first insertion. Larger requested
/// capacities are reached by doubling as the table fills.
const MAX_INITIAL_BUCKETS: usize = 1 << 16;

/// Folds the upper half of a hash into the lower half.
///
/// Bucket indices only use the low bits of a hash, so weak hash functions
/// that vary mostly in their high bits would otherwise pile entries into a few
/// buckets. The table applies this to every hash it is handed, so callers pass
/// the raw hash of their key.
///
/// # Examples
///
/// ```rust
/// # use chain_hash::hash_table::spread;
/// assert_eq!(spread(0), 0);
/// assert_eq!(spread(1 << 32), (1 << 32) | 1);
/// ```
#[inline(always)]
pub fn spread(hash: u64) -> u64 {
    hash ^ (hash >> 32)
}

#[inline(always)]
fn bucket_index(hash: u64, capacity: usize) -> usize {
    debug_assert!(capacity.is_power_of_two());
    hash as usize & (capacity - 1)
}

#[inline(always)]
fn threshold_for(capacity: usize, load_factor: f32) -> usize {
    // Float to int casts saturate, so an infinite load factor yields
    // `usize::MAX` and `0 * inf` (NaN) yields 0.
    (capacity as f64 * load_factor as f64) as usize
}

fn empty_buckets<V>(capacity: usize) -> Vec<Link<V>> {
    let mut buckets = Vec::with_capacity(capacity);
    buckets.resize_with(capacity, || None);
    buckets
}

type Link<V> = Option<Box<Node<V>>>;

struct Node<V> {
    /// Spread hash, computed once at insertion.
    hash: u64,
    value: V,
    next: Link<V>,
}

fn chain<V>(link: &Link<V>) -> impl Iterator<Item = &Node<V>> {
    core::iter::successors(link.as_deref(), |node| node.next.as_deref())
}

/// Debug statistics for hash table analysis.
///
/// Available in tests and with the `stats` feature.
#[cfg(any(test, feature = "stats"))]
#[derive(Debug, Clone)]
pub struct DebugStats {
    /// Number of elements currently in the table
    pub populated: usize,
    /// Number of allocated buckets
    pub capacity: usize,
    /// Population above which the next insertion grows the table
    pub threshold: usize,
    /// Number of buckets holding at least one entry
    pub occupied_buckets: usize,
    /// Length of the longest chain
    pub longest_chain: usize,
    /// Actual load (populated / capacity)
    pub load: f64,
    /// Bucket utilization (occupied_buckets / capacity)
    pub bucket_utilization: f64,
    /// Number of times the table has doubled, not counting the first
    /// allocation
    pub resizes: usize,
}

#[cfg(any(test, feature = "stats"))]
impl DebugStats {
    /// Pretty-print the debug statistics.
    #[cfg(feature = "std")]
    pub fn print(&self) {
        println!("=== Hash Table Debug Statistics ===");
        println!(
            "Population: {}/{} buckets ({:.2}% load, threshold {})",
            self.populated,
            self.capacity,
            self.load * 100.0,
            self.threshold
        );
        println!(
            "Bucket Usage: {}/{} ({:.2}% utilization)",
            self.occupied_buckets,
            self.capacity,
            self.bucket_utilization * 100.0
        );
        println!("Longest Chain: {}", self.longest_chain);
        println!("Resizes: {}", self.resizes);
    }
}

/// A hash table using separate chaining.
///
/// `HashTable<V>` stores values of type `V` in a power-of-two array of
/// buckets, each holding a singly linked chain of the values whose hashes
/// land there. Like the raw tables of other crates, it doesn't hash anything
/// itself: every operation takes the value's hash and an equality predicate.
///
/// The bucket array is allocated on first insertion and doubles whenever an
/// insertion would take the population past
/// `floor(capacity * load_factor)`. It never shrinks.
///
/// ## Example
///
/// ```rust
/// # use core::hash::Hash;
/// # use core::hash::Hasher;
/// #
/// # use chain_hash::hash_table::HashTable;
/// # use siphasher::sip::SipHasher;
/// #
/// # #[derive(Debug, PartialEq)]
/// # struct Person {
/// #     id: u64,
/// #     name: String,
/// # }
/// #
/// # fn hash_id(id: u64) -> u64 {
/// #     let mut hasher = SipHasher::new();
/// #     id.hash(&mut hasher);
/// #     hasher.finish()
/// # }
///
/// let mut table = HashTable::new();
/// let hash = hash_id(123);
///
/// match table.entry(hash, |p: &Person| p.id == 123) {
///     chain_hash::hash_table::Entry::Vacant(entry) => {
///         entry.insert(Person {
///             id: 123,
///             name: "Alice".to_string(),
///         });
///     }
///     chain_hash::hash_table::Entry::Occupied(_) => {
///         println!("Person already exists");
///     }
/// }
///
/// assert_eq!(table.find(hash, |p| p.id == 123).unwrap().name, "Alice");
/// ```
pub struct HashTable<V> {
    buckets: Vec<Link<V>>,

    populated: usize,
    threshold: usize,
    load_factor: f32,

    /// Bucket count of the first allocation.
    initial_buckets: usize,

    #[cfg(any(test, feature = "stats"))]
    resizes: usize,
}

impl<V> Debug for HashTable<V> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("HashTable")
            .field(
                "chains",
                &self
                    .buckets
                    .iter()
                    .map(|bucket| chain(bucket).count())
                    .collect::<Vec<_>>(),
            )
            .field("populated", &self.populated)
            .field("capacity", &self.buckets.len())
            .field("threshold", &self.threshold)
            .field("load_factor", &self.load_factor)
            .finish()
    }
}

impl<V> Clone for HashTable<V>
where
    V: Clone,
{
    fn clone(&self) -> Self {
        let mut buckets = empty_buckets(self.buckets.len());

        for (src, dst) in self.buckets.iter().zip(buckets.iter_mut()) {
            let mut tail = dst;
            for node in chain(src) {
                let copy = tail.insert(Box::new(Node {
                    hash: node.hash,
                    value: node.value.clone(),
                    next: None,
                }));
                tail = &mut copy.next;
            }
        }

        Self {
            buckets,
            populated: self.populated,
            threshold: self.threshold,
            load_factor: self.load_factor,
            initial_buckets: self.initial_buckets,
            #[cfg(any(test, feature = "stats"))]
            resizes: self.resizes,
        }
    }
}

impl<V> Drop for HashTable<V> {
    fn drop(&mut self) {
        self.unlink_all();
    }
}

impl<V> Default for HashTable<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> HashTable<V> {
    /// Creates an empty table that will allocate [`DEFAULT_CAPACITY`] buckets
    /// on first insertion and grow at a load factor of
    /// [`DEFAULT_LOAD_FACTOR`].
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use chain_hash::hash_table::HashTable;
    /// let table: HashTable<u64> = HashTable::new();
    /// assert_eq!(table.capacity(), 0);
    /// assert_eq!(table.threshold(), 12);
    /// ```
    pub fn new() -> Self {
        Self {
            buckets: Vec::new(),
            populated: 0,
            threshold: threshold_for(DEFAULT_CAPACITY, DEFAULT_LOAD_FACTOR),
            load_factor: DEFAULT_LOAD_FACTOR,
            initial_buckets: DEFAULT_CAPACITY,
            #[cfg(any(test, feature = "stats"))]
            resizes: 0,
        }
    }

    /// Creates an empty table whose first allocation holds `capacity` buckets,
    /// rounded up to a power of two.
    ///
    /// Nothing is allocated until the first insertion. A capacity of 0 falls
    /// back to [`DEFAULT_CAPACITY`] buckets on first insertion, and the first
    /// allocation never exceeds 65536 buckets; larger capacities are reached
    /// by growth.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidCapacity`] if `capacity` exceeds
    /// [`MAXIMUM_CAPACITY`].
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use chain_hash::hash_table::HashTable;
    /// let table: HashTable<String> = HashTable::with_capacity(100)?;
    /// assert_eq!(table.threshold(), 75);
    /// # Ok::<(), chain_hash::Error>(())
    /// ```
    pub fn with_capacity(capacity: usize) -> Result<Self> {
        Self::with_capacity_and_load_factor(capacity, DEFAULT_LOAD_FACTOR)
    }

    /// Creates an empty table with the given initial capacity and load
    /// factor.
    ///
    /// The threshold starts at `floor(capacity * load_factor)` and is
    /// recomputed from the real bucket count on every allocation.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidCapacity`] if `capacity` exceeds
    /// [`MAXIMUM_CAPACITY`], and [`Error::InvalidLoadFactor`] if `load_factor`
    /// is not a positive number.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use chain_hash::Error;
    /// # use chain_hash::hash_table::HashTable;
    /// let table: HashTable<u32> = HashTable::with_capacity_and_load_factor(16, 0.5)?;
    /// assert_eq!(table.threshold(), 8);
    ///
    /// assert_eq!(
    ///     HashTable::<u32>::with_capacity_and_load_factor(16, 0.0).unwrap_err(),
    ///     Error::InvalidLoadFactor(0.0),
    /// );
    /// # Ok::<(), Error>(())
    /// ```
    pub fn with_capacity_and_load_factor(capacity: usize, load_factor: f32) -> Result<Self> {
        if capacity > MAXIMUM_CAPACITY {
            return Err(Error::InvalidCapacity(capacity));
        }
        if load_factor.is_nan() || load_factor <= 0.0 {
            return Err(Error::InvalidLoadFactor(load_factor));
        }

        Ok(Self {
            buckets: Vec::new(),
            populated: 0,
            threshold: threshold_for(capacity, load_factor),
            load_factor,
            initial_buckets: if capacity == 0 {
                DEFAULT_CAPACITY
            } else {
                capacity.next_power_of_two().min(MAX_INITIAL_BUCKETS)
            },
            #[cfg(any(test, feature = "stats"))]
            resizes: 0,
        })
    }

    /// Returns the number of elements in the table.
    pub fn len(&self) -> usize {
        self.populated
    }

    /// Returns `true` if the table contains no elements.
    pub fn is_empty(&self) -> bool {
        self.populated == 0
    }

    /// Returns the number of allocated buckets.
    ///
    /// This is 0 until the first insertion and a power of two afterwards.
    pub fn capacity(&self) -> usize {
        self.buckets.len()
    }

    /// Returns the population the table may reach before the next insertion
    /// grows it.
    pub fn threshold(&self) -> usize {
        self.threshold
    }

    /// Returns the load factor the table was created with.
    pub fn load_factor(&self) -> f32 {
        self.load_factor
    }

    /// Removes all elements from the table.
    ///
    /// The bucket array is kept, so the capacity is unchanged.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use chain_hash::hash_table::HashTable;
    /// let mut table = HashTable::new();
    /// table.entry(1, |&v: &u64| v == 1).or_insert(1);
    /// table.entry(2, |&v: &u64| v == 2).or_insert(2);
    /// let capacity = table.capacity();
    ///
    /// table.clear();
    /// assert!(table.is_empty());
    /// assert_eq!(table.capacity(), capacity);
    /// ```
    pub fn clear(&mut self) {
        if self.populated == 0 {
            return;
        }
        self.unlink_all();
    }

    /// Drops every chain one node at a time, so long chains don't recurse
    /// through `Box` destructors.
    fn unlink_all(&mut self) {
        for bucket in self.buckets.iter_mut() {
            let mut link = bucket.take();
            while let Some(mut node) = link {
                link = node.next.take();
            }
        }
        self.populated = 0;
    }

    #[inline(always)]
    fn bucket_of(&self, hash: u64) -> Option<usize> {
        if self.buckets.is_empty() {
            None
        } else {
            Some(bucket_index(hash, self.buckets.len()))
        }
    }

    /// Returns a reference to the value matching `eq` under `hash`, if any.
    ///
    /// The chain is scanned comparing stored hashes first, so `eq` only runs
    /// on values whose hash matches.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use chain_hash::hash_table::HashTable;
    /// let mut table = HashTable::new();
    /// table.entry(42, |&v: &u64| v == 42).or_insert(42);
    ///
    /// assert_eq!(table.find(42, |&v| v == 42), Some(&42));
    /// assert_eq!(table.find(7, |&v| v == 7), None);
    /// ```
    pub fn find(&self, hash: u64, eq: impl Fn(&V) -> bool) -> Option<&V> {
        let hash = spread(hash);
        let index = self.bucket_of(hash)?;
        chain(&self.buckets[index])
            .find(|node| node.hash == hash && eq(&node.value))
            .map(|node| &node.value)
    }

    /// Returns a mutable reference to the value matching `eq` under `hash`,
    /// if any.
    pub fn find_mut(&mut self, hash: u64, eq: impl Fn(&V) -> bool) -> Option<&mut V> {
        let hash = spread(hash);
        let index = self.bucket_of(hash)?;

        let mut link = self.buckets[index].as_deref_mut();
        while let Some(node) = link {
            if node.hash == hash && eq(&node.value) {
                return Some(&mut node.value);
            }
            link = node.next.as_deref_mut();
        }

        None
    }

    /// Removes and returns the value matching `eq` under `hash`, if any.
    ///
    /// Removal never shrinks the bucket array.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use chain_hash::hash_table::HashTable;
    /// let mut table = HashTable::new();
    /// table.entry(1, |&v: &u64| v == 1).or_insert(1);
    ///
    /// assert_eq!(table.remove(1, |&v| v == 1), Some(1));
    /// assert_eq!(table.remove(1, |&v| v == 1), None);
    /// assert!(table.is_empty());
    /// ```
    pub fn remove(&mut self, hash: u64, eq: impl Fn(&V) -> bool) -> Option<V> {
        let hash = spread(hash);
        let index = self.bucket_of(hash)?;

        let mut link = &mut self.buckets[index];
        while link
            .as_ref()
            .is_some_and(|node| !(node.hash == hash && eq(&node.value)))
        {
            link = &mut link.as_mut()?.next;
        }

        let node = link.take()?;
        let Node { value, next, .. } = *node;
        *link = next;
        self.populated -= 1;

        Some(value)
    }

    /// Gets the entry for the value matching `eq` under `hash` for in-place
    /// manipulation.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use chain_hash::hash_table::Entry;
    /// # use chain_hash::hash_table::HashTable;
    /// let mut table = HashTable::new();
    ///
    /// match table.entry(5, |v: &(u64, char)| v.0 == 5) {
    ///     Entry::Vacant(entry) => {
    ///         entry.insert((5, 'f'));
    ///     }
    ///     Entry::Occupied(_) => unreachable!(),
    /// }
    ///
    /// match table.entry(5, |v: &(u64, char)| v.0 == 5) {
    ///     Entry::Occupied(mut entry) => entry.get_mut().1 = 'F',
    ///     Entry::Vacant(_) => unreachable!(),
    /// }
    ///
    /// assert_eq!(table.find(5, |v| v.0 == 5), Some(&(5, 'F')));
    /// ```
    pub fn entry(&mut self, hash: u64, eq: impl Fn(&V) -> bool) -> Entry<'_, V> {
        let hash = spread(hash);
        let position = self.bucket_of(hash).and_then(|index| {
            chain(&self.buckets[index])
                .position(|node| node.hash == hash && eq(&node.value))
                .map(|depth| (index, depth))
        });

        match position {
            Some((index, depth)) => {
                let HashTable {
                    buckets, populated, ..
                } = self;

                let mut link = &mut buckets[index];
                for _ in 0..depth {
                    link = match link {
                        Some(node) => &mut node.next,
                        None => unreachable!("chain shorter than the matched position"),
                    };
                }

                Entry::Occupied(OccupiedEntry { link, populated })
            }
            None => Entry::Vacant(VacantEntry { table: self, hash }),
        }
    }

    /// Links a new node at the head of its bucket and returns its value.
    ///
    /// `hash` must already be spread.
    fn insert_new(&mut self, hash: u64, value: V) -> &mut V {
        if self.buckets.is_empty() {
            self.resize();
        }
        // Growing before linking the node leaves the table in the same state
        // as growing right after the population passes the threshold.
        if self.populated >= self.threshold {
            self.resize();
        }

        let index = bucket_index(hash, self.buckets.len());
        let bucket = &mut self.buckets[index];
        let next = bucket.take();
        let node = bucket.insert(Box::new(Node { hash, value, next }));
        self.populated += 1;

        &mut node.value
    }

    /// Doubles the bucket array, or allocates it if the table is still empty,
    /// and moves every node to its bucket in the new array.
    ///
    /// Nodes are relinked, not copied, and their stored hashes are reused.
    /// Chain order is not preserved.
    fn resize(&mut self) {
        let old_capacity = self.buckets.len();
        if old_capacity >= MAXIMUM_CAPACITY {
            self.threshold = usize::MAX;
            return;
        }

        let new_capacity = if old_capacity == 0 {
            self.initial_buckets
        } else {
            old_capacity << 1
        };

        if old_capacity == 0 {
            log::trace!("allocating {new_capacity} buckets");
        } else {
            log::debug!(
                "growing hash table from {old_capacity} to {new_capacity} buckets ({} entries)",
                self.populated
            );
            #[cfg(any(test, feature = "stats"))]
            {
                self.resizes += 1;
            }
        }

        self.threshold = if new_capacity >= MAXIMUM_CAPACITY {
            usize::MAX
        } else {
            threshold_for(new_capacity, self.load_factor)
        };

        let old_buckets = core::mem::replace(&mut self.buckets, empty_buckets(new_capacity));
        for mut link in old_buckets {
            while let Some(mut node) = link {
                link = node.next.take();
                let bucket = &mut self.buckets[bucket_index(node.hash, new_capacity)];
                node.next = bucket.take();
                *bucket = Some(node);
            }
        }
    }

    /// Unlinks the first node at or after bucket `*cursor`, advancing the
    /// cursor past empty buckets.
    fn pop_from(&mut self, cursor: &mut usize) -> Option<V> {
        while self.populated > 0 {
            let link = &mut self.buckets[*cursor];
            if let Some(node) = link.take() {
                let Node { value, next, .. } = *node;
                *link = next;
                self.populated -= 1;
                return Some(value);
            }
            *cursor += 1;
        }

        None
    }

    /// Returns an iterator over all values in the table.
    ///
    /// The order is unspecified and changes when the table grows.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use chain_hash::hash_table::HashTable;
    /// let mut table = HashTable::new();
    /// for i in 0..3u64 {
    ///     table.entry(i, |&v: &u64| v == i).or_insert(i);
    /// }
    ///
    /// let mut values: Vec<_> = table.iter().copied().collect();
    /// values.sort();
    /// assert_eq!(values, vec![0, 1, 2]);
    /// ```
    pub fn iter(&self) -> Iter<'_, V> {
        Iter {
            buckets: self.buckets.iter(),
            node: None,
            remaining: self.populated,
        }
    }

    /// Returns an iterator yielding mutable references to all values.
    pub fn iter_mut(&mut self) -> IterMut<'_, V> {
        IterMut {
            buckets: self.buckets.iter_mut(),
            node: None,
            remaining: self.populated,
        }
    }

    /// Removes all values from the table, returning them in an iterator.
    ///
    /// The capacity is unchanged. Values not consumed before the iterator is
    /// dropped are dropped with it.
    pub fn drain(&mut self) -> Drain<'_, V> {
        Drain {
            table: self,
            cursor: 0,
        }
    }

    /// Returns detailed utilization statistics for debugging.
    ///
    /// Available in tests and with the `stats` feature.
    #[cfg(any(test, feature = "stats"))]
    pub fn debug_stats(&self) -> DebugStats {
        let capacity = self.buckets.len();
        let mut occupied_buckets = 0;
        let mut longest_chain = 0;
        for bucket in self.buckets.iter() {
            let length = chain(bucket).count();
            if length > 0 {
                occupied_buckets += 1;
            }
            longest_chain = longest_chain.max(length);
        }

        DebugStats {
            populated: self.populated,
            capacity,
            threshold: self.threshold,
            occupied_buckets,
            longest_chain,
            load: if capacity == 0 {
                0.0
            } else {
                self.populated as f64 / capacity as f64
            },
            bucket_utilization: if capacity == 0 {
                0.0
            } else {
                occupied_buckets as f64 / capacity as f64
            },
            resizes: self.resizes,
        }
    }

    /// Computes a histogram of chain lengths.
    ///
    /// Index `n` holds the number of buckets whose chain has exactly `n`
    /// entries. The result is empty before the first allocation.
    ///
    /// Available in tests and with the `stats` feature.
    #[cfg(any(test, feature = "stats"))]
    pub fn chain_histogram(&self) -> Vec<usize> {
        let mut hist = Vec::new();
        for bucket in self.buckets.iter() {
            let length = chain(bucket).count();
            if hist.len() <= length {
                hist.resize(length + 1, 0);
            }
            hist[length] += 1;
        }
        hist
    }

    /// Pretty-prints the chain-length histogram horizontally using stdout.
    ///
    /// Requires the `std` feature.
    #[cfg(all(any(test, feature = "stats"), feature = "std"))]
    pub fn print_chain_histogram(&self) {
        let hist = self.chain_histogram();
        let max = hist.iter().copied().max().unwrap_or(0);
        if max == 0 {
            println!("chain histogram: empty");
            return;
        }

        let max_bar = 60usize;
        println!(
            "chain histogram ({} entries, {} buckets):",
            self.populated,
            self.buckets.len()
        );
        for (length, &count) in hist.iter().enumerate() {
            let width = (count * max_bar).div_ceil(max);
            println!("{:>3} | {} ({})", length, "█".repeat(width), count);
        }
    }
}

/// A view into a single entry in the hash table, which may be vacant or
/// occupied.
///
/// This enum is constructed from the [`entry`] method on [`HashTable`].
///
/// [`entry`]: HashTable::entry
pub enum Entry<'a, V> {
    /// An occupied entry.
    Occupied(OccupiedEntry<'a, V>),
    /// A vacant entry.
    Vacant(VacantEntry<'a, V>),
}

impl<'a, V> Entry<'a, V> {
    /// Ensures a value is in the entry by inserting the default if empty, and
    /// returns a mutable reference to the value in the entry.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use chain_hash::hash_table::HashTable;
    /// let mut table = HashTable::new();
    ///
    /// *table.entry(3, |v: &(u64, u32)| v.0 == 3).or_insert((3, 0)) = (3, 10);
    /// assert_eq!(table.entry(3, |v| v.0 == 3).or_insert((3, 0)).1, 10);
    /// ```
    pub fn or_insert(self, default: V) -> &'a mut V {
        match self {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => entry.insert(default),
        }
    }

    /// Ensures a value is in the entry by inserting the result of the default
    /// function if empty, and returns a mutable reference to the value in the
    /// entry.
    pub fn or_insert_with(self, default: impl FnOnce() -> V) -> &'a mut V {
        match self {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => entry.insert(default()),
        }
    }

    /// Provides in-place mutable access to an occupied entry.
    ///
    /// Returns `None` if the entry is vacant.
    pub fn and_modify(self, f: impl FnOnce(&mut V)) -> Option<&'a mut V> {
        match self {
            Entry::Occupied(entry) => {
                let value = entry.into_mut();
                f(value);
                Some(value)
            }
            Entry::Vacant(_) => None,
        }
    }
}

impl<'a, V> Entry<'a, V>
where
    V: Default,
{
    /// Ensures a value is in the entry by inserting the default value if
    /// empty, and returns a mutable reference to the value in the entry.
    pub fn or_default(self) -> &'a mut V {
        self.or_insert_with(V::default)
    }
}

/// A view into an occupied entry in a [`HashTable`].
pub struct OccupiedEntry<'a, V> {
    /// The link owning the entry's node; never `None`.
    link: &'a mut Link<V>,
    populated: &'a mut usize,
}

impl<'a, V> OccupiedEntry<'a, V> {
    /// Gets a reference to the value in the entry.
    pub fn get(&self) -> &V {
        match self.link.as_deref() {
            Some(node) => &node.value,
            None => unreachable!("occupied entry without a node"),
        }
    }

    /// Gets a mutable reference to the value in the entry.
    pub fn get_mut(&mut self) -> &mut V {
        match self.link.as_deref_mut() {
            Some(node) => &mut node.value,
            None => unreachable!("occupied entry without a node"),
        }
    }

    /// Converts the entry into a mutable reference to the value in the entry
    /// with a lifetime bound to the table itself.
    pub fn into_mut(self) -> &'a mut V {
        match self.link.as_deref_mut() {
            Some(node) => &mut node.value,
            None => unreachable!("occupied entry without a node"),
        }
    }

    /// Replaces the value in the entry, returning the previous one.
    pub fn insert(&mut self, value: V) -> V {
        core::mem::replace(self.get_mut(), value)
    }

    /// Unlinks the entry from its chain and returns its value.
    pub fn remove(self) -> V {
        match self.link.take() {
            Some(node) => {
                let Node { value, next, .. } = *node;
                *self.link = next;
                *self.populated -= 1;
                value
            }
            None => unreachable!("occupied entry without a node"),
        }
    }
}

/// A view into a vacant entry in a [`HashTable`].
pub struct VacantEntry<'a, V> {
    table: &'a mut HashTable<V>,
    /// Spread hash of the value to insert.
    hash: u64,
}

impl<'a, V> VacantEntry<'a, V> {
    /// Inserts a value into the vacant entry and returns a mutable reference
    /// to it.
    ///
    /// This may allocate or grow the bucket array.
    pub fn insert(self, value: V) -> &'a mut V {
        self.table.insert_new(self.hash, value)
    }
}

/// An iterator over the values of a [`HashTable`].
///
/// Created by [`HashTable::iter`].
pub struct Iter<'a, V> {
    buckets: core::slice::Iter<'a, Link<V>>,
    node: Option<&'a Node<V>>,
    remaining: usize,
}

impl<'a, V> Iterator for Iter<'a, V> {
    type Item = &'a V;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(node) = self.node {
                self.node = node.next.as_deref();
                self.remaining -= 1;
                return Some(&node.value);
            }
            if self.remaining == 0 {
                return None;
            }
            self.node = self.buckets.next()?.as_deref();
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<V> ExactSizeIterator for Iter<'_, V> {}

impl<V> FusedIterator for Iter<'_, V> {}

/// A mutable iterator over the values of a [`HashTable`].
///
/// Created by [`HashTable::iter_mut`].
pub struct IterMut<'a, V> {
    buckets: core::slice::IterMut<'a, Link<V>>,
    node: Option<&'a mut Node<V>>,
    remaining: usize,
}

impl<'a, V> Iterator for IterMut<'a, V> {
    type Item = &'a mut V;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(node) = self.node.take() {
                self.node = node.next.as_deref_mut();
                self.remaining -= 1;
                return Some(&mut node.value);
            }
            if self.remaining == 0 {
                return None;
            }
            self.node = self.buckets.next()?.as_deref_mut();
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<V> ExactSizeIterator for IterMut<'_, V> {}

impl<V> FusedIterator for IterMut<'_, V> {}

/// A draining iterator over the values of a [`HashTable`].
///
/// Created by [`HashTable::drain`].
pub struct Drain<'a, V> {
    table: &'a mut HashTable<V>,
    cursor: usize,
}

impl<V> Iterator for Drain<'_, V> {
    type Item = V;

    fn next(&mut self) -> Option<Self::Item> {
        self.table.pop_from(&mut self.cursor)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.table.populated, Some(self.table.populated))
    }
}

impl<V> ExactSizeIterator for Drain<'_, V> {}

impl<V> FusedIterator for Drain<'_, V> {}

impl<V> Drop for Drain<'_, V> {
    fn drop(&mut self) {
        for _ in self {}
    }
}

/// An owning iterator over the values of a [`HashTable`].
pub struct IntoIter<V> {
    table: HashTable<V>,
    cursor: usize,
}

impl<V> Iterator for IntoIter<V> {
    type Item = V;

    fn next(&mut self) -> Option<Self::Item> {
        self.table.pop_from(&mut self.cursor)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.table.populated, Some(self.table.populated))
    }
}

impl<V> ExactSizeIterator for IntoIter<V> {}

impl<V> FusedIterator for IntoIter<V> {}

impl<V> IntoIterator for HashTable<V> {
    type IntoIter = IntoIter<V>;
    type Item = V;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter {
            table: self,
            cursor: 0,
        }
    }
}

impl<'a, V> IntoIterator for &'a HashTable<V> {
    type IntoIter = Iter<'a, V>;
    type Item = &'a V;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
