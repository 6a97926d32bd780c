mod cursor;
mod iter;

use std::{
    borrow::Borrow,
    fmt,
    hash::{
        BuildHasher,
        Hash,
    },
    sync::atomic::{
        AtomicU64,
        Ordering,
    },
};

pub use cursor::Cursor;
use hashbrown::HashTable;
pub use iter::{
    IntoIter,
    Iter,
    Keys,
    Values,
};
use slab::Slab;

use crate::{
    Error,
    RandomState,
    Result,
};

/// Where an entry is moved when it is read or written.
///
/// The map has two ends: the *old* end (`head`, visited first by traversal)
/// and the *new* end (`tail`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Touch {
    /// Leave the order alone. New entries are appended at the new end.
    #[default]
    None,
    /// Move the entry to the old end.
    AsOld,
    /// Move the entry to the new end.
    AsNew,
}

#[derive(Clone, Copy, PartialEq, Eq)]
#[repr(transparent)]
pub(crate) struct Ptr(usize);

impl fmt::Debug for Ptr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_null() {
            write!(f, "Ptr(null)")
        } else {
            write!(f, "Ptr({})", self.0)
        }
    }
}

impl Ptr {
    pub(crate) const NULL: Ptr = Ptr(usize::MAX);

    fn from_index(index: usize) -> Self {
        debug_assert_ne!(index, usize::MAX, "Index must not be usize::MAX");
        Ptr(index)
    }

    pub(crate) fn is_null(self) -> bool {
        self == Ptr::NULL
    }

    pub(crate) fn get(self) -> Option<usize> {
        if self.is_null() { None } else { Some(self.0) }
    }

    fn index(self) -> usize {
        self.0
    }
}

static NEXT_MAP_ID: AtomicU64 = AtomicU64::new(0);

fn next_map_id() -> u64 {
    NEXT_MAP_ID.fetch_add(1, Ordering::Relaxed)
}

#[derive(Debug, Clone)]
struct Node<K, V> {
    key: K,
    value: V,
    hash: u64,
    prev: Ptr,
    next: Ptr,
}

/// A hash map that remembers the order in which its entries were inserted or
/// touched.
///
/// Entries live in a slab arena and are chained through index links, so
/// removing or evicting an entry can never leave a dangling link behind. The
/// hash table only stores arena indices.
///
/// Every structural change (insertion, removal, reordering, clearing)
/// increments a generation counter. Detached [`Cursor`]s and
/// [`for_each`](LinkedMap::for_each) compare against it to detect the map
/// being modified underneath a traversal.
///
/// # Examples
///
/// ```rust
/// use lincache::{
///     LinkedMap,
///     Touch,
/// };
///
/// let mut map = LinkedMap::new();
/// map.set("a", 1, Touch::None);
/// map.set("b", 2, Touch::None);
/// map.set("c", 3, Touch::None);
///
/// // Reading with a touch moves the entry to the new end.
/// assert_eq!(map.get(&"a", Touch::AsNew), Some(&1));
/// assert_eq!(map.keys().copied().collect::<Vec<_>>(), ["b", "c", "a"]);
///
/// assert_eq!(map.shift().unwrap(), Some(("b", 2)));
/// assert_eq!(map.to_pairs(), [("c", 3), ("a", 1)]);
/// ```
pub struct LinkedMap<K, V> {
    head: Ptr,
    tail: Ptr,
    nodes: Slab<Node<K, V>>,
    table: HashTable<Ptr>,
    hasher: RandomState,
    generation: u64,
    id: u64,
}

impl<K: Clone, V: Clone> Clone for LinkedMap<K, V> {
    /// The clone gets its own identity, so cursors of `self` are rejected by
    /// it.
    fn clone(&self) -> Self {
        Self {
            head: self.head,
            tail: self.tail,
            nodes: self.nodes.clone(),
            table: self.table.clone(),
            hasher: self.hasher.clone(),
            generation: self.generation,
            id: next_map_id(),
        }
    }
}

impl<K, V> Default for LinkedMap<K, V> {
    fn default() -> Self {
        Self {
            head: Ptr::NULL,
            tail: Ptr::NULL,
            nodes: Slab::new(),
            table: HashTable::new(),
            hasher: RandomState::default(),
            generation: 0,
            id: next_map_id(),
        }
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for LinkedMap<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        struct Entries<'a, K, V>(&'a LinkedMap<K, V>);

        impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for Entries<'_, K, V> {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.debug_map().entries(self.0.iter()).finish()
            }
        }

        f.debug_struct("LinkedMap")
            .field("len", &self.len())
            .field("generation", &self.generation)
            .field("entries", &Entries(self))
            .finish()
    }
}

impl<K, V> LinkedMap<K, V> {
    /// Creates an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty map with room for `capacity` entries.
    pub fn with_capacity(capacity: usize) -> Self {
        assert!(capacity < usize::MAX - 1, "Capacity too large");
        Self {
            nodes: Slab::with_capacity(capacity),
            table: HashTable::with_capacity(capacity),
            ..Self::default()
        }
    }

    /// Number of entries in the map.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns `true` if the map holds no entries.
    pub fn is_empty(&self) -> bool {
        self.head.is_null() && self.tail.is_null()
    }

    /// The current structural generation.
    ///
    /// Strictly increases on every insertion, removal, reorder and clear.
    /// Replacing the value of an existing entry without moving it leaves the
    /// generation unchanged.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Value at the old end, without reordering.
    pub fn first(&self) -> Option<&V> {
        self.head.get().map(|index| &self.nodes[index].value)
    }

    /// Value at the new end, without reordering.
    pub fn last(&self) -> Option<&V> {
        self.tail.get().map(|index| &self.nodes[index].value)
    }

    /// Removes and returns the entry at the old end.
    ///
    /// # Errors
    ///
    /// [`Error::InternalInvariantViolation`] if only one of the two ends is
    /// set. The map is left untouched in that case.
    pub fn shift(&mut self) -> Result<Option<(K, V)>> {
        let Some((head, _)) = self.ends()? else {
            return Ok(None);
        };
        let entry = self.detach(head);
        self.bump();
        Ok(Some(entry))
    }

    /// Removes every entry.
    pub fn clear(&mut self) {
        self.table.clear();
        self.nodes.clear();
        self.head = Ptr::NULL;
        self.tail = Ptr::NULL;
        self.bump();
    }

    /// Removes entries from the old end until `len() == size`.
    ///
    /// Returns the evicted entries, oldest first. Does nothing when `size`
    /// is not smaller than the current length.
    pub fn trim_old(&mut self, size: usize) -> Vec<(K, V)> {
        if size >= self.len() {
            return Vec::new();
        }

        let mut evicted = Vec::with_capacity(self.len() - size);
        while self.len() > size {
            let Some(_) = self.head.get() else {
                break;
            };
            evicted.push(self.detach(self.head));
        }
        self.bump();
        evicted
    }

    /// Removes entries from the new end until `len() == size`.
    ///
    /// Returns the evicted entries, newest first. Does nothing when `size`
    /// is not smaller than the current length.
    pub fn trim_new(&mut self, size: usize) -> Vec<(K, V)> {
        if size >= self.len() {
            return Vec::new();
        }

        let mut evicted = Vec::with_capacity(self.len() - size);
        while self.len() > size {
            let Some(_) = self.tail.get() else {
                break;
            };
            evicted.push(self.detach(self.tail));
        }
        self.bump();
        evicted
    }

    /// Borrowing iterator over `(key, value)` pairs, oldest first.
    ///
    /// The shared borrow rules out mutation while the iterator is alive. Use
    /// a [`Cursor`] to traverse across mutations.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter::new(&self.nodes, self.head, self.tail)
    }

    /// Borrowing iterator over the keys, oldest first.
    pub fn keys(&self) -> Keys<'_, K, V> {
        Keys::new(self.iter())
    }

    /// Borrowing iterator over the values, oldest first.
    pub fn values(&self) -> Values<'_, K, V> {
        Values::new(self.iter())
    }

    /// Starts a detached traversal at the current old end.
    ///
    /// The cursor does not borrow the map; every step takes the map again and
    /// fails with [`Error::ConcurrentModification`] if the map changed
    /// structurally since this call.
    ///
    /// ```rust
    /// use lincache::{
    ///     Error,
    ///     LinkedMap,
    ///     Touch,
    /// };
    ///
    /// let mut map: LinkedMap<_, _> = [(1, "one"), (2, "two")].into_iter().collect();
    ///
    /// let mut cursor = map.cursor();
    /// assert_eq!(cursor.next_key(&map), Ok(Some(&1)));
    ///
    /// map.set(3, "three", Touch::None);
    /// assert!(matches!(
    ///     cursor.next_key(&map),
    ///     Err(Error::ConcurrentModification { .. })
    /// ));
    /// ```
    pub fn cursor(&self) -> Cursor {
        Cursor::new(self.head, self.generation, self.id)
    }

    /// Calls `f` once per entry, oldest first, handing it mutable access to
    /// the map together with the current key.
    ///
    /// # Errors
    ///
    /// [`Error::ConcurrentModification`] as soon as a call to `f` changed the
    /// map structurally. The check also runs after the last entry.
    pub fn for_each<F>(&mut self, mut f: F) -> Result<()>
    where
        K: Clone,
        F: FnMut(&mut Self, &K),
    {
        let mut cursor = self.cursor();
        while let Some(key) = cursor.next_key(&*self)?.cloned() {
            f(self, &key);
            cursor.validate(&*self)?;
        }
        Ok(())
    }

    /// The entries as ordered `(key, value)` pairs, oldest first.
    pub fn to_pairs(&self) -> Vec<(K, V)>
    where
        K: Clone,
        V: Clone,
    {
        self.iter()
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect()
    }

    /// Releases spare capacity in the arena and the hash table.
    pub fn shrink_to_fit(&mut self) {
        let nodes = &self.nodes;
        self.table.shrink_to_fit(|ptr| nodes[ptr.index()].hash);
        self.nodes.shrink_to_fit();
    }

    fn bump(&mut self) {
        self.generation += 1;
    }

    fn ends(&self) -> Result<Option<(Ptr, Ptr)>> {
        match (self.head.is_null(), self.tail.is_null()) {
            (true, true) => Ok(None),
            (false, false) => Ok(Some((self.head, self.tail))),
            _ => Err(Error::InternalInvariantViolation(
                "head and tail disagree about emptiness",
            )),
        }
    }

    fn link_head(&mut self, ptr: Ptr) {
        let old_head = self.head;
        let node = &mut self.nodes[ptr.index()];
        node.prev = Ptr::NULL;
        node.next = old_head;
        match old_head.get() {
            Some(index) => self.nodes[index].prev = ptr,
            None => self.tail = ptr,
        }
        self.head = ptr;
    }

    fn link_tail(&mut self, ptr: Ptr) {
        let old_tail = self.tail;
        let node = &mut self.nodes[ptr.index()];
        node.prev = old_tail;
        node.next = Ptr::NULL;
        match old_tail.get() {
            Some(index) => self.nodes[index].next = ptr,
            None => self.head = ptr,
        }
        self.tail = ptr;
    }

    fn unlink(&mut self, ptr: Ptr) {
        let node = &mut self.nodes[ptr.index()];
        let (prev, next) = (node.prev, node.next);
        node.prev = Ptr::NULL;
        node.next = Ptr::NULL;

        match prev.get() {
            Some(index) => self.nodes[index].next = next,
            None => self.head = next,
        }
        match next.get() {
            Some(index) => self.nodes[index].prev = prev,
            None => self.tail = prev,
        }
    }

    /// Unlinks `ptr`, drops it from the table and frees its slot. Does not
    /// bump the generation so bulk removals count once.
    fn detach(&mut self, ptr: Ptr) -> (K, V) {
        self.unlink(ptr);
        let node = self.nodes.remove(ptr.index());
        match self.table.find_entry(node.hash, |candidate| *candidate == ptr) {
            Ok(occupied) => {
                occupied.remove();
            }
            Err(_) => {
                #[cfg(debug_assertions)]
                unreachable!("Pointer not found in table: {ptr:?}");
            }
        }
        (node.key, node.value)
    }

    /// Moves `ptr` to the end selected by `touch`. Returns whether the order
    /// changed.
    fn touch(&mut self, ptr: Ptr, touch: Touch) -> bool {
        debug_assert!(!self.is_empty(), "Touching an entry of an empty map");
        match touch {
            Touch::None => false,
            Touch::AsOld if self.head == ptr => false,
            Touch::AsNew if self.tail == ptr => false,
            Touch::AsOld => {
                self.unlink(ptr);
                self.link_head(ptr);
                self.bump();
                true
            }
            Touch::AsNew => {
                self.unlink(ptr);
                self.link_tail(ptr);
                self.bump();
                true
            }
        }
    }
}

impl<K: Hash + Eq, V> LinkedMap<K, V> {
    /// Builds a map from ordered pairs. Later duplicates replace the value of
    /// the first occurrence without moving it.
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
    {
        pairs.into_iter().collect()
    }

    /// Returns `true` if `key` is present.
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.find(key).is_some()
    }

    /// Looks up `key`, moving its entry according to `touch` first.
    pub fn get<Q>(&mut self, key: &Q, touch: Touch) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let ptr = self.find(key)?;
        self.touch(ptr, touch);
        Some(&self.nodes[ptr.index()].value)
    }

    /// Looks up `key` without affecting the order.
    pub fn peek<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.find(key).map(|ptr| &self.nodes[ptr.index()].value)
    }

    /// Mutable access to the value of `key` without affecting the order.
    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let ptr = self.find(key)?;
        Some(&mut self.nodes[ptr.index()].value)
    }

    /// Inserts or updates `key`.
    ///
    /// A new key is linked at the old end for [`Touch::AsOld`] and at the new
    /// end otherwise. An existing key keeps its position unless `touch` asks
    /// for a move. Returns the replaced value, if any.
    pub fn set(&mut self, key: K, value: V, touch: Touch) -> Option<V> {
        let hash = self.hasher.hash_one(&key);
        let nodes = &self.nodes;
        if let Some(ptr) = self
            .table
            .find(hash, |ptr| nodes[ptr.index()].key == key)
            .copied()
        {
            let previous = std::mem::replace(&mut self.nodes[ptr.index()].value, value);
            self.touch(ptr, touch);
            return Some(previous);
        }

        let ptr = Ptr::from_index(self.nodes.insert(Node {
            key,
            value,
            hash,
            prev: Ptr::NULL,
            next: Ptr::NULL,
        }));
        let nodes = &self.nodes;
        self.table
            .insert_unique(hash, ptr, |ptr| nodes[ptr.index()].hash);

        match touch {
            Touch::AsOld => self.link_head(ptr),
            Touch::None | Touch::AsNew => self.link_tail(ptr),
        }
        self.bump();
        None
    }

    /// Removes `key` and returns its value.
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.remove_entry(key).map(|(_, value)| value)
    }

    /// Removes `key` and returns the stored key and value.
    pub fn remove_entry<Q>(&mut self, key: &Q) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let ptr = self.find(key)?;
        let entry = self.detach(ptr);
        self.bump();
        Some(entry)
    }

    fn find<Q>(&self, key: &Q) -> Option<Ptr>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        if self.nodes.is_empty() {
            return None;
        }
        let hash = self.hasher.hash_one(key);
        self.table
            .find(hash, |ptr| key.eq(self.nodes[ptr.index()].key.borrow()))
            .copied()
    }

    /// Checks every structural invariant. This walks the whole map and is
    /// only meant for tests and fuzzing.
    #[cfg(all(debug_assertions, feature = "internal-debugging"))]
    pub fn debug_validate(&self) {
        if self.nodes.is_empty() {
            assert!(self.head.is_null(), "Empty map should not have a head");
            assert!(self.tail.is_null(), "Empty map should not have a tail");
            assert_eq!(self.table.len(), 0, "Empty map should have an empty table");
            return;
        }

        assert!(!self.head.is_null(), "Non-empty map is missing its head");
        assert!(!self.tail.is_null(), "Non-empty map is missing its tail");
        assert_eq!(
            self.table.len(),
            self.nodes.len(),
            "Table and arena should have the same length"
        );

        let mut prev = Ptr::NULL;
        let mut ptr = self.head;
        let mut walked = 0;
        while let Some(index) = ptr.get() {
            let node = &self.nodes[index];
            assert_eq!(node.prev, prev, "Broken back link at {ptr:?}");
            assert_eq!(
                self.find(&node.key),
                Some(ptr),
                "Table does not resolve the key stored at {ptr:?}"
            );
            assert_eq!(
                node.hash,
                self.hasher.hash_one(&node.key),
                "Stale hash at {ptr:?}"
            );
            walked += 1;
            assert!(walked <= self.nodes.len(), "Cycle in the forward chain");
            prev = ptr;
            ptr = node.next;
        }
        assert_eq!(prev, self.tail, "Forward walk should end at the tail");
        assert_eq!(walked, self.nodes.len(), "Forward walk missed entries");
    }
}

impl<K: PartialEq, V: PartialEq> PartialEq for LinkedMap<K, V> {
    /// Maps are equal when they hold the same pairs in the same order.
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl<K: Eq, V: Eq> Eq for LinkedMap<K, V> {}

impl<K: Hash + Eq, V> FromIterator<(K, V)> for LinkedMap<K, V> {
    fn from_iter<I>(iter: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
    {
        let mut map = Self::new();
        map.extend(iter);
        map
    }
}

impl<K: Hash + Eq, V> Extend<(K, V)> for LinkedMap<K, V> {
    fn extend<I>(&mut self, iter: I)
    where
        I: IntoIterator<Item = (K, V)>,
    {
        for (key, value) in iter {
            self.set(key, value, Touch::None);
        }
    }
}

impl<K, V> IntoIterator for LinkedMap<K, V> {
    type IntoIter = IntoIter<K, V>;
    type Item = (K, V);

    fn into_iter(self) -> Self::IntoIter {
        IntoIter::new(self.nodes, self.head, self.tail)
    }
}

impl<'a, K, V> IntoIterator for &'a LinkedMap<K, V> {
    type IntoIter = Iter<'a, K, V>;
    type Item = (&'a K, &'a V);

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
