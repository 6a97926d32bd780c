use std::{
    borrow::Borrow,
    fmt,
    hash::Hash,
};

use tracing::debug;

use crate::{
    CacheConfig,
    Cursor,
    Error,
    Iter,
    Keys,
    LinkedMap,
    Policy,
    Result,
    Touch,
    Values,
    config::{
        DEFAULT_RATIO,
        check_limit,
        clamp_ratio,
    },
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Active,
    Disposed,
}

/// A [`LinkedMap`] bounded to `limit` entries.
///
/// When a write pushes the cache over its limit, the [`Policy`] evicts down to
/// `round(limit * ratio)` entries in one burst. A ratio of `1.0` evicts just
/// enough to fit; smaller ratios free headroom so the next writes do not
/// evict again.
///
/// Reads through [`get`](Cache::get) mark the entry as new. Plain
/// [`set`](Cache::set) calls update existing keys in place.
///
/// After [`dispose`](Cache::dispose) every operation other than
/// [`is_disposed`](Cache::is_disposed) and `dispose` itself fails with
/// [`Error::ResourceDisposed`].
///
/// # Examples
///
/// ```rust
/// use lincache::Cache;
///
/// let mut cache = Cache::lru(3).unwrap();
/// cache.set("a", 1).unwrap();
/// cache.set("b", 2).unwrap();
/// cache.set("c", 3).unwrap();
///
/// cache.get(&"a").unwrap();
/// cache.set("d", 4).unwrap();
///
/// assert_eq!(
///     cache.keys().unwrap().copied().collect::<Vec<_>>(),
///     ["c", "a", "d"]
/// );
/// ```
#[derive(Clone)]
pub struct Cache<K, V> {
    map: LinkedMap<K, V>,
    limit: usize,
    ratio: f64,
    policy: Policy,
    state: State,
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for Cache<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cache")
            .field("policy", &self.policy)
            .field("limit", &self.limit)
            .field("ratio", &self.ratio)
            .field("disposed", &self.is_disposed())
            .field("map", &self.map)
            .finish()
    }
}

impl<K: Hash + Eq, V> Cache<K, V> {
    /// Creates an empty cache that evicts down to exactly `limit` entries.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidArgument`] if `limit` is `usize::MAX - 1` or larger.
    pub fn new(limit: usize, policy: Policy) -> Result<Self> {
        Self::with_ratio(limit, DEFAULT_RATIO, policy)
    }

    /// Creates an empty cache with a custom eviction ratio.
    ///
    /// `ratio` is clamped into `[0, 1]`.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidArgument`] for an oversized `limit` or a NaN `ratio`.
    pub fn with_ratio(limit: usize, ratio: f64, policy: Policy) -> Result<Self> {
        Ok(Self {
            map: LinkedMap::new(),
            limit: check_limit(limit)?,
            ratio: clamp_ratio(ratio)?,
            policy,
            state: State::Active,
        })
    }

    /// Shorthand for `Cache::new(limit, Policy::Lru)`.
    pub fn lru(limit: usize) -> Result<Self> {
        Self::new(limit, Policy::Lru)
    }

    /// Shorthand for `Cache::new(limit, Policy::Mru)`.
    pub fn mru(limit: usize) -> Result<Self> {
        Self::new(limit, Policy::Mru)
    }

    /// Creates a cache and writes `pairs` into it in order, as if by
    /// [`set`](Cache::set).
    pub fn from_pairs<I>(limit: usize, ratio: f64, policy: Policy, pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
    {
        let mut cache = Self::with_ratio(limit, ratio, policy)?;
        cache.try_extend(pairs)?;
        Ok(cache)
    }

    /// Writes every pair through [`set`](Cache::set).
    pub fn try_extend<I>(&mut self, pairs: I) -> Result<()>
    where
        I: IntoIterator<Item = (K, V)>,
    {
        for (key, value) in pairs {
            self.set(key, value)?;
        }
        Ok(())
    }

    /// Looks up `key` and marks it as the newest entry.
    pub fn get<Q>(&mut self, key: &Q) -> Result<Option<&V>>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.get_with(key, Touch::AsNew)
    }

    /// Looks up `key`, reordering it according to `touch`.
    pub fn get_with<Q>(&mut self, key: &Q, touch: Touch) -> Result<Option<&V>>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.ensure_active()?;
        Ok(self.map.get(key, touch))
    }

    /// Looks up `key` without reordering.
    pub fn peek<Q>(&self, key: &Q) -> Result<Option<&V>>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.ensure_active()?;
        Ok(self.map.peek(key))
    }

    /// Returns `true` if `key` is cached.
    pub fn contains_key<Q>(&self, key: &Q) -> Result<bool>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.ensure_active()?;
        Ok(self.map.contains_key(key))
    }

    /// Inserts `key` or replaces its value in place, then evicts if the cache
    /// went over its limit. Returns the previous value.
    pub fn set(&mut self, key: K, value: V) -> Result<Option<V>> {
        self.set_with(key, value, Touch::None)
    }

    /// Like [`set`](Cache::set) but also reorders the entry according to
    /// `touch`.
    pub fn set_with(&mut self, key: K, value: V, touch: Touch) -> Result<Option<V>> {
        self.ensure_active()?;
        let target = self.trim_target();
        let evicted = self
            .policy
            .before_insert(&mut self.map, &key, self.limit, target);
        if !evicted.is_empty() {
            debug!(
                policy = %self.policy,
                limit = self.limit,
                evicted = evicted.len(),
                "made room before insert"
            );
        }

        let previous = self.map.set(key, value, touch);
        self.check_trim();
        Ok(previous)
    }

    /// Removes `key` and returns its value.
    pub fn remove<Q>(&mut self, key: &Q) -> Result<Option<V>>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.ensure_active()?;
        Ok(self.map.remove(key))
    }
}

impl<K, V> Cache<K, V> {
    /// Maximum number of entries.
    pub fn limit(&self) -> Result<usize> {
        self.ensure_active()?;
        Ok(self.limit)
    }

    /// Changes the limit, evicting immediately if the cache is now too big.
    pub fn set_limit(&mut self, limit: usize) -> Result<()> {
        self.ensure_active()?;
        self.limit = check_limit(limit)?;
        debug!(limit, "cache limit changed");
        self.check_trim();
        Ok(())
    }

    /// Fraction of the limit kept after an eviction burst.
    pub fn ratio(&self) -> Result<f64> {
        self.ensure_active()?;
        Ok(self.ratio)
    }

    /// Changes the ratio, clamped into `[0, 1]`.
    pub fn set_ratio(&mut self, ratio: f64) -> Result<()> {
        self.ensure_active()?;
        self.ratio = clamp_ratio(ratio)?;
        debug!(ratio = self.ratio, "cache ratio changed");
        self.check_trim();
        Ok(())
    }

    /// The eviction policy.
    pub fn policy(&self) -> Result<Policy> {
        self.ensure_active()?;
        Ok(self.policy)
    }

    /// The current limit, ratio and policy.
    pub fn config(&self) -> Result<CacheConfig> {
        self.ensure_active()?;
        Ok(CacheConfig {
            limit: self.limit,
            ratio: self.ratio,
            policy: self.policy,
        })
    }

    /// Releases all entries and retires the cache. Calling it again does
    /// nothing.
    pub fn dispose(&mut self) {
        if self.state == State::Disposed {
            return;
        }
        let released = self.map.len();
        self.map.clear();
        self.map.shrink_to_fit();
        self.state = State::Disposed;
        debug!(released, "cache disposed");
    }

    /// Returns `true` once [`dispose`](Cache::dispose) was called.
    pub fn is_disposed(&self) -> bool {
        self.state == State::Disposed
    }

    /// Removes and returns the oldest entry.
    pub fn shift(&mut self) -> Result<Option<(K, V)>> {
        self.ensure_active()?;
        self.map.shift()
    }

    /// Removes every entry. The cache stays usable.
    pub fn clear(&mut self) -> Result<()> {
        self.ensure_active()?;
        self.map.clear();
        Ok(())
    }

    /// Number of cached entries.
    pub fn len(&self) -> Result<usize> {
        self.ensure_active()?;
        Ok(self.map.len())
    }

    /// Returns `true` if nothing is cached.
    pub fn is_empty(&self) -> Result<bool> {
        self.ensure_active()?;
        Ok(self.map.is_empty())
    }

    /// Value of the oldest entry.
    pub fn first(&self) -> Result<Option<&V>> {
        self.ensure_active()?;
        Ok(self.map.first())
    }

    /// Value of the newest entry.
    pub fn last(&self) -> Result<Option<&V>> {
        self.ensure_active()?;
        Ok(self.map.last())
    }

    /// Entries from oldest to newest.
    pub fn iter(&self) -> Result<Iter<'_, K, V>> {
        self.ensure_active()?;
        Ok(self.map.iter())
    }

    /// Keys from oldest to newest.
    pub fn keys(&self) -> Result<Keys<'_, K, V>> {
        self.ensure_active()?;
        Ok(self.map.keys())
    }

    /// Values from oldest to newest.
    pub fn values(&self) -> Result<Values<'_, K, V>> {
        self.ensure_active()?;
        Ok(self.map.values())
    }

    /// A detached cursor over the entries. Step it with
    /// [`as_map`](Cache::as_map).
    pub fn cursor(&self) -> Result<Cursor> {
        self.ensure_active()?;
        Ok(self.map.cursor())
    }

    /// Read-only view of the underlying map.
    pub fn as_map(&self) -> Result<&LinkedMap<K, V>> {
        self.ensure_active()?;
        Ok(&self.map)
    }

    /// Calls `f` for every key from oldest to newest, giving it mutable
    /// access to the cache.
    ///
    /// # Errors
    ///
    /// [`Error::ConcurrentModification`] once `f` changed the cache
    /// structurally. Reads that reorder count as changes.
    pub fn for_each<F>(&mut self, mut f: F) -> Result<()>
    where
        K: Clone,
        F: FnMut(&mut Self, &K),
    {
        self.ensure_active()?;
        let mut cursor = self.map.cursor();
        while let Some(key) = cursor.next_key(&self.map)?.cloned() {
            f(self, &key);
            cursor.validate(&self.map)?;
        }
        Ok(())
    }

    /// Ordered `(key, value)` pairs, oldest first.
    pub fn to_pairs(&self) -> Result<Vec<(K, V)>>
    where
        K: Clone,
        V: Clone,
    {
        self.ensure_active()?;
        Ok(self.map.to_pairs())
    }

    fn ensure_active(&self) -> Result<()> {
        match self.state {
            State::Active => Ok(()),
            State::Disposed => Err(Error::ResourceDisposed),
        }
    }

    fn trim_target(&self) -> usize {
        ((self.limit as f64 * self.ratio).round() as usize).min(self.limit)
    }

    fn check_trim(&mut self) {
        if self.map.len() <= self.limit {
            return;
        }
        let target = self.trim_target();
        let evicted = self.policy.trim(&mut self.map, target);
        debug!(
            policy = %self.policy,
            limit = self.limit,
            target,
            evicted = evicted.len(),
            "evicted entries"
        );
    }
}
