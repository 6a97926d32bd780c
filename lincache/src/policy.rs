use std::{
    fmt,
    hash::Hash,
};

use crate::{
    LinkedMap,
    lru,
    mru,
};

/// Eviction strategy of a [`Cache`](crate::Cache).
///
/// Both policies keep entries in a [`LinkedMap`] ordered from old to new and
/// differ only in which end they give up when the cache overflows.
///
/// | Policy | Evicts from | Pre-evicts on insert |
/// |--------|-------------|----------------------|
/// | [`Lru`](Policy::Lru) | old end | no |
/// | [`Mru`](Policy::Mru) | new end | yes, when full |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Policy {
    /// Least recently used. Overflow evicts the entries touched longest ago.
    #[default]
    Lru,
    /// Most recently used. Overflow evicts the entries touched last, and a
    /// full cache makes room before accepting a new key.
    Mru,
}

impl Policy {
    /// Shrinks `map` to `target` entries from the end this policy evicts.
    pub(crate) fn trim<K, V>(self, map: &mut LinkedMap<K, V>, target: usize) -> Vec<(K, V)> {
        match self {
            Policy::Lru => lru::trim(map, target),
            Policy::Mru => mru::trim(map, target),
        }
    }

    /// Runs before `key` is written into a cache holding at most `limit`
    /// entries, whose trim target is `target`.
    pub(crate) fn before_insert<K: Hash + Eq, V>(
        self,
        map: &mut LinkedMap<K, V>,
        key: &K,
        limit: usize,
        target: usize,
    ) -> Vec<(K, V)> {
        match self {
            Policy::Lru => Vec::new(),
            Policy::Mru => mru::make_room(map, key, limit, target),
        }
    }
}

impl fmt::Display for Policy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Policy::Lru => f.write_str("lru"),
            Policy::Mru => f.write_str("mru"),
        }
    }
}
