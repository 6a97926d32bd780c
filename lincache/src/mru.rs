use std::hash::Hash;

use tracing::trace;

use crate::LinkedMap;

/// Evicts from the new end.
pub(crate) fn trim<K, V>(map: &mut LinkedMap<K, V>, target: usize) -> Vec<(K, V)> {
    map.trim_new(target)
}

/// Drops the newest entries of a full map so that `key` fits afterwards.
///
/// Existing keys are updated in place and never cause an eviction.
pub(crate) fn make_room<K: Hash + Eq, V>(
    map: &mut LinkedMap<K, V>,
    key: &K,
    limit: usize,
    target: usize,
) -> Vec<(K, V)> {
    if map.len() < limit || map.contains_key(key) {
        return Vec::new();
    }

    let keep = target.saturating_sub(1);
    trace!(len = map.len(), limit, keep, "mru making room for a new key");
    map.trim_new(keep)
}
