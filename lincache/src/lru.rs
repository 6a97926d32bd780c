use crate::LinkedMap;

/// Evicts from the old end.
pub(crate) fn trim<K, V>(map: &mut LinkedMap<K, V>, target: usize) -> Vec<(K, V)> {
    map.trim_old(target)
}

#[cfg(test)]
mod tests {
    use ntest::timeout;

    use crate::{
        Cache,
        LinkedMap,
        Touch,
    };

    #[test]
    #[timeout(1000)]
    fn test_lru_trim_keeps_newest() {
        let mut map: LinkedMap<i32, i32> = (0..5).map(|i| (i, i)).collect();
        let evicted = super::trim(&mut map, 2);
        assert_eq!(evicted, [(0, 0), (1, 1), (2, 2)]);
        assert_eq!(map.keys().copied().collect::<Vec<_>>(), [3, 4]);
    }

    #[test]
    #[timeout(1000)]
    fn test_lru_trivial() {
        let mut lru = Cache::lru(3).unwrap();
        lru.set("a", 1).unwrap();
        lru.set("b", 2).unwrap();
        lru.set("c", 3).unwrap();

        assert_eq!(lru.get(&"a"), Ok(Some(&1)));
        assert_eq!(lru.get(&"b"), Ok(Some(&2)));
        assert_eq!(lru.get(&"c"), Ok(Some(&3)));

        lru.get(&"a").unwrap();
        lru.set("d", 4).unwrap();

        assert_eq!(lru.get(&"a"), Ok(Some(&1)));
        assert_eq!(lru.get(&"b"), Ok(None));
    }

    #[test]
    #[timeout(1000)]
    fn test_lru_update_does_not_refresh() {
        let mut lru = Cache::lru(2).unwrap();
        lru.set("a", 1).unwrap();
        lru.set("b", 2).unwrap();
        lru.set("a", 10).unwrap();
        lru.set("c", 3).unwrap();

        assert_eq!(lru.to_pairs(), Ok(vec![("b", 2), ("c", 3)]));
    }

    #[test]
    #[timeout(1000)]
    fn test_lru_set_with_touch_refreshes() {
        let mut lru = Cache::lru(2).unwrap();
        lru.set("a", 1).unwrap();
        lru.set("b", 2).unwrap();
        lru.set_with("a", 10, Touch::AsNew).unwrap();
        lru.set("c", 3).unwrap();

        assert_eq!(lru.to_pairs(), Ok(vec![("a", 10), ("c", 3)]));
    }
}
