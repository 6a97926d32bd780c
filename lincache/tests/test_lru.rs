use lincache::{
    Cache,
    Policy,
    Touch,
};

fn keys(cache: &Cache<i32, String>) -> Vec<i32> {
    cache.keys().unwrap().copied().collect()
}

fn filled(limit: usize, ratio: f64, n: i32) -> Cache<i32, String> {
    Cache::from_pairs(
        limit,
        ratio,
        Policy::Lru,
        (1..=n).map(|i| (i, i.to_string())),
    )
    .unwrap()
}

#[test]
fn test_lru_new_empty() {
    let cache = Cache::<i32, String>::lru(3).unwrap();
    assert_eq!(cache.len(), Ok(0));
    assert_eq!(cache.is_empty(), Ok(true));
    assert_eq!(cache.limit(), Ok(3));
    assert_eq!(cache.to_pairs(), Ok(vec![]));
}

#[test]
fn test_lru_insert_multiple() {
    let cache = filled(3, 1.0, 3);
    assert_eq!(cache.len(), Ok(3));
    assert_eq!(
        cache.to_pairs().unwrap(),
        vec![
            (1, "1".to_string()),
            (2, "2".to_string()),
            (3, "3".to_string())
        ]
    );
}

#[test]
fn test_lru_insert_overflow() {
    let mut cache = filled(3, 1.0, 3);
    cache.set(4, "4".to_string()).unwrap();
    assert_eq!(keys(&cache), [2, 3, 4]);
}

#[test]
fn test_lru_refresh_on_get() {
    let mut cache = filled(3, 1.0, 3);
    assert_eq!(cache.get(&1), Ok(Some(&"1".to_string())));
    cache.set(4, "4".to_string()).unwrap();
    assert_eq!(keys(&cache), [3, 1, 4]);
}

#[test]
fn test_lru_peek_does_not_refresh() {
    let mut cache = filled(3, 1.0, 3);
    assert_eq!(cache.peek(&1), Ok(Some(&"1".to_string())));
    cache.set(4, "4".to_string()).unwrap();
    assert_eq!(keys(&cache), [2, 3, 4]);
}

#[test]
fn test_lru_get_with_as_old_marks_for_eviction() {
    let mut cache = filled(3, 1.0, 3);
    cache.get_with(&3, Touch::AsOld).unwrap();
    cache.set(4, "4".to_string()).unwrap();
    assert_eq!(keys(&cache), [1, 2, 4]);
}

#[test]
fn test_lru_update_replaces_in_place() {
    let mut cache = filled(3, 1.0, 3);
    assert_eq!(cache.set(1, "one".to_string()), Ok(Some("1".to_string())));
    assert_eq!(keys(&cache), [1, 2, 3]);

    cache.set(4, "4".to_string()).unwrap();
    assert_eq!(keys(&cache), [2, 3, 4]);
}

#[test]
fn test_lru_ratio_evicts_in_bursts() {
    let mut cache = filled(10, 0.5, 10);
    cache.set(11, "11".to_string()).unwrap();
    assert_eq!(keys(&cache), [7, 8, 9, 10, 11]);

    for i in 12..=16 {
        cache.set(i, i.to_string()).unwrap();
    }
    assert_eq!(cache.len(), Ok(10));

    cache.set(17, "17".to_string()).unwrap();
    assert_eq!(keys(&cache), [13, 14, 15, 16, 17]);
}

#[test]
fn test_lru_ratio_zero_empties() {
    let mut cache = filled(3, 0.0, 3);
    cache.set(4, "4".to_string()).unwrap();
    assert_eq!(cache.is_empty(), Ok(true));
}

#[test]
fn test_lru_shift_and_remove() {
    let mut cache = filled(5, 1.0, 4);
    assert_eq!(cache.shift(), Ok(Some((1, "1".to_string()))));
    assert_eq!(cache.remove(&3), Ok(Some("3".to_string())));
    assert_eq!(cache.remove(&3), Ok(None));
    assert_eq!(keys(&cache), [2, 4]);
    assert_eq!(cache.first(), Ok(Some(&"2".to_string())));
    assert_eq!(cache.last(), Ok(Some(&"4".to_string())));
}

#[test]
fn test_lru_shrink_limit() {
    let mut cache = filled(5, 1.0, 5);
    cache.get(&2).unwrap();
    cache.set_limit(2).unwrap();
    assert_eq!(keys(&cache), [5, 2]);
}

#[test]
fn test_lru_clear_keeps_cache_usable() {
    let mut cache = filled(3, 1.0, 3);
    cache.clear().unwrap();
    assert_eq!(cache.len(), Ok(0));
    cache.set(9, "9".to_string()).unwrap();
    assert_eq!(keys(&cache), [9]);
}
