#![no_main]

use fuzz_lib::{
    CacheOperation,
    Model,
};
use libfuzzer_sys::fuzz_target;
use lincache::{
    Cache,
    LinkedMap,
    Policy,
};

fn run(policy: Policy, limit: usize, ratio: f64, operations: &[CacheOperation]) {
    let mut cache = Cache::<u8, u8>::with_ratio(limit, ratio, policy).unwrap();
    let mut model = Model::new(limit, ratio, policy);

    for op in operations {
        match *op {
            CacheOperation::Set(key, value, touch) => {
                assert_eq!(
                    cache.set_with(key, value, touch).unwrap(),
                    model.set(key, value, touch)
                );
            }
            CacheOperation::Get(key, touch) => {
                assert_eq!(
                    cache.get_with(&key, touch).unwrap().copied(),
                    model.get(key, touch)
                );
            }
            CacheOperation::Peek(key) => {
                assert_eq!(cache.peek(&key).unwrap().copied(), model.peek(key));
            }
            CacheOperation::Remove(key) => {
                assert_eq!(cache.remove(&key).unwrap(), model.remove(key));
            }
            CacheOperation::Shift => {
                assert_eq!(cache.shift().unwrap(), model.shift());
            }
            CacheOperation::Clear => {
                cache.clear().unwrap();
                model.entries.clear();
            }
            CacheOperation::Iter => {
                let map = cache.as_map().unwrap();
                let mut cursor = map.cursor();
                let mut walked = Vec::new();
                while let Some((key, value)) = cursor.next_entry(map).unwrap() {
                    walked.push((*key, *value));
                }
                let reversed: Vec<_> = map.iter().rev().map(|(k, v)| (*k, *v)).collect();
                assert!(walked.iter().eq(reversed.iter().rev()));
            }
            CacheOperation::SetLimit(limit) => {
                let limit = (limit % 8) as usize;
                cache.set_limit(limit).unwrap();
                model.limit = limit;
                model.trim();
            }
            CacheOperation::SetRatio(ratio) => {
                let ratio = ratio as f64 / u8::MAX as f64;
                cache.set_ratio(ratio).unwrap();
                model.ratio = ratio;
                model.trim();
            }
        }

        #[cfg(debug_assertions)]
        cache.as_map().unwrap().debug_validate();

        assert!(cache.len().unwrap() <= cache.limit().unwrap());
        assert_eq!(cache.to_pairs().unwrap(), model.entries);
    }

    let rebuilt = LinkedMap::from_pairs(cache.to_pairs().unwrap());
    assert_eq!(&rebuilt, cache.as_map().unwrap());

    cache.dispose();
    assert!(cache.len().is_err());
    assert!(cache.limit().is_err());
}

fuzz_target!(|data: (u8, u8, Vec<CacheOperation>)| {
    let (limit_raw, ratio_raw, operations) = data;

    let limit = (limit_raw % 8) as usize;
    let ratio = ratio_raw as f64 / u8::MAX as f64;

    run(Policy::Lru, limit, ratio, &operations);
    run(Policy::Mru, limit, ratio, &operations);
});
