//! Property-Based Tests for Cache Module
//!
//! Uses proptest to check the memory tier's accounting and eviction rules.

use proptest::prelude::*;
use std::collections::HashMap;

use crate::cache::{CostStore, MemoryCache};

// == Strategies ==
/// Generates URL-like cache keys
fn key_strategy() -> impl Strategy<Value = String> {
    "[a-z]{1,8}".prop_map(|s| format!("https://cdn.example.com/{s}.png"))
}

/// Generates asset costs, including zero-cost assets
fn cost_strategy() -> impl Strategy<Value = u64> {
    0u64..512
}

#[derive(Debug, Clone)]
enum CacheOp {
    Put { key: String, cost: u64 },
    Get { key: String },
    Remove { key: String },
}

fn cache_op_strategy() -> impl Strategy<Value = CacheOp> {
    prop_oneof![
        (key_strategy(), cost_strategy()).prop_map(|(key, cost)| CacheOp::Put { key, cost }),
        key_strategy().prop_map(|key| CacheOp::Get { key }),
        key_strategy().prop_map(|key| CacheOp::Remove { key }),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // Recorded total cost always equals the sum of resident entries, and hit/miss
    // counters match what callers observed.
    #[test]
    fn prop_cost_accounting(ops in prop::collection::vec(cache_op_strategy(), 1..80)) {
        let mut store: CostStore<String, u64> = CostStore::new(0);
        let mut model: HashMap<String, u64> = HashMap::new();
        let (mut hits, mut misses) = (0u64, 0u64);

        for op in ops {
            match op {
                CacheOp::Put { key, cost } => {
                    store.insert(key.clone(), cost, cost);
                    model.insert(key, cost);
                }
                CacheOp::Get { key } => match store.get(&key) {
                    Some(cost) => {
                        hits += 1;
                        prop_assert_eq!(Some(&cost), model.get(&key));
                    }
                    None => {
                        misses += 1;
                        prop_assert!(!model.contains_key(&key));
                    }
                },
                CacheOp::Remove { key } => {
                    store.remove(&key);
                    model.remove(&key);
                }
            }
        }

        let stats = store.stats();
        prop_assert_eq!(stats.hits, hits);
        prop_assert_eq!(stats.misses, misses);
        prop_assert_eq!(stats.total_entries, model.len());
        prop_assert_eq!(store.total_cost(), model.values().sum::<u64>());
    }

    // After any insert, either the tier is within its limit or only the newest
    // entry is resident; the newest entry is always retrievable.
    #[test]
    fn prop_capacity_enforcement(
        entries in prop::collection::vec((key_strategy(), cost_strategy()), 1..120),
        max_total_cost in 1u64..2048
    ) {
        let mut store: CostStore<String, u64> = CostStore::new(max_total_cost);

        for (key, cost) in entries {
            store.insert(key.clone(), cost, cost);
            prop_assert!(
                store.total_cost() <= max_total_cost || store.len() == 1,
                "total cost {} exceeds max {} with {} entries",
                store.total_cost(),
                max_total_cost,
                store.len()
            );
            prop_assert_eq!(store.get(&key), Some(cost));
        }
    }

    // Once cumulative cost passes the limit, the first-inserted (and never
    // touched) entry is gone.
    #[test]
    fn prop_eviction_under_pressure(count in 3usize..20, cost in 1u64..100) {
        let cache: MemoryCache<String, u64> = MemoryCache::new(cost * 2, |c: &u64| *c);

        for i in 0..count {
            cache.put(Some(cost), format!("key{i}"));
        }

        prop_assert_eq!(cache.get(&"key0".to_string()), None);
        prop_assert_eq!(cache.get(&format!("key{}", count - 1)), Some(cost));
        prop_assert_eq!(cache.len(), 2);
    }

    // Putting V1 then V2 under one key returns V2 and charges only V2's cost.
    #[test]
    fn prop_overwrite_semantics(key in key_strategy(), first in cost_strategy(), second in cost_strategy()) {
        let cache: MemoryCache<String, u64> = MemoryCache::new(0, |c: &u64| *c);

        cache.put(Some(first), key.clone());
        cache.put(Some(second), key.clone());

        prop_assert_eq!(cache.get(&key), Some(second));
        prop_assert_eq!(cache.len(), 1);
        prop_assert_eq!(cache.total_cost(), second);
    }
}
