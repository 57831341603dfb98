// Common helpers for skip list integration tests

use rand::rngs::StdRng;
use rand::SeedableRng;
use skiplite_storage::SkipList;

/// Builds a list with a fixed seed so level draws repeat across runs
pub fn seeded_list<K: Ord, V>(max_level: usize, seed: u64) -> SkipList<K, V, StdRng> {
    SkipList::with_rng(max_level, StdRng::seed_from_u64(seed))
}

/// Collects the keys of every level from 0 up to `max_level`
#[allow(dead_code)]
pub fn level_snapshot<K: Ord + Clone, V>(list: &SkipList<K, V, StdRng>) -> Vec<Vec<K>> {
    (0..=list.max_level())
        .map(|level| list.keys_at_level(level).into_iter().cloned().collect())
        .collect()
}
