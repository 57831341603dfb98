#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use rand::rngs::StdRng;
use rand::SeedableRng;
use skiplite::{DeleteResult, InsertResult, Store, StoreConfig};
use std::collections::BTreeMap;

#[derive(Arbitrary, Debug)]
enum StoreOp {
    Insert { key: String, value: String },
    Search { key: String },
    Delete { key: String },
    Dump,
}

fuzz_target!(|ops: Vec<StoreOp>| {
    let store: Store<String, String> =
        Store::with_rng(StoreConfig::default(), StdRng::seed_from_u64(0))
            .expect("default config is valid");
    let mut model = BTreeMap::new();

    for op in ops.iter().take(100) {
        match op {
            StoreOp::Insert { key, value } => {
                let expected = if model.contains_key(key) {
                    InsertResult::AlreadyExists
                } else {
                    model.insert(key.clone(), value.clone());
                    InsertResult::Inserted
                };
                let result = store.insert(key.clone(), value.clone());
                assert_eq!(result.ok(), Some(expected));
            }
            StoreOp::Search { key } => {
                let found = store.search(key.as_str());
                assert_eq!(found.ok(), Some(model.get(key).cloned()));
            }
            StoreOp::Delete { key } => {
                let expected = match model.remove(key) {
                    Some(_) => DeleteResult::Deleted,
                    None => DeleteResult::NotFound,
                };
                assert_eq!(store.delete(key.as_str()).ok(), Some(expected));
            }
            StoreOp::Dump => {
                let mut out = Vec::new();
                let storable = model.iter().all(|(k, v)| {
                    !k.contains([':', '\n', '\r']) && !v.contains(['\n', '\r'])
                });
                let dumped = store.dump(&mut out);
                assert_eq!(dumped.is_ok(), storable);
                if let Ok(stats) = dumped {
                    assert_eq!(stats.records, model.len());
                }
            }
        }
        assert_eq!(store.size().ok(), Some(model.len()));
    }

    let entries = store.entries().expect("lock is never poisoned here");
    assert!(entries.iter().map(|(k, v)| (k, v)).eq(model.iter()));
});
