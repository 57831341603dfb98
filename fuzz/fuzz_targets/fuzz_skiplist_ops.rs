#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use rand::rngs::StdRng;
use rand::SeedableRng;
use skiplite_storage::{DeleteResult, InsertResult, SkipList};
use std::collections::BTreeMap;

#[derive(Arbitrary, Debug)]
enum ListOp {
    Insert { key: u16, value: u8 },
    Get { key: u16 },
    Delete { key: u16 },
}

#[derive(Arbitrary, Debug)]
struct Input {
    seed: u64,
    max_level: u8,
    ops: Vec<ListOp>,
}

fuzz_target!(|input: Input| {
    let max_level = (input.max_level % 24) as usize + 1;
    let mut list = SkipList::with_rng(max_level, StdRng::seed_from_u64(input.seed));
    let mut model = BTreeMap::new();

    for op in input.ops.iter().take(1000) {
        match *op {
            ListOp::Insert { key, value } => {
                let expected = if model.contains_key(&key) {
                    InsertResult::AlreadyExists
                } else {
                    model.insert(key, value);
                    InsertResult::Inserted
                };
                assert_eq!(list.insert(key, value), expected);
            }
            ListOp::Get { key } => {
                assert_eq!(list.get(&key), model.get(&key));
            }
            ListOp::Delete { key } => {
                let expected = match model.remove(&key) {
                    Some(_) => DeleteResult::Deleted,
                    None => DeleteResult::NotFound,
                };
                assert_eq!(list.delete(&key), expected);
            }
        }
    }

    assert_eq!(list.len(), model.len());
    assert!(list.iter().eq(model.iter()));
    assert!(list.level() <= max_level);
    for level in 1..=max_level {
        let above = list.keys_at_level(level);
        let below = list.keys_at_level(level - 1);
        assert!(above.iter().all(|k| below.contains(k)));
    }
});
