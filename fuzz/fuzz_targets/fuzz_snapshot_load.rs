#![no_main]

use libfuzzer_sys::fuzz_target;
use rand::rngs::StdRng;
use rand::SeedableRng;
use skiplite_snapshot::SnapshotCodec;
use skiplite_storage::SkipList;

fuzz_target!(|data: &[u8]| {
    let codec = SnapshotCodec::default();
    let mut list: SkipList<String, String> = SkipList::with_rng(12, StdRng::seed_from_u64(0));

    // Arbitrary bytes must never abort a load
    let stats = codec
        .load(&mut list, data)
        .expect("in-memory reads cannot fail");
    assert_eq!(stats.inserted, list.len());
    assert_eq!(stats.inserted + stats.duplicates + stats.malformed, stats.lines);

    // A '\r' left inside a loaded key or value cannot be written back out
    let mut dumped = Vec::new();
    let dump = codec.dump(&list, &mut dumped);
    let has_cr = list
        .iter()
        .any(|(k, v)| k.contains('\r') || v.contains('\r'));
    assert_eq!(dump.is_err(), has_cr);
    if has_cr {
        return;
    }

    // Whatever was loaded must survive a dump/load cycle unchanged
    let mut again: SkipList<String, String> = SkipList::with_rng(12, StdRng::seed_from_u64(1));
    codec
        .load(&mut again, dumped.as_slice())
        .expect("in-memory reads cannot fail");
    assert!(list.iter().eq(again.iter()));
});
