// Snapshot dump/load through the store

mod common;

use common::StoreTestFixture;
use skiplite::{Error, Store, StoreConfig};

#[test]
fn test_dump_format_is_exact() {
    let fixture = StoreTestFixture::new();
    let store = fixture.store::<i32, String>(1);
    store.insert(2, "b".to_string()).unwrap();
    store.insert(1, "a".to_string()).unwrap();

    let stats = store.dump_file().unwrap();
    assert_eq!(stats.records, 2);
    assert_eq!(fixture.read_snapshot(), "1:a\n2:b\n");
}

#[test]
fn test_round_trip_into_fresh_store() {
    let fixture = StoreTestFixture::new();
    let source = fixture.store::<String, String>(2);
    for (k, v) in [
        ("alpha", "1"),
        ("beta", "with:colons:inside"),
        ("gamma", ""),
        ("delta", "spaces are fine"),
    ] {
        source.insert(k.to_string(), v.to_string()).unwrap();
    }
    source.dump_file().unwrap();

    let target = fixture.store::<String, String>(3);
    let stats = target.load_file().unwrap();

    assert_eq!(stats.inserted, 4);
    assert_eq!(stats.malformed, 0);
    assert_eq!(target.size().unwrap(), source.size().unwrap());
    assert_eq!(target.entries().unwrap(), source.entries().unwrap());
    assert_eq!(
        target.search("beta").unwrap(),
        Some("with:colons:inside".to_string())
    );
}

#[test]
fn test_malformed_lines_are_skipped() {
    let fixture = StoreTestFixture::new();
    fixture.write_snapshot("\nnodelim\n3:c\n");

    let store = fixture.store::<i32, String>(4);
    let stats = store.load_file().unwrap();

    assert_eq!(stats.inserted, 1);
    assert_eq!(stats.malformed, 2);
    assert_eq!(store.size().unwrap(), 1);
    assert_eq!(store.search(&3).unwrap(), Some("c".to_string()));
}

#[test]
fn test_duplicate_records_keep_first() {
    let fixture = StoreTestFixture::new();
    fixture.write_snapshot("k:first\nbad line\nk:second\nj:other\n\n");

    let store = fixture.store::<String, String>(5);
    let stats = store.load_file().unwrap();

    assert_eq!(stats.inserted, 2);
    assert_eq!(stats.duplicates, 1);
    assert_eq!(stats.malformed, 2);
    assert_eq!(store.search("k").unwrap(), Some("first".to_string()));
}

#[test]
fn test_load_does_not_overwrite_live_keys() {
    let fixture = StoreTestFixture::new();
    fixture.write_snapshot("1:from-file\n2:two\n");

    let store = fixture.store::<i32, String>(6);
    store.insert(1, "live".to_string()).unwrap();
    let stats = store.load_file().unwrap();

    assert_eq!(stats.inserted, 1);
    assert_eq!(stats.duplicates, 1);
    assert_eq!(store.search(&1).unwrap(), Some("live".to_string()));
}

#[test]
fn test_load_missing_file_reports_io_error() {
    let fixture = StoreTestFixture::new();
    let store = fixture.store::<i32, String>(7);
    assert!(matches!(store.load_file(), Err(Error::Io(_))));
}

#[test]
fn test_dump_to_unwritable_path_reports_io_error() {
    let fixture = StoreTestFixture::new();
    // A regular file cannot be the parent directory of the snapshot
    let blocker = fixture.temp_dir.path().join("blocker");
    std::fs::write(&blocker, b"").unwrap();

    let config = StoreConfig::default().with_snapshot_path(blocker.join("dumpFile"));
    let store: Store<i32, String> = Store::with_config(config).unwrap();
    store.insert(1, "a".to_string()).unwrap();
    assert!(matches!(store.dump_file(), Err(Error::Io(_))));
}

#[test]
fn test_custom_delimiter() {
    let fixture = StoreTestFixture::new();
    let config = fixture.config().with_delimiter('=');
    let store: Store<String, String> = Store::with_config(config.clone()).unwrap();
    store.insert("url".to_string(), "a=b:c".to_string()).unwrap();
    store.dump_file().unwrap();
    assert_eq!(fixture.read_snapshot(), "url=a=b:c\n");

    let reopened: Store<String, String> = Store::open(config).unwrap();
    assert_eq!(reopened.search("url").unwrap(), Some("a=b:c".to_string()));
}

#[test]
fn test_dump_overwrites_previous_snapshot() {
    let fixture = StoreTestFixture::new();
    fixture.write_snapshot("stale:1\nstale2:2\nstale3:3\n");

    let store = fixture.store::<String, String>(8);
    store.insert("fresh".to_string(), "yes".to_string()).unwrap();
    store.dump_file().unwrap();

    assert_eq!(fixture.read_snapshot(), "fresh:yes\n");
}

#[test]
fn test_unparseable_keys_are_malformed() {
    let fixture = StoreTestFixture::new();
    fixture.write_snapshot("1:one\nseven:7\n2:two\n");

    let store = fixture.store::<u64, String>(9);
    let stats = store.load_file().unwrap();
    assert_eq!(stats.inserted, 2);
    assert_eq!(stats.malformed, 1);
}

#[test]
fn test_key_containing_delimiter_is_not_dumped() {
    let fixture = StoreTestFixture::new();
    fixture.write_snapshot("old:1\n");

    let store = fixture.store::<String, String>(10);
    store.insert("a:b".to_string(), "c".to_string()).unwrap();

    assert!(matches!(store.dump_file(), Err(Error::InvalidOperation(_))));
    assert_eq!(fixture.read_snapshot(), "old:1\n");

    let mut out = Vec::new();
    assert!(matches!(store.dump(&mut out), Err(Error::InvalidOperation(_))));
    assert!(out.is_empty());
}

#[test]
fn test_value_with_newline_cannot_inject_records() {
    let fixture = StoreTestFixture::new();
    let store = fixture.store::<String, String>(11);
    store.insert("user".to_string(), "x\nadmin:true".to_string()).unwrap();

    assert!(matches!(store.dump_file(), Err(Error::InvalidOperation(_))));
    assert!(!fixture.snapshot_path.exists());

    // Dropping the offending key makes the store dumpable again
    store.delete("user").unwrap();
    store.insert("user".to_string(), "x".to_string()).unwrap();
    store.dump_file().unwrap();

    let reloaded = fixture.store::<String, String>(12);
    let stats = reloaded.load_file().unwrap();
    assert_eq!(stats.lines, 1);
    assert_eq!(reloaded.entries().unwrap(), store.entries().unwrap());
    assert_eq!(reloaded.search("admin").unwrap(), None);
}
