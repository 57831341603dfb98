use skiplite::{Store, StoreConfig};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== SkipLite Basic Demo ===\n");

    let config = StoreConfig::default()
        .with_max_level(6)
        .with_snapshot_path("store/dumpFile");
    let store: Store<i32, String> = Store::with_config(config.clone())?;

    println!("1. Inserting data...");
    for (key, value) in [
        (1, "learn"),
        (3, "algorithm"),
        (7, "skiplist"),
        (8, "rust"),
        (9, "with"),
        (19, "concurrency"),
        (19, "duplicate, rejected"),
    ] {
        let result = store.insert(key, value.to_string())?;
        println!("   insert {} -> {:?}", key, result);
    }
    println!("   size: {}", store.size()?);

    println!("\n2. Structure:");
    print!("{}", store.display()?);

    println!("\n3. Dumping to {}...", config.snapshot.path.display());
    let dumped = store.dump_file()?;
    println!("   wrote {} records", dumped.records);

    println!("\n4. Searching...");
    for key in [9, 18] {
        match store.search(&key)? {
            Some(value) => println!("   found {}: {}", key, value),
            None => println!("   {} not found", key),
        }
    }

    println!("\n5. Deleting...");
    println!("   delete 3 -> {:?}", store.delete(&3)?);
    println!("   delete 7 -> {:?}", store.delete(&7)?);
    println!("   size: {}", store.size()?);
    print!("{}", store.display()?);

    println!("\n6. Loading the snapshot into a fresh store...");
    let restored: Store<i32, String> = Store::open(config)?;
    println!("   restored size: {}", restored.size()?);
    print!("{}", restored.display()?);

    println!("\n=== Demo Complete ===");
    Ok(())
}
