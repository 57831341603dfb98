use skiplite::logging::{LogConfig, DEFAULT_QUEUE_CAPACITY};
use skiplite::Store;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Route log lines through the bounded queue to a background writer
    let guard = LogConfig::info()
        .with_queue("logs/skiplite.log", DEFAULT_QUEUE_CAPACITY)
        .init()?;

    println!("=== SkipLite Logging Demo ===\n");

    let store: Store<String, String> = Store::new()?;

    // info: "Successfully inserted"
    store.insert("user:1".to_string(), "Alice".to_string())?;
    store.insert("user:2".to_string(), "Bob".to_string())?;
    // error: "Key already exists, insert rejected"
    store.insert("user:1".to_string(), "Mallory".to_string())?;

    // info on a hit, error on a miss
    store.search("user:1")?;
    store.search("user:3")?;

    store.delete("user:2")?;

    // Dropping the guard flushes whatever is still queued
    drop(guard);
    println!("Check logs/skiplite.log to see the tracing output!");

    Ok(())
}
