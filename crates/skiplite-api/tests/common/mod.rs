// Common test utilities for store integration tests

use rand::rngs::StdRng;
use rand::SeedableRng;
use skiplite::{Store, StoreConfig};
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

/// Test fixture that points a store's snapshot file into a temporary directory
pub struct StoreTestFixture {
    #[allow(dead_code)]
    pub temp_dir: TempDir,
    pub snapshot_path: PathBuf,
}

impl StoreTestFixture {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let snapshot_path = temp_dir.path().join("store").join("dumpFile");
        Self {
            temp_dir,
            snapshot_path,
        }
    }

    pub fn config(&self) -> StoreConfig {
        StoreConfig::default().with_snapshot_path(&self.snapshot_path)
    }

    /// A store with a fixed leveling seed
    pub fn store<K: Ord, V>(&self, seed: u64) -> Store<K, V, StdRng> {
        Store::with_rng(self.config(), StdRng::seed_from_u64(seed))
            .expect("Failed to create store")
    }

    #[allow(dead_code)]
    pub fn write_snapshot(&self, contents: &str) {
        if let Some(parent) = self.snapshot_path.parent() {
            fs::create_dir_all(parent).expect("Failed to create snapshot directory");
        }
        fs::write(&self.snapshot_path, contents).expect("Failed to write snapshot");
    }

    #[allow(dead_code)]
    pub fn read_snapshot(&self) -> String {
        fs::read_to_string(&self.snapshot_path).expect("Failed to read snapshot")
    }
}

impl Default for StoreTestFixture {
    fn default() -> Self {
        Self::new()
    }
}
