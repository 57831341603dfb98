//! # SkipLite
//!
//! An in-memory ordered key-value index backed by a skip list, with
//! full-snapshot persistence to a flat text file.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use skiplite::{InsertResult, Store, StoreConfig};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = StoreConfig::default().with_snapshot_path("./store/dumpFile");
//!     let store: Store<i64, String> = Store::open(config)?;
//!
//!     // The first insert of a key wins
//!     assert_eq!(store.insert(1, "one".to_string())?, InsertResult::Inserted);
//!     assert_eq!(store.insert(1, "uno".to_string())?, InsertResult::AlreadyExists);
//!     assert_eq!(store.search(&1)?, Some("one".to_string()));
//!
//!     // Write `1:one` to the snapshot file
//!     store.dump_file()?;
//!     Ok(())
//! }
//! ```
//!
//! ## Concurrency
//!
//! Each [`Store`] owns a reader-writer lock around its skip list. Searches
//! take it shared; inserts, deletes and loads take it exclusively; dumps
//! hold it shared for the whole pass so the snapshot is consistent.
//! Separate stores never contend with each other.

#![warn(missing_docs)]
#![warn(clippy::all)]

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;
use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::Level;

pub mod logging;

// Re-export core types
pub use skiplite_core::{Error, Result};

// Engine components
pub use skiplite_storage::{
    DeleteResult, InsertResult, Node, NodeId, RandomLevel, SkipList, SkipListConfig,
    DEFAULT_MAX_LEVEL,
};

// Snapshot components
pub use skiplite_snapshot::{
    DumpStats, LoadStats, SnapshotCodec, SnapshotConfig, SnapshotManager, DEFAULT_DELIMITER,
    DEFAULT_SNAPSHOT_PATH,
};

// Queue used by the asynchronous log writer
pub use skiplite_queue::{BlockingQueue, PushError};

// Version information
/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Largest accepted level ceiling
pub const MAX_LEVEL_LIMIT: usize = 64;

/// Store configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Skip list engine settings
    pub skiplist: SkipListConfig,
    /// Snapshot file settings
    pub snapshot: SnapshotConfig,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            skiplist: SkipListConfig::default(),
            snapshot: SnapshotConfig::default(),
        }
    }
}

impl StoreConfig {
    /// Set the level ceiling
    pub fn with_max_level(mut self, max_level: usize) -> Self {
        self.skiplist = self.skiplist.with_max_level(max_level);
        self
    }

    /// Set the snapshot file location
    pub fn with_snapshot_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.snapshot.path = path.into();
        self
    }

    /// Set the snapshot record delimiter
    pub fn with_delimiter(mut self, delimiter: char) -> Self {
        self.snapshot.delimiter = delimiter;
        self
    }

    /// Check the configuration before building a store
    pub fn validate(&self) -> Result<()> {
        let max_level = self.skiplist.max_level;
        if max_level == 0 || max_level > MAX_LEVEL_LIMIT {
            return Err(Error::InvalidOperation(format!(
                "max_level must be between 1 and {}, got {}",
                MAX_LEVEL_LIMIT, max_level
            )));
        }
        self.snapshot.validate()
    }
}

struct StoreInner<K, V, R> {
    list: RwLock<SkipList<K, V, R>>,
    snapshots: SnapshotManager,
    config: StoreConfig,
}

/// A thread-safe skip list store.
///
/// Cloning is cheap and every clone shares the same list and lock.
///
/// # Examples
///
/// ```rust
/// use skiplite::{DeleteResult, Store};
///
/// let store: Store<String, String> = Store::new()?;
/// store.insert("user:1".to_string(), "Alice".to_string())?;
/// assert_eq!(store.search("user:1")?, Some("Alice".to_string()));
/// assert_eq!(store.delete("user:1")?, DeleteResult::Deleted);
/// assert_eq!(store.size()?, 0);
/// # Ok::<(), skiplite::Error>(())
/// ```
pub struct Store<K, V, R = StdRng> {
    inner: Arc<StoreInner<K, V, R>>,
}

impl<K, V, R> Clone for Store<K, V, R> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<K: Ord, V> Store<K, V, StdRng> {
    /// Creates an empty store with the default configuration
    pub fn new() -> Result<Self> {
        Self::with_config(StoreConfig::default())
    }

    /// Creates an empty store with a custom configuration
    pub fn with_config(config: StoreConfig) -> Result<Self> {
        Self::with_rng(config, StdRng::from_entropy())
    }
}

impl<K, V> Store<K, V, StdRng>
where
    K: Ord + FromStr,
    V: FromStr,
{
    /// Creates a store and loads the configured snapshot file if it exists
    pub fn open(config: StoreConfig) -> Result<Self> {
        let store = Self::with_config(config)?;
        if store.inner.snapshots.exists() {
            store.load_file()?;
        } else {
            tracing::debug!(
                path = %store.inner.snapshots.path().display(),
                "No snapshot to load"
            );
        }
        Ok(store)
    }
}

impl<K: Ord, V, R: Rng> Store<K, V, R> {
    /// Creates an empty store drawing node levels from `rng`.
    ///
    /// Passing a seeded generator makes the list's shape reproducible.
    pub fn with_rng(config: StoreConfig, rng: R) -> Result<Self> {
        config.validate()?;
        let snapshots = SnapshotManager::new(config.snapshot.clone())?;
        let max_level = config.skiplist.max_level;
        let list = SkipList::with_rng(max_level, rng);

        tracing::debug!(max_level, "Created skip list store");
        Ok(Self {
            inner: Arc::new(StoreInner {
                list: RwLock::new(list),
                snapshots,
                config,
            }),
        })
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, SkipList<K, V, R>>> {
        self.inner.list.read().map_err(|_| Error::LockPoisoned)
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, SkipList<K, V, R>>> {
        self.inner.list.write().map_err(|_| Error::LockPoisoned)
    }

    /// The configuration this store was built with
    pub fn config(&self) -> &StoreConfig {
        &self.inner.config
    }

    /// Number of stored keys
    pub fn size(&self) -> Result<usize> {
        Ok(self.read()?.len())
    }

    /// Returns true if no keys are stored
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.read()?.is_empty())
    }

    /// Highest populated level of the underlying list
    pub fn level(&self) -> Result<usize> {
        Ok(self.read()?.level())
    }

    /// Returns true if `key` is stored
    pub fn contains_key<Q>(&self, key: &Q) -> Result<bool>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        Ok(self.read()?.contains_key(key))
    }

    /// Removes every key
    pub fn clear(&self) -> Result<()> {
        self.write()?.clear();
        Ok(())
    }

    /// Runs `f` against the list under the shared lock
    pub fn with_list<T>(&self, f: impl FnOnce(&SkipList<K, V, R>) -> T) -> Result<T> {
        let list = self.read()?;
        Ok(f(&*list))
    }
}

impl<K, V, R> Store<K, V, R>
where
    K: Ord + fmt::Debug,
    R: Rng,
{
    /// Looks up `key` and returns a copy of its value
    pub fn search<Q>(&self, key: &Q) -> Result<Option<V>>
    where
        K: Borrow<Q>,
        Q: Ord + fmt::Debug + ?Sized,
        V: Clone,
    {
        let found = self.read()?.get(key).cloned();
        match found {
            Some(_) => tracing::info!(key = ?key, "Successfully found"),
            None => tracing::error!(key = ?key, "Key not found"),
        }
        Ok(found)
    }

    /// Inserts `key` unless it is already stored.
    ///
    /// An existing key keeps its value and the call returns
    /// [`InsertResult::AlreadyExists`].
    pub fn insert(&self, key: K, value: V) -> Result<InsertResult> {
        // The key moves into the list, so render it only if it can be logged
        let key_repr = tracing::enabled!(Level::ERROR).then(|| format!("{:?}", key));
        let result = self.write()?.insert(key, value);

        if let Some(key) = key_repr {
            match result {
                InsertResult::Inserted => tracing::info!(key = %key, "Successfully inserted"),
                InsertResult::AlreadyExists => {
                    tracing::error!(key = %key, "Key already exists, insert rejected")
                }
            }
        }
        Ok(result)
    }

    /// Removes `key` if it is stored
    pub fn delete<Q>(&self, key: &Q) -> Result<DeleteResult>
    where
        K: Borrow<Q>,
        Q: Ord + fmt::Debug + ?Sized,
    {
        let result = self.write()?.delete(key);
        match result {
            DeleteResult::Deleted => tracing::info!(key = ?key, "Successfully deleted"),
            DeleteResult::NotFound => tracing::error!(key = ?key, "Delete of missing key"),
        }
        Ok(result)
    }
}

impl<K, V, R> Store<K, V, R>
where
    K: Ord + fmt::Display,
    V: fmt::Display,
    R: Rng,
{
    /// Renders every populated level as `Level i: k:v;...` lines
    pub fn display(&self) -> Result<String> {
        Ok(self.read()?.to_string())
    }

    /// Writes every entry to `writer` in ascending key order.
    ///
    /// The shared lock is held for the whole pass, so concurrent writers
    /// wait until it finishes. A key containing the delimiter or a line
    /// break, or a value containing a line break, fails the dump with
    /// [`Error::InvalidOperation`].
    pub fn dump<W: Write>(&self, writer: W) -> Result<DumpStats> {
        let list = self.read()?;
        self.inner.snapshots.codec().dump(&*list, writer)
    }

    /// Writes every entry to the configured snapshot file.
    ///
    /// A record that cannot be stored fails the dump before the file is
    /// opened, leaving the previous snapshot untouched.
    pub fn dump_file(&self) -> Result<DumpStats> {
        let list = self.read()?;
        self.inner.snapshots.dump(&*list)
    }
}

impl<K, V, R> Store<K, V, R>
where
    K: Ord + FromStr,
    V: FromStr,
    R: Rng,
{
    /// Inserts every well-formed record from `reader`.
    ///
    /// The exclusive lock is held for the whole pass. Keys already present
    /// (or repeated in the input) keep their first value.
    pub fn load<B: BufRead>(&self, reader: B) -> Result<LoadStats> {
        let mut list = self.write()?;
        let stats = self.inner.snapshots.codec().load(&mut *list, reader)?;
        tracing::info!(
            inserted = stats.inserted,
            duplicates = stats.duplicates,
            malformed = stats.malformed,
            "Loaded records"
        );
        Ok(stats)
    }

    /// Inserts every well-formed record from the configured snapshot file
    pub fn load_file(&self) -> Result<LoadStats> {
        let mut list = self.write()?;
        self.inner.snapshots.load(&mut *list)
    }
}

impl<K, V, R> Store<K, V, R>
where
    K: Ord + Clone,
    V: Clone,
    R: Rng,
{
    /// Copies every entry out in ascending key order
    pub fn entries(&self) -> Result<Vec<(K, V)>> {
        Ok(self
            .read()?
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect())
    }
}

impl<K, V, R> fmt::Debug for Store<K, V, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Store")
            .field("config", &self.inner.config)
            .finish_non_exhaustive()
    }
}
