//! File-backed snapshots.

use crate::codec::SnapshotCodec;
use crate::{DumpStats, LoadStats, SnapshotConfig};
use rand::Rng;
use skiplite_core::Result;
use skiplite_storage::SkipList;
use std::fmt::Display;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::Path;
use std::str::FromStr;

/// Dumps and loads a skip list to and from the configured snapshot file
#[derive(Debug, Clone)]
pub struct SnapshotManager {
    config: SnapshotConfig,
    codec: SnapshotCodec,
}

impl SnapshotManager {
    /// Create a manager, validating the configuration
    pub fn new(config: SnapshotConfig) -> Result<Self> {
        config.validate()?;
        let codec = SnapshotCodec::new(config.delimiter);
        Ok(Self { config, codec })
    }

    /// Snapshot file location
    pub fn path(&self) -> &Path {
        &self.config.path
    }

    /// The codec used for every pass
    pub fn codec(&self) -> &SnapshotCodec {
        &self.codec
    }

    /// Returns true if the snapshot file exists
    pub fn exists(&self) -> bool {
        self.config.path.is_file()
    }

    /// Write `list` to the snapshot file, replacing any previous contents.
    ///
    /// The parent directory is created if needed. Every record is checked
    /// before the file is touched, so a rejected dump leaves the previous
    /// snapshot in place.
    pub fn dump<K, V, R>(&self, list: &SkipList<K, V, R>) -> Result<DumpStats>
    where
        K: Ord + Display,
        V: Display,
        R: Rng,
    {
        self.codec.check(list)?;

        let path = &self.config.path;
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let file = File::create(path)?;
        let stats = self.codec.dump(list, BufWriter::new(file))?;

        tracing::info!(path = %path.display(), records = stats.records, "Snapshot dumped");
        Ok(stats)
    }

    /// Insert every record of the snapshot file into `list`.
    ///
    /// A missing or unreadable file is an error.
    pub fn load<K, V, R>(&self, list: &mut SkipList<K, V, R>) -> Result<LoadStats>
    where
        K: Ord + FromStr,
        V: FromStr,
        R: Rng,
    {
        let path = &self.config.path;
        let file = File::open(path)?;
        let stats = self.codec.load(list, BufReader::new(file))?;

        tracing::info!(
            path = %path.display(),
            inserted = stats.inserted,
            duplicates = stats.duplicates,
            malformed = stats.malformed,
            "Snapshot loaded"
        );
        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use skiplite_core::Error;
    use tempfile::tempdir;

    fn list() -> SkipList<String, String> {
        SkipList::with_rng(6, StdRng::seed_from_u64(8))
    }

    #[test]
    fn test_dump_creates_parent_and_truncates() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("store").join("dumpFile");
        let manager = SnapshotManager::new(SnapshotConfig::default().with_path(&path)).unwrap();

        let mut big = list();
        for i in 0..10 {
            big.insert(format!("key{}", i), "value".to_string());
        }
        manager.dump(&big).unwrap();
        assert!(manager.exists());

        let mut small = list();
        small.insert("only".to_string(), "one".to_string());
        manager.dump(&small).unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "only:one\n");
    }

    #[test]
    fn test_round_trip() {
        let dir = tempdir().unwrap();
        let manager =
            SnapshotManager::new(SnapshotConfig::default().with_path(dir.path().join("snap")))
                .unwrap();

        let mut src = list();
        src.insert("b".to_string(), "2".to_string());
        src.insert("a".to_string(), "1".to_string());
        src.insert("url".to_string(), "http://example.com:8080".to_string());
        manager.dump(&src).unwrap();

        let mut dst = list();
        let stats = manager.load(&mut dst).unwrap();
        assert_eq!(stats.inserted, 3);
        assert_eq!(dst.len(), src.len());
        let left: Vec<_> = src.iter().collect();
        let right: Vec<_> = dst.iter().collect();
        assert_eq!(left, right);
    }

    #[test]
    fn test_load_missing_file_is_error() {
        let dir = tempdir().unwrap();
        let manager =
            SnapshotManager::new(SnapshotConfig::default().with_path(dir.path().join("absent")))
                .unwrap();
        let mut dst = list();
        assert!(matches!(manager.load(&mut dst), Err(Error::Io(_))));
        assert!(dst.is_empty());
    }

    #[test]
    fn test_rejected_dump_keeps_previous_snapshot() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("dumpFile");
        let manager = SnapshotManager::new(SnapshotConfig::default().with_path(&path)).unwrap();

        let mut good = list();
        good.insert("k".to_string(), "v".to_string());
        manager.dump(&good).unwrap();

        let mut bad = list();
        bad.insert("a".to_string(), "1".to_string());
        bad.insert("user".to_string(), "x\nadmin:true".to_string());
        assert!(matches!(manager.dump(&bad), Err(Error::InvalidOperation(_))));
        assert_eq!(fs::read_to_string(&path).unwrap(), "k:v\n");
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = SnapshotConfig::default().with_delimiter('\r');
        assert!(SnapshotManager::new(config).is_err());
    }
}
