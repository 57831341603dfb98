//! # SkipLite Snapshot
//!
//! Full-snapshot persistence for the SkipLite skip list.
//!
//! ## ⚠️ Internal Implementation Detail
//!
//! **This crate is an internal implementation detail of SkipLite.**
//!
//! Users should depend on the main [`skiplite`](https://crates.io/crates/skiplite) crate
//! instead, which provides the stable public API.
//!
//! ---
//!
//! A snapshot is a plain text file with one record per line:
//!
//! ```text
//! <key><DELIM><value>\n
//! ```
//!
//! `DELIM` defaults to `:`. There is no header, footer, checksum or count;
//! end of file ends the record stream. On load a line is split at the
//! *first* delimiter, so values may contain the delimiter themselves. Empty
//! lines and lines without a delimiter are skipped. Every record goes
//! through the ordinary insert path, so a key repeated in the file keeps its
//! first value.
//!
//! There is no escaping. A key whose text contains the delimiter, `\n` or
//! `\r`, or a value whose text contains `\n` or `\r`, cannot be written:
//! dumping it fails with `Error::InvalidOperation` instead of producing a
//! file that loads back as different records.
//!
//! ## Usage
//!
//! ```ignore
//! use skiplite_snapshot::{SnapshotConfig, SnapshotManager};
//!
//! let manager = SnapshotManager::new(SnapshotConfig::default().with_path("store/dumpFile"))?;
//! manager.dump(&list)?;
//! let stats = manager.load(&mut fresh_list)?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

use serde::{Deserialize, Serialize};
use skiplite_core::{Error, Result};
use std::path::PathBuf;

pub mod codec;
pub mod manager;

pub use codec::SnapshotCodec;
pub use manager::SnapshotManager;

/// Default record delimiter
pub const DEFAULT_DELIMITER: char = ':';

/// Default snapshot location, relative to the working directory
pub const DEFAULT_SNAPSHOT_PATH: &str = "store/dumpFile";

/// Snapshot configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotConfig {
    /// Character separating key from value
    pub delimiter: char,
    /// Snapshot file location
    pub path: PathBuf,
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            delimiter: DEFAULT_DELIMITER,
            path: PathBuf::from(DEFAULT_SNAPSHOT_PATH),
        }
    }
}

impl SnapshotConfig {
    /// Set the record delimiter
    pub fn with_delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Set the snapshot file location
    pub fn with_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.path = path.into();
        self
    }

    /// Rejects delimiters that would collide with the line structure
    pub fn validate(&self) -> Result<()> {
        if self.delimiter == '\n' || self.delimiter == '\r' {
            return Err(Error::InvalidOperation(format!(
                "Snapshot delimiter cannot be a line terminator: {:?}",
                self.delimiter
            )));
        }
        if self.path.as_os_str().is_empty() {
            return Err(Error::InvalidOperation(
                "Snapshot path cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Result of a dump pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DumpStats {
    /// Records written
    pub records: usize,
}

/// Result of a load pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadStats {
    /// Lines read from the source
    pub lines: usize,
    /// Records that created a new entry
    pub inserted: usize,
    /// Well-formed records rejected because the key was already present
    pub duplicates: usize,
    /// Lines skipped as malformed
    pub malformed: usize,
}

impl LoadStats {
    /// Well-formed records handed to the insert path
    pub fn applied(&self) -> usize {
        self.inserted + self.duplicates
    }
}
