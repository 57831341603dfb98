//! Line-oriented record codec.

use crate::{DumpStats, LoadStats, DEFAULT_DELIMITER};
use rand::Rng;
use skiplite_core::{Error, Result};
use skiplite_storage::{InsertResult, SkipList};
use std::fmt::Display;
use std::io::{BufRead, Write};
use std::str::FromStr;

/// Encodes the level-0 chain as `key<DELIM>value` lines and rebuilds a list
/// from them.
///
/// The codec works on any byte sink or source; [`crate::SnapshotManager`]
/// binds it to a file. Callers must keep the list from being mutated for the
/// duration of a pass (the `&`/`&mut` borrows already enforce this for
/// single-threaded use).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SnapshotCodec {
    delimiter: char,
}

impl Default for SnapshotCodec {
    fn default() -> Self {
        Self::new(DEFAULT_DELIMITER)
    }
}

impl SnapshotCodec {
    /// Creates a codec using `delimiter` between key and value
    pub fn new(delimiter: char) -> Self {
        Self { delimiter }
    }

    /// The record delimiter
    pub fn delimiter(&self) -> char {
        self.delimiter
    }

    /// Writes one record, including its line terminator.
    ///
    /// Fails with [`Error::InvalidOperation`] when the record would not load
    /// back as written; see [`check_record`](Self::check_record).
    pub fn write_record<W, K, V>(&self, writer: &mut W, key: &K, value: &V) -> Result<()>
    where
        W: Write,
        K: Display + ?Sized,
        V: Display + ?Sized,
    {
        let key = key.to_string();
        let value = value.to_string();
        self.check_record(&key, &value)?;
        writeln!(writer, "{}{}{}", key, self.delimiter, value)?;
        Ok(())
    }

    /// Rejects a rendered record that cannot survive a round trip.
    ///
    /// The key may not contain the delimiter or a line terminator; the value
    /// may not contain a line terminator.
    pub fn check_record(&self, key: &str, value: &str) -> Result<()> {
        if let Some(c) = key
            .chars()
            .find(|&c| c == self.delimiter || c == '\n' || c == '\r')
        {
            return Err(Error::InvalidOperation(format!(
                "Snapshot key {:?} contains {:?}",
                key, c
            )));
        }
        if let Some(c) = value.chars().find(|&c| c == '\n' || c == '\r') {
            return Err(Error::InvalidOperation(format!(
                "Snapshot value for key {:?} contains {:?}",
                key, c
            )));
        }
        Ok(())
    }

    /// Checks every entry of `list` without writing anything
    pub fn check<K, V, R>(&self, list: &SkipList<K, V, R>) -> Result<()>
    where
        K: Ord + Display,
        V: Display,
        R: Rng,
    {
        for (key, value) in list.iter() {
            self.check_record(&key.to_string(), &value.to_string())?;
        }
        Ok(())
    }

    /// Splits a line at the first delimiter.
    ///
    /// Returns `None` for an empty line or a line with no delimiter.
    pub fn split_record<'a>(&self, line: &'a str) -> Option<(&'a str, &'a str)> {
        if line.is_empty() {
            return None;
        }
        line.split_once(self.delimiter)
    }

    /// Splits and parses a line into a typed key/value pair
    pub fn parse_record<K, V>(&self, line: &str) -> Option<(K, V)>
    where
        K: FromStr,
        V: FromStr,
    {
        let (key, value) = self.split_record(line)?;
        Some((key.parse().ok()?, value.parse().ok()?))
    }

    /// Writes every entry of `list` in ascending key order.
    ///
    /// Stops at the first record rejected by
    /// [`check_record`](Self::check_record); the records before it have
    /// already reached `writer`.
    pub fn dump<K, V, R, W>(&self, list: &SkipList<K, V, R>, mut writer: W) -> Result<DumpStats>
    where
        K: Ord + Display,
        V: Display,
        R: Rng,
        W: Write,
    {
        let mut stats = DumpStats::default();
        for (key, value) in list.iter() {
            self.write_record(&mut writer, key, value)?;
            stats.records += 1;
        }
        writer.flush()?;
        Ok(stats)
    }

    /// Reads records from `reader` and inserts them into `list`.
    ///
    /// Malformed lines (empty, no delimiter, invalid UTF-8, or a key/value
    /// that does not parse) are skipped and counted. I/O errors abort the
    /// pass; records inserted before the error stay in the list.
    pub fn load<K, V, R, B>(&self, list: &mut SkipList<K, V, R>, reader: B) -> Result<LoadStats>
    where
        K: Ord + FromStr,
        V: FromStr,
        R: Rng,
        B: BufRead,
    {
        let mut stats = LoadStats::default();

        for raw in reader.split(b'\n') {
            let mut raw = raw?;
            stats.lines += 1;
            if raw.last() == Some(&b'\r') {
                raw.pop();
            }

            let parsed = std::str::from_utf8(&raw)
                .ok()
                .and_then(|line| self.parse_record::<K, V>(line));
            let Some((key, value)) = parsed else {
                tracing::debug!(line = stats.lines, "Skipping malformed snapshot record");
                stats.malformed += 1;
                continue;
            };

            match list.insert(key, value) {
                InsertResult::Inserted => stats.inserted += 1,
                InsertResult::AlreadyExists => stats.duplicates += 1,
            }
        }

        Ok(stats)
    }
}
