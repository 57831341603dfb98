//! # SkipLite Storage
//!
//! In-memory skip list engine for SkipLite.
//!
//! ## ⚠️ Internal Implementation Detail
//!
//! **This crate is an internal implementation detail of SkipLite.**
//!
//! Users should depend on the main [`skiplite`](https://crates.io/crates/skiplite) crate
//! instead, which provides the stable public API and the thread-safe store.
//!
//! ---
//!
//! - **Node**: key/value pair with one successor slot per level
//! - **RandomLevel**: coin-flip level generator capped at `max_level`
//! - **SkipList**: arena-backed ordered map; first insert wins
//!
//! The engine itself is single-threaded (`&mut self` for mutation). Sharing
//! it between threads is the job of `skiplite::Store`.

#![warn(missing_docs)]
#![warn(clippy::all)]

use serde::{Deserialize, Serialize};

pub mod level;
pub mod node;
pub mod skiplist;

pub use level::RandomLevel;
pub use node::{Node, NodeId};
pub use skiplist::{DeleteResult, InsertResult, Iter, SkipList};

/// Default level ceiling
pub const DEFAULT_MAX_LEVEL: usize = 16;

/// Skip list engine configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkipListConfig {
    /// Ceiling on node levels
    pub max_level: usize,
}

impl Default for SkipListConfig {
    fn default() -> Self {
        Self {
            max_level: DEFAULT_MAX_LEVEL,
        }
    }
}

impl SkipListConfig {
    /// Set the level ceiling
    pub fn with_max_level(mut self, max_level: usize) -> Self {
        self.max_level = max_level;
        self
    }
}
