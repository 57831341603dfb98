//! # SkipLite Core
//!
//! Shared error types for the SkipLite crates.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;

pub use error::{Error, Result};
