//! Store Module
//!
//! Versioned record storage, one ordered [`Partition`] per routing key.
//!
//! ## Responsibilities
//! - Per-key version bookkeeping for optimistic concurrency
//! - Conditional mutations (create-only, value- and version-conditioned)
//! - Ordered inclusive range reads and range deletes
//! - Lazy partition creation keyed by routing key
//!
//! ## Data Structure Choice
//! Each partition is a BTreeMap of per-key slots behind a RwLock:
//! - Ordered keys for range scans
//! - Slot mutexes let point operations on different keys run concurrently
//! - The map lock is taken exclusively only to add/remove slots and for
//!   range deletes

mod partition;
mod table;

pub use partition::Partition;
pub use table::Table;

use bytes::Bytes;

/// A live record stored under a local key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    /// Current value
    pub value: Bytes,

    /// Current version
    pub version: u64,
}

impl Record {
    /// A record created by an unconditional write
    pub fn created(value: Bytes) -> Self {
        Self { value, version: 0 }
    }

    /// Replace the value and bump the version, returning the new version
    pub fn update(&mut self, value: Bytes) -> u64 {
        self.value = value;
        self.version += 1;
        self.version
    }
}
