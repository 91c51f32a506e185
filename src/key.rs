//! Key Model
//!
//! Two-level key space: a [`RoutingKey`] selects the partition, a
//! [`LocalKey`] identifies a record inside it. Local keys sort by plain
//! bytewise lexicographic order, so a strict prefix sorts first.

use std::cmp::Ordering;
use std::fmt;

use bytes::Bytes;

use crate::error::{Result, TableError};

/// Compare two local keys bytewise
pub fn compare(a: &[u8], b: &[u8]) -> Ordering {
    a.cmp(b)
}

/// Selects the partition a local key belongs to. Equality only.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct RoutingKey(Bytes);

impl RoutingKey {
    /// Create a routing key, rejecting empty input
    pub fn new(bytes: impl Into<Bytes>) -> Result<Self> {
        let bytes = bytes.into();
        if bytes.is_empty() {
            return Err(TableError::invalid("routing key must not be empty"));
        }
        Ok(Self(bytes))
    }
}

impl fmt::Debug for RoutingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RoutingKey({})", String::from_utf8_lossy(&self.0))
    }
}

/// Identifies a record within a partition; totally ordered
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LocalKey(Bytes);

impl LocalKey {
    /// Create a local key, rejecting empty input
    pub fn new(bytes: impl Into<Bytes>) -> Result<Self> {
        let bytes = bytes.into();
        if bytes.is_empty() {
            return Err(TableError::invalid("local key must not be empty"));
        }
        Ok(Self(bytes))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for LocalKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LocalKey({})", String::from_utf8_lossy(&self.0))
    }
}

impl AsRef<[u8]> for LocalKey {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// Inclusive range `[start, end]` over local keys
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyRange {
    start: LocalKey,
    end: LocalKey,
}

impl KeyRange {
    /// Create a range; `start` must not sort after `end`
    pub fn new(start: LocalKey, end: LocalKey) -> Result<Self> {
        if compare(start.as_bytes(), end.as_bytes()) == Ordering::Greater {
            return Err(TableError::invalid(format!(
                "range start {:?} sorts after end {:?}",
                start, end
            )));
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> &LocalKey {
        &self.start
    }

    pub fn end(&self) -> &LocalKey {
        &self.end
    }

    /// Whether `key` falls within the inclusive bounds
    pub fn contains(&self, key: &LocalKey) -> bool {
        key >= &self.start && key <= &self.end
    }
}
