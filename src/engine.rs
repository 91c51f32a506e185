//! Engine Module
//!
//! The operation dispatcher that sits in front of the record store.
//!
//! ## Responsibilities
//! - Validate command input (keys, expected versions, range bounds, deltas)
//! - Locate the partition for a routing key, creating it on first write
//! - Execute the operation under the key's (or partition's) atomicity scope
//! - Wrap returned records as caller-owned leases

use std::sync::Arc;

use bytes::Bytes;

use crate::config::Config;
use crate::error::{Result, TableError};
use crate::key::{KeyRange, LocalKey, RoutingKey};
use crate::lifecycle::{KeyValue, ResultTracker};
use crate::protocol::{Command, Outcome};
use crate::store::{Partition, Record, Table};

/// The table engine
///
/// ## Concurrency Model
///
/// The engine itself holds no lock. Atomicity lives in the store:
/// - Point operations on one local key are linearizable; different keys
///   proceed concurrently.
/// - `range` sees a consistent cut of its bounds; `delete_range` is
///   exclusive for its partition.
/// - Partitions never contend with each other.
pub struct Engine {
    /// Engine configuration
    config: Config,

    /// Partitions by routing key
    table: Table,

    /// Outstanding result leases
    tracker: Arc<ResultTracker>,
}

impl Engine {
    /// Create an empty engine with the given config
    pub fn new(config: Config) -> Self {
        Self {
            config,
            table: Table::new(),
            tracker: ResultTracker::new(),
        }
    }

    /// Execute a command
    ///
    /// Validates all input before touching the store, so a rejected command
    /// has no effect.
    pub fn execute(&self, command: Command) -> Result<Outcome> {
        tracing::trace!("Executing {:?} command", command.command_type());

        match command {
            Command::Put {
                routing_key,
                key,
                value,
            } => {
                let (partition, key) = self.writable(routing_key, key)?;
                partition.put(&key, value);
                Ok(Outcome::Done)
            }
            Command::PutIfAbsent {
                routing_key,
                key,
                value,
            } => {
                let (partition, key) = self.writable(routing_key, key)?;
                Ok(Outcome::Value(partition.put_if_absent(&key, value)))
            }
            Command::Get { routing_key, key } => {
                let (partition, key) = self.readable(routing_key, key)?;
                Ok(Outcome::Value(partition.and_then(|p| p.get(&key))))
            }
            Command::Delete {
                routing_key,
                key,
                expected,
            } => {
                let (partition, key) = self.readable(routing_key, key)?;
                let removed = partition.is_some_and(|p| p.delete(&key, &expected));
                Ok(Outcome::Removed(removed))
            }
            Command::VPut {
                routing_key,
                key,
                value,
                expected_version,
            } => {
                let expected = expected_version_of(expected_version)?;
                let (partition, key) = self.writable(routing_key, key)?;
                Ok(Outcome::Version(partition.v_put(&key, value, expected)?))
            }
            Command::VDelete {
                routing_key,
                key,
                expected_version,
            } => {
                let expected = expected_version_of(expected_version)?;
                let (partition, local_key) = self.readable(routing_key, key)?;
                let record = match partition {
                    Some(partition) => partition.v_delete(&local_key, expected)?,
                    None if expected == 0 => return Err(TableError::KeyNotFound),
                    None => {
                        return Err(TableError::BadRevision {
                            expected,
                            current: None,
                        })
                    }
                };
                Ok(Outcome::Record(self.tracker.lease(local_key, record)))
            }
            Command::Range {
                routing_key,
                start,
                end,
            } => {
                let routing_key = RoutingKey::new(routing_key)?;
                let range = key_range(start, end)?;
                let records = match self.table.partition(&routing_key) {
                    Some(partition) => partition.range(&range),
                    None => Vec::new(),
                };
                Ok(Outcome::Records(self.tracker.lease_all(records)))
            }
            Command::DeleteRange {
                routing_key,
                start,
                end,
            } => {
                let routing_key = RoutingKey::new(routing_key)?;
                let range = key_range(start, end)?;
                let removed = match self.table.partition(&routing_key) {
                    Some(partition) => partition.delete_range(&range),
                    None => Vec::new(),
                };
                tracing::debug!(
                    "Deleted {} records in {:?}..={:?} from {:?}",
                    removed.len(),
                    range.start(),
                    range.end(),
                    routing_key
                );
                Ok(Outcome::Records(self.tracker.lease_all(removed)))
            }
            Command::Increment {
                routing_key,
                key,
                delta,
            } => {
                if delta < 0 && !self.config.allow_negative_delta {
                    return Err(TableError::invalid(format!(
                        "negative delta {} not allowed",
                        delta
                    )));
                }
                let (partition, key) = self.writable(routing_key, key)?;
                Ok(Outcome::Number(partition.increment(&key, delta)?))
            }
            Command::GetNumber { routing_key, key } => {
                let (partition, key) = self.readable(routing_key, key)?;
                let partition = partition.ok_or(TableError::KeyNotFound)?;
                Ok(Outcome::Number(partition.get_number(&key)?))
            }
        }
    }

    // =========================================================================
    // Typed Operations
    // =========================================================================

    /// Unconditional put
    pub fn put(&self, routing_key: &[u8], key: &[u8], value: &[u8]) -> Result<()> {
        self.execute(Command::Put {
            routing_key: Bytes::copy_from_slice(routing_key),
            key: Bytes::copy_from_slice(key),
            value: Bytes::copy_from_slice(value),
        })?;
        Ok(())
    }

    /// Put only if absent; returns the existing value if there is one
    pub fn put_if_absent(
        &self,
        routing_key: &[u8],
        key: &[u8],
        value: &[u8],
    ) -> Result<Option<Bytes>> {
        self.execute(Command::PutIfAbsent {
            routing_key: Bytes::copy_from_slice(routing_key),
            key: Bytes::copy_from_slice(key),
            value: Bytes::copy_from_slice(value),
        })?
        .into_value()
    }

    /// Point read
    pub fn get(&self, routing_key: &[u8], key: &[u8]) -> Result<Option<Bytes>> {
        self.execute(Command::Get {
            routing_key: Bytes::copy_from_slice(routing_key),
            key: Bytes::copy_from_slice(key),
        })?
        .into_value()
    }

    /// Delete if the stored value equals `expected`
    pub fn delete(&self, routing_key: &[u8], key: &[u8], expected: &[u8]) -> Result<bool> {
        self.execute(Command::Delete {
            routing_key: Bytes::copy_from_slice(routing_key),
            key: Bytes::copy_from_slice(key),
            expected: Bytes::copy_from_slice(expected),
        })?
        .into_removed()
    }

    /// Put if the stored version equals `expected_version`
    pub fn v_put(
        &self,
        routing_key: &[u8],
        key: &[u8],
        value: &[u8],
        expected_version: i64,
    ) -> Result<u64> {
        self.execute(Command::VPut {
            routing_key: Bytes::copy_from_slice(routing_key),
            key: Bytes::copy_from_slice(key),
            value: Bytes::copy_from_slice(value),
            expected_version,
        })?
        .into_version()
    }

    /// Delete if the stored version equals `expected_version`
    pub fn v_delete(
        &self,
        routing_key: &[u8],
        key: &[u8],
        expected_version: i64,
    ) -> Result<KeyValue> {
        self.execute(Command::VDelete {
            routing_key: Bytes::copy_from_slice(routing_key),
            key: Bytes::copy_from_slice(key),
            expected_version,
        })?
        .into_record()
    }

    /// Inclusive range read
    pub fn range(&self, routing_key: &[u8], start: &[u8], end: &[u8]) -> Result<Vec<KeyValue>> {
        self.execute(Command::Range {
            routing_key: Bytes::copy_from_slice(routing_key),
            start: Bytes::copy_from_slice(start),
            end: Bytes::copy_from_slice(end),
        })?
        .into_records()
    }

    /// Inclusive range delete
    pub fn delete_range(
        &self,
        routing_key: &[u8],
        start: &[u8],
        end: &[u8],
    ) -> Result<Vec<KeyValue>> {
        self.execute(Command::DeleteRange {
            routing_key: Bytes::copy_from_slice(routing_key),
            start: Bytes::copy_from_slice(start),
            end: Bytes::copy_from_slice(end),
        })?
        .into_records()
    }

    /// Add `delta` to a counter, returning the new total
    pub fn increment(&self, routing_key: &[u8], key: &[u8], delta: i64) -> Result<i64> {
        self.execute(Command::Increment {
            routing_key: Bytes::copy_from_slice(routing_key),
            key: Bytes::copy_from_slice(key),
            delta,
        })?
        .into_number()
    }

    /// Read a counter
    pub fn get_number(&self, routing_key: &[u8], key: &[u8]) -> Result<i64> {
        self.execute(Command::GetNumber {
            routing_key: Bytes::copy_from_slice(routing_key),
            key: Bytes::copy_from_slice(key),
        })?
        .into_number()
    }

    /// Value and version of a key
    pub fn get_record(&self, routing_key: &[u8], key: &[u8]) -> Result<Option<Record>> {
        let (partition, key) = self.readable(
            Bytes::copy_from_slice(routing_key),
            Bytes::copy_from_slice(key),
        )?;
        Ok(partition.and_then(|p| p.get_record(&key)))
    }

    // =========================================================================
    // Accessors (for testing and debugging)
    // =========================================================================

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Number of partitions created so far
    pub fn partition_count(&self) -> usize {
        self.table.partition_count()
    }

    /// Number of result leases not yet released
    pub fn outstanding_results(&self) -> usize {
        self.tracker.outstanding()
    }

    // =========================================================================
    // Internal
    // =========================================================================

    /// Validate keys and resolve the partition, creating it if needed
    fn writable(&self, routing_key: Bytes, key: Bytes) -> Result<(Arc<Partition>, LocalKey)> {
        let routing_key = RoutingKey::new(routing_key)?;
        let key = LocalKey::new(key)?;
        Ok((self.table.partition_or_create(&routing_key), key))
    }

    /// Validate keys and resolve the partition if it exists
    fn readable(
        &self,
        routing_key: Bytes,
        key: Bytes,
    ) -> Result<(Option<Arc<Partition>>, LocalKey)> {
        let routing_key = RoutingKey::new(routing_key)?;
        let key = LocalKey::new(key)?;
        Ok((self.table.partition(&routing_key), key))
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

fn expected_version_of(version: i64) -> Result<u64> {
    u64::try_from(version)
        .map_err(|_| TableError::invalid(format!("expected version {} is negative", version)))
}

fn key_range(start: Bytes, end: Bytes) -> Result<KeyRange> {
    KeyRange::new(LocalKey::new(start)?, LocalKey::new(end)?)
}
