//! Partition implementation
//!
//! Ordered, versioned record store for a single routing key.

use std::collections::BTreeMap;

use bytes::Bytes;
use parking_lot::{Mutex, RwLock};

use crate::error::{Result, TableError};
use crate::key::{KeyRange, LocalKey};
use super::Record;

/// A slot holds the record for one local key, or nothing once deleted
type Slot = Mutex<Option<Record>>;

/// Ordered map from local key to versioned record
///
/// ## Locking
///
/// - Point operations on a key that already has a slot: map read lock +
///   that slot's mutex. Different keys never contend.
/// - Creating a slot, reclaiming a vacated slot, and `delete_range`: map
///   write lock.
/// - `range`: map read lock, then every slot in the range locked in
///   ascending key order. Point operations only ever hold one slot, so the
///   ordering cannot deadlock, and the result is a consistent cut.
pub struct Partition {
    records: RwLock<BTreeMap<LocalKey, Slot>>,
}

impl Partition {
    /// Create a new empty partition
    pub fn new() -> Self {
        Self {
            records: RwLock::new(BTreeMap::new()),
        }
    }

    // =========================================================================
    // Point Reads
    // =========================================================================

    /// Get the current value of a key
    pub fn get(&self, key: &LocalKey) -> Option<Bytes> {
        self.get_record(key).map(|record| record.value)
    }

    /// Get the current value and version of a key
    pub fn get_record(&self, key: &LocalKey) -> Option<Record> {
        let records = self.records.read();
        let slot = records.get(key)?;
        let record = slot.lock().clone();
        record
    }

    // =========================================================================
    // Point Mutations
    // =========================================================================

    /// Unconditional upsert, returns the resulting version
    pub fn put(&self, key: &LocalKey, value: Bytes) -> u64 {
        self.mutate(key, |slot| match slot {
            Some(record) => record.update(value),
            None => {
                *slot = Some(Record::created(value));
                0
            }
        })
    }

    /// Create the record only if the key is absent
    ///
    /// Returns the existing value (and changes nothing) if the key is live.
    pub fn put_if_absent(&self, key: &LocalKey, value: Bytes) -> Option<Bytes> {
        self.mutate(key, |slot| match slot {
            Some(record) => Some(record.value.clone()),
            None => {
                *slot = Some(Record::created(value));
                None
            }
        })
    }

    /// Remove the key only if its value equals `expected`
    pub fn delete(&self, key: &LocalKey, expected: &[u8]) -> bool {
        self.mutate(key, |slot| {
            let matches = slot
                .as_ref()
                .is_some_and(|record| record.value.as_ref() == expected);
            if matches {
                *slot = None;
            }
            matches
        })
    }

    /// Version-conditioned put
    ///
    /// An absent key counts as version 0. On success the record's version
    /// becomes `expected + 1`.
    pub fn v_put(&self, key: &LocalKey, value: Bytes, expected: u64) -> Result<u64> {
        self.mutate(key, |slot| match slot {
            Some(record) if record.version == expected => Ok(record.update(value)),
            Some(record) => Err(TableError::BadRevision {
                expected,
                current: Some(record.version),
            }),
            None if expected == 0 => {
                *slot = Some(Record { value, version: 1 });
                Ok(1)
            }
            None => Err(TableError::BadRevision {
                expected,
                current: None,
            }),
        })
    }

    /// Version-conditioned delete, returns the removed record
    pub fn v_delete(&self, key: &LocalKey, expected: u64) -> Result<Record> {
        self.mutate(key, |slot| match slot.as_ref().map(|record| record.version) {
            Some(version) if version == expected => slot.take().ok_or(TableError::KeyNotFound),
            Some(version) => Err(TableError::BadRevision {
                expected,
                current: Some(version),
            }),
            None if expected == 0 => Err(TableError::KeyNotFound),
            None => Err(TableError::BadRevision {
                expected,
                current: None,
            }),
        })
    }

    // =========================================================================
    // Range Operations
    // =========================================================================

    /// Every live record in the inclusive range, ascending by key
    pub fn range(&self, range: &KeyRange) -> Vec<(LocalKey, Record)> {
        let records = self.records.read();

        // Hold every slot in the range before reading any of them
        let locked: Vec<_> = records
            .range(range.start().clone()..=range.end().clone())
            .map(|(key, slot)| (key, slot.lock()))
            .collect();

        locked
            .iter()
            .filter_map(|(key, slot)| {
                let slot: &Option<Record> = slot;
                slot.as_ref().map(|record| ((*key).clone(), record.clone()))
            })
            .collect()
    }

    /// Remove every live record in the inclusive range, returning them
    /// in ascending key order
    pub fn delete_range(&self, range: &KeyRange) -> Vec<(LocalKey, Record)> {
        let mut records = self.records.write();

        let keys: Vec<LocalKey> = records
            .range(range.start().clone()..=range.end().clone())
            .map(|(key, _)| key.clone())
            .collect();

        keys.into_iter()
            .filter_map(|key| {
                let slot = records.remove(&key)?;
                slot.into_inner().map(|record| (key, record))
            })
            .collect()
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Number of live records
    pub fn len(&self) -> usize {
        self.records
            .read()
            .values()
            .filter(|slot| slot.lock().is_some())
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // =========================================================================
    // Internal
    // =========================================================================

    /// Run `op` against the key's slot while holding that key's atomicity
    /// scope. `op` may fill, update or empty the slot.
    pub(crate) fn mutate<T>(
        &self,
        key: &LocalKey,
        op: impl FnOnce(&mut Option<Record>) -> T,
    ) -> T {
        {
            let records = self.records.read();
            if let Some(slot) = records.get(key) {
                let mut slot = slot.lock();
                let out = op(&mut *slot);
                let vacated = slot.is_none();
                drop(slot);
                drop(records);

                if vacated {
                    self.reclaim(key);
                }
                return out;
            }
        }

        // No slot yet: add one under the write lock
        let mut records = self.records.write();
        let slot = records
            .entry(key.clone())
            .or_insert_with(|| Mutex::new(None))
            .get_mut();
        let out = op(&mut *slot);
        if slot.is_none() {
            records.remove(key);
        }
        out
    }

    /// Drop a slot left empty by a delete, unless it was refilled meanwhile
    fn reclaim(&self, key: &LocalKey) {
        let mut records = self.records.write();
        if let Some(slot) = records.get_mut(key) {
            if slot.get_mut().is_none() {
                records.remove(key);
            }
        }
    }
}

impl Default for Partition {
    fn default() -> Self {
        Self::new()
    }
}
