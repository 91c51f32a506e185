//! Resource Lifecycle for Query Results
//!
//! Records handed out by `range`, `delete_range` and `v_delete` are leases.
//! The caller owns each [`KeyValue`] and releases it exactly once, either
//! with [`KeyValue::release`] or by dropping it. The engine's
//! [`ResultTracker`] counts leases still outstanding.

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use bytes::Bytes;

use crate::error::{Result, TableError};
use crate::key::LocalKey;
use crate::store::Record;

/// Counts outstanding result leases
#[derive(Debug, Default)]
pub struct ResultTracker {
    outstanding: AtomicUsize,
}

impl ResultTracker {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Number of leases not yet released
    pub fn outstanding(&self) -> usize {
        self.outstanding.load(Ordering::Acquire)
    }

    /// Hand out a lease over one record
    pub fn lease(self: &Arc<Self>, key: LocalKey, record: Record) -> KeyValue {
        self.outstanding.fetch_add(1, Ordering::AcqRel);
        KeyValue {
            key,
            value: Some(record.value),
            version: record.version,
            tracker: Arc::clone(self),
        }
    }

    /// Hand out leases for a batch, preserving order
    pub fn lease_all(self: &Arc<Self>, records: Vec<(LocalKey, Record)>) -> Vec<KeyValue> {
        records
            .into_iter()
            .map(|(key, record)| self.lease(key, record))
            .collect()
    }

    fn release(&self) {
        self.outstanding.fetch_sub(1, Ordering::AcqRel);
    }
}

/// Snapshot of one record, owned by the caller
pub struct KeyValue {
    key: LocalKey,
    /// None once released
    value: Option<Bytes>,
    version: u64,
    tracker: Arc<ResultTracker>,
}

impl KeyValue {
    pub fn key(&self) -> &LocalKey {
        &self.key
    }

    /// The value bytes; fails once the lease has been released
    pub fn value(&self) -> Result<&Bytes> {
        self.value.as_ref().ok_or(TableError::AlreadyReleased)
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn is_released(&self) -> bool {
        self.value.is_none()
    }

    /// Release the value buffer. A second release is an error.
    pub fn release(&mut self) -> Result<()> {
        match self.value.take() {
            Some(_) => {
                self.tracker.release();
                Ok(())
            }
            None => Err(TableError::AlreadyReleased),
        }
    }

    /// Take the value out, releasing the lease
    pub fn into_value(mut self) -> Result<Bytes> {
        let value = self.value.take().ok_or(TableError::AlreadyReleased)?;
        self.tracker.release();
        Ok(value)
    }
}

impl Drop for KeyValue {
    fn drop(&mut self) {
        if self.value.take().is_some() {
            self.tracker.release();
        }
    }
}

impl fmt::Debug for KeyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyValue")
            .field("key", &self.key)
            .field("value", &self.value)
            .field("version", &self.version)
            .finish()
    }
}
