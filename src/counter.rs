//! Counter Layer
//!
//! Signed 64-bit counters stored as ordinary versioned records. The value
//! is the 8-byte big-endian encoding of an `i64`.

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::error::{Result, TableError};
use crate::key::LocalKey;
use crate::store::{Partition, Record};

/// Width of an encoded counter value
pub const COUNTER_WIDTH: usize = 8;

/// Encode a counter value
pub fn encode(value: i64) -> Bytes {
    let mut buf = BytesMut::with_capacity(COUNTER_WIDTH);
    buf.put_i64(value);
    buf.freeze()
}

/// Decode a counter value, rejecting anything that is not exactly 8 bytes
pub fn decode(mut bytes: &[u8]) -> Result<i64> {
    if bytes.len() != COUNTER_WIDTH {
        return Err(TableError::CorruptValue(format!(
            "counter value must be {} bytes, got {}",
            COUNTER_WIDTH,
            bytes.len()
        )));
    }
    Ok(bytes.get_i64())
}

impl Partition {
    /// Atomically add `delta` to the counter at `key`, returning the new total
    ///
    /// An absent key starts from zero. Corrupt values and overflow leave the
    /// record untouched.
    pub fn increment(&self, key: &LocalKey, delta: i64) -> Result<i64> {
        self.mutate(key, |slot: &mut Option<Record>| -> Result<i64> {
            let current = match slot.as_ref() {
                Some(record) => decode(&record.value)?,
                None => 0,
            };
            let total = current.checked_add(delta).ok_or_else(|| {
                TableError::invalid(format!("counter overflow: {} + {}", current, delta))
            })?;

            match slot {
                Some(record) => {
                    record.update(encode(total));
                }
                None => *slot = Some(Record::created(encode(total))),
            }
            Ok(total)
        })
    }

    /// Read the counter at `key`
    pub fn get_number(&self, key: &LocalKey) -> Result<i64> {
        let record = self.get_record(key).ok_or(TableError::KeyNotFound)?;
        decode(&record.value)
    }
}
