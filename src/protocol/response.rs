//! Outcome definitions
//!
//! Represents the successful result of a command. Failures travel as
//! `TableError` and map to a [`Code`](crate::error::Code).

use bytes::Bytes;

use crate::error::{Result, TableError};
use crate::lifecycle::KeyValue;

/// Successful result of a command
#[derive(Debug)]
pub enum Outcome {
    /// Completed with nothing to return (put)
    Done,

    /// Optional value (get, put_if_absent)
    Value(Option<Bytes>),

    /// Whether a conditional delete removed the record
    Removed(bool),

    /// New version after a versioned put
    Version(u64),

    /// The record removed by a versioned delete
    Record(KeyValue),

    /// Ordered records (range, delete_range)
    Records(Vec<KeyValue>),

    /// Counter value (increment, get_number)
    Number(i64),
}

impl Outcome {
    pub fn into_value(self) -> Result<Option<Bytes>> {
        match self {
            Outcome::Value(value) => Ok(value),
            other => Err(unexpected("value", &other)),
        }
    }

    pub fn into_removed(self) -> Result<bool> {
        match self {
            Outcome::Removed(removed) => Ok(removed),
            other => Err(unexpected("removed flag", &other)),
        }
    }

    pub fn into_version(self) -> Result<u64> {
        match self {
            Outcome::Version(version) => Ok(version),
            other => Err(unexpected("version", &other)),
        }
    }

    pub fn into_record(self) -> Result<KeyValue> {
        match self {
            Outcome::Record(kv) => Ok(kv),
            other => Err(unexpected("record", &other)),
        }
    }

    pub fn into_records(self) -> Result<Vec<KeyValue>> {
        match self {
            Outcome::Records(kvs) => Ok(kvs),
            other => Err(unexpected("records", &other)),
        }
    }

    pub fn into_number(self) -> Result<i64> {
        match self {
            Outcome::Number(number) => Ok(number),
            other => Err(unexpected("number", &other)),
        }
    }
}

fn unexpected(wanted: &str, got: &Outcome) -> TableError {
    TableError::Protocol(format!("expected {} outcome, got {:?}", wanted, got))
}
