//! Error types for tablekv
//!
//! Provides a unified error type for all table operations, plus the stable
//! [`Code`] each error maps to at the dispatch boundary.

use thiserror::Error;

/// Result type alias using TableError
pub type Result<T> = std::result::Result<T, TableError>;

/// Unified error type for tablekv operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TableError {
    // -------------------------------------------------------------------------
    // Conditional Operation Errors
    // -------------------------------------------------------------------------
    #[error("Bad revision: expected version {expected}, current {}", describe_version(.current))]
    BadRevision {
        /// Version the caller asserted
        expected: u64,
        /// Version actually stored (None if the key is absent)
        current: Option<u64>,
    },

    #[error("Key not found")]
    KeyNotFound,

    // -------------------------------------------------------------------------
    // Value Errors
    // -------------------------------------------------------------------------
    #[error("Corrupt value: {0}")]
    CorruptValue(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    // -------------------------------------------------------------------------
    // Result Lifecycle Errors
    // -------------------------------------------------------------------------
    #[error("Key-value record already released")]
    AlreadyReleased,

    // -------------------------------------------------------------------------
    // Protocol Errors
    // -------------------------------------------------------------------------
    #[error("Protocol error: {0}")]
    Protocol(String),

    // -------------------------------------------------------------------------
    // Dispatch Errors
    // -------------------------------------------------------------------------
    #[error("Dispatcher is shut down")]
    Shutdown,

    #[error("Dispatcher error: {0}")]
    Dispatch(String),

    #[error("Operation timed out after {0} ms")]
    Timeout(u64),
}

fn describe_version(version: &Option<u64>) -> String {
    match version {
        Some(v) => v.to_string(),
        None => "absent".to_string(),
    }
}

/// Stable result codes surfaced to callers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Code {
    Ok = 0x00,
    BadRevision = 0x01,
    KeyNotFound = 0x02,
    CorruptValue = 0x03,
    InvalidArgument = 0x04,
    IllegalOp = 0x05,
    Unavailable = 0x06,
    Timeout = 0x07,
}

impl Code {
    /// Upper-case name used when printing codes
    pub fn name(self) -> &'static str {
        match self {
            Code::Ok => "OK",
            Code::BadRevision => "BAD_REVISION",
            Code::KeyNotFound => "KEY_NOT_FOUND",
            Code::CorruptValue => "CORRUPT_VALUE",
            Code::InvalidArgument => "INVALID_ARGUMENT",
            Code::IllegalOp => "ILLEGAL_OP",
            Code::Unavailable => "UNAVAILABLE",
            Code::Timeout => "TIMEOUT",
        }
    }
}

impl TableError {
    /// Map this error to its result code
    pub fn code(&self) -> Code {
        match self {
            TableError::BadRevision { .. } => Code::BadRevision,
            TableError::KeyNotFound => Code::KeyNotFound,
            TableError::CorruptValue(_) => Code::CorruptValue,
            TableError::InvalidArgument(_) | TableError::Protocol(_) => Code::InvalidArgument,
            TableError::AlreadyReleased => Code::IllegalOp,
            TableError::Shutdown | TableError::Dispatch(_) => Code::Unavailable,
            TableError::Timeout(_) => Code::Timeout,
        }
    }

    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        TableError::InvalidArgument(message.into())
    }
}
