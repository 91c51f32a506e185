//! Command definitions
//!
//! Represents table operations submitted by clients.

use bytes::Bytes;

/// Command types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum CommandType {
    Put = 0x01,
    PutIfAbsent = 0x02,
    Get = 0x03,
    Delete = 0x04,
    VPut = 0x05,
    VDelete = 0x06,
    Range = 0x07,
    DeleteRange = 0x08,
    Increment = 0x09,
    GetNumber = 0x0a,
}

/// A table command
///
/// Expected versions are signed so that negative input from callers can be
/// rejected rather than silently wrapped.
#[derive(Debug, Clone)]
pub enum Command {
    /// Unconditional upsert
    Put {
        routing_key: Bytes,
        key: Bytes,
        value: Bytes,
    },

    /// Create only if absent; yields the existing value otherwise
    PutIfAbsent {
        routing_key: Bytes,
        key: Bytes,
        value: Bytes,
    },

    /// Point read
    Get { routing_key: Bytes, key: Bytes },

    /// Delete if the stored value equals `expected`
    Delete {
        routing_key: Bytes,
        key: Bytes,
        expected: Bytes,
    },

    /// Put if the stored version equals `expected_version`
    VPut {
        routing_key: Bytes,
        key: Bytes,
        value: Bytes,
        expected_version: i64,
    },

    /// Delete if the stored version equals `expected_version`
    VDelete {
        routing_key: Bytes,
        key: Bytes,
        expected_version: i64,
    },

    /// Inclusive range read
    Range {
        routing_key: Bytes,
        start: Bytes,
        end: Bytes,
    },

    /// Inclusive range delete
    DeleteRange {
        routing_key: Bytes,
        start: Bytes,
        end: Bytes,
    },

    /// Atomic counter add
    Increment {
        routing_key: Bytes,
        key: Bytes,
        delta: i64,
    },

    /// Counter read
    GetNumber { routing_key: Bytes, key: Bytes },
}

impl Command {
    /// Get the command type
    pub fn command_type(&self) -> CommandType {
        match self {
            Command::Put { .. } => CommandType::Put,
            Command::PutIfAbsent { .. } => CommandType::PutIfAbsent,
            Command::Get { .. } => CommandType::Get,
            Command::Delete { .. } => CommandType::Delete,
            Command::VPut { .. } => CommandType::VPut,
            Command::VDelete { .. } => CommandType::VDelete,
            Command::Range { .. } => CommandType::Range,
            Command::DeleteRange { .. } => CommandType::DeleteRange,
            Command::Increment { .. } => CommandType::Increment,
            Command::GetNumber { .. } => CommandType::GetNumber,
        }
    }

    /// Routing key the command targets
    pub fn routing_key(&self) -> &Bytes {
        match self {
            Command::Put { routing_key, .. }
            | Command::PutIfAbsent { routing_key, .. }
            | Command::Get { routing_key, .. }
            | Command::Delete { routing_key, .. }
            | Command::VPut { routing_key, .. }
            | Command::VDelete { routing_key, .. }
            | Command::Range { routing_key, .. }
            | Command::DeleteRange { routing_key, .. }
            | Command::Increment { routing_key, .. }
            | Command::GetNumber { routing_key, .. } => routing_key,
        }
    }

    /// Whether the command can change stored state
    pub fn is_mutation(&self) -> bool {
        !matches!(
            self,
            Command::Get { .. } | Command::Range { .. } | Command::GetNumber { .. }
        )
    }
}
