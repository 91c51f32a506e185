//! Text codec
//!
//! Line-oriented command syntax used by the interactive shell.
//!
//! ## Command Syntax
//! ```text
//! put          <rkey> <lkey> <value>
//! putifabsent  <rkey> <lkey> <value>
//! get          <rkey> <lkey>
//! del          <rkey> <lkey> <expected-value>
//! vput         <rkey> <lkey> <value> <expected-version>
//! vdel         <rkey> <lkey> <expected-version>
//! range        <rkey> <start> <end>
//! delrange     <rkey> <start> <end>
//! incr         <rkey> <lkey> <delta>
//! getnum       <rkey> <lkey>
//! ```
//!
//! Tokens are separated by whitespace; keys and values are taken as UTF-8
//! bytes verbatim.

use bytes::Bytes;

use crate::error::{Result, TableError};
use crate::lifecycle::KeyValue;
use super::{Command, Outcome};

// =============================================================================
// Parsing
// =============================================================================

/// Parse one line into a command
pub fn parse_command(line: &str) -> Result<Command> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    let (name, args) = tokens
        .split_first()
        .ok_or_else(|| TableError::Protocol("empty command".to_string()))?;

    match name.to_ascii_lowercase().as_str() {
        "put" => {
            let [rkey, key, value] = expect_args::<3>("put", args)?;
            Ok(Command::Put {
                routing_key: bytes(rkey),
                key: bytes(key),
                value: bytes(value),
            })
        }
        "putifabsent" => {
            let [rkey, key, value] = expect_args::<3>("putifabsent", args)?;
            Ok(Command::PutIfAbsent {
                routing_key: bytes(rkey),
                key: bytes(key),
                value: bytes(value),
            })
        }
        "get" => {
            let [rkey, key] = expect_args::<2>("get", args)?;
            Ok(Command::Get {
                routing_key: bytes(rkey),
                key: bytes(key),
            })
        }
        "del" => {
            let [rkey, key, expected] = expect_args::<3>("del", args)?;
            Ok(Command::Delete {
                routing_key: bytes(rkey),
                key: bytes(key),
                expected: bytes(expected),
            })
        }
        "vput" => {
            let [rkey, key, value, version] = expect_args::<4>("vput", args)?;
            Ok(Command::VPut {
                routing_key: bytes(rkey),
                key: bytes(key),
                value: bytes(value),
                expected_version: integer("vput", version)?,
            })
        }
        "vdel" => {
            let [rkey, key, version] = expect_args::<3>("vdel", args)?;
            Ok(Command::VDelete {
                routing_key: bytes(rkey),
                key: bytes(key),
                expected_version: integer("vdel", version)?,
            })
        }
        "range" => {
            let [rkey, start, end] = expect_args::<3>("range", args)?;
            Ok(Command::Range {
                routing_key: bytes(rkey),
                start: bytes(start),
                end: bytes(end),
            })
        }
        "delrange" => {
            let [rkey, start, end] = expect_args::<3>("delrange", args)?;
            Ok(Command::DeleteRange {
                routing_key: bytes(rkey),
                start: bytes(start),
                end: bytes(end),
            })
        }
        "incr" => {
            let [rkey, key, delta] = expect_args::<3>("incr", args)?;
            Ok(Command::Increment {
                routing_key: bytes(rkey),
                key: bytes(key),
                delta: integer("incr", delta)?,
            })
        }
        "getnum" => {
            let [rkey, key] = expect_args::<2>("getnum", args)?;
            Ok(Command::GetNumber {
                routing_key: bytes(rkey),
                key: bytes(key),
            })
        }
        other => Err(TableError::Protocol(format!("unknown command: {}", other))),
    }
}

fn expect_args<'a, const N: usize>(name: &str, args: &[&'a str]) -> Result<[&'a str; N]> {
    <[&str; N]>::try_from(args).map_err(|_| {
        TableError::Protocol(format!(
            "{}: expected {} arguments, got {}",
            name,
            N,
            args.len()
        ))
    })
}

fn bytes(token: &str) -> Bytes {
    Bytes::copy_from_slice(token.as_bytes())
}

fn integer(name: &str, token: &str) -> Result<i64> {
    token
        .parse()
        .map_err(|_| TableError::Protocol(format!("{}: not an integer: {}", name, token)))
}

// =============================================================================
// Formatting
// =============================================================================

/// Render an outcome for display
pub fn format_outcome(outcome: &Outcome) -> String {
    match outcome {
        Outcome::Done => "OK".to_string(),
        Outcome::Value(None) => "(nil)".to_string(),
        Outcome::Value(Some(value)) => quoted(value),
        Outcome::Removed(removed) => removed.to_string(),
        Outcome::Version(version) => format!("(version) {}", version),
        Outcome::Record(kv) => format_record(kv),
        Outcome::Records(kvs) if kvs.is_empty() => "(empty)".to_string(),
        Outcome::Records(kvs) => kvs
            .iter()
            .enumerate()
            .map(|(i, kv)| format!("{}) {}", i + 1, format_record(kv)))
            .collect::<Vec<_>>()
            .join("\n"),
        Outcome::Number(number) => format!("(integer) {}", number),
    }
}

/// Render an error with its result code
pub fn format_error(error: &TableError) -> String {
    format!("(error) {}: {}", error.code().name(), error)
}

fn format_record(kv: &KeyValue) -> String {
    let value = match kv.value() {
        Ok(value) => quoted(value),
        Err(_) => "(released)".to_string(),
    };
    format!(
        "{} => {} @{}",
        String::from_utf8_lossy(kv.key().as_bytes()),
        value,
        kv.version()
    )
}

fn quoted(value: &[u8]) -> String {
    format!("\"{}\"", String::from_utf8_lossy(value))
}
