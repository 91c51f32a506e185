//! Protocol Module
//!
//! Defines the operation contract between callers and the engine.
//!
//! ## Operations
//! | Command      | Outcome                 | Errors                       |
//! |--------------|-------------------------|------------------------------|
//! | Put          | Done                    | -                            |
//! | PutIfAbsent  | Value (existing value)  | -                            |
//! | Get          | Value                   | -                            |
//! | Delete       | Removed                 | -                            |
//! | VPut         | Version                 | BadRevision                  |
//! | VDelete      | Record                  | BadRevision, KeyNotFound     |
//! | Range        | Records                 | -                            |
//! | DeleteRange  | Records                 | -                            |
//! | Increment    | Number (new total)      | CorruptValue                 |
//! | GetNumber    | Number                  | KeyNotFound, CorruptValue    |
//!
//! Any command may also fail with InvalidArgument (empty keys, negative
//! versions, inverted range bounds).

mod command;
mod response;
pub mod codec;

pub use command::{Command, CommandType};
pub use response::Outcome;
pub use codec::{format_error, format_outcome, parse_command};
