//! # tablekv
//!
//! A partitioned, versioned key-value table engine with:
//! - Per-key versions for optimistic concurrency (`v_put` / `v_delete`)
//! - Create-only and value-conditioned writes
//! - Ordered, inclusive range scans and range deletes
//! - Atomic signed 64-bit counters
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                  Dispatcher (worker pool)                    │
//! │              submit(Command) -> Pending result               │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                        Engine                                │
//! │        (validation, routing, result leases)                  │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//!          ┌────────────┴────────────┐
//!          │                         │
//!          ▼                         ▼
//!   ┌─────────────┐          ┌─────────────┐
//!   │    Table    │─────────▶│  Partition  │  one per routing key
//!   │  (RwLock)   │          │ (BTreeMap)  │
//!   └─────────────┘          └──────┬──────┘
//!                                   │
//!                                   ▼
//!                           ┌─────────────┐
//!                           │   Counter   │
//!                           │   layer     │
//!                           └─────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod key;
pub mod store;
pub mod counter;
pub mod lifecycle;
pub mod protocol;
pub mod engine;
pub mod dispatcher;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{Code, Result, TableError};
pub use config::Config;
pub use engine::Engine;
pub use dispatcher::{Dispatcher, Pending};
pub use lifecycle::KeyValue;

// =============================================================================
// Version Info
// =============================================================================

/// Current version of tablekv
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
