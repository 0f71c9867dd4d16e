//! The ledger seam: the durable key/value store the contract reads and writes.
//!
//! The contract only ever sees one [`Ledger`] per invocation. Commit,
//! conflict detection, and history belong to the implementation behind it.

pub mod memory;

pub use memory::{MemoryLedger, Transaction};

use bytes::Bytes;
use thiserror::Error;

/// Errors reported by a ledger implementation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LedgerError {
    /// A key read by the transaction was changed by a commit in the meantime.
    #[error("read conflict on key {0}")]
    Conflict(String),

    /// The backing store could not serve the request.
    #[error("ledger unavailable: {0}")]
    Unavailable(String),
}

/// Per-invocation view of the ledger.
///
/// `get` takes `&mut self` because transactional implementations record
/// what was read for commit-time validation.
#[cfg_attr(test, mockall::automock)]
pub trait Ledger {
    /// Fetch the value at `key`. `Ok(None)` means the key is absent, which is
    /// distinct from a present, zero-length value.
    fn get(&mut self, key: &str) -> Result<Option<Bytes>, LedgerError>;

    /// Stage `value` at `key`.
    fn put(&mut self, key: &str, value: &[u8]) -> Result<(), LedgerError>;
}
