//! [`MemoryLedger`]: an in-process, versioned ledger with optimistic
//! transactions.
//!
//! Committed state is an immutable [`Snapshot`] behind `arc-swap`, so reads
//! never block. A [`Transaction`] reads from the snapshot taken when it
//! began, buffers its writes, and publishes a new snapshot on commit after
//! checking that nothing it read has changed.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};

use arc_swap::ArcSwap;
use bytes::Bytes;
use tracing::debug;

use super::{Ledger, LedgerError};

#[derive(Debug, Clone)]
struct Versioned {
    value: Bytes,
    /// Height of the block that last wrote this key.
    version: u64,
}

#[derive(Debug, Default)]
struct Snapshot {
    height: u64,
    entries: HashMap<String, Versioned>,
}

/// Shared handle to the committed ledger state.
///
/// Cheap to clone; all clones see the same state.
#[derive(Clone, Debug)]
pub struct MemoryLedger {
    state: Arc<ArcSwap<Snapshot>>,
    commit_lock: Arc<Mutex<()>>,
}

impl MemoryLedger {
    /// Create a new, empty ledger at height 0.
    pub fn new() -> Self {
        Self {
            state: Arc::new(ArcSwap::from_pointee(Snapshot::default())),
            commit_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Height of the last committed block.
    pub fn height(&self) -> u64 {
        self.state.load().height
    }

    /// Number of keys in committed state.
    pub fn len(&self) -> usize {
        self.state.load().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.load().entries.is_empty()
    }

    /// Read a committed value outside of any transaction.
    pub fn committed(&self, key: &str) -> Option<Bytes> {
        self.state.load().entries.get(key).map(|e| e.value.clone())
    }

    /// Start a transaction against the current snapshot.
    pub fn begin(&self) -> Transaction {
        Transaction {
            ledger: self.clone(),
            snapshot: self.state.load_full(),
            reads: HashMap::new(),
            writes: BTreeMap::new(),
        }
    }
}

impl Default for MemoryLedger {
    fn default() -> Self {
        Self::new()
    }
}

/// One invocation's view of a [`MemoryLedger`].
///
/// Dropping a transaction without calling [`Transaction::commit`] discards
/// every staged write.
#[derive(Debug)]
pub struct Transaction {
    ledger: MemoryLedger,
    snapshot: Arc<Snapshot>,
    /// Key -> version observed (`None` = absent).
    reads: HashMap<String, Option<u64>>,
    writes: BTreeMap<String, Bytes>,
}

impl Transaction {
    /// Validate the read set and publish the write set as a new block.
    ///
    /// Read-only transactions validate but do not advance the height.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Conflict`] if any key this transaction read was
    /// modified by another commit since [`MemoryLedger::begin`].
    pub fn commit(self) -> Result<u64, LedgerError> {
        let _guard = self
            .ledger
            .commit_lock
            .lock()
            .map_err(|_| LedgerError::Unavailable("commit lock poisoned".into()))?;

        let current = self.ledger.state.load_full();
        for (key, seen) in &self.reads {
            let now = current.entries.get(key).map(|e| e.version);
            if now != *seen {
                return Err(LedgerError::Conflict(key.clone()));
            }
        }

        if self.writes.is_empty() {
            return Ok(current.height);
        }

        let height = current.height + 1;
        let mut entries = current.entries.clone();
        let written = self.writes.len();
        for (key, value) in self.writes {
            entries.insert(
                key,
                Versioned {
                    value,
                    version: height,
                },
            );
        }
        self.ledger
            .state
            .store(Arc::new(Snapshot { height, entries }));
        debug!(height, written, "block committed");
        Ok(height)
    }
}

impl Ledger for Transaction {
    fn get(&mut self, key: &str) -> Result<Option<Bytes>, LedgerError> {
        if let Some(staged) = self.writes.get(key) {
            return Ok(Some(staged.clone()));
        }
        let entry = self.snapshot.entries.get(key);
        self.reads
            .entry(key.to_owned())
            .or_insert_with(|| entry.map(|e| e.version));
        Ok(entry.map(|e| e.value.clone()))
    }

    fn put(&mut self, key: &str, value: &[u8]) -> Result<(), LedgerError> {
        self.writes
            .insert(key.to_owned(), Bytes::copy_from_slice(value));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initially_empty() {
        let ledger = MemoryLedger::new();
        assert!(ledger.is_empty());
        assert_eq!(ledger.height(), 0);
        assert_eq!(ledger.committed("k"), None);
    }

    #[test]
    fn commit_publishes_writes() {
        let ledger = MemoryLedger::new();
        let mut tx = ledger.begin();
        tx.put("alice001", b"100").unwrap();
        assert_eq!(tx.commit().unwrap(), 1);
        assert_eq!(ledger.committed("alice001").as_deref(), Some(&b"100"[..]));
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn reads_own_writes() {
        let ledger = MemoryLedger::new();
        let mut tx = ledger.begin();
        tx.put("k", b"v").unwrap();
        assert_eq!(tx.get("k").unwrap().as_deref(), Some(&b"v"[..]));
        // Not visible outside until commit.
        assert_eq!(ledger.committed("k"), None);
    }

    #[test]
    fn dropped_transaction_leaves_no_trace() {
        let ledger = MemoryLedger::new();
        {
            let mut tx = ledger.begin();
            tx.put("k", b"v").unwrap();
        }
        assert!(ledger.is_empty());
        assert_eq!(ledger.height(), 0);
    }

    #[test]
    fn absent_and_empty_are_distinct() {
        let ledger = MemoryLedger::new();
        let mut tx = ledger.begin();
        tx.put("empty", b"").unwrap();
        tx.commit().unwrap();

        let mut tx = ledger.begin();
        assert_eq!(tx.get("missing").unwrap(), None);
        assert_eq!(tx.get("empty").unwrap(), Some(Bytes::new()));
    }

    #[test]
    fn stale_read_conflicts() {
        let ledger = MemoryLedger::new();
        let mut seed = ledger.begin();
        seed.put("k", b"1").unwrap();
        seed.commit().unwrap();

        let mut a = ledger.begin();
        let mut b = ledger.begin();
        assert!(a.get("k").unwrap().is_some());
        a.put("k", b"2").unwrap();
        b.get("k").unwrap();
        b.put("k", b"3").unwrap();

        a.commit().unwrap();
        assert_eq!(b.commit(), Err(LedgerError::Conflict("k".into())));
        assert_eq!(ledger.committed("k").as_deref(), Some(&b"2"[..]));
    }

    #[test]
    fn phantom_read_of_absent_key_conflicts() {
        let ledger = MemoryLedger::new();
        let mut a = ledger.begin();
        assert_eq!(a.get("new").unwrap(), None);

        let mut b = ledger.begin();
        b.put("new", b"x").unwrap();
        b.commit().unwrap();

        a.put("other", b"y").unwrap();
        assert!(matches!(a.commit(), Err(LedgerError::Conflict(_))));
    }

    #[test]
    fn blind_writes_do_not_conflict() {
        let ledger = MemoryLedger::new();
        let mut a = ledger.begin();
        let mut b = ledger.begin();
        a.put("k", b"a").unwrap();
        b.put("k", b"b").unwrap();
        assert_eq!(a.commit().unwrap(), 1);
        assert_eq!(b.commit().unwrap(), 2);
        assert_eq!(ledger.committed("k").as_deref(), Some(&b"b"[..]));
    }

    #[test]
    fn read_only_commit_keeps_height() {
        let ledger = MemoryLedger::new();
        let mut tx = ledger.begin();
        tx.get("k").unwrap();
        assert_eq!(tx.commit().unwrap(), 0);
        assert_eq!(ledger.height(), 0);
    }
}
