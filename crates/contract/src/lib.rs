//! Record-store contract for a ledger-backed key/value store.
//!
//! Records are addressed by a [`CompositeKey`] and stored either verbatim or
//! as ciphertext produced under a key the caller supplies through the
//! transient channel for a single invocation.
//!
//! ```text
//! Contract::dispatch ─┬─ CompositeKey::encode
//!                     ├─ CipherEntity (KeyMaterial + CipherPrimitive)
//!                     └─ RecordStore ── Ledger
//! ```
//!
//! The cipher primitive is injected through [`Contract::new`]; nothing in
//! this crate holds a process-wide default.

pub mod crypto;
pub mod key;
pub mod ledger;
pub mod records;
pub mod router;

pub use crypto::{Aes256GcmSiv, CipherEntity, CipherError, CipherPrimitive, KeyMaterial};
pub use key::{CompositeKey, KeyScheme};
pub use ledger::{Ledger, LedgerError, MemoryLedger, Transaction};
pub use records::RecordStore;
pub use router::{Contract, ContractOptions, Function, Transient};
