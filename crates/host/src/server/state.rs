//! Shared application state injected into every Axum handler.

use std::sync::Arc;

use contract::{Aes256GcmSiv, Contract, ContractOptions, MemoryLedger};

/// Application state shared across all request handlers.
///
/// Both fields are cheaply cloneable (`Arc`-backed) so Axum can clone the
/// state per request. Neither holds key material.
#[derive(Clone, Debug)]
pub struct AppState {
    /// The contract instance, with its cipher primitive already injected.
    pub contract: Contract,
    /// Committed ledger state; each invocation runs in its own transaction.
    pub ledger: MemoryLedger,
}

impl AppState {
    pub fn new(contract: Contract, ledger: MemoryLedger) -> Self {
        Self { contract, ledger }
    }
}

impl Default for AppState {
    /// AES-256-GCM-SIV, default options, empty ledger. Suitable for tests.
    fn default() -> Self {
        Self::new(
            Contract::new(Arc::new(Aes256GcmSiv::new()), ContractOptions::default()),
            MemoryLedger::new(),
        )
    }
}
