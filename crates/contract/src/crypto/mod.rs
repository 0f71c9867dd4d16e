//! Per-invocation encryption of record values.
//!
//! This module is intentionally free of ledger and routing concerns. It
//! provides the cipher primitive seam and the single-use entity that binds
//! caller key material to it.
//!
//! # Key material invariants
//!
//! - Key and IV bytes arrive through the transient channel and live only in a
//!   [`KeyMaterial`] for the duration of one invocation.
//! - They are never written to the ledger, logged, or exposed by an accessor.

pub mod cipher;
pub mod entity;

pub use cipher::{Aes256GcmSiv, CipherError, CipherPrimitive, KEY_LEN, NONCE_LEN};
pub use entity::{CipherEntity, KeyMaterial};
