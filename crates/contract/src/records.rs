//! Record reads and writes against one invocation's [`Ledger`].
//!
//! Plaintext records are stored verbatim. Encrypted records go through a
//! freshly built [`CipherEntity`] on every call; only ciphertext reaches the
//! ledger.

use std::sync::Arc;

use bytes::Bytes;
use common::ContractError;
use tracing::{info, warn};

use crate::crypto::{CipherEntity, CipherPrimitive, KeyMaterial};
use crate::key::{CompositeKey, KeyScheme};
use crate::ledger::Ledger;

/// Identifier given to every cipher entity built by the record store.
const ENTITY_ID: &str = "record-store";

/// Record operations bound to a ledger view, a cipher primitive, and a key scheme.
pub struct RecordStore<'a> {
    ledger: &'a mut dyn Ledger,
    primitive: Arc<dyn CipherPrimitive>,
    scheme: KeyScheme,
}

impl<'a> RecordStore<'a> {
    pub fn new(
        ledger: &'a mut dyn Ledger,
        primitive: Arc<dyn CipherPrimitive>,
        scheme: KeyScheme,
    ) -> Self {
        Self {
            ledger,
            primitive,
            scheme,
        }
    }

    /// Store `value` verbatim. Returns the encoded ledger key.
    pub fn put_plain(&mut self, key: &CompositeKey, value: &[u8]) -> Result<String, ContractError> {
        let ledger_key = key.encode(self.scheme);
        self.ledger
            .put(&ledger_key, value)
            .map_err(|e| ContractError::StorageWriteFailed(e.to_string()))?;
        Ok(ledger_key)
    }

    /// Fetch a plaintext value.
    ///
    /// An absent key is [`ContractError::RecordNotFound`]; a present but empty
    /// value is returned as an empty payload.
    pub fn get_plain(&mut self, key: &CompositeKey) -> Result<Bytes, ContractError> {
        let ledger_key = key.encode(self.scheme);
        self.ledger
            .get(&ledger_key)
            .map_err(|e| ContractError::StorageReadFailed(e.to_string()))?
            .ok_or(ContractError::RecordNotFound(ledger_key))
    }

    /// Encrypt `plaintext` under `material` and store the ciphertext.
    ///
    /// Returns the encoded ledger key. Nothing is written if the key material
    /// is invalid or encryption fails.
    pub fn write_encrypted(
        &mut self,
        key: &CompositeKey,
        plaintext: &[u8],
        material: KeyMaterial,
    ) -> Result<String, ContractError> {
        let ledger_key = key.encode(self.scheme);
        let entity = CipherEntity::new(ENTITY_ID, self.primitive.clone(), material)?;
        let ciphertext = entity.encrypt(plaintext)?;

        self.ledger
            .put(&ledger_key, &ciphertext)
            .map_err(|e| ContractError::StorageWriteFailed(e.to_string()))?;

        info!(key = %ledger_key, ciphertext_len = ciphertext.len(), "encrypted record written");
        Ok(ledger_key)
    }

    /// Fetch the ciphertext at `key` and decrypt it under `material`.
    ///
    /// # Errors
    ///
    /// - [`ContractError::RecordNotFound`] if the key is absent.
    /// - [`ContractError::EmptyCiphertext`] if the entry is zero-length.
    /// - [`ContractError::InvalidKeyMaterial`] if `material` is unusable.
    /// - [`ContractError::DecryptionFailed`] for a wrong key/IV or corrupt data.
    pub fn read_encrypted(
        &mut self,
        key: &CompositeKey,
        material: KeyMaterial,
    ) -> Result<Vec<u8>, ContractError> {
        let ledger_key = key.encode(self.scheme);
        let ciphertext = self
            .ledger
            .get(&ledger_key)
            .map_err(|e| ContractError::StorageReadFailed(e.to_string()))?
            .ok_or_else(|| ContractError::RecordNotFound(ledger_key.clone()))?;

        if ciphertext.is_empty() {
            return Err(ContractError::EmptyCiphertext(ledger_key));
        }

        let entity = CipherEntity::new(ENTITY_ID, self.primitive.clone(), material)?;
        entity.decrypt(&ciphertext).inspect_err(|_| {
            warn!(key = %ledger_key, "could not decrypt record");
        })
    }
}
