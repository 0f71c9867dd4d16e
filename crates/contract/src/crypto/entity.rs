//! [`KeyMaterial`] and [`CipherEntity`]: one caller-supplied key bound to the
//! cipher primitive for exactly one invocation.

use std::fmt;
use std::sync::Arc;

use common::ContractError;
use tracing::debug;
use zeroize::Zeroizing;

use super::cipher::CipherPrimitive;

/// A symmetric key plus optional IV, supplied through the transient channel.
///
/// Both buffers are zeroized on drop. Not `Clone`: material is moved into a
/// [`CipherEntity`] and dies with it.
pub struct KeyMaterial {
    key: Zeroizing<Vec<u8>>,
    iv: Option<Zeroizing<Vec<u8>>>,
}

impl KeyMaterial {
    pub fn new(key: impl Into<Vec<u8>>, iv: Option<Vec<u8>>) -> Self {
        Self {
            key: Zeroizing::new(key.into()),
            iv: iv.map(Zeroizing::new),
        }
    }

    pub fn has_iv(&self) -> bool {
        self.iv.is_some()
    }

    fn iv(&self) -> Option<&[u8]> {
        self.iv.as_ref().map(|iv| iv.as_slice())
    }
}

impl fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Never print key material — not even in debug builds.
        f.write_str("KeyMaterial([REDACTED])")
    }
}

/// Binds one [`KeyMaterial`] to the cipher primitive.
///
/// Construction validates key and IV lengths up front. `encrypt` and
/// `decrypt` consume the entity, so an entity serves one transform and is
/// then dropped along with its key.
pub struct CipherEntity {
    id: String,
    primitive: Arc<dyn CipherPrimitive>,
    material: KeyMaterial,
}

impl CipherEntity {
    /// # Errors
    ///
    /// Returns [`ContractError::InvalidKeyMaterial`] if the key (or a supplied
    /// IV) does not have the length the primitive requires. No transform is
    /// attempted in that case.
    pub fn new(
        id: impl Into<String>,
        primitive: Arc<dyn CipherPrimitive>,
        material: KeyMaterial,
    ) -> Result<Self, ContractError> {
        let expected = primitive.key_len();
        if material.key.len() != expected {
            return Err(ContractError::InvalidKeyMaterial(format!(
                "key must be {expected} bytes, got {}",
                material.key.len()
            )));
        }
        if let Some(iv) = &material.iv {
            let expected = primitive.iv_len();
            if iv.len() != expected {
                return Err(ContractError::InvalidKeyMaterial(format!(
                    "IV must be {expected} bytes, got {}",
                    iv.len()
                )));
            }
        }
        Ok(Self {
            id: id.into(),
            primitive,
            material,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// # Errors
    ///
    /// Returns [`ContractError::EncryptionFailed`] on any primitive failure.
    pub fn encrypt(self, plaintext: &[u8]) -> Result<Vec<u8>, ContractError> {
        self.primitive
            .encrypt(&self.material.key, self.material.iv(), plaintext)
            .map_err(|e| {
                debug!(entity = %self.id, error = %e, "encrypt rejected by primitive");
                ContractError::EncryptionFailed
            })
    }

    /// # Errors
    ///
    /// Returns [`ContractError::DecryptionFailed`] for a wrong key or IV and for
    /// truncated or corrupted ciphertext. Never returns unauthenticated output.
    pub fn decrypt(self, ciphertext: &[u8]) -> Result<Vec<u8>, ContractError> {
        self.primitive
            .decrypt(&self.material.key, self.material.iv(), ciphertext)
            .map_err(|e| {
                debug!(entity = %self.id, error = %e, "decrypt rejected by primitive");
                ContractError::DecryptionFailed
            })
    }
}

impl fmt::Debug for CipherEntity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CipherEntity")
            .field("id", &self.id)
            .field("material", &self.material)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::cipher::{Aes256GcmSiv, CipherError, KEY_LEN, NONCE_LEN};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn aes() -> Arc<dyn CipherPrimitive> {
        Arc::new(Aes256GcmSiv)
    }

    /// Counts transform calls so tests can prove validation happens first.
    #[derive(Default)]
    struct CountingPrimitive {
        calls: AtomicUsize,
    }

    impl CipherPrimitive for CountingPrimitive {
        fn key_len(&self) -> usize {
            KEY_LEN
        }
        fn iv_len(&self) -> usize {
            NONCE_LEN
        }
        fn encrypt(&self, _: &[u8], _: Option<&[u8]>, pt: &[u8]) -> Result<Vec<u8>, CipherError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(pt.to_vec())
        }
        fn decrypt(&self, _: &[u8], _: Option<&[u8]>, ct: &[u8]) -> Result<Vec<u8>, CipherError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(ct.to_vec())
        }
    }

    #[test]
    fn encrypt_decrypt_round_trip() {
        let key = [0x42u8; KEY_LEN];
        let enc = CipherEntity::new("ID", aes(), KeyMaterial::new(key, None)).unwrap();
        let ct = enc.encrypt(b"secret-balance").unwrap();
        assert_ne!(ct, b"secret-balance");

        let dec = CipherEntity::new("ID", aes(), KeyMaterial::new(key, None)).unwrap();
        assert_eq!(dec.decrypt(&ct).unwrap(), b"secret-balance");
    }

    #[test]
    fn round_trip_with_iv() {
        let key = [0x11u8; KEY_LEN];
        let iv = vec![0x22u8; NONCE_LEN];
        let ct = CipherEntity::new("ID", aes(), KeyMaterial::new(key, Some(iv.clone())))
            .unwrap()
            .encrypt(b"v")
            .unwrap();
        let pt = CipherEntity::new("ID", aes(), KeyMaterial::new(key, Some(iv)))
            .unwrap()
            .decrypt(&ct)
            .unwrap();
        assert_eq!(pt, b"v");
    }

    #[test]
    fn wrong_key_length_rejected_without_transform() {
        let counting = Arc::new(CountingPrimitive::default());
        for len in [0, 16, 31, 33, 64] {
            let err = CipherEntity::new("ID", counting.clone(), KeyMaterial::new(vec![0u8; len], None))
                .unwrap_err();
            assert!(matches!(err, ContractError::InvalidKeyMaterial(_)), "len {len}");
        }
        assert_eq!(counting.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn wrong_iv_length_rejected() {
        let err = CipherEntity::new(
            "ID",
            aes(),
            KeyMaterial::new([0u8; KEY_LEN], Some(vec![0u8; 16])),
        )
        .unwrap_err();
        assert!(matches!(err, ContractError::InvalidKeyMaterial(ref m) if m.contains("IV")));
    }

    #[test]
    fn wrong_key_maps_to_decryption_failed() {
        let ct = CipherEntity::new("ID", aes(), KeyMaterial::new([1u8; KEY_LEN], None))
            .unwrap()
            .encrypt(b"secret")
            .unwrap();
        let err = CipherEntity::new("ID", aes(), KeyMaterial::new([2u8; KEY_LEN], None))
            .unwrap()
            .decrypt(&ct)
            .unwrap_err();
        assert_eq!(err, ContractError::DecryptionFailed);
    }

    #[test]
    fn flipped_bit_maps_to_decryption_failed() {
        let key = [9u8; KEY_LEN];
        let mut ct = CipherEntity::new("ID", aes(), KeyMaterial::new(key, None))
            .unwrap()
            .encrypt(b"payload")
            .unwrap();
        let last = ct.len() - 1;
        ct[last] ^= 0x80;
        let err = CipherEntity::new("ID", aes(), KeyMaterial::new(key, None))
            .unwrap()
            .decrypt(&ct)
            .unwrap_err();
        assert_eq!(err, ContractError::DecryptionFailed);
    }

    #[test]
    fn key_material_redacted_in_debug() {
        let material = KeyMaterial::new([0xFFu8; KEY_LEN], Some(vec![0xEE; NONCE_LEN]));
        assert!(material.has_iv());
        assert!(format!("{material:?}").contains("REDACTED"));

        let entity = CipherEntity::new("ID", aes(), material).unwrap();
        assert_eq!(entity.id(), "ID");
        let dbg = format!("{entity:?}");
        assert!(dbg.contains("REDACTED"));
        assert!(!dbg.contains("255"));
    }
}
