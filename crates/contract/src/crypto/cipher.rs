//! The symmetric cipher primitive and its AES-256-GCM-SIV implementation.
//!
//! **Algorithm choice:** AES-256-GCM-SIV (RFC 8452) is nonce-misuse-resistant.
//! Callers may pin the IV through the transient channel, so the same IV can
//! end up reused across records; under GCM-SIV that only reveals equality of
//! identical plaintexts, it does not break authentication.
//!
//! **Do NOT substitute plain AES-256-GCM.** A caller-pinned nonce reused under
//! GCM is catastrophic for both confidentiality and integrity.

use aes_gcm_siv::{
    aead::{Aead, KeyInit, OsRng},
    Aes256GcmSiv as Aes256GcmSivCipher, Nonce,
};
use thiserror::Error;

/// Byte length of an AES-256 key (32 bytes = 256 bits).
pub const KEY_LEN: usize = 32;

/// Byte length of an AES-GCM-SIV nonce (12 bytes = 96 bits).
pub const NONCE_LEN: usize = 12;

/// Byte length of the authentication tag appended to every ciphertext.
pub const TAG_LEN: usize = 16;

/// Errors produced by the cipher layer.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CipherError {
    #[error("invalid key length: expected {expected} bytes, got {got}")]
    InvalidKeyLength { expected: usize, got: usize },

    #[error("invalid IV length: expected {expected} bytes, got {got}")]
    InvalidIvLength { expected: usize, got: usize },

    /// Ciphertext is too short to hold the nonce and tag it must carry.
    #[error("ciphertext truncated")]
    Truncated,

    /// AEAD encryption or decryption failed (wrong key, wrong IV, tampered data).
    #[error("aead operation failed")]
    AeadFailure,
}

/// Opaque `encrypt(key, iv, plaintext)` / `decrypt(key, iv, ciphertext)` provider.
///
/// The contract is handed one implementation at construction; cipher entities
/// borrow it for the length of a single invocation.
pub trait CipherPrimitive: Send + Sync {
    /// Required key length in bytes.
    fn key_len(&self) -> usize;

    /// Required IV length in bytes, when an IV is supplied.
    fn iv_len(&self) -> usize;

    /// Encrypt `plaintext`. With `iv == None` the primitive picks its own IV
    /// and is responsible for making it recoverable from the output.
    fn encrypt(&self, key: &[u8], iv: Option<&[u8]>, plaintext: &[u8])
        -> Result<Vec<u8>, CipherError>;

    /// Inverse of [`CipherPrimitive::encrypt`] for the same `key` and `iv`.
    fn decrypt(&self, key: &[u8], iv: Option<&[u8]>, ciphertext: &[u8])
        -> Result<Vec<u8>, CipherError>;
}

/// AES-256-GCM-SIV primitive.
///
/// Output framing:
/// - IV supplied: `ciphertext || tag`. The IV is not part of the output.
/// - IV absent: `nonce || ciphertext || tag`, with a fresh random nonce per call.
#[derive(Debug, Clone, Copy, Default)]
pub struct Aes256GcmSiv;

impl Aes256GcmSiv {
    pub fn new() -> Self {
        Self
    }
}

impl CipherPrimitive for Aes256GcmSiv {
    fn key_len(&self) -> usize {
        KEY_LEN
    }

    fn iv_len(&self) -> usize {
        NONCE_LEN
    }

    fn encrypt(
        &self,
        key: &[u8],
        iv: Option<&[u8]>,
        plaintext: &[u8],
    ) -> Result<Vec<u8>, CipherError> {
        let cipher = build_cipher(key)?;
        match iv {
            Some(iv) => {
                let nonce = checked_nonce(iv)?;
                cipher
                    .encrypt(nonce, plaintext)
                    .map_err(|_| CipherError::AeadFailure)
            }
            None => {
                // Use OsRng for a cryptographically secure random nonce.
                use aes_gcm_siv::aead::rand_core::RngCore;
                let mut nonce_bytes = [0u8; NONCE_LEN];
                OsRng.fill_bytes(&mut nonce_bytes);

                let sealed = cipher
                    .encrypt(Nonce::from_slice(&nonce_bytes), plaintext)
                    .map_err(|_| CipherError::AeadFailure)?;

                let mut out = Vec::with_capacity(NONCE_LEN + sealed.len());
                out.extend_from_slice(&nonce_bytes);
                out.extend_from_slice(&sealed);
                Ok(out)
            }
        }
    }

    fn decrypt(
        &self,
        key: &[u8],
        iv: Option<&[u8]>,
        ciphertext: &[u8],
    ) -> Result<Vec<u8>, CipherError> {
        let cipher = build_cipher(key)?;
        let (nonce, sealed) = match iv {
            Some(iv) => (checked_nonce(iv)?, ciphertext),
            None => {
                if ciphertext.len() < NONCE_LEN + TAG_LEN {
                    return Err(CipherError::Truncated);
                }
                let (nonce, rest) = ciphertext.split_at(NONCE_LEN);
                (Nonce::from_slice(nonce), rest)
            }
        };
        if sealed.len() < TAG_LEN {
            return Err(CipherError::Truncated);
        }
        cipher
            .decrypt(nonce, sealed)
            .map_err(|_| CipherError::AeadFailure)
    }
}

fn build_cipher(key: &[u8]) -> Result<Aes256GcmSivCipher, CipherError> {
    if key.len() != KEY_LEN {
        return Err(CipherError::InvalidKeyLength {
            expected: KEY_LEN,
            got: key.len(),
        });
    }
    Aes256GcmSivCipher::new_from_slice(key).map_err(|_| CipherError::InvalidKeyLength {
        expected: KEY_LEN,
        got: key.len(),
    })
}

fn checked_nonce(iv: &[u8]) -> Result<&Nonce, CipherError> {
    if iv.len() != NONCE_LEN {
        return Err(CipherError::InvalidIvLength {
            expected: NONCE_LEN,
            got: iv.len(),
        });
    }
    Ok(Nonce::from_slice(iv))
}
