//! Error taxonomy shared by the contract and its host.

use thiserror::Error;

/// Every way an invocation can fail.
///
/// The host flattens these into an [`ErrorResponse`](crate::protocol::ErrorResponse)
/// using [`ContractError::code`] and [`ContractError::http_status`]. Messages
/// never carry key bytes, IV bytes, or plaintext.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ContractError {
    /// Wrong argument count for the requested function. Raised before any
    /// ledger or cipher call is made.
    #[error("{function}: expected {expected} arguments, got {got}")]
    BadArity {
        function: String,
        expected: usize,
        got: usize,
    },

    /// The function name does not match any exposed operation.
    #[error("unknown function: {0}")]
    UnknownFunction(String),

    /// A required transient field was not supplied with the invocation.
    #[error("missing transient field: {0}")]
    MissingTransient(String),

    /// Key or IV has a length the cipher cannot use.
    #[error("invalid key material: {0}")]
    InvalidKeyMaterial(String),

    #[error("encryption failed")]
    EncryptionFailed,

    /// Wrong key, wrong IV, or a tampered/truncated ciphertext.
    #[error("decryption failed")]
    DecryptionFailed,

    #[error("record not found: {0}")]
    RecordNotFound(String),

    /// The entry exists but holds zero bytes, which no cipher can produce.
    #[error("no ciphertext to decrypt at {0}")]
    EmptyCiphertext(String),

    #[error("storage write failed: {0}")]
    StorageWriteFailed(String),

    #[error("storage read failed: {0}")]
    StorageReadFailed(String),
}

impl ContractError {
    /// Short machine-readable code sent to callers.
    pub fn code(&self) -> &'static str {
        match self {
            ContractError::BadArity { .. } => "bad_arity",
            ContractError::UnknownFunction(_) => "unknown_function",
            ContractError::MissingTransient(_) => "missing_transient",
            ContractError::InvalidKeyMaterial(_) => "invalid_key_material",
            ContractError::EncryptionFailed => "encryption_failed",
            ContractError::DecryptionFailed => "decryption_failed",
            ContractError::RecordNotFound(_) => "record_not_found",
            ContractError::EmptyCiphertext(_) => "empty_ciphertext",
            ContractError::StorageWriteFailed(_) => "storage_write_failed",
            ContractError::StorageReadFailed(_) => "storage_read_failed",
        }
    }

    /// Returns the HTTP status code that should be sent for this error.
    pub fn http_status(&self) -> u16 {
        match self {
            ContractError::BadArity { .. }
            | ContractError::UnknownFunction(_)
            | ContractError::MissingTransient(_)
            | ContractError::InvalidKeyMaterial(_) => 400,
            ContractError::DecryptionFailed => 403,
            ContractError::RecordNotFound(_) => 404,
            ContractError::EncryptionFailed
            | ContractError::EmptyCiphertext(_)
            | ContractError::StorageWriteFailed(_)
            | ContractError::StorageReadFailed(_) => 500,
        }
    }
}
