//! Request and response types exchanged between the host and its callers.
//!
//! Binary values (transient fields, response payloads) travel as standard
//! base64 strings inside JSON bodies.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Transient field carrying the encryption key for `encRecord`.
pub const ENCKEY: &str = "ENCKEY";
/// Transient field carrying the decryption key for `decRecord`.
pub const DECKEY: &str = "DECKEY";
/// Optional transient field carrying the initialization vector.
pub const IV: &str = "IV";

// ---------------------------------------------------------------------------
// Invoke endpoint
// ---------------------------------------------------------------------------

/// Request body for `POST /invoke`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvokeRequest {
    /// Name of the contract function, e.g. `"encRecord"`.
    pub function: String,
    /// Positional string arguments.
    #[serde(default)]
    pub args: Vec<String>,
    /// Side-channel values, base64 encoded. Never committed to the ledger.
    #[serde(default)]
    pub transient: BTreeMap<String, String>,
}

/// Successful response body for `POST /invoke`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvokeResponse {
    /// Identifier of the ledger transaction the invocation ran in.
    pub tx_id: String,
    /// Raw result payload, base64 encoded.
    pub payload: String,
}

// ---------------------------------------------------------------------------
// Error response
// ---------------------------------------------------------------------------

/// Standard error response body returned on any non-2xx status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Short machine-readable error code (e.g. `"record_not_found"`).
    pub code: String,
    /// Human-readable description safe to expose to callers.
    pub message: String,
}

impl ErrorResponse {
    /// Construct an [`ErrorResponse`] from a code and message.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

impl From<&crate::ContractError> for ErrorResponse {
    fn from(err: &crate::ContractError) -> Self {
        Self::new(err.code(), err.to_string())
    }
}

// ---------------------------------------------------------------------------
// Health check
// ---------------------------------------------------------------------------

/// Response body for `GET /health`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Overall service status.
    pub status: String,
    /// Height of the last committed ledger block.
    pub height: u64,
    /// Number of entries in the committed ledger state.
    pub records: usize,
}
