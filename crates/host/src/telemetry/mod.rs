//! Structured logging and optional OpenTelemetry span export.
//!
//! # Telemetry invariants
//!
//! - **No key material, IV, transient value, or plaintext** may appear in any
//!   span attribute or log field. Composite keys, function names, argument
//!   counts, and lengths are fine.
//! - Log level is configurable via `LOG_LEVEL` (default: `info`); `RUST_LOG`
//!   takes precedence.

pub mod init;

pub use init::{init_telemetry, shutdown};
