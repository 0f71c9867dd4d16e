//! Axum HTTP server exposing the contract's single invoke entry point.
//!
//! # Responsibilities
//! - Define the Axum router with all routes and shared middleware.
//! - Map each `POST /invoke` to one ledger transaction, committed only on success.
//! - Inject shared application state (`AppState`) into handlers.

pub mod handlers;
pub mod router;
pub mod state;
