//! Common types, protocol definitions, and errors shared across `sealed-records` crates.

pub mod error;
pub mod protocol;

pub use error::ContractError;
