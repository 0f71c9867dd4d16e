//! Configuration loading and validation for the host.
//!
//! All values are read from environment variables at startup. The process will
//! exit with a clear error message if any variable is present but invalid.

use anyhow::{Context, Result};
use contract::{ContractOptions, KeyScheme};
use serde::Deserialize;

/// Validated host configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Port the HTTP invoke surface listens on.
    #[serde(default = "default_listen_port")]
    pub listen_port: u16,

    /// Tracing log level (e.g. `"info"`, `"debug"`).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// OTLP collector endpoint. Span export is disabled when unset.
    #[serde(default)]
    pub otel_exporter_otlp_endpoint: Option<String>,

    /// Composite key encoding: `length-prefixed` or `concatenated`.
    #[serde(default)]
    pub key_scheme: KeyScheme,

    /// Treat unknown function names as `decRecord`.
    #[serde(default)]
    pub legacy_decrypt_fallthrough: bool,

    /// Per-request timeout in seconds.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_listen_port() -> u16 {
    7052
}
fn default_log_level() -> String {
    "info".into()
}
fn default_request_timeout() -> u64 {
    30
}

impl Config {
    /// Load and validate configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if any variable cannot be parsed or fails validation.
    pub fn from_env() -> Result<Self> {
        Self::from_environment(config::Environment::default())
    }

    fn from_environment(env: config::Environment) -> Result<Self> {
        let cfg = config::Config::builder()
            .add_source(env)
            .build()
            .context("failed to build configuration from environment")?;

        let c: Config = cfg
            .try_deserialize()
            .context("failed to deserialise configuration")?;

        c.validate()?;
        Ok(c)
    }

    /// Options the contract is instantiated with.
    pub fn contract_options(&self) -> ContractOptions {
        ContractOptions {
            key_scheme: self.key_scheme,
            legacy_decrypt_fallthrough: self.legacy_decrypt_fallthrough,
        }
    }

    /// Validate all fields, returning a descriptive error on the first failure.
    fn validate(&self) -> Result<()> {
        if self.listen_port == 0 {
            anyhow::bail!("LISTEN_PORT must be non-zero");
        }
        if self.request_timeout_secs == 0 {
            anyhow::bail!("REQUEST_TIMEOUT_SECS must be > 0");
        }
        if let Some(endpoint) = &self.otel_exporter_otlp_endpoint {
            if endpoint.trim().is_empty() {
                anyhow::bail!("OTEL_EXPORTER_OTLP_ENDPOINT must not be blank when set");
            }
        }
        Ok(())
    }
}
