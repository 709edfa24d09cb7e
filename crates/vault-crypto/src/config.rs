//! Configuration loading and validation for the secrets layer.
//!
//! Values are read from environment variables. Secret values are optional at
//! load time: a missing or malformed key surfaces as
//! [`common::SecretsError::Configuration`] the first time it is used, not here.

use anyhow::{Context, Result};
use serde::Deserialize;

/// Secrets-layer configuration.
#[derive(Clone, Deserialize)]
pub struct Config {
    /// AES-256 key for the password field (`ENCRYPTION_KEY`): 32 bytes as
    /// base64, or 64 hex characters.
    #[serde(default)]
    pub encryption_key: Option<String>,

    /// HMAC secret for session tokens (`AUTH_SECRET`).
    #[serde(default)]
    pub auth_secret: Option<String>,

    /// Administrator login name (`ADMIN_USER`).
    #[serde(default)]
    pub admin_user: Option<String>,

    /// Administrator password (`ADMIN_PASS`).
    #[serde(default)]
    pub admin_pass: Option<String>,

    /// Tracing log level (e.g. `"info"`, `"debug"`).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_log_level() -> String {
    "info".into()
}

impl Config {
    /// Load and validate configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if the environment cannot be deserialised or fails
    /// validation.
    pub fn from_env() -> Result<Self> {
        let cfg = config::Config::builder()
            .add_source(config::Environment::default())
            .build()
            .context("failed to build configuration from environment")?;

        let c: Config = cfg
            .try_deserialize()
            .context("failed to deserialise configuration")?;

        c.validate()?;
        Ok(c)
    }

    fn validate(&self) -> Result<()> {
        if self.log_level.trim().is_empty() {
            anyhow::bail!("LOG_LEVEL must not be empty");
        }
        if self.admin_user.is_some() != self.admin_pass.is_some() {
            anyhow::bail!("ADMIN_USER and ADMIN_PASS must be set together");
        }
        Ok(())
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let redact = |v: &Option<String>| v.as_ref().map(|_| "[REDACTED]");
        f.debug_struct("Config")
            .field("encryption_key", &redact(&self.encryption_key))
            .field("auth_secret", &redact(&self.auth_secret))
            .field("admin_user", &self.admin_user)
            .field("admin_pass", &redact(&self.admin_pass))
            .field("log_level", &self.log_level)
            .finish()
    }
}
