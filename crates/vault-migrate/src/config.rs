//! Configuration loading and validation for the migration tool.

use anyhow::{Context, Result};
use serde::Deserialize;

/// Validated migration configuration.
#[derive(Clone, Deserialize)]
pub struct Config {
    /// AES-256 key the records are (or will be) encrypted with. **Required.**
    pub encryption_key: String,

    /// Newline-delimited JSON export to read. Defaults to stdin.
    #[serde(default)]
    pub input_path: Option<String>,

    /// Where to write migrated records. Defaults to stdout.
    #[serde(default)]
    pub output_path: Option<String>,

    /// Report what would change without writing any records.
    #[serde(default)]
    pub dry_run: bool,

    /// Tracing log level.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_log_level() -> String {
    "info".into()
}

impl Config {
    /// Load and validate configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        let cfg = config::Config::builder()
            .add_source(config::Environment::default())
            .build()
            .context("failed to build vault-migrate configuration")?;

        let c: Config = cfg
            .try_deserialize()
            .context("failed to deserialise vault-migrate configuration")?;

        c.validate()?;
        Ok(c)
    }

    fn validate(&self) -> Result<()> {
        if self.encryption_key.trim().is_empty() {
            anyhow::bail!("ENCRYPTION_KEY is required and must not be empty");
        }
        if let (Some(input), Some(output)) = (&self.input_path, &self.output_path) {
            if input == output {
                anyhow::bail!("INPUT_PATH and OUTPUT_PATH must differ");
            }
        }
        Ok(())
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("encryption_key", &"[REDACTED]")
            .field("input_path", &self.input_path)
            .field("output_path", &self.output_path)
            .field("dry_run", &self.dry_run)
            .field("log_level", &self.log_level)
            .finish()
    }
}
