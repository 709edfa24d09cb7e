//! `vault-migrate` — one-time offline migration of stored vault records.
//!
//! Startup sequence:
//! 1. Load and validate [`config::Config`] from environment variables.
//! 2. Initialise structured JSON logging (stderr).
//! 3. Resolve the encryption key up front so a bad key fails before any I/O.
//! 4. Stream records from input to output, normalising every password to a
//!    single encryption layer.

mod config;
mod migrate;
mod telemetry;

use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{info, warn};
use vault_crypto::crypto::PayloadCodec;
use vault_crypto::keys::KeyProvider;

fn main() -> Result<()> {
    // -----------------------------------------------------------------------
    // 1. Configuration
    // -----------------------------------------------------------------------
    let cfg = config::Config::from_env().map_err(|e| {
        eprintln!("ERROR: vault-migrate configuration invalid: {e}");
        e
    })?;

    // -----------------------------------------------------------------------
    // 2. Telemetry
    // -----------------------------------------------------------------------
    telemetry::init(&cfg.log_level)?;
    info!(
        version = env!("CARGO_PKG_VERSION"),
        dry_run = cfg.dry_run,
        "vault-migrate starting"
    );

    // -----------------------------------------------------------------------
    // 3. Key
    // -----------------------------------------------------------------------
    let keys = Arc::new(KeyProvider::new(Some(cfg.encryption_key.clone())));
    keys.resolve().context("ENCRYPTION_KEY is invalid")?;
    let codec = PayloadCodec::new(keys);

    // -----------------------------------------------------------------------
    // 4. Migration
    // -----------------------------------------------------------------------
    let input: Box<dyn BufRead> = match &cfg.input_path {
        Some(path) => Box::new(BufReader::new(
            File::open(path).with_context(|| format!("failed to open input {path}"))?,
        )),
        None => Box::new(io::stdin().lock()),
    };
    let mut output: Box<dyn Write> = match &cfg.output_path {
        Some(path) => Box::new(BufWriter::new(
            File::create(path).with_context(|| format!("failed to create output {path}"))?,
        )),
        None => Box::new(BufWriter::new(io::stdout().lock())),
    };

    let report = migrate::run(&codec, input, &mut output, cfg.dry_run)?;
    output.flush().context("failed to flush output")?;

    info!(
        total = report.total,
        rewritten = report.rewritten(),
        encrypted_legacy = report.encrypted_legacy,
        collapsed_nested = report.collapsed_nested,
        already_protected = report.already_protected,
        empty = report.empty,
        failed = report.failed,
        "migration finished"
    );

    if report.failed > 0 {
        warn!(failed = report.failed, "some records were left unchanged");
        anyhow::bail!("{} record(s) could not be migrated", report.failed);
    }
    Ok(())
}
