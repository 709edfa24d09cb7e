//! Record-by-record migration of the password field.
//!
//! Each record's password is classified by how many encryption layers it
//! carries and rewritten so that every non-empty password ends up wrapped
//! exactly once under the current key. Records are handled as open JSON
//! objects: only the `password` entry is touched, every other field is
//! written back as read. Records that cannot be migrated are passed through
//! untouched and counted.

use std::io::{BufRead, Write};

use anyhow::{Context, Result};
use serde_json::{Map, Value};
use tracing::{debug, warn};
use vault_crypto::crypto::{is_encrypted, PayloadCodec};

const PASSWORD_FIELD: &str = "password";

/// What happened to a single password value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Empty or absent password; nothing to protect.
    Empty,
    /// Already wrapped exactly once.
    AlreadyProtected,
    /// Legacy plaintext, now encrypted.
    EncryptedLegacy,
    /// Nested layers collapsed into a single one.
    CollapsedNested { layers: usize },
    /// Left unchanged because it could not be migrated.
    Failed { reason: &'static str },
}

/// Totals for one migration run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MigrationReport {
    pub total: usize,
    pub empty: usize,
    pub already_protected: usize,
    pub encrypted_legacy: usize,
    pub collapsed_nested: usize,
    pub failed: usize,
}

impl MigrationReport {
    fn record(&mut self, outcome: &Outcome) {
        self.total += 1;
        match outcome {
            Outcome::Empty => self.empty += 1,
            Outcome::AlreadyProtected => self.already_protected += 1,
            Outcome::EncryptedLegacy => self.encrypted_legacy += 1,
            Outcome::CollapsedNested { .. } => self.collapsed_nested += 1,
            Outcome::Failed { .. } => self.failed += 1,
        }
    }

    /// Number of records whose stored value changed.
    pub fn rewritten(&self) -> usize {
        self.encrypted_legacy + self.collapsed_nested
    }
}

/// Normalise one stored password to a single encryption layer.
///
/// Returns the value to store and how it was classified. On failure the
/// original value is returned unchanged.
pub fn migrate_password(codec: &PayloadCodec, stored: &str) -> (String, Outcome) {
    let keep = |reason| (stored.to_owned(), Outcome::Failed { reason });

    let (plaintext, layers) = match codec.unwrap_layers(stored) {
        Ok(unwrapped) => unwrapped,
        Err(e) => return keep(e.code()),
    };

    let outcome = match layers {
        0 if plaintext.is_empty() => return (String::new(), Outcome::Empty),
        0 => Outcome::EncryptedLegacy,
        1 => return (stored.to_owned(), Outcome::AlreadyProtected),
        n if is_encrypted(&plaintext) => {
            debug!(layers = n, "value still encrypted after maximum decrypt depth");
            return keep("too_many_layers");
        }
        n => Outcome::CollapsedNested { layers: n },
    };

    match codec.encrypt(&plaintext) {
        Ok(rewrapped) => (rewrapped, outcome),
        Err(e) => keep(e.code()),
    }
}

/// Migrate the `password` entry of one record in place.
///
/// An absent or `null` password counts as empty. Any other non-string value
/// is left as it is and reported as failed.
pub fn migrate_record(codec: &PayloadCodec, record: &mut Map<String, Value>) -> Outcome {
    let stored = match record.get(PASSWORD_FIELD) {
        None | Some(Value::Null) => return Outcome::Empty,
        Some(Value::String(stored)) => stored.as_str(),
        Some(_) => return Outcome::Failed { reason: "password_not_a_string" },
    };

    let (password, outcome) = migrate_password(codec, stored);
    if matches!(outcome, Outcome::EncryptedLegacy | Outcome::CollapsedNested { .. }) {
        record.insert(PASSWORD_FIELD.to_owned(), Value::String(password));
    }
    outcome
}

/// Migrate newline-delimited JSON records from `input` to `output`.
///
/// Blank lines are skipped. A line that is not a JSON object is copied
/// through verbatim and counted as failed. With `dry_run`, nothing is written.
///
/// # Errors
///
/// Returns an error only on I/O failure.
pub fn run<R: BufRead, W: Write>(
    codec: &PayloadCodec,
    input: R,
    output: &mut W,
    dry_run: bool,
) -> Result<MigrationReport> {
    let mut report = MigrationReport::default();

    for (index, line) in input.lines().enumerate() {
        let line = line.with_context(|| format!("failed to read input line {}", index + 1))?;
        if line.trim().is_empty() {
            continue;
        }

        let Ok(mut record) = serde_json::from_str::<Map<String, Value>>(&line) else {
            warn!(line = index + 1, "input line is not a JSON object; copied unchanged");
            report.record(&Outcome::Failed { reason: "unparseable_record" });
            if !dry_run {
                writeln!(output, "{line}").context("failed to write output")?;
            }
            continue;
        };

        let outcome = migrate_record(codec, &mut record);
        let id = record.get("id").and_then(Value::as_str).unwrap_or_default();
        match &outcome {
            Outcome::Failed { reason } => {
                warn!(line = index + 1, id, reason, "record left unchanged")
            }
            Outcome::CollapsedNested { layers } => {
                debug!(line = index + 1, id, layers, "collapsed nested encryption")
            }
            _ => {}
        }
        report.record(&outcome);

        if !dry_run {
            serde_json::to_writer(&mut *output, &record).context("failed to write output")?;
            writeln!(output).context("failed to write output")?;
        }
    }

    Ok(report)
}
