//! Key material resolution and process-lifetime caching.
//!
//! # Lifecycle
//!
//! 1. A [`KeyProvider`] is built at startup from one raw configuration value.
//!    Nothing is parsed yet; an absent value is not an error at this point.
//! 2. The first call to [`KeyProvider::resolve`] parses the value. Failure is
//!    returned as [`SecretsError::Configuration`] and nothing is cached, so a
//!    misconfigured key fails every use instead of falling back to a default.
//! 3. On success the parsed key is stored in a [`OnceLock`] and every later
//!    call returns the same reference without re-parsing.
//!
//! Concurrent first use is serialised: racing threads wait on one parse and
//! all receive the stored result. A failed parse leaves the provider empty,
//! so the next caller parses again.
//!
//! # Security invariants
//!
//! - Key material is **never** logged, serialised, or printed via `Debug`.
//! - Key buffers are zeroized on drop.
//! - There is no rotation. Changing the configured encryption key makes every
//!   existing payload fail authentication.

pub mod material;

pub use material::{EncryptionKey, SessionSecret};

use std::sync::OnceLock;

use common::SecretsError;
use parking_lot::Mutex;
use tracing::debug;

/// A kind of key material that can be parsed from a configuration string.
pub trait KeyMaterial: Sized {
    /// Name of the configuration variable the value comes from.
    const SOURCE: &'static str;

    /// Parse a raw, non-blank configuration value.
    ///
    /// # Errors
    ///
    /// Returns [`SecretsError::Configuration`] if the value has the wrong shape.
    fn parse(raw: &str) -> Result<Self, SecretsError>;
}

/// Resolves one piece of key material on first use and caches it.
pub struct KeyProvider<K> {
    raw: Option<String>,
    resolved: OnceLock<K>,
    init: Mutex<()>,
}

impl<K: KeyMaterial> KeyProvider<K> {
    /// Create a provider over a raw configuration value (`None` when unset).
    pub fn new(raw: Option<String>) -> Self {
        Self {
            raw,
            resolved: OnceLock::new(),
            init: Mutex::new(()),
        }
    }

    /// Return the cached key, resolving it on first use.
    ///
    /// # Errors
    ///
    /// Returns [`SecretsError::Configuration`] if the value is absent, blank,
    /// or does not parse as `K`.
    pub fn resolve(&self) -> Result<&K, SecretsError> {
        if let Some(key) = self.resolved.get() {
            return Ok(key);
        }

        let _init = self.init.lock();
        if let Some(key) = self.resolved.get() {
            return Ok(key);
        }

        let raw = self
            .raw
            .as_deref()
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| SecretsError::Configuration(format!("{} is not set", K::SOURCE)))?;

        let key = K::parse(raw)?;
        debug!(source = K::SOURCE, "key material resolved");
        Ok(self.resolved.get_or_init(|| key))
    }

    /// Returns `true` once a key has been successfully resolved.
    pub fn is_resolved(&self) -> bool {
        self.resolved.get().is_some()
    }
}

impl<K> std::fmt::Debug for KeyProvider<K> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyProvider")
            .field("configured", &self.raw.is_some())
            .field("resolved", &self.resolved.get().is_some())
            .finish()
    }
}
