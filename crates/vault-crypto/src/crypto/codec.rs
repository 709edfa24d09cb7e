//! [`PayloadCodec`]: string-level encrypt/decrypt of the stored password field.

use std::sync::Arc;

use aes_gcm::aead::{rand_core::RngCore, OsRng};
use common::SecretsError;
use tracing::{debug, warn};

use super::cipher::{open, seal, EncryptedPayload, NONCE_LEN, PAYLOAD_PREFIX};
use crate::keys::{EncryptionKey, KeyProvider};

/// Maximum number of nested encryption layers [`PayloadCodec::decrypt`] removes.
///
/// Older writers could wrap an already-encrypted value a second time. The
/// loop stops here even if the result still looks encrypted.
pub const MAX_DECRYPT_DEPTH: usize = 3;

/// Returns `true` if `value` carries the reserved `enc:v1:` prefix.
pub fn is_encrypted(value: &str) -> bool {
    value.starts_with(PAYLOAD_PREFIX)
}

/// Source of per-encryption nonces.
pub trait NonceSource: Send + Sync {
    /// Produce the nonce for the next encryption. Must never repeat under
    /// the same key.
    fn next_nonce(&self) -> [u8; NONCE_LEN];
}

/// Draws nonces from the OS CSPRNG.
#[derive(Debug, Default, Clone, Copy)]
pub struct OsNonceSource;

impl NonceSource for OsNonceSource {
    fn next_nonce(&self) -> [u8; NONCE_LEN] {
        let mut nonce = [0u8; NONCE_LEN];
        OsRng.fill_bytes(&mut nonce);
        nonce
    }
}

/// Encrypts and decrypts password field values.
///
/// Write paths use [`encrypt`](Self::encrypt) and let errors fail the whole
/// operation. Bulk read paths use [`decrypt_safe`](Self::decrypt_safe) so one
/// corrupt record cannot take down a listing.
pub struct PayloadCodec {
    keys: Arc<KeyProvider<EncryptionKey>>,
    nonces: Box<dyn NonceSource>,
}

impl PayloadCodec {
    /// Create a codec that draws nonces from the OS CSPRNG.
    pub fn new(keys: Arc<KeyProvider<EncryptionKey>>) -> Self {
        Self::with_nonce_source(keys, OsNonceSource)
    }

    /// Create a codec with an explicit nonce source.
    pub fn with_nonce_source(
        keys: Arc<KeyProvider<EncryptionKey>>,
        nonces: impl NonceSource + 'static,
    ) -> Self {
        Self {
            keys,
            nonces: Box::new(nonces),
        }
    }

    /// Encrypt `plaintext` into an `enc:v1:...` payload.
    ///
    /// An empty string is returned unchanged.
    ///
    /// # Errors
    ///
    /// - [`SecretsError::AlreadyEncrypted`] if `plaintext` is already
    ///   payload-shaped.
    /// - [`SecretsError::Configuration`] if the encryption key cannot be
    ///   resolved.
    pub fn encrypt(&self, plaintext: &str) -> Result<String, SecretsError> {
        if plaintext.is_empty() {
            return Ok(String::new());
        }
        if is_encrypted(plaintext) {
            return Err(SecretsError::AlreadyEncrypted);
        }

        let key = self.keys.resolve()?;
        let sealed = seal(plaintext.as_bytes(), key, self.nonces.next_nonce())?;
        Ok(sealed.to_string_repr())
    }

    /// Decrypt a stored value.
    ///
    /// Empty input yields an empty string; input without the payload prefix
    /// is returned as-is. Nested layers are removed up to
    /// [`MAX_DECRYPT_DEPTH`].
    ///
    /// # Errors
    ///
    /// - [`SecretsError::InvalidPayloadFormat`] for a prefixed value that does
    ///   not parse.
    /// - [`SecretsError::AuthenticationFailed`] on tag mismatch.
    /// - [`SecretsError::Configuration`] if the encryption key cannot be
    ///   resolved.
    pub fn decrypt(&self, payload: &str) -> Result<String, SecretsError> {
        self.unwrap_layers(payload).map(|(plaintext, _)| plaintext)
    }

    /// Like [`decrypt`](Self::decrypt) but returns an empty string on any failure.
    pub fn decrypt_safe(&self, payload: &str) -> String {
        match self.decrypt(payload) {
            Ok(plaintext) => plaintext,
            Err(e) => {
                warn!(error_code = e.code(), "payload decrypt failed; substituting empty secret");
                String::new()
            }
        }
    }

    /// Decrypt `payload` and report how many encryption layers were removed.
    ///
    /// Zero layers means the input was empty or plaintext. More than one means
    /// the value had been encrypted repeatedly.
    ///
    /// # Errors
    ///
    /// Same as [`decrypt`](Self::decrypt).
    pub fn unwrap_layers(&self, payload: &str) -> Result<(String, usize), SecretsError> {
        let mut current = payload.to_owned();
        let mut layers = 0;

        while layers < MAX_DECRYPT_DEPTH && is_encrypted(&current) {
            current = self.decrypt_once(&current)?;
            layers += 1;
            if layers > 1 {
                debug!(layers, "removed nested encryption layer");
            }
        }

        if is_encrypted(&current) {
            warn!(
                max_depth = MAX_DECRYPT_DEPTH,
                "payload still encrypted after maximum decrypt depth; returning last layer"
            );
        }
        Ok((current, layers))
    }

    fn decrypt_once(&self, payload: &str) -> Result<String, SecretsError> {
        let parsed = EncryptedPayload::parse(payload)?;
        let key = self.keys.resolve()?;
        let plaintext = open(&parsed, key)?;
        String::from_utf8(plaintext)
            .map_err(|_| SecretsError::InvalidPayloadFormat("decrypted value is not valid UTF-8"))
    }
}

impl std::fmt::Debug for PayloadCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PayloadCodec")
            .field("keys", &self.keys)
            .finish_non_exhaustive()
    }
}
