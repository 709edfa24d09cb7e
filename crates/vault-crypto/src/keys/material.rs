//! [`EncryptionKey`] and [`SessionSecret`]: parsed, zero-on-drop key buffers.

use base64::Engine as _;
use common::SecretsError;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use super::KeyMaterial;
use crate::crypto::cipher::PAYLOAD_BASE64;
use crate::crypto::KEY_LEN;

/// Fixed-size AES-256 key holding exactly [`KEY_LEN`] bytes.
///
/// The bytes live on the heap and are zeroized when the key is dropped.
pub struct EncryptionKey(Box<[u8; KEY_LEN]>);

impl EncryptionKey {
    /// Wrap raw key bytes.
    pub fn from_bytes(bytes: [u8; KEY_LEN]) -> Self {
        Self(Box::new(bytes))
    }

    /// Borrow the raw key bytes.
    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.0
    }

    fn from_slice(bytes: &[u8]) -> Option<Self> {
        if bytes.len() != KEY_LEN {
            return None;
        }
        let mut key = Box::new([0u8; KEY_LEN]);
        key.copy_from_slice(bytes);
        Some(Self(key))
    }
}

impl KeyMaterial for EncryptionKey {
    const SOURCE: &'static str = "ENCRYPTION_KEY";

    /// Accepts 32 bytes encoded as base64, or exactly 64 hex characters.
    /// Surrounding whitespace is ignored.
    fn parse(raw: &str) -> Result<Self, SecretsError> {
        let raw = raw.trim();

        if let Ok(decoded) = PAYLOAD_BASE64.decode(raw) {
            let decoded = Zeroizing::new(decoded);
            if let Some(key) = Self::from_slice(&decoded) {
                return Ok(key);
            }
        }

        if raw.len() == 2 * KEY_LEN {
            if let Ok(decoded) = hex::decode(raw) {
                let decoded = Zeroizing::new(decoded);
                if let Some(key) = Self::from_slice(&decoded) {
                    return Ok(key);
                }
            }
        }

        Err(SecretsError::Configuration(format!(
            "{} must be {KEY_LEN}-byte base64 or {} hex characters",
            Self::SOURCE,
            2 * KEY_LEN
        )))
    }
}

impl Zeroize for EncryptionKey {
    fn zeroize(&mut self) {
        self.0.as_mut_slice().zeroize();
    }
}

impl Drop for EncryptionKey {
    fn drop(&mut self) {
        self.zeroize();
    }
}

impl ZeroizeOnDrop for EncryptionKey {}

impl std::fmt::Debug for EncryptionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Never print key material.
        f.write_str("EncryptionKey([REDACTED])")
    }
}

/// HMAC secret used to sign session tokens.
///
/// The configured string's UTF-8 bytes are the key; any length is accepted.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct SessionSecret(Vec<u8>);

impl SessionSecret {
    /// Borrow the raw secret bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl KeyMaterial for SessionSecret {
    const SOURCE: &'static str = "AUTH_SECRET";

    fn parse(raw: &str) -> Result<Self, SecretsError> {
        if raw.trim().is_empty() {
            return Err(SecretsError::Configuration(format!(
                "{} must not be empty",
                Self::SOURCE
            )));
        }
        Ok(Self(raw.as_bytes().to_vec()))
    }
}

impl std::fmt::Debug for SessionSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SessionSecret([REDACTED])")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::engine::general_purpose::{STANDARD, STANDARD_NO_PAD};

    #[test]
    fn parses_padded_base64() {
        let key = EncryptionKey::parse(&STANDARD.encode([7u8; KEY_LEN])).unwrap();
        assert_eq!(key.as_bytes(), &[7u8; KEY_LEN]);
    }

    #[test]
    fn parses_unpadded_base64_with_whitespace() {
        let raw = format!("  {}\n", STANDARD_NO_PAD.encode([9u8; KEY_LEN]));
        let key = EncryptionKey::parse(&raw).unwrap();
        assert_eq!(key.as_bytes(), &[9u8; KEY_LEN]);
    }

    #[test]
    fn parses_hex_of_either_case() {
        let lower = EncryptionKey::parse(&"ab".repeat(KEY_LEN)).unwrap();
        let upper = EncryptionKey::parse(&"AB".repeat(KEY_LEN)).unwrap();
        assert_eq!(lower.as_bytes(), &[0xABu8; KEY_LEN]);
        assert_eq!(upper.as_bytes(), lower.as_bytes());
    }

    #[test]
    fn rejects_wrong_base64_length() {
        let err = EncryptionKey::parse(&STANDARD.encode([1u8; 16])).unwrap_err();
        assert!(matches!(err, SecretsError::Configuration(_)));
    }

    #[test]
    fn rejects_short_hex_and_non_hex() {
        assert!(EncryptionKey::parse(&"ab".repeat(16)).is_err());
        assert!(EncryptionKey::parse(&"zz".repeat(KEY_LEN)).is_err());
        assert!(EncryptionKey::parse("not a key at all").is_err());
    }

    #[test]
    fn error_message_does_not_echo_value() {
        let err = EncryptionKey::parse("super-secret-but-wrong").unwrap_err();
        assert!(!err.to_string().contains("super-secret-but-wrong"));
    }

    #[test]
    fn session_secret_keeps_exact_bytes() {
        let secret = SessionSecret::parse(" padded secret ").unwrap();
        assert_eq!(secret.as_bytes(), b" padded secret ");
    }

    #[test]
    fn session_secret_rejects_blank() {
        assert!(SessionSecret::parse("\t ").is_err());
    }

    fn assert_zeroize_on_drop<T: ZeroizeOnDrop>() {}

    #[test]
    fn key_types_zeroize_on_drop() {
        assert_zeroize_on_drop::<EncryptionKey>();
        assert_zeroize_on_drop::<SessionSecret>();
    }

    #[test]
    fn zeroize_clears_key_bytes() {
        let mut key = EncryptionKey::parse(&"5a".repeat(KEY_LEN)).unwrap();
        key.zeroize();
        assert_eq!(key.as_bytes(), &[0u8; KEY_LEN]);

        let mut secret = SessionSecret::parse("signing-secret").unwrap();
        secret.zeroize();
        assert!(secret.as_bytes().is_empty());
    }

    #[test]
    fn key_types_redacted_in_debug() {
        let key = EncryptionKey::from_bytes([0xFF; KEY_LEN]);
        assert!(format!("{key:?}").contains("REDACTED"));
        let secret = SessionSecret::parse("abc").unwrap();
        assert!(format!("{secret:?}").contains("REDACTED"));
    }
}
