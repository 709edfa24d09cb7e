//! Error taxonomy shared by the secrets layer and its callers.

use thiserror::Error;

/// Top-level secrets-layer error type.
///
/// Variants map to HTTP status codes the API layer returns to callers:
/// - [`SecretsError::Configuration`] → 500 (server misconfigured)
/// - [`SecretsError::AlreadyEncrypted`] → 400
/// - [`SecretsError::InvalidPayloadFormat`] → 500
/// - [`SecretsError::AuthenticationFailed`] → 500
///
/// Session verification failures are deliberately absent: they are reported
/// as "no session" and never carry a cause.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SecretsError {
    /// Key material is missing or has the wrong shape.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The value handed to `encrypt` is already an encrypted payload.
    #[error("refusing to encrypt an already-encrypted payload")]
    AlreadyEncrypted,

    /// The stored value carries the payload prefix but cannot be parsed.
    #[error("invalid encrypted payload format: {0}")]
    InvalidPayloadFormat(&'static str),

    /// AEAD tag verification failed (tampered data or wrong key).
    #[error("payload authentication failed")]
    AuthenticationFailed,
}

impl SecretsError {
    /// Returns the HTTP status code that should be sent for this error.
    pub fn http_status(&self) -> u16 {
        match self {
            SecretsError::Configuration(_) => 500,
            SecretsError::AlreadyEncrypted => 400,
            SecretsError::InvalidPayloadFormat(_) => 500,
            SecretsError::AuthenticationFailed => 500,
        }
    }

    /// Short machine-readable code for [`crate::protocol::ErrorResponse`].
    pub fn code(&self) -> &'static str {
        match self {
            SecretsError::Configuration(_) => "server_misconfigured",
            SecretsError::AlreadyEncrypted => "already_encrypted",
            SecretsError::InvalidPayloadFormat(_) => "invalid_payload",
            SecretsError::AuthenticationFailed => "authentication_failed",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_status_codes() {
        assert_eq!(SecretsError::Configuration("x".into()).http_status(), 500);
        assert_eq!(SecretsError::AlreadyEncrypted.http_status(), 400);
        assert_eq!(
            SecretsError::InvalidPayloadFormat("field count").http_status(),
            500
        );
        assert_eq!(SecretsError::AuthenticationFailed.http_status(), 500);
    }

    #[test]
    fn display_includes_message() {
        let e = SecretsError::Configuration("ENCRYPTION_KEY is not set".into());
        assert!(e.to_string().contains("ENCRYPTION_KEY is not set"));
        let e = SecretsError::InvalidPayloadFormat("nonce length");
        assert!(e.to_string().contains("nonce length"));
    }

    #[test]
    fn codes_are_distinct() {
        let codes = [
            SecretsError::Configuration(String::new()).code(),
            SecretsError::AlreadyEncrypted.code(),
            SecretsError::InvalidPayloadFormat("").code(),
            SecretsError::AuthenticationFailed.code(),
        ];
        for (i, a) in codes.iter().enumerate() {
            for b in &codes[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }
}
