//! [`SessionSigner`]: HMAC-SHA256 signing and verification of session claims.

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use base64::{
    alphabet,
    engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig},
    Engine as _,
};
use common::{SecretsError, SessionClaims};
use hmac::{Hmac, Mac};
use sha2::Sha256;

use super::constant_time_eq;
use crate::keys::{KeyProvider, SessionSecret};

type HmacSha256 = Hmac<Sha256>;

/// URL-safe alphabet, unpadded on encode, padding tolerated on decode.
const CLAIMS_BASE64: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new()
        .with_encode_padding(false)
        .with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

const SEPARATOR: char = '.';

/// Issues and verifies session tokens with the configured signing secret.
#[derive(Debug, Clone)]
pub struct SessionSigner {
    keys: Arc<KeyProvider<SessionSecret>>,
}

impl SessionSigner {
    /// Create a signer backed by `keys`.
    pub fn new(keys: Arc<KeyProvider<SessionSecret>>) -> Self {
        Self { keys }
    }

    /// Sign `claims` into a token. Deterministic for fixed claims and secret.
    ///
    /// # Errors
    ///
    /// Returns [`SecretsError::Configuration`] if the signing secret is not set.
    pub fn sign(&self, claims: &SessionClaims) -> Result<String, SecretsError> {
        let secret = self.keys.resolve()?;
        let json = serde_json::to_vec(claims).map_err(|e| {
            SecretsError::Configuration(format!("session claims could not be encoded: {e}"))
        })?;
        let payload = CLAIMS_BASE64.encode(json);
        let signature = signature_hex(secret, &payload)?;
        Ok(format!("{payload}{SEPARATOR}{signature}"))
    }

    /// Sign claims for `user` stamped with the current wall-clock time.
    ///
    /// # Errors
    ///
    /// Same as [`sign`](Self::sign).
    pub fn issue(&self, user: &str) -> Result<String, SecretsError> {
        self.sign(&SessionClaims::new(user, now_millis()))
    }

    /// Verify `token` and return its claims.
    ///
    /// Returns `Ok(None)` for every invalid token: wrong shape, bad signature,
    /// undecodable payload, or claims of the wrong shape.
    ///
    /// # Errors
    ///
    /// Returns [`SecretsError::Configuration`] only when the signing secret is
    /// not set; malformed input is never an error.
    pub fn verify(&self, token: &str) -> Result<Option<SessionClaims>, SecretsError> {
        let secret = self.keys.resolve()?;

        let Some((payload, signature)) = token.split_once(SEPARATOR) else {
            return Ok(None);
        };
        if payload.is_empty() || signature.is_empty() || signature.contains(SEPARATOR) {
            return Ok(None);
        }

        let expected = signature_hex(secret, payload)?;
        if !constant_time_eq(signature.as_bytes(), expected.as_bytes()) {
            return Ok(None);
        }

        let Ok(json) = CLAIMS_BASE64.decode(payload) else {
            return Ok(None);
        };
        Ok(serde_json::from_slice(&json).ok())
    }
}

fn signature_hex(secret: &SessionSecret, payload: &str) -> Result<String, SecretsError> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|_| SecretsError::Configuration("session secret rejected by HMAC".into()))?;
    mac.update(payload.as_bytes());
    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// Current wall-clock time in milliseconds since the Unix epoch.
pub fn now_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| i64::try_from(d.as_millis()).unwrap_or(i64::MAX))
        .unwrap_or(0)
}
