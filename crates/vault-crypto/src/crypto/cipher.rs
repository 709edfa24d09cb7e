//! AES-256-GCM sealing and opening of a single payload.
//!
//! **Nonce uniqueness is load-bearing.** Reusing a nonce under the same key
//! breaks both confidentiality and authentication for GCM. Callers must draw a
//! fresh random nonce for every [`seal`].

use aes_gcm::{
    aead::{AeadInPlace, KeyInit},
    Aes256Gcm, Nonce, Tag,
};
use base64::{
    alphabet,
    engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig},
    Engine as _,
};
use common::SecretsError;

use crate::keys::EncryptionKey;

/// Byte length of an AES-256 key (32 bytes = 256 bits).
pub const KEY_LEN: usize = 32;

/// Byte length of an AES-GCM nonce (12 bytes = 96 bits).
pub const NONCE_LEN: usize = 12;

/// Byte length of an AES-GCM authentication tag.
pub const TAG_LEN: usize = 16;

/// Format literal: the first colon-delimited field.
pub const FORMAT_TAG: &str = "enc";

/// Version literal: the second colon-delimited field.
pub const VERSION: &str = "v1";

/// Field separator.
pub const SEPARATOR: char = ':';

/// Prefix that appears at the start of every encrypted payload.
pub const PAYLOAD_PREFIX: &str = "enc:v1:";

/// Standard alphabet; pads on encode, accepts padded or unpadded input.
pub(crate) const PAYLOAD_BASE64: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// A parsed encrypted payload.
///
/// The string representation is
/// `enc:v1:<base64(nonce)>:<base64(tag)>:<base64(ciphertext)>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncryptedPayload {
    /// Raw nonce bytes.
    pub nonce: [u8; NONCE_LEN],
    /// Raw GCM authentication tag.
    pub tag: [u8; TAG_LEN],
    /// Raw ciphertext, same length as the plaintext.
    pub ciphertext: Vec<u8>,
}

impl EncryptedPayload {
    /// Encode this value to its canonical string representation.
    pub fn to_string_repr(&self) -> String {
        format!(
            "{FORMAT_TAG}{SEPARATOR}{VERSION}{SEPARATOR}{}{SEPARATOR}{}{SEPARATOR}{}",
            PAYLOAD_BASE64.encode(self.nonce),
            PAYLOAD_BASE64.encode(self.tag),
            PAYLOAD_BASE64.encode(&self.ciphertext),
        )
    }

    /// Parse a payload string back into an [`EncryptedPayload`].
    ///
    /// # Errors
    ///
    /// Returns [`SecretsError::InvalidPayloadFormat`] unless the string has
    /// exactly five colon-delimited fields, the `enc` / `v1` literals, and
    /// base64 nonce, tag, and ciphertext fields of the right sizes.
    pub fn parse(s: &str) -> Result<Self, SecretsError> {
        let fields: Vec<&str> = s.split(SEPARATOR).collect();
        let [format, version, nonce_b64, tag_b64, ciphertext_b64] = fields.as_slice() else {
            return Err(SecretsError::InvalidPayloadFormat(
                "expected five colon-delimited fields",
            ));
        };
        if *format != FORMAT_TAG {
            return Err(SecretsError::InvalidPayloadFormat("unknown format tag"));
        }
        if *version != VERSION {
            return Err(SecretsError::InvalidPayloadFormat("unsupported version"));
        }
        if nonce_b64.is_empty() || tag_b64.is_empty() || ciphertext_b64.is_empty() {
            return Err(SecretsError::InvalidPayloadFormat("empty field"));
        }

        let nonce: [u8; NONCE_LEN] = decode_field(nonce_b64)?
            .try_into()
            .map_err(|_| SecretsError::InvalidPayloadFormat("nonce must be 12 bytes"))?;
        let tag: [u8; TAG_LEN] = decode_field(tag_b64)?
            .try_into()
            .map_err(|_| SecretsError::InvalidPayloadFormat("tag must be 16 bytes"))?;
        let ciphertext = decode_field(ciphertext_b64)?;

        Ok(Self {
            nonce,
            tag,
            ciphertext,
        })
    }
}

fn decode_field(b64: &str) -> Result<Vec<u8>, SecretsError> {
    PAYLOAD_BASE64
        .decode(b64)
        .map_err(|_| SecretsError::InvalidPayloadFormat("field is not valid base64"))
}

/// Encrypt `plaintext` under `key` with the caller-supplied `nonce`.
///
/// # Errors
///
/// Returns [`SecretsError::InvalidPayloadFormat`] if the plaintext exceeds the
/// GCM message size limit (about 64 GiB).
pub fn seal(
    plaintext: &[u8],
    key: &EncryptionKey,
    nonce: [u8; NONCE_LEN],
) -> Result<EncryptedPayload, SecretsError> {
    let cipher = build_cipher(key)?;
    let mut buffer = plaintext.to_vec();
    let tag = cipher
        .encrypt_in_place_detached(Nonce::from_slice(&nonce), b"", &mut buffer)
        .map_err(|_| {
            SecretsError::InvalidPayloadFormat("plaintext exceeds AES-GCM message limit")
        })?;

    let mut tag_bytes = [0u8; TAG_LEN];
    tag_bytes.copy_from_slice(&tag);

    Ok(EncryptedPayload {
        nonce,
        tag: tag_bytes,
        ciphertext: buffer,
    })
}

/// Decrypt and authenticate `payload` under `key`.
///
/// Nothing is returned unless the tag verifies; there is no partial output.
///
/// # Errors
///
/// Returns [`SecretsError::AuthenticationFailed`] on tag mismatch (wrong key
/// or tampered nonce, tag, or ciphertext).
pub fn open(payload: &EncryptedPayload, key: &EncryptionKey) -> Result<Vec<u8>, SecretsError> {
    let cipher = build_cipher(key)?;
    let mut buffer = payload.ciphertext.clone();
    cipher
        .decrypt_in_place_detached(
            Nonce::from_slice(&payload.nonce),
            b"",
            &mut buffer,
            Tag::from_slice(&payload.tag),
        )
        .map_err(|_| SecretsError::AuthenticationFailed)?;
    Ok(buffer)
}

fn build_cipher(key: &EncryptionKey) -> Result<Aes256Gcm, SecretsError> {
    Aes256Gcm::new_from_slice(key.as_bytes())
        .map_err(|_| SecretsError::Configuration("encryption key has invalid length".into()))
}
