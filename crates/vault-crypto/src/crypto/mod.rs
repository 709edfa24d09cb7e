//! AES-256-GCM protection of the stored password field.
//!
//! This module is intentionally free of HTTP and storage dependencies.
//!
//! # Payload format
//!
//! ```text
//! enc:v1:<base64(nonce)>:<base64(tag)>:<base64(ciphertext)>
//! ```
//!
//! Standard base64 alphabet, 12-byte nonce, 16-byte tag. A stored value that
//! does not start with `enc:v1:` is treated as plaintext written before
//! encryption existed and is passed through unchanged. There is no marker for
//! plaintext, so a plaintext password that happens to begin with `enc:v1:` is
//! indistinguishable from a corrupt payload.

pub mod cipher;
pub mod codec;

pub use cipher::{EncryptedPayload, KEY_LEN, NONCE_LEN, PAYLOAD_PREFIX, TAG_LEN};
pub use codec::{is_encrypted, NonceSource, OsNonceSource, PayloadCodec, MAX_DECRYPT_DEPTH};
