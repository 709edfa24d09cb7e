//! Secrets protection layer for the password vault.
//!
//! Two independent components sit on top of a shared key provider:
//!
//! - [`crypto`] — the payload codec that protects the stored password field
//!   at rest (`enc:v1:<nonce>:<tag>:<ciphertext>`, AES-256-GCM).
//! - [`session`] — HMAC-SHA256 signed session tokens and the admin login check.
//!
//! [`keys`] resolves key material from configuration once per process and
//! caches it. [`SecretsState`] bundles everything the API layer needs into a
//! cheaply cloneable handle.
//!
//! Every operation is CPU-bound and safe to call from any number of threads.

pub mod config;
pub mod crypto;
pub mod keys;
pub mod record;
pub mod session;
pub mod state;

pub use common::{SecretsError, SessionClaims, VaultItem};
pub use crypto::{is_encrypted, PayloadCodec};
pub use keys::{EncryptionKey, KeyProvider, SessionSecret};
pub use session::{AdminCredentials, SessionSigner};
pub use state::SecretsState;
