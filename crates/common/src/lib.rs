//! Common types, record definitions, and errors shared across the vault secrets crates.

pub mod error;
pub mod protocol;

pub use error::SecretsError;
pub use protocol::{ErrorResponse, SessionClaims, VaultItem};
