//! Signed session tokens and the administrator login check.
//!
//! # Token format
//!
//! ```text
//! <base64url-no-pad(JSON claims)>.<lowercase hex HMAC-SHA256(base64 part)>
//! ```
//!
//! Tokens prove authenticity and integrity of the claims only. There is no
//! expiry field and no revocation list; callers that want a session lifetime
//! compare [`common::SessionClaims::issued_at_millis`] against their own policy.
//!
//! # Verification invariants
//!
//! - Every malformed or forged token collapses to the same "invalid" result
//!   (`Ok(None)`), so a caller probing tokens learns nothing about the cause.
//! - Signatures are compared in constant time, and claims are decoded only
//!   after the signature matches.

pub mod credentials;
pub mod token;

pub use credentials::AdminCredentials;
pub use token::SessionSigner;

/// Name of the cookie that carries the session token.
pub const SESSION_COOKIE_NAME: &str = "pv_session";

/// Equality whose running time depends only on the input lengths.
pub(crate) fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let diff = a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y));
    std::hint::black_box(diff) == 0
}
