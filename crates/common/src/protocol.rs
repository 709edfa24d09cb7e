//! Data shapes exchanged between the secrets layer and the API layer.
//!
//! These types are serialised as JSON: vault records in the key-value store,
//! session claims inside signed tokens, and error bodies on the HTTP surface.

use std::time::Duration;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Vault records
// ---------------------------------------------------------------------------

/// A single vault record as stored in the key-value store.
///
/// The `password` field holds either an empty string, a legacy plaintext
/// value, or an `enc:v1:...` payload. The API layer persists it verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VaultItem {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default)]
    pub password: String,
    /// RFC 3339 creation timestamp.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub valid_days: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
}

impl VaultItem {
    /// Create an empty record for `url` with a fresh random id.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            category: None,
            url: url.into(),
            username: None,
            password: String::new(),
            created_at: None,
            valid_days: None,
            due_date: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Session claims
// ---------------------------------------------------------------------------

/// Identity asserted by a valid session token.
///
/// Serialised as `{"user":"...","iat":<millis>}`; field order is fixed by the
/// declaration order below, which keeps signed tokens deterministic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Authenticated user name.
    pub user: String,
    /// Issue time in milliseconds since the Unix epoch.
    #[serde(rename = "iat")]
    pub issued_at_millis: i64,
}

impl SessionClaims {
    /// Construct claims for `user` issued at `issued_at_millis`.
    pub fn new(user: impl Into<String>, issued_at_millis: i64) -> Self {
        Self {
            user: user.into(),
            issued_at_millis,
        }
    }

    /// Time elapsed between issue and `now_millis`.
    ///
    /// Returns `None` when the claims were issued in the future relative to
    /// `now_millis`. Session lifetime policy is the caller's to enforce.
    pub fn age(&self, now_millis: i64) -> Option<Duration> {
        let elapsed = now_millis.checked_sub(self.issued_at_millis)?;
        u64::try_from(elapsed).ok().map(Duration::from_millis)
    }
}

// ---------------------------------------------------------------------------
// Error response
// ---------------------------------------------------------------------------

/// Standard error response body returned on any non-2xx status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Short machine-readable error code (e.g. `"unauthorized"`).
    pub code: String,
    /// Human-readable description safe to expose to callers.
    pub message: String,
}

impl ErrorResponse {
    /// Construct an [`ErrorResponse`] from a code and message.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }

    /// The single body used for both "no session" and "invalid session".
    pub fn unauthorized() -> Self {
        Self::new("unauthorized", "Unauthorized")
    }
}

impl From<&crate::SecretsError> for ErrorResponse {
    fn from(err: &crate::SecretsError) -> Self {
        let message = match err {
            crate::SecretsError::Configuration(_) => "server misconfigured".to_owned(),
            other => other.to_string(),
        };
        Self::new(err.code(), message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SecretsError;

    #[test]
    fn vault_item_uses_camel_case_and_skips_absent_fields() {
        let mut item = VaultItem::new("https://example.com");
        item.created_at = Some("2024-01-01T00:00:00Z".into());
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["createdAt"], "2024-01-01T00:00:00Z");
        assert!(json.get("username").is_none());
        assert!(json.get("validDays").is_none());
    }

    #[test]
    fn vault_item_accepts_missing_password() {
        let item: VaultItem =
            serde_json::from_str(r#"{"id":"a1","url":"https://example.com"}"#).unwrap();
        assert_eq!(item.password, "");
        assert!(item.category.is_none());
    }

    #[test]
    fn vault_item_ids_are_unique() {
        let a = VaultItem::new("u");
        let b = VaultItem::new("u");
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn session_claims_wire_shape() {
        let claims = SessionClaims::new("alice", 1000);
        let json = serde_json::to_string(&claims).unwrap();
        assert_eq!(json, r#"{"user":"alice","iat":1000}"#);
    }

    #[test]
    fn session_claims_age() {
        let claims = SessionClaims::new("alice", 1_000);
        assert_eq!(claims.age(3_500), Some(Duration::from_millis(2_500)));
        assert_eq!(claims.age(1_000), Some(Duration::ZERO));
        assert_eq!(claims.age(999), None);
    }

    #[test]
    fn error_response_hides_configuration_detail() {
        let err = SecretsError::Configuration("AUTH_SECRET is not set".into());
        let body = ErrorResponse::from(&err);
        assert_eq!(body.code, "server_misconfigured");
        assert!(!body.message.contains("AUTH_SECRET"));
    }

    #[test]
    fn unauthorized_body() {
        let e = ErrorResponse::unauthorized();
        assert_eq!(e.code, "unauthorized");
    }
}
