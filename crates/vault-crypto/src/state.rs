//! Process-scoped handle the API layer keeps for the lifetime of the process.

use std::sync::Arc;

use common::{SecretsError, SessionClaims};
use tracing::{info, warn};

use crate::config::Config;
use crate::crypto::PayloadCodec;
use crate::keys::KeyProvider;
use crate::session::{AdminCredentials, SessionSigner};

/// Secrets-layer state shared across all request handlers.
///
/// All fields are cheaply cloneable (`Arc`-wrapped or already `Arc`-backed) so
/// a web framework can clone the state per request. Keys are resolved lazily
/// on first use and then cached for every clone.
#[derive(Clone, Debug)]
pub struct SecretsState {
    /// Password field codec.
    pub codec: Arc<PayloadCodec>,
    /// Session token signer.
    pub sessions: SessionSigner,
    /// Configured administrator account.
    pub admin: Arc<AdminCredentials>,
}

impl SecretsState {
    /// Create a new [`SecretsState`] from its parts.
    pub fn new(codec: PayloadCodec, sessions: SessionSigner, admin: AdminCredentials) -> Self {
        Self {
            codec: Arc::new(codec),
            sessions,
            admin: Arc::new(admin),
        }
    }

    /// Build state from loaded configuration. No key is parsed yet.
    pub fn from_config(cfg: &Config) -> Self {
        let encryption = Arc::new(KeyProvider::new(cfg.encryption_key.clone()));
        let signing = Arc::new(KeyProvider::new(cfg.auth_secret.clone()));
        Self::new(
            PayloadCodec::new(encryption),
            SessionSigner::new(signing),
            AdminCredentials::new(cfg.admin_user.clone(), cfg.admin_pass.clone()),
        )
    }

    /// Check a login attempt and issue a session token on success.
    ///
    /// Returns `Ok(None)` for wrong credentials.
    ///
    /// # Errors
    ///
    /// Returns [`SecretsError::Configuration`] if the admin account or the
    /// signing secret is not configured.
    pub fn login(&self, user: &str, pass: &str) -> Result<Option<String>, SecretsError> {
        if !self.admin.check(user, pass)? {
            warn!("login rejected");
            return Ok(None);
        }
        let token = self.sessions.issue(user)?;
        info!("login succeeded; session issued");
        Ok(Some(token))
    }

    /// Authorise a request carrying an optional session token.
    ///
    /// A missing token and an invalid token are indistinguishable: both
    /// yield `Ok(None)`.
    ///
    /// # Errors
    ///
    /// Returns [`SecretsError::Configuration`] if the signing secret is not set,
    /// whether or not a token was supplied.
    pub fn authorize(&self, token: Option<&str>) -> Result<Option<SessionClaims>, SecretsError> {
        self.sessions.verify(token.unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> Config {
        Config {
            encryption_key: Some("00".repeat(32)),
            auth_secret: Some("signing-secret".into()),
            admin_user: Some("admin".into()),
            admin_pass: Some("pw".into()),
            log_level: "info".into(),
        }
    }

    #[test]
    fn login_then_authorize() {
        let state = SecretsState::from_config(&config());
        let token = state.login("admin", "pw").unwrap().unwrap();
        let claims = state.authorize(Some(&token)).unwrap().unwrap();
        assert_eq!(claims.user, "admin");
    }

    #[test]
    fn wrong_password_issues_nothing() {
        let state = SecretsState::from_config(&config());
        assert_eq!(state.login("admin", "nope").unwrap(), None);
    }

    #[test]
    fn missing_and_invalid_tokens_look_the_same() {
        let state = SecretsState::from_config(&config());
        assert_eq!(state.authorize(None).unwrap(), None);
        assert_eq!(state.authorize(Some("garbage")).unwrap(), None);
    }

    #[test]
    fn unconfigured_signing_secret_surfaces() {
        let mut cfg = config();
        cfg.auth_secret = None;
        let state = SecretsState::from_config(&cfg);
        let err = state.authorize(None).unwrap_err();
        assert_eq!(err.http_status(), 500);
        assert!(matches!(state.login("admin", "pw"), Err(SecretsError::Configuration(_))));
    }

    #[test]
    fn clones_share_resolved_keys() {
        let state = SecretsState::from_config(&config());
        let clone = state.clone();
        let token = state.codec.encrypt("hunter2").unwrap();
        assert_eq!(clone.codec.decrypt(&token).unwrap(), "hunter2");
    }
}
