//! Administrator credential check for the login path.

use common::SecretsError;
use sha2::{Digest, Sha256};

use super::constant_time_eq;

/// The single administrator account configured via `ADMIN_USER` / `ADMIN_PASS`.
#[derive(Clone)]
pub struct AdminCredentials {
    user: Option<String>,
    pass: Option<String>,
}

impl AdminCredentials {
    /// Wrap the configured values (`None` when unset).
    pub fn new(user: Option<String>, pass: Option<String>) -> Self {
        Self { user, pass }
    }

    /// Returns `true` if `user` and `pass` match the configured account.
    ///
    /// Both fields are compared as SHA-256 digests in constant time, so the
    /// running time reveals neither the mismatch position nor the configured
    /// lengths.
    ///
    /// # Errors
    ///
    /// Returns [`SecretsError::Configuration`] if either value is unset or blank.
    pub fn check(&self, user: &str, pass: &str) -> Result<bool, SecretsError> {
        let non_blank = |v: &Option<String>| v.clone().filter(|s| !s.trim().is_empty());
        let (Some(expected_user), Some(expected_pass)) = (non_blank(&self.user), non_blank(&self.pass))
        else {
            return Err(SecretsError::Configuration(
                "ADMIN_USER and ADMIN_PASS must be set".into(),
            ));
        };

        let user_ok = digest_eq(&expected_user, user);
        let pass_ok = digest_eq(&expected_pass, pass);
        Ok(user_ok & pass_ok)
    }
}

fn digest_eq(a: &str, b: &str) -> bool {
    constant_time_eq(&Sha256::digest(a.as_bytes()), &Sha256::digest(b.as_bytes()))
}

impl std::fmt::Debug for AdminCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminCredentials")
            .field("user", &self.user)
            .field("pass", &self.pass.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn admin() -> AdminCredentials {
        AdminCredentials::new(Some("admin".into()), Some("correct horse".into()))
    }

    #[test]
    fn accepts_matching_pair() {
        assert!(admin().check("admin", "correct horse").unwrap());
    }

    #[test]
    fn rejects_wrong_user_or_password() {
        let creds = admin();
        assert!(!creds.check("admin", "wrong").unwrap());
        assert!(!creds.check("root", "correct horse").unwrap());
        assert!(!creds.check("", "").unwrap());
        assert!(!creds.check("admin", "correct horse ").unwrap());
    }

    #[test]
    fn unset_account_is_configuration_error() {
        let creds = AdminCredentials::new(Some("admin".into()), None);
        assert!(matches!(
            creds.check("admin", "x"),
            Err(SecretsError::Configuration(_))
        ));
        let creds = AdminCredentials::new(Some(" ".into()), Some("p".into()));
        assert!(creds.check(" ", "p").is_err());
    }

    #[test]
    fn debug_redacts_password() {
        let out = format!("{:?}", admin());
        assert!(!out.contains("correct horse"));
        assert!(out.contains("REDACTED"));
    }
}
