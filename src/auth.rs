mod firebase;
mod guard;
mod identity;

pub use firebase::{FirebaseIdentityProvider, ServiceAccount};
pub use guard::{AdminUser, AuthenticatedUser};
pub use identity::{IdentityError, IdentityProvider, IdentityUser, UserRole, VerifiedToken};

use std::sync::Arc;

use rocket::fairing::AdHoc;

use crate::{config::get_app_config, utils::Encryptor};

/// Identity provider client plus the configured bootstrap administrator
#[derive(Clone)]
pub struct IdentityService {
    provider: Arc<dyn IdentityProvider>,
    bootstrap_admin_email: String,
}

impl IdentityService {
    pub fn new(provider: impl IdentityProvider + 'static, bootstrap_admin_email: &str) -> Self {
        Self {
            provider: Arc::new(provider),
            bootstrap_admin_email: bootstrap_admin_email.trim().to_owned(),
        }
    }

    pub fn provider(&self) -> &dyn IdentityProvider {
        self.provider.as_ref()
    }

    /// Whether the email belongs to the bootstrap administrator (case-insensitive)
    pub fn is_bootstrap_admin(&self, email: Option<&str>) -> bool {
        !self.bootstrap_admin_email.is_empty()
            && email.is_some_and(|email| {
                email.trim().eq_ignore_ascii_case(&self.bootstrap_admin_email)
            })
    }
}

/// Fairing that sets up the identity provider client
pub fn setup_identity() -> AdHoc {
    AdHoc::on_ignite("Identity provider", |rocket| async {
        let app_config = get_app_config(&rocket);
        let http_client = rocket
            .state::<reqwest::Client>()
            .cloned()
            .unwrap_or_default();
        let provider =
            FirebaseIdentityProvider::from_file(&http_client, &app_config.firebase_credentials)
                .expect("Failed to load identity provider credentials");
        let identity = IdentityService::new(provider, &app_config.admin_email);

        rocket.manage(identity)
    })
}

/// Fairing that sets up an encryption service
pub fn setup_encryption() -> AdHoc {
    AdHoc::on_ignite("Encryption setup", |rocket| async {
        let app_config = get_app_config(&rocket);
        let encryptor = Encryptor::new(&app_config.secret_key)
            .expect("Invalid secret key: must be 64-character hexadecimal string");

        rocket.manage(encryptor)
    })
}

#[cfg(test)]
mod tests {
    use rocket::async_trait;

    use super::*;

    struct NoopProvider;

    #[async_trait]
    impl IdentityProvider for NoopProvider {
        async fn verify_token(&self, _token: &str) -> Result<VerifiedToken, IdentityError> {
            Err(IdentityError::InvalidToken("noop".to_owned()))
        }
        async fn get_user(&self, _uid: &str) -> Result<IdentityUser, IdentityError> {
            Err(IdentityError::UserNotFound)
        }
        async fn list_users(&self) -> Result<Vec<IdentityUser>, IdentityError> {
            Ok(Vec::new())
        }
        async fn set_role(&self, _uid: &str, _role: UserRole) -> Result<(), IdentityError> {
            Ok(())
        }
    }

    #[test]
    fn bootstrap_email_matches_case_insensitively() {
        let identity = IdentityService::new(NoopProvider, "Admin@Example.com");
        assert!(identity.is_bootstrap_admin(Some("admin@example.com")));
        assert!(identity.is_bootstrap_admin(Some(" ADMIN@EXAMPLE.COM")));
        assert!(!identity.is_bootstrap_admin(Some("other@example.com")));
        assert!(!identity.is_bootstrap_admin(None));
    }

    #[test]
    fn empty_bootstrap_email_matches_nobody() {
        let identity = IdentityService::new(NoopProvider, "");
        assert!(!identity.is_bootstrap_admin(Some("")));
    }
}
