use rocket::async_trait;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Identity provider errors
#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    #[error("Invalid token: {0}")]
    InvalidToken(String),
    #[error("User not found")]
    UserNotFound,
    #[error("Identity provider request failed: {0}")]
    Request(String),
    #[error("Identity provider configuration error: {0}")]
    Config(String),
}

/// Role claim of a user. Users without a role claim are regular users.
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, JsonSchema, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    #[default]
    User,
    Admin,
}

/// Subject of a verified bearer token
#[derive(Debug, Clone)]
pub struct VerifiedToken {
    pub uid: String,
    pub email: Option<String>,
}

/// A user record of the identity provider, with its role claim
#[derive(Debug, Clone, JsonSchema, Serialize)]
pub struct IdentityUser {
    pub uid: String,
    pub email: Option<String>,
    pub role: UserRole,
}

/// External service that issues bearer tokens and stores role claims
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Verify a bearer token and return its subject
    async fn verify_token(&self, token: &str) -> Result<VerifiedToken, IdentityError>;

    /// Get a user and its role claim
    async fn get_user(&self, uid: &str) -> Result<IdentityUser, IdentityError>;

    /// List all users with their role claims
    async fn list_users(&self) -> Result<Vec<IdentityUser>, IdentityError>;

    /// Replace the role claim of a user
    async fn set_role(&self, uid: &str, role: UserRole) -> Result<(), IdentityError>;
}
