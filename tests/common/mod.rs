#![allow(dead_code)]

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use botdesk_api::auth::{IdentityError, IdentityProvider, IdentityUser, UserRole, VerifiedToken};
use rocket::{async_trait, http::Header};

pub const ADMIN_EMAIL: &str = "admin@example.com";

/// Identity provider with fixed tokens and in-memory role claims
#[derive(Clone)]
pub struct FakeIdentity {
    users: Arc<Mutex<HashMap<String, IdentityUser>>>,
}

impl FakeIdentity {
    pub fn new() -> Self {
        let users = [("u-admin", ADMIN_EMAIL), ("u-user", "user@example.com")]
            .into_iter()
            .map(|(uid, email)| {
                let user = IdentityUser {
                    uid: uid.to_owned(),
                    email: Some(email.to_owned()),
                    role: UserRole::User,
                };
                (uid.to_owned(), user)
            })
            .collect();

        Self {
            users: Arc::new(Mutex::new(users)),
        }
    }

    /// Provider where the admin user already holds the admin role
    pub fn with_admin() -> Self {
        let identity = Self::new();
        if let Some(user) = identity.users.lock().unwrap().get_mut("u-admin") {
            user.role = UserRole::Admin;
        }
        identity
    }
}

#[async_trait]
impl IdentityProvider for FakeIdentity {
    async fn verify_token(&self, token: &str) -> Result<VerifiedToken, IdentityError> {
        let uid = match token {
            "admin-token" => "u-admin",
            "user-token" => "u-user",
            _ => return Err(IdentityError::InvalidToken("unknown token".to_owned())),
        };
        let users = self.users.lock().unwrap();
        Ok(VerifiedToken {
            uid: uid.to_owned(),
            email: users[uid].email.clone(),
        })
    }

    async fn get_user(&self, uid: &str) -> Result<IdentityUser, IdentityError> {
        self.users
            .lock()
            .unwrap()
            .get(uid)
            .cloned()
            .ok_or(IdentityError::UserNotFound)
    }

    async fn list_users(&self) -> Result<Vec<IdentityUser>, IdentityError> {
        let mut users: Vec<_> = self.users.lock().unwrap().values().cloned().collect();
        users.sort_by(|a, b| a.uid.cmp(&b.uid));
        Ok(users)
    }

    async fn set_role(&self, uid: &str, role: UserRole) -> Result<(), IdentityError> {
        let mut users = self.users.lock().unwrap();
        let user = users.get_mut(uid).ok_or(IdentityError::UserNotFound)?;
        user.role = role;
        Ok(())
    }
}

pub fn bearer(token: &str) -> Header<'static> {
    Header::new("Authorization", format!("Bearer {}", token))
}
