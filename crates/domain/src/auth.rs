//! Password authentication.

use std::sync::Arc;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use common::Role;
use store::{UserRecord, UserStore};

use crate::access::Identity;
use crate::error::{AuthError, DomainError};

/// Accounts created on first start when the user store is empty.
pub const SEED_USERS: [(&str, Role); 3] = [
    ("leader", Role::Leader),
    ("member1", Role::Member),
    ("member2", Role::Member),
];

/// Service for logging in and provisioning users.
#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserStore>,
}

impl AuthService {
    /// Creates a new auth service.
    pub fn new(users: Arc<dyn UserStore>) -> Self {
        Self { users }
    }

    /// Checks a username and password.
    ///
    /// Unknown users and wrong passwords both yield `InvalidCredentials`.
    #[tracing::instrument(skip(self, password))]
    pub async fn login(&self, username: &str, password: &str) -> Result<Identity, DomainError> {
        let user = self
            .users
            .find(username)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        verify_password(password, &user.password_hash)?;

        Ok(Identity::new(user.username, user.role))
    }

    /// Creates a user with a hashed password.
    #[tracing::instrument(skip(self, password))]
    pub async fn register(
        &self,
        username: &str,
        password: &str,
        role: Role,
    ) -> Result<Identity, DomainError> {
        let password_hash = hash_password(password)?;

        self.users
            .insert(UserRecord {
                username: username.to_string(),
                password_hash,
                role,
            })
            .await?;

        Ok(Identity::new(username, role))
    }

    /// Creates the [`SEED_USERS`] with `password` if no user exists yet.
    ///
    /// Returns true if users were created.
    pub async fn seed_if_empty(&self, password: &str) -> Result<bool, DomainError> {
        if self.users.count().await? > 0 {
            return Ok(false);
        }

        for (username, role) in SEED_USERS {
            self.register(username, password, role).await?;
        }

        tracing::info!(count = SEED_USERS.len(), "seeded default users");
        Ok(true)
    }
}

/// Hash a password using Argon2id.
fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}
