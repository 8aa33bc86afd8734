use async_trait::async_trait;
use common::Role;

use crate::Result;

/// A stored user with a hashed credential.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
    pub username: String,
    /// PHC-formatted password hash; never the plain password.
    pub password_hash: String,
    pub role: Role,
}

/// Storage for user credentials.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Finds a user by username.
    async fn find(&self, username: &str) -> Result<Option<UserRecord>>;

    /// Inserts a user. Fails with `UserAlreadyExists` on a duplicate username.
    async fn insert(&self, user: UserRecord) -> Result<()>;

    /// Returns the number of stored users.
    async fn count(&self) -> Result<u64>;
}
