//! Admin credential handling: first-run bootstrap and login verification.
//!
//! Passwords are hashed with Argon2id in PHC string format. Session handling
//! lives with the caller; this service only answers "is this login good".

use argon2::password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use tracing::{error, info};

use crate::db::DbConnection;
use crate::domain::models::user::User;
use crate::error::LedgerError;
use crate::storage::UserRepository;

#[derive(Clone)]
pub struct AuthService {
    users: UserRepository,
}

impl AuthService {
    pub fn new(db: DbConnection) -> Self {
        Self {
            users: UserRepository::new(db),
        }
    }

    /// Whether any admin account exists yet; drives the first-run flow.
    pub async fn has_users(&self) -> Result<bool, LedgerError> {
        Ok(self.users.count().await? > 0)
    }

    /// Create the first admin account. Only allowed while the users table is
    /// empty; once an admin exists, new accounts are out of scope.
    pub async fn bootstrap_admin(
        &self,
        username: &str,
        password: &str,
    ) -> Result<User, LedgerError> {
        let username = username.trim();
        if username.is_empty() || password.is_empty() {
            return Err(LedgerError::validation(
                "username and password are required",
            ));
        }
        if self.has_users().await? {
            return Err(LedgerError::validation("an admin user already exists"));
        }

        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| {
                error!("Password hashing failed: {}", e);
                LedgerError::validation("failed to hash password")
            })?
            .to_string();

        let user = self.users.insert(username, &hash).await?;
        info!("Bootstrapped admin user {}", user.username);
        Ok(user)
    }

    /// Verify a login. Unknown usernames and wrong passwords are rejected
    /// identically so a caller cannot probe which usernames exist.
    pub async fn verify_login(&self, username: &str, password: &str) -> Result<User, LedgerError> {
        let rejected = || LedgerError::validation("invalid username or password");

        let user = self
            .users
            .find_by_username(username.trim())
            .await?
            .ok_or_else(rejected)?;

        let parsed = PasswordHash::new(&user.password_hash).map_err(|e| {
            error!("Stored hash for {} is malformed: {}", user.username, e);
            rejected()
        })?;

        match Argon2::default().verify_password(password.as_bytes(), &parsed) {
            Ok(()) => Ok(user),
            Err(argon2::password_hash::Error::Password) => Err(rejected()),
            Err(e) => {
                error!("Password verification failed for {}: {}", user.username, e);
                Err(rejected())
            }
        }
    }
}
