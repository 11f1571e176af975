use argon2::{
    password_hash::{rand_core::OsRng, PasswordHasher, SaltString},
    Argon2, PasswordHash, PasswordVerifier,
};
use chrono::Utc;
use tracing::warn;

use crate::core::{AppError, Result};
use crate::modules::users::models::{Role, User};
use crate::modules::users::repositories::UserRepository;

/// Service for login and session-actor resolution
pub struct AuthService {
    users: UserRepository,
}

impl AuthService {
    pub fn new(users: UserRepository) -> Self {
        Self { users }
    }

    /// Verify credentials and return the account.
    ///
    /// Unknown usernames and wrong passwords are indistinguishable to the
    /// caller.
    pub async fn login(&self, username: &str, password: &str) -> Result<User> {
        let user = self
            .users
            .find_by_username(username)
            .await?
            .ok_or_else(|| AppError::unauthorized("Invalid username or password"))?;

        if !verify_password(password, &user.password_hash)? {
            return Err(AppError::unauthorized("Invalid username or password"));
        }

        Ok(user)
    }

    /// Resolve a session id back to its account
    pub async fn user_by_id(&self, id: i64) -> Result<User> {
        self.users
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::unauthorized("Session user no longer exists"))
    }

    pub async fn list_users(&self) -> Result<Vec<User>> {
        self.users.list_all().await
    }

    /// Seed a default admin account on an empty users table so a fresh
    /// deployment can be logged into at all
    pub async fn ensure_default_admin(&self) -> Result<()> {
        if self.users.count().await? > 0 {
            return Ok(());
        }

        let hash = hash_password("admin123")?;
        self.users
            .create(
                "admin",
                &hash,
                "Administrator",
                Some("admin@company.com"),
                Some("IT"),
                Role::Admin,
                Utc::now(),
            )
            .await?;

        warn!("Created default admin user; change its password before real use");
        Ok(())
    }
}

/// Hash a password with Argon2 and a fresh salt
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::internal(format!("Failed to hash password: {}", e)))
}

/// Verify a password against a stored Argon2 hash
pub fn verify_password(password: &str, hash: &str) -> Result<bool> {
    let parsed_hash = PasswordHash::new(hash)
        .map_err(|e| AppError::internal(format!("Invalid hash format: {}", e)))?;

    let argon2 = Argon2::default();

    Ok(argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}
