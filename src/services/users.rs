//! Authentication and account registration service

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

use crate::{
    error::{AppError, AppResult},
    models::user::{Role, User},
    repository::Repository,
};

#[derive(Clone)]
pub struct UsersService {
    repository: Repository,
}

impl UsersService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Authenticate by user name and password.
    ///
    /// Unknown names and wrong passwords fail identically so callers
    /// cannot probe which accounts exist.
    pub async fn authenticate(&self, user_name: &str, password: &str) -> AppResult<User> {
        let user = self
            .repository
            .users
            .get_by_name(user_name)
            .await?
            .ok_or_else(|| AppError::Unauthorized("Invalid user name or password".to_string()))?;

        if !self.verify_password(&user, password)? {
            return Err(AppError::Unauthorized(
                "Invalid user name or password".to_string(),
            ));
        }

        Ok(user)
    }

    /// Register a new account under the given role. Returns the allocated
    /// member number (None for admin accounts).
    pub async fn register(
        &self,
        user_name: &str,
        password: &str,
        role: &str,
    ) -> AppResult<Option<i64>> {
        let role: Role = role.parse().map_err(AppError::InvalidArgument)?;
        let password_hash = self.hash_password(password)?;

        self.repository
            .users
            .create(user_name, &password_hash, role)
            .await
    }

    /// Verify a password against the stored hash
    fn verify_password(&self, user: &User, password: &str) -> AppResult<bool> {
        let parsed_hash = PasswordHash::new(&user.password_hash)
            .map_err(|_| AppError::Internal("Invalid password hash".to_string()))?;
        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok())
    }

    /// Hash a password using Argon2
    pub fn hash_password(&self, password: &str) -> AppResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::default();
        let hash = argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))?;
        Ok(hash.to_string())
    }
}
