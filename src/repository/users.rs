//! Users repository for database operations

use chrono::Utc;
use sqlx::{Pool, Sqlite};

use crate::{
    error::{AppError, AppResult},
    models::user::{Role, User},
    repository::unique_violation,
};

/// Attempts at allocating a fresh member number before giving up
const MEMBER_NUMBER_RETRIES: u32 = 3;

#[derive(Clone)]
pub struct UsersRepository {
    pool: Pool<Sqlite>,
}

impl UsersRepository {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    /// Get user by name (primary authentication lookup)
    pub async fn get_by_name(&self, user_name: &str) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE user_name = ?1")
            .bind(user_name)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    /// Get user by member number
    pub async fn get_by_member_number(&self, member_number: i64) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE member_number = ?1")
            .bind(member_number)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    /// Check if a member number is registered
    pub async fn member_exists(&self, member_number: i64) -> AppResult<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE member_number = ?1)")
                .bind(member_number)
                .fetch_one(&self.pool)
                .await?;

        Ok(exists)
    }

    /// Create a new account. Members receive the next free member number,
    /// admins carry none. Returns the allocated number.
    pub async fn create(
        &self,
        user_name: &str,
        password_hash: &str,
        role: Role,
    ) -> AppResult<Option<i64>> {
        let now = Utc::now();

        if !role.is_member() {
            sqlx::query(
                r#"
                INSERT INTO users (user_name, password_hash, role, member_number, created_at)
                VALUES (?1, ?2, ?3, NULL, ?4)
                "#,
            )
            .bind(user_name)
            .bind(password_hash)
            .bind(role)
            .bind(now)
            .execute(&self.pool)
            .await
            .map_err(|e| Self::map_create_error(e, user_name))?;

            return Ok(None);
        }

        // The number is allocated inside the INSERT itself so two concurrent
        // registrations cannot both read the same maximum. If the UNIQUE
        // backstop on member_number still fires, retry with a fresh scan.
        let mut attempts = 0;
        loop {
            let inserted = sqlx::query_scalar::<_, i64>(
                r#"
                INSERT INTO users (user_name, password_hash, role, member_number, created_at)
                VALUES (?1, ?2, ?3, (SELECT COALESCE(MAX(member_number), 0) + 1 FROM users), ?4)
                RETURNING member_number
                "#,
            )
            .bind(user_name)
            .bind(password_hash)
            .bind(role)
            .bind(now)
            .fetch_one(&self.pool)
            .await;

            match inserted {
                Ok(member_number) => return Ok(Some(member_number)),
                Err(err) => match unique_violation(&err) {
                    Some(constraint)
                        if constraint.contains("member_number")
                            && attempts < MEMBER_NUMBER_RETRIES =>
                    {
                        attempts += 1;
                        continue;
                    }
                    _ => return Err(Self::map_create_error(err, user_name)),
                },
            }
        }
    }

    fn map_create_error(err: sqlx::Error, user_name: &str) -> AppError {
        match unique_violation(&err) {
            Some(constraint) if constraint.contains("user_name") => {
                AppError::Conflict(format!("User '{}' already exists", user_name))
            }
            _ => AppError::Database(err),
        }
    }
}
