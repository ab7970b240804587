//! User model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::sqlite::{SqliteArgumentValue, SqliteTypeInfo, SqliteValueRef};
use sqlx::{Decode, Encode, FromRow, Sqlite};
use std::borrow::Cow;
use utoipa::ToSchema;

/// Account role (string identifier)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Member,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Member => "member",
        }
    }

    /// Whether accounts with this role carry a member number.
    pub fn is_member(&self) -> bool {
        matches!(self, Role::Member)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "member" => Ok(Role::Member),
            _ => Err("Role must be 'admin' or 'member'".to_string()),
        }
    }
}

impl From<Role> for String {
    fn from(role: Role) -> Self {
        role.as_str().to_string()
    }
}

// SQLx conversion for Role (stored as TEXT)
impl sqlx::Type<Sqlite> for Role {
    fn type_info() -> SqliteTypeInfo {
        <String as sqlx::Type<Sqlite>>::type_info()
    }
}

impl<'r> Decode<'r, Sqlite> for Role {
    fn decode(value: SqliteValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s: String = Decode::<Sqlite>::decode(value)?;
        s.parse().map_err(|e: String| e.into())
    }
}

impl<'q> Encode<'q, Sqlite> for Role {
    fn encode_by_ref(&self, buf: &mut Vec<SqliteArgumentValue<'q>>) -> sqlx::encode::IsNull {
        buf.push(SqliteArgumentValue::Text(Cow::Borrowed(self.as_str())));
        sqlx::encode::IsNull::No
    }
}

/// Full user account from the database.
///
/// `member_number` is populated for `member` accounts only; admins carry
/// no circulation identity and hold `NULL` in that column.
#[derive(Debug, Clone, FromRow, Serialize, ToSchema)]
pub struct User {
    pub user_id: i64,
    pub user_name: String,
    /// Hashed password (argon2)
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: Role,
    pub member_number: Option<i64>,
    pub created_at: DateTime<Utc>,
}
