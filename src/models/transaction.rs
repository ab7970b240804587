//! Loan transaction model and related types

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::sqlite::{SqliteArgumentValue, SqliteTypeInfo, SqliteValueRef};
use sqlx::{Decode, Encode, FromRow, Sqlite};
use std::borrow::Cow;
use utoipa::ToSchema;

/// Lifecycle of a loan transaction (string identifier)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum TransactionStatus {
    Issued,
    Returned,
}

impl TransactionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionStatus::Issued => "Issued",
            TransactionStatus::Returned => "Returned",
        }
    }
}

impl std::fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for TransactionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Issued" => Ok(TransactionStatus::Issued),
            "Returned" => Ok(TransactionStatus::Returned),
            _ => Err(format!("Invalid transaction status: {}", s)),
        }
    }
}

// SQLx conversion for TransactionStatus (stored as TEXT)
impl sqlx::Type<Sqlite> for TransactionStatus {
    fn type_info() -> SqliteTypeInfo {
        <String as sqlx::Type<Sqlite>>::type_info()
    }
}

impl<'r> Decode<'r, Sqlite> for TransactionStatus {
    fn decode(value: SqliteValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s: String = Decode::<Sqlite>::decode(value)?;
        s.parse().map_err(|e: String| e.into())
    }
}

impl<'q> Encode<'q, Sqlite> for TransactionStatus {
    fn encode_by_ref(&self, buf: &mut Vec<SqliteArgumentValue<'q>>) -> sqlx::encode::IsNull {
        buf.push(SqliteArgumentValue::Text(Cow::Borrowed(self.as_str())));
        sqlx::encode::IsNull::No
    }
}

/// Loan transaction from the database
#[derive(Debug, Clone, FromRow, Serialize, ToSchema)]
pub struct Transaction {
    pub transaction_id: i64,
    pub book_id: i64,
    pub member_number: i64,
    pub issue_date: NaiveDate,
    pub due_date: NaiveDate,
    pub status: TransactionStatus,
}
