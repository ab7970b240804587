//! Loan transactions repository for database operations

use chrono::NaiveDate;
use sqlx::{Pool, Sqlite};

use crate::{
    error::{AppError, AppResult},
    models::transaction::{Transaction, TransactionStatus},
};

#[derive(Clone)]
pub struct TransactionsRepository {
    pool: Pool<Sqlite>,
}

impl TransactionsRepository {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    /// Get transaction by ID
    pub async fn get_by_id(&self, transaction_id: i64) -> AppResult<Transaction> {
        sqlx::query_as::<_, Transaction>("SELECT * FROM transactions WHERE transaction_id = ?1")
            .bind(transaction_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("Transaction with id {} not found", transaction_id))
            })
    }

    /// Issue a book to a member: decrement the shelf count and record the
    /// loan in one transaction. The decrement is guarded so the count can
    /// never go below zero, whatever other writers do concurrently.
    pub async fn issue(
        &self,
        member_number: i64,
        book_id: i64,
        issue_date: NaiveDate,
        due_date: NaiveDate,
    ) -> AppResult<i64> {
        let mut tx = self.pool.begin().await?;

        let member_known: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE member_number = ?1)")
                .bind(member_number)
                .fetch_one(&mut *tx)
                .await?;

        if !member_known {
            return Err(AppError::NotFound(format!(
                "Member {} not found",
                member_number
            )));
        }

        let updated =
            sqlx::query("UPDATE books SET quantity = quantity - 1 WHERE book_id = ?1 AND quantity >= 1")
                .bind(book_id)
                .execute(&mut *tx)
                .await?
                .rows_affected();

        if updated == 0 {
            // Distinguish a missing record from an exhausted shelf
            let quantity: Option<i64> =
                sqlx::query_scalar("SELECT quantity FROM books WHERE book_id = ?1")
                    .bind(book_id)
                    .fetch_optional(&mut *tx)
                    .await?;

            return match quantity {
                None => Err(AppError::NotFound(format!(
                    "Book with id {} not found",
                    book_id
                ))),
                Some(_) => Err(AppError::Unavailable("Book not available".to_string())),
            };
        }

        let transaction_id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO transactions (book_id, member_number, issue_date, due_date, status)
            VALUES (?1, ?2, ?3, ?4, ?5)
            RETURNING transaction_id
            "#,
        )
        .bind(book_id)
        .bind(member_number)
        .bind(issue_date)
        .bind(due_date)
        .bind(TransactionStatus::Issued)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(transaction_id)
    }

    /// Push back the due date of an open loan. Only the owning member can
    /// renew, and only while the loan is still issued.
    pub async fn renew(
        &self,
        member_number: i64,
        transaction_id: i64,
        new_due_date: NaiveDate,
    ) -> AppResult<()> {
        let updated = sqlx::query(
            r#"
            UPDATE transactions
            SET due_date = ?1
            WHERE transaction_id = ?2 AND member_number = ?3 AND status = ?4
            "#,
        )
        .bind(new_due_date)
        .bind(transaction_id)
        .bind(member_number)
        .bind(TransactionStatus::Issued)
        .execute(&self.pool)
        .await?
        .rows_affected();

        if updated == 0 {
            return Err(AppError::NotFound(format!(
                "No active loan {} for member {}",
                transaction_id, member_number
            )));
        }

        Ok(())
    }
}
