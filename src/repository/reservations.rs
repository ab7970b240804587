//! Reservations repository for database operations

use chrono::NaiveDate;
use sqlx::{Pool, Sqlite};

use crate::{
    error::{AppError, AppResult},
    models::reservation::Reservation,
};

#[derive(Clone)]
pub struct ReservationsRepository {
    pool: Pool<Sqlite>,
}

impl ReservationsRepository {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    /// Queue a reservation for a member. The insert only lands while the
    /// shelf count is zero; a book with copies on the shelf is borrowed
    /// directly instead.
    pub async fn reserve(
        &self,
        member_number: i64,
        book_id: i64,
        reservation_date: NaiveDate,
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

        // The availability check is folded into the insert so a concurrent
        // return cannot slip between check and write.
        let inserted = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO reservations (member_number, book_id, reservation_date)
            SELECT ?1, ?2, ?3 FROM books WHERE book_id = ?2 AND quantity = 0
            RETURNING reservation_id
            "#,
        )
        .bind(member_number)
        .bind(book_id)
        .bind(reservation_date)
        .fetch_optional(&mut *tx)
        .await?;

        match inserted {
            Some(reservation_id) => {
                tx.commit().await?;
                Ok(reservation_id)
            }
            None => {
                let quantity: Option<i64> =
                    sqlx::query_scalar("SELECT quantity FROM books WHERE book_id = ?1")
                        .bind(book_id)
                        .fetch_optional(&mut *tx)
                        .await?;

                match quantity {
                    None => Err(AppError::NotFound(format!(
                        "Book with id {} not found",
                        book_id
                    ))),
                    Some(_) => Err(AppError::InvalidArgument(
                        "Book is available, no need to reserve".to_string(),
                    )),
                }
            }
        }
    }

    /// All reservations placed by a member, oldest first
    pub async fn list_for_member(&self, member_number: i64) -> AppResult<Vec<Reservation>> {
        let reservations = sqlx::query_as::<_, Reservation>(
            "SELECT * FROM reservations WHERE member_number = ?1 ORDER BY reservation_id",
        )
        .bind(member_number)
        .fetch_all(&self.pool)
        .await?;

        Ok(reservations)
    }
}
