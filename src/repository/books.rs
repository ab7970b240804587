//! Books repository for database operations

use sqlx::{Pool, Sqlite};

use crate::{
    error::{AppError, AppResult},
    models::book::{Book, BookSummary, CreateBook},
    repository::unique_violation,
};

#[derive(Clone)]
pub struct BooksRepository {
    pool: Pool<Sqlite>,
}

impl BooksRepository {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    /// Get book by ID
    pub async fn get_by_id(&self, book_id: i64) -> AppResult<Book> {
        sqlx::query_as::<_, Book>("SELECT * FROM books WHERE book_id = ?1")
            .bind(book_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", book_id)))
    }

    /// Search by keyword against title and author id. An empty keyword
    /// matches the whole catalogue.
    pub async fn search(&self, keyword: &str) -> AppResult<Vec<BookSummary>> {
        let pattern = format!("%{}%", keyword);

        let books = sqlx::query_as::<_, BookSummary>(
            r#"
            SELECT book_id, title, author_id, quantity
            FROM books
            WHERE title LIKE ?1 OR CAST(author_id AS TEXT) LIKE ?1
            ORDER BY book_id
            "#,
        )
        .bind(&pattern)
        .fetch_all(&self.pool)
        .await?;

        Ok(books)
    }

    /// Insert a new catalogue record
    pub async fn create(&self, book: &CreateBook) -> AppResult<Book> {
        sqlx::query_as::<_, Book>(
            r#"
            INSERT INTO books (book_id, title, author_id, category_id, quantity, publisher)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            RETURNING *
            "#,
        )
        .bind(book.book_id)
        .bind(&book.title)
        .bind(book.author_id)
        .bind(book.category_id)
        .bind(book.quantity)
        .bind(&book.publisher)
        .fetch_one(&self.pool)
        .await
        .map_err(|err| match unique_violation(&err) {
            Some(constraint) if constraint.contains("book_id") => {
                AppError::Conflict(format!("Book with id {} already exists", book.book_id))
            }
            _ => AppError::Database(err),
        })
    }

    /// Copies currently on the shelf, or None for an unknown book
    pub async fn get_quantity(&self, book_id: i64) -> AppResult<Option<i64>> {
        let quantity = sqlx::query_scalar::<_, i64>("SELECT quantity FROM books WHERE book_id = ?1")
            .bind(book_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(quantity)
    }
}
